use serde_json::Value;
use tracing::{info, warn};

use crate::feedback::FeedbackError;
use crate::models::feedback::FeedbackEvent;
use crate::store::KeyValueStore;

/// Store key holding the JSON array of every vote event.
pub const LOG_KEY: &str = "feedback-analytics-log";

fn read_raw<S>(store: &S) -> Result<Option<String>, FeedbackError>
where
    S: KeyValueStore + ?Sized,
{
    store.get(LOG_KEY).map_err(|source| FeedbackError::StoreRead {
        key: LOG_KEY.to_string(),
        source,
    })
}

/// Reads the event log for aggregation. A missing log is empty, a log that
/// is not a JSON array is reported and treated as empty, and entries that do
/// not parse as events are reported and skipped.
pub fn read_events<S>(store: &S) -> Result<Vec<FeedbackEvent>, FeedbackError>
where
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = read_raw(store)? else {
        return Ok(Vec::new());
    };
    let entries = match serde_json::from_str::<Vec<Value>>(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Ignoring unreadable feedback log: {e}");
            return Ok(Vec::new());
        }
    };
    let total = entries.len();
    let events: Vec<FeedbackEvent> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    if events.len() < total {
        warn!(
            "Skipped {} malformed feedback log entries",
            total - events.len()
        );
    }
    Ok(events)
}

/// Appends one event at the end of the log.
///
/// Existing entries are carried over untouched, readable or not. A log that
/// is not a JSON array is left alone and the append fails.
pub fn append_event<S>(store: &S, event: FeedbackEvent) -> Result<(), FeedbackError>
where
    S: KeyValueStore + ?Sized,
{
    let mut entries = match read_raw(store)? {
        Some(raw) => serde_json::from_str::<Vec<Value>>(&raw).map_err(|source| {
            FeedbackError::Corrupt {
                key: LOG_KEY.to_string(),
                source,
            }
        })?,
        None => Vec::new(),
    };
    let encode_err = |source: serde_json::Error| FeedbackError::Encode {
        key: LOG_KEY.to_string(),
        source,
    };
    entries.push(serde_json::to_value(&event).map_err(encode_err)?);
    let encoded = serde_json::to_string(&entries).map_err(encode_err)?;
    store
        .set(LOG_KEY, &encoded)
        .map_err(|source| FeedbackError::StoreWrite {
            key: LOG_KEY.to_string(),
            source,
        })
}

/// Wipes the entire log. Single entries are never removed.
pub fn clear_events<S>(store: &S) -> Result<(), FeedbackError>
where
    S: KeyValueStore + ?Sized,
{
    store
        .remove(LOG_KEY)
        .map_err(|source| FeedbackError::StoreWrite {
            key: LOG_KEY.to_string(),
            source,
        })?;
    info!("Feedback event log cleared");
    Ok(())
}
