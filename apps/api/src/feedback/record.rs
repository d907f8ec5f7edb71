use std::fmt;

use tracing::warn;
use uuid::Uuid;

use crate::feedback::FeedbackError;
use crate::models::feedback::FeedbackRecord;
use crate::store::KeyValueStore;

/// The storage scope a visitor's per-page records belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordScope {
    /// The store itself is the session, as with browser local storage.
    Local,
    /// Several sessions share one store; keys carry the session id.
    Session(Uuid),
}

impl RecordScope {
    pub fn record_key(&self, pathname: &str) -> String {
        match self {
            RecordScope::Local => format!("feedback:{pathname}"),
            RecordScope::Session(id) => format!("session:{id}:feedback:{pathname}"),
        }
    }
}

impl fmt::Display for RecordScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordScope::Local => f.write_str("local"),
            RecordScope::Session(id) => write!(f, "session {id}"),
        }
    }
}

/// Reads the record under `key`. Missing, unreadable, and malformed records
/// all come back as `None`; the latter two are logged.
pub fn load_record<S>(store: &S, key: &str) -> Option<FeedbackRecord>
where
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!("Could not read feedback record '{key}': {e}");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("Ignoring malformed feedback record '{key}': {e}");
            None
        }
    }
}

/// Writes `record` under `key`, replacing whatever was there.
pub fn save_record<S>(store: &S, key: &str, record: &FeedbackRecord) -> Result<(), FeedbackError>
where
    S: KeyValueStore + ?Sized,
{
    let encoded = serde_json::to_string(record).map_err(|source| FeedbackError::Encode {
        key: key.to_string(),
        source,
    })?;
    store
        .set(key, &encoded)
        .map_err(|source| FeedbackError::StoreWrite {
            key: key.to_string(),
            source,
        })
}

pub fn delete_record<S>(store: &S, key: &str) -> Result<(), FeedbackError>
where
    S: KeyValueStore + ?Sized,
{
    store
        .remove(key)
        .map_err(|source| FeedbackError::StoreWrite {
            key: key.to_string(),
            source,
        })
}
