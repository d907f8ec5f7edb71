//! Feedback analytics: read-and-reduce over the vote event log.
//!
//! Every load recomputes from the raw log; nothing is cached between loads.

pub mod aggregate;
pub mod confirm;
pub mod handlers;
pub mod render;

use tracing::info;

use crate::analytics::aggregate::{summarize, AnalyticsReport};
use crate::analytics::confirm::{Confirmation, CLEAR_PROMPT};
use crate::feedback::log::{clear_events, read_events};
use crate::feedback::FeedbackError;
use crate::store::KeyValueStore;

/// Result of a clear request.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClearOutcome {
    pub cleared: bool,
    pub report: AnalyticsReport,
}

pub struct FeedbackAnalytics<S> {
    store: S,
}

impl<S: KeyValueStore> FeedbackAnalytics<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<AnalyticsReport, FeedbackError> {
        let events = read_events(&self.store)?;
        Ok(summarize(&events))
    }

    /// Wipes the event log once `confirmation` agrees. Per-page records are
    /// left alone. Declining leaves the log untouched.
    pub fn clear<C: Confirmation + ?Sized>(
        &self,
        confirmation: &C,
    ) -> Result<ClearOutcome, FeedbackError> {
        if !confirmation.confirm(CLEAR_PROMPT) {
            info!("Feedback analytics clear declined");
            return Ok(ClearOutcome {
                cleared: false,
                report: self.load()?,
            });
        }
        clear_events(&self.store)?;
        Ok(ClearOutcome {
            cleared: true,
            report: self.load()?,
        })
    }
}
