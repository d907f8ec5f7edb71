//! Page feedback: per-page vote collection backed by the shared store.
//!
//! Two kinds of data live in the store:
//! - one `FeedbackRecord` per page and session, the visitor's current answer
//! - the append-only `FeedbackEvent` log that the analytics read
//!
//! The collector is the only writer of both.

use thiserror::Error;

use crate::store::StoreError;

pub mod collector;
pub mod handlers;
pub mod log;
pub mod navigation;
pub mod record;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("could not read '{key}': {source}")]
    StoreRead {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("could not save '{key}': {source}")]
    StoreWrite {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("'{key}' holds unreadable data: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
