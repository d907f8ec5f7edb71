use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a feedback comment, in characters.
pub const COMMENT_MAX_CHARS: usize = 500;

/// A visitor's binary helpful / not-helpful signal for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Positive,
    Negative,
}

impl Vote {
    pub fn as_str(self) -> &'static str {
        match self {
            Vote::Positive => "positive",
            Vote::Negative => "negative",
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only log entry, written every time a vote is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEvent {
    pub pathname: String,
    #[serde(rename = "type")]
    pub vote: Vote,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub client_signature: String, // user agent, auditing only
}

/// The visitor's current answer for one page, one per page and session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub vote: Vote,
    #[serde(default)]
    pub comment: String,
    pub submitted_at: DateTime<Utc>,
    pub finalized: bool,
}

/// Trims surrounding whitespace and caps the comment at `COMMENT_MAX_CHARS`.
pub fn normalize_comment(raw: &str) -> String {
    truncate_chars(raw.trim(), COMMENT_MAX_CHARS).to_string()
}

/// Returns the longest prefix of `text` holding at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
