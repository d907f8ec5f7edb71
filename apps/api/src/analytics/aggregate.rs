use std::collections::HashMap;

use serde::Serialize;

use crate::models::feedback::{FeedbackEvent, Vote};

/// Number of events in the recent-activity feed.
pub const RECENT_LIMIT: usize = 10;

/// Presentation band for a satisfaction percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SatisfactionBand {
    Excellent, // ≥ 80
    Good,      // ≥ 60
    Fair,      // ≥ 40
    Poor,
}

impl SatisfactionBand {
    pub fn classify(percent: f64) -> Self {
        if percent >= 80.0 {
            SatisfactionBand::Excellent
        } else if percent >= 60.0 {
            SatisfactionBand::Good
        } else if percent >= 40.0 {
            SatisfactionBand::Fair
        } else {
            SatisfactionBand::Poor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SatisfactionBand::Excellent => "excellent",
            SatisfactionBand::Good => "good",
            SatisfactionBand::Fair => "fair",
            SatisfactionBand::Poor => "poor",
        }
    }
}

/// Per-page tally derived from the event log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStat {
    pub pathname: String,
    pub positive_count: u64,
    pub negative_count: u64,
    pub total_count: u64,
    pub satisfaction_percent: f64,
    pub band: SatisfactionBand,
}

/// Counts across every page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub positive_count: u64,
    pub negative_count: u64,
    pub total_count: u64,
    pub satisfaction_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub stats: Vec<PageStat>,
    pub recent: Vec<FeedbackEvent>,
    pub totals: Totals,
}

/// `positive / total * 100`, and 0 for an empty tally.
pub fn satisfaction_percent(positive: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        positive as f64 / total as f64 * 100.0
    }
}

#[derive(Default)]
struct Tally {
    positive: u64,
    negative: u64,
}

impl Tally {
    fn add(&mut self, vote: Vote) {
        match vote {
            Vote::Positive => self.positive += 1,
            Vote::Negative => self.negative += 1,
        }
    }
}

/// Reduces the log into page stats (busiest page first, then by pathname),
/// overall totals, and the newest `RECENT_LIMIT` events, newest first.
pub fn summarize(events: &[FeedbackEvent]) -> AnalyticsReport {
    let mut pages: HashMap<&str, Tally> = HashMap::new();
    let mut overall = Tally::default();
    for event in events {
        pages.entry(event.pathname.as_str()).or_default().add(event.vote);
        overall.add(event.vote);
    }

    let mut stats: Vec<PageStat> = pages
        .into_iter()
        .map(|(pathname, tally)| {
            let total = tally.positive + tally.negative;
            let satisfaction = satisfaction_percent(tally.positive, total);
            PageStat {
                pathname: pathname.to_string(),
                positive_count: tally.positive,
                negative_count: tally.negative,
                total_count: total,
                satisfaction_percent: satisfaction,
                band: SatisfactionBand::classify(satisfaction),
            }
        })
        .collect();
    stats.sort_by(|a, b| {
        b.total_count
            .cmp(&a.total_count)
            .then_with(|| a.pathname.cmp(&b.pathname))
    });

    // log order is append order, so the tail is the newest
    let recent = events.iter().rev().take(RECENT_LIMIT).cloned().collect();

    let overall_total = overall.positive + overall.negative;
    AnalyticsReport {
        stats,
        recent,
        totals: Totals {
            positive_count: overall.positive,
            negative_count: overall.negative,
            total_count: overall_total,
            satisfaction_percent: satisfaction_percent(overall.positive, overall_total),
        },
    }
}
