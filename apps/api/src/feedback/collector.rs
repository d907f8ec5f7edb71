//! Feedback Collector: the per-page vote state machine.
//!
//! ```text
//! idle ──select_vote──▶ positive | negative ──submit──▶ (submitting) ──▶ submitted
//!   ▲                        │    ▲ switch                                 │
//!   └────────cancel──────────┘    └──────                                  │
//!   └──────────────────────────────reset───────────────────────────────────┘
//! ```
//!
//! Operations are reached through `FeedbackCollector::view()`, which hands out
//! a view for the current state. Each view only carries the operations that
//! state allows, so an invalid transition cannot be expressed.
//!
//! Selecting a vote appends to the event log right away, before submission.
//! A visitor who votes and leaves still counts in the analytics while having
//! no finalized record.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::feedback::log::append_event;
use crate::feedback::navigation::{Navigator, PageSubscription};
use crate::feedback::record::{delete_record, load_record, save_record, RecordScope};
use crate::feedback::FeedbackError;
use crate::models::feedback::{
    normalize_comment, truncate_chars, FeedbackEvent, FeedbackRecord, Vote, COMMENT_MAX_CHARS,
};
use crate::store::KeyValueStore;

/// Default minimum time between a submit and the `submitted` state.
pub const DEFAULT_SUBMIT_LATENCY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct CollectorOptions {
    /// When false, selecting a vote submits it at once with no comment.
    pub requires_comment: bool,
    pub submit_latency: Duration,
    pub client_signature: String,
    pub scope: RecordScope,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            requires_comment: true,
            submit_latency: DEFAULT_SUBMIT_LATENCY,
            client_signature: String::new(),
            scope: RecordScope::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackState {
    Idle,
    Positive,
    Negative,
    Submitted,
}

impl From<Vote> for FeedbackState {
    fn from(vote: Vote) -> Self {
        match vote {
            Vote::Positive => FeedbackState::Positive,
            Vote::Negative => FeedbackState::Negative,
        }
    }
}

/// A submission whose record is already written and which is waiting out
/// the minimum latency before the collector shows `submitted`.
#[must_use = "a pending submission does nothing until it is settled"]
#[derive(Debug)]
pub struct PendingSubmission {
    instance: Uuid,
    epoch: u64,
    pathname: String,
    latency: Duration,
}

impl PendingSubmission {
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Waits out the latency, then completes on `collector` unless the page
    /// changed in the meantime. Hosts that share the collector behind a lock
    /// use `sessions::settle` instead.
    #[allow(dead_code)]
    pub async fn settle<S: KeyValueStore>(self, collector: &mut FeedbackCollector<S>) -> bool {
        tokio::time::sleep(self.latency).await;
        collector.complete_submission(self)
    }
}

#[must_use]
#[derive(Debug)]
pub enum VoteOutcome {
    /// The vote is pending and the comment box is open.
    AwaitingComment,
    /// Comments are not required, so the vote was submitted straight away.
    Submitting(PendingSubmission),
}

/// Presentation snapshot of a collector.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSnapshot {
    pub pathname: String,
    pub state: FeedbackState,
    pub submitting: bool,
    pub comment: String,
    pub comment_limit: usize,
    pub requires_comment: bool,
    pub error: Option<String>,
    pub record: Option<FeedbackRecord>,
}

pub struct FeedbackCollector<S> {
    store: S,
    options: CollectorOptions,
    subscription: Option<PageSubscription>,
    instance: Uuid,
    epoch: u64,
    pathname: String,
    state: FeedbackState,
    comment: String,
    submitting: bool,
    error: Option<String>,
}

impl<S: KeyValueStore> FeedbackCollector<S> {
    /// Subscribes to `navigator` and initializes for its current page.
    /// The subscription lives as long as the collector.
    pub fn start<N: Navigator + ?Sized>(store: S, options: CollectorOptions, navigator: &N) -> Self {
        let subscription = navigator.subscribe();
        let mut collector = Self {
            store,
            options,
            subscription: Some(subscription),
            instance: Uuid::new_v4(),
            epoch: 0,
            pathname: String::new(),
            state: FeedbackState::Idle,
            comment: String::new(),
            submitting: false,
            error: None,
        };
        collector.load_page(navigator.current_path());
        collector
    }

    /// Releases the page subscription. Pending submissions die with the
    /// collector.
    pub fn stop(mut self) {
        self.subscription.take();
        debug!(
            "Feedback collector stopped on {} ({})",
            self.pathname, self.options.scope
        );
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn state(&self) -> FeedbackState {
        self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The stored record for the current page, if any.
    pub fn record(&self) -> Option<FeedbackRecord> {
        load_record(&self.store, &self.record_key())
    }

    pub fn snapshot(&self) -> FeedbackSnapshot {
        FeedbackSnapshot {
            pathname: self.pathname().to_string(),
            state: self.state(),
            submitting: self.is_submitting(),
            comment: self.comment().to_string(),
            comment_limit: COMMENT_MAX_CHARS,
            requires_comment: self.options.requires_comment,
            error: self.error().map(str::to_string),
            record: self.record(),
        }
    }

    /// Applies a pending page change, if any. Returns whether the page changed.
    pub fn sync_navigation(&mut self) -> bool {
        let next = self.subscription.as_mut().and_then(PageSubscription::poll_change);
        match next {
            Some(pathname) => {
                self.load_page(pathname);
                true
            }
            None => false,
        }
    }

    /// Waits for the next page change and reinitializes for it. Returns
    /// false once the navigator is gone. The HTTP host polls with
    /// `sync_navigation` instead.
    #[allow(dead_code)]
    pub async fn follow_navigation(&mut self) -> bool {
        let next = match self.subscription.as_mut() {
            Some(subscription) => subscription.changed().await,
            None => None,
        };
        match next {
            Some(pathname) => {
                self.load_page(pathname);
                true
            }
            None => false,
        }
    }

    pub fn view(&mut self) -> PageView<'_, S> {
        match (self.state, self.submitting) {
            (FeedbackState::Idle, _) => PageView::Idle(IdleView { collector: self }),
            (FeedbackState::Submitted, _) => PageView::Submitted(SubmittedView { collector: self }),
            (FeedbackState::Positive, true) => PageView::Submitting(Vote::Positive),
            (FeedbackState::Negative, true) => PageView::Submitting(Vote::Negative),
            (FeedbackState::Positive, false) => PageView::Voted(VotedView {
                collector: self,
                vote: Vote::Positive,
            }),
            (FeedbackState::Negative, false) => PageView::Voted(VotedView {
                collector: self,
                vote: Vote::Negative,
            }),
        }
    }

    /// Finishes a submission once its latency has elapsed. A submission
    /// started on another page, or by another collector, is discarded.
    pub fn complete_submission(&mut self, pending: PendingSubmission) -> bool {
        if pending.instance != self.instance || pending.epoch != self.epoch || !self.submitting {
            debug!(
                "Discarding stale submission for {} (now on {})",
                pending.pathname, self.pathname
            );
            return false;
        }
        self.submitting = false;
        self.state = FeedbackState::Submitted;
        true
    }

    fn record_key(&self) -> String {
        self.options.scope.record_key(&self.pathname)
    }

    fn load_page(&mut self, pathname: String) {
        self.epoch += 1;
        let key = self.options.scope.record_key(&pathname);
        let finalized = load_record(&self.store, &key).is_some_and(|r| r.finalized);
        self.state = if finalized {
            FeedbackState::Submitted
        } else {
            FeedbackState::Idle
        };
        self.comment.clear();
        self.submitting = false;
        self.error = None;
        debug!("Feedback collector on {pathname}: {:?}", self.state);
        self.pathname = pathname;
    }

    fn remember<T>(&mut self, result: Result<T, FeedbackError>) -> Result<T, FeedbackError> {
        match &result {
            Ok(_) => self.error = None,
            Err(e) => self.error = Some(e.to_string()),
        }
        result
    }

    fn record_vote(&mut self, vote: Vote) -> Result<VoteOutcome, FeedbackError> {
        let event = FeedbackEvent {
            pathname: self.pathname.clone(),
            vote,
            timestamp: Utc::now(),
            client_signature: self.options.client_signature.clone(),
        };
        let appended = append_event(&self.store, event);
        self.remember(appended)?;
        self.state = vote.into();
        info!("Vote {vote} recorded for {}", self.pathname);

        if self.options.requires_comment {
            Ok(VoteOutcome::AwaitingComment)
        } else {
            self.begin_submit(vote, None).map(VoteOutcome::Submitting)
        }
    }

    fn begin_submit(
        &mut self,
        vote: Vote,
        comment: Option<&str>,
    ) -> Result<PendingSubmission, FeedbackError> {
        if let Some(comment) = comment {
            self.set_comment(comment);
        }
        let record = FeedbackRecord {
            vote,
            comment: normalize_comment(&self.comment),
            submitted_at: Utc::now(),
            finalized: true,
        };
        let saved = save_record(&self.store, &self.record_key(), &record);
        self.remember(saved)?;
        self.submitting = true;
        info!("Feedback submitted for {} ({vote})", self.pathname);

        Ok(PendingSubmission {
            instance: self.instance,
            epoch: self.epoch,
            pathname: self.pathname.clone(),
            latency: self.options.submit_latency,
        })
    }

    fn set_comment(&mut self, text: &str) -> bool {
        let kept = truncate_chars(text, COMMENT_MAX_CHARS);
        let truncated = kept.len() < text.len();
        self.comment = kept.to_string();
        truncated
    }

    fn clear_answer(&mut self) -> Result<(), FeedbackError> {
        let deleted = delete_record(&self.store, &self.record_key());
        self.remember(deleted)?;
        self.state = FeedbackState::Idle;
        self.comment.clear();
        Ok(())
    }
}

/// The collector seen through its current state.
pub enum PageView<'a, S> {
    Idle(IdleView<'a, S>),
    Voted(VotedView<'a, S>),
    /// The minimum-latency window; nothing can be done until it ends.
    Submitting(#[allow(dead_code)] Vote),
    Submitted(SubmittedView<'a, S>),
}

impl<S> PageView<'_, S> {
    pub fn name(&self) -> &'static str {
        match self {
            PageView::Idle(_) => "idle",
            PageView::Voted(v) => v.vote().as_str(),
            PageView::Submitting(_) => "submitting",
            PageView::Submitted(_) => "submitted",
        }
    }
}

pub struct IdleView<'a, S> {
    collector: &'a mut FeedbackCollector<S>,
}

impl<S: KeyValueStore> IdleView<'_, S> {
    pub fn select_vote(self, vote: Vote) -> Result<VoteOutcome, FeedbackError> {
        self.collector.record_vote(vote)
    }
}

pub struct VotedView<'a, S> {
    collector: &'a mut FeedbackCollector<S>,
    vote: Vote,
}

impl<S> VotedView<'_, S> {
    pub fn vote(&self) -> Vote {
        self.vote
    }

    #[allow(dead_code)]
    pub fn comment(&self) -> &str {
        &self.collector.comment
    }
}

impl<S: KeyValueStore> VotedView<'_, S> {
    /// Replaces the draft comment, keeping at most `COMMENT_MAX_CHARS`
    /// characters. Returns whether input was cut off.
    pub fn set_comment(&mut self, text: &str) -> bool {
        self.collector.set_comment(text)
    }

    /// Switches the pending vote. Logged like any other selection.
    pub fn select_vote(self, vote: Vote) -> Result<VoteOutcome, FeedbackError> {
        self.collector.record_vote(vote)
    }

    /// Writes the finalized record. On failure the vote stays pending and
    /// the error is kept on the collector.
    pub fn submit(self, comment: Option<&str>) -> Result<PendingSubmission, FeedbackError> {
        self.collector.begin_submit(self.vote, comment)
    }

    /// Drops the pending vote and the page's record.
    pub fn cancel(self) -> Result<(), FeedbackError> {
        self.collector.clear_answer()
    }
}

pub struct SubmittedView<'a, S> {
    collector: &'a mut FeedbackCollector<S>,
}

impl<S: KeyValueStore> SubmittedView<'_, S> {
    #[allow(dead_code)]
    pub fn record(&self) -> Option<FeedbackRecord> {
        self.collector.record()
    }

    /// Erases the page's record. The event log keeps its history.
    pub fn reset(self) -> Result<(), FeedbackError> {
        self.collector.clear_answer()?;
        info!("Feedback reset for {}", self.collector.pathname);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::log::{read_events, LOG_KEY};
    use crate::feedback::navigation::PageRouter;
    use crate::store::{MemoryStore, StoreError};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Memory store whose record writes can be made to fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_records: AtomicBool,
        fail_log: AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            let failing = if key == LOG_KEY {
                &self.fail_log
            } else {
                &self.fail_records
            };
            if failing.load(Ordering::SeqCst) {
                return Err(StoreError::Io(std::io::Error::other("quota exceeded")));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn options() -> CollectorOptions {
        CollectorOptions {
            client_signature: "test-agent".to_string(),
            ..CollectorOptions::default()
        }
    }

    fn select(collector: &mut FeedbackCollector<MemoryStore>, vote: Vote) -> VoteOutcome {
        match collector.view() {
            PageView::Idle(idle) => idle.select_vote(vote).unwrap(),
            PageView::Voted(voted) => voted.select_vote(vote).unwrap(),
            other => panic!("cannot vote from {}", other.name()),
        }
    }

    fn submit(collector: &mut FeedbackCollector<MemoryStore>, comment: Option<&str>) -> PendingSubmission {
        match collector.view() {
            PageView::Voted(voted) => voted.submit(comment).unwrap(),
            other => panic!("cannot submit from {}", other.name()),
        }
    }

    #[test]
    fn test_starts_idle_without_record() {
        let router = PageRouter::new("/docs/intro");
        let collector = FeedbackCollector::start(MemoryStore::new(), options(), &router);
        assert_eq!(collector.pathname(), "/docs/intro");
        assert_eq!(collector.state(), FeedbackState::Idle);
    }

    #[test]
    fn test_starts_submitted_with_finalized_record() {
        let store = MemoryStore::new();
        store
            .set(
                "feedback:/docs/intro",
                r#"{"vote":"positive","comment":"","submittedAt":"2024-01-01T00:00:00Z","finalized":true}"#,
            )
            .unwrap();
        let router = PageRouter::new("/docs/intro");
        let collector = FeedbackCollector::start(store, options(), &router);
        assert_eq!(collector.state(), FeedbackState::Submitted);
    }

    #[test]
    fn test_unfinalized_or_corrupt_record_starts_idle() {
        let store = MemoryStore::new();
        store
            .set(
                "feedback:/a",
                r#"{"vote":"negative","comment":"","submittedAt":"2024-01-01T00:00:00Z","finalized":false}"#,
            )
            .unwrap();
        store.set("feedback:/b", "garbage").unwrap();

        let router = PageRouter::new("/a");
        let mut collector = FeedbackCollector::start(store, options(), &router);
        assert_eq!(collector.state(), FeedbackState::Idle);

        router.navigate("/b");
        assert!(collector.sync_navigation());
        assert_eq!(collector.state(), FeedbackState::Idle);
    }

    #[test]
    fn test_select_vote_logs_event_immediately() {
        let store = MemoryStore::new();
        let router = PageRouter::new("/a");
        let mut collector = FeedbackCollector::start(store.clone(), options(), &router);

        assert!(matches!(select(&mut collector, Vote::Positive), VoteOutcome::AwaitingComment));
        assert_eq!(collector.state(), FeedbackState::Positive);

        let events = read_events(&store).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].pathname, "/a");
        assert_eq!(events[0].vote, Vote::Positive);
        assert_eq!(events[0].client_signature, "test-agent");
        // intent only, nothing finalized yet
        assert_eq!(collector.record(), None);
    }

    #[test]
    fn test_switching_vote_appends_second_event() {
        let store = MemoryStore::new();
        let router = PageRouter::new("/a");
        let mut collector = FeedbackCollector::start(store.clone(), options(), &router);

        let _ = select(&mut collector, Vote::Positive);
        let _ = select(&mut collector, Vote::Negative);
        assert_eq!(collector.state(), FeedbackState::Negative);

        let votes: Vec<_> = read_events(&store).unwrap().iter().map(|e| e.vote).collect();
        assert_eq!(votes, vec![Vote::Positive, Vote::Negative]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_writes_record_then_settles() {
        let store = MemoryStore::new();
        let router = PageRouter::new("/a");
        let mut collector = FeedbackCollector::start(store, options(), &router);

        let _ = select(&mut collector, Vote::Negative);
        let pending = submit(&mut collector, Some("  missing an example  "));

        // durable before the delay
        let record = collector.record().unwrap();
        assert_eq!(record.vote, Vote::Negative);
        assert_eq!(record.comment, "missing an example");
        assert!(record.finalized);

        assert!(collector.is_submitting());
        assert!(matches!(collector.view(), PageView::Submitting(Vote::Negative)));
        assert_eq!(pending.latency(), DEFAULT_SUBMIT_LATENCY);

        assert!(pending.settle(&mut collector).await);
        assert_eq!(collector.state(), FeedbackState::Submitted);
        assert!(!collector.is_submitting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_deletes_record_but_keeps_log() {
        let store = MemoryStore::new();
        let router = PageRouter::new("/a");
        let mut collector = FeedbackCollector::start(store.clone(), options(), &router);

        let _ = select(&mut collector, Vote::Positive);
        let pending = submit(&mut collector, None);
        assert!(pending.settle(&mut collector).await);

        match collector.view() {
            PageView::Submitted(submitted) => {
                assert_eq!(submitted.record().map(|r| r.vote), Some(Vote::Positive));
                submitted.reset().unwrap();
            }
            other => panic!("expected submitted, got {}", other.name()),
        }

        assert_eq!(collector.state(), FeedbackState::Idle);
        assert_eq!(store.get("feedback:/a").unwrap(), None);
        let events = read_events(&store).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].vote, Vote::Positive);
    }

    #[test]
    fn test_no_comment_mode_submits_on_select() {
        let store = MemoryStore::new();
        let router = PageRouter::new("/a");
        let opts = CollectorOptions {
            requires_comment: false,
            ..options()
        };
        let mut collector = FeedbackCollector::start(store, opts, &router);

        let outcome = select(&mut collector, Vote::Negative);
        assert!(matches!(outcome, VoteOutcome::Submitting(_)));
        assert!(matches!(collector.view(), PageView::Submitting(Vote::Negative)));

        let record = collector.record().unwrap();
        assert_eq!(record.vote, Vote::Negative);
        assert_eq!(record.comment, "");
        assert!(record.finalized);
    }

    #[test]
    fn test_log_failure_keeps_idle_state() {
        let store = std::sync::Arc::new(FlakyStore::default());
        store.fail_log.store(true, Ordering::SeqCst);
        let router = PageRouter::new("/a");
        let mut collector = FeedbackCollector::start(store.clone(), options(), &router);

        match collector.view() {
            PageView::Idle(idle) => assert!(idle.select_vote(Vote::Negative).is_err()),
            other => panic!("expected idle, got {}", other.name()),
        }

        assert_eq!(collector.state(), FeedbackState::Idle);
        assert!(collector.error().unwrap().contains(LOG_KEY));
        assert_eq!(store.get(LOG_KEY).unwrap(), None);
        assert!(collector.record().is_none());
    }

    #[test]
    fn test_write_failure_keeps_pending_vote() {
        let store = std::sync::Arc::new(FlakyStore::default());
        let router = PageRouter::new("/a");
        let mut collector = FeedbackCollector::start(store.clone(), options(), &router);

        match collector.view() {
            PageView::Idle(idle) => {
                let _ = idle.select_vote(Vote::Positive).unwrap();
            }
            other => panic!("expected idle, got {}", other.name()),
        }

        store.fail_records.store(true, Ordering::SeqCst);
        match collector.view() {
            PageView::Voted(voted) => assert!(voted.submit(Some("nice")).is_err()),
            other => panic!("expected voted, got {}", other.name()),
        }

        assert_eq!(collector.state(), FeedbackState::Positive);
        assert!(!collector.is_submitting());
        assert!(collector.error().unwrap().contains("quota exceeded"));

        store.fail_records.store(false, Ordering::SeqCst);
        match collector.view() {
            PageView::Voted(voted) => {
                let _pending = voted.submit(None).unwrap();
            }
            other => panic!("expected voted, got {}", other.name()),
        }
        assert_eq!(collector.error(), None);
        assert_eq!(collector.record().unwrap().comment, "nice");
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_discards_pending_submission() {
        let store = MemoryStore::new();
        let router = PageRouter::new("/a");
        let mut collector = FeedbackCollector::start(store, options(), &router);

        let _ = select(&mut collector, Vote::Positive);
        let pending = submit(&mut collector, None);

        router.navigate("/b");
        assert!(collector.sync_navigation());
        assert_eq!(collector.pathname(), "/b");

        assert!(!pending.settle(&mut collector).await);
        assert_eq!(collector.state(), FeedbackState::Idle);
        assert!(collector.record().is_none());

        // the record written before the page change stays
        router.navigate("/a");
        assert!(collector.sync_navigation());
        assert_eq!(collector.state(), FeedbackState::Submitted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_navigation_reloads_page() {
        let store = MemoryStore::new();
        let router = PageRouter::new("/a");
        let mut collector = FeedbackCollector::start(store, options(), &router);
        let _ = select(&mut collector, Vote::Negative);

        router.navigate("/b");
        assert!(collector.follow_navigation().await);
        assert_eq!(collector.pathname(), "/b");
        assert_eq!(collector.state(), FeedbackState::Idle);
        assert_eq!(collector.comment(), "");
    }

    #[test]
    fn test_pending_from_other_collector_is_rejected() {
        let router = PageRouter::new("/a");
        let mut first = FeedbackCollector::start(MemoryStore::new(), options(), &router);
        let mut second = FeedbackCollector::start(MemoryStore::new(), options(), &router);

        let _ = select(&mut first, Vote::Positive);
        let _ = select(&mut second, Vote::Positive);
        let pending = submit(&mut first, None);
        let _other = submit(&mut second, None);

        assert!(!second.complete_submission(pending));
        assert!(second.is_submitting());
    }

    #[test]
    fn test_stop_releases_subscription() {
        let router = PageRouter::new("/a");
        let collector = FeedbackCollector::start(MemoryStore::new(), options(), &router);
        assert_eq!(router.subscriber_count(), 1);
        collector.stop();
        assert_eq!(router.subscriber_count(), 0);

        let dropped = FeedbackCollector::start(MemoryStore::new(), options(), &router);
        assert_eq!(router.subscriber_count(), 1);
        drop(dropped);
        assert_eq!(router.subscriber_count(), 0);
    }

    #[test]
    fn test_comment_is_capped_at_limit() {
        let router = PageRouter::new("/a");
        let mut collector = FeedbackCollector::start(MemoryStore::new(), options(), &router);
        let _ = select(&mut collector, Vote::Positive);

        let long = "é".repeat(COMMENT_MAX_CHARS + 100);
        match collector.view() {
            PageView::Voted(mut voted) => {
                assert!(voted.set_comment(&long));
                assert_eq!(voted.comment().chars().count(), COMMENT_MAX_CHARS);
                assert!(!voted.set_comment("short"));
                assert_eq!(voted.comment(), "short");
            }
            other => panic!("expected voted, got {}", other.name()),
        }
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let store = MemoryStore::new();
        let router = PageRouter::new("/a");
        let mut collector = FeedbackCollector::start(store.clone(), options(), &router);
        let _ = select(&mut collector, Vote::Negative);

        match collector.view() {
            PageView::Voted(mut voted) => {
                voted.set_comment("draft");
                voted.cancel().unwrap();
            }
            other => panic!("expected voted, got {}", other.name()),
        }
        assert_eq!(collector.state(), FeedbackState::Idle);
        assert_eq!(collector.comment(), "");
        assert_eq!(read_events(&store).unwrap().len(), 1);
    }

    #[test]
    fn test_sessions_keep_separate_records() {
        let store = MemoryStore::new();
        let router = PageRouter::new("/a");
        let session = Uuid::new_v4();
        let opts = CollectorOptions {
            requires_comment: false,
            scope: RecordScope::Session(session),
            ..options()
        };
        let mut scoped = FeedbackCollector::start(store.clone(), opts, &router);
        let _ = select(&mut scoped, Vote::Positive);

        let local = FeedbackCollector::start(store.clone(), options(), &router);
        assert_eq!(local.state(), FeedbackState::Idle);
        assert!(store
            .get(&format!("session:{session}:feedback:/a"))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_snapshot_reports_state() {
        let router = PageRouter::new("/a");
        let mut collector = FeedbackCollector::start(MemoryStore::new(), options(), &router);
        let _ = select(&mut collector, Vote::Positive);

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.pathname, "/a");
        assert_eq!(snapshot.state, FeedbackState::Positive);
        assert_eq!(snapshot.comment_limit, COMMENT_MAX_CHARS);
        assert!(snapshot.requires_comment);
        assert!(snapshot.record.is_none());

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["state"], "positive");
        assert_eq!(value["commentLimit"], 500);

        match collector.view() {
            PageView::Voted(voted) => assert_eq!(voted.vote(), Vote::Positive),
            other => panic!("expected voted, got {}", other.name()),
        }
        assert_eq!(collector.view().name(), "positive");
    }
}
