//! Host-side sessions: one collector per client, driven over HTTP.
//!
//! Each session owns its own page router; the client reports navigation and
//! the collector follows through its subscription like it would in a page.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::anyhow;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::feedback::collector::{CollectorOptions, FeedbackCollector, PendingSubmission};
use crate::feedback::navigation::PageRouter;
use crate::store::SharedStore;

pub struct PageSession {
    router: PageRouter,
    collector: FeedbackCollector<SharedStore>,
}

impl PageSession {
    pub fn start(store: SharedStore, options: CollectorOptions, pathname: &str) -> Self {
        let router = PageRouter::new(pathname);
        let collector = FeedbackCollector::start(store, options, &router);
        Self { router, collector }
    }

    /// Announces a page change and lets the collector pick it up.
    pub fn navigate(&mut self, pathname: &str) -> bool {
        self.router.navigate(pathname) && self.collector.sync_navigation()
    }

    pub fn collector(&self) -> &FeedbackCollector<SharedStore> {
        &self.collector
    }

    pub fn collector_mut(&mut self) -> &mut FeedbackCollector<SharedStore> {
        &mut self.collector
    }

    pub fn end(self) {
        self.collector.stop();
    }
}

pub type SharedSession = Arc<Mutex<PageSession>>;

struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

/// Live sessions by id. Sessions not touched for the configured idle time
/// are dropped by `evict_idle`; a client coming back after that starts a
/// fresh session that reads its records from the store.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Entry>>>,
}

impl SessionRegistry {
    fn entries(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Entry>>, AppError> {
        self.sessions
            .lock()
            .map_err(|_| AppError::Internal(anyhow!("session registry lock poisoned")))
    }

    pub fn get(&self, id: Uuid) -> Result<SharedSession, AppError> {
        let mut entries = self.entries()?;
        let entry = entries
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        entry.last_seen = Instant::now();
        Ok(entry.session.clone())
    }

    /// Returns the session, starting it with `start` when it does not exist.
    /// The flag tells whether it was just started.
    pub fn get_or_start(
        &self,
        id: Uuid,
        start: impl FnOnce() -> PageSession,
    ) -> Result<(SharedSession, bool), AppError> {
        let mut entries = self.entries()?;
        if let Some(existing) = entries.get_mut(&id) {
            existing.last_seen = Instant::now();
            return Ok((existing.session.clone(), false));
        }
        let session = Arc::new(Mutex::new(start()));
        entries.insert(
            id,
            Entry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        info!("Feedback session {id} started ({} active)", entries.len());
        Ok((session, true))
    }

    pub fn end(&self, id: Uuid) -> Result<(), AppError> {
        let entry = self
            .entries()?
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        release(id, entry.session);
        info!("Feedback session {id} ended");
        Ok(())
    }

    /// Ends every session idle for longer than `max_idle`. Returns how many
    /// were dropped.
    pub fn evict_idle(&self, max_idle: Duration) -> Result<usize, AppError> {
        let now = Instant::now();
        let expired: Vec<(Uuid, Entry)> = {
            let mut entries = self.entries()?;
            let ids: Vec<Uuid> = entries
                .iter()
                .filter(|(_, entry)| now.duration_since(entry.last_seen) > max_idle)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| entries.remove(&id).map(|entry| (id, entry)))
                .collect()
        };
        let evicted = expired.len();
        for (id, entry) in expired {
            release(id, entry.session);
        }
        if evicted > 0 {
            info!("Evicted {evicted} idle feedback sessions ({} active)", self.len()?);
        }
        Ok(evicted)
    }

    pub fn len(&self) -> Result<usize, AppError> {
        Ok(self.entries()?.len())
    }
}

fn release(id: Uuid, session: SharedSession) {
    match Arc::try_unwrap(session) {
        Ok(mutex) => {
            if let Ok(session) = mutex.into_inner() {
                session.end();
            }
        }
        // an in-flight request still holds it; released on its last drop
        Err(_) => debug!("Session {id} still in use; released by its last holder"),
    }
}

/// Periodically evicts idle sessions. Runs until the task is dropped.
pub async fn sweep_idle_sessions(registry: SessionRegistry, max_idle: Duration) {
    let period = max_idle.clamp(Duration::from_secs(1), Duration::from_secs(60));
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        if let Err(e) = registry.evict_idle(max_idle) {
            warn!("Session sweep failed: {e}");
        }
    }
}

pub fn lock(session: &SharedSession) -> Result<MutexGuard<'_, PageSession>, AppError> {
    session
        .lock()
        .map_err(|_| AppError::Internal(anyhow!("session lock poisoned")))
}

/// Waits out the submission latency without holding the session lock, then
/// completes it unless the session moved on.
pub async fn settle(session: &SharedSession, pending: PendingSubmission) -> Result<bool, AppError> {
    tokio::time::sleep(pending.latency()).await;
    let mut guard = lock(session)?;
    Ok(guard.collector_mut().complete_submission(pending))
}
