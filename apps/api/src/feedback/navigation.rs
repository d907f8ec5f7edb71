//! Page-change notifications consumed by the collector.

use tokio::sync::watch;

/// The routing collaborator: knows the current page and announces changes.
pub trait Navigator {
    fn current_path(&self) -> String;
    fn subscribe(&self) -> PageSubscription;
}

/// A live subscription to page changes. Dropping it unsubscribes.
#[derive(Debug)]
pub struct PageSubscription {
    rx: watch::Receiver<String>,
}

impl PageSubscription {
    pub fn new(rx: watch::Receiver<String>) -> Self {
        Self { rx }
    }

    /// Returns the new pathname if the page changed since the last call.
    pub fn poll_change(&mut self) -> Option<String> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            // a closed router never announces anything again
            Ok(false) | Err(_) => None,
        }
    }

    /// Waits for the next page change. `None` once the router is gone.
    #[allow(dead_code)]
    pub async fn changed(&mut self) -> Option<String> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// In-process router. Navigating to the page already shown is not a change.
#[derive(Debug)]
pub struct PageRouter {
    tx: watch::Sender<String>,
}

impl PageRouter {
    pub fn new(initial: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(initial.into());
        Self { tx }
    }

    /// Moves to `pathname`; returns whether subscribers were notified.
    pub fn navigate(&self, pathname: &str) -> bool {
        self.tx.send_if_modified(|current| {
            if current == pathname {
                false
            } else {
                *current = pathname.to_string();
                true
            }
        })
    }

    #[allow(dead_code)]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Navigator for PageRouter {
    fn current_path(&self) -> String {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> PageSubscription {
        PageSubscription::new(self.tx.subscribe())
    }
}
