//! Change notification for a single [`Library`](crate::store::Library).
//!
//! Each subscriber owns an unbounded channel. Publishing only enqueues, so
//! subscriber code never runs inside the mutating call; it picks changes up
//! on its own turn of the event loop, one per mutation, in commit order.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::models::{Category, MediaKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChangeKind {
    Added { media: MediaKind, id: u64 },
    Updated { media: MediaKind, id: u64 },
    Deleted { media: MediaKind, id: u64 },
    Reordered { media: MediaKind, category: Category },
    GoalChanged { media: MediaKind, value: u32 },
}

/// Notification token delivered to subscribers after a committed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Change {
    /// Store version after the mutation; strictly increasing per store.
    pub version: u64,
    pub kind: ChangeKind,
}

#[derive(Default)]
struct Registry {
    next_subscriber: u64,
    version: u64,
    subscribers: HashMap<u64, UnboundedSender<Change>>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub struct ChangeNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = lock(&self.registry);
        let id = registry.next_subscriber;
        registry.next_subscriber += 1;
        registry.subscribers.insert(id, tx);
        log::debug!("Subscriber {} registered", id);
        Subscription {
            id,
            rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Bumps the version and queues one change for every live subscriber.
    pub fn publish(&self, kind: ChangeKind) -> u64 {
        let mut registry = lock(&self.registry);
        registry.version += 1;
        let change = Change {
            version: registry.version,
            kind,
        };
        registry.subscribers.retain(|id, tx| {
            let alive = tx.send(change).is_ok();
            if !alive {
                log::debug!("Dropping closed subscriber {}", id);
            }
            alive
        });
        change.version
    }

    pub fn version(&self) -> u64 {
        lock(&self.registry).version
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).subscribers.len()
    }
}

/// Receiving end of a subscription. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    rx: UnboundedReceiver<Change>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Waits for the next change. Returns `None` once the store is gone and
    /// every queued change has been delivered.
    pub async fn recv(&mut self) -> Option<Change> {
        self.rx.recv().await
    }

    /// Next queued change without waiting.
    pub fn try_recv(&mut self) -> Option<Change> {
        match self.rx.try_recv() {
            Ok(change) => Some(change),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Everything queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<Change> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).subscribers.remove(&self.id);
            log::debug!("Subscriber {} unregistered", self.id);
        }
    }
}
