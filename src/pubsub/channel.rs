use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;
use tokio::runtime::Handle;
use tracing::{debug, trace};

use super::Subscriber;

/// Subscribers of one topic, keyed by subscriber id.
///
/// The map has its own lock, independent of the broker's topic registry
/// and of every other channel.
pub struct Channel<T> {
    topic: Arc<str>,
    subscribers: RwLock<HashMap<Arc<str>, Arc<Subscriber<T>>>>,
}

impl<T> Channel<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(topic: impl Into<Arc<str>>) -> Self {
        Self {
            topic: topic.into(),
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Inserts `subscriber`, replacing any previous one with the same id.
    pub fn register(
        &self,
        subscriber: Arc<Subscriber<T>>,
    ) -> Option<Arc<Subscriber<T>>> {
        let key: Arc<str> = Arc::from(subscriber.id());
        self.subscribers.write().insert(key, subscriber)
    }

    pub fn lookup(
        &self,
        id: &str,
    ) -> Option<Arc<Subscriber<T>>> {
        self.subscribers.read().get(id).cloned()
    }

    pub fn remove(
        &self,
        id: &str,
    ) -> Option<Arc<Subscriber<T>>> {
        self.subscribers.write().remove(id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }

    /// Fans `payload` out to every current subscriber.
    ///
    /// The subscriber list is copied under a short read lock; each entry then
    /// gets its own task on `runtime` which evicts the subscriber if its
    /// lease ran out and delivers otherwise. Returns without waiting for the
    /// tasks, so a full buffer only stalls its own delivery.
    ///
    /// `on_emptied` runs, with no channel lock held, when an eviction removed
    /// the last subscriber.
    pub fn route<F>(
        self: &Arc<Self>,
        runtime: &Handle,
        payload: T,
        on_emptied: F,
    ) -> usize
    where
        F: Fn(&Arc<Channel<T>>) + Clone + Send + 'static,
    {
        let snapshot: Vec<Arc<Subscriber<T>>> = self.subscribers.read().values().cloned().collect();
        let dispatched = snapshot.len();

        for subscriber in snapshot {
            let channel = Arc::clone(self);
            let payload = payload.clone();
            let on_emptied = on_emptied.clone();
            runtime.spawn(async move {
                match channel.evict_if_expired(&subscriber) {
                    Expiry::Live => subscriber.deliver(payload).await,
                    Expiry::Evicted { emptied: true } => on_emptied(&channel),
                    Expiry::Evicted { emptied: false } => {}
                }
            });
        }

        trace!(topic = %self.topic, dispatched, "payload routed");
        dispatched
    }

    /// Removes every subscriber whose lease has run out. Returns how many
    /// were removed.
    pub fn sweep_expired(&self) -> usize {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|id, subscriber| {
            let expired = subscriber.is_expired();
            if expired {
                debug!(topic = %self.topic, %id, "subscriber lease expired, evicted");
            }
            !expired
        });
        before - subscribers.len()
    }

    /// Opportunistic eviction on the delivery path.
    ///
    /// Only the exact handle is removed: a fresh subscriber registered under
    /// the same id in the meantime stays.
    fn evict_if_expired(
        &self,
        subscriber: &Arc<Subscriber<T>>,
    ) -> Expiry {
        if !subscriber.is_expired() {
            return Expiry::Live;
        }

        let mut subscribers = self.subscribers.write();
        let same_handle = subscribers
            .get(subscriber.id())
            .is_some_and(|current| Arc::ptr_eq(current, subscriber));
        if same_handle {
            subscribers.remove(subscriber.id());
            debug!(topic = %self.topic, id = subscriber.id(), "expired subscriber evicted on delivery");
        }
        Expiry::Evicted {
            emptied: subscribers.is_empty(),
        }
    }
}

/// Outcome of the lease check done before a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expiry {
    Live,
    Evicted { emptied: bool },
}

impl<T> std::fmt::Debug for Channel<T> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("topic", &self.topic)
            .field("subscribers", &self.subscribers.read().len())
            .finish()
    }
}
