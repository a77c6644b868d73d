use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use longpoll_error::PollError;
use parking_lot::RwLock;
use tokio::{
    sync::{mpsc, Mutex},
    time::{self, Instant},
};
use tracing::warn;

use super::SubscriptionEvent;
use crate::{application::SubscriptionPort, config::LongPollConfig};

/// Wait handle of one long-poll client, bound to a `(topic, id)` pair.
///
/// Owns a bounded FIFO of pending events. Every finished
/// [`wait_event`](Subscriber::wait_event) refreshes the activity timestamp;
/// a subscriber idle for longer than its lease is considered abandoned and
/// gets evicted by its channel.
pub struct Subscriber<T> {
    id: Arc<str>,
    topic: Arc<str>,
    /// Producer half, used by deliveries.
    tx: mpsc::Sender<SubscriptionEvent<T>>,
    /// Consumer half. Concurrent waiters on one handle queue up here.
    rx: Mutex<mpsc::Receiver<SubscriptionEvent<T>>>,
    timeout: Duration,
    lease: Duration,
    last_active: RwLock<Instant>,
}

////////////////////////////////////////////////////////////////////////////////
// Own methods
////////////////////////////////////////////////////////////////////////////////

impl<T> Subscriber<T> {
    /// Creates a subscriber with an empty buffer of `config.event_buffer`
    /// slots and `last_active = now`.
    pub fn new(
        id: impl Into<Arc<str>>,
        topic: impl Into<Arc<str>>,
        timeout: Duration,
        config: &LongPollConfig,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.event_buffer.max(1));
        Self {
            id: id.into(),
            topic: topic.into(),
            tx,
            rx: Mutex::new(rx),
            timeout,
            lease: config.lease_for(timeout),
            last_active: RwLock::new(Instant::now()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn lease(&self) -> Duration {
        self.lease
    }

    /// Moment the last wait call finished (or creation time).
    pub fn last_active(&self) -> Instant {
        *self.last_active.read()
    }

    /// Number of events delivered but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    /// Waits for the next event, at most `timeout`.
    ///
    /// Consumes one event per call, in delivery order. Both outcomes
    /// refresh the activity timestamp, which is what keeps a polling client
    /// alive.
    pub async fn wait_event(&self) -> Result<SubscriptionEvent<T>, PollError> {
        let received = time::timeout(self.timeout, async {
            let mut rx = self.rx.lock().await;
            rx.recv().await
        })
        .await;

        self.refresh();

        match received {
            Ok(Some(event)) => Ok(event),
            // `self` owns a sender, so the queue cannot close while waiting.
            Ok(None) | Err(_) => Err(PollError::Timeout {
                after: self.timeout,
            }),
        }
    }

    /// Enqueues `payload` for this subscriber.
    ///
    /// When the buffer is full this waits for a free slot: the deliverer is
    /// slowed down, nothing is dropped.
    pub async fn deliver(
        &self,
        payload: T,
    ) {
        let event = SubscriptionEvent::new(&*self.id, &*self.topic, payload);
        if self.tx.send(event).await.is_err() {
            warn!(id = %self.id, topic = %self.topic, "event queue closed, payload discarded");
        }
    }

    /// `true` once the subscriber has been idle for longer than its lease.
    pub fn is_expired(&self) -> bool {
        self.last_active.read().elapsed() > self.lease
    }

    fn refresh(&self) {
        *self.last_active.write() = Instant::now();
    }
}

////////////////////////////////////////////////////////////////////////////////
// Trait implementations for Subscriber
////////////////////////////////////////////////////////////////////////////////

#[async_trait]
impl<T> SubscriptionPort<T> for Subscriber<T>
where
    T: Send + Sync + 'static,
{
    async fn wait_event(&self) -> Result<SubscriptionEvent<T>, PollError> {
        Subscriber::wait_event(self).await
    }

    fn id(&self) -> &str {
        Subscriber::id(self)
    }

    fn topic(&self) -> &str {
        Subscriber::topic(self)
    }
}

impl<T> std::fmt::Debug for Subscriber<T> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("timeout", &self.timeout)
            .field("lease", &self.lease)
            .field("buffered", &self.buffered())
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
