use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::{runtime::Handle, sync::watch, task::JoinHandle, time};
use tracing::{debug, info, trace};

use super::{Channel, Subscriber};
use crate::{
    application::{LongPollPort, SubscriptionPort},
    config::LongPollConfig,
};

type TopicKey = Arc<str>;
type Registry<T> = DashMap<TopicKey, Arc<Channel<T>>>;

/// Long-poll broker.
///
/// Holds the topic → [`Channel`] registry and runs a background sweep that
/// evicts subscribers whose lease ran out and drops topics left without
/// subscribers.
///
/// - Subscribing is idempotent per `(topic, id)`.
/// - Publishing to a topic nobody listens to is a silent no-op.
/// - Publishing never waits for deliveries.
pub struct LongPoll<T> {
    /// Topic → channel
    channels: Arc<Registry<T>>,
    config: LongPollConfig,
    /// Set to `true` by [`close`](LongPoll::close); read by the sweep loop.
    shutdown: watch::Sender<bool>,
    sweeper: Option<JoinHandle<()>>,
    /// Runtime the sweep and the delivery tasks are spawned on, captured at
    /// construction so `publish` works from any thread.
    runtime: Handle,
}

////////////////////////////////////////////////////////////////////////////////
// Own methods
////////////////////////////////////////////////////////////////////////////////

impl<T> LongPoll<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a broker and starts its sweep loop on the current Tokio
    /// runtime.
    ///
    /// Must be called within a Tokio runtime. Later calls may come from any
    /// thread.
    pub fn new(config: LongPollConfig) -> Self {
        let runtime = Handle::current();
        let channels = Arc::new(Registry::new());
        let (shutdown, shutdown_rx) = watch::channel(false);
        let sweeper = spawn_purge_task(
            &runtime,
            Arc::clone(&channels),
            config.purge_interval,
            shutdown_rx,
        );
        Self {
            channels,
            config,
            shutdown,
            sweeper: Some(sweeper),
            runtime,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(LongPollConfig::default())
    }

    pub fn config(&self) -> &LongPollConfig {
        &self.config
    }

    /// Returns the wait handle of `(topic, id)`, creating it if needed.
    ///
    /// An already registered id gets its existing handle back untouched;
    /// `timeout` is then ignored.
    pub fn subscribe(
        &self,
        topic: &str,
        id: &str,
        timeout: Duration,
    ) -> Arc<Subscriber<T>> {
        // The entry guard keeps the registry shard locked while registering,
        // so a concurrent sweep cannot drop the channel in between.
        let channel = self
            .channels
            .entry(Arc::from(topic))
            .or_insert_with(|| {
                debug!(%topic, "channel created");
                Arc::new(Channel::new(topic))
            });

        if let Some(existing) = channel.lookup(id) {
            return existing;
        }

        let subscriber = Arc::new(Subscriber::new(id, topic, timeout, &self.config));
        channel.register(Arc::clone(&subscriber));
        debug!(%topic, %id, ?timeout, lease = ?subscriber.lease(), "subscriber registered");
        subscriber
    }

    /// Removes `(topic, id)`. Drops the topic once its last subscriber is
    /// gone. Empty ids and unknown topics are ignored.
    pub fn unsubscribe(
        &self,
        topic: &str,
        id: &str,
    ) {
        if id.is_empty() {
            return;
        }

        let removed = self.channels.remove_if(topic, |_, channel| {
            if channel.remove(id).is_some() {
                debug!(%topic, %id, "subscriber unsubscribed");
            }
            channel.is_empty()
        });
        if removed.is_some() {
            debug!(%topic, "channel removed");
        }
    }

    /// Routes `payload` to every subscriber of `topic`.
    ///
    /// Unknown topics are skipped silently. A topic whose last subscriber is
    /// evicted on the way is dropped from the registry.
    pub fn publish(
        &self,
        topic: &str,
        payload: T,
    ) {
        // Clone the channel out so the registry guard is released before the
        // channel lock is taken.
        let Some(channel) = self
            .channels
            .get(topic)
            .map(|entry| Arc::clone(entry.value()))
        else {
            trace!(%topic, "publish to topic without subscribers");
            return;
        };

        let registry = Arc::downgrade(&self.channels);
        channel.route(&self.runtime, payload, move |emptied| {
            if let Some(channels) = registry.upgrade() {
                drop_if_empty(&channels, emptied);
            }
        });
    }

    /// Asks the sweep loop to stop after its current cycle.
    ///
    /// Outstanding waits are not interrupted and the other operations keep
    /// working.
    pub fn close(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Runs one sweep cycle right away. Returns the number of evicted
    /// subscribers.
    pub fn purge(&self) -> usize {
        purge_channels(&self.channels)
    }

    pub fn topic_count(&self) -> usize {
        self.channels.len()
    }

    pub fn contains_topic(
        &self,
        topic: &str,
    ) -> bool {
        self.channels.contains_key(topic)
    }

    /// Subscribers currently registered on `topic` (0 for unknown topics).
    pub fn subscriber_count(
        &self,
        topic: &str,
    ) -> usize {
        self.channels
            .get(topic)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Background sweep
////////////////////////////////////////////////////////////////////////////////

/// Starts the periodic sweep.
///
/// The shutdown flag is checked once per cycle, before sweeping, so after
/// [`LongPoll::close`] the loop may still finish a pending sleep of one
/// interval before it exits.
fn spawn_purge_task<T>(
    runtime: &Handle,
    channels: Arc<Registry<T>>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
{
    runtime.spawn(async move {
        info!(?interval, "subscriber purge loop started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let evicted = purge_channels(&channels);
            if evicted > 0 {
                debug!(evicted, topics = channels.len(), "purged expired subscribers");
            }

            time::sleep(interval).await;
        }

        info!("subscriber purge loop stopped");
    })
}

fn purge_channels<T>(channels: &Registry<T>) -> usize
where
    T: Clone + Send + Sync + 'static,
{
    let mut evicted = 0;
    channels.retain(|topic, channel| {
        evicted += channel.sweep_expired();
        let keep = !channel.is_empty();
        if !keep {
            debug!(%topic, "empty channel removed");
        }
        keep
    });
    evicted
}

/// Removes `channel` from the registry if it is still the registered one
/// and still empty. A channel recreated for the same topic in the meantime
/// stays.
fn drop_if_empty<T>(
    channels: &Registry<T>,
    channel: &Arc<Channel<T>>,
) where
    T: Clone + Send + Sync + 'static,
{
    let removed = channels.remove_if(channel.topic(), |_, current| {
        Arc::ptr_eq(current, channel) && current.is_empty()
    });
    if removed.is_some() {
        debug!(topic = channel.topic(), "channel emptied by eviction, removed");
    }
}

////////////////////////////////////////////////////////////////////////////////
// Trait implementations for LongPoll
////////////////////////////////////////////////////////////////////////////////

impl<T> LongPollPort<T> for LongPoll<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn subscribe(
        &self,
        topic: &str,
        id: &str,
        timeout: Duration,
    ) -> Arc<dyn SubscriptionPort<T>> {
        LongPoll::subscribe(self, topic, id, timeout)
    }

    fn unsubscribe(
        &self,
        topic: &str,
        id: &str,
    ) {
        LongPoll::unsubscribe(self, topic, id)
    }

    fn publish(
        &self,
        topic: &str,
        payload: T,
    ) {
        LongPoll::publish(self, topic, payload)
    }

    fn close(&self) {
        LongPoll::close(self)
    }
}

impl<T> Drop for LongPoll<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
        }
    }
}

impl<T> std::fmt::Debug for LongPoll<T> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("LongPoll")
            .field("topics", &self.channels.len())
            .field("config", &self.config)
            .field("closed", &*self.shutdown.borrow())
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
