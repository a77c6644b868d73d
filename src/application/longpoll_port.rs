//! Port of the long-poll broker, as consumed by transports.
//!
//! - `subscribe`: get (or create) the wait handle of `(topic, id)`.
//! - `unsubscribe`: drop a subscriber; no-op for unknown ones.
//! - `publish`: route a payload to every subscriber of a topic.
//! - `close`: stop background maintenance.

use std::{sync::Arc, time::Duration};

use super::SubscriptionPort;

pub trait LongPollPort<T>: Send + Sync {
    /// Returns the wait handle of `(topic, id)`, creating it if needed.
    fn subscribe(
        &self,
        topic: &str,
        id: &str,
        timeout: Duration,
    ) -> Arc<dyn SubscriptionPort<T>>;
    /// Removes a subscriber.
    fn unsubscribe(
        &self,
        topic: &str,
        id: &str,
    );
    /// Publishes a payload to a topic.
    fn publish(
        &self,
        topic: &str,
        payload: T,
    );
    /// Stops the background sweep.
    fn close(&self);
}
