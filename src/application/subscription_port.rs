use async_trait::async_trait;
use longpoll_error::PollError;

use crate::pubsub::SubscriptionEvent;

/// Wait handle of one long-poll client.
#[async_trait]
pub trait SubscriptionPort<T>: Send + Sync {
    /// Waits for the next event or the handle's timeout.
    async fn wait_event(&self) -> Result<SubscriptionEvent<T>, PollError>;
    /// Subscriber id.
    fn id(&self) -> &str;
    /// Topic the handle is registered on.
    fn topic(&self) -> &str;
}
