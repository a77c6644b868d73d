use serde::Serialize;

/// A payload handed to one waiting subscriber.
///
/// `data` is whatever the publisher passed in, untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionEvent<T> {
    /// Id of the subscriber the event was delivered to.
    pub id: String,
    /// Topic the payload was published on.
    pub topic: String,
    /// Publisher payload.
    pub data: T,
}

impl<T> SubscriptionEvent<T> {
    pub fn new(
        id: impl Into<String>,
        topic: impl Into<String>,
        data: T,
    ) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            data,
        }
    }
}
