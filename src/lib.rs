/// Port traits of the broker and its wait handles.
pub mod application;
/// Broker tuning and server settings.
pub mod config;
/// HTTP transport (`/sub`, `/pub`).
pub mod http;
/// Tracing setup.
pub mod logging;
/// Long-poll pub/sub core: Subscriber, Channel, LongPoll.
pub mod pubsub;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Port traits.
pub use application::{LongPollPort, SubscriptionPort};
/// Configuration.
pub use config::{LongPollConfig, ServerSettings};
/// Errors and status codes.
pub use longpoll_error::{ErrorExt, PollError, RequestError, StatusCode};
/// Core broker API.
pub use pubsub::{Channel, LongPoll, Subscriber, SubscriptionEvent};
