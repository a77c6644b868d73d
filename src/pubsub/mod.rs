//! Long-poll publish/subscribe core.
//!
//! - `event`: the value handed to a waiting subscriber.
//! - `subscriber`: wait handle with a bounded event buffer and a lease.
//! - `channel`: per-topic subscriber registry and fan-out.
//! - `broker`: topic registry, public operations and the background sweep.

pub mod broker;
pub mod channel;
pub mod event;
pub mod subscriber;

pub use broker::*;
pub use channel::*;
pub use event::*;
pub use subscriber::*;
