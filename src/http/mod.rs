//! HTTP transport in front of the broker.
//!
//! - `GET /sub?topic=&id=&timeout=` subscribes and waits for one event.
//! - `POST /pub` with `{"topic": ..., "data": ...}` publishes.
//!
//! Every response uses the `{"errMsg": ..., "data": ...}` envelope.

mod handlers;
mod response;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
pub use handlers::{PublishRequest, SubscribeQuery, DEFAULT_WAIT_TIMEOUT};
pub use response::Envelope;
use serde_json::Value;

use crate::application::LongPollPort;

/// Payload type carried over HTTP.
pub type Payload = Value;

#[derive(Clone)]
pub struct AppState {
    broker: Arc<dyn LongPollPort<Payload>>,
}

/// Builds the router serving `/sub` and `/pub` on top of `broker`.
pub fn router(broker: Arc<dyn LongPollPort<Payload>>) -> Router {
    Router::new()
        .route("/sub", get(handlers::subscribe))
        .route("/pub", post(handlers::publish))
        .with_state(AppState { broker })
}
