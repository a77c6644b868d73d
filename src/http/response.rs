use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use longpoll_error::ErrorExt;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{trace, warn};

/// Response body shared by all endpoints.
#[derive(Debug, Serialize)]
pub struct Envelope<D = Value> {
    #[serde(rename = "errMsg")]
    pub err_msg: String,
    pub data: D,
}

impl<D: Serialize> Envelope<D> {
    pub fn ok(data: D) -> Self {
        Self {
            err_msg: String::new(),
            data,
        }
    }
}

impl Envelope<Value> {
    /// Empty `data` object, as sent for acknowledgements and errors.
    pub fn empty() -> Self {
        Self::ok(json!({}))
    }
}

/// Turns an error into its HTTP response.
///
/// The status comes from the error's status code, so a long-poll timeout
/// answers `200` with an empty payload.
pub fn error_response<E: ErrorExt>(err: &E) -> Response {
    let code = err.status_code();
    let status = StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if code.is_server_error() {
        warn!(error = %err.log_message(), %code, "request failed");
    } else {
        trace!(error = %err, %code, "request ended without data");
    }

    let body = Envelope {
        err_msg: err.client_message(),
        data: json!({}),
    };
    (status, Json(body)).into_response()
}

impl<D: Serialize> IntoResponse for Envelope<D> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
