use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use longpoll_error::RequestError;
use serde::Deserialize;
use tracing::debug;

use super::{
    response::{error_response, Envelope},
    AppState, Payload,
};

/// Wait used when the client sends no `timeout`.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw query of `GET /sub`. Validated by [`SubscribeQuery::validate`].
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeQuery {
    pub topic: Option<String>,
    pub id: Option<String>,
    /// Whole seconds, at least one.
    pub timeout: Option<String>,
}

/// Body of `POST /pub`.
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub topic: String,
    #[serde(default)]
    pub data: Payload,
}

#[derive(Debug, PartialEq, Eq)]
pub(super) struct SubscribeParams {
    pub topic: String,
    pub id: String,
    pub timeout: Duration,
}

impl SubscribeQuery {
    pub(super) fn validate(self) -> Result<SubscribeParams, RequestError> {
        let topic = self
            .topic
            .filter(|t| !t.is_empty())
            .ok_or(RequestError::MissingParam { name: "topic" })?;

        let timeout = match self.timeout.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_WAIT_TIMEOUT,
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| RequestError::InvalidParam {
                    name: "timeout",
                    value: raw.to_string(),
                })?,
        };

        Ok(SubscribeParams {
            topic,
            id: self.id.unwrap_or_default(),
            timeout,
        })
    }
}

/// `GET /sub`: one long-poll round.
pub(super) async fn subscribe(
    State(state): State<AppState>,
    Query(query): Query<SubscribeQuery>,
) -> Response {
    let params = match query.validate() {
        Ok(params) => params,
        Err(err) => return error_response(&err),
    };

    let subscriber = state
        .broker
        .subscribe(&params.topic, &params.id, params.timeout);

    match subscriber.wait_event().await {
        Ok(event) => Envelope::ok(event).into_response(),
        Err(err) => error_response(&err),
    }
}

/// `POST /pub`: hands the payload to the broker and returns right away.
pub(super) async fn publish(
    State(state): State<AppState>,
    body: Result<Json<PublishRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            let err = RequestError::InvalidBody {
                reason: rejection.body_text(),
            };
            return error_response(&err);
        }
    };

    debug!(topic = %request.topic, "publish request");
    state.broker.publish(&request.topic, request.data);
    Envelope::empty().into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(
        topic: Option<&str>,
        id: Option<&str>,
        timeout: Option<&str>,
    ) -> SubscribeQuery {
        SubscribeQuery {
            topic: topic.map(Into::into),
            id: id.map(Into::into),
            timeout: timeout.map(Into::into),
        }
    }

    #[test]
    fn test_validate_full_query() {
        let params = query(Some("news"), Some("u1"), Some("10"))
            .validate()
            .unwrap();
        assert_eq!(
            params,
            SubscribeParams {
                topic: "news".into(),
                id: "u1".into(),
                timeout: Duration::from_secs(10),
            }
        );
    }

    #[test]
    fn test_validate_defaults() {
        let params = query(Some("news"), None, None).validate().unwrap();
        assert_eq!(params.id, "");
        assert_eq!(params.timeout, DEFAULT_WAIT_TIMEOUT);

        let params = query(Some("news"), None, Some("")).validate().unwrap();
        assert_eq!(params.timeout, DEFAULT_WAIT_TIMEOUT);
    }

    #[test]
    fn test_validate_requires_topic() {
        for topic in [None, Some("")] {
            let err = query(topic, Some("u1"), Some("1")).validate().unwrap_err();
            assert_eq!(err, RequestError::MissingParam { name: "topic" });
        }
    }

    #[test]
    fn test_validate_rejects_bad_timeout() {
        for raw in ["abc", "-1", "1.5", "0", "00"] {
            let err = query(Some("news"), None, Some(raw)).validate().unwrap_err();
            assert_eq!(
                err,
                RequestError::InvalidParam {
                    name: "timeout",
                    value: raw.to_string(),
                }
            );
        }
    }
}
