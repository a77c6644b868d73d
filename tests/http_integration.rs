use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use longpoll::{http, LongPoll};
use serde_json::{json, Value};
use tokio::time;
use tower::ServiceExt;

fn app() -> (Arc<LongPoll<http::Payload>>, Router) {
    let broker = Arc::new(LongPoll::with_defaults());
    let router = http::router(broker.clone());
    (broker, router)
}

async fn send(
    router: Router,
    request: Request<Body>,
) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/pub")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_sub_timeout_is_ok_with_empty_data() {
    let (broker, router) = app();

    let (status, body) = send(router, get("/sub?topic=news&id=u1&timeout=1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"errMsg": "Long polling timeout", "data": {}}));
    // The subscriber stays registered for the next round.
    assert_eq!(broker.subscriber_count("news"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_publish_reaches_waiting_sub() {
    let (broker, router) = app();

    let waiter = tokio::spawn(send(
        router.clone(),
        get("/sub?topic=news&id=u1&timeout=5"),
    ));
    while broker.subscriber_count("news") == 0 {
        time::sleep(Duration::from_millis(1)).await;
    }

    let (status, body) = send(
        router,
        post_json(r#"{"topic":"news","data":{"msg":"hello"}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"errMsg": "", "data": {}}));

    let (status, body) = waiter.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "errMsg": "",
            "data": {"id": "u1", "topic": "news", "data": {"msg": "hello"}}
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_publish_to_unknown_topic_is_acknowledged() {
    let (broker, router) = app();

    let (status, body) = send(router, post_json(r#"{"topic":"nobody","data":1}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["errMsg"], "");
    assert_eq!(broker.topic_count(), 0);
}

#[tokio::test]
async fn test_sub_without_topic_is_bad_request() {
    let (broker, router) = app();

    let (status, body) = send(router, get("/sub?id=u1")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errMsg"], "missing required parameter 'topic'");
    assert_eq!(body["data"], json!({}));
    assert_eq!(broker.topic_count(), 0);
}

#[tokio::test]
async fn test_sub_with_bad_timeout_is_bad_request() {
    let (_broker, router) = app();

    let (status, body) = send(router, get("/sub?topic=news&timeout=soon")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errMsg"],
        "invalid value 'soon' for parameter 'timeout'"
    );
}

#[tokio::test]
async fn test_sub_with_zero_timeout_is_bad_request() {
    let (broker, router) = app();

    let (status, body) = send(router, get("/sub?topic=news&id=u1&timeout=0")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errMsg"], "invalid value '0' for parameter 'timeout'");
    assert!(!broker.contains_topic("news"));
}

#[tokio::test]
async fn test_pub_with_malformed_body_is_bad_request() {
    let (_broker, router) = app();

    let (status, body) = send(router, post_json("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["errMsg"].as_str().unwrap();
    assert!(message.starts_with("invalid request body"), "{message}");
}

#[tokio::test]
async fn test_pub_without_topic_is_bad_request() {
    let (_broker, router) = app();

    let (status, _) = send(router, post_json(r#"{"data":1}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
