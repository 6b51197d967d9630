use palaver_http::{HttpClient, HttpClientConfig, HttpError};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn post_json_sends_body_and_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/echo"))
        .and(header("x-request-source", "test"))
        .and(body_json(json!({"ping": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pong": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(HttpClientConfig::new().base_url(server.uri())).unwrap();
    let response = client
        .post_json(
            "/v1/echo",
            &[("x-request-source", "test")],
            &json!({"ping": true}),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(response.is_success());
    let body: serde_json::Value = response.json_as().unwrap();
    assert_eq!(body, json!({"pong": true}));
}

#[tokio::test]
async fn post_json_surfaces_error_status_without_failing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/echo"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let client = HttpClient::new(HttpClientConfig::new().base_url(server.uri())).unwrap();
    let response = client
        .post_json("/v1/echo", &[], &json!({}), &CancellationToken::new())
        .await
        .unwrap();

    // Status handling is the caller's concern; the transport only fails
    // on connection-level problems.
    assert!(response.is_server_error());
    assert_eq!(response.text().unwrap(), "unavailable");
}

#[tokio::test]
async fn post_json_sends_configured_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/echo"))
        .and(header("user-agent", "palaver"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(
        HttpClientConfig::new()
            .base_url(server.uri())
            .user_agent("palaver"),
    )
    .unwrap();

    let response = client
        .post_json("/v1/echo", &[], &json!({}), &CancellationToken::new())
        .await
        .unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn cancellation_aborts_inflight_request_promptly() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let client = HttpClient::new(HttpClientConfig::new().base_url(server.uri())).unwrap();
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let result = client.post_json("/v1/slow", &[], &json!({}), &cancel).await;

    assert!(matches!(result, Err(HttpError::Cancelled)));
    assert!(
        start.elapsed() < Duration::from_secs(5),
        "cancelled call should fail promptly, took {:?}",
        start.elapsed()
    );
}
