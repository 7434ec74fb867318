#![allow(clippy::unwrap_used)]
// Integration tests for the SSE parking stream using wiremock.
//
// wiremock serves a finite body, so every test ends with the server
// closing the stream; `auto_reconnect: false` turns that into a clean
// shutdown, and the reconnect tests lean on it to force retry cycles.

use std::time::Duration;

use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use danpark_api::models::CongestionLevel;
use danpark_api::stream::{ConnectionState, ReconnectPolicy, StreamEvent, StreamHandle};
use danpark_api::transport::TransportConfig;

// ── Helpers ─────────────────────────────────────────────────────────

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn stream_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/api/parking/stream", server.uri())).unwrap()
}

fn no_reconnect() -> ReconnectPolicy {
    ReconnectPolicy { auto_reconnect: false, ..ReconnectPolicy::default() }
}

fn fast_reconnect() -> ReconnectPolicy {
    ReconnectPolicy {
        interval: Duration::from_millis(50),
        max_interval: Duration::from_millis(50),
        ..ReconnectPolicy::default()
    }
}

fn sse_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
        // Give the test a window to subscribe before frames arrive.
        .set_delay(Duration::from_millis(50))
}

async fn recv_update(rx: &mut tokio::sync::broadcast::Receiver<StreamEvent>) -> StreamEvent {
    timeout(RECV_TIMEOUT, rx.recv()).await.expect("timed out waiting for event").unwrap()
}

// ── Event delivery ──────────────────────────────────────────────────

#[tokio::test]
async fn test_stream_delivers_updates_in_order() {
    let server = MockServer::start().await;

    let body = concat!(
        ": keep-alive\n\n",
        "data: {\"type\": \"PARKING_UPDATE\", \"data\": {\"id\": \"3\", \"totalSpaces\": 60, \"currentParked\": 58, \"congestionLevel\": \"혼잡\"}}\n\n",
        "data: {\"type\": \"PARKING_UPDATE\", \"data\": {\"id\": \"3\", \"totalSpaces\": 60, \"currentParked\": 59, \"congestionLevel\": \"혼잡\"}}\n\n",
    );

    Mock::given(method("GET"))
        .and(path("/api/parking/stream"))
        .respond_with(sse_response(body))
        .mount(&server)
        .await;

    let handle = StreamHandle::open(
        stream_url(&server),
        no_reconnect(),
        &TransportConfig::default(),
        CancellationToken::new(),
    )
    .unwrap();
    let mut events = handle.subscribe();

    let StreamEvent::ParkingUpdate(first) = recv_update(&mut events).await;
    assert_eq!(first.id, "3");
    assert_eq!(first.current_parked, 58);

    let StreamEvent::ParkingUpdate(second) = recv_update(&mut events).await;
    assert_eq!(second.current_parked, 59);
    assert_eq!(second.congestion_level, CongestionLevel::Congested);

    handle.close();
}

#[tokio::test]
async fn test_malformed_frame_does_not_break_the_stream() {
    let server = MockServer::start().await;

    let body = concat!(
        "data: {\"type\": \"PARKING_UPDATE\", \"data\": {\"id\": \"1\", \"totalSpaces\": 300, \"currentParked\": 120, \"congestionLevel\": \"여유\"}}\n\n",
        "data: {not json}\n\n",
        "data: {\"type\": \"SYSTEM_NOTICE\", \"data\": {\"text\": \"maintenance tonight\"}}\n\n",
        "data: {\"type\": \"PARKING_UPDATE\", \"data\": {\"id\": \"2\", \"totalSpaces\": 120, \"currentParked\": 120, \"congestionLevel\": \"만차\"}}\n\n",
    );

    Mock::given(method("GET"))
        .and(path("/api/parking/stream"))
        .respond_with(sse_response(body))
        .mount(&server)
        .await;

    let handle = StreamHandle::open(
        stream_url(&server),
        no_reconnect(),
        &TransportConfig::default(),
        CancellationToken::new(),
    )
    .unwrap();
    let mut events = handle.subscribe();

    // The malformed frame and the unknown event type are both skipped.
    let StreamEvent::ParkingUpdate(first) = recv_update(&mut events).await;
    let StreamEvent::ParkingUpdate(second) = recv_update(&mut events).await;

    assert_eq!(first.id, "1");
    assert_eq!(second.id, "2");
    assert_eq!(second.congestion_level, CongestionLevel::Full);

    handle.close();
}

// ── Connection lifecycle ────────────────────────────────────────────

#[tokio::test]
async fn test_server_close_without_reconnect_disconnects() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/parking/stream"))
        .respond_with(sse_response(": hello\n\n"))
        .mount(&server)
        .await;

    let handle = StreamHandle::open(
        stream_url(&server),
        no_reconnect(),
        &TransportConfig::default(),
        CancellationToken::new(),
    )
    .unwrap();

    let mut state = handle.state();
    timeout(RECV_TIMEOUT, state.wait_for(|s| *s == ConnectionState::Disconnected))
        .await
        .expect("timed out waiting for disconnect")
        .unwrap();
}

#[tokio::test]
async fn test_reconnects_after_server_error() {
    let server = MockServer::start().await;

    // First attempt fails, every later attempt gets a healthy stream.
    Mock::given(method("GET"))
        .and(path("/api/parking/stream"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let body = "data: {\"type\": \"PARKING_UPDATE\", \"data\": {\"id\": \"4\", \"totalSpaces\": 200, \"currentParked\": 80, \"congestionLevel\": \"보통\"}}\n\n";
    Mock::given(method("GET"))
        .and(path("/api/parking/stream"))
        .respond_with(sse_response(body))
        .mount(&server)
        .await;

    let handle = StreamHandle::open(
        stream_url(&server),
        fast_reconnect(),
        &TransportConfig::default(),
        CancellationToken::new(),
    )
    .unwrap();
    let mut events = handle.subscribe();
    let mut attempts = handle.attempts();

    // The failed attempt bumps the counter, the successful one resets it.
    timeout(RECV_TIMEOUT, attempts.wait_for(|a| *a == 1))
        .await
        .expect("timed out waiting for retry")
        .unwrap();
    timeout(RECV_TIMEOUT, attempts.wait_for(|a| *a == 0))
        .await
        .expect("timed out waiting for counter reset")
        .unwrap();

    let StreamEvent::ParkingUpdate(update) = recv_update(&mut events).await;
    assert_eq!(update.id, "4");

    handle.close();
}

#[tokio::test]
async fn test_close_tears_down_pending_connection() {
    let server = MockServer::start().await;

    // Response held back long enough that close() races nothing.
    Mock::given(method("GET"))
        .and(path("/api/parking/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(Vec::new(), "text/event-stream")
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let handle = StreamHandle::open(
        stream_url(&server),
        ReconnectPolicy::default(),
        &TransportConfig::default(),
        CancellationToken::new(),
    )
    .unwrap();

    let mut state = handle.state();
    handle.close();
    handle.close();

    timeout(RECV_TIMEOUT, state.wait_for(|s| *s == ConnectionState::Disconnected))
        .await
        .expect("timed out waiting for shutdown")
        .unwrap();
}
