#![allow(clippy::unwrap_used)]
// Integration tests for `Session` using wiremock.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use danpark_core::{
    CongestionLevel, ConnectionState, CoreError, LotId, Session, SessionConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

fn ok_body(data: serde_json::Value) -> serde_json::Value {
    json!({ "data": data, "error": null })
}

fn catalog_body() -> serde_json::Value {
    ok_body(json!([
        {
            "id": "1",
            "name": "글로컬산학협력관 주차장",
            "address": "죽전캠퍼스 글로컬산학협력관",
            "latitude": 37.3219,
            "longitude": 127.1266,
            "totalSpaces": 300,
            "currentParked": 120,
            "congestionLevel": "여유",
            "distance": 150.0
        },
        {
            "id": "3",
            "name": "혜당관 주차장",
            "address": "죽전캠퍼스 혜당관",
            "latitude": 37.3201,
            "longitude": 127.1284,
            "totalSpaces": 60,
            "currentParked": 55,
            "congestionLevel": "보통",
            "distance": 420.0
        },
    ]))
}

async fn mount_catalog(server: &MockServer, favorites: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/parking-lots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(favorites)))
        .mount(server)
        .await;
}

/// A session with streaming disabled, for REST-only tests.
fn rest_session(server: &MockServer) -> Session {
    let base = Url::parse(&server.uri()).unwrap();
    Session::new(SessionConfig::new(base).with_stream(false)).unwrap()
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_installs_token_and_returns_pair() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!({
            "accessToken": "tok-access",
            "refreshToken": "tok-refresh",
        }))))
        .mount(&server)
        .await;

    let session = rest_session(&server);
    assert!(!session.is_authenticated());

    let pair = session
        .login("student@dankook.ac.kr", &SecretString::from("hunter2"))
        .await
        .unwrap();

    assert!(session.is_authenticated());
    assert_eq!(pair.access_token.expose_secret(), "tok-access");
    assert_eq!(pair.refresh_token.expose_secret(), "tok-refresh");
}

#[tokio::test]
async fn test_resume_installs_stored_token() {
    let server = MockServer::start().await;
    let session = rest_session(&server);

    assert!(!session.is_authenticated());
    session.resume(SecretString::from("tok-stored"));
    assert!(session.is_authenticated());
}

// ── Bootstrap ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_bootstrap_seeds_catalog_and_favorites() {
    let server = MockServer::start().await;
    mount_catalog(&server, json!(["3"])).await;

    let session = rest_session(&server);
    session.bootstrap().await.unwrap();

    let store = session.store();
    assert_eq!(store.len(), 2);

    let favorite = store.get(&LotId::from("3")).unwrap();
    assert!(favorite.favorite);
    assert_eq!(favorite.current_parked, 55);
    assert_eq!(favorite.congestion_level, CongestionLevel::Normal);

    assert!(!store.get(&LotId::from("1")).unwrap().favorite);
}

// ── Favorites ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_favorite_toggle_confirms_with_server() {
    let server = MockServer::start().await;
    mount_catalog(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/api/favorites"))
        .and(body_json(json!({ "parkingLotId": "3" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!(null))))
        .mount(&server)
        .await;

    let session = rest_session(&server);
    session.bootstrap().await.unwrap();

    let id = LotId::from("3");
    let new_value = session.toggle_favorite(&id).await.unwrap();

    assert!(new_value);
    assert!(session.store().get(&id).unwrap().favorite);
}

#[tokio::test]
async fn test_favorite_rolls_back_when_server_rejects() {
    let server = MockServer::start().await;
    mount_catalog(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = rest_session(&server);
    session.bootstrap().await.unwrap();

    let id = LotId::from("3");
    let result = session.toggle_favorite(&id).await;

    assert!(result.is_err(), "got: {result:?}");
    assert!(
        !session.store().get(&id).unwrap().favorite,
        "rejected toggle must roll the flag back"
    );
}

#[tokio::test]
async fn test_second_toggle_while_pending_is_rejected() {
    let server = MockServer::start().await;
    mount_catalog(&server, json!([])).await;

    // Slow confirmation so the second toggle lands while the first is
    // still in flight.
    Mock::given(method("POST"))
        .and(path("/api/favorites"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok_body(json!(null)))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let session = rest_session(&server);
    session.bootstrap().await.unwrap();

    let id = LotId::from("3");
    let racing = {
        let session = session.clone();
        let id = id.clone();
        tokio::spawn(async move { session.toggle_favorite(&id).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = session.toggle_favorite(&id).await;
    match second {
        Err(CoreError::FavoritePending(ref lot)) => assert_eq!(lot.as_str(), "3"),
        other => panic!("expected FavoritePending, got: {other:?}"),
    }

    let first = racing.await.unwrap();
    assert!(first.unwrap(), "first toggle must land normally");
}

#[tokio::test]
async fn test_toggle_on_unknown_lot_is_rejected() {
    let server = MockServer::start().await;
    mount_catalog(&server, json!([])).await;

    let session = rest_session(&server);
    session.bootstrap().await.unwrap();

    let result = session.toggle_favorite(&LotId::from("99")).await;
    match result {
        Err(CoreError::UnknownLot(ref lot)) => assert_eq!(lot.as_str(), "99"),
        other => panic!("expected UnknownLot, got: {other:?}"),
    }
}

// ── Parking ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_park_records_history_with_numeric_id() {
    let server = MockServer::start().await;
    mount_catalog(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/parking-histories"))
        .and(body_json(json!({ "parkingLotId": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!({
            "id": 10,
            "parkingLotId": 3,
            "parkedAt": "2025-10-07T09:30:00",
        }))))
        .mount(&server)
        .await;

    let session = rest_session(&server);
    session.bootstrap().await.unwrap();

    let id = LotId::from("3");
    session.park(&id, "B2-17").await.unwrap();
    assert_eq!(session.store().current_parking(), Some(id.clone()));

    assert_eq!(session.leave().unwrap(), id);
    assert_eq!(session.store().current_parking(), None);

    // History recording runs in the background; close joins it.
    session.close().await;
    let requests = server.received_requests().await.unwrap();
    let recorded = requests
        .iter()
        .find(|r| r.url.path() == "/parking-histories")
        .expect("history request never arrived");
    let body: serde_json::Value = serde_json::from_slice(&recorded.body).unwrap();
    assert_eq!(body, json!({ "parkingLotId": 3 }));
}

// ── Streaming ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_stream_updates_flow_into_store() {
    let server = MockServer::start().await;
    mount_catalog(&server, json!(["3"])).await;

    let update = json!({
        "type": "PARKING_UPDATE",
        "data": {
            "id": "3",
            "totalSpaces": 60,
            "currentParked": 59,
            "congestionLevel": "혼잡",
        },
    });
    // Give bootstrap a window to spawn the apply task before frames arrive.
    Mock::given(method("GET"))
        .and(path("/api/parking/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(format!("data: {update}\n\n"), "text/event-stream")
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&server)
        .await;

    let base = Url::parse(&server.uri()).unwrap();
    let session = Session::new(SessionConfig::new(base)).unwrap();
    session.bootstrap().await.unwrap();

    let mut connection = session.connection();
    tokio::time::timeout(
        WAIT_TIMEOUT,
        connection.wait_for(|s| *s == ConnectionState::Connected),
    )
    .await
    .unwrap()
    .unwrap();

    let mut watch = session.store().watch();
    let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
    loop {
        let lot = session.store().get(&LotId::from("3")).unwrap();
        if lot.current_parked == 59 {
            assert_eq!(lot.congestion_level, CongestionLevel::Congested);
            assert!(lot.favorite, "pushed update must not clear the favorite flag");
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "update never applied"
        );
        let _ = tokio::time::timeout(Duration::from_millis(200), watch.changed()).await;
    }

    session.close().await;
    assert_eq!(*session.connection().borrow(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let server = MockServer::start().await;
    let session = rest_session(&server);

    session.close().await;
    session.close().await;

    assert_eq!(*session.connection().borrow(), ConnectionState::Disconnected);
}
