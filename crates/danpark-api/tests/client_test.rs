#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use danpark_api::models::{CongestionLevel, ProfileUpdate, SettingsUpdate, Theme};
use danpark_api::transport::TransportConfig;
use danpark_api::{ApiClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::new(base, &TransportConfig::default()).unwrap();
    (server, client)
}

fn ok_body(data: serde_json::Value) -> serde_json::Value {
    json!({ "data": data, "error": null })
}

// ── Auth ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_returns_token_pair() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({
            "email": "student@dankook.ac.kr",
            "password": "hunter2",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!({
            "accessToken": "tok-access",
            "refreshToken": "tok-refresh",
        }))))
        .mount(&server)
        .await;

    let pair = client
        .login("student@dankook.ac.kr", &SecretString::from("hunter2"))
        .await
        .unwrap();

    assert_eq!(pair.access_token.expose_secret(), "tok-access");
    assert_eq!(pair.refresh_token.expose_secret(), "tok-refresh");
}

#[tokio::test]
async fn test_login_rejection_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "error": { "code": "INVALID_CREDENTIALS", "message": "wrong password" },
        })))
        .mount(&server)
        .await;

    let result = client.login("student@dankook.ac.kr", &SecretString::from("nope")).await;

    match result {
        Err(Error::Authentication { ref message }) => assert_eq!(message, "wrong password"),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_signup_returns_user_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .and(body_json(json!({
            "email": "new@dankook.ac.kr",
            "password": "s3cret",
            "name": "김단국",
            "studentId": "32201234",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!(42))))
        .mount(&server)
        .await;

    let user_id = client
        .signup("new@dankook.ac.kr", &SecretString::from("s3cret"), "김단국", "32201234")
        .await
        .unwrap();

    assert_eq!(user_id, 42);
}

#[tokio::test]
async fn test_bearer_token_attached_after_login() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!(["1", "4"]))))
        .mount(&server)
        .await;

    assert!(!client.has_token());
    client.set_token(SecretString::from("tok-123"));
    assert!(client.has_token());

    let favorites = client.favorites().await.unwrap();
    assert_eq!(favorites, vec!["1", "4"]);
}

// ── Catalog ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_parking_lots_catalog() {
    let (server, client) = setup().await;

    let body = ok_body(json!([
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
            "currentParked": 58,
            "congestionLevel": "혼잡",
            "distance": 420.0
        },
    ]));

    Mock::given(method("GET"))
        .and(path("/api/parking-lots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let lots = client.parking_lots().await.unwrap();

    assert_eq!(lots.len(), 2);
    assert_eq!(lots[0].id, "1");
    assert_eq!(lots[0].total_spaces, 300);
    assert_eq!(lots[0].congestion_level, CongestionLevel::Relaxed);
    assert_eq!(lots[1].congestion_level, CongestionLevel::Congested);
}

#[tokio::test]
async fn test_parking_lots_null_data_is_missing() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/parking-lots"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": null, "error": null })),
        )
        .mount(&server)
        .await;

    let result = client.parking_lots().await;

    assert!(matches!(result, Err(Error::MissingData)), "got: {result:?}");
}

// ── Favorites ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_favorites_null_data_defaults_to_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": null, "error": null })),
        )
        .mount(&server)
        .await;

    let favorites = client.favorites().await.unwrap();
    assert!(favorites.is_empty());
}

#[tokio::test]
async fn test_add_favorite_posts_lot_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/favorites"))
        .and(body_json(json!({ "parkingLotId": "7" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!(null))))
        .mount(&server)
        .await;

    client.add_favorite("7").await.unwrap();
}

#[tokio::test]
async fn test_remove_favorite_targets_id_path() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/favorites/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!(null))))
        .mount(&server)
        .await;

    client.remove_favorite("7").await.unwrap();
}

// ── Profile ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_me_returns_profile() {
    let (server, client) = setup().await;

    let body = ok_body(json!({
        "id": 42,
        "email": "student@dankook.ac.kr",
        "name": "김단국",
        "studentId": "32201234",
        "department": "소프트웨어학과"
    }));

    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let profile = client.me().await.unwrap();

    assert_eq!(profile.id, 42);
    assert_eq!(profile.student_id, "32201234");
    assert_eq!(profile.department.as_deref(), Some("소프트웨어학과"));
}

#[tokio::test]
async fn test_update_me_sends_only_set_fields() {
    let (server, client) = setup().await;

    let body = ok_body(json!({
        "id": 42,
        "email": "student@dankook.ac.kr",
        "name": "김새이름",
        "studentId": "32201234",
        "department": null
    }));

    Mock::given(method("PUT"))
        .and(path("/api/users/me"))
        .and(body_json(json!({ "name": "김새이름" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let update = ProfileUpdate { name: Some("김새이름".into()), ..ProfileUpdate::default() };
    let profile = client.update_me(&update).await.unwrap();

    assert_eq!(profile.name, "김새이름");
}

// ── Settings ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_settings_null_data_yields_defaults() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/settings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": null, "error": null })),
        )
        .mount(&server)
        .await;

    let settings = client.settings().await.unwrap();

    assert!(settings.notifications);
    assert!(settings.location);
    assert!(!settings.auto_refresh);
    assert_eq!(settings.theme, Theme::Light);
}

#[tokio::test]
async fn test_update_settings_sends_only_set_fields() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/settings"))
        .and(body_json(json!({ "theme": "dark" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(json!(null))))
        .mount(&server)
        .await;

    let update = SettingsUpdate { theme: Some(Theme::Dark), ..SettingsUpdate::default() };
    client.update_settings(&update).await.unwrap();
}

// ── Parking history ─────────────────────────────────────────────────

#[tokio::test]
async fn test_parking_histories_decodes_local_datetime() {
    let (server, client) = setup().await;

    let body = ok_body(json!([
        { "id": 9, "parkingLotId": 3, "parkedAt": "2025-10-07T09:30:00" },
        { "id": 8, "parkingLotId": 1, "parkedAt": "2025-10-06T18:05:12" },
    ]));

    // Mounted at the root, not under /api.
    Mock::given(method("GET"))
        .and(path("/parking-histories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let histories = client.parking_histories().await.unwrap();

    assert_eq!(histories.len(), 2);
    assert_eq!(histories[0].parking_lot_id, 3);
    assert_eq!(histories[0].parked_at.to_string(), "2025-10-07 09:30:00");
}

#[tokio::test]
async fn test_record_parking_posts_numeric_lot_id() {
    let (server, client) = setup().await;

    let body = ok_body(json!({ "id": 10, "parkingLotId": 3, "parkedAt": "2025-10-07T09:30:00" }));

    Mock::given(method("POST"))
        .and(path("/parking-histories"))
        .and(body_json(json!({ "parkingLotId": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let entry = client.record_parking(3).await.unwrap();
    assert_eq!(entry.id, 10);
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_401_is_session_expired() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "data": null,
            "error": { "code": "UNAUTHORIZED", "message": "token expired" },
        })))
        .mount(&server)
        .await;

    let result = client.favorites().await;

    match result {
        Err(ref e @ Error::SessionExpired) => assert!(e.is_auth_expired()),
        other => panic!("expected SessionExpired, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_envelope_error_becomes_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "error": { "code": "NOT_FOUND", "message": "no such parking lot" },
        })))
        .mount(&server)
        .await;

    let result = client.add_favorite("999").await;

    match result {
        Err(Error::Api { ref code, ref message }) => {
            assert_eq!(code, "NOT_FOUND");
            assert_eq!(message, "no such parking lot");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unparseable_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/parking-lots"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway error</html>"))
        .mount(&server)
        .await;

    let result = client.parking_lots().await;

    match result {
        Err(Error::Deserialization { ref body, .. }) => {
            assert!(body.contains("gateway error"));
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
