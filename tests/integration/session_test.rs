//! Integration tests for session listing and revocation.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_sessions_listed_most_recent_first() {
    let app = TestApp::new();
    let first = app.register("s@x.com", "pw", "Guard").await;
    let second = app.login("s@x.com", "pw").await;

    let response = app
        .request("GET", "/api/settings/sessions", None, Some(&second.access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let rows = response.body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["current"], true);
    assert_eq!(rows[1]["current"], false);
    assert_eq!(rows[0]["device"], "integration-test");

    // Using the first refresh token makes its session the most recent.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": first.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", "/api/settings/sessions", None, Some(&second.access_token))
        .await;
    let rows = response.body["data"].as_array().unwrap();
    assert_eq!(rows[0]["current"], false);
    assert_eq!(rows[1]["current"], true);
}

#[tokio::test]
async fn test_revoke_single_session() {
    let app = TestApp::new();
    let first = app.register("s@x.com", "pw", "Guard").await;
    let second = app.login("s@x.com", "pw").await;

    let response = app
        .request("GET", "/api/settings/sessions", None, Some(&second.access_token))
        .await;
    let target = response.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["current"] == false)
        .map(|row| row["id"].as_str().unwrap().to_string())
        .unwrap();

    let response = app
        .request(
            "DELETE",
            &format!("/api/settings/sessions/{target}"),
            None,
            Some(&second.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "Session revoked");

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": first.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": second.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_revoke_all_keeps_current_session() {
    let app = TestApp::new();
    app.register("s@x.com", "pw", "Guard").await;
    app.login("s@x.com", "pw").await;
    let current = app.login("s@x.com", "pw").await;

    let response = app
        .request(
            "DELETE",
            "/api/settings/sessions",
            None,
            Some(&current.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "All other sessions revoked");
    assert_eq!(response.body["data"]["revoked"], 2);

    let response = app
        .request("GET", "/api/settings/sessions", None, Some(&current.access_token))
        .await;
    let rows = response.body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["current"], true);
}

#[tokio::test]
async fn test_cannot_revoke_another_users_session() {
    let app = TestApp::new();
    let owner = app.register("owner@x.com", "pw", "Guard").await;
    let other = app.register("other@x.com", "pw", "Guard").await;

    let response = app
        .request("GET", "/api/settings/sessions", None, Some(&owner.access_token))
        .await;
    let owner_session = response.body["data"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "DELETE",
            &format!("/api/settings/sessions/{owner_session}"),
            None,
            Some(&other.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "Session not found");

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": owner.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_session_id_is_rejected() {
    let app = TestApp::new();
    let creds = app.register("s@x.com", "pw", "Guard").await;

    let response = app
        .request(
            "DELETE",
            "/api/settings/sessions/not-a-uuid",
            None,
            Some(&creds.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
}
