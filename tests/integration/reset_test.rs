//! Integration tests for the password reset flow.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_request_reset_does_not_reveal_accounts() {
    let app = TestApp::with_config(|c| c.auth.expose_reset_token = false);
    app.register("known@x.com", "pw", "Client").await;

    let known = app
        .request(
            "POST",
            "/api/auth/request-reset",
            Some(json!({ "email": "known@x.com" })),
            None,
        )
        .await;
    let unknown = app
        .request(
            "POST",
            "/api/auth/request-reset",
            Some(json!({ "email": "unknown@x.com" })),
            None,
        )
        .await;

    assert_eq!(known.status, StatusCode::OK);
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(known.body, unknown.body);
    assert!(known.body.get("data").is_none());
}

#[tokio::test]
async fn test_reset_revokes_sessions_and_is_single_use() {
    let app = TestApp::new();
    let creds = app.register("r@x.com", "old-pw", "Guard").await;
    app.login("r@x.com", "old-pw").await;

    let response = app
        .request(
            "POST",
            "/api/auth/request-reset",
            Some(json!({ "email": "R@x.com" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let token = response.body["data"]["resetToken"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(token.len(), 64);

    let response = app
        .request(
            "POST",
            "/api/auth/reset-password",
            Some(json!({ "token": token, "newPassword": "new-pw" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.message(),
        "Password reset successful. Please login with your new password."
    );

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": creds.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "r@x.com", "password": "old-pw" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    app.login("r@x.com", "new-pw").await;

    let response = app
        .request(
            "POST",
            "/api/auth/reset-password",
            Some(json!({ "token": token, "newPassword": "third-pw" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "INVALID_OR_EXPIRED_TOKEN");
    assert_eq!(response.message(), "Invalid or expired reset token.");
}

#[tokio::test]
async fn test_reset_with_unknown_token_is_rejected() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/reset-password",
            Some(json!({ "token": "deadbeef", "newPassword": "pw" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "Invalid or expired reset token.");
}
