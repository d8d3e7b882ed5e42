//! Integration tests for the authentication flow.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_register_login_refresh_logout_flow() {
    let app = TestApp::new();
    let registered = app.register("a@x.com", "password123", "Guard").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "a@x.com", "password": "wrong" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.message(), "Invalid email or password.");

    let creds = app.login("a@x.com", "password123").await;
    assert_eq!(creds.user_id, registered.user_id);

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": creds.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    let refreshed = response.body["data"]["accessToken"].as_str().unwrap();
    assert_ne!(refreshed, creds.access_token);
    assert!(response.body["data"].get("refreshToken").is_none());

    let response = app
        .request(
            "POST",
            "/api/auth/logout",
            Some(json!({ "refreshToken": creds.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "Logout successful.");

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": creds.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Invalid or expired refresh token.");
}

#[tokio::test]
async fn test_register_returns_user_without_secrets() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "name": "Olivia Ops",
                "email": "Olivia@X.com",
                "password": "pw",
                "role": "Operations Manager",
                "department": "Dispatch",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let user = &response.body["data"]["user"];
    assert_eq!(user["email"], "olivia@x.com");
    assert_eq!(user["role"], "Operations Manager");
    assert_eq!(user["status"], "active");
    assert_eq!(user["department"], "Dispatch");
    assert!(user.get("passwordHash").is_none());
    assert!(user.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_missing_fields_is_rejected() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "name": "No Role", "email": "n@x.com", "password": "pw" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    assert_eq!(
        response.message(),
        "Please provide name, email, password, and role."
    );
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = TestApp::new();
    app.register("dup@x.com", "pw", "Client").await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "name": "Again",
                "email": "DUP@x.com",
                "password": "pw",
                "role": "Client",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "DUPLICATE_EMAIL");
    assert_eq!(response.message(), "User with this email already exists.");
}

#[tokio::test]
async fn test_unknown_email_matches_wrong_password() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "nobody@x.com", "password": "pw" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Invalid email or password.");
}

#[tokio::test]
async fn test_logout_without_token_is_acknowledged() {
    let app = TestApp::new();
    let response = app
        .request("POST", "/api/auth/logout", Some(json!({})), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
}

#[tokio::test]
async fn test_refresh_with_access_token_is_rejected() {
    let app = TestApp::new();
    let creds = app.register("a@x.com", "pw", "Guard").await;

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": creds.access_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rotation_issues_new_refresh_token() {
    let app = TestApp::with_config(|c| c.auth.rotate_refresh_tokens = true);
    let creds = app.register("a@x.com", "pw", "Guard").await;

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": creds.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let rotated = response.body["data"]["refreshToken"].as_str().unwrap();
    assert_ne!(rotated, creds.refresh_token);

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": creds.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_roundtrip_and_password_change() {
    let app = TestApp::new();
    let creds = app.register("p@x.com", "old-pw", "Client").await;

    let response = app
        .request("GET", "/api/auth/profile", None, Some(&creds.access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["email"], "p@x.com");
    assert_eq!(response.body["data"]["permissions"], json!([]));

    let response = app
        .request(
            "PUT",
            "/api/auth/profile",
            Some(json!({ "phone": "555-0101" })),
            Some(&creds.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["phone"], "555-0101");
    assert_eq!(response.body["data"]["name"], "Test User");

    let response = app
        .request(
            "PUT",
            "/api/auth/password",
            Some(json!({ "currentPassword": "old-pw", "newPassword": "new-pw" })),
            Some(&creds.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["revoked"], 1);

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": creds.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    app.login("p@x.com", "new-pw").await;
}
