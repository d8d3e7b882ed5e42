//! Integration tests for bearer authentication and role/permission checks.

use http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use guardpost_database::UserRepository;
use guardpost_entity::user::UserStatus;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/auth/profile", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.message(), "No token provided. Authorization denied.");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = TestApp::new();
    let response = app
        .request("GET", "/api/auth/profile", None, Some("not.a.jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = TestApp::new();
    let creds = app.register("a@x.com", "pw", "Guard").await;
    let response = app
        .request("GET", "/api/auth/profile", None, Some(&creds.refresh_token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_suspended_user_is_forbidden() {
    let app = TestApp::new();
    let creds = app.register("s@x.com", "pw", "Guard").await;
    let user_id: Uuid = creds.user_id.parse().unwrap();
    app.db
        .users()
        .update_status(user_id, UserStatus::Suspended)
        .await
        .unwrap();

    let response = app
        .request("GET", "/api/auth/profile", None, Some(&creds.access_token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "Account is not active. Access denied.");

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "s@x.com", "password": "pw" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_deleted_user_token_is_unauthorized() {
    let app = TestApp::new();
    let admin = app.register("admin@x.com", "pw", "Admin").await;
    let victim = app.register("v@x.com", "pw", "Client").await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/users/{}", victim.user_id),
            None,
            Some(&admin.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", "/api/auth/profile", None, Some(&victim.access_token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "User not found. Authorization denied.");
}

#[tokio::test]
async fn test_permission_grant_unlocks_user_lookup() {
    let app = TestApp::new();
    let admin = app.register("admin@x.com", "pw", "Admin").await;
    let guard = app.register("g@x.com", "pw", "Guard").await;
    let path = format!("/api/users/{}", admin.user_id);

    let response = app
        .request("GET", &path, None, Some(&guard.access_token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "You do not have this permission.");

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{}/permissions", guard.user_id),
            Some(json!({ "permissions": ["users.read", "users.read", "reports.view"] })),
            Some(&admin.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"]["permissions"],
        json!(["reports.view", "users.read"])
    );

    let response = app
        .request("GET", &path, None, Some(&guard.access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["email"], "admin@x.com");
}

#[tokio::test]
async fn test_admin_bypasses_permission_checks() {
    let app = TestApp::new();
    let admin = app.register("admin@x.com", "pw", "Admin").await;
    let guard = app.register("g@x.com", "pw", "Guard").await;

    let response = app
        .request(
            "GET",
            &format!("/api/users/{}", guard.user_id),
            None,
            Some(&admin.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["role"], "Guard");
}

#[tokio::test]
async fn test_non_admin_cannot_use_admin_routes() {
    let app = TestApp::new();
    let manager = app.register("m@x.com", "pw", "Operations Manager").await;
    let guard = app.register("g@x.com", "pw", "Guard").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{}/status", guard.user_id),
            Some(json!({ "status": "suspended" })),
            Some(&manager.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.message(),
        "You do not have permission to access this resource."
    );

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{}/permissions", guard.user_id),
            Some(json!({ "permissions": ["users.read"] })),
            Some(&manager.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
