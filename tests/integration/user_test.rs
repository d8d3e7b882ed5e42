//! Integration tests for admin user management.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let app = TestApp::new();
    let admin = app.register("admin@x.com", "pw", "Admin").await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/users/{}", admin.user_id),
            None,
            Some(&admin.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "You cannot delete your own account.");
}

#[tokio::test]
async fn test_suspend_and_reactivate_user() {
    let app = TestApp::new();
    let admin = app.register("admin@x.com", "pw", "Admin").await;
    let guard = app.register("g@x.com", "pw", "Guard").await;
    let status_path = format!("/api/users/{}/status", guard.user_id);

    let response = app
        .request(
            "PUT",
            &status_path,
            Some(json!({ "status": "suspended" })),
            Some(&admin.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "User suspended successfully.");
    assert_eq!(response.body["data"]["status"], "suspended");

    let response = app
        .request("GET", "/api/auth/profile", None, Some(&guard.access_token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "PUT",
            &status_path,
            Some(json!({ "status": "active" })),
            Some(&admin.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "User activated successfully.");

    let response = app
        .request("GET", "/api/auth/profile", None, Some(&guard.access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // Sessions dropped at suspension stay gone.
    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": guard.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_status_is_rejected() {
    let app = TestApp::new();
    let admin = app.register("admin@x.com", "pw", "Admin").await;
    let guard = app.register("g@x.com", "pw", "Guard").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{}/status", guard.user_id),
            Some(json!({ "status": "banished" })),
            Some(&admin.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overlong_permission_name_is_rejected() {
    let app = TestApp::new();
    let admin = app.register("admin@x.com", "pw", "Admin").await;
    let guard = app.register("g@x.com", "pw", "Guard").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{}/permissions", guard.user_id),
            Some(json!({ "permissions": ["users.read", "p".repeat(101)] })),
            Some(&admin.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    assert_eq!(
        response.message(),
        "Permission names must be at most 100 characters."
    );
}

#[tokio::test]
async fn test_missing_user_is_not_found() {
    let app = TestApp::new();
    let admin = app.register("admin@x.com", "pw", "Admin").await;

    let response = app
        .request(
            "DELETE",
            "/api/users/00000000-0000-0000-0000-000000000000",
            None,
            Some(&admin.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_health_reports_memory_backend() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["database"], "memory");
}
