/// Router behaviour that resolves before any query runs, so these tests
/// use a lazily connecting pool and need no database.

mod common;

use axum::http::StatusCode;
use common::{offline_app, send, test_config, token_for};
use serde_json::json;
use staffdesk_shared::auth::password::{hash_password_with, HashParams};
use staffdesk_shared::domain::identity::Email;
use staffdesk_shared::domain::user::User;

fn regular_user_token() -> String {
    let hash = hash_password_with("Test!Pass123", HashParams::fast()).unwrap();
    let user = User::register(Email::new("offline@example.com").unwrap(), hash, vec![]);
    token_for(&user, &test_config())
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = offline_app();

    for uri in ["/api/employees", "/api/payrolls", "/api/vacations", "/api/users", "/api/auth/me"] {
        let (status, body) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} should require a token", uri);
        assert_eq!(body["error"], "unauthorized");
    }
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = offline_app();

    let (status, _) = send(&app, "GET", "/api/employees", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_routes_forbidden_for_regular_user() {
    let app = offline_app();
    let token = regular_user_token();

    let (status, body) = send(&app, "GET", "/api/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn test_negative_salary_is_unprocessable() {
    let app = offline_app();
    let token = regular_user_token();

    let (status, body) = send(
        &app,
        "POST",
        "/api/employees",
        Some(&token),
        Some(json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "email": "grace@example.com",
            "position": "Engineer",
            "salaryAmount": "-100",
            "salaryCurrency": "EUR",
            "hiredAt": "2021-03-01",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "amount");
}

#[tokio::test]
async fn test_salary_above_column_limit_is_unprocessable() {
    let app = offline_app();
    let token = regular_user_token();

    let (status, body) = send(
        &app,
        "POST",
        "/api/employees",
        Some(&token),
        Some(json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "email": "grace@example.com",
            "position": "Engineer",
            "salaryAmount": "100000000000",
            "salaryCurrency": "EUR",
            "hiredAt": "2021-03-01",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "amount");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = offline_app();
    let token = regular_user_token();

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/employees")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_security_headers_on_error_responses() {
    let app = offline_app();

    let request = axum::http::Request::builder()
        .uri("/api/employees")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}
