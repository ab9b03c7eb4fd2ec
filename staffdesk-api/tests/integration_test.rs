/// Integration tests for the StaffDesk API
///
/// These run the full router against a PostgreSQL database. Set
/// `DATABASE_URL` or provide the default test database from `common`.

mod common;

use axum::http::StatusCode;
use common::{unique_email, TestContext, TEST_PASSWORD};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use staffdesk_shared::models::employee::EmployeeRecord;
use uuid::Uuid;

fn employee_body(email: &str, salary: &str, hired_at: &str) -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": email,
        "position": "Engineer",
        "salaryAmount": salary,
        "salaryCurrency": "EUR",
        "hiredAt": hired_at,
    })
}

async fn create_employee(ctx: &TestContext, salary: &str, hired_at: &str) -> Value {
    let (status, body) = ctx
        .as_user(
            "POST",
            "/api/employees",
            Some(employee_body(&unique_email("employee"), salary, hired_at)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    body
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().expect("decimal string").parse().expect("decimal")
}

#[tokio::test]
async fn test_create_employee_persists_row() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("ada");

    let (status, body) = ctx
        .as_user("POST", "/api/employees", Some(employee_body(&email, "4200.00", "2021-03-01")))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], email);
    assert_eq!(body["fullName"], "Ada Lovelace");
    assert_eq!(decimal(&body["salaryAmount"]), Decimal::new(4200, 0));

    let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
    let stored = EmployeeRecord::find_by_id(&ctx.db, id).await.unwrap().unwrap();
    assert_eq!(stored.email, email);

    let (status, fetched) = ctx.as_user("GET", &format!("/api/employees/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], body["id"]);

    ctx.as_user("DELETE", &format!("/api/employees/{}", id), None).await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_duplicate_employee_email_is_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("dup");

    let (status, first) = ctx
        .as_user("POST", "/api/employees", Some(employee_body(&email, "3000", "2022-01-10")))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx
        .as_user("POST", "/api/employees", Some(employee_body(&email, "3000", "2022-01-10")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already exists");

    ctx.as_user("DELETE", &format!("/api/employees/{}", first["id"].as_str().unwrap()), None)
        .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_employee_update_and_delete() {
    let ctx = TestContext::new().await.unwrap();
    let employee = create_employee(&ctx, "3500", "2020-06-15").await;
    let uri = format!("/api/employees/{}", employee["id"].as_str().unwrap());

    let (status, body) = ctx
        .as_user("PATCH", &uri, Some(json!({ "position": "Staff Engineer" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["position"], "Staff Engineer");
    assert_eq!(body["email"], employee["email"]);

    let (status, _) = ctx.as_user("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = ctx.as_user("GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_employee_collection_envelope() {
    let ctx = TestContext::new().await.unwrap();
    let employee = create_employee(&ctx, "2800", "2019-09-01").await;
    let email = employee["email"].as_str().unwrap();

    let (status, body) = ctx
        .as_user("GET", &format!("/api/employees?email={}&itemsPerPage=5", email), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["@type"], "Collection");
    assert_eq!(body["totalItems"], 1);
    assert_eq!(body["member"][0]["id"], employee["id"]);
    assert!(body["view"]["first"].as_str().unwrap().contains("page=1"));
    assert!(body["view"].get("next").is_none());

    ctx.as_user("DELETE", &format!("/api/employees/{}", employee["id"].as_str().unwrap()), None)
        .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_login_refresh_and_me() {
    let ctx = TestContext::new().await.unwrap();
    let email = ctx.user.email().to_string();

    let (status, pair) = ctx
        .send(
            "POST",
            "/api/login_check",
            None,
            Some(json!({ "username": email, "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(pair["token"].is_string());
    assert!(pair["refresh_token"].is_string());

    let (status, login) = ctx
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["message"], "Login successful");
    assert_eq!(login["user"]["email"], email);
    assert!(login["user"].get("passwordHash").is_none());
    assert!(!login["user"]["lastLoginAt"].is_null());

    let (status, refreshed) = ctx
        .send(
            "POST",
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": login["refresh_token"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = refreshed["token"].as_str().unwrap();

    let (status, me) = ctx.send("GET", "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], ctx.user.id().to_string());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": ctx.user.email().as_str(), "password": "not-the-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, _) = ctx
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": unique_email("ghost"), "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_access_token_is_not_a_refresh_token() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx
        .send(
            "POST",
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": ctx.user_token })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_payroll_lifecycle() {
    let ctx = TestContext::new().await.unwrap();
    let employee = create_employee(&ctx, "4000", "2021-01-04").await;

    let (status, payroll) = ctx
        .as_user(
            "POST",
            "/api/payrolls",
            Some(json!({
                "employee": employee["id"],
                "periodStart": "2024-05-01",
                "periodEnd": "2024-05-31",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", payroll);
    assert_eq!(payroll["status"], "pending");
    assert_eq!(decimal(&payroll["grossAmount"]), Decimal::new(4000, 0));
    assert_eq!(decimal(&payroll["netAmount"]), Decimal::new(2700, 0));

    let base = format!("/api/payrolls/{}", payroll["id"].as_str().unwrap());

    let (status, _) = ctx.as_user("POST", &format!("{}/pay", base), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, processed) = ctx.as_user("POST", &format!("{}/process", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(processed["status"], "processed");
    assert!(!processed["processedAt"].is_null());

    let (status, paid) = ctx.as_user("POST", &format!("{}/pay", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "paid");

    let (status, _) = ctx.as_user("POST", &format!("{}/cancel", base), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = ctx
        .as_user("PATCH", &base, Some(json!({ "grossAmount": "5000" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, list) = ctx
        .as_user(
            "GET",
            &format!("/api/payrolls?employee={}&status=paid", employee["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["totalItems"], 1);

    ctx.as_user("DELETE", &format!("/api/employees/{}", employee["id"].as_str().unwrap()), None)
        .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_payroll_for_unknown_employee() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .as_user(
            "POST",
            "/api/payrolls",
            Some(json!({
                "employee": Uuid::new_v4(),
                "periodStart": "2024-05-01",
                "periodEnd": "2024-05-31",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "employee");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_vacation_requires_eligibility() {
    let ctx = TestContext::new().await.unwrap();
    let today = chrono::Utc::now().date_naive();
    let employee = create_employee(&ctx, "3100", &today.to_string()).await;

    let (status, body) = ctx
        .as_user(
            "POST",
            "/api/vacations",
            Some(json!({
                "employee": employee["id"],
                "startDate": "2030-07-01",
                "endDate": "2030-07-05",
                "reason": "Summer",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "unexpected body: {}", body);

    ctx.as_user("DELETE", &format!("/api/employees/{}", employee["id"].as_str().unwrap()), None)
        .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_vacation_approval_is_admin_only() {
    let ctx = TestContext::new().await.unwrap();
    let employee = create_employee(&ctx, "3100", "2020-02-03").await;

    let (status, vacation) = ctx
        .as_user(
            "POST",
            "/api/vacations",
            Some(json!({
                "employee": employee["id"],
                "startDate": "2030-07-01",
                "endDate": "2030-07-05",
                "reason": "Summer",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", vacation);
    assert_eq!(vacation["status"], "pending");
    assert_eq!(vacation["days"], 5);

    let base = format!("/api/vacations/{}", vacation["id"].as_str().unwrap());

    let (status, _) = ctx.as_user("POST", &format!("{}/approve", base), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, approved) = ctx.as_admin("POST", &format!("{}/approve", base), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    let (status, _) = ctx
        .as_admin("POST", &format!("{}/reject", base), Some(json!({ "reason": "Too late" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    ctx.as_user("DELETE", &format!("/api/employees/{}", employee["id"].as_str().unwrap()), None)
        .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_vacation_rejection_with_reason() {
    let ctx = TestContext::new().await.unwrap();
    let employee = create_employee(&ctx, "3100", "2020-02-03").await;

    let (_, vacation) = ctx
        .as_user(
            "POST",
            "/api/vacations",
            Some(json!({
                "employee": employee["id"],
                "startDate": "2030-08-03",
                "endDate": "2030-08-09",
                "reason": "Family trip",
            })),
        )
        .await;

    let (status, rejected) = ctx
        .as_admin(
            "POST",
            &format!("/api/vacations/{}/reject", vacation["id"].as_str().unwrap()),
            Some(json!({ "reason": "Release week" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["status"], "rejected");
    assert_eq!(rejected["rejectionReason"], "Release week");

    ctx.as_user("DELETE", &format!("/api/employees/{}", employee["id"].as_str().unwrap()), None)
        .await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_user_management() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = ctx.as_user("GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .as_admin(
            "POST",
            "/api/users",
            Some(json!({ "email": unique_email("weak"), "password": "short" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let email = unique_email("clerk");
    let (status, created) = ctx
        .as_admin(
            "POST",
            "/api/users",
            Some(json!({ "email": email, "password": TEST_PASSWORD, "roles": ["ROLE_USER"] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", created);
    assert_eq!(created["isActive"], true);
    assert!(created.get("password").is_none());

    let uri = format!("/api/users/{}", created["id"].as_str().unwrap());
    let (status, updated) = ctx.as_admin("PATCH", &uri, Some(json!({ "isActive": false }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["isActive"], false);

    let (status, body) = ctx
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Account is disabled");

    let (status, _) = ctx.as_admin("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let own = format!("/api/users/{}", ctx.admin.id());
    let (status, _) = ctx.as_admin("DELETE", &own, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_health_reports_database() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["migrations"], "up_to_date");

    ctx.cleanup().await.unwrap();
}
