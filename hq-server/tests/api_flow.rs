//! End-to-end tests over the assembled router: authentication,
//! employee management and the attendance session lifecycle.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::Service;

use hq_server::db::DbService;
use hq_server::db::repository::employee;
use hq_server::services::{TalkTimeSource, build_app};
use hq_server::utils::TimeWindow;
use hq_server::{AppResult, Config, JwtService, ServerState};

use shared::models::EmployeeCreate;

/// Vendor stub returning a fixed number of minutes for every lookup
struct FixedTalkTime(f64);

#[async_trait::async_trait]
impl TalkTimeSource for FixedTalkTime {
    async fn talk_time_minutes(&self, _alias: &str, _window: TimeWindow) -> AppResult<f64> {
        Ok(self.0)
    }
}

/// Bring up the app over a scratch database, seeded with one admin
/// (admin@hq.local / admin-pass-123).
async fn test_app() -> (Router, ServerState, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("hq.db");
    let db = DbService::new(db_path.to_str().expect("utf8 path"))
        .await
        .expect("open database");

    let config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0);
    let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));
    let state = ServerState::new(config, db, jwt, Arc::new(FixedTalkTime(0.0)), None);

    let hash = hq_server::auth::hash_password("admin-pass-123").expect("hash password");
    let admin = EmployeeCreate {
        emp_id: "ADMIN".to_string(),
        name: "Administrator".to_string(),
        email: "admin@hq.local".to_string(),
        password: String::new(),
        role: Some("admin".to_string()),
        department: "Management".to_string(),
        alias_name: "Administrator".to_string(),
    };
    employee::create(&state.db.pool, &admin, &hash)
        .await
        .expect("seed admin");

    (build_app(state.clone()), state, dir)
}

fn get(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

fn json_request(method: &str, path: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn send(app: &mut Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.call(request).await.expect("router call");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

async fn login(app: &mut Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": email, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().expect("token").to_string()
}

async fn create_employee(app: &mut Router, admin_token: &str, emp_id: &str, department: &str) {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/employees",
            Some(admin_token),
            &json!({
                "empId": emp_id,
                "name": format!("Employee {emp_id}"),
                "email": format!("{}@hq.local", emp_id.to_lowercase()),
                "password": "password-123",
                "department": department,
                "aliasName": format!("Alias {emp_id}"),
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create {emp_id} failed: {body}");
}

#[tokio::test]
async fn health_is_public_but_detailed_is_not() {
    let (mut app, _state, _dir) = test_app().await;

    // 1. Basic liveness needs no token
    let (status, body) = send(
        &mut app,
        Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    // 2. The detailed probe sits behind authentication
    let (status, body) = send(
        &mut app,
        Request::builder()
            .uri("/api/health/detailed")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3001");

    // 3. With a token it reports the database check
    let token = login(&mut app, "admin@hq.local", "admin-pass-123").await;
    let (status, body) = send(&mut app, get("/api/health/detailed", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"]["status"], "ok");
}

#[tokio::test]
async fn login_validates_credentials_and_me_returns_profile() {
    let (mut app, _state, _dir) = test_app().await;

    // Wrong password and unknown email answer identically
    let (status, body) = send(
        &mut app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": "admin@hq.local", "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0001");
    assert_eq!(body["message"], "Invalid email or password");

    let (status, body) = send(
        &mut app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": "nobody@hq.local", "password": "wrong" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email or password");

    // Good credentials return a token and the profile without the hash
    let (status, body) = send(
        &mut app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": "admin@hq.local", "password": "admin-pass-123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["empId"], "ADMIN");
    assert!(body["user"].get("passwordHash").is_none());

    let token = body["token"].as_str().expect("token").to_string();
    let (status, body) = send(&mut app, get("/api/auth/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["empId"], "ADMIN");
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn requests_without_a_valid_token_are_rejected() {
    let (mut app, _state, _dir) = test_app().await;

    let (status, body) = send(
        &mut app,
        Request::builder()
            .uri("/api/employees")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3001");

    let (status, body) = send(&mut app, get("/api/employees", "not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3002");
}

#[tokio::test]
async fn employee_management_is_admin_only() {
    let (mut app, _state, _dir) = test_app().await;
    let admin = login(&mut app, "admin@hq.local", "admin-pass-123").await;

    // 1. Admin creates an employee
    create_employee(&mut app, &admin, "EMP001", "CMT").await;

    // 2. Re-using the employee id is a conflict with a clean message
    let (status, body) = send(
        &mut app,
        json_request(
            "POST",
            "/api/employees",
            Some(&admin),
            &json!({
                "empId": "EMP001",
                "name": "Duplicate",
                "email": "other@hq.local",
                "password": "password-123",
                "department": "CMT",
                "aliasName": "Duplicate",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "E0004");
    assert_eq!(body["message"], "Employee ID or email already in use");

    // 3. A non-admin cannot create employees but can list them
    let emp_token = login(&mut app, "emp001@hq.local", "password-123").await;
    let (status, body) = send(
        &mut app,
        json_request(
            "POST",
            "/api/employees",
            Some(&emp_token),
            &json!({
                "empId": "EMP002",
                "name": "Intruder",
                "email": "intruder@hq.local",
                "password": "password-123",
                "department": "CMT",
                "aliasName": "Intruder",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E2001");

    let (status, body) = send(&mut app, get("/api/employees", &emp_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("array").len(), 2);

    // 4. Deactivation locks the account out of login
    let (status, _) = send(
        &mut app,
        json_request(
            "PATCH",
            "/api/employees/EMP001/status",
            Some(&admin),
            &json!({ "status": "inactive" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &mut app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": "emp001@hq.local", "password": "password-123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Account has been disabled");
}

#[tokio::test]
async fn attendance_session_lifecycle() {
    let (mut app, _state, _dir) = test_app().await;
    let admin = login(&mut app, "admin@hq.local", "admin-pass-123").await;
    create_employee(&mut app, &admin, "EMP010", "CMT").await;
    let token = login(&mut app, "emp010@hq.local", "password-123").await;

    // 1. Login opens today's session
    let (status, body) = send(
        &mut app,
        json_request("POST", "/api/attendance/login", Some(&token), &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login: {body}");
    assert_eq!(body["empId"], "EMP010");
    assert_eq!(body["status"], "active");
    assert!(body["loginTime"].as_i64().is_some());
    assert!(body["logoutTime"].is_null());

    // 2. Logging in again the same day conflicts
    let (status, body) = send(
        &mut app,
        json_request("POST", "/api/attendance/login", Some(&token), &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "E0004");
    assert_eq!(body["message"], "Already logged in today");

    // 3. Logout closes the session and derives hours
    let (status, body) = send(
        &mut app,
        json_request("POST", "/api/attendance/logout", Some(&token), &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert!(body["logoutTime"].as_i64().is_some());
    assert_eq!(body["totalHours"].as_f64().expect("hours"), 0.0);

    // 4. A second logout finds nothing active
    let (status, body) = send(
        &mut app,
        json_request("POST", "/api/attendance/logout", Some(&token), &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");
    assert_eq!(body["message"], "No active session");

    // 5. Logging in again after logout still conflicts (one row per day)
    let (status, body) = send(
        &mut app,
        json_request("POST", "/api/attendance/login", Some(&token), &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Attendance already recorded for today");

    // 6. History shows the single closed session
    let (status, body) = send(&mut app, get("/api/attendance/history", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "completed");

    // 7. Employees cannot read someone else's history
    let (status, body) = send(
        &mut app,
        get("/api/attendance/history?empId=ADMIN", &token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E2001");

    // 8. Admins can
    let (status, body) = send(
        &mut app,
        get("/api/attendance/history?empId=EMP010", &admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("array").len(), 1);
}

#[tokio::test]
async fn admin_corrects_attendance_status() {
    let (mut app, _state, _dir) = test_app().await;
    let admin = login(&mut app, "admin@hq.local", "admin-pass-123").await;
    create_employee(&mut app, &admin, "EMP020", "Sales").await;
    let token = login(&mut app, "emp020@hq.local", "password-123").await;

    let (_, body) = send(
        &mut app,
        json_request("POST", "/api/attendance/login", Some(&token), &json!({})),
    )
    .await;
    let record_id = body["id"].as_i64().expect("record id");

    // Employees cannot correct records
    let (status, _) = send(
        &mut app,
        json_request(
            "PATCH",
            &format!("/api/attendance/{record_id}/status"),
            Some(&token),
            &json!({ "status": "absent" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin flips the row to ABSENT
    let (status, body) = send(
        &mut app,
        json_request(
            "PATCH",
            &format!("/api/attendance/{record_id}/status"),
            Some(&admin),
            &json!({ "status": "absent" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "absent");

    // ACTIVE is reserved for real logins
    let (status, body) = send(
        &mut app,
        json_request(
            "PATCH",
            &format!("/api/attendance/{record_id}/status"),
            Some(&admin),
            &json!({ "status": "active" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
}
