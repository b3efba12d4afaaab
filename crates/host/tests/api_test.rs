//! Integration tests for API endpoints.
//!
//! Each test builds the router over a freshly seeded in-memory SQLite
//! database and drives it with `oneshot` requests.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use sea_orm::ConnectOptions;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{IdentityOptions, JwtConfig};
use host_lib::handlers::health_handler::HEALTH_MESSAGE;
use host_lib::routes::create_router;
use host_lib::state::AppState;
use identity_service_lib::infra::Database;
use identity_service_lib::seed::{Seeder, DEFAULT_PASSWORD};
use token_service_lib::config::TokenServiceConfig;

const ADMIN: &str = "defaultAdmin@aiminspections.com";
const STANDARD: &str = "defaultUser@aiminspections.com";
const READONLY: &str = "defaultReadonly@aiminspections.com";

async fn connect() -> Database {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    Database::connect_with_options(options)
        .await
        .expect("connect to in-memory sqlite")
}

fn token_config() -> TokenServiceConfig {
    TokenServiceConfig::new(JwtConfig {
        secret: "test-secret-key-for-testing-only-32chars".to_string(),
        expiration_hours: 1,
        refresh_token_days: 1,
    })
    .expect("valid token config")
}

async fn app() -> Router {
    let database = connect().await;

    let results = Seeder::new(database.clone(), IdentityOptions::default())
        .seed_database(true)
        .await;
    assert!(results.all_succeeded(), "seeding failed: {}", results);

    create_router(AppState::new(
        database,
        IdentityOptions::default(),
        token_config(),
    ))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(app: &Router, user_name: &str) -> Value {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/account/login",
            None,
            json!({ "userName": user_name, "password": DEFAULT_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

async fn access_token(app: &Router, user_name: &str) -> String {
    login(app, user_name).await["accessToken"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn employee_id(app: &Router, admin_token: &str, email: &str) -> String {
    let (_, body) = send(
        app,
        empty_request(Method::GET, "/api/employees", Some(admin_token)),
    )
    .await;
    let employees: Vec<Value> = serde_json::from_slice(&body).unwrap();
    employees
        .iter()
        .find(|e| e["email"] == email)
        .and_then(|e| e["id"].as_str())
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_health_returns_static_message() {
    let app = app().await;

    let (status, body) = send(&app, empty_request(Method::GET, "/api/Health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), HEALTH_MESSAGE);
}

#[tokio::test]
async fn test_health_without_schema() {
    // No migrations and no seed data behind the router
    let app = create_router(AppState::new(
        connect().await,
        IdentityOptions::default(),
        token_config(),
    ));

    let (status, body) = send(&app, empty_request(Method::GET, "/api/Health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "App is in good shape!");
}

#[tokio::test]
async fn test_admin_login_returns_token_pair() {
    let app = app().await;

    let tokens = login(&app, ADMIN).await;

    assert_eq!(tokens["tokenType"], "Bearer");
    assert_eq!(tokens["expiresIn"], 3600);
    assert!(!tokens["accessToken"].as_str().unwrap().is_empty());
    assert!(!tokens["refreshToken"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = app().await;

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/account/login",
            None,
            json!({ "userName": ADMIN, "password": "wrong" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_missing_fields_is_bad_request() {
    let app = app().await;

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/account/login",
            None,
            json!({ "userName": "", "password": "" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_employees_requires_token() {
    let app = app().await;

    let (status, _) = send(&app, empty_request(Method::GET, "/api/employees", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_employees_as_admin() {
    let app = app().await;
    let token = access_token(&app, ADMIN).await;

    let (status, body) = send(&app, empty_request(Method::GET, "/api/employees", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    let employees: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(employees.len(), 3);
}

#[tokio::test]
async fn test_list_employees_with_search() {
    let app = app().await;
    let token = access_token(&app, STANDARD).await;

    let (status, body) = send(
        &app,
        empty_request(Method::GET, "/api/employees?search=readonly", Some(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let employees: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0]["email"], READONLY);
}

#[tokio::test]
async fn test_list_employees_forbidden_for_readonly() {
    let app = app().await;
    let token = access_token(&app, READONLY).await;

    let (status, _) = send(&app, empty_request(Method::GET, "/api/employees", Some(&token))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_current_employee() {
    let app = app().await;
    let token = access_token(&app, READONLY).await;

    let (status, body) = send(&app, empty_request(Method::GET, "/api/employees/me", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    let me: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(me["email"], READONLY);
    assert_eq!(me["roles"], json!(["readonly"]));
}

#[tokio::test]
async fn test_deactivate_blocks_login_and_activate_restores_it() {
    let app = app().await;
    let admin = access_token(&app, ADMIN).await;
    let id = employee_id(&app, &admin, STANDARD).await;

    let (status, body) = send(
        &app,
        empty_request(
            Method::POST,
            &format!("/api/employees/{}/deactivate", id),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let result: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(result["succeeded"], true);
    assert_eq!(result["message"], "Deactivate employee was successful");

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/account/login",
            None,
            json!({ "userName": STANDARD, "password": DEFAULT_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        empty_request(
            Method::POST,
            &format!("/api/employees/{}/activate", id),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    login(&app, STANDARD).await;
}

#[tokio::test]
async fn test_deactivate_requires_admin() {
    let app = app().await;
    let admin = access_token(&app, ADMIN).await;
    let standard = access_token(&app, STANDARD).await;
    let id = employee_id(&app, &admin, READONLY).await;

    let (status, _) = send(
        &app,
        empty_request(
            Method::POST,
            &format!("/api/employees/{}/deactivate", id),
            Some(&standard),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let app = app().await;
    let admin = access_token(&app, ADMIN).await;
    let id = employee_id(&app, &admin, ADMIN).await;

    let (status, _) = send(
        &app,
        empty_request(Method::DELETE, &format!("/api/employees/{}", id), Some(&admin)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_hides_employee_and_revokes_refresh_tokens() {
    let app = app().await;
    let admin = access_token(&app, ADMIN).await;
    let readonly_tokens = login(&app, READONLY).await;
    let id = employee_id(&app, &admin, READONLY).await;

    let (status, _) = send(
        &app,
        empty_request(Method::DELETE, &format!("/api/employees/{}", id), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, empty_request(Method::GET, "/api/employees", Some(&admin))).await;
    let employees: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(employees.len(), 2);
    assert!(employees.iter().all(|e| e["email"] != READONLY));

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/account/refresh",
            None,
            json!({ "refreshToken": readonly_tokens["refreshToken"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_then_confirm_then_login() {
    let app = app().await;
    let admin = access_token(&app, ADMIN).await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/account/register",
            None,
            json!({
                "email": "jane.doe@example.com",
                "password": "Str0ng!Pass",
                "firstName": "Jane",
                "lastName": "Doe"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let employee: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(employee["emailConfirmed"], false);
    let id = employee["id"].as_str().unwrap().to_string();

    let credentials = json!({ "userName": "jane.doe@example.com", "password": "Str0ng!Pass" });
    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/account/login", None, credentials.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        empty_request(
            Method::POST,
            &format!("/api/employees/{}/confirm-email", id),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/account/login", None, credentials),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_duplicate_is_conflict() {
    let app = app().await;

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/account/register",
            None,
            json!({
                "email": STANDARD,
                "password": "Str0ng!Pass",
                "firstName": "Another",
                "lastName": "User"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_refresh_then_logout() {
    let app = app().await;
    let tokens = login(&app, STANDARD).await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/account/refresh",
            None,
            json!({ "refreshToken": tokens["refreshToken"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let refreshed: Value = serde_json::from_slice(&body).unwrap();
    let access = refreshed["accessToken"].as_str().unwrap();

    let (status, _) = send(
        &app,
        empty_request(Method::POST, "/api/account/logout", Some(access)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/account/refresh",
            None,
            json!({ "refreshToken": refreshed["refreshToken"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_access_token_rejected_after_deactivation() {
    let app = app().await;
    let admin = access_token(&app, ADMIN).await;
    let standard = access_token(&app, STANDARD).await;
    let id = employee_id(&app, &admin, STANDARD).await;

    let (status, _) = send(&app, empty_request(Method::GET, "/api/employees", Some(&standard))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        empty_request(
            Method::POST,
            &format!("/api/employees/{}/deactivate", id),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, empty_request(Method::GET, "/api/employees", Some(&standard))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, empty_request(Method::GET, "/api/employees/me", Some(&standard))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_access_token_rejected_after_delete() {
    let app = app().await;
    let admin = access_token(&app, ADMIN).await;
    let standard = access_token(&app, STANDARD).await;
    let id = employee_id(&app, &admin, STANDARD).await;

    let (status, _) = send(
        &app,
        empty_request(Method::DELETE, &format!("/api/employees/{}", id), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, empty_request(Method::GET, "/api/employees", Some(&standard))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        &app,
        empty_request(Method::POST, "/api/account/logout", Some(&standard)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
