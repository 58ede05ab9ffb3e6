//! Router-level access-control tests: login, role gates, public routes
//! and soft-deleted accounts.

mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use shared::models::Role;
use tower::ServiceExt;

use noc_server::auth::{JwtConfig, JwtService};
use noc_server::core::{Config, ServerState, build_router};
use noc_server::db::repository::user;

use common::{seed_customer, seed_department, seed_fault, seed_user, test_pool};

async fn test_state() -> ServerState {
    let jwt_config = JwtConfig {
        secret: "integration-test-secret-with-enough-length".to_string(),
        expiration_minutes: 60,
        issuer: "noc-server".to_string(),
        audience: "noc-clients".to_string(),
    };
    let config = Config {
        db_path: ":memory:".to_string(),
        http_port: 0,
        jwt: jwt_config.clone(),
        environment: "test".to_string(),
        log_level: "warn".to_string(),
        log_dir: None,
    };
    let pool = test_pool().await;
    ServerState::new(config, pool, Arc::new(JwtService::with_config(jwt_config)))
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            None,
            json!({ "username": username, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn health_is_public() {
    let state = test_state().await;
    let app = build_router(state);

    let response = app.oneshot(get("/api/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let state = test_state().await;
    let app = build_router(state);

    let response = app.clone().oneshot(get("/api/faults", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E3001");

    let garbage = app
        .oneshot(get("/api/faults", Some("not-a-jwt")))
        .await
        .unwrap();
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_issues_a_working_token() {
    let state = test_state().await;
    let dept = seed_department(&state.pool, "NOC").await;
    seed_user(&state.pool, "operator", "correct horse battery", Role::User, Some(dept)).await;
    let app = build_router(state);

    let token = login(&app, "operator", "correct horse battery").await;

    let response = app.oneshot(get("/api/faults", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn failed_logins_share_one_error_shape() {
    let state = test_state().await;
    seed_user(&state.pool, "operator", "correct horse battery", Role::User, None).await;
    let app = build_router(state);

    let wrong_password = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            None,
            json!({ "username": "operator", "password": "wrong" }),
        ))
        .await
        .unwrap();
    let unknown_user = app
        .oneshot(post_json(
            "/api/auth/login",
            None,
            json!({ "username": "nobody", "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown_user.status(), StatusCode::BAD_REQUEST);
    let a = body_json(wrong_password).await;
    let b = body_json(unknown_user).await;
    assert_eq!(a, b);
    assert_eq!(a["message"], "Invalid username or password");
}

#[tokio::test]
async fn non_admin_is_blocked_from_admin_routes() {
    let state = test_state().await;
    let dept = seed_department(&state.pool, "NOC").await;
    seed_user(&state.pool, "operator", "pw-operator-1", Role::User, Some(dept)).await;
    let app = build_router(state);

    let token = login(&app, "operator", "pw-operator-1").await;

    let users = app
        .clone()
        .oneshot(get("/api/users", Some(&token)))
        .await
        .unwrap();
    assert_eq!(users.status(), StatusCode::FORBIDDEN);
    let body = body_json(users).await;
    assert_eq!(body["code"], "E2001");

    let delete = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/faults/1")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(delete.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_list_users_but_not_soft_deleted_ones() {
    let state = test_state().await;
    seed_user(&state.pool, "boss", "pw-boss-1", Role::Admin, None).await;
    let retired = seed_user(&state.pool, "retired", "pw-retired-1", Role::User, None).await;
    user::soft_delete(&state.pool, retired).await.unwrap();
    let app = build_router(state);

    let token = login(&app, "boss", "pw-boss-1").await;

    let response = app
        .clone()
        .oneshot(get("/api/users", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let usernames: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert!(usernames.contains(&"boss"));
    assert!(!usernames.contains(&"retired"));

    // and the retired account can no longer authenticate
    let rejected = app
        .oneshot(post_json(
            "/api/auth/login",
            None,
            json!({ "username": "retired", "password": "pw-retired-1" }),
        ))
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn department_dashboard_is_scoped_to_the_callers_department() {
    let state = test_state().await;
    let noc = seed_department(&state.pool, "NOC").await;
    let field = seed_department(&state.pool, "Field Ops").await;
    let cust = seed_customer(&state.pool, "Acme").await;
    seed_user(&state.pool, "operator", "pw-operator-1", Role::User, Some(noc)).await;
    seed_user(&state.pool, "boss", "pw-boss-1", Role::Admin, None).await;
    seed_fault(&state.pool, "Core link down", cust, noc).await;
    seed_fault(&state.pool, "POP power loss", cust, field).await;
    let app = build_router(state);

    let token = login(&app, "operator", "pw-operator-1").await;

    // a caller-supplied department_id must not widen the scope
    let response = app
        .clone()
        .oneshot(get(
            &format!("/api/faults/department/dashboard?department_id={field}"),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["description"], "Core link down");
    assert_eq!(rows[0]["department_name"], "NOC");

    // admins use the global views instead
    let admin_token = login(&app, "boss", "pw-boss-1").await;
    let denied = app
        .oneshot(get("/api/faults/department/dashboard", Some(&admin_token)))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    let body = body_json(denied).await;
    assert_eq!(body["code"], "E2001");
}

#[tokio::test]
async fn department_metrics_and_charts_cover_only_own_faults() {
    let state = test_state().await;
    let noc = seed_department(&state.pool, "NOC").await;
    let field = seed_department(&state.pool, "Field Ops").await;
    let cust = seed_customer(&state.pool, "Acme").await;
    seed_user(&state.pool, "operator", "pw-operator-1", Role::User, Some(noc)).await;
    seed_fault(&state.pool, "Core link down", cust, noc).await;
    seed_fault(&state.pool, "Port flapping", cust, noc).await;
    seed_fault(&state.pool, "POP power loss", cust, field).await;
    let app = build_router(state);

    let token = login(&app, "operator", "pw-operator-1").await;

    let metrics = app
        .clone()
        .oneshot(get("/api/faults/department/metrics", Some(&token)))
        .await
        .unwrap();
    assert_eq!(metrics.status(), StatusCode::OK);
    let counts = body_json(metrics).await;
    assert_eq!(counts["open"], 2);
    assert_eq!(counts["in_progress"], 0);

    let charts = app
        .oneshot(get("/api/faults/department/charts", Some(&token)))
        .await
        .unwrap();
    assert_eq!(charts.status(), StatusCode::OK);
    let body = body_json(charts).await;

    // full trailing week, zero-filled, with both of today's faults in it
    let trend = body["trend"].as_array().unwrap();
    assert_eq!(trend.len(), 7);
    assert_eq!(
        trend.iter().map(|p| p["count"].as_i64().unwrap()).sum::<i64>(),
        2
    );
    assert_eq!(trend[6]["count"], 2);

    assert_eq!(body["severity_counts"]["Low"], 2);
    assert_eq!(body["status_counts"]["open"], 2);
}

#[tokio::test]
async fn fault_creation_and_listing_through_the_api() {
    let state = test_state().await;
    let dept = seed_department(&state.pool, "NOC").await;
    let cust = seed_customer(&state.pool, "Acme").await;
    seed_user(&state.pool, "operator", "pw-operator-1", Role::User, Some(dept)).await;
    let app = build_router(state);

    let token = login(&app, "operator", "pw-operator-1").await;

    let created = app
        .clone()
        .oneshot(post_json(
            "/api/faults",
            Some(&token),
            json!({
                "description": "Core link down",
                "status": "Open",
                "customer_id": cust,
                "assigned_to_id": dept,
                "ticket_number": "TT-1001"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::OK);
    let fault = body_json(created).await;
    assert_eq!(fault["severity"], "Low");

    let listed = app
        .oneshot(get("/api/faults?search=Acme", Some(&token)))
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    let body = body_json(listed).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["ticket_number"], "TT-1001");
    assert_eq!(rows[0]["customer_company"], "Acme");
}
