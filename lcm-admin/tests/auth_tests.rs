//! Authentication tests
//!
//! Protected routes require a bearer token obtained from POST /api/auth.
//! Uses an on-disk database to exercise the full startup path.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use lcm_admin::{build_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt;

async fn setup_app(dir: &TempDir) -> Router {
    let pool = lcm_common::db::init_database(&dir.path().join("lcm.db"))
        .await
        .expect("Database init should succeed");
    build_router(AppState::from_pool(pool, Some("secret".to_string())))
}

async fn login(app: &Router, password: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "password": password }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn catalog_request(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/api/catalog");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_wrong_password_rejected() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir).await;

    let (status, body) = login(&app, "guess").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir).await;

    let response = app.clone().oneshot(catalog_request(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(catalog_request(Some("not-a-session")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_grants_access() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir).await;

    let (status, body) = login(&app, "secret").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let token = body["token"].as_str().expect("token issued").to_string();

    let response = app
        .clone()
        .oneshot(catalog_request(Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_is_public() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
