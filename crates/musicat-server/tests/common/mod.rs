// Shared test utilities for integration tests
use axum::body::Body;
use axum::http::Request;
use musicat_db::AppState;
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-testing-only";

/// Create a test AppState over the given (usually disconnected) database
pub fn test_app_state(db: sea_orm::DatabaseConnection) -> Arc<AppState> {
    Arc::new(AppState {
        db,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        report_page: "/admin/reports".to_string(),
    })
}

pub fn test_app() -> axum::Router {
    musicat_server::router(
        test_app_state(sea_orm::DatabaseConnection::Disconnected),
        false,
    )
}

pub fn token_for(role: &str) -> String {
    musicat_server::auth::jwt::generate_access_token(
        Uuid::new_v4(),
        &format!("test-{role}"),
        role,
        TEST_JWT_SECRET,
    )
    .expect("token")
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    json_request("POST", uri, token, body)
}

pub fn patch_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    json_request("PATCH", uri, token, body)
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}
