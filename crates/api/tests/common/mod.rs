#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use jsonwebtoken::{encode, EncodingKey, Header};

use sanctum_api::auth::jwt::{Claims, JwtConfig};
use sanctum_api::config::ServerConfig;
use sanctum_api::router::build_app_router;
use sanctum_api::state::AppState;
use sanctum_core::governance::AssetGovernance;
use sanctum_core::relationship::{
    CustodianRecord, DepartmentRecord, DirectorySeed, InMemoryDirectory,
};
use sanctum_core::store::{InMemoryAssetStore, InMemoryUsageRequestStore};

const TEST_JWT_SECRET: &str = "sanctum-test-secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
        directory_seed_path: None,
    }
}

/// Directory with two active departments, one retired department and two
/// custodians (one of them inactive).
pub fn test_directory() -> InMemoryDirectory {
    InMemoryDirectory::from_seed(DirectorySeed {
        departments: vec![
            DepartmentRecord {
                id: "dept-rituals".into(),
                name: "Rituals".into(),
                active: true,
            },
            DepartmentRecord {
                id: "dept-kitchen".into(),
                name: "Temple Kitchen".into(),
                active: true,
            },
            DepartmentRecord {
                id: "dept-retired".into(),
                name: "Old Annex".into(),
                active: false,
            },
        ],
        custodians: vec![
            CustodianRecord {
                id: "priest-1".into(),
                name: "Head Priest".into(),
                department_id: Some("dept-rituals".into()),
                active: true,
            },
            CustodianRecord {
                id: "priest-gone".into(),
                name: "Former Priest".into(),
                department_id: Some("dept-rituals".into()),
                active: false,
            },
        ],
    })
}

/// Build the full application router over fresh in-memory stores, using the
/// same middleware stack as production.
pub fn build_test_app() -> Router {
    let config = test_config();
    let directory = Arc::new(test_directory());

    let governance = AssetGovernance::new(
        Arc::new(InMemoryAssetStore::new()),
        Arc::new(InMemoryUsageRequestStore::new()),
        directory.clone(),
        directory,
    );

    let state = AppState {
        governance: Arc::new(governance),
        config: Arc::new(config.clone()),
    };

    build_app_router(state, &config)
}

/// Sign a 15-minute access token for `user_id` acting from `module`, as the
/// identity provider would.
pub fn token_for(user_id: &str, module: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        module: module.to_string(),
        exp: now + 15 * 60,
        iat: now,
        jti: uuid::Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Token for the Asset Governance module.
pub fn assets_token() -> String {
    token_for("registrar", "Assets")
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn send_json_auth(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send_json_auth(app, Method::POST, uri, body, token).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send_json_auth(app, Method::PUT, uri, body, token).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
