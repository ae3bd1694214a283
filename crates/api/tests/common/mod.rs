#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response};
use axum::Router;
use bulkmail_core::image::{ImageCategory, NewImage};
use bulkmail_core::types::Token;
use bulkmail_db::models::customer::CreateCustomer;
use bulkmail_db::repositories::{CustomerRepo, ImageRepo};
use bulkmail_db::PgStore;
use bulkmail_delivery::{LogMailer, Renderer};
use bulkmail_dispatch::{DispatchConfig, MassEmailService, Stores};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use bulkmail_api::config::ServerConfig;
use bulkmail_api::router::build_app_router;
use bulkmail_api::state::{AppState, MailDelivery};

/// Base URL the unsubscribe links in test mail point at.
pub const UNSUBSCRIBE_BASE: &str = "http://localhost:3000/email/unsubscribe";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the full application router on top of `pool`.
///
/// Mail goes through `LogMailer`, which accepts every message.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let renderer = Renderer::new().unwrap();
    let dispatch_config = DispatchConfig::new("news@acme.test", UNSUBSCRIBE_BASE).unwrap();

    let service = MassEmailService::new(
        Stores::shared(Arc::new(PgStore::new(pool.clone()))),
        Arc::new(LogMailer::new(renderer.clone())),
        dispatch_config,
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        service: Arc::new(service),
        renderer: Arc::new(renderer),
        mail_delivery: MailDelivery::Log,
    };

    build_app_router(state, &config).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

pub async fn seed_customer(pool: &PgPool, email: &str, first_name: &str) -> Token {
    let input = CreateCustomer {
        email: email.to_string(),
        first_name: first_name.to_string(),
        last_name: "Tester".to_string(),
        company: Some("Acme".to_string()),
    };
    CustomerRepo::create(pool, &input).await.unwrap().id
}

pub async fn seed_image(pool: &PgPool, name: &str) -> Token {
    let input = NewImage {
        description: name.to_string(),
        url: format!("https://cdn.acme.test/{name}.png"),
        category: ImageCategory::Marketing,
    };
    ImageRepo::create(pool, &input).await.unwrap().token
}

/// Minimal valid batch fields referencing two seeded images.
pub async fn batch_fields(pool: &PgPool, title: &str) -> serde_json::Value {
    let logo = seed_image(pool, "logo").await;
    let hero = seed_image(pool, "hero").await;
    serde_json::json!({
        "batch_title": title,
        "template_file": "simple.html",
        "subject": "Spring sale",
        "title": "Everything must go",
        "custom_content": "Line one\nLine two",
        "company_logo": logo,
        "primary_image": hero,
    })
}
