//! HTTP-level integration tests for the `/api/v1/images` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post, post_json};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_image_defaults_to_marketing(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/v1/images",
        json!({ "description": "Logo", "url": "https://cdn.acme.test/logo.png" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let image = body_json(response).await["data"].clone();
    assert_eq!(image["category"], "Marketing");
    assert_eq!(image["archived"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_image_with_blank_description_is_rejected(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/v1/images",
        json!({ "description": " ", "url": "https://cdn.acme.test/logo.png" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn archived_images_leave_the_default_list(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/images",
        json!({ "description": "Old", "url": "https://cdn.acme.test/old.png", "category": "Internal" }),
    )
    .await;
    let token = body_json(response).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = post(build_test_app(pool.clone()), &format!("/api/v1/images/{token}/archive")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get(build_test_app(pool.clone()), "/api/v1/images").await).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let json = body_json(get(build_test_app(pool), "/api/v1/images?include_archived=true").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn archiving_unknown_image_returns_404(pool: PgPool) {
    let uri = format!("/api/v1/images/{}/archive", bulkmail_core::types::new_token());
    let response = post(build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
