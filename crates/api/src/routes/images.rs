//! Route definitions for image resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// Image routes mounted at `/images`.
///
/// ```text
/// GET    /                       -> list_images
/// POST   /                       -> create_image
/// POST   /{token}/archive        -> archive_image
/// POST   /{token}/unarchive      -> unarchive_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(images::list_images).post(images::create_image))
        .route("/{token}/archive", post(images::archive_image))
        .route("/{token}/unarchive", post(images::unarchive_image))
}
