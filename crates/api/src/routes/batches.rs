//! Route definitions for email batches.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::batches;
use crate::state::AppState;

/// Batch routes mounted at `/batches`.
///
/// ```text
/// GET    /                       -> list_batches
/// POST   /                       -> create_batch
/// POST   /preview                -> preview_fields
/// POST   /dispatch               -> dispatch_new
/// GET    /{token}                -> get_batch
/// POST   /{token}/archive        -> archive_batch
/// POST   /{token}/unarchive      -> unarchive_batch
/// POST   /{token}/clone          -> clone_batch
/// POST   /{token}/dispatch       -> dispatch_existing
/// GET    /{token}/preview        -> preview_batch
/// GET    /{token}/messages       -> list_messages
/// GET    /{token}/stats          -> batch_stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(batches::list_batches).post(batches::create_batch))
        .route("/preview", post(batches::preview_fields))
        .route("/dispatch", post(batches::dispatch_new))
        .route("/{token}", get(batches::get_batch))
        .route("/{token}/archive", post(batches::archive_batch))
        .route("/{token}/unarchive", post(batches::unarchive_batch))
        .route("/{token}/clone", post(batches::clone_batch))
        .route("/{token}/dispatch", post(batches::dispatch_existing))
        .route("/{token}/preview", get(batches::preview_batch))
        .route("/{token}/messages", get(batches::list_messages))
        .route("/{token}/stats", get(batches::batch_stats))
}
