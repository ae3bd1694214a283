pub mod batches;
pub mod health;
pub mod images;
pub mod recipients;
pub mod unsubscribe;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /batches                                 list, create
/// /batches/preview                         render unsaved fields (POST)
/// /batches/dispatch                        create + dispatch (POST)
/// /batches/{token}                         get
/// /batches/{token}/archive                 archive (POST)
/// /batches/{token}/unarchive               unarchive (POST)
/// /batches/{token}/clone                   clone under a new title (POST)
/// /batches/{token}/dispatch                clone + dispatch (POST)
/// /batches/{token}/preview                 render stored batch (GET)
/// /batches/{token}/messages                messages created for the batch
/// /batches/{token}/stats                   sent / unsubscribed counts
///
/// /images                                  list, create
/// /images/{token}/archive                  archive (POST)
/// /images/{token}/unarchive                unarchive (POST)
///
/// /recipients/{id}/can-email               DNC status
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/batches", batches::router())
        .nest("/images", images::router())
        .nest("/recipients", recipients::router())
}
