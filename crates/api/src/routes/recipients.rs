use axum::routing::get;
use axum::Router;

use crate::handlers::recipients;
use crate::state::AppState;

/// Recipient routes mounted at `/recipients`.
///
/// ```text
/// GET    /{id}/can-email         -> can_email
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/can-email", get(recipients::can_email))
}
