//! Recipient-facing unsubscribe links.

use axum::routing::any;
use axum::Router;

use crate::handlers::unsubscribe;
use crate::state::AppState;

/// Unsubscribe routes mounted at `/email/unsubscribe`.
///
/// Every method is routed to the handlers so that unsupported ones get the
/// same 404 as unknown tokens.
///
/// ```text
/// GET    /{token}                -> unsubscribe page
/// POST   /{token}                -> confirm, redirect to /{token}/confirmed
/// GET    /{token}/confirmed      -> confirmation page
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{token}", any(unsubscribe::unsubscribe))
        .route("/{token}/confirmed", any(unsubscribe::unsubscribe_confirmed))
}
