//! Handlers for the recipient-facing unsubscribe pages.
//!
//! Both handlers accept any method; the unsubscribe handler decides which are
//! allowed. Unknown or malformed tokens and unsupported methods all answer
//! 404.

use axum::extract::{Path, State};
use axum::http::Method;
use axum::response::{IntoResponse, Redirect, Response};
use bulkmail_core::types::Token;
use bulkmail_delivery::Page;
use bulkmail_dispatch::{UnsubscribeOutcome, UnsubscribeRequest};

use crate::error::{AppError, AppResult};
use crate::handlers::html_bytes;
use crate::state::AppState;

/// GET|POST /email/unsubscribe/{token}
///
/// GET shows the unsubscribe page. POST unsubscribes and redirects (303) to
/// the confirmation page.
pub async fn unsubscribe(
    State(state): State<AppState>,
    Path(raw_token): Path<String>,
    method: Method,
) -> AppResult<Response> {
    let token = message_token(&raw_token)?;
    let request = UnsubscribeRequest::from_method(method.as_str());
    match state.service.unsubscribe().request_unsubscribe(token, request).await? {
        UnsubscribeOutcome::Viewed(view) => {
            let html = state.renderer.render_page(Page::Unsubscribe, &view)?;
            Ok(html_bytes(html.into_bytes()))
        }
        UnsubscribeOutcome::Confirmed { redirect_to, .. } => {
            Ok(Redirect::to(&redirect_to).into_response())
        }
    }
}

/// GET /email/unsubscribe/{token}/confirmed
pub async fn unsubscribe_confirmed(
    State(state): State<AppState>,
    Path(raw_token): Path<String>,
    method: Method,
) -> AppResult<Response> {
    let token = message_token(&raw_token)?;
    let request = UnsubscribeRequest::from_method(method.as_str());
    let view = state.service.unsubscribe().confirmed(token, request).await?;
    let html = state.renderer.render_page(Page::UnsubscribeConfirmed, &view)?;
    Ok(html_bytes(html.into_bytes()))
}

/// A segment that is not a token cannot match any message.
fn message_token(raw: &str) -> AppResult<Token> {
    raw.parse::<Token>()
        .map_err(|_| AppError::NotFound(format!("EmailMessage '{raw}' not found")))
}
