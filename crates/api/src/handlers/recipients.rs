//! Handlers for recipient do-not-contact status.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use bulkmail_core::types::Token;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CanEmailResponse {
    pub recipient_id: Token,
    pub can_email: bool,
}

/// GET /api/v1/recipients/{id}/can-email
///
/// `false` once the recipient has unsubscribed from any message.
pub async fn can_email(
    State(state): State<AppState>,
    Path(id): Path<Token>,
) -> AppResult<impl IntoResponse> {
    let can_email = state.service.can_email(id).await?;
    Ok(Json(DataResponse {
        data: CanEmailResponse {
            recipient_id: id,
            can_email,
        },
    }))
}
