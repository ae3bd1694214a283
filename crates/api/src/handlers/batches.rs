//! Handlers for email batches: CRUD, cloning, previews and dispatch.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bulkmail_core::batch::BatchFields;
use bulkmail_core::error::CoreError;
use bulkmail_core::recipient::Recipient;
use bulkmail_core::types::Token;
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::{html_bytes, ArchiveFilter};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CloneBatchRequest {
    pub batch_title: String,
}

/// Create a batch from `batch` and send it to `recipient_ids`, in order.
#[derive(Debug, Deserialize)]
pub struct DispatchNewRequest {
    pub batch: BatchFields,
    pub recipient_ids: Vec<Token>,
}

/// Clone the batch in the path under `batch_title` and send the copy.
#[derive(Debug, Deserialize)]
pub struct DispatchExistingRequest {
    pub batch_title: String,
    pub recipient_ids: Vec<Token>,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/batches
///
/// Batches ordered by title. Archived batches only with
/// `?include_archived=true`.
pub async fn list_batches(
    State(state): State<AppState>,
    Query(filter): Query<ArchiveFilter>,
) -> AppResult<impl IntoResponse> {
    let batches = state
        .service
        .stores()
        .batches
        .list(filter.include_archived)
        .await?;
    Ok(Json(DataResponse { data: batches }))
}

/// POST /api/v1/batches
pub async fn create_batch(
    State(state): State<AppState>,
    Json(fields): Json<BatchFields>,
) -> AppResult<impl IntoResponse> {
    let batch = state.service.create_batch(fields).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: batch })))
}

/// GET /api/v1/batches/{token}
pub async fn get_batch(
    State(state): State<AppState>,
    Path(token): Path<Token>,
) -> AppResult<impl IntoResponse> {
    let batch = state.service.find_batch(token).await?;
    Ok(Json(DataResponse { data: batch }))
}

/// POST /api/v1/batches/{token}/archive
pub async fn archive_batch(
    State(state): State<AppState>,
    Path(token): Path<Token>,
) -> AppResult<impl IntoResponse> {
    set_archived(&state, token, true).await
}

/// POST /api/v1/batches/{token}/unarchive
pub async fn unarchive_batch(
    State(state): State<AppState>,
    Path(token): Path<Token>,
) -> AppResult<impl IntoResponse> {
    set_archived(&state, token, false).await
}

async fn set_archived(state: &AppState, token: Token, archived: bool) -> AppResult<Response> {
    if !state.service.stores().batches.set_archived(token, archived).await? {
        return Err(CoreError::not_found("EmailBatch", token).into());
    }
    tracing::info!(batch_token = %token, archived, "Batch archive flag updated");
    let batch = state.service.find_batch(token).await?;
    Ok(Json(DataResponse { data: batch }).into_response())
}

/// POST /api/v1/batches/{token}/clone
pub async fn clone_batch(
    State(state): State<AppState>,
    Path(token): Path<Token>,
    Json(input): Json<CloneBatchRequest>,
) -> AppResult<impl IntoResponse> {
    let batch = state.service.clone_batch(token, &input.batch_title).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: batch })))
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// POST /api/v1/batches/dispatch
///
/// Responds with the new batch, the initiated / skipped counts and the
/// summary text.
pub async fn dispatch_new(
    State(state): State<AppState>,
    Json(input): Json<DispatchNewRequest>,
) -> AppResult<impl IntoResponse> {
    let recipients = state.service.recipients(&input.recipient_ids).await?;
    let report = state.service.start_dispatch(input.batch, &recipients).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// POST /api/v1/batches/{token}/dispatch
pub async fn dispatch_existing(
    State(state): State<AppState>,
    Path(token): Path<Token>,
    Json(input): Json<DispatchExistingRequest>,
) -> AppResult<impl IntoResponse> {
    let recipients = state.service.recipients(&input.recipient_ids).await?;
    let report = state
        .service
        .start_dispatch_from_existing(token, &input.batch_title, &recipients)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

/// POST /api/v1/batches/preview
///
/// Render unsaved fields for the sample customer. Nothing is stored.
pub async fn preview_fields(
    State(state): State<AppState>,
    Json(fields): Json<BatchFields>,
) -> AppResult<Response> {
    let context = state
        .service
        .preview_fields(&fields, Recipient::preview_sample())
        .await?;
    Ok(html_bytes(state.renderer.render_bytes(&context)?))
}

/// GET /api/v1/batches/{token}/preview
pub async fn preview_batch(
    State(state): State<AppState>,
    Path(token): Path<Token>,
) -> AppResult<Response> {
    let context = state
        .service
        .preview_batch(token, Recipient::preview_sample())
        .await?;
    Ok(html_bytes(state.renderer.render_bytes(&context)?))
}

// ---------------------------------------------------------------------------
// Messages and statistics
// ---------------------------------------------------------------------------

/// GET /api/v1/batches/{token}/messages
///
/// Messages created for the batch, newest first.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(token): Path<Token>,
) -> AppResult<impl IntoResponse> {
    state.service.find_batch(token).await?;
    let messages = state.service.stores().messages.list_for_batch(token).await?;
    Ok(Json(DataResponse { data: messages }))
}

/// GET /api/v1/batches/{token}/stats
pub async fn batch_stats(
    State(state): State<AppState>,
    Path(token): Path<Token>,
) -> AppResult<impl IntoResponse> {
    state.service.find_batch(token).await?;
    let stats = state.service.stores().batches.stats(token).await?;
    Ok(Json(DataResponse { data: stats }))
}
