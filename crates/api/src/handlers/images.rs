//! Handlers for reusable image resources.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bulkmail_core::error::CoreError;
use bulkmail_core::image::NewImage;
use bulkmail_core::types::Token;

use crate::error::AppResult;
use crate::handlers::ArchiveFilter;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/images
pub async fn list_images(
    State(state): State<AppState>,
    Query(filter): Query<ArchiveFilter>,
) -> AppResult<impl IntoResponse> {
    let images = state
        .service
        .stores()
        .images
        .list(filter.include_archived)
        .await?;
    Ok(Json(DataResponse { data: images }))
}

/// POST /api/v1/images
pub async fn create_image(
    State(state): State<AppState>,
    Json(input): Json<NewImage>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let image = state.service.stores().images.create(input).await?;
    tracing::info!(image_token = %image.token, category = image.category.as_str(), "Image created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: image })))
}

/// POST /api/v1/images/{token}/archive
pub async fn archive_image(
    State(state): State<AppState>,
    Path(token): Path<Token>,
) -> AppResult<StatusCode> {
    set_archived(&state, token, true).await
}

/// POST /api/v1/images/{token}/unarchive
pub async fn unarchive_image(
    State(state): State<AppState>,
    Path(token): Path<Token>,
) -> AppResult<StatusCode> {
    set_archived(&state, token, false).await
}

async fn set_archived(state: &AppState, token: Token, archived: bool) -> AppResult<StatusCode> {
    if !state.service.stores().images.set_archived(token, archived).await? {
        return Err(CoreError::not_found("Image", token).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
