use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bulkmail_core::error::CoreError;
use bulkmail_delivery::RenderError;
use bulkmail_dispatch::DispatchError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `bulkmail_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A dispatch run that failed or was aborted.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A preview or page could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A path segment that cannot name any resource.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),

            AppError::Dispatch(err) => {
                if err.source.is_fatal_to_dispatch() {
                    tracing::error!(
                        initiated = err.partial.initiated,
                        skipped = err.partial.skipped,
                        error = %err.source,
                        "Dispatch aborted, counts not recorded"
                    );
                }
                classify_core_error(&err.source)
            }

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::Render(err) => {
                tracing::error!(error = %err, "Render error");
                internal()
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a domain error into an HTTP status, error code, and message.
///
/// `NotAllowed` is reported as a 404 so that unsupported methods on
/// recipient-facing links look the same as unknown links.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::NotAllowed(msg) => (StatusCode::NOT_FOUND, "NOT_ALLOWED", msg.clone()),
        CoreError::Persistence(msg) | CoreError::Configuration(msg) | CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use bulkmail_core::report::DispatchResult;
    use bulkmail_core::types::Token;
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn status_and_code(err: AppError) -> (StatusCode, String) {
        let (status, code, _) = match &err {
            AppError::Core(core) => classify_core_error(core),
            AppError::Dispatch(dispatch) => classify_core_error(&dispatch.source),
            _ => unreachable!(),
        };
        (status, code.to_string())
    }

    #[test]
    fn not_allowed_looks_like_not_found() {
        let (status, code) = status_and_code(CoreError::NotAllowed("PUT".into()).into());
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_ALLOWED");
    }

    #[test]
    fn validation_is_bad_request() {
        let (status, code) = status_and_code(CoreError::Validation("empty title".into()).into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
    }

    #[test]
    fn aborted_dispatch_is_internal_error() {
        let err = DispatchError {
            partial: DispatchResult {
                initiated: 3,
                skipped: 0,
            },
            source: CoreError::Persistence("connection reset".into()),
        };
        let (status, code) = status_and_code(err.into());
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
    }

    #[test]
    fn unknown_message_is_not_found() {
        let (status, code) = status_and_code(CoreError::not_found("EmailMessage", Token::nil()).into());
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn aborted_dispatch_response_is_sanitized_500() {
        let err = AppError::Dispatch(DispatchError {
            partial: DispatchResult {
                initiated: 2,
                skipped: 1,
            },
            source: CoreError::Persistence("insert into email_messages failed".into()),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"], "An internal error occurred");
    }

    #[tokio::test]
    async fn dispatch_validation_failure_is_bad_request() {
        let err = AppError::Dispatch(DispatchError {
            partial: DispatchResult::default(),
            source: CoreError::Validation("company_logo is required".into()),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unparseable_path_is_not_found() {
        let response = AppError::NotFound("EmailMessage 'abc' not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    }

    #[test]
    fn persistence_details_are_not_leaked() {
        let response = AppError::Core(CoreError::Persistence("password=hunter2".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
