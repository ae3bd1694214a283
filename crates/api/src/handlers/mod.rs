pub mod batches;
pub mod images;
pub mod recipients;
pub mod unsubscribe;

use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

/// Query parameters for list endpoints that hide archived rows by default.
#[derive(Debug, Default, Deserialize)]
pub struct ArchiveFilter {
    #[serde(default)]
    pub include_archived: bool,
}

/// Respond with rendered HTML bytes.
pub(crate) fn html_bytes(bytes: Vec<u8>) -> Response {
    ([(CONTENT_TYPE, "text/html; charset=utf-8")], bytes).into_response()
}
