use std::sync::Arc;

use bulkmail_delivery::Renderer;
use bulkmail_dispatch::MassEmailService;

use serde::Serialize;

use crate::config::ServerConfig;

/// How outgoing mail leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailDelivery {
    /// Sent through the configured SMTP relay.
    Smtp,
    /// Rendered and logged only; nothing leaves the process.
    Log,
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything is behind an `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, used by the health check.
    pub pool: bulkmail_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Batch, dispatch, preview and unsubscribe operations.
    pub service: Arc<MassEmailService>,
    /// Renders previews and the unsubscribe pages.
    pub renderer: Arc<Renderer>,
    pub mail_delivery: MailDelivery,
}
