//! Liveness endpoint, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::{AppState, MailDelivery};

#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// `log` means dispatch runs record outcomes but no mail is sent.
    pub mail_delivery: MailDelivery,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let db_healthy = match bulkmail_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    Json(HealthReport {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        mail_delivery: state.mail_delivery,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
