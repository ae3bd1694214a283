use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use bulkmail_core::transport::MailTransport;
use bulkmail_db::PgStore;
use bulkmail_delivery::{EmailConfig, LogMailer, Renderer, SmtpMailer};
use bulkmail_dispatch::{DispatchConfig, MassEmailService, Stores};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bulkmail_api::config::ServerConfig;
use bulkmail_api::router::build_app_router;
use bulkmail_api::state::{AppState, MailDelivery};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "bulkmail_api=debug,bulkmail_dispatch=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let dispatch_config = DispatchConfig::from_env()?;
    tracing::info!(
        sender = dispatch_config.sender_address(),
        "Loaded dispatch configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = bulkmail_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    bulkmail_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    bulkmail_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Delivery ---
    let renderer = Renderer::new().context("Failed to load email templates")?;
    let (transport, mail_delivery) = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(smtp_host = %email_config.smtp_host, "SMTP delivery enabled");
            (
                Arc::new(SmtpMailer::new(&email_config, renderer.clone())?) as Arc<dyn MailTransport>,
                MailDelivery::Smtp,
            )
        }
        None => {
            tracing::warn!("SMTP_HOST not set, outgoing mail will only be logged");
            (
                Arc::new(LogMailer::new(renderer.clone())) as Arc<dyn MailTransport>,
                MailDelivery::Log,
            )
        }
    };

    // --- Engine ---
    let stores = Stores::shared(Arc::new(PgStore::new(pool.clone())));
    let service = MassEmailService::new(stores, transport, dispatch_config);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        service: Arc::new(service),
        renderer: Arc::new(renderer),
        mail_delivery,
    };

    let app = build_app_router(state, &config)?;

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST")?,
        config.port,
    );
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
