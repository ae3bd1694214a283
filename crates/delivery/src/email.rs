//! Batch email delivery via SMTP.
//!
//! [`SmtpMailer`] wraps the `lettre` async SMTP transport and implements
//! [`MailTransport`]. Configuration is loaded from environment variables; if
//! `SMTP_HOST` is not set, [`EmailConfig::from_env`] returns `None` and the
//! caller falls back to [`LogMailer`](crate::LogMailer).

use async_trait::async_trait;
use bulkmail_core::transport::{MailTransport, OutgoingMail, TransportError};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::render::Renderer;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for SMTP delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

impl From<EmailError> for TransportError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::Transport(e) if e.is_permanent() => TransportError::Rejected(e.to_string()),
            EmailError::Transport(e) => TransportError::Connection(e.to_string()),
            EmailError::Address(e) => TransportError::Address(e.to_string()),
            EmailError::Build(msg) => TransportError::Build(msg),
        }
    }
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP relay settings.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    /// Defaults to 587.
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set.
    ///
    /// | Variable        | Required | Default |
    /// |-----------------|----------|---------|
    /// | `SMTP_HOST`     | yes      |         |
    /// | `SMTP_PORT`     | no       | `587`   |
    /// | `SMTP_USER`     | no       |         |
    /// | `SMTP_PASSWORD` | no       |         |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// SmtpMailer
// ---------------------------------------------------------------------------

/// Renders and sends batch emails through an SMTP relay.
///
/// The underlying transport pools connections, so one mailer is shared by
/// every dispatch run.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    renderer: Renderer,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig, renderer: Renderer) -> Result<Self, EmailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            renderer,
        })
    }
}

/// Assemble the MIME message for `mail` with an HTML body.
///
/// The sender display name is passed to lettre as-is, which quotes it when
/// it contains header specials such as `,`.
pub fn build_message(mail: &OutgoingMail, html: String) -> Result<Message, EmailError> {
    let from = Mailbox::new(
        Some(mail.sender_name.clone()),
        mail.sender_address.parse::<Address>()?,
    );
    let mut builder = Message::builder()
        .from(from)
        .subject(mail.subject())
        .header(ContentType::TEXT_HTML);
    for to in &mail.to {
        builder = builder.to(to.parse::<Mailbox>()?);
    }
    builder.body(html).map_err(|e| EmailError::Build(e.to_string()))
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<usize, TransportError> {
        let html = self.renderer.render(&mail.context)?;
        let message = build_message(&mail, html)?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(EmailError::from)?;

        if !response.is_positive() {
            return Ok(0);
        }
        tracing::debug!(to = ?mail.to, subject = mail.subject(), "SMTP relay accepted message");
        Ok(mail.to.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
