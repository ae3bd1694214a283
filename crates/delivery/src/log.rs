//! Log-only mail transport.

use async_trait::async_trait;
use bulkmail_core::transport::{MailTransport, OutgoingMail, TransportError};

use crate::render::Renderer;

/// Renders each message and logs it instead of sending.
///
/// Used when no SMTP relay is configured so that dispatch runs still
/// exercise rendering and record outcomes.
pub struct LogMailer {
    renderer: Renderer,
}

impl LogMailer {
    pub fn new(renderer: Renderer) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl MailTransport for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<usize, TransportError> {
        let html = self.renderer.render(&mail.context)?;
        tracing::info!(
            from = %mail.sender_address,
            to = ?mail.to,
            subject = mail.subject(),
            bytes = html.len(),
            "SMTP not configured, email logged instead of sent"
        );
        Ok(mail.to.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulkmail_core::batch::{BatchContent, EmailTemplate};
    use bulkmail_core::image::ImageRef;
    use bulkmail_core::recipient::Recipient;
    use bulkmail_core::render::RenderContext;
    use bulkmail_core::types::Token;

    #[tokio::test]
    async fn reports_one_accepted_message_per_recipient() {
        let image = ImageRef {
            id: Token::nil(),
            url: "https://cdn.example.com/a.png".to_string(),
        };
        let content = BatchContent {
            template: EmailTemplate::ModernStandard,
            subject: None,
            title: None,
            custom_message: None,
            call_to_action_text: "Learn More".to_string(),
            call_to_action_link: "https://www.example.com/".to_string(),
            company_logo: image.clone(),
            alt_company_logo: None,
            primary_image: image,
        };
        let mailer = LogMailer::new(Renderer::new().unwrap());
        let mail = OutgoingMail {
            sender_name: "Acme".to_string(),
            sender_address: "news@acme.test".to_string(),
            to: vec!["john@smith.com".to_string()],
            context: RenderContext::preview(&content, Recipient::preview_sample()),
        };
        assert_eq!(mailer.send(mail).await.unwrap(), 1);
    }
}
