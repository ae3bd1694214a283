//! HTML rendering of email templates with `tera`.
//!
//! Templates are compiled into the binary. Email templates match the closed
//! [`EmailTemplate`] set; [`Page`]s are the recipient-facing web pages.

use bulkmail_core::batch::EmailTemplate;
use bulkmail_core::render::RenderContext;
use bulkmail_core::transport::TransportError;
use serde::Serialize;
use tera::{Context, Tera};

const TEMPLATES: [(EmailTemplate, &str); 2] = [
    (EmailTemplate::Simple, include_str!("../templates/simple.html")),
    (
        EmailTemplate::ModernStandard,
        include_str!("../templates/modern_standard.html"),
    ),
];

/// Recipient-facing pages served outside of email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Unsubscribe,
    UnsubscribeConfirmed,
}

impl Page {
    pub fn file_name(self) -> &'static str {
        match self {
            Page::Unsubscribe => "unsubscribe.html",
            Page::UnsubscribeConfirmed => "unsubscribe_confirmed.html",
        }
    }
}

const PAGES: [(Page, &str); 2] = [
    (Page::Unsubscribe, include_str!("../templates/unsubscribe.html")),
    (
        Page::UnsubscribeConfirmed,
        include_str!("../templates/unsubscribe_confirmed.html"),
    ),
];

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

impl From<RenderError> for TransportError {
    fn from(err: RenderError) -> Self {
        TransportError::Render(err.to_string())
    }
}

/// Renders [`RenderContext`]s with the built-in email templates.
#[derive(Debug, Clone)]
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Compile the built-in templates.
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(
            TEMPLATES
                .iter()
                .map(|(template, source)| (template.file_name(), *source))
                .chain(PAGES.iter().map(|(page, source)| (page.file_name(), *source))),
        )?;
        Ok(Self { tera })
    }

    /// Render `context` with its template. HTML escaping applies to every
    /// interpolated value.
    pub fn render(&self, context: &RenderContext) -> Result<String, RenderError> {
        let tera_context = Context::from_serialize(context)?;
        Ok(self.tera.render(context.template.file_name(), &tera_context)?)
    }

    /// Render a web page with any serializable context.
    pub fn render_page(&self, page: Page, context: &impl Serialize) -> Result<String, RenderError> {
        let tera_context = Context::from_serialize(context)?;
        Ok(self.tera.render(page.file_name(), &tera_context)?)
    }

    /// Render to bytes, as handed to a preview response.
    pub fn render_bytes(&self, context: &RenderContext) -> Result<Vec<u8>, RenderError> {
        self.render(context).map(String::into_bytes)
    }
}
