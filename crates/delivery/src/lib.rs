//! Outbound mail for bulkmail.
//!
//! - [`Renderer`] turns a template id and a [`RenderContext`] into HTML.
//! - [`SmtpMailer`] delivers rendered mail through `lettre`'s async SMTP
//!   transport.
//! - [`LogMailer`] renders and logs instead of sending, for local setups
//!   without an SMTP relay.
//!
//! [`RenderContext`]: bulkmail_core::render::RenderContext

pub mod email;
pub mod log;
pub mod render;

pub use email::{EmailConfig, EmailError, SmtpMailer};
pub use log::LogMailer;
pub use render::{Page, RenderError, Renderer};
