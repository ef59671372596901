//! # Mail Module
//!
//! Email composition from templates.
//!
//! A mail template is an ordinary view whose output starts with header lines:
//!
//! ```text
//! to: Jane Doe <jane@example.com>
//! from: noreply@example.com
//! subject: Welcome {{ name }}
//! X-Campaign: onboarding
//!
//! Hello {{ name }}!
//! ```
//!
//! [`EmailTemplateService`] renders the template through a
//! [`ViewEngineManager`](crate::views::ViewEngineManager) and hands the text to
//! [`MailMessage::parse`]. Delivery is out of scope; the resulting message is
//! plain data.

mod message;
mod service;

pub use message::{MailAddress, MailMessage};
pub use service::{EmailTemplateService, EMAIL_TEMPLATE_PATH};
