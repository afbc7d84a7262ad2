//! Outbound notifications for careerwatch.
//!
//! - [`message`]: what gets said (new posting, or nothing new) and its embed form
//! - [`webhook`]: the [`NotificationSink`] boundary and the webhook implementation

pub mod message;
pub mod webhook;

pub use message::{Embed, EmbedField, EmbedFooter, NotificationMessage, WebhookPayload};
pub use webhook::{NotificationSink, Notifier, WebhookSink};
