//! Notification delivery adapters.
//!
//! [`LogNotificationSender`] records notices through `tracing` and is the
//! default. [`WebhookNotificationSender`] posts them as JSON to a configured
//! endpoint, such as a mail relay.

mod log_sender;
mod webhook_sender;

pub use log_sender::LogNotificationSender;
pub use webhook_sender::WebhookNotificationSender;
