//! Port for delivering outbound notifications such as invitation emails.

use async_trait::async_trait;
use serde::Serialize;

use super::define_port_error;

define_port_error! {
    /// Errors raised while delivering a notification.
    pub enum NotificationError {
        /// The delivery channel could not be reached.
        Unavailable { message: String } => "notification channel unavailable: {message}",
        /// The channel rejected the notification.
        Rejected { message: String } => "notification rejected: {message}",
    }
}

/// What kind of message is being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A new account was created for the recipient.
    Invitation,
    /// An existing account was added to an organization.
    MembershipAdded,
}

/// A message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Delivery channel for notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Deliver one notification.
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError>;
}
