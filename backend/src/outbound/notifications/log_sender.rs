//! Notification sender that only writes a structured log line.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{Notification, NotificationError, NotificationSender};

/// Logs each notification at `info` and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationSender;

#[async_trait]
impl NotificationSender for LogNotificationSender {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        info!(
            kind = ?notification.kind,
            recipient = %notification.recipient,
            subject = %notification.subject,
            "notification dispatched"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::NotificationKind;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn logging_never_fails() {
        let notification = Notification {
            kind: NotificationKind::MembershipAdded,
            recipient: "hal@example.com".to_owned(),
            subject: "Welcome".to_owned(),
            body: "You were added.".to_owned(),
        };
        assert!(LogNotificationSender.send(&notification).await.is_ok());
    }
}
