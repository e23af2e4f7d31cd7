//! Reqwest-backed notification sender posting JSON to a webhook.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::domain::ports::{Notification, NotificationError, NotificationSender};

const USER_AGENT: &str = concat!("employee-backend/", env!("CARGO_PKG_VERSION"));

/// Posts each notification as a JSON document to one endpoint.
pub struct WebhookNotificationSender {
    client: Client,
    endpoint: Url,
}

impl WebhookNotificationSender {
    /// Build a sender with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl NotificationSender for WebhookNotificationSender {
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(notification)
            .send()
            .await
            .map_err(|err| NotificationError::unavailable(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &body))
    }
}

fn map_status_error(status: StatusCode, body: &str) -> NotificationError {
    const PREVIEW_CHAR_LIMIT: usize = 120;

    let preview: String = body
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect();
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    };
    if status.is_client_error() {
        NotificationError::rejected(message)
    } else {
        NotificationError::unavailable(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusCode::BAD_REQUEST, "bad   address", NotificationError::rejected("status 400: bad address"))]
    #[case(StatusCode::BAD_GATEWAY, "", NotificationError::unavailable("status 502"))]
    fn statuses_map_to_notification_errors(
        #[case] status: StatusCode,
        #[case] body: &str,
        #[case] expected: NotificationError,
    ) {
        assert_eq!(map_status_error(status, body), expected);
    }

    #[rstest]
    fn previews_are_truncated() {
        let body = "x".repeat(500);
        let NotificationError::Unavailable { message } =
            map_status_error(StatusCode::SERVICE_UNAVAILABLE, &body)
        else {
            panic!("expected unavailable");
        };
        assert_eq!(message.len(), "status 503: ".len() + 120);
    }

    #[rstest]
    fn builds_with_timeout() {
        let endpoint = Url::parse("http://127.0.0.1:9/notify").expect("valid url");
        assert!(WebhookNotificationSender::new(endpoint, Duration::from_secs(1)).is_ok());
    }
}
