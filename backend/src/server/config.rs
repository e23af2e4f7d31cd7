//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use employee_backend::domain::ports::NotificationSender;
use employee_backend::inbound::http::session_config::SessionSettings;
use employee_backend::outbound::notifications::LogNotificationSender;
use employee_backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) notifications: Arc<dyn NotificationSender>,
}

impl ServerConfig {
    /// Construct a configuration over the in-memory store that logs
    /// notifications.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            db_pool: None,
            notifications: Arc::new(LogNotificationSender),
        }
    }

    /// Attach a database connection pool; repositories switch to Diesel.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Replace the notification channel.
    #[must_use]
    pub fn with_notifications(mut self, sender: Arc<dyn NotificationSender>) -> Self {
        self.notifications = sender;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
