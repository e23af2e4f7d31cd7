//! Backend entry-point: loads settings, prepares storage and serves the REST API.

mod server;

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use ortho_config::OrthoConfig;
use reqwest::Url;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use employee_backend::domain::ports::NotificationSender;
use employee_backend::inbound::http::health::HealthState;
use employee_backend::inbound::http::session_config::{BuildMode, session_settings};
use employee_backend::outbound::notifications::{
    LogNotificationSender, WebhookNotificationSender,
};
use employee_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use employee_backend::settings::AppSettings;

use server::{ServerConfig, create_server};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

fn notification_sender(settings: &AppSettings) -> std::io::Result<Arc<dyn NotificationSender>> {
    let Some(raw) = settings
        .notification_webhook_url
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
    else {
        return Ok(Arc::new(LogNotificationSender));
    };
    let endpoint = Url::parse(raw).map_err(|err| {
        std::io::Error::other(format!("invalid notification webhook url '{raw}': {err}"))
    })?;
    let sender = WebhookNotificationSender::new(endpoint, WEBHOOK_TIMEOUT)
        .map_err(|err| std::io::Error::other(format!("webhook client setup failed: {err}")))?;
    Ok(Arc::new(sender))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let session = session_settings(&settings, BuildMode::from_debug_assertions())
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| std::io::Error::other(err.to_string()))?;

    let mut config =
        ServerConfig::new(session, bind_addr).with_notifications(notification_sender(&settings)?);

    if let Some(database_url) = settings.database_url() {
        let applied = run_pending_migrations(database_url)
            .await
            .map_err(|err| std::io::Error::other(err.to_string()))?;
        info!(applied, "database migrations applied");
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(|err| std::io::Error::other(err.to_string()))?;
        config = config.with_db_pool(pool);
    }

    info!(bind_addr = %config.bind_addr(), "starting server");
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
