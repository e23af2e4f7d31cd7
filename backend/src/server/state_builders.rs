//! Builders for the HTTP state from the configured storage backend.

use std::sync::Arc;

use actix_web::web;

use employee_backend::domain::ports::NotificationSender;
use employee_backend::domain::{CredentialLoginService, RegistrationInvitationBackend, Repositories};
use employee_backend::inbound::http::state::{HttpState, HttpStatePorts};
use employee_backend::outbound::memory::{InMemoryStore, in_memory_repositories};
use employee_backend::outbound::persistence::{DbPool, diesel_repositories};
use tracing::warn;

use super::ServerConfig;

/// Diesel repositories when a pool is configured, otherwise a fresh
/// process-local store.
fn build_repositories(pool: Option<&DbPool>) -> Repositories {
    match pool {
        Some(pool) => diesel_repositories(pool),
        None => {
            warn!("no database configured; data lives in memory until shutdown");
            in_memory_repositories(Arc::new(InMemoryStore::new()))
        }
    }
}

fn build_ports(
    repositories: Repositories,
    notifications: Arc<dyn NotificationSender>,
) -> HttpStatePorts {
    HttpStatePorts {
        invitations: Arc::new(RegistrationInvitationBackend::new(
            repositories.users.clone(),
            notifications,
        )),
        login: Arc::new(CredentialLoginService::new(repositories.users.clone())),
        repositories,
    }
}

/// Build the shared handler state for every worker.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let repositories = build_repositories(config.db_pool.as_ref());
    let ports = build_ports(repositories, config.notifications.clone());
    web::Data::new(HttpState::from(ports))
}
