//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{InvitationBackend, LoginService};
use crate::domain::{
    AddressService, DirectoryService, Error, MembershipService, OrganizationService,
    Repositories, TeamService, User, UserService,
};
use crate::inbound::http::session::SessionContext;

/// Parameter object bundling the driven ports the services are built from.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub repositories: Repositories,
    pub invitations: Arc<dyn InvitationBackend>,
    pub login: Arc<dyn LoginService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub organizations: OrganizationService,
    pub memberships: MembershipService,
    pub teams: TeamService,
    pub users: UserService,
    pub addresses: AddressService,
    pub directory: DirectoryService,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct every service over the same repositories.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use employee_backend::domain::{CredentialLoginService, RegistrationInvitationBackend};
    /// use employee_backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// use employee_backend::outbound::memory::{InMemoryStore, in_memory_repositories};
    /// use employee_backend::outbound::notifications::LogNotificationSender;
    ///
    /// let repositories = in_memory_repositories(Arc::new(InMemoryStore::new()));
    /// let state = HttpState::new(HttpStatePorts {
    ///     invitations: Arc::new(RegistrationInvitationBackend::new(
    ///         repositories.users.clone(),
    ///         Arc::new(LogNotificationSender),
    ///     )),
    ///     login: Arc::new(CredentialLoginService::new(repositories.users.clone())),
    ///     repositories,
    /// });
    /// let _teams = state.teams.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            repositories,
            invitations,
            login,
        } = ports;
        Self {
            login,
            organizations: OrganizationService::new(repositories.clone()),
            memberships: MembershipService::new(repositories.clone(), invitations),
            teams: TeamService::new(repositories.clone()),
            users: UserService::new(repositories.clone()),
            addresses: AddressService::new(repositories.clone()),
            directory: DirectoryService::new(repositories),
        }
    }

    /// Resolve the authenticated caller behind the session.
    ///
    /// Missing sessions and sessions for deleted or inactive accounts are
    /// rejected with `401`.
    pub async fn caller(&self, session: &SessionContext) -> Result<User, Error> {
        let user_id = session.require_user_id()?;
        self.users.resolve_caller(&user_id).await
    }
}
