//! Port abstraction for teams and team memberships.

use async_trait::async_trait;

use crate::domain::{OrganizationId, Team, TeamId, TeamMember, TeamMemberId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by team repository adapters.
    pub enum TeamPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "team repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "team repository query failed: {message}",
        /// The organization user already belongs to the team.
        DuplicateMember => "organization user is already a member of the team",
    }
}

/// Storage of teams and their rosters.
///
/// Deleting a team must also delete its team memberships.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Insert a team.
    async fn create(&self, team: &Team) -> Result<(), TeamPersistenceError>;

    /// Overwrite the team name.
    async fn update(&self, team: &Team) -> Result<(), TeamPersistenceError>;

    /// Remove a team; returns whether a row was deleted.
    async fn delete(&self, id: &TeamId) -> Result<bool, TeamPersistenceError>;

    /// Fetch one team.
    async fn find_by_id(&self, id: &TeamId) -> Result<Option<Team>, TeamPersistenceError>;

    /// Teams of an organization ordered by name.
    async fn list_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Team>, TeamPersistenceError>;

    /// Insert a team membership; duplicates yield
    /// [`TeamPersistenceError::DuplicateMember`].
    async fn add_member(&self, member: &TeamMember) -> Result<(), TeamPersistenceError>;

    /// Overwrite the admin flag of a team membership.
    async fn update_member(&self, member: &TeamMember) -> Result<(), TeamPersistenceError>;

    /// Remove a team membership; returns whether a row was deleted.
    async fn remove_member(&self, id: &TeamMemberId) -> Result<bool, TeamPersistenceError>;

    /// Fetch one team membership.
    async fn find_member(
        &self,
        id: &TeamMemberId,
    ) -> Result<Option<TeamMember>, TeamPersistenceError>;

    /// Memberships of every team in an organization.
    async fn list_members_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<TeamMember>, TeamPersistenceError>;
}
