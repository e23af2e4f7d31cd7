//! Port abstraction for organization memberships.

use async_trait::async_trait;

use crate::domain::{OrganizationId, OrganizationUser, OrganizationUserId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by membership repository adapters.
    pub enum MembershipPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "membership repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "membership repository query failed: {message}",
        /// The user already belongs to the organization.
        DuplicateMember => "user is already a member of the organization",
    }
}

/// Storage of organization users.
///
/// Deleting a membership must also delete its team memberships.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Insert a membership; duplicates yield [`MembershipPersistenceError::DuplicateMember`].
    async fn create(&self, membership: &OrganizationUser) -> Result<(), MembershipPersistenceError>;

    /// Overwrite the admin flag and modification time.
    async fn update(&self, membership: &OrganizationUser) -> Result<(), MembershipPersistenceError>;

    /// Remove a membership; returns whether a row was deleted.
    async fn delete(&self, id: &OrganizationUserId) -> Result<bool, MembershipPersistenceError>;

    /// Fetch one membership.
    async fn find_by_id(
        &self,
        id: &OrganizationUserId,
    ) -> Result<Option<OrganizationUser>, MembershipPersistenceError>;

    /// The membership of `user_id` in `organization_id`, if any.
    async fn find_for_user(
        &self,
        organization_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<Option<OrganizationUser>, MembershipPersistenceError>;

    /// Every membership of an organization, newest first.
    async fn list_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<OrganizationUser>, MembershipPersistenceError>;
}
