//! Port abstraction for organizations and their owner records.

use async_trait::async_trait;

use crate::domain::{FoundedOrganization, Organization, OrganizationId, OrganizationOwner, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by organization repository adapters.
    pub enum OrganizationPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "organization repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "organization repository query failed: {message}",
        /// Another organization already uses the slug.
        DuplicateSlug { slug: String } => "organization slug already taken: {slug}",
    }
}

/// Storage of organizations.
///
/// Deleting an organization must also delete its memberships, owner record,
/// teams and team memberships.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Persist an organization, its founding membership and owner atomically.
    async fn create(&self, founded: &FoundedOrganization)
    -> Result<(), OrganizationPersistenceError>;

    /// Organizations `user_id` belongs to, newest first.
    async fn list_for_member(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Organization>, OrganizationPersistenceError>;

    /// Fetch one organization.
    async fn find_by_id(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<Organization>, OrganizationPersistenceError>;

    /// Existing slugs starting with `prefix`.
    async fn slugs_with_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<String>, OrganizationPersistenceError>;

    /// Overwrite name, activity flag and modification time.
    async fn update(&self, organization: &Organization) -> Result<(), OrganizationPersistenceError>;

    /// Delete an organization and everything scoped to it.
    async fn delete(&self, id: &OrganizationId) -> Result<bool, OrganizationPersistenceError>;

    /// The owner record of an organization.
    async fn find_owner(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<OrganizationOwner>, OrganizationPersistenceError>;
}
