//! Organizations, their memberships and their owner.
//!
//! ## Invariants
//! - A user is a member of a given organization at most once.
//! - Each organization has exactly one owner record once created; the owner's
//!   membership has `is_admin = true`.
//! - Deleting an organization removes its memberships, owner, teams and team
//!   memberships.

use chrono::{DateTime, Utc};

use super::ids::{OrganizationId, OrganizationOwnerId, OrganizationUserId, UserId};

/// Maximum organization and team name length.
pub const NAME_MAX: usize = 200;

/// Validation failures for organization and team names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameValidationError {
    #[error("name must not be blank")]
    Blank,
    #[error("name must be at most {max} characters")]
    TooLong { max: usize },
}

impl NameValidationError {
    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::TooLong { .. } => "too_long",
        }
    }
}

/// Validate an organization or team name, returning it trimmed.
pub fn validate_name(raw: &str) -> Result<String, NameValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NameValidationError::Blank);
    }
    if trimmed.chars().count() > NAME_MAX {
        return Err(NameValidationError::TooLong { max: NAME_MAX });
    }
    Ok(trimmed.to_owned())
}

/// Tenant grouping users and teams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Membership of a user in an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationUser {
    pub id: OrganizationUserId,
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub is_admin: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl OrganizationUser {
    /// Build a membership created now.
    pub fn new(user_id: UserId, organization_id: OrganizationId, is_admin: bool) -> Self {
        let now = Utc::now();
        Self {
            id: OrganizationUserId::random(),
            user_id,
            organization_id,
            is_admin,
            created: now,
            modified: now,
        }
    }
}

/// Designates the owning membership of an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationOwner {
    pub id: OrganizationOwnerId,
    pub organization_id: OrganizationId,
    pub organization_user_id: OrganizationUserId,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Organization together with its founding membership and owner record,
/// persisted atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundedOrganization {
    pub organization: Organization,
    pub membership: OrganizationUser,
    pub owner: OrganizationOwner,
}

impl FoundedOrganization {
    /// Assemble a new organization owned by `founder`.
    pub fn new(name: String, slug: String, is_active: bool, founder: UserId) -> Self {
        let now = Utc::now();
        let organization = Organization {
            id: OrganizationId::random(),
            name,
            slug,
            is_active,
            created: now,
            modified: now,
        };
        let membership = OrganizationUser {
            id: OrganizationUserId::random(),
            user_id: founder,
            organization_id: organization.id,
            is_admin: true,
            created: now,
            modified: now,
        };
        let owner = OrganizationOwner {
            id: OrganizationOwnerId::random(),
            organization_id: organization.id,
            organization_user_id: membership.id,
            created: now,
            modified: now,
        };
        Self {
            organization,
            membership,
            owner,
        }
    }
}
