//! Authorization predicates for the organization resources.
//!
//! Services load the caller's standing in an organization once
//! ([`OrganizationStanding`]) and consult these predicates before touching
//! persistence. Rejection messages are part of the public API contract.

use super::error::Error;
use super::ids::UserId;
use super::organization::{OrganizationOwner, OrganizationUser};
use super::user::User;

pub(crate) const ONLY_STAFF_CREATE_ORGANIZATION: &str =
    "Only Staff Members can create an organization!";
pub(crate) const ONLY_STAFF_DELETE_ORGANIZATION: &str =
    "Only Staff Members can delete an organization!";
pub(crate) const NOT_ALLOWED_UPDATE_ORGANIZATION: &str =
    "User is not allowed to update this organization!";
pub(crate) const NOT_PART_OF_ORGANIZATION: &str =
    "User is not part of the organization specified!";
pub(crate) const NOT_ALLOWED_CREATE_ORGANIZATION_USER: &str =
    "User is not allowed to create an organization user in this organization!";
pub(crate) const NOT_ALLOWED_UPDATE_ORGANIZATION_USER: &str =
    "User is not allowed to update this organization user!";
pub(crate) const NOT_ALLOWED_DELETE_ORGANIZATION_USER: &str =
    "User is not allowed to delete this organization user!";
pub(crate) const OWNER_MUST_BE_ADMIN: &str = "Organization owner must be an administrator!";
pub(crate) const OWNER_CANNOT_LEAVE: &str =
    "Organization owner cannot be removed from the organization!";
pub(crate) const NOT_ALLOWED_CREATE_TEAM: &str =
    "User is not allowed to create a team for this organization!";
pub(crate) const NOT_A_PART_OF_ORGANIZATION: &str =
    "User is not a part of the organization specified!";
pub(crate) const NOT_ALLOWED_UPDATE_TEAM: &str = "User is not allowed to update this Team!";
pub(crate) const NOT_ALLOWED_DELETE_TEAM: &str = "User is not allowed to delete this team!";
pub(crate) const NOT_ALLOWED_MANAGE_TEAM_MEMBERS: &str =
    "User is not allowed to manage members of this team!";

/// The caller's relationship to one organization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationStanding {
    /// The caller's membership, when they belong to the organization.
    pub membership: Option<OrganizationUser>,
    /// The organization's owner record.
    pub owner: Option<OrganizationOwner>,
}

impl OrganizationStanding {
    /// Whether the caller belongs to the organization.
    pub fn is_member(&self) -> bool {
        self.membership.is_some()
    }

    /// Whether the caller's membership carries admin rights.
    pub fn is_admin(&self) -> bool {
        self.membership.as_ref().is_some_and(|m| m.is_admin)
    }

    /// Whether the caller's membership is the owner membership.
    pub fn is_owner(&self) -> bool {
        match (&self.membership, &self.owner) {
            (Some(membership), Some(owner)) => owner.organization_user_id == membership.id,
            _ => false,
        }
    }

    /// Owner or admin: may manage teams.
    pub fn can_manage_teams(&self) -> bool {
        self.is_owner() || self.is_admin()
    }

    /// Whether `target` is the owner membership.
    pub fn owns(&self, target: &OrganizationUser) -> bool {
        self.owner
            .as_ref()
            .is_some_and(|owner| owner.organization_user_id == target.id)
    }
}

/// Only staff may create organizations.
pub fn ensure_can_create_organization(caller: &User) -> Result<(), Error> {
    if caller.is_staff {
        Ok(())
    } else {
        Err(Error::forbidden(ONLY_STAFF_CREATE_ORGANIZATION))
    }
}

/// Only staff may delete organizations.
pub fn ensure_can_delete_organization(caller: &User) -> Result<(), Error> {
    if caller.is_staff {
        Ok(())
    } else {
        Err(Error::forbidden(ONLY_STAFF_DELETE_ORGANIZATION))
    }
}

/// Only the owner may update an organization.
pub fn ensure_can_update_organization(standing: &OrganizationStanding) -> Result<(), Error> {
    if standing.is_owner() {
        Ok(())
    } else {
        Err(Error::forbidden(NOT_ALLOWED_UPDATE_ORGANIZATION))
    }
}

/// Members with admin rights may add organization users.
pub fn ensure_can_add_member(standing: &OrganizationStanding) -> Result<(), Error> {
    if !standing.is_member() {
        return Err(Error::forbidden(NOT_PART_OF_ORGANIZATION));
    }
    if !standing.is_admin() {
        return Err(Error::forbidden(NOT_ALLOWED_CREATE_ORGANIZATION_USER));
    }
    Ok(())
}

/// Admins may change memberships, but never strip admin from the owner or
/// from themselves.
pub fn ensure_can_update_member(
    caller: &UserId,
    standing: &OrganizationStanding,
    target: &OrganizationUser,
    new_is_admin: bool,
) -> Result<(), Error> {
    if !standing.is_admin() {
        return Err(Error::forbidden(NOT_ALLOWED_UPDATE_ORGANIZATION_USER));
    }
    let demoting = target.is_admin && !new_is_admin;
    if demoting && (target.user_id == *caller || standing.owns(target)) {
        return Err(Error::forbidden(OWNER_MUST_BE_ADMIN));
    }
    Ok(())
}

/// The owner, an admin, or the member themselves may remove a membership;
/// the owner membership itself stays.
pub fn ensure_can_remove_member(
    caller: &UserId,
    standing: &OrganizationStanding,
    target: &OrganizationUser,
) -> Result<(), Error> {
    let allowed = standing.is_owner() || standing.is_admin() || target.user_id == *caller;
    if !allowed {
        return Err(Error::forbidden(NOT_ALLOWED_DELETE_ORGANIZATION_USER));
    }
    if standing.owns(target) {
        return Err(Error::forbidden(OWNER_CANNOT_LEAVE));
    }
    Ok(())
}

/// Owners and admins may create teams.
pub fn ensure_can_create_team(standing: &OrganizationStanding) -> Result<(), Error> {
    if !standing.is_member() {
        return Err(Error::forbidden(NOT_A_PART_OF_ORGANIZATION));
    }
    if !standing.can_manage_teams() {
        return Err(Error::forbidden(NOT_ALLOWED_CREATE_TEAM));
    }
    Ok(())
}

/// Owners and admins may update teams.
pub fn ensure_can_update_team(standing: &OrganizationStanding) -> Result<(), Error> {
    if standing.can_manage_teams() {
        Ok(())
    } else {
        Err(Error::forbidden(NOT_ALLOWED_UPDATE_TEAM))
    }
}

/// Owners and admins may delete teams.
pub fn ensure_can_delete_team(standing: &OrganizationStanding) -> Result<(), Error> {
    if standing.can_manage_teams() {
        Ok(())
    } else {
        Err(Error::forbidden(NOT_ALLOWED_DELETE_TEAM))
    }
}

/// Owners and admins manage team rosters; `is_self` lets a member leave.
pub fn ensure_can_manage_team_member(
    standing: &OrganizationStanding,
    is_self: bool,
) -> Result<(), Error> {
    if standing.can_manage_teams() || is_self {
        Ok(())
    } else {
        Err(Error::forbidden(NOT_ALLOWED_MANAGE_TEAM_MEMBERS))
    }
}

#[cfg(test)]
mod tests;
