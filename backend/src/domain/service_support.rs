//! Internal helpers shared by the organization, team and identity services.

use std::sync::Arc;

use serde_json::json;

use crate::domain::access::OrganizationStanding;
use crate::domain::organization::NameValidationError;
use crate::domain::ports::{
    AddressPersistenceError, AddressRepository, MembershipPersistenceError, MembershipRepository,
    OrganizationPersistenceError, OrganizationRepository, TeamPersistenceError, TeamRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::{Error, OrganizationId, UserId, UserValidationError};

/// Message used whenever a record is absent or outside the caller's scope.
pub(crate) const NOT_FOUND: &str = "Not found.";
pub(crate) const ALREADY_ORGANIZATION_MEMBER: &str =
    "The user is already a member of the specified organization!";
pub(crate) const ALREADY_TEAM_MEMBER: &str = "The organization user is already a member of this team!";
pub(crate) const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Bundle of driven persistence ports shared by the services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub addresses: Arc<dyn AddressRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub teams: Arc<dyn TeamRepository>,
}

impl Repositories {
    /// Load the membership of `user_id` and the owner record of an
    /// organization.
    pub(crate) async fn standing(
        &self,
        organization_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<OrganizationStanding, Error> {
        let membership = self
            .memberships
            .find_for_user(organization_id, user_id)
            .await
            .map_err(map_membership_error)?;
        let owner = self
            .organizations
            .find_owner(organization_id)
            .await
            .map_err(map_organization_error)?;
        Ok(OrganizationStanding { membership, owner })
    }

    /// Like [`Self::standing`], but a caller outside the organization (or a
    /// missing scope) yields not found.
    pub(crate) async fn member_standing(
        &self,
        organization_id: Option<&OrganizationId>,
        user_id: &UserId,
    ) -> Result<OrganizationStanding, Error> {
        let Some(organization_id) = organization_id else {
            return Err(Error::not_found(NOT_FOUND));
        };
        let standing = self.standing(organization_id, user_id).await?;
        if standing.is_member() {
            Ok(standing)
        } else {
            Err(Error::not_found(NOT_FOUND))
        }
    }
}

/// Reference in a payload to a record that does not exist.
pub(crate) fn invalid_reference(field: &'static str, id: &impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("Invalid pk \"{id}\" - object does not exist."))
        .with_details(json!({ "field": field, "code": "does_not_exist" }))
}

pub(crate) fn validation_error(error: &UserValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": error.code(),
    }))
}

impl From<UserValidationError> for Error {
    fn from(error: UserValidationError) -> Self {
        validation_error(&error)
    }
}

pub(crate) fn name_error(error: &NameValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": "name",
        "code": error.code(),
    }))
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { username } => {
            Error::invalid_request(USERNAME_TAKEN).with_details(json!({
                "field": "username",
                "code": "duplicate",
                "value": username,
            }))
        }
    }
}

pub(crate) fn map_address_error(error: AddressPersistenceError) -> Error {
    match error {
        AddressPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("address repository unavailable: {message}"))
        }
        AddressPersistenceError::Query { message } => {
            Error::internal(format!("address repository error: {message}"))
        }
    }
}

pub(crate) fn map_organization_error(error: OrganizationPersistenceError) -> Error {
    match error {
        OrganizationPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("organization repository unavailable: {message}"))
        }
        OrganizationPersistenceError::Query { message } => {
            Error::internal(format!("organization repository error: {message}"))
        }
        OrganizationPersistenceError::DuplicateSlug { slug } => Error::invalid_request(format!(
            "organization with slug {slug} already exists"
        )),
    }
}

pub(crate) fn map_membership_error(error: MembershipPersistenceError) -> Error {
    match error {
        MembershipPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("membership repository unavailable: {message}"))
        }
        MembershipPersistenceError::Query { message } => {
            Error::internal(format!("membership repository error: {message}"))
        }
        MembershipPersistenceError::DuplicateMember => {
            Error::invalid_request(ALREADY_ORGANIZATION_MEMBER)
        }
    }
}

pub(crate) fn map_team_error(error: TeamPersistenceError) -> Error {
    match error {
        TeamPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("team repository unavailable: {message}"))
        }
        TeamPersistenceError::Query { message } => {
            Error::internal(format!("team repository error: {message}"))
        }
        TeamPersistenceError::DuplicateMember => Error::invalid_request(ALREADY_TEAM_MEMBER),
    }
}
