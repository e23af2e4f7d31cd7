//! Organization membership use-cases, including invitations by email.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::access::{
    ensure_can_add_member, ensure_can_remove_member, ensure_can_update_member,
};
use crate::domain::ports::InvitationBackend;
use crate::domain::service_support::{
    NOT_FOUND, Repositories, invalid_reference, map_membership_error, map_organization_error,
    map_user_error, validation_error,
};
use crate::domain::{
    EmailAddress, Error, Organization, OrganizationId, OrganizationOwner, OrganizationUser,
    OrganizationUserId, User,
};

pub(crate) const USER_EMAIL_MISSING: &str = "user_email has not been provided!";
pub(crate) const EMAIL_USED_MULTIPLE_TIMES: &str =
    "This email address has been used multiple times.";

/// Payload for adding someone to an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipDraft {
    pub organization: OrganizationId,
    pub user_email: Option<String>,
    pub is_admin: bool,
}

/// Membership update. `organization` selects the scope and is never written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipChanges {
    pub organization: Option<OrganizationId>,
    pub is_admin: Option<bool>,
}

/// Account a new membership points at.
enum Member {
    /// Account that existed before the request.
    Existing(User),
    /// Placeholder registered by the request.
    Invited(User),
}

impl Member {
    fn user(&self) -> &User {
        match self {
            Self::Existing(user) | Self::Invited(user) => user,
        }
    }
}

/// Organization user service.
#[derive(Clone)]
pub struct MembershipService {
    repos: Repositories,
    invitations: Arc<dyn InvitationBackend>,
}

impl MembershipService {
    /// Create a new service over the shared repositories and an invitation
    /// backend.
    pub fn new(repos: Repositories, invitations: Arc<dyn InvitationBackend>) -> Self {
        Self { repos, invitations }
    }

    /// Memberships of `organization_id`; empty unless the caller belongs to it.
    pub async fn list(
        &self,
        caller: &User,
        organization_id: Option<&OrganizationId>,
    ) -> Result<Vec<OrganizationUser>, Error> {
        let Some(organization_id) = organization_id else {
            return Ok(Vec::new());
        };
        let standing = self.repos.standing(organization_id, &caller.id).await?;
        if !standing.is_member() {
            return Ok(Vec::new());
        }
        self.repos
            .memberships
            .list_for_organization(organization_id)
            .await
            .map_err(map_membership_error)
    }

    /// One membership inside an organization the caller belongs to.
    pub async fn retrieve(
        &self,
        caller: &User,
        organization_id: Option<&OrganizationId>,
        id: &OrganizationUserId,
    ) -> Result<OrganizationUser, Error> {
        self.repos.member_standing(organization_id, &caller.id).await?;
        self.scoped_membership(organization_id, id).await
    }

    /// Add the user registered under `user_email`, inviting them when no
    /// account exists yet.
    pub async fn create(
        &self,
        caller: &User,
        draft: MembershipDraft,
    ) -> Result<OrganizationUser, Error> {
        let raw_email = draft
            .user_email
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::invalid_request(USER_EMAIL_MISSING))?;
        let email = EmailAddress::new(raw_email).map_err(|err| validation_error(&err))?;
        let organization = self.existing_organization(&draft.organization).await?;

        let standing = self.repos.standing(&organization.id, &caller.id).await?;
        ensure_can_add_member(&standing)?;

        let member = self.resolve_or_invite(&email, &organization, caller).await?;
        let user = member.user();
        let membership = OrganizationUser::new(user.id, organization.id, draft.is_admin);
        if let Err(error) = self.repos.memberships.create(&membership).await {
            if let Member::Invited(invitee) = &member {
                self.discard_invitee(invitee).await;
            }
            return Err(map_membership_error(error));
        }
        info!(
            organization_id = %organization.id,
            organization_user_id = %membership.id,
            added_by = %caller.id,
            "organization user created"
        );

        let delivery = match &member {
            Member::Invited(invitee) => {
                self.invitations
                    .send_invitation(invitee, &organization, caller)
                    .await
            }
            Member::Existing(user) => {
                self.invitations
                    .send_notification(user, &organization, caller)
                    .await
            }
        };
        if let Err(error) = delivery {
            warn!(%error, user_id = %user.id, "membership notification failed");
        }
        Ok(membership)
    }

    /// Change the admin flag of a membership.
    pub async fn update(
        &self,
        caller: &User,
        id: &OrganizationUserId,
        changes: MembershipChanges,
    ) -> Result<OrganizationUser, Error> {
        let organization_id = changes.organization;
        let standing = self
            .repos
            .member_standing(organization_id.as_ref(), &caller.id)
            .await?;
        let mut membership = self.scoped_membership(organization_id.as_ref(), id).await?;

        let is_admin = changes.is_admin.unwrap_or(membership.is_admin);
        ensure_can_update_member(&caller.id, &standing, &membership, is_admin)?;

        membership.is_admin = is_admin;
        membership.modified = Utc::now();
        self.repos
            .memberships
            .update(&membership)
            .await
            .map_err(map_membership_error)?;
        Ok(membership)
    }

    /// Remove a membership and its team memberships.
    pub async fn destroy(
        &self,
        caller: &User,
        organization_id: Option<&OrganizationId>,
        id: &OrganizationUserId,
    ) -> Result<(), Error> {
        let standing = self.repos.member_standing(organization_id, &caller.id).await?;
        let membership = self.scoped_membership(organization_id, id).await?;
        ensure_can_remove_member(&caller.id, &standing, &membership)?;
        let deleted = self
            .repos
            .memberships
            .delete(&membership.id)
            .await
            .map_err(map_membership_error)?;
        if !deleted {
            return Err(Error::not_found(NOT_FOUND));
        }
        info!(
            organization_user_id = %membership.id,
            removed_by = %caller.id,
            "organization user deleted"
        );
        Ok(())
    }

    /// Owner record of an organization the caller belongs to.
    pub async fn owner(
        &self,
        caller: &User,
        organization_id: Option<&OrganizationId>,
    ) -> Result<OrganizationOwner, Error> {
        self.repos
            .member_standing(organization_id, &caller.id)
            .await?
            .owner
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    async fn scoped_membership(
        &self,
        organization_id: Option<&OrganizationId>,
        id: &OrganizationUserId,
    ) -> Result<OrganizationUser, Error> {
        self.repos
            .memberships
            .find_by_id(id)
            .await
            .map_err(map_membership_error)?
            .filter(|membership| Some(&membership.organization_id) == organization_id)
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    async fn existing_organization(&self, id: &OrganizationId) -> Result<Organization, Error> {
        self.repos
            .organizations
            .find_by_id(id)
            .await
            .map_err(map_organization_error)?
            .ok_or_else(|| invalid_reference("organization", id))
    }

    async fn discard_invitee(&self, invitee: &User) {
        if let Err(error) = self.invitations.withdraw_invitee(invitee).await {
            warn!(%error, user_id = %invitee.id, "invited user left behind");
        }
    }

    async fn resolve_or_invite(
        &self,
        email: &EmailAddress,
        organization: &Organization,
        sender: &User,
    ) -> Result<Member, Error> {
        let mut matches = self
            .repos
            .users
            .find_by_email(email.as_ref())
            .await
            .map_err(map_user_error)?;
        match matches.len() {
            0 => self
                .invitations
                .register_invitee(email, organization, sender)
                .await
                .map(Member::Invited),
            1 => matches
                .pop()
                .map(Member::Existing)
                .ok_or_else(|| Error::internal("email lookup returned no user")),
            _ => Err(Error::invalid_request(EMAIL_USED_MULTIPLE_TIMES)
                .with_details(json!({ "field": "user_email", "code": "ambiguous" }))),
        }
    }
}

#[cfg(test)]
#[path = "membership_service_tests.rs"]
mod tests;
