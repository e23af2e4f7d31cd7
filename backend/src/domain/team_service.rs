//! Team and team roster use-cases.

use serde_json::json;
use tracing::info;

use crate::domain::access::{
    NOT_A_PART_OF_ORGANIZATION, OrganizationStanding, ensure_can_create_team, ensure_can_delete_team,
    ensure_can_manage_team_member, ensure_can_update_team,
};
use crate::domain::organization::validate_name;
use crate::domain::service_support::{
    NOT_FOUND, Repositories, invalid_reference, map_membership_error, map_organization_error,
    map_team_error, name_error,
};
use crate::domain::{
    Error, OrganizationId, OrganizationUserId, Team, TeamId, TeamMember, TeamMemberId, User,
};

pub(crate) const FOREIGN_ORGANIZATION_USER: &str =
    "The organization user does not belong to the team's organization.";

/// Payload for creating a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDraft {
    pub organization: OrganizationId,
    pub name: String,
}

/// Team update. `organization` selects the scope and is never written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamChanges {
    pub organization: Option<OrganizationId>,
    pub name: Option<String>,
}

/// Payload for adding an organization user to a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMemberDraft {
    pub team: TeamId,
    pub organization_user: OrganizationUserId,
    pub is_admin: bool,
}

/// Team membership update; only the admin flag is writable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamMemberChanges {
    pub organization: Option<OrganizationId>,
    pub is_admin: Option<bool>,
}

/// Team service.
#[derive(Clone)]
pub struct TeamService {
    repos: Repositories,
}

impl TeamService {
    /// Create a new service over the shared repositories.
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Teams of `organization_id`; empty unless the caller belongs to it.
    pub async fn list(
        &self,
        caller: &User,
        organization_id: Option<&OrganizationId>,
    ) -> Result<Vec<Team>, Error> {
        let Some(organization_id) = self.visible_scope(caller, organization_id).await? else {
            return Ok(Vec::new());
        };
        self.repos
            .teams
            .list_for_organization(&organization_id)
            .await
            .map_err(map_team_error)
    }

    /// One team of an organization the caller belongs to.
    pub async fn retrieve(
        &self,
        caller: &User,
        organization_id: Option<&OrganizationId>,
        id: &TeamId,
    ) -> Result<Team, Error> {
        self.repos.member_standing(organization_id, &caller.id).await?;
        self.scoped_team(organization_id, id).await
    }

    /// Create a team; owner or admin only.
    pub async fn create(&self, caller: &User, draft: TeamDraft) -> Result<Team, Error> {
        let name = validate_name(&draft.name).map_err(|err| name_error(&err))?;
        self.repos
            .organizations
            .find_by_id(&draft.organization)
            .await
            .map_err(map_organization_error)?
            .ok_or_else(|| invalid_reference("organization", &draft.organization))?;

        let standing = self.repos.standing(&draft.organization, &caller.id).await?;
        ensure_can_create_team(&standing)?;

        let team = Team::new(draft.organization, name);
        self.repos.teams.create(&team).await.map_err(map_team_error)?;
        info!(team_id = %team.id, organization_id = %team.organization_id, "team created");
        Ok(team)
    }

    /// Rename a team; owner or admin only.
    pub async fn update(
        &self,
        caller: &User,
        id: &TeamId,
        changes: TeamChanges,
    ) -> Result<Team, Error> {
        let organization_id = changes.organization;
        let standing = self
            .repos
            .member_standing(organization_id.as_ref(), &caller.id)
            .await?;
        let mut team = self.scoped_team(organization_id.as_ref(), id).await?;
        let name = changes
            .name
            .as_deref()
            .map(validate_name)
            .transpose()
            .map_err(|err| name_error(&err))?;
        ensure_can_update_team(&standing)?;

        if let Some(name) = name {
            team.name = name;
        }
        self.repos.teams.update(&team).await.map_err(map_team_error)?;
        Ok(team)
    }

    /// Delete a team and its roster; owner or admin of the team's
    /// organization only.
    pub async fn destroy(
        &self,
        caller: &User,
        organization_id: Option<&OrganizationId>,
        id: &TeamId,
    ) -> Result<(), Error> {
        self.repos.member_standing(organization_id, &caller.id).await?;
        let team = self.scoped_team(organization_id, id).await?;
        let standing = self.repos.standing(&team.organization_id, &caller.id).await?;
        ensure_can_delete_team(&standing)?;
        let deleted = self.repos.teams.delete(&team.id).await.map_err(map_team_error)?;
        if !deleted {
            return Err(Error::not_found(NOT_FOUND));
        }
        info!(team_id = %team.id, deleted_by = %caller.id, "team deleted");
        Ok(())
    }

    /// Team memberships of an organization, optionally narrowed to one team.
    pub async fn list_members(
        &self,
        caller: &User,
        organization_id: Option<&OrganizationId>,
        team_id: Option<&TeamId>,
    ) -> Result<Vec<TeamMember>, Error> {
        let Some(organization_id) = self.visible_scope(caller, organization_id).await? else {
            return Ok(Vec::new());
        };
        let members = self
            .repos
            .teams
            .list_members_for_organization(&organization_id)
            .await
            .map_err(map_team_error)?;
        Ok(members
            .into_iter()
            .filter(|member| team_id.is_none_or(|team| member.team_id == *team))
            .collect())
    }

    /// One team membership inside an organization the caller belongs to.
    pub async fn retrieve_member(
        &self,
        caller: &User,
        organization_id: Option<&OrganizationId>,
        id: &TeamMemberId,
    ) -> Result<TeamMember, Error> {
        self.repos.member_standing(organization_id, &caller.id).await?;
        self.scoped_member(organization_id, id).await
    }

    /// Add an organization user to a team.
    pub async fn add_member(
        &self,
        caller: &User,
        draft: TeamMemberDraft,
    ) -> Result<TeamMember, Error> {
        let team = self
            .repos
            .teams
            .find_by_id(&draft.team)
            .await
            .map_err(map_team_error)?
            .ok_or_else(|| invalid_reference("team", &draft.team))?;
        let organization_user = self
            .repos
            .memberships
            .find_by_id(&draft.organization_user)
            .await
            .map_err(map_membership_error)?
            .ok_or_else(|| invalid_reference("organization_user", &draft.organization_user))?;
        if organization_user.organization_id != team.organization_id {
            return Err(Error::invalid_request(FOREIGN_ORGANIZATION_USER)
                .with_details(json!({ "field": "organization_user", "code": "invalid" })));
        }

        let standing = self.roster_standing(&team.organization_id, caller).await?;
        ensure_can_manage_team_member(&standing, false)?;

        let member = TeamMember::new(team.id, organization_user.id, draft.is_admin);
        self.repos
            .teams
            .add_member(&member)
            .await
            .map_err(map_team_error)?;
        info!(team_member_id = %member.id, team_id = %team.id, "team member added");
        Ok(member)
    }

    /// Change the admin flag of a team membership.
    pub async fn update_member(
        &self,
        caller: &User,
        id: &TeamMemberId,
        changes: TeamMemberChanges,
    ) -> Result<TeamMember, Error> {
        let organization_id = changes.organization;
        let standing = self
            .repos
            .member_standing(organization_id.as_ref(), &caller.id)
            .await?;
        let mut member = self.scoped_member(organization_id.as_ref(), id).await?;
        ensure_can_manage_team_member(&standing, false)?;

        if let Some(is_admin) = changes.is_admin {
            member.is_admin = is_admin;
        }
        self.repos
            .teams
            .update_member(&member)
            .await
            .map_err(map_team_error)?;
        Ok(member)
    }

    /// Remove a team membership; members may remove themselves.
    pub async fn remove_member(
        &self,
        caller: &User,
        organization_id: Option<&OrganizationId>,
        id: &TeamMemberId,
    ) -> Result<(), Error> {
        let standing = self.repos.member_standing(organization_id, &caller.id).await?;
        let member = self.scoped_member(organization_id, id).await?;
        let is_self = standing
            .membership
            .as_ref()
            .is_some_and(|own| own.id == member.organization_user_id);
        ensure_can_manage_team_member(&standing, is_self)?;
        let deleted = self
            .repos
            .teams
            .remove_member(&member.id)
            .await
            .map_err(map_team_error)?;
        if !deleted {
            return Err(Error::not_found(NOT_FOUND));
        }
        Ok(())
    }

    async fn visible_scope(
        &self,
        caller: &User,
        organization_id: Option<&OrganizationId>,
    ) -> Result<Option<OrganizationId>, Error> {
        let Some(organization_id) = organization_id else {
            return Ok(None);
        };
        let standing = self.repos.standing(organization_id, &caller.id).await?;
        Ok(standing.is_member().then_some(*organization_id))
    }

    async fn roster_standing(
        &self,
        organization_id: &OrganizationId,
        caller: &User,
    ) -> Result<OrganizationStanding, Error> {
        let standing = self.repos.standing(organization_id, &caller.id).await?;
        if standing.is_member() {
            Ok(standing)
        } else {
            Err(Error::forbidden(NOT_A_PART_OF_ORGANIZATION))
        }
    }

    async fn scoped_team(
        &self,
        organization_id: Option<&OrganizationId>,
        id: &TeamId,
    ) -> Result<Team, Error> {
        self.repos
            .teams
            .find_by_id(id)
            .await
            .map_err(map_team_error)?
            .filter(|team| Some(&team.organization_id) == organization_id)
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    async fn scoped_member(
        &self,
        organization_id: Option<&OrganizationId>,
        id: &TeamMemberId,
    ) -> Result<TeamMember, Error> {
        let member = self
            .repos
            .teams
            .find_member(id)
            .await
            .map_err(map_team_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))?;
        self.scoped_team(organization_id, &member.team_id).await?;
        Ok(member)
    }
}

#[cfg(test)]
#[path = "team_service_tests.rs"]
mod tests;
