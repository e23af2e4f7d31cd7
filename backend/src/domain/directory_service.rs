//! Expands records into the nested shapes served by the v2 API.

use std::collections::HashMap;

use crate::domain::service_support::{
    Repositories, map_address_error, map_membership_error, map_organization_error,
    map_team_error, map_user_error,
};
use crate::domain::{
    Address, Error, Organization, OrganizationId, OrganizationOwner, OrganizationUser,
    OrganizationUserId, Team, TeamId, TeamMember, User, UserId,
};

/// Organization with the users that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationDetail {
    pub organization: Organization,
    pub users: Vec<User>,
}

/// Membership with its user and organization expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipDetail {
    pub membership: OrganizationUser,
    pub user: User,
    pub organization: OrganizationDetail,
}

/// Owner record with its membership and organization expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerDetail {
    pub owner: OrganizationOwner,
    pub membership: OrganizationUser,
    pub organization: OrganizationDetail,
}

/// Team with its organization expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDetail {
    pub team: Team,
    pub organization: OrganizationDetail,
}

/// Team membership with its membership and team expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMemberDetail {
    pub member: TeamMember,
    pub organization_user: MembershipDetail,
    pub team: Team,
}

/// User with their addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetail {
    pub user: User,
    pub addresses: Vec<Address>,
}

/// Address with its owner expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDetail {
    pub address: Address,
    pub user: User,
}

fn dangling(kind: &str, id: &impl std::fmt::Display) -> Error {
    Error::internal(format!("{kind} {id} referenced but missing"))
}

/// Read-only service resolving relations for nested representations.
///
/// Organization expansions are memoised for the lifetime of one call so that
/// listing many memberships of the same organization loads it once.
#[derive(Clone)]
pub struct DirectoryService {
    repos: Repositories,
}

#[derive(Default)]
struct Memo {
    organizations: HashMap<OrganizationId, OrganizationDetail>,
    users: HashMap<UserId, User>,
    memberships: HashMap<OrganizationUserId, MembershipDetail>,
    teams: HashMap<TeamId, Team>,
}

impl DirectoryService {
    /// Create a new service over the shared repositories.
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Expand organizations with their users.
    pub async fn organizations(
        &self,
        organizations: Vec<Organization>,
    ) -> Result<Vec<OrganizationDetail>, Error> {
        let mut details = Vec::with_capacity(organizations.len());
        for organization in organizations {
            details.push(self.expand_organization(organization).await?);
        }
        Ok(details)
    }

    /// Expand one organization.
    pub async fn organization(&self, organization: Organization) -> Result<OrganizationDetail, Error> {
        self.expand_organization(organization).await
    }

    /// Expand memberships with their user and organization.
    pub async fn memberships(
        &self,
        memberships: Vec<OrganizationUser>,
    ) -> Result<Vec<MembershipDetail>, Error> {
        let mut memo = Memo::default();
        let mut details = Vec::with_capacity(memberships.len());
        for membership in memberships {
            details.push(self.membership_with(&mut memo, membership).await?);
        }
        Ok(details)
    }

    /// Expand one membership.
    pub async fn membership(&self, membership: OrganizationUser) -> Result<MembershipDetail, Error> {
        self.membership_with(&mut Memo::default(), membership).await
    }

    /// Expand an owner record.
    pub async fn owner(&self, owner: OrganizationOwner) -> Result<OwnerDetail, Error> {
        let mut memo = Memo::default();
        let membership = self
            .repos
            .memberships
            .find_by_id(&owner.organization_user_id)
            .await
            .map_err(map_membership_error)?
            .ok_or_else(|| dangling("organization user", &owner.organization_user_id))?;
        let organization = self
            .organization_with(&mut memo, &owner.organization_id)
            .await?;
        Ok(OwnerDetail {
            owner,
            membership,
            organization,
        })
    }

    /// Expand teams with their organization.
    pub async fn teams(&self, teams: Vec<Team>) -> Result<Vec<TeamDetail>, Error> {
        let mut memo = Memo::default();
        let mut details = Vec::with_capacity(teams.len());
        for team in teams {
            let organization = self.organization_with(&mut memo, &team.organization_id).await?;
            details.push(TeamDetail { team, organization });
        }
        Ok(details)
    }

    /// Expand one team.
    pub async fn team(&self, team: Team) -> Result<TeamDetail, Error> {
        let mut details = self.teams(vec![team]).await?;
        details
            .pop()
            .ok_or_else(|| Error::internal("team expansion produced no result"))
    }

    /// Expand team memberships with their membership and team.
    pub async fn team_members(
        &self,
        members: Vec<TeamMember>,
    ) -> Result<Vec<TeamMemberDetail>, Error> {
        let mut memo = Memo::default();
        let mut details = Vec::with_capacity(members.len());
        for member in members {
            details.push(self.team_member_with(&mut memo, member).await?);
        }
        Ok(details)
    }

    /// Expand one team membership.
    pub async fn team_member(&self, member: TeamMember) -> Result<TeamMemberDetail, Error> {
        self.team_member_with(&mut Memo::default(), member).await
    }

    /// Attach addresses to users.
    pub async fn users(&self, users: Vec<User>) -> Result<Vec<UserDetail>, Error> {
        let mut details = Vec::with_capacity(users.len());
        for user in users {
            let addresses = self
                .repos
                .addresses
                .list_for_user(&user.id)
                .await
                .map_err(map_address_error)?;
            details.push(UserDetail { user, addresses });
        }
        Ok(details)
    }

    /// Attach addresses to one user.
    pub async fn user(&self, user: User) -> Result<UserDetail, Error> {
        let mut details = self.users(vec![user]).await?;
        details
            .pop()
            .ok_or_else(|| Error::internal("user expansion produced no result"))
    }

    /// Expand addresses with their owner.
    pub async fn addresses(&self, addresses: Vec<Address>) -> Result<Vec<AddressDetail>, Error> {
        let mut memo = Memo::default();
        let mut details = Vec::with_capacity(addresses.len());
        for address in addresses {
            let user = self.user_with(&mut memo, &address.user_id).await?;
            details.push(AddressDetail { address, user });
        }
        Ok(details)
    }

    /// Expand one address.
    pub async fn address(&self, address: Address) -> Result<AddressDetail, Error> {
        let mut details = self.addresses(vec![address]).await?;
        details
            .pop()
            .ok_or_else(|| Error::internal("address expansion produced no result"))
    }

    async fn expand_organization(
        &self,
        organization: Organization,
    ) -> Result<OrganizationDetail, Error> {
        let memberships = self
            .repos
            .memberships
            .list_for_organization(&organization.id)
            .await
            .map_err(map_membership_error)?;
        let ids: Vec<UserId> = memberships.iter().map(|m| m.user_id).collect();
        let mut found: HashMap<UserId, User> = self
            .repos
            .users
            .find_many(&ids)
            .await
            .map_err(map_user_error)?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();
        let users = ids.iter().filter_map(|id| found.remove(id)).collect();
        Ok(OrganizationDetail {
            organization,
            users,
        })
    }

    async fn organization_with(
        &self,
        memo: &mut Memo,
        id: &OrganizationId,
    ) -> Result<OrganizationDetail, Error> {
        if let Some(detail) = memo.organizations.get(id) {
            return Ok(detail.clone());
        }
        let organization = self
            .repos
            .organizations
            .find_by_id(id)
            .await
            .map_err(map_organization_error)?
            .ok_or_else(|| dangling("organization", id))?;
        let detail = self.expand_organization(organization).await?;
        memo.organizations.insert(*id, detail.clone());
        Ok(detail)
    }

    async fn user_with(&self, memo: &mut Memo, id: &UserId) -> Result<User, Error> {
        if let Some(user) = memo.users.get(id) {
            return Ok(user.clone());
        }
        let user = self
            .repos
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| dangling("user", id))?;
        memo.users.insert(*id, user.clone());
        Ok(user)
    }

    async fn membership_with(
        &self,
        memo: &mut Memo,
        membership: OrganizationUser,
    ) -> Result<MembershipDetail, Error> {
        let user = self.user_with(memo, &membership.user_id).await?;
        let organization = self
            .organization_with(memo, &membership.organization_id)
            .await?;
        Ok(MembershipDetail {
            membership,
            user,
            organization,
        })
    }

    async fn team_member_with(
        &self,
        memo: &mut Memo,
        member: TeamMember,
    ) -> Result<TeamMemberDetail, Error> {
        let organization_user = match memo.memberships.get(&member.organization_user_id) {
            Some(detail) => detail.clone(),
            None => {
                let membership = self
                    .repos
                    .memberships
                    .find_by_id(&member.organization_user_id)
                    .await
                    .map_err(map_membership_error)?
                    .ok_or_else(|| dangling("organization user", &member.organization_user_id))?;
                let detail = self.membership_with(memo, membership).await?;
                memo.memberships
                    .insert(member.organization_user_id, detail.clone());
                detail
            }
        };
        let team = match memo.teams.get(&member.team_id) {
            Some(team) => team.clone(),
            None => {
                let team = self
                    .repos
                    .teams
                    .find_by_id(&member.team_id)
                    .await
                    .map_err(map_team_error)?
                    .ok_or_else(|| dangling("team", &member.team_id))?;
                memo.teams.insert(member.team_id, team.clone());
                team
            }
        };
        Ok(TeamMemberDetail {
            member,
            organization_user,
            team,
        })
    }
}
