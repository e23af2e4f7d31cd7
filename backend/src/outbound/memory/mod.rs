//! Process-local store implementing every persistence port.
//!
//! Used when no database URL is configured and by the integration tests. It
//! enforces the same unique constraints and delete cascades as the
//! PostgreSQL schema.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    AddressPersistenceError, AddressRepository, MembershipPersistenceError, MembershipRepository,
    OrganizationPersistenceError, OrganizationRepository, StoredCredentials, TeamPersistenceError,
    TeamRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Address, AddressId, FoundedOrganization, Organization, OrganizationId, OrganizationOwner,
    OrganizationUser, OrganizationUserId, PasswordDigest, Repositories, Team, TeamId, TeamMember,
    TeamMemberId, User, UserId,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Default)]
struct State {
    users: Vec<User>,
    passwords: HashMap<UserId, PasswordDigest>,
    addresses: Vec<Address>,
    organizations: Vec<Organization>,
    memberships: Vec<OrganizationUser>,
    owners: Vec<OrganizationOwner>,
    teams: Vec<Team>,
    team_members: Vec<TeamMember>,
}

impl State {
    /// Drop a membership together with its team memberships and owner row.
    fn remove_membership(&mut self, id: &OrganizationUserId) -> bool {
        let before = self.memberships.len();
        self.memberships.retain(|m| m.id != *id);
        self.team_members.retain(|m| m.organization_user_id != *id);
        self.owners.retain(|o| o.organization_user_id != *id);
        self.memberships.len() != before
    }

    fn remove_team(&mut self, id: &TeamId) -> bool {
        let before = self.teams.len();
        self.teams.retain(|t| t.id != *id);
        self.team_members.retain(|m| m.team_id != *id);
        self.teams.len() != before
    }
}

/// Mutex-guarded in-memory implementation of the persistence ports.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, &'static str> {
        self.state.lock().map_err(|_| POISONED)
    }
}

/// Wire every port to one shared in-memory store.
pub fn in_memory_repositories(store: Arc<InMemoryStore>) -> Repositories {
    Repositories {
        users: store.clone(),
        addresses: store.clone(),
        organizations: store.clone(),
        memberships: store.clone(),
        teams: store,
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(
        &self,
        user: &User,
        password: Option<PasswordDigest>,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(UserPersistenceError::duplicate_username(user.username.as_ref()));
        }
        state.users.push(user.clone());
        if let Some(digest) = password {
            state.passwords.insert(user.id, digest);
        }
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        if state
            .users
            .iter()
            .any(|u| u.username == user.username && u.id != user.id)
        {
            return Err(UserPersistenceError::duplicate_username(user.username.as_ref()));
        }
        if let Some(slot) = state.users.iter_mut().find(|u| u.id == user.id) {
            *slot = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        let before = state.users.len();
        state.users.retain(|u| u.id != *id);
        if state.users.len() == before {
            return Ok(false);
        }
        state.passwords.remove(id);
        state.addresses.retain(|a| a.user_id != *id);
        let memberships: Vec<OrganizationUserId> = state
            .memberships
            .iter()
            .filter(|m| m.user_id == *id)
            .map(|m| m.id)
            .collect();
        for membership in &memberships {
            state.remove_membership(membership);
        }
        Ok(true)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state.users.iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state
            .users
            .iter()
            .find(|u| u.username.as_ref() == username)
            .cloned())
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state
            .users
            .iter()
            .find(|u| u.username.as_ref() == username)
            .map(|user| StoredCredentials {
                user: user.clone(),
                password: state.passwords.get(&user.id).cloned(),
            }))
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state
            .users
            .iter()
            .filter(|u| u.profile.email.as_ref().is_some_and(|e| e.matches(email)))
            .cloned()
            .collect())
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        let mut users = state.users.clone();
        users.reverse();
        users.sort_by(|a, b| b.date_joined.cmp(&a.date_joined));
        Ok(users)
    }
}

#[async_trait]
impl AddressRepository for InMemoryStore {
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Address>, AddressPersistenceError> {
        let state = self.lock().map_err(AddressPersistenceError::query)?;
        Ok(state
            .addresses
            .iter()
            .filter(|a| a.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &AddressId) -> Result<Option<Address>, AddressPersistenceError> {
        let state = self.lock().map_err(AddressPersistenceError::query)?;
        Ok(state.addresses.iter().find(|a| a.id == *id).cloned())
    }

    async fn create(&self, address: &Address) -> Result<(), AddressPersistenceError> {
        let mut state = self.lock().map_err(AddressPersistenceError::query)?;
        state.addresses.push(address.clone());
        Ok(())
    }

    async fn update(&self, address: &Address) -> Result<(), AddressPersistenceError> {
        let mut state = self.lock().map_err(AddressPersistenceError::query)?;
        if let Some(slot) = state.addresses.iter_mut().find(|a| a.id == address.id) {
            *slot = address.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &AddressId) -> Result<bool, AddressPersistenceError> {
        let mut state = self.lock().map_err(AddressPersistenceError::query)?;
        let before = state.addresses.len();
        state.addresses.retain(|a| a.id != *id);
        Ok(state.addresses.len() != before)
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryStore {
    async fn create(
        &self,
        founded: &FoundedOrganization,
    ) -> Result<(), OrganizationPersistenceError> {
        let mut state = self.lock().map_err(OrganizationPersistenceError::query)?;
        let slug = &founded.organization.slug;
        if state.organizations.iter().any(|o| o.slug == *slug) {
            return Err(OrganizationPersistenceError::duplicate_slug(slug.as_str()));
        }
        state.organizations.push(founded.organization.clone());
        state.memberships.push(founded.membership.clone());
        state.owners.push(founded.owner.clone());
        Ok(())
    }

    async fn list_for_member(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Organization>, OrganizationPersistenceError> {
        let state = self.lock().map_err(OrganizationPersistenceError::query)?;
        let mut organizations: Vec<Organization> = state
            .organizations
            .iter()
            .rev()
            .filter(|o| {
                state
                    .memberships
                    .iter()
                    .any(|m| m.organization_id == o.id && m.user_id == *user_id)
            })
            .cloned()
            .collect();
        organizations.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(organizations)
    }

    async fn find_by_id(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<Organization>, OrganizationPersistenceError> {
        let state = self.lock().map_err(OrganizationPersistenceError::query)?;
        Ok(state.organizations.iter().find(|o| o.id == *id).cloned())
    }

    async fn slugs_with_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<String>, OrganizationPersistenceError> {
        let state = self.lock().map_err(OrganizationPersistenceError::query)?;
        Ok(state
            .organizations
            .iter()
            .filter(|o| o.slug.starts_with(prefix))
            .map(|o| o.slug.clone())
            .collect())
    }

    async fn update(
        &self,
        organization: &Organization,
    ) -> Result<(), OrganizationPersistenceError> {
        let mut state = self.lock().map_err(OrganizationPersistenceError::query)?;
        if let Some(slot) = state
            .organizations
            .iter_mut()
            .find(|o| o.id == organization.id)
        {
            slot.name.clone_from(&organization.name);
            slot.is_active = organization.is_active;
            slot.modified = organization.modified;
        }
        Ok(())
    }

    async fn delete(&self, id: &OrganizationId) -> Result<bool, OrganizationPersistenceError> {
        let mut state = self.lock().map_err(OrganizationPersistenceError::query)?;
        let before = state.organizations.len();
        state.organizations.retain(|o| o.id != *id);
        if state.organizations.len() == before {
            return Ok(false);
        }
        let teams: Vec<TeamId> = state
            .teams
            .iter()
            .filter(|t| t.organization_id == *id)
            .map(|t| t.id)
            .collect();
        for team in &teams {
            state.remove_team(team);
        }
        let memberships: Vec<OrganizationUserId> = state
            .memberships
            .iter()
            .filter(|m| m.organization_id == *id)
            .map(|m| m.id)
            .collect();
        for membership in &memberships {
            state.remove_membership(membership);
        }
        state.owners.retain(|o| o.organization_id != *id);
        Ok(true)
    }

    async fn find_owner(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<OrganizationOwner>, OrganizationPersistenceError> {
        let state = self.lock().map_err(OrganizationPersistenceError::query)?;
        Ok(state
            .owners
            .iter()
            .find(|o| o.organization_id == *id)
            .cloned())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryStore {
    async fn create(&self, membership: &OrganizationUser) -> Result<(), MembershipPersistenceError> {
        let mut state = self.lock().map_err(MembershipPersistenceError::query)?;
        if state.memberships.iter().any(|m| {
            m.organization_id == membership.organization_id && m.user_id == membership.user_id
        }) {
            return Err(MembershipPersistenceError::duplicate_member());
        }
        state.memberships.push(membership.clone());
        Ok(())
    }

    async fn update(&self, membership: &OrganizationUser) -> Result<(), MembershipPersistenceError> {
        let mut state = self.lock().map_err(MembershipPersistenceError::query)?;
        if let Some(slot) = state.memberships.iter_mut().find(|m| m.id == membership.id) {
            slot.is_admin = membership.is_admin;
            slot.modified = membership.modified;
        }
        Ok(())
    }

    async fn delete(&self, id: &OrganizationUserId) -> Result<bool, MembershipPersistenceError> {
        let mut state = self.lock().map_err(MembershipPersistenceError::query)?;
        Ok(state.remove_membership(id))
    }

    async fn find_by_id(
        &self,
        id: &OrganizationUserId,
    ) -> Result<Option<OrganizationUser>, MembershipPersistenceError> {
        let state = self.lock().map_err(MembershipPersistenceError::query)?;
        Ok(state.memberships.iter().find(|m| m.id == *id).cloned())
    }

    async fn find_for_user(
        &self,
        organization_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<Option<OrganizationUser>, MembershipPersistenceError> {
        let state = self.lock().map_err(MembershipPersistenceError::query)?;
        Ok(state
            .memberships
            .iter()
            .find(|m| m.organization_id == *organization_id && m.user_id == *user_id)
            .cloned())
    }

    async fn list_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<OrganizationUser>, MembershipPersistenceError> {
        let state = self.lock().map_err(MembershipPersistenceError::query)?;
        let mut memberships: Vec<OrganizationUser> = state
            .memberships
            .iter()
            .rev()
            .filter(|m| m.organization_id == *organization_id)
            .cloned()
            .collect();
        memberships.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(memberships)
    }
}

#[async_trait]
impl TeamRepository for InMemoryStore {
    async fn create(&self, team: &Team) -> Result<(), TeamPersistenceError> {
        let mut state = self.lock().map_err(TeamPersistenceError::query)?;
        state.teams.push(team.clone());
        Ok(())
    }

    async fn update(&self, team: &Team) -> Result<(), TeamPersistenceError> {
        let mut state = self.lock().map_err(TeamPersistenceError::query)?;
        if let Some(slot) = state.teams.iter_mut().find(|t| t.id == team.id) {
            *slot = team.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &TeamId) -> Result<bool, TeamPersistenceError> {
        let mut state = self.lock().map_err(TeamPersistenceError::query)?;
        Ok(state.remove_team(id))
    }

    async fn find_by_id(&self, id: &TeamId) -> Result<Option<Team>, TeamPersistenceError> {
        let state = self.lock().map_err(TeamPersistenceError::query)?;
        Ok(state.teams.iter().find(|t| t.id == *id).cloned())
    }

    async fn list_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Team>, TeamPersistenceError> {
        let state = self.lock().map_err(TeamPersistenceError::query)?;
        let mut teams: Vec<Team> = state
            .teams
            .iter()
            .filter(|t| t.organization_id == *organization_id)
            .cloned()
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    async fn add_member(&self, member: &TeamMember) -> Result<(), TeamPersistenceError> {
        let mut state = self.lock().map_err(TeamPersistenceError::query)?;
        if state.team_members.iter().any(|m| {
            m.team_id == member.team_id && m.organization_user_id == member.organization_user_id
        }) {
            return Err(TeamPersistenceError::duplicate_member());
        }
        state.team_members.push(member.clone());
        Ok(())
    }

    async fn update_member(&self, member: &TeamMember) -> Result<(), TeamPersistenceError> {
        let mut state = self.lock().map_err(TeamPersistenceError::query)?;
        if let Some(slot) = state.team_members.iter_mut().find(|m| m.id == member.id) {
            *slot = member.clone();
        }
        Ok(())
    }

    async fn remove_member(&self, id: &TeamMemberId) -> Result<bool, TeamPersistenceError> {
        let mut state = self.lock().map_err(TeamPersistenceError::query)?;
        let before = state.team_members.len();
        state.team_members.retain(|m| m.id != *id);
        Ok(state.team_members.len() != before)
    }

    async fn find_member(
        &self,
        id: &TeamMemberId,
    ) -> Result<Option<TeamMember>, TeamPersistenceError> {
        let state = self.lock().map_err(TeamPersistenceError::query)?;
        Ok(state.team_members.iter().find(|m| m.id == *id).cloned())
    }

    async fn list_members_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<TeamMember>, TeamPersistenceError> {
        let state = self.lock().map_err(TeamPersistenceError::query)?;
        let team_name = |id: &TeamId| {
            state
                .teams
                .iter()
                .find(|t| t.id == *id && t.organization_id == *organization_id)
                .map(|t| t.name.clone())
        };
        let mut members: Vec<(String, TeamMember)> = state
            .team_members
            .iter()
            .filter_map(|m| team_name(&m.team_id).map(|name| (name, m.clone())))
            .collect();
        members.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(members.into_iter().map(|(_, member)| member).collect())
    }
}
