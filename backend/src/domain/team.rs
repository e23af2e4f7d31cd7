//! Teams within an organization and their members.

use super::ids::{OrganizationId, OrganizationUserId, TeamId, TeamMemberId};

/// Named group of organization members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: TeamId,
    pub organization_id: OrganizationId,
    pub name: String,
}

impl Team {
    /// Build a team with a fresh identifier.
    pub fn new(organization_id: OrganizationId, name: String) -> Self {
        Self {
            id: TeamId::random(),
            organization_id,
            name,
        }
    }
}

/// Membership of an organization user in a team.
///
/// The organization user must belong to the team's organization; a given
/// organization user appears in a team at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMember {
    pub id: TeamMemberId,
    pub team_id: TeamId,
    pub organization_user_id: OrganizationUserId,
    pub is_admin: bool,
}

impl TeamMember {
    /// Build a team membership with a fresh identifier.
    pub fn new(team_id: TeamId, organization_user_id: OrganizationUserId, is_admin: bool) -> Self {
        Self {
            id: TeamMemberId::random(),
            team_id,
            organization_user_id,
            is_admin,
        }
    }
}
