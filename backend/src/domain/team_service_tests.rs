//! Tests for the team service.

use std::sync::Arc;

use super::*;
use crate::domain::access::{
    NOT_ALLOWED_CREATE_TEAM, NOT_ALLOWED_DELETE_TEAM, NOT_ALLOWED_MANAGE_TEAM_MEMBERS,
};
use crate::domain::ports::{
    MockAddressRepository, MockMembershipRepository, MockOrganizationRepository,
    MockTeamRepository, MockUserRepository, TeamPersistenceError,
};
use crate::domain::service_support::ALREADY_TEAM_MEMBER;
use crate::domain::{ErrorCode, FoundedOrganization, OrganizationUser, Profile, UserId, Username};
use rstest::{fixture, rstest};

fn user(name: &str) -> User {
    User::new(Username::new(name).expect("valid username"), Profile::default())
}

struct World {
    owner: User,
    member: User,
    founded: FoundedOrganization,
    member_membership: OrganizationUser,
    team: Team,
    member_seat: TeamMember,
}

#[fixture]
fn world() -> World {
    let owner = user("alice");
    let member = user("dave");
    let founded = FoundedOrganization::new("Acme".to_owned(), "acme".to_owned(), true, owner.id);
    let member_membership = OrganizationUser::new(member.id, founded.organization.id, false);
    let team = Team::new(founded.organization.id, "Core".to_owned());
    let member_seat = TeamMember::new(team.id, member_membership.id, false);
    World {
        owner,
        member,
        founded,
        member_membership,
        team,
        member_seat,
    }
}

struct Harness {
    organizations: MockOrganizationRepository,
    memberships: MockMembershipRepository,
    teams: MockTeamRepository,
}

impl Harness {
    fn over(world: &World) -> Self {
        let mut organizations = MockOrganizationRepository::new();
        let organization = world.founded.organization.clone();
        organizations
            .expect_find_by_id()
            .returning(move |id| Ok((organization.id == *id).then(|| organization.clone())));
        let owner = world.founded.owner.clone();
        organizations
            .expect_find_owner()
            .returning(move |_| Ok(Some(owner.clone())));

        let known = vec![world.founded.membership.clone(), world.member_membership.clone()];
        let mut memberships = MockMembershipRepository::new();
        let by_user = known.clone();
        memberships.expect_find_for_user().returning(move |org, user| {
            Ok(by_user
                .iter()
                .find(|m| m.organization_id == *org && m.user_id == *user)
                .cloned())
        });
        memberships
            .expect_find_by_id()
            .returning(move |id| Ok(known.iter().find(|m| m.id == *id).cloned()));

        let mut teams = MockTeamRepository::new();
        let team = world.team.clone();
        teams
            .expect_find_by_id()
            .returning(move |id| Ok((team.id == *id).then(|| team.clone())));
        let seat = world.member_seat.clone();
        teams
            .expect_find_member()
            .returning(move |id| Ok((seat.id == *id).then(|| seat.clone())));

        Self {
            organizations,
            memberships,
            teams,
        }
    }

    fn service(self) -> TeamService {
        TeamService::new(Repositories {
            users: Arc::new(MockUserRepository::new()),
            addresses: Arc::new(MockAddressRepository::new()),
            organizations: Arc::new(self.organizations),
            memberships: Arc::new(self.memberships),
            teams: Arc::new(self.teams),
        })
    }
}

#[rstest]
#[tokio::test]
async fn owner_creates_teams(world: World) {
    let mut harness = Harness::over(&world);
    harness.teams.expect_create().times(1).returning(|_| Ok(()));
    let team = harness
        .service()
        .create(
            &world.owner,
            TeamDraft {
                organization: world.founded.organization.id,
                name: " Platform ".to_owned(),
            },
        )
        .await
        .expect("owner may create");
    assert_eq!(team.name, "Platform");
    assert_eq!(team.organization_id, world.founded.organization.id);
}

#[rstest]
#[tokio::test]
async fn plain_members_cannot_create_teams(world: World) {
    let err = Harness::over(&world)
        .service()
        .create(
            &world.member,
            TeamDraft {
                organization: world.founded.organization.id,
                name: "Platform".to_owned(),
            },
        )
        .await
        .expect_err("member is not admin");
    assert_eq!(err.message(), NOT_ALLOWED_CREATE_TEAM);
}

#[rstest]
#[tokio::test]
async fn unknown_organization_is_a_validation_error(world: World) {
    let err = Harness::over(&world)
        .service()
        .create(
            &world.owner,
            TeamDraft {
                organization: OrganizationId::random(),
                name: "Platform".to_owned(),
            },
        )
        .await
        .expect_err("missing organization");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn destroy_uses_the_fetched_team_organization(world: World) {
    let mut harness = Harness::over(&world);
    let team_id = world.team.id;
    harness
        .teams
        .expect_delete()
        .withf(move |id| *id == team_id)
        .times(1)
        .returning(|_| Ok(true));
    harness
        .service()
        .destroy(&world.owner, Some(&world.founded.organization.id), &world.team.id)
        .await
        .expect("owner deletes team");
}

#[rstest]
#[tokio::test]
async fn members_cannot_delete_teams(world: World) {
    let err = Harness::over(&world)
        .service()
        .destroy(&world.member, Some(&world.founded.organization.id), &world.team.id)
        .await
        .expect_err("member cannot delete");
    assert_eq!(err.message(), NOT_ALLOWED_DELETE_TEAM);
}

#[rstest]
#[tokio::test]
async fn teams_outside_scope_are_not_found(world: World) {
    let err = Harness::over(&world)
        .service()
        .retrieve(&world.member, Some(&OrganizationId::random()), &world.team.id)
        .await
        .expect_err("wrong scope");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn duplicate_team_members_map_to_validation_error(world: World) {
    let mut harness = Harness::over(&world);
    harness
        .teams
        .expect_add_member()
        .returning(|_| Err(TeamPersistenceError::duplicate_member()));
    let err = harness
        .service()
        .add_member(
            &world.owner,
            TeamMemberDraft {
                team: world.team.id,
                organization_user: world.member_membership.id,
                is_admin: false,
            },
        )
        .await
        .expect_err("duplicate seat");
    assert_eq!(err.message(), ALREADY_TEAM_MEMBER);
}

#[rstest]
#[tokio::test]
async fn foreign_organization_users_cannot_join(world: World) {
    let mut harness = Harness::over(&world);
    let outsider = OrganizationUser::new(UserId::random(), OrganizationId::random(), false);
    let returned = outsider.clone();
    harness.memberships = MockMembershipRepository::new();
    harness
        .memberships
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(returned)));
    harness.teams.expect_add_member().never();

    let err = harness
        .service()
        .add_member(
            &world.owner,
            TeamMemberDraft {
                team: world.team.id,
                organization_user: outsider.id,
                is_admin: false,
            },
        )
        .await
        .expect_err("foreign member");
    assert_eq!(err.message(), FOREIGN_ORGANIZATION_USER);
}

#[rstest]
#[tokio::test]
async fn members_may_leave_a_team_but_not_promote_themselves(world: World) {
    let mut harness = Harness::over(&world);
    harness.teams.expect_remove_member().times(1).returning(|_| Ok(true));
    let service = harness.service();

    let err = service
        .update_member(
            &world.member,
            &world.member_seat.id,
            TeamMemberChanges {
                organization: Some(world.founded.organization.id),
                is_admin: Some(true),
            },
        )
        .await
        .expect_err("self promotion rejected");
    assert_eq!(err.message(), NOT_ALLOWED_MANAGE_TEAM_MEMBERS);

    service
        .remove_member(
            &world.member,
            Some(&world.founded.organization.id),
            &world.member_seat.id,
        )
        .await
        .expect("self removal allowed");
}

#[rstest]
#[tokio::test]
async fn member_listing_filters_by_team(world: World) {
    let mut harness = Harness::over(&world);
    let other = TeamMember::new(TeamId::random(), world.member_membership.id, false);
    let seats = vec![world.member_seat.clone(), other];
    harness
        .teams
        .expect_list_members_for_organization()
        .returning(move |_| Ok(seats.clone()));
    let service = harness.service();
    let organization = world.founded.organization.id;

    let all = service
        .list_members(&world.member, Some(&organization), None)
        .await
        .expect("list");
    assert_eq!(all.len(), 2);
    let core = service
        .list_members(&world.member, Some(&organization), Some(&world.team.id))
        .await
        .expect("list");
    assert_eq!(core, vec![world.member_seat.clone()]);
}
