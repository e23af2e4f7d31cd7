//! Authorization predicate coverage.

use super::*;
use crate::domain::{
    ErrorCode, OrganizationId, OrganizationOwnerId, Profile, User, UserId, Username,
};
use chrono::Utc;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};

fn user(name: &str, is_staff: bool) -> User {
    User::new(Username::new(name).expect("valid username"), Profile::default()).with_staff(is_staff)
}

fn membership(user_id: UserId, organization_id: OrganizationId, is_admin: bool) -> OrganizationUser {
    OrganizationUser::new(user_id, organization_id, is_admin)
}

fn owner_of(target: &OrganizationUser) -> OrganizationOwner {
    OrganizationOwner {
        id: OrganizationOwnerId::random(),
        organization_id: target.organization_id,
        organization_user_id: target.id,
        created: Utc::now(),
        modified: Utc::now(),
    }
}

struct Fixture {
    organization_id: OrganizationId,
    owner_membership: OrganizationUser,
    admin_membership: OrganizationUser,
    member_membership: OrganizationUser,
}

impl Fixture {
    fn standing_for(&self, membership: Option<&OrganizationUser>) -> OrganizationStanding {
        OrganizationStanding {
            membership: membership.cloned(),
            owner: Some(owner_of(&self.owner_membership)),
        }
    }
}

#[fixture]
fn org() -> Fixture {
    let organization_id = OrganizationId::random();
    Fixture {
        organization_id,
        owner_membership: membership(UserId::random(), organization_id, true),
        admin_membership: membership(UserId::random(), organization_id, true),
        member_membership: membership(UserId::random(), organization_id, false),
    }
}

fn assert_forbidden(result: Result<(), Error>, message: &str) {
    let error = result.expect_err("expected rejection");
    assert_eq!(error.code(), ErrorCode::Forbidden);
    assert_eq!(error.message(), message);
}

#[given("a non-staff caller")]
fn a_non_staff_caller() -> User {
    user("carol", false)
}

#[when("the caller tries to create an organization")]
fn the_caller_tries_to_create_an_organization(caller: &User) -> Result<(), Error> {
    ensure_can_create_organization(caller)
}

#[then("the request is forbidden for non-staff")]
fn the_request_is_forbidden_for_non_staff(result: Result<(), Error>) {
    assert_forbidden(result, ONLY_STAFF_CREATE_ORGANIZATION);
}

#[rstest]
fn non_staff_cannot_create_organizations() {
    let caller = a_non_staff_caller();
    let result = the_caller_tries_to_create_an_organization(&caller);
    the_request_is_forbidden_for_non_staff(result);
}

#[rstest]
fn staff_may_create_and_delete_organizations() {
    let staff = user("alice", true);
    assert!(ensure_can_create_organization(&staff).is_ok());
    assert!(ensure_can_delete_organization(&staff).is_ok());
    assert_forbidden(
        ensure_can_delete_organization(&user("bob", false)),
        ONLY_STAFF_DELETE_ORGANIZATION,
    );
}

#[rstest]
fn only_owner_updates_organization(org: Fixture) {
    assert!(ensure_can_update_organization(&org.standing_for(Some(&org.owner_membership))).is_ok());
    assert_forbidden(
        ensure_can_update_organization(&org.standing_for(Some(&org.admin_membership))),
        NOT_ALLOWED_UPDATE_ORGANIZATION,
    );
}

#[rstest]
fn adding_members_requires_membership_then_admin(org: Fixture) {
    assert_forbidden(
        ensure_can_add_member(&org.standing_for(None)),
        NOT_PART_OF_ORGANIZATION,
    );
    assert_forbidden(
        ensure_can_add_member(&org.standing_for(Some(&org.member_membership))),
        NOT_ALLOWED_CREATE_ORGANIZATION_USER,
    );
    assert!(ensure_can_add_member(&org.standing_for(Some(&org.admin_membership))).is_ok());
}

#[rstest]
fn owner_cannot_revoke_own_admin(org: Fixture) {
    let standing = org.standing_for(Some(&org.owner_membership));
    let result = ensure_can_update_member(
        &org.owner_membership.user_id,
        &standing,
        &org.owner_membership,
        false,
    );
    assert_forbidden(result, OWNER_MUST_BE_ADMIN);
}

#[rstest]
fn admin_cannot_demote_owner(org: Fixture) {
    let standing = org.standing_for(Some(&org.admin_membership));
    let result = ensure_can_update_member(
        &org.admin_membership.user_id,
        &standing,
        &org.owner_membership,
        false,
    );
    assert_forbidden(result, OWNER_MUST_BE_ADMIN);
}

#[rstest]
fn admin_may_promote_members(org: Fixture) {
    let standing = org.standing_for(Some(&org.admin_membership));
    let result = ensure_can_update_member(
        &org.admin_membership.user_id,
        &standing,
        &org.member_membership,
        true,
    );
    assert!(result.is_ok());
}

#[rstest]
fn plain_members_cannot_update_memberships(org: Fixture) {
    let standing = org.standing_for(Some(&org.member_membership));
    let result = ensure_can_update_member(
        &org.member_membership.user_id,
        &standing,
        &org.admin_membership,
        true,
    );
    assert_forbidden(result, NOT_ALLOWED_UPDATE_ORGANIZATION_USER);
}

#[rstest]
fn members_may_leave_but_not_remove_others(org: Fixture) {
    let standing = org.standing_for(Some(&org.member_membership));
    let caller = org.member_membership.user_id;
    assert!(ensure_can_remove_member(&caller, &standing, &org.member_membership).is_ok());
    assert_forbidden(
        ensure_can_remove_member(&caller, &standing, &org.admin_membership),
        NOT_ALLOWED_DELETE_ORGANIZATION_USER,
    );
}

#[rstest]
fn owner_membership_cannot_be_removed(org: Fixture) {
    let standing = org.standing_for(Some(&org.admin_membership));
    assert_forbidden(
        ensure_can_remove_member(&org.admin_membership.user_id, &standing, &org.owner_membership),
        OWNER_CANNOT_LEAVE,
    );
}

#[rstest]
fn team_creation_messages_distinguish_outsiders(org: Fixture) {
    assert_forbidden(
        ensure_can_create_team(&org.standing_for(None)),
        NOT_A_PART_OF_ORGANIZATION,
    );
    assert_forbidden(
        ensure_can_create_team(&org.standing_for(Some(&org.member_membership))),
        NOT_ALLOWED_CREATE_TEAM,
    );
    assert!(ensure_can_create_team(&org.standing_for(Some(&org.owner_membership))).is_ok());
}

#[rstest]
fn team_updates_and_deletes_need_owner_or_admin(org: Fixture) {
    let member = org.standing_for(Some(&org.member_membership));
    assert_forbidden(ensure_can_update_team(&member), NOT_ALLOWED_UPDATE_TEAM);
    assert_forbidden(ensure_can_delete_team(&member), NOT_ALLOWED_DELETE_TEAM);
    let admin = org.standing_for(Some(&org.admin_membership));
    assert!(ensure_can_update_team(&admin).is_ok());
    assert!(ensure_can_delete_team(&admin).is_ok());
}

#[rstest]
fn members_may_leave_teams(org: Fixture) {
    let member = org.standing_for(Some(&org.member_membership));
    assert!(ensure_can_manage_team_member(&member, true).is_ok());
    assert_forbidden(
        ensure_can_manage_team_member(&member, false),
        NOT_ALLOWED_MANAGE_TEAM_MEMBERS,
    );
}
