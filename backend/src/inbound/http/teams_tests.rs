//! Tests for the team and team roster endpoints.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::{Team, TeamMember};
use crate::inbound::http::test_utils::{TestContext, login};

#[rstest]
#[case(true, StatusCode::CREATED, None)]
#[case(false, StatusCode::FORBIDDEN, Some("User is not allowed to create a team for this organization!"))]
#[actix_web::test]
async fn only_admins_create_teams(
    #[case] is_admin: bool,
    #[case] expected: StatusCode,
    #[case] message: Option<&str>,
) {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", true, None).await;
    let dave = ctx.seed_user("dave", false, Some("secret")).await;
    let founded = ctx.seed_organization("Acme", &alice).await;
    ctx.seed_membership(&founded, &dave, is_admin).await;
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "dave", "secret").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v2/teams")
            .cookie(cookie)
            .set_json(json!({
                "organization": founded.organization.id.to_string(),
                "name": "Platform",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), expected);
    let body: Value = actix_test::read_body_json(response).await;
    match message {
        Some(message) => assert_eq!(body["message"], message),
        None => {
            assert_eq!(body["name"], "Platform");
            assert_eq!(body["organization_nested"]["slug"], "acme");
        }
    }
}

#[actix_web::test]
async fn outsiders_are_told_they_are_not_part_of_the_organization() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", true, None).await;
    ctx.seed_user("mallory", false, Some("secret")).await;
    let founded = ctx.seed_organization("Acme", &alice).await;
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "mallory", "secret").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/teams")
            .cookie(cookie)
            .set_json(json!({
                "organization": founded.organization.id.to_string(),
                "name": "Platform",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "User is not a part of the organization specified!");
}

#[actix_web::test]
async fn team_updates_keep_the_organization() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", true, Some("secret")).await;
    let founded = ctx.seed_organization("Acme", &alice).await;
    let other = ctx.seed_organization("Other", &alice).await;
    let team = Team::new(founded.organization.id, "Platform".to_owned());
    ctx.repositories.teams.create(&team).await.expect("seed team");
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "alice", "secret").await;
    let uri = format!("/api/v1/teams/{}", team.id);

    let moved = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&uri)
            .cookie(cookie.clone())
            .set_json(json!({
                "organization": other.organization.id.to_string(),
                "name": "Core",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(moved.status(), StatusCode::NOT_FOUND);

    let renamed = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&uri)
            .cookie(cookie)
            .set_json(json!({
                "organization": founded.organization.id.to_string(),
                "name": "Core",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(renamed.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(renamed).await;
    assert_eq!(body["name"], "Core");
    assert_eq!(body["organization"], json!(founded.organization.id.to_string()));
}

#[actix_web::test]
async fn plain_members_cannot_delete_teams() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", true, None).await;
    let carol = ctx.seed_user("carol", false, Some("secret")).await;
    let founded = ctx.seed_organization("Acme", &alice).await;
    ctx.seed_membership(&founded, &carol, false).await;
    let team = Team::new(founded.organization.id, "Platform".to_owned());
    ctx.repositories.teams.create(&team).await.expect("seed team");
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "carol", "secret").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!(
                "/api/v1/teams/{}?organization_id={}",
                team.id, founded.organization.id
            ))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "User is not allowed to delete this team!");
}

#[actix_web::test]
async fn rosters_reject_duplicates_and_foreign_members() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", true, Some("secret")).await;
    let bob = ctx.seed_user("bob", false, None).await;
    let founded = ctx.seed_organization("Acme", &alice).await;
    let other = ctx.seed_organization("Other", &alice).await;
    let bob_membership = ctx.seed_membership(&founded, &bob, false).await;
    let team = Team::new(founded.organization.id, "Platform".to_owned());
    ctx.repositories.teams.create(&team).await.expect("seed team");
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "alice", "secret").await;

    let add = |organization_user: String| {
        actix_test::TestRequest::post()
            .uri("/api/v1/team-members")
            .cookie(cookie.clone())
            .set_json(json!({
                "team": team.id.to_string(),
                "organization_user": organization_user,
            }))
            .to_request()
    };

    let first = actix_test::call_service(&app, add(bob_membership.id.to_string())).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let duplicate = actix_test::call_service(&app, add(bob_membership.id.to_string())).await;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
    let foreign = actix_test::call_service(&app, add(other.membership.id.to_string())).await;
    assert_eq!(foreign.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn team_members_list_nested_for_v2_and_may_leave() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", true, None).await;
    let carol = ctx.seed_user("carol", false, Some("secret")).await;
    let founded = ctx.seed_organization("Acme", &alice).await;
    let carol_membership = ctx.seed_membership(&founded, &carol, false).await;
    let team = Team::new(founded.organization.id, "Platform".to_owned());
    ctx.repositories.teams.create(&team).await.expect("seed team");
    let member = TeamMember::new(team.id, carol_membership.id, false);
    ctx.repositories.teams.add_member(&member).await.expect("seed member");
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "carol", "secret").await;
    let org = founded.organization.id;

    let listed = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v2/team-members?organization_id={org}&team_id={}", team.id))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(listed.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(listed).await;
    assert_eq!(body[0]["team_nested"]["name"], "Platform");
    assert_eq!(body[0]["organization_user_nested"]["user_nested"]["username"], "carol");

    let promoted = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/team-members/{}", member.id))
            .cookie(cookie.clone())
            .set_json(json!({"organization": org.to_string(), "is_admin": true}))
            .to_request(),
    )
    .await;
    assert_eq!(promoted.status(), StatusCode::FORBIDDEN);

    let left = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/team-members/{}?organization_id={org}", member.id))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(left.status(), StatusCode::NO_CONTENT);
}
