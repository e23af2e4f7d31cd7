//! Tests for the organization membership endpoints.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::ports::NotificationKind;
use crate::inbound::http::test_utils::{TestContext, login};

#[actix_web::test]
async fn inviting_an_unknown_email_creates_one_inactive_user() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", true, Some("secret")).await;
    let founded = ctx.seed_organization("Test Organization", &alice).await;
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "alice", "secret").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v2/organization-users")
            .cookie(cookie)
            .set_json(json!({
                "organization": founded.organization.id.to_string(),
                "user_email": "bob@example.com",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["is_admin"], json!(false));
    assert_eq!(body["organization_nested"]["slug"], "test-organization");

    let invitees = ctx
        .repositories
        .users
        .find_by_email("BOB@example.com")
        .await
        .expect("lookup");
    assert_eq!(invitees.len(), 1);
    assert!(!invitees[0].is_active);

    let sent = ctx.notifications.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, NotificationKind::Invitation);
    assert_eq!(sent[0].recipient, "bob@example.com");
}

#[actix_web::test]
async fn ambiguous_emails_are_rejected_without_side_effects() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", true, Some("secret")).await;
    let founded = ctx.seed_organization("Acme", &alice).await;
    ctx.seed_user_with_email("bob1", Some("bob@example.com"), false, None).await;
    ctx.seed_user_with_email("bob2", Some("Bob@Example.com"), false, None).await;
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "alice", "secret").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/organization-users")
            .cookie(cookie)
            .set_json(json!({
                "organization": founded.organization.id.to_string(),
                "user_email": "bob@example.com",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "This email address has been used multiple times.");
    assert!(ctx.notifications.sent().is_empty());
    let members = ctx
        .repositories
        .memberships
        .list_for_organization(&founded.organization.id)
        .await
        .expect("list");
    assert_eq!(members.len(), 1);
}

#[rstest]
#[case(json!({"organization": null}), "organization: This field is required.")]
#[case(json!({"organization": "ORG"}), "user_email has not been provided!")]
#[actix_web::test]
async fn incomplete_payloads_are_rejected(#[case] mut payload: Value, #[case] message: &str) {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", true, Some("secret")).await;
    let founded = ctx.seed_organization("Acme", &alice).await;
    if payload["organization"] == "ORG" {
        payload["organization"] = json!(founded.organization.id.to_string());
    }
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "alice", "secret").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/organization-users")
            .cookie(cookie)
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], message);
}

#[actix_web::test]
async fn plain_members_cannot_invite_and_nothing_is_created() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", true, None).await;
    let carol = ctx.seed_user("carol", false, Some("secret")).await;
    let founded = ctx.seed_organization("Acme", &alice).await;
    ctx.seed_membership(&founded, &carol, false).await;
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "carol", "secret").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/organization-users")
            .cookie(cookie)
            .set_json(json!({
                "organization": founded.organization.id.to_string(),
                "user_email": "new@example.com",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body["message"],
        "User is not allowed to create an organization user in this organization!"
    );
    let lookup = ctx
        .repositories
        .users
        .find_by_email("new@example.com")
        .await
        .expect("lookup");
    assert!(lookup.is_empty());
}

#[actix_web::test]
async fn owner_cannot_revoke_their_own_admin_rights() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", true, Some("secret")).await;
    let founded = ctx.seed_organization("Acme", &alice).await;
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "alice", "secret").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/organization-users/{}", founded.membership.id))
            .cookie(cookie)
            .set_json(json!({
                "organization": founded.organization.id.to_string(),
                "is_admin": false,
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "Organization owner must be an administrator!");
}

#[actix_web::test]
async fn updates_never_move_memberships() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", true, Some("secret")).await;
    let bob = ctx.seed_user("bob", false, None).await;
    let founded = ctx.seed_organization("Acme", &alice).await;
    let membership = ctx.seed_membership(&founded, &bob, false).await;
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "alice", "secret").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/organization-users/{}", membership.id))
            .cookie(cookie)
            .set_json(json!({
                "organization": founded.organization.id.to_string(),
                "user": alice.id.to_string(),
                "is_admin": true,
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["is_admin"], json!(true));
    assert_eq!(body["user"], json!(bob.id.to_string()));
    assert_eq!(body["organization"], json!(founded.organization.id.to_string()));
}

#[rstest]
#[case(None)]
#[case(Some("garbage"))]
#[actix_web::test]
async fn listing_without_a_usable_scope_is_empty(#[case] organization_id: Option<&str>) {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", true, Some("secret")).await;
    ctx.seed_organization("Acme", &alice).await;
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "alice", "secret").await;
    let uri = match organization_id {
        Some(raw) => format!("/api/v1/organization-users?organization_id={raw}"),
        None => "/api/v1/organization-users".to_owned(),
    };

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri(&uri).cookie(cookie).to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn members_may_leave_but_the_owner_may_not() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", true, Some("secret")).await;
    let carol = ctx.seed_user("carol", false, Some("secret")).await;
    let founded = ctx.seed_organization("Acme", &alice).await;
    let membership = ctx.seed_membership(&founded, &carol, false).await;
    let org = founded.organization.id;
    let app = actix_test::init_service(ctx.app()).await;

    let alice_cookie = login(&app, "alice", "secret").await;
    let owner_leaves = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!(
                "/api/v1/organization-users/{}?organization_id={org}",
                founded.membership.id
            ))
            .cookie(alice_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(owner_leaves.status(), StatusCode::FORBIDDEN);

    let carol_cookie = login(&app, "carol", "secret").await;
    let carol_leaves = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!(
                "/api/v1/organization-users/{}?organization_id={org}",
                membership.id
            ))
            .cookie(carol_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(carol_leaves.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn owner_record_is_hidden_from_outsiders() {
    let ctx = TestContext::new();
    let alice = ctx.seed_user("alice", true, None).await;
    ctx.seed_user("mallory", false, Some("secret")).await;
    let founded = ctx.seed_organization("Acme", &alice).await;
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "mallory", "secret").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!(
                "/api/v2/organization-owner?organization_id={}",
                founded.organization.id
            ))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
