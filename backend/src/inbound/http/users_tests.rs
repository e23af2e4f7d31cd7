//! Tests for the account and profile endpoints.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::{Address, AddressFields};
use crate::inbound::http::test_utils::{TestContext, login};

#[rstest]
#[case("v1", false)]
#[case("v2", true)]
#[actix_web::test]
async fn listing_users_returns_only_the_caller(#[case] version: &str, #[case] nested: bool) {
    let ctx = TestContext::new();
    let dora = ctx.seed_user("dora", false, Some("secret")).await;
    ctx.seed_user("eve", false, None).await;
    let address = Address::new(
        dora.id,
        AddressFields {
            address1: "1 High Street".to_owned(),
            city: "London".to_owned(),
            ..AddressFields::default()
        },
    );
    ctx.repositories.addresses.create(&address).await.expect("seed address");
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "dora", "secret").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/{version}/users"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    let users = body.as_array().expect("array");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "dora");
    assert_eq!(users[0].get("address_nested").is_some(), nested);
    if nested {
        assert_eq!(users[0]["address_nested"][0]["city"], "London");
        assert_eq!(users[0]["address_nested"][0]["user_nested"]["username"], "dora");
    }
}

#[actix_web::test]
async fn other_accounts_are_not_found() {
    let ctx = TestContext::new();
    ctx.seed_user("dora", false, Some("secret")).await;
    let eve = ctx.seed_user("eve", false, None).await;
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "dora", "secret").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}", eve.id))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn created_users_can_log_in() {
    let ctx = TestContext::new();
    ctx.seed_user("dora", false, Some("secret")).await;
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "dora", "secret").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/users")
            .cookie(cookie)
            .set_json(json!({
                "username": "frank",
                "email": "frank@example.com",
                "salutation": "mr",
                "mobile": "0712345678",
                "password": "hunter2",
                "is_staff": true,
            }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["username"], "frank");
    assert_eq!(body["salutation"], "mr");
    assert!(body.get("password").is_none());
    let stored = ctx
        .repositories
        .users
        .find_by_username("frank")
        .await
        .expect("lookup")
        .expect("frank stored");
    assert!(!stored.is_staff);

    login(&app, "frank", "hunter2").await;
}

#[rstest]
#[case(json!({"email": "frank@example.com"}), "username: This field is required.")]
#[case(json!({"username": "dora"}), "A user with that username already exists.")]
#[case(json!({"username": "frank", "gender": "unknown"}), "\"unknown\" is not a valid choice for gender")]
#[case(json!({"username": "frank", "mobile": "12"}), "mobile must be a valid phone number")]
#[actix_web::test]
async fn invalid_registrations_are_rejected(#[case] payload: Value, #[case] message: &str) {
    let ctx = TestContext::new();
    ctx.seed_user("dora", false, Some("secret")).await;
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "dora", "secret").await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/users")
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
async fn patch_clears_nullable_fields_and_put_needs_a_username() {
    let ctx = TestContext::new();
    let dora = ctx
        .seed_user_with_email("dora", Some("dora@example.com"), false, Some("secret"))
        .await;
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "dora", "secret").await;
    let uri = format!("/api/v1/users/{}", dora.id);

    let patched = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&uri)
            .cookie(cookie.clone())
            .set_json(json!({"email": null, "bio": "Explorer"}))
            .to_request(),
    )
    .await;
    assert_eq!(patched.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(patched).await;
    assert_eq!(body["email"], Value::Null);
    assert_eq!(body["bio"], "Explorer");
    assert_eq!(body["first_name"], "dora");

    let replaced = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&uri)
            .cookie(cookie)
            .set_json(json!({"bio": "Explorer"}))
            .to_request(),
    )
    .await;
    assert_eq!(replaced.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn profiles_are_public_to_signed_in_users() {
    let ctx = TestContext::new();
    ctx.seed_user_with_email("dora", Some("dora@example.com"), false, Some("secret"))
        .await;
    ctx.seed_user("eve", false, None).await;
    let app = actix_test::init_service(ctx.app()).await;
    let cookie = login(&app, "dora", "secret").await;

    let listed = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v2/profiles")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(listed.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(listed).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let found = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/profiles/dora")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(found.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(found).await;
    assert_eq!(body["username"], "dora");
    assert!(body.get("email").is_none());

    let missing = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/profiles/nobody")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
