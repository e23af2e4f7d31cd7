//! Account and public profile endpoints.
//!
//! ```text
//! GET   /api/v1/users
//! POST  /api/v1/users {"username":"dora","email":"dora@example.com","password":"secret"}
//! PATCH /api/v2/users/{id} {"bio":"Explorer","mobile":null}
//! GET   /api/v1/profiles/{username}
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, get, patch, post, put, web};
use chrono::NaiveDate;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::{
    EmailAddress, Gender, NewUser, PhoneNumber, Profile, ProfileChanges, Salutation, UserId,
    UserValidationError, Username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::representations::{ProfileBody, render_user, render_users};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, ItemPath, nullable, parse_body, parse_path_id, required,
};
use crate::inbound::http::version::ApiVersion;

/// Writable account fields. `is_staff`, `is_active` and `date_joined` are
/// read-only. Nullable fields accept `null` to clear them.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UserRequest {
    #[serde(default)]
    #[schema(example = "dora")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, example = "dora@example.com")]
    pub email: Option<Option<String>>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub avatar: Option<Option<String>>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, example = "mrs")]
    pub salutation: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, example = "female")]
    pub gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, example = "0712345678")]
    pub phone_home: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub phone_work: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub mobile: Option<Option<String>>,
    /// Only read on create; accounts without one cannot log in.
    #[serde(default)]
    #[schema(write_only)]
    pub password: Option<String>,
}

/// Blank strings count as "no value" for optional attributes.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

fn parse_nullable<T>(
    value: Option<Option<String>>,
    parse: impl FnOnce(String) -> Result<T, UserValidationError>,
) -> Result<Option<Option<T>>, UserValidationError> {
    value
        .map(|inner| present(inner).map(parse).transpose())
        .transpose()
}

fn phone(
    field: &'static str,
    value: Option<Option<String>>,
) -> Result<Option<Option<PhoneNumber>>, UserValidationError> {
    parse_nullable(value, |raw| PhoneNumber::parse(field, raw))
}

fn choice<T: FromStr<Err = UserValidationError>>(
    value: Option<Option<String>>,
) -> Result<Option<Option<T>>, UserValidationError> {
    parse_nullable(value, |raw| raw.parse())
}

impl UserRequest {
    /// Validate every supplied attribute into a profile change set.
    fn into_changes(self) -> Result<(ProfileChanges, Option<String>), UserValidationError> {
        let changes = ProfileChanges {
            username: self.username.map(Username::new).transpose()?,
            email: parse_nullable(self.email, EmailAddress::new)?,
            first_name: self.first_name,
            last_name: self.last_name,
            name: self.name,
            avatar: self.avatar.map(present),
            bio: self.bio,
            salutation: choice::<Salutation>(self.salutation)?,
            gender: choice::<Gender>(self.gender)?,
            date_of_birth: self.date_of_birth,
            phone_home: phone("phone_home", self.phone_home)?,
            phone_work: phone("phone_work", self.phone_work)?,
            mobile: phone("mobile", self.mobile)?,
        };
        Ok((changes, self.password))
    }
}

fn profile_from(changes: ProfileChanges) -> Profile {
    Profile {
        email: changes.email.flatten(),
        first_name: changes.first_name.unwrap_or_default(),
        last_name: changes.last_name.unwrap_or_default(),
        name: changes.name.unwrap_or_default(),
        avatar: changes.avatar.flatten(),
        bio: changes.bio.unwrap_or_default(),
        salutation: changes.salutation.flatten(),
        gender: changes.gender.flatten(),
        date_of_birth: changes.date_of_birth.flatten(),
        phone_home: changes.phone_home.flatten(),
        phone_work: changes.phone_work.flatten(),
        mobile: changes.mobile.flatten(),
    }
}

/// The caller's own account as a one-element list.
#[utoipa::path(
    get,
    path = "/api/{version}/users",
    params(("version" = String, Path, description = "API version: v1 or v2")),
    responses(
        (status = 200, description = "The caller (v2 adds address_nested)", body = [crate::inbound::http::representations::UserV2]),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let users = state.users.list(&caller);
    let body = render_users(&state.directory, version, users).await?;
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/api/{version}/users/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "The caller's account", body = crate::inbound::http::representations::UserV2),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let id: UserId = parse_path_id(&path.id)?;
    let user = state.users.retrieve(&caller, &id)?;
    let body = render_user(&state.directory, version, user).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/{version}/users",
    params(("version" = String, Path, description = "API version: v1 or v2")),
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = crate::inbound::http::representations::UserV2),
        (status = 400, description = "Invalid request or username taken", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let request: UserRequest = parse_body(&body)?;
    let (mut changes, password) = request.into_changes()?;
    let username = required(changes.username.take(), FieldName::new("username"))?;
    let new_user = NewUser {
        username,
        profile: profile_from(changes),
        password: present(password).map(Zeroizing::new),
    };
    let user = state.users.create(&caller, new_user).await?;
    let body = render_user(&state.directory, version, user).await?;
    Ok(HttpResponse::Created().json(body))
}

async fn update(
    version: ApiVersion,
    state: &HttpState,
    session: &SessionContext,
    raw_id: &str,
    body: &web::Bytes,
    partial: bool,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(session).await?;
    let id: UserId = parse_path_id(raw_id)?;
    let request: UserRequest = parse_body(body)?;
    let (changes, _password) = request.into_changes()?;
    if !partial {
        required(changes.username.as_ref(), FieldName::new("username"))?;
    }
    let user = state.users.update(&caller, &id, changes).await?;
    let body = render_user(&state.directory, version, user).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Replace the caller's profile; `username` is required.
#[utoipa::path(
    put,
    path = "/api/{version}/users/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "User id")
    ),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated", body = crate::inbound::http::representations::UserV2),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "replaceUser"
)]
#[put("/users/{id}")]
pub async fn replace_user(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    update(version, &state, &session, &path.id, &body, false).await
}

#[utoipa::path(
    patch,
    path = "/api/{version}/users/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "User id")
    ),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated", body = crate::inbound::http::representations::UserV2),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}")]
pub async fn update_user(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    update(version, &state, &session, &path.id, &body, true).await
}

#[derive(Debug, Deserialize)]
pub struct ProfilePath {
    pub username: String,
}

/// Public profiles, newest joined first. Both versions share one shape.
#[utoipa::path(
    get,
    path = "/api/{version}/profiles",
    params(("version" = String, Path, description = "API version: v1 or v2")),
    responses(
        (status = 200, description = "Profiles", body = [ProfileBody]),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "listProfiles"
)]
#[get("/profiles")]
pub async fn list_profiles(
    _version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    state.caller(&session).await?;
    let users = state.users.profiles().await?;
    let body: Vec<ProfileBody> = users.iter().map(ProfileBody::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/api/{version}/profiles/{username}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "Profile", body = ProfileBody),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "getProfile"
)]
#[get("/profiles/{username}")]
pub async fn get_profile(
    _version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ProfilePath>,
) -> ApiResult<HttpResponse> {
    state.caller(&session).await?;
    let user = state.users.profile(&path.username).await?;
    Ok(HttpResponse::Ok().json(ProfileBody::from(&user)))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
