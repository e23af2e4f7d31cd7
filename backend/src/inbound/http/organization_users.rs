//! Organization membership and owner endpoints.
//!
//! ```text
//! GET    /api/v1/organization-users?organization_id={org}
//! POST   /api/v1/organization-users {"organization":"{org}","user_email":"bob@example.com"}
//! PATCH  /api/v1/organization-users/{id} {"organization":"{org}","is_admin":true}
//! DELETE /api/v1/organization-users/{id}?organization_id={org}
//! GET    /api/v2/organization-owner?organization_id={org}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::Deserialize;

use crate::domain::{MembershipChanges, MembershipDraft, OrganizationId, OrganizationUserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::representations::{render_membership, render_memberships, render_owner};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, ItemPath, ScopeQuery, parse_body, parse_path_id, parse_reference, parse_scope,
    required,
};
use crate::inbound::http::version::ApiVersion;

/// Membership payload. `user` is read-only; `organization` only selects the
/// scope on updates.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct OrganizationUserRequest {
    #[serde(default)]
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub organization: Option<String>,
    #[serde(default)]
    #[schema(example = "bob@example.com")]
    pub user_email: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/{version}/organization-users",
    params(("version" = String, Path, description = "API version: v1 or v2"), ScopeQuery),
    responses(
        (status = 200, description = "Memberships of the organization; empty unless the caller belongs to it", body = [crate::inbound::http::representations::OrganizationUserV2]),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["organization-users"],
    operation_id = "listOrganizationUsers"
)]
#[get("/organization-users")]
pub async fn list_organization_users(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ScopeQuery>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let scope: Option<OrganizationId> = parse_scope(query.organization_id.as_deref());
    let memberships = state.memberships.list(&caller, scope.as_ref()).await?;
    let body = render_memberships(&state.directory, version, memberships).await?;
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/api/{version}/organization-users/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Organization user id"),
        ScopeQuery
    ),
    responses(
        (status = 200, description = "Membership", body = crate::inbound::http::representations::OrganizationUserV2),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["organization-users"],
    operation_id = "getOrganizationUser"
)]
#[get("/organization-users/{id}")]
pub async fn get_organization_user(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    query: web::Query<ScopeQuery>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let id: OrganizationUserId = parse_path_id(&path.id)?;
    let scope: Option<OrganizationId> = parse_scope(query.organization_id.as_deref());
    let membership = state
        .memberships
        .retrieve(&caller, scope.as_ref(), &id)
        .await?;
    let body = render_membership(&state.directory, version, membership).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Add a user by email, inviting them when they have no account yet.
#[utoipa::path(
    post,
    path = "/api/{version}/organization-users",
    params(("version" = String, Path, description = "API version: v1 or v2")),
    request_body = OrganizationUserRequest,
    responses(
        (status = 201, description = "Membership created", body = crate::inbound::http::representations::OrganizationUserV2),
        (status = 400, description = "Invalid request, ambiguous email or existing member", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 403, description = "Caller is not an admin of the organization", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["organization-users"],
    operation_id = "createOrganizationUser"
)]
#[post("/organization-users")]
pub async fn create_organization_user(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let request: OrganizationUserRequest = parse_body(&body)?;
    let field = FieldName::new("organization");
    let organization = parse_reference(&required(request.organization, field)?, field)?;
    let draft = MembershipDraft {
        organization,
        user_email: request.user_email,
        is_admin: request.is_admin.unwrap_or(false),
    };
    let membership = state.memberships.create(&caller, draft).await?;
    let body = render_membership(&state.directory, version, membership).await?;
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
    let id: OrganizationUserId = parse_path_id(raw_id)?;
    let request: OrganizationUserRequest = parse_body(body)?;
    let organization = if partial {
        request.organization
    } else {
        Some(required(request.organization, FieldName::new("organization"))?)
    };
    let changes = MembershipChanges {
        organization: parse_scope(organization.as_deref()),
        is_admin: request.is_admin,
    };
    let membership = state.memberships.update(&caller, &id, changes).await?;
    let body = render_membership(&state.directory, version, membership).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Replace a membership's admin flag; admins only.
#[utoipa::path(
    put,
    path = "/api/{version}/organization-users/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Organization user id")
    ),
    request_body = OrganizationUserRequest,
    responses(
        (status = 200, description = "Membership updated", body = crate::inbound::http::representations::OrganizationUserV2),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 403, description = "Caller may not change this membership", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["organization-users"],
    operation_id = "replaceOrganizationUser"
)]
#[put("/organization-users/{id}")]
pub async fn replace_organization_user(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    update(version, &state, &session, &path.id, &body, false).await
}

/// Change a membership's admin flag; admins only.
#[utoipa::path(
    patch,
    path = "/api/{version}/organization-users/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Organization user id")
    ),
    request_body = OrganizationUserRequest,
    responses(
        (status = 200, description = "Membership updated", body = crate::inbound::http::representations::OrganizationUserV2),
        (status = 403, description = "Caller may not change this membership", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["organization-users"],
    operation_id = "updateOrganizationUser"
)]
#[patch("/organization-users/{id}")]
pub async fn update_organization_user(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    update(version, &state, &session, &path.id, &body, true).await
}

/// Remove a membership. Members may leave; admins and the owner may remove
/// others; the owner membership stays.
#[utoipa::path(
    delete,
    path = "/api/{version}/organization-users/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Organization user id"),
        ScopeQuery
    ),
    responses(
        (status = 204, description = "Membership deleted"),
        (status = 403, description = "Caller may not remove this membership", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["organization-users"],
    operation_id = "deleteOrganizationUser"
)]
#[delete("/organization-users/{id}")]
pub async fn delete_organization_user(
    _version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    query: web::Query<ScopeQuery>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let id: OrganizationUserId = parse_path_id(&path.id)?;
    let scope: Option<OrganizationId> = parse_scope(query.organization_id.as_deref());
    state.memberships.destroy(&caller, scope.as_ref(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Owner record of an organization the caller belongs to.
#[utoipa::path(
    get,
    path = "/api/{version}/organization-owner",
    params(("version" = String, Path, description = "API version: v1 or v2"), ScopeQuery),
    responses(
        (status = 200, description = "Owner record", body = crate::inbound::http::representations::OwnerV2),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["organization-users"],
    operation_id = "getOrganizationOwner"
)]
#[get("/organization-owner")]
pub async fn get_organization_owner(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ScopeQuery>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let scope: Option<OrganizationId> = parse_scope(query.organization_id.as_deref());
    let owner = state.memberships.owner(&caller, scope.as_ref()).await?;
    let body = render_owner(&state.directory, version, owner).await?;
    Ok(HttpResponse::Ok().json(body))
}

#[cfg(test)]
#[path = "organization_users_tests.rs"]
mod tests;
