//! Organization endpoints.
//!
//! ```text
//! GET    /api/v1/organizations
//! POST   /api/v1/organizations {"name":"Test Organization"}
//! GET    /api/v2/organizations/{id}
//! PUT    /api/v1/organizations/{id} {"name":"Renamed","is_active":true}
//! PATCH  /api/v1/organizations/{id} {"is_active":false}
//! DELETE /api/v1/organizations/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::Deserialize;

use crate::domain::{OrganizationChanges, OrganizationDraft, OrganizationId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::representations::{render_organization, render_organizations};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, ItemPath, parse_body, parse_path_id, required,
};
use crate::inbound::http::version::ApiVersion;

/// Writable organization fields. `slug`, `created` and `modified` are
/// read-only and ignored when sent.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct OrganizationRequest {
    #[serde(default)]
    #[schema(example = "Test Organization")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Organizations the caller belongs to, newest first.
#[utoipa::path(
    get,
    path = "/api/{version}/organizations",
    params(("version" = String, Path, description = "API version: v1 or v2")),
    responses(
        (status = 200, description = "Organizations (v2 adds users_nested)", body = [crate::inbound::http::representations::OrganizationV2]),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Unknown API version", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["organizations"],
    operation_id = "listOrganizations"
)]
#[get("/organizations")]
pub async fn list_organizations(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let organizations = state.organizations.list(&caller).await?;
    let body = render_organizations(&state.directory, version, organizations).await?;
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/api/{version}/organizations/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Organization id")
    ),
    responses(
        (status = 200, description = "Organization", body = crate::inbound::http::representations::OrganizationV2),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["organizations"],
    operation_id = "getOrganization"
)]
#[get("/organizations/{id}")]
pub async fn get_organization(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let id: OrganizationId = parse_path_id(&path.id)?;
    let organization = state.organizations.retrieve(&caller, &id).await?;
    let body = render_organization(&state.directory, version, organization).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Found an organization; staff only. The caller becomes its owner.
#[utoipa::path(
    post,
    path = "/api/{version}/organizations",
    params(("version" = String, Path, description = "API version: v1 or v2")),
    request_body = OrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = crate::inbound::http::representations::OrganizationV2),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 403, description = "Caller is not staff", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["organizations"],
    operation_id = "createOrganization"
)]
#[post("/organizations")]
pub async fn create_organization(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let request: OrganizationRequest = parse_body(&body)?;
    let draft = OrganizationDraft {
        name: required(request.name, FieldName::new("name"))?,
        is_active: request.is_active.unwrap_or(true),
    };
    let organization = state.organizations.create(&caller, draft).await?;
    let body = render_organization(&state.directory, version, organization).await?;
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
    let id: OrganizationId = parse_path_id(raw_id)?;
    let request: OrganizationRequest = parse_body(body)?;
    let name = if partial {
        request.name
    } else {
        Some(required(request.name, FieldName::new("name"))?)
    };
    let changes = OrganizationChanges {
        name,
        is_active: request.is_active,
    };
    let organization = state.organizations.update(&caller, &id, changes).await?;
    let body = render_organization(&state.directory, version, organization).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Replace the writable fields; owner only.
#[utoipa::path(
    put,
    path = "/api/{version}/organizations/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Organization id")
    ),
    request_body = OrganizationRequest,
    responses(
        (status = 200, description = "Organization updated", body = crate::inbound::http::representations::OrganizationV2),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 403, description = "Caller is not the owner", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["organizations"],
    operation_id = "replaceOrganization"
)]
#[put("/organizations/{id}")]
pub async fn replace_organization(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    update(version, &state, &session, &path.id, &body, false).await
}

/// Change some writable fields; owner only.
#[utoipa::path(
    patch,
    path = "/api/{version}/organizations/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Organization id")
    ),
    request_body = OrganizationRequest,
    responses(
        (status = 200, description = "Organization updated", body = crate::inbound::http::representations::OrganizationV2),
        (status = 403, description = "Caller is not the owner", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["organizations"],
    operation_id = "updateOrganization"
)]
#[patch("/organizations/{id}")]
pub async fn update_organization(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    update(version, &state, &session, &path.id, &body, true).await
}

/// Delete an organization with its memberships and teams; staff only.
#[utoipa::path(
    delete,
    path = "/api/{version}/organizations/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Organization id")
    ),
    responses(
        (status = 204, description = "Organization deleted"),
        (status = 403, description = "Caller is not staff", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["organizations"],
    operation_id = "deleteOrganization"
)]
#[delete("/organizations/{id}")]
pub async fn delete_organization(
    _version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let id: OrganizationId = parse_path_id(&path.id)?;
    state.organizations.destroy(&caller, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "organizations_tests.rs"]
mod tests;
