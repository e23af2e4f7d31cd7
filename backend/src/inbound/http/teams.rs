//! Team and team roster endpoints.
//!
//! ```text
//! GET    /api/v1/teams?organization_id={org}
//! POST   /api/v1/teams {"organization":"{org}","name":"Platform"}
//! PATCH  /api/v1/teams/{id} {"organization":"{org}","name":"Core"}
//! DELETE /api/v1/teams/{id}?organization_id={org}
//! GET    /api/v2/team-members?organization_id={org}&team_id={team}
//! POST   /api/v1/team-members {"team":"{team}","organization_user":"{member}"}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::Deserialize;

use crate::domain::{
    OrganizationId, TeamChanges, TeamDraft, TeamId, TeamMemberChanges, TeamMemberDraft,
    TeamMemberId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::representations::{
    render_team, render_team_member, render_team_members, render_teams,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, ItemPath, ScopeQuery, parse_body, parse_path_id, parse_reference, parse_scope,
    required,
};
use crate::inbound::http::version::ApiVersion;

/// Team payload. On updates `organization` selects the scope and never
/// moves the team.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct TeamRequest {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    #[schema(example = "Platform")]
    pub name: Option<String>,
}

/// Team membership payload. `team` and `organization_user` are fixed once
/// created; `organization` selects the scope on updates.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct TeamMemberRequest {
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub organization_user: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/{version}/teams",
    params(("version" = String, Path, description = "API version: v1 or v2"), ScopeQuery),
    responses(
        (status = 200, description = "Teams of the organization; empty unless the caller belongs to it", body = [crate::inbound::http::representations::TeamV2]),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "listTeams"
)]
#[get("/teams")]
pub async fn list_teams(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ScopeQuery>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let scope: Option<OrganizationId> = parse_scope(query.organization_id.as_deref());
    let teams = state.teams.list(&caller, scope.as_ref()).await?;
    let body = render_teams(&state.directory, version, teams).await?;
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/api/{version}/teams/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Team id"),
        ScopeQuery
    ),
    responses(
        (status = 200, description = "Team", body = crate::inbound::http::representations::TeamV2),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "getTeam"
)]
#[get("/teams/{id}")]
pub async fn get_team(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    query: web::Query<ScopeQuery>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let id: TeamId = parse_path_id(&path.id)?;
    let scope: Option<OrganizationId> = parse_scope(query.organization_id.as_deref());
    let team = state.teams.retrieve(&caller, scope.as_ref(), &id).await?;
    let body = render_team(&state.directory, version, team).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Create a team; owner or admin of the organization only.
#[utoipa::path(
    post,
    path = "/api/{version}/teams",
    params(("version" = String, Path, description = "API version: v1 or v2")),
    request_body = TeamRequest,
    responses(
        (status = 201, description = "Team created", body = crate::inbound::http::representations::TeamV2),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 403, description = "Caller may not create teams here", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "createTeam"
)]
#[post("/teams")]
pub async fn create_team(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let request: TeamRequest = parse_body(&body)?;
    let field = FieldName::new("organization");
    let draft = TeamDraft {
        organization: parse_reference(&required(request.organization, field)?, field)?,
        name: required(request.name, FieldName::new("name"))?,
    };
    let team = state.teams.create(&caller, draft).await?;
    let body = render_team(&state.directory, version, team).await?;
    Ok(HttpResponse::Created().json(body))
}

async fn update_team(
    version: ApiVersion,
    state: &HttpState,
    session: &SessionContext,
    raw_id: &str,
    body: &web::Bytes,
    partial: bool,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(session).await?;
    let id: TeamId = parse_path_id(raw_id)?;
    let request: TeamRequest = parse_body(body)?;
    let (organization, name) = if partial {
        (request.organization, request.name)
    } else {
        (
            Some(required(request.organization, FieldName::new("organization"))?),
            Some(required(request.name, FieldName::new("name"))?),
        )
    };
    let changes = TeamChanges {
        organization: parse_scope(organization.as_deref()),
        name,
    };
    let team = state.teams.update(&caller, &id, changes).await?;
    let body = render_team(&state.directory, version, team).await?;
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    put,
    path = "/api/{version}/teams/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Team id")
    ),
    request_body = TeamRequest,
    responses(
        (status = 200, description = "Team updated", body = crate::inbound::http::representations::TeamV2),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 403, description = "Caller may not update this team", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "replaceTeam"
)]
#[put("/teams/{id}")]
pub async fn replace_team(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    update_team(version, &state, &session, &path.id, &body, false).await
}

#[utoipa::path(
    patch,
    path = "/api/{version}/teams/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Team id")
    ),
    request_body = TeamRequest,
    responses(
        (status = 200, description = "Team updated", body = crate::inbound::http::representations::TeamV2),
        (status = 403, description = "Caller may not update this team", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "updateTeam"
)]
#[patch("/teams/{id}")]
pub async fn patch_team(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    update_team(version, &state, &session, &path.id, &body, true).await
}

#[utoipa::path(
    delete,
    path = "/api/{version}/teams/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Team id"),
        ScopeQuery
    ),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 403, description = "Caller may not delete this team", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "deleteTeam"
)]
#[delete("/teams/{id}")]
pub async fn delete_team(
    _version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    query: web::Query<ScopeQuery>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let id: TeamId = parse_path_id(&path.id)?;
    let scope: Option<OrganizationId> = parse_scope(query.organization_id.as_deref());
    state.teams.destroy(&caller, scope.as_ref(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/{version}/team-members",
    params(("version" = String, Path, description = "API version: v1 or v2"), ScopeQuery),
    responses(
        (status = 200, description = "Team memberships; empty unless the caller belongs to the organization", body = [crate::inbound::http::representations::TeamMemberV2]),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "listTeamMembers"
)]
#[get("/team-members")]
pub async fn list_team_members(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ScopeQuery>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let scope: Option<OrganizationId> = parse_scope(query.organization_id.as_deref());
    let team: Option<TeamId> = parse_scope(query.team_id.as_deref());
    let members = state
        .teams
        .list_members(&caller, scope.as_ref(), team.as_ref())
        .await?;
    let body = render_team_members(&state.directory, version, members).await?;
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/api/{version}/team-members/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Team member id"),
        ScopeQuery
    ),
    responses(
        (status = 200, description = "Team membership", body = crate::inbound::http::representations::TeamMemberV2),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "getTeamMember"
)]
#[get("/team-members/{id}")]
pub async fn get_team_member(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    query: web::Query<ScopeQuery>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let id: TeamMemberId = parse_path_id(&path.id)?;
    let scope: Option<OrganizationId> = parse_scope(query.organization_id.as_deref());
    let member = state
        .teams
        .retrieve_member(&caller, scope.as_ref(), &id)
        .await?;
    let body = render_team_member(&state.directory, version, member).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Put an organization user on a team; owner or admin only.
#[utoipa::path(
    post,
    path = "/api/{version}/team-members",
    params(("version" = String, Path, description = "API version: v1 or v2")),
    request_body = TeamMemberRequest,
    responses(
        (status = 201, description = "Team membership created", body = crate::inbound::http::representations::TeamMemberV2),
        (status = 400, description = "Invalid request or already on the team", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 403, description = "Caller may not manage this roster", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "createTeamMember"
)]
#[post("/team-members")]
pub async fn create_team_member(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let request: TeamMemberRequest = parse_body(&body)?;
    let team_field = FieldName::new("team");
    let member_field = FieldName::new("organization_user");
    let draft = TeamMemberDraft {
        team: parse_reference(&required(request.team, team_field)?, team_field)?,
        organization_user: parse_reference(
            &required(request.organization_user, member_field)?,
            member_field,
        )?,
        is_admin: request.is_admin.unwrap_or(false),
    };
    let member = state.teams.add_member(&caller, draft).await?;
    let body = render_team_member(&state.directory, version, member).await?;
    Ok(HttpResponse::Created().json(body))
}

async fn update_member(
    version: ApiVersion,
    state: &HttpState,
    session: &SessionContext,
    raw_id: &str,
    body: &web::Bytes,
    partial: bool,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(session).await?;
    let id: TeamMemberId = parse_path_id(raw_id)?;
    let request: TeamMemberRequest = parse_body(body)?;
    let (organization, is_admin) = if partial {
        (request.organization, request.is_admin)
    } else {
        (
            Some(required(request.organization, FieldName::new("organization"))?),
            Some(required(request.is_admin, FieldName::new("is_admin"))?),
        )
    };
    let changes = TeamMemberChanges {
        organization: parse_scope(organization.as_deref()),
        is_admin,
    };
    let member = state.teams.update_member(&caller, &id, changes).await?;
    let body = render_team_member(&state.directory, version, member).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Replace the admin flag of a team membership.
#[utoipa::path(
    put,
    path = "/api/{version}/team-members/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Team member id")
    ),
    request_body = TeamMemberRequest,
    responses(
        (status = 200, description = "Team membership updated", body = crate::inbound::http::representations::TeamMemberV2),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 403, description = "Caller may not manage this roster", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "replaceTeamMember"
)]
#[put("/team-members/{id}")]
pub async fn replace_team_member(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    update_member(version, &state, &session, &path.id, &body, false).await
}

/// Change the admin flag of a team membership.
#[utoipa::path(
    patch,
    path = "/api/{version}/team-members/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Team member id")
    ),
    request_body = TeamMemberRequest,
    responses(
        (status = 200, description = "Team membership updated", body = crate::inbound::http::representations::TeamMemberV2),
        (status = 403, description = "Caller may not manage this roster", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "updateTeamMember"
)]
#[patch("/team-members/{id}")]
pub async fn update_team_member(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    update_member(version, &state, &session, &path.id, &body, true).await
}

/// Take someone off a team. Members may remove themselves.
#[utoipa::path(
    delete,
    path = "/api/{version}/team-members/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Team member id"),
        ScopeQuery
    ),
    responses(
        (status = 204, description = "Team membership deleted"),
        (status = 403, description = "Caller may not manage this roster", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["teams"],
    operation_id = "deleteTeamMember"
)]
#[delete("/team-members/{id}")]
pub async fn delete_team_member(
    _version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    query: web::Query<ScopeQuery>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let id: TeamMemberId = parse_path_id(&path.id)?;
    let scope: Option<OrganizationId> = parse_scope(query.organization_id.as_deref());
    state.teams.remove_member(&caller, scope.as_ref(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "teams_tests.rs"]
mod tests;
