//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every versioned REST endpoint, the v1/v2 response
//! bodies, request payloads and the error schema wrappers, plus the session
//! cookie security scheme. Swagger UI serves it at `/docs` in debug builds.

use crate::inbound::http::addresses::AddressRequest;
use crate::inbound::http::auth::LoginRequest;
use crate::inbound::http::organization_users::OrganizationUserRequest;
use crate::inbound::http::organizations::OrganizationRequest;
use crate::inbound::http::representations::{
    AddressFieldsBody, AddressV1, AddressV2, OrganizationUserV1, OrganizationUserV2,
    OrganizationV1, OrganizationV2, OwnerV1, OwnerV2, ProfileBody, TeamMemberV1, TeamMemberV2,
    TeamV1, TeamV2, UserV1, UserV2,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::teams::{TeamMemberRequest, TeamRequest};
use crate::inbound::http::users::UserRequest;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/{version}/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Employee management API",
        description = "Organizations, teams and their members. `v1` bodies reference related \
records by id; `v2` bodies embed them."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::organizations::list_organizations,
        crate::inbound::http::organizations::get_organization,
        crate::inbound::http::organizations::create_organization,
        crate::inbound::http::organizations::replace_organization,
        crate::inbound::http::organizations::update_organization,
        crate::inbound::http::organizations::delete_organization,
        crate::inbound::http::organization_users::list_organization_users,
        crate::inbound::http::organization_users::get_organization_user,
        crate::inbound::http::organization_users::create_organization_user,
        crate::inbound::http::organization_users::replace_organization_user,
        crate::inbound::http::organization_users::update_organization_user,
        crate::inbound::http::organization_users::delete_organization_user,
        crate::inbound::http::organization_users::get_organization_owner,
        crate::inbound::http::teams::list_teams,
        crate::inbound::http::teams::get_team,
        crate::inbound::http::teams::create_team,
        crate::inbound::http::teams::replace_team,
        crate::inbound::http::teams::patch_team,
        crate::inbound::http::teams::delete_team,
        crate::inbound::http::teams::list_team_members,
        crate::inbound::http::teams::get_team_member,
        crate::inbound::http::teams::create_team_member,
        crate::inbound::http::teams::replace_team_member,
        crate::inbound::http::teams::update_team_member,
        crate::inbound::http::teams::delete_team_member,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::replace_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::list_profiles,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::addresses::list_addresses,
        crate::inbound::http::addresses::get_address,
        crate::inbound::http::addresses::create_address,
        crate::inbound::http::addresses::replace_address,
        crate::inbound::http::addresses::update_address,
        crate::inbound::http::addresses::delete_address,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        LoginRequest,
        OrganizationRequest,
        OrganizationUserRequest,
        TeamRequest,
        TeamMemberRequest,
        UserRequest,
        AddressRequest,
        ProfileBody,
        OrganizationV1,
        OrganizationV2,
        OrganizationUserV1,
        OrganizationUserV2,
        OwnerV1,
        OwnerV2,
        TeamV1,
        TeamV2,
        TeamMemberV1,
        TeamMemberV2,
        UserV1,
        UserV2,
        AddressFieldsBody,
        AddressV1,
        AddressV2,
    )),
    tags(
        (name = "auth", description = "Session login and logout"),
        (name = "organizations", description = "Organizations the caller belongs to"),
        (name = "organization-users", description = "Organization memberships and owners"),
        (name = "teams", description = "Teams and team rosters"),
        (name = "users", description = "The caller's own account"),
        (name = "profiles", description = "Public user profiles"),
        (name = "addresses", description = "The caller's address book"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
