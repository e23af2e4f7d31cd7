//! Session login and logout.
//!
//! ```text
//! POST /api/v1/auth/login {"username":"alice","password":"secret"}
//! POST /api/v1/auth/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::{Error, LoginCredentials, LoginValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_body;
use crate::inbound::http::version::ApiVersion;

/// Login request body.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "alice")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl TryFrom<&LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: &LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Verify a username and password and start a session.
#[utoipa::path(
    post,
    path = "/api/{version}/auth/login",
    params(("version" = String, Path, description = "API version: v1 or v2")),
    request_body = LoginRequest,
    responses(
        (status = 204, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Invalid credentials", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Unknown API version", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    _version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let request: LoginRequest = parse_body(&body)?;
    let credentials = LoginCredentials::try_from(&request).map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    info!(%user_id, "session started");
    Ok(HttpResponse::NoContent().finish())
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/{version}/auth/logout",
    params(("version" = String, Path, description = "API version: v1 or v2")),
    responses(
        (status = 204, description = "Session cleared"),
        (status = 404, description = "Unknown API version", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(_version: ApiVersion, session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}
