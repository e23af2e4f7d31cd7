//! Address book endpoints. Every address belongs to the caller.
//!
//! ```text
//! GET    /api/v1/addresses
//! POST   /api/v1/addresses {"address1":"1 High Street","city":"London"}
//! PATCH  /api/v2/addresses/{id} {"postcode":"N1 9GU"}
//! DELETE /api/v1/addresses/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::Deserialize;

use crate::domain::{AddressChanges, AddressFields, AddressId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::representations::{render_address, render_addresses};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, ItemPath, parse_body, parse_path_id, required,
};
use crate::inbound::http::version::ApiVersion;

/// Address fields. `user` is read-only and always the caller.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct AddressRequest {
    #[serde(default)]
    #[schema(example = "1 High Street")]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    #[schema(example = "London")]
    pub city: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl AddressRequest {
    fn into_fields(self) -> Result<AddressFields, crate::domain::Error> {
        Ok(AddressFields {
            address1: required(self.address1, FieldName::new("address1"))?,
            address2: self.address2.unwrap_or_default(),
            area: self.area.unwrap_or_default(),
            city: required(self.city, FieldName::new("city"))?,
            county: self.county.unwrap_or_default(),
            postcode: self.postcode.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
        })
    }
}

impl From<AddressRequest> for AddressChanges {
    fn from(request: AddressRequest) -> Self {
        Self {
            address1: request.address1,
            address2: request.address2,
            area: request.area,
            city: request.city,
            county: request.county,
            postcode: request.postcode,
            country: request.country,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/{version}/addresses",
    params(("version" = String, Path, description = "API version: v1 or v2")),
    responses(
        (status = 200, description = "The caller's addresses", body = [crate::inbound::http::representations::AddressV2]),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["addresses"],
    operation_id = "listAddresses"
)]
#[get("/addresses")]
pub async fn list_addresses(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let addresses = state.addresses.list(&caller).await?;
    let body = render_addresses(&state.directory, version, addresses).await?;
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/api/{version}/addresses/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Address id")
    ),
    responses(
        (status = 200, description = "Address", body = crate::inbound::http::representations::AddressV2),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["addresses"],
    operation_id = "getAddress"
)]
#[get("/addresses/{id}")]
pub async fn get_address(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let id: AddressId = parse_path_id(&path.id)?;
    let address = state.addresses.retrieve(&caller, &id).await?;
    let body = render_address(&state.directory, version, address).await?;
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    post,
    path = "/api/{version}/addresses",
    params(("version" = String, Path, description = "API version: v1 or v2")),
    request_body = AddressRequest,
    responses(
        (status = 201, description = "Address created", body = crate::inbound::http::representations::AddressV2),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["addresses"],
    operation_id = "createAddress"
)]
#[post("/addresses")]
pub async fn create_address(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let request: AddressRequest = parse_body(&body)?;
    let address = state.addresses.create(&caller, request.into_fields()?).await?;
    let body = render_address(&state.directory, version, address).await?;
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
    let id: AddressId = parse_path_id(raw_id)?;
    let request: AddressRequest = parse_body(body)?;
    let changes = if partial {
        AddressChanges::from(request)
    } else {
        let fields = request.into_fields()?;
        AddressChanges {
            address1: Some(fields.address1),
            address2: Some(fields.address2),
            area: Some(fields.area),
            city: Some(fields.city),
            county: Some(fields.county),
            postcode: Some(fields.postcode),
            country: Some(fields.country),
        }
    };
    let address = state.addresses.update(&caller, &id, changes).await?;
    let body = render_address(&state.directory, version, address).await?;
    Ok(HttpResponse::Ok().json(body))
}

/// Replace an address; omitted optional fields are cleared.
#[utoipa::path(
    put,
    path = "/api/{version}/addresses/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Address id")
    ),
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Address updated", body = crate::inbound::http::representations::AddressV2),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["addresses"],
    operation_id = "replaceAddress"
)]
#[put("/addresses/{id}")]
pub async fn replace_address(
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
    path = "/api/{version}/addresses/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Address id")
    ),
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Address updated", body = crate::inbound::http::representations::AddressV2),
        (status = 400, description = "Invalid request", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["addresses"],
    operation_id = "updateAddress"
)]
#[patch("/addresses/{id}")]
pub async fn update_address(
    version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    update(version, &state, &session, &path.id, &body, true).await
}

#[utoipa::path(
    delete,
    path = "/api/{version}/addresses/{id}",
    params(
        ("version" = String, Path, description = "API version: v1 or v2"),
        ("id" = String, Path, description = "Address id")
    ),
    responses(
        (status = 204, description = "Address deleted"),
        (status = 401, description = "Unauthorised", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Not found", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["addresses"],
    operation_id = "deleteAddress"
)]
#[delete("/addresses/{id}")]
pub async fn delete_address(
    _version: ApiVersion,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ItemPath>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let id: AddressId = parse_path_id(&path.id)?;
    state.addresses.destroy(&caller, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
