//! Shared request parsing helpers for the HTTP handlers.
//!
//! Bodies are taken as raw bytes and decoded only after the caller has been
//! authenticated, so anonymous requests always see `401` first.

use std::str::FromStr;

use actix_web::web;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::json;

use crate::domain::Error;

pub(crate) const NOT_FOUND: &str = "Not found.";

/// Path parameters for single-item routes. Ids stay raw so that malformed
/// ones can be reported as not found.
#[derive(Debug, Deserialize)]
pub struct ItemPath {
    pub id: String,
}

/// Query parameters selecting the organization (and team) a request is
/// scoped to.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScopeQuery {
    /// Organization the records belong to.
    pub organization_id: Option<String>,
    /// Team filter for team-member listings.
    pub team_id: Option<String>,
}

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidJson,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidJson => "invalid_json",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field}: This field is required.")).with_details(json!({
        "field": field,
        "code": ErrorCode::MissingField.as_str(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

/// Require a field that a full update (`PUT`) must carry.
pub(crate) fn required<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Decode a JSON request body. An empty body reads as `{}`.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &web::Bytes) -> Result<T, Error> {
    let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };
    serde_json::from_slice(raw).map_err(|error| {
        Error::invalid_request(format!("invalid JSON body: {error}")).with_details(json!({
            "code": ErrorCode::InvalidJson.as_str(),
            "line": error.line(),
            "column": error.column(),
        }))
    })
}

/// Parse an identifier taken from a URL path. Malformed ids are simply not
/// found.
pub(crate) fn parse_path_id<T: FromStr>(raw: &str) -> Result<T, Error> {
    raw.parse().map_err(|_| Error::not_found(NOT_FOUND))
}

/// Parse an identifier referenced from a request body.
pub(crate) fn parse_reference<T: FromStr>(raw: &str, field: FieldName) -> Result<T, Error> {
    raw.parse().map_err(|_| invalid_uuid_error(field, raw))
}

/// Parse a query-string scope. Missing or malformed values give no scope.
pub(crate) fn parse_scope<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|value| value.parse().ok())
}

/// Distinguish an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as DomainCode, OrganizationId};
    use rstest::rstest;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default)]
        name: Option<String>,
        #[serde(default, deserialize_with = "nullable")]
        avatar: Option<Option<String>>,
    }

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b"  \n".as_slice())]
    fn blank_bodies_read_as_empty_objects(#[case] raw: &[u8]) {
        let payload: Payload = parse_body(&web::Bytes::copy_from_slice(raw)).expect("empty body");
        assert!(payload.name.is_none());
        assert!(payload.avatar.is_none());
    }

    #[rstest]
    fn malformed_json_is_a_bad_request() {
        let err = parse_body::<Payload>(&web::Bytes::from_static(b"{\"name\":"))
            .expect_err("malformed body");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
            Some("invalid_json")
        );
    }

    #[rstest]
    #[case(b"{\"avatar\": null}".as_slice(), Some(None))]
    #[case(b"{\"avatar\": \"a.png\"}".as_slice(), Some(Some("a.png".to_owned())))]
    #[case(b"{}".as_slice(), None)]
    fn nullable_separates_null_from_absent(
        #[case] raw: &[u8],
        #[case] expected: Option<Option<String>>,
    ) {
        let payload: Payload = parse_body(&web::Bytes::copy_from_slice(raw)).expect("valid body");
        assert_eq!(payload.avatar, expected);
    }

    #[rstest]
    fn malformed_path_ids_are_not_found() {
        let err = parse_path_id::<OrganizationId>("nope").expect_err("malformed id");
        assert_eq!(err.code(), DomainCode::NotFound);
    }

    #[rstest]
    fn malformed_references_name_the_field() {
        let err = parse_reference::<OrganizationId>("nope", FieldName::new("organization"))
            .expect_err("malformed reference");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
            Some("organization")
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some("garbage"))]
    fn unusable_scopes_are_dropped(#[case] raw: Option<&str>) {
        assert!(parse_scope::<OrganizationId>(raw).is_none());
    }

    #[rstest]
    fn required_reports_missing_fields() {
        let err = required::<String>(None, FieldName::new("name")).expect_err("missing");
        assert_eq!(
            err.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
            Some("missing_field")
        );
    }
}
