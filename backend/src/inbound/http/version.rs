//! API version token taken from the `/api/{version}/…` path segment.
//!
//! `v1` selects the simple representations (relations as identifiers) and
//! `v2` the nested ones. Any other token is rejected with `404` before the
//! session is consulted.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload};

use crate::domain::Error;

pub(crate) const INVALID_VERSION: &str = "Invalid version in URL path.";

/// Representation family requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    /// Parse a path token; only the exact lowercase tokens are accepted.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "v1" => Some(Self::V1),
            "v2" => Some(Self::V2),
            _ => None,
        }
    }

    /// Token used in URLs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl FromRequest for ApiVersion {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let version = req
            .match_info()
            .get("version")
            .and_then(Self::parse)
            .ok_or_else(|| Error::not_found(INVALID_VERSION));
        ready(version)
    }
}
