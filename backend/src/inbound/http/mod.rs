//! HTTP inbound adapter exposing the versioned REST API.

pub mod addresses;
pub mod auth;
pub mod error;
pub mod health;
pub mod organization_users;
pub mod organizations;
pub mod representations;
pub mod routes;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod teams;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;
pub mod version;

pub use error::ApiResult;
