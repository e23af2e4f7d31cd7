//! Driving port for login use-cases.
//!
//! Inbound adapters call it to authenticate credentials without importing the
//! backing store, so handler tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    ///
    /// Unknown users, inactive users, users without a password and wrong
    /// passwords all yield the same unauthorized error.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
