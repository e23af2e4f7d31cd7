//! Password login against stored Argon2 hashes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{LoginService, UserRepository};
use crate::domain::service_support::map_user_error;
use crate::domain::{Error, LoginCredentials, UserId};

pub(crate) const INVALID_CREDENTIALS: &str = "invalid credentials";

/// [`LoginService`] backed by the user store.
#[derive(Clone)]
pub struct CredentialLoginService {
    users: Arc<dyn UserRepository>,
}

impl CredentialLoginService {
    /// Create a login service over the user store.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl LoginService for CredentialLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let stored = self
            .users
            .find_credentials(credentials.username())
            .await
            .map_err(map_user_error)?;
        let Some(stored) = stored else {
            debug!("login for unknown username");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let verified = stored.user.is_active
            && stored
                .password
                .as_ref()
                .is_some_and(|digest| digest.verify(credentials.password()));
        if verified {
            Ok(stored.user.id)
        } else {
            debug!(user_id = %stored.user.id, "login rejected");
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }
}
