//! Identity use-cases: resolving the session caller, self-service account
//! management and public profiles.

use tracing::info;
use zeroize::Zeroizing;

use crate::domain::service_support::{NOT_FOUND, Repositories, map_user_error};
use crate::domain::{Error, PasswordDigest, Profile, ProfileChanges, User, UserId, Username};

pub(crate) const AUTHENTICATION_REQUIRED: &str = "authentication required";

/// Payload for registering a user.
#[derive(Clone)]
pub struct NewUser {
    pub username: Username,
    pub profile: Profile,
    pub password: Option<Zeroizing<String>>,
}

/// User service.
#[derive(Clone)]
pub struct UserService {
    repos: Repositories,
}

impl UserService {
    /// Create a new service over the shared repositories.
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Load the account behind a session. Deleted or inactive accounts are
    /// treated as anonymous.
    pub async fn resolve_caller(&self, id: &UserId) -> Result<User, Error> {
        self.repos
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .filter(|user| user.is_active)
            .ok_or_else(|| Error::unauthorized(AUTHENTICATION_REQUIRED))
    }

    /// Users visible to the caller: only the caller.
    pub fn list(&self, caller: &User) -> Vec<User> {
        vec![caller.clone()]
    }

    /// The caller's own account; anyone else is not found.
    pub fn retrieve(&self, caller: &User, id: &UserId) -> Result<User, Error> {
        if caller.id == *id {
            Ok(caller.clone())
        } else {
            Err(Error::not_found(NOT_FOUND))
        }
    }

    /// Register a new active account.
    pub async fn create(&self, caller: &User, new_user: NewUser) -> Result<User, Error> {
        new_user.profile.validate()?;
        let password = new_user
            .password
            .as_deref()
            .map(|raw| PasswordDigest::hash(raw.as_str()))
            .transpose()
            .map_err(|err| Error::internal(err.to_string()))?;
        let user = User::new(new_user.username, new_user.profile);
        self.repos
            .users
            .create(&user, password)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, created_by = %caller.id, "user created");
        Ok(user)
    }

    /// Update the caller's own profile.
    pub async fn update(
        &self,
        caller: &User,
        id: &UserId,
        changes: ProfileChanges,
    ) -> Result<User, Error> {
        let mut user = self.retrieve(caller, id)?;
        changes.apply(&mut user)?;
        self.repos.users.update(&user).await.map_err(map_user_error)?;
        Ok(user)
    }

    /// Public profiles of every user, newest joined first.
    pub async fn profiles(&self) -> Result<Vec<User>, Error> {
        self.repos.users.list().await.map_err(map_user_error)
    }

    /// Public profile by username.
    pub async fn profile(&self, username: &str) -> Result<User, Error> {
        self.repos
            .users
            .find_by_username(username)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
