//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{PasswordDigest, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The username is already taken.
        DuplicateUsername { username: String } => "username already taken: {username}",
    }
}

/// A user together with their stored password hash, for login checks only.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user: User,
    pub password: Option<PasswordDigest>,
}

/// Storage of user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, optionally with a password hash.
    async fn create(
        &self,
        user: &User,
        password: Option<PasswordDigest>,
    ) -> Result<(), UserPersistenceError>;

    /// Overwrite the profile attributes, username and flags of a user.
    async fn update(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Remove a user; `false` when no such user exists.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by exact username.
    async fn find_by_username(&self, username: &str)
    -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and password hash by exact username.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// All users whose email matches `email` case-insensitively.
    async fn find_by_email(&self, email: &str) -> Result<Vec<User>, UserPersistenceError>;

    /// Users with the given identifiers, in no particular order.
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError>;

    /// Every user, most recently joined first.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;
}
