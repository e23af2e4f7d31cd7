//! PostgreSQL-backed `UserRepository` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{StoredCredentials, UserPersistenceError, UserRepository};
use crate::domain::{PasswordDigest, User, UserId};

use super::diesel_helpers::{DieselFailure, classify, collect_rows, pool_message};
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

diesel::define_sql_function! {
    /// SQL `LOWER()` over a nullable text column.
    fn lower(value: diesel::sql_types::Nullable<diesel::sql_types::Text>) -> diesel::sql_types::Nullable<diesel::sql_types::Text>;
}

/// Diesel-backed user store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_message(error))
}

fn map_diesel_error(
    error: diesel::result::Error,
    operation: &str,
    username: Option<&str>,
) -> UserPersistenceError {
    match classify(error, operation) {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::UniqueViolation { .. } => {
            UserPersistenceError::duplicate_username(username.unwrap_or_default())
        }
        DieselFailure::Query(message) => UserPersistenceError::query(message),
    }
}

fn convert(rows: Vec<UserRow>) -> Result<Vec<User>, UserPersistenceError> {
    collect_rows(rows, UserRow::into_user, UserPersistenceError::query)
}

/// Single-row lookups shared by the finder methods.
enum Lookup<'a> {
    Id(Uuid),
    Username(&'a str),
}

impl DieselUserRepository {
    async fn load_one(&self, lookup: Lookup<'_>) -> Result<Option<UserRow>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let query = users::table.select(UserRow::as_select()).into_boxed();
        let query = match lookup {
            Lookup::Id(id) => query.filter(users::id.eq(id)),
            Lookup::Username(username) => query.filter(users::username.eq(username)),
        };
        query
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find user", None))
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(
        &self,
        user: &User,
        password: Option<PasswordDigest>,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let hash = password.as_ref().map(AsRef::as_ref);
        diesel::insert_into(users::table)
            .values(&NewUserRow::new(user, hash))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "insert user", Some(user.username.as_ref())))
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.find(*user.id.as_uuid()))
            .set(&UserUpdate::from(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "update user", Some(user.username.as_ref())))
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(users::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|deleted| deleted > 0)
            .map_err(|err| map_diesel_error(err, "delete user", None))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let row = self.load_one(Lookup::Id(*id.as_uuid())).await?;
        row.map(UserRow::into_user)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let row = self.load_one(Lookup::Username(username)).await?;
        row.map(UserRow::into_user)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let Some(row) = self.load_one(Lookup::Username(username)).await?
        else {
            return Ok(None);
        };
        let password = row.password_hash.clone().map(PasswordDigest::from_stored);
        let user = row.into_user().map_err(UserPersistenceError::query)?;
        Ok(Some(StoredCredentials { user, password }))
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(lower(users::email).eq(email.trim().to_lowercase()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "find users by email", None))?;
        convert(rows)
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let keys: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(keys))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "find users", None))?;
        convert(rows)
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order_by(users::date_joined.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list users", None))?;
        convert(rows)
    }
}
