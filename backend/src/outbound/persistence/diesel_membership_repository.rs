//! PostgreSQL-backed `MembershipRepository` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{MembershipPersistenceError, MembershipRepository};
use crate::domain::{OrganizationId, OrganizationUser, OrganizationUserId, UserId};

use super::diesel_helpers::{DieselFailure, classify, pool_message};
use super::models::{OrganizationUserRow, OrganizationUserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::organization_users;

/// Diesel-backed organization membership store.
#[derive(Clone)]
pub struct DieselMembershipRepository {
    pool: DbPool,
}

impl DieselMembershipRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MembershipPersistenceError {
    MembershipPersistenceError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> MembershipPersistenceError {
    match classify(error, operation) {
        DieselFailure::Connection(message) => MembershipPersistenceError::connection(message),
        DieselFailure::UniqueViolation { .. } => MembershipPersistenceError::duplicate_member(),
        DieselFailure::Query(message) => MembershipPersistenceError::query(message),
    }
}

#[async_trait]
impl MembershipRepository for DieselMembershipRepository {
    async fn create(&self, membership: &OrganizationUser) -> Result<(), MembershipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(organization_users::table)
            .values(&OrganizationUserRow::from(membership))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "insert membership"))
    }

    async fn update(&self, membership: &OrganizationUser) -> Result<(), MembershipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(organization_users::table.find(*membership.id.as_uuid()))
            .set(&OrganizationUserUpdate {
                is_admin: membership.is_admin,
                modified: membership.modified,
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "update membership"))
    }

    async fn delete(&self, id: &OrganizationUserId) -> Result<bool, MembershipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(organization_users::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|deleted| deleted > 0)
            .map_err(|err| map_diesel_error(err, "delete membership"))
    }

    async fn find_by_id(
        &self,
        id: &OrganizationUserId,
    ) -> Result<Option<OrganizationUser>, MembershipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OrganizationUserRow> = organization_users::table
            .find(*id.as_uuid())
            .select(OrganizationUserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find membership"))?;
        Ok(row.map(OrganizationUser::from))
    }

    async fn find_for_user(
        &self,
        organization_id: &OrganizationId,
        user_id: &UserId,
    ) -> Result<Option<OrganizationUser>, MembershipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OrganizationUserRow> = organization_users::table
            .filter(organization_users::organization_id.eq(*organization_id.as_uuid()))
            .filter(organization_users::user_id.eq(*user_id.as_uuid()))
            .select(OrganizationUserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find membership for user"))?;
        Ok(row.map(OrganizationUser::from))
    }

    async fn list_for_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<OrganizationUser>, MembershipPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrganizationUserRow> = organization_users::table
            .filter(organization_users::organization_id.eq(*organization_id.as_uuid()))
            .select(OrganizationUserRow::as_select())
            .order_by(organization_users::created.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list memberships"))?;
        Ok(rows.into_iter().map(OrganizationUser::from).collect())
    }
}
