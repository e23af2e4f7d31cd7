//! PostgreSQL-backed `OrganizationRepository` adapter.
//!
//! Founding an organization writes the organization, the founder's admin
//! membership and the owner record in one transaction. Deletion relies on
//! `ON DELETE CASCADE` to clear memberships, owner, teams and team members.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{OrganizationPersistenceError, OrganizationRepository};
use crate::domain::{
    FoundedOrganization, Organization, OrganizationId, OrganizationOwner, UserId,
};

use super::diesel_helpers::{DieselFailure, classify, pool_message};
use super::models::{
    OrganizationOwnerRow, OrganizationRow, OrganizationUpdate, OrganizationUserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{organization_owners, organization_users, organizations};

/// Diesel-backed organization store.
#[derive(Clone)]
pub struct DieselOrganizationRepository {
    pool: DbPool,
}

impl DieselOrganizationRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrganizationPersistenceError {
    OrganizationPersistenceError::connection(pool_message(error))
}

fn map_diesel_error(
    error: diesel::result::Error,
    operation: &str,
    slug: &str,
) -> OrganizationPersistenceError {
    match classify(error, operation) {
        DieselFailure::Connection(message) => OrganizationPersistenceError::connection(message),
        DieselFailure::UniqueViolation { constraint } => match constraint.as_deref() {
            Some(name) if !name.contains("slug") => {
                OrganizationPersistenceError::query(format!("unique constraint {name} violated"))
            }
            _ => OrganizationPersistenceError::duplicate_slug(slug),
        },
        DieselFailure::Query(message) => OrganizationPersistenceError::query(message),
    }
}

/// Escape `LIKE` wildcards so slugs match literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[async_trait]
impl OrganizationRepository for DieselOrganizationRepository {
    async fn create(
        &self,
        founded: &FoundedOrganization,
    ) -> Result<(), OrganizationPersistenceError> {
        let organization = OrganizationRow::from(&founded.organization);
        let membership = OrganizationUserRow::from(&founded.membership);
        let owner = OrganizationOwnerRow::from(&founded.owner);
        let slug = founded.organization.slug.clone();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(organizations::table)
                    .values(&organization)
                    .execute(conn)
                    .await?;
                diesel::insert_into(organization_users::table)
                    .values(&membership)
                    .execute(conn)
                    .await?;
                diesel::insert_into(organization_owners::table)
                    .values(&owner)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_diesel_error(err, "found organization", &slug))
    }

    async fn list_for_member(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Organization>, OrganizationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrganizationRow> = organizations::table
            .inner_join(organization_users::table)
            .filter(organization_users::user_id.eq(*user_id.as_uuid()))
            .select(OrganizationRow::as_select())
            .order_by(organizations::created.desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list organizations", ""))?;
        Ok(rows.into_iter().map(Organization::from).collect())
    }

    async fn find_by_id(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<Organization>, OrganizationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OrganizationRow> = organizations::table
            .find(*id.as_uuid())
            .select(OrganizationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find organization", ""))?;
        Ok(row.map(Organization::from))
    }

    async fn slugs_with_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<String>, OrganizationPersistenceError> {
        let pattern = format!("{}%", escape_like(prefix));
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        organizations::table
            .filter(organizations::slug.like(pattern).escape('\\'))
            .select(organizations::slug)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "load slugs", prefix))
    }

    async fn update(
        &self,
        organization: &Organization,
    ) -> Result<(), OrganizationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(organizations::table.find(*organization.id.as_uuid()))
            .set(&OrganizationUpdate {
                name: &organization.name,
                is_active: organization.is_active,
                modified: organization.modified,
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "update organization", &organization.slug))
    }

    async fn delete(&self, id: &OrganizationId) -> Result<bool, OrganizationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(organizations::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|deleted| deleted > 0)
            .map_err(|err| map_diesel_error(err, "delete organization", ""))
    }

    async fn find_owner(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<OrganizationOwner>, OrganizationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OrganizationOwnerRow> = organization_owners::table
            .filter(organization_owners::organization_id.eq(*id.as_uuid()))
            .select(OrganizationOwnerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find owner", ""))?;
        Ok(row.map(OrganizationOwner::from))
    }
}
