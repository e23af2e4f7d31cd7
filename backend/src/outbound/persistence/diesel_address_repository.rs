//! PostgreSQL-backed `AddressRepository` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AddressPersistenceError, AddressRepository};
use crate::domain::{Address, AddressId, UserId};

use super::diesel_helpers::{DieselFailure, classify, pool_message};
use super::models::{AddressRow, AddressUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::addresses;

/// Diesel-backed address store.
#[derive(Clone)]
pub struct DieselAddressRepository {
    pool: DbPool,
}

impl DieselAddressRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AddressPersistenceError {
    AddressPersistenceError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> AddressPersistenceError {
    match classify(error, operation) {
        DieselFailure::Connection(message) => AddressPersistenceError::connection(message),
        DieselFailure::UniqueViolation { .. } => {
            AddressPersistenceError::query("address already exists")
        }
        DieselFailure::Query(message) => AddressPersistenceError::query(message),
    }
}

#[async_trait]
impl AddressRepository for DieselAddressRepository {
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Address>, AddressPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AddressRow> = addresses::table
            .filter(addresses::user_id.eq(*user_id.as_uuid()))
            .select(AddressRow::as_select())
            .order_by(addresses::id)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list addresses"))?;
        Ok(rows.into_iter().map(Address::from).collect())
    }

    async fn find_by_id(&self, id: &AddressId) -> Result<Option<Address>, AddressPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AddressRow> = addresses::table
            .find(*id.as_uuid())
            .select(AddressRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find address"))?;
        Ok(row.map(Address::from))
    }

    async fn create(&self, address: &Address) -> Result<(), AddressPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(addresses::table)
            .values(&AddressRow::from(address))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "insert address"))
    }

    async fn update(&self, address: &Address) -> Result<(), AddressPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(addresses::table.find(*address.id.as_uuid()))
            .set(&AddressUpdate::from(address))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "update address"))
    }

    async fn delete(&self, id: &AddressId) -> Result<bool, AddressPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(addresses::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|deleted| deleted > 0)
            .map_err(|err| map_diesel_error(err, "delete address"))
    }
}
