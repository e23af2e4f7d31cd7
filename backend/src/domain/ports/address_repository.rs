//! Port abstraction for address persistence.

use async_trait::async_trait;

use crate::domain::{Address, AddressId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by address repository adapters.
    pub enum AddressPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "address repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "address repository query failed: {message}",
    }
}

/// Storage of user addresses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Addresses owned by `user_id`.
    async fn list_for_user(&self, user_id: &UserId)
    -> Result<Vec<Address>, AddressPersistenceError>;

    /// Fetch one address.
    async fn find_by_id(&self, id: &AddressId) -> Result<Option<Address>, AddressPersistenceError>;

    /// Insert a new address.
    async fn create(&self, address: &Address) -> Result<(), AddressPersistenceError>;

    /// Overwrite an existing address.
    async fn update(&self, address: &Address) -> Result<(), AddressPersistenceError>;

    /// Remove an address; returns whether a row was deleted.
    async fn delete(&self, id: &AddressId) -> Result<bool, AddressPersistenceError>;
}
