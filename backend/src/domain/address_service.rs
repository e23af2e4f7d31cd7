//! Address book use-cases. Every address belongs to the caller.

use crate::domain::service_support::{NOT_FOUND, Repositories, map_address_error};
use crate::domain::{Address, AddressChanges, AddressFields, AddressId, Error, User};

/// Address service.
#[derive(Clone)]
pub struct AddressService {
    repos: Repositories,
}

impl AddressService {
    /// Create a new service over the shared repositories.
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// The caller's addresses.
    pub async fn list(&self, caller: &User) -> Result<Vec<Address>, Error> {
        self.repos
            .addresses
            .list_for_user(&caller.id)
            .await
            .map_err(map_address_error)
    }

    /// One of the caller's addresses.
    pub async fn retrieve(&self, caller: &User, id: &AddressId) -> Result<Address, Error> {
        self.repos
            .addresses
            .find_by_id(id)
            .await
            .map_err(map_address_error)?
            .filter(|address| address.user_id == caller.id)
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    /// Store a new address for the caller.
    pub async fn create(&self, caller: &User, fields: AddressFields) -> Result<Address, Error> {
        fields.validate()?;
        let address = Address::new(caller.id, fields);
        self.repos
            .addresses
            .create(&address)
            .await
            .map_err(map_address_error)?;
        Ok(address)
    }

    /// Change one of the caller's addresses.
    pub async fn update(
        &self,
        caller: &User,
        id: &AddressId,
        changes: AddressChanges,
    ) -> Result<Address, Error> {
        let mut address = self.retrieve(caller, id).await?;
        changes.apply(&mut address)?;
        self.repos
            .addresses
            .update(&address)
            .await
            .map_err(map_address_error)?;
        Ok(address)
    }

    /// Delete one of the caller's addresses.
    pub async fn destroy(&self, caller: &User, id: &AddressId) -> Result<(), Error> {
        let address = self.retrieve(caller, id).await?;
        let deleted = self
            .repos
            .addresses
            .delete(&address.id)
            .await
            .map_err(map_address_error)?;
        if deleted {
            Ok(())
        } else {
            Err(Error::not_found(NOT_FOUND))
        }
    }
}
