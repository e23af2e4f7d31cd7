//! Postal addresses owned by users.

use super::ids::{AddressId, UserId};
use super::user::{FULL_NAME_MAX, UserValidationError, check_length};

/// Address attributes supplied on create or update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFields {
    pub address1: String,
    pub address2: String,
    pub area: String,
    pub city: String,
    pub county: String,
    pub postcode: String,
    pub country: String,
}

impl AddressFields {
    /// Check required fields and length limits.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        for (field, value) in self.labelled() {
            check_length(field, value, FULL_NAME_MAX)?;
        }
        if self.address1.trim().is_empty() {
            return Err(UserValidationError::Blank { field: "address1" });
        }
        if self.city.trim().is_empty() {
            return Err(UserValidationError::Blank { field: "city" });
        }
        Ok(())
    }

    fn labelled(&self) -> [(&'static str, &str); 7] {
        [
            ("address1", &self.address1),
            ("address2", &self.address2),
            ("area", &self.area),
            ("city", &self.city),
            ("county", &self.county),
            ("postcode", &self.postcode),
            ("country", &self.country),
        ]
    }
}

/// Address belonging to exactly one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub fields: AddressFields,
}

impl Address {
    /// Create a new address for `user_id`.
    pub fn new(user_id: UserId, fields: AddressFields) -> Self {
        Self {
            id: AddressId::random(),
            user_id,
            fields,
        }
    }
}

/// Partial update of an address; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressChanges {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub area: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

impl AddressChanges {
    /// Apply the changes and re-validate.
    pub fn apply(self, address: &mut Address) -> Result<(), UserValidationError> {
        let fields = &mut address.fields;
        let pairs = [
            (&mut fields.address1, self.address1),
            (&mut fields.address2, self.address2),
            (&mut fields.area, self.area),
            (&mut fields.city, self.city),
            (&mut fields.county, self.county),
            (&mut fields.postcode, self.postcode),
            (&mut fields.country, self.country),
        ];
        for (slot, value) in pairs {
            if let Some(value) = value {
                *slot = value;
            }
        }
        address.fields.validate()
    }
}
