//! Strongly typed identifiers for every persisted aggregate.
//!
//! Each identifier wraps a UUID and serialises as its hyphenated string form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Identifier of a [`crate::domain::User`].
    UserId
);
define_id!(
    /// Identifier of an [`crate::domain::Address`].
    AddressId
);
define_id!(
    /// Identifier of an [`crate::domain::Organization`].
    OrganizationId
);
define_id!(
    /// Identifier of an [`crate::domain::OrganizationUser`] membership.
    OrganizationUserId
);
define_id!(
    /// Identifier of an [`crate::domain::OrganizationOwner`] record.
    OrganizationOwnerId
);
define_id!(
    /// Identifier of a [`crate::domain::Team`].
    TeamId
);
define_id!(
    /// Identifier of a [`crate::domain::TeamMember`].
    TeamMemberId
);
