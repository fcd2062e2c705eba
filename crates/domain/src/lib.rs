//! Domain entities and invariants.

#![forbid(unsafe_code)]

/// Declares a UUID-backed identifier newtype.
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
            #[must_use]
            pub fn from_uuid(value: uuid::Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

mod claims;
mod event;
mod institution;
mod personal_code;
mod role;
mod security;
mod user;

pub use claims::{IdentityClaims, SelectedInstitutionClaims};
pub use event::{ChangeKind, EntityEvent, EntityKind};
pub use institution::{Department, DepartmentId, Institution, InstitutionUser, InstitutionUserId};
pub use personal_code::PersonalIdentificationCode;
pub use role::{Role, RoleChange, RoleId, RoleSummary};
pub use security::{CallerContext, Privilege};
pub use user::{EmailAddress, PersonName, PhoneNumber, User, UserId};
