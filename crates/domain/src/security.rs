use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use userhub_core::{AppError, InstitutionId};

use crate::{InstitutionUserId, UserId};

macro_rules! privilege_catalog {
    ($($(#[$doc:meta])* $variant:ident => $key:literal,)+) => {
        /// Fixed catalog of permission keys granted through roles.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum Privilege {
            $($(#[$doc])* $variant,)+
        }

        impl Privilege {
            /// Returns the stable storage and transport key for this privilege.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)+
                }
            }

            /// Returns every privilege in the catalog.
            #[must_use]
            pub fn all() -> &'static [Self] {
                const ALL: &[Privilege] = &[$(Privilege::$variant,)+];
                ALL
            }
        }

        impl FromStr for Privilege {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($key => Ok(Self::$variant),)+
                    _ => Err(AppError::Validation(format!(
                        "unknown privilege key '{value}'"
                    ))),
                }
            }
        }
    };
}

privilege_catalog! {
    /// Create roles.
    AddRole => "ADD_ROLE",
    /// Read roles.
    ViewRole => "VIEW_ROLE",
    /// Rename roles and change their grants.
    EditRole => "EDIT_ROLE",
    /// Delete roles.
    DeleteRole => "DELETE_ROLE",
    /// Create institution users, directly or through CSV import.
    AddUser => "ADD_USER",
    /// Change institution user contacts, department and roles.
    EditUser => "EDIT_USER",
    /// Read institution users.
    ViewUser => "VIEW_USER",
    /// Export institution users.
    ExportUser => "EXPORT_USER",
    /// Reactivate deactivated institution users.
    ActivateUser => "ACTIVATE_USER",
    /// Deactivate institution users.
    DeactivateUser => "DEACTIVATE_USER",
    /// Archive institution users.
    ArchiveUser => "ARCHIVE_USER",
    /// Change working times of institution users.
    EditUserWorktime => "EDIT_USER_WORKTIME",
    /// Change vacations of institution users.
    EditUserVacation => "EDIT_USER_VACATION",
    /// Change institution working times.
    EditInstitutionWorktime => "EDIT_INSTITUTION_WORKTIME",
    /// Change institution details.
    EditInstitution => "EDIT_INSTITUTION",
    /// Create departments.
    AddDepartment => "ADD_DEPARTMENT",
    /// Rename departments.
    EditDepartment => "EDIT_DEPARTMENT",
    /// Delete departments.
    DeleteDepartment => "DELETE_DEPARTMENT",
}

impl Privilege {
    /// Parses a transport value into a privilege.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

/// Request-scoped authenticated caller, derived from the identity provider token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    institution_id: InstitutionId,
    user_id: UserId,
    institution_user_id: InstitutionUserId,
    privileges: BTreeSet<Privilege>,
}

impl CallerContext {
    /// Creates a caller context.
    #[must_use]
    pub fn new(
        institution_id: InstitutionId,
        user_id: UserId,
        institution_user_id: InstitutionUserId,
        privileges: impl IntoIterator<Item = Privilege>,
    ) -> Self {
        Self {
            institution_id,
            user_id,
            institution_user_id,
            privileges: privileges.into_iter().collect(),
        }
    }

    /// Returns the institution selected for this request.
    #[must_use]
    pub fn institution_id(&self) -> InstitutionId {
        self.institution_id
    }

    /// Returns the calling user.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the caller's membership in the selected institution.
    #[must_use]
    pub fn institution_user_id(&self) -> InstitutionUserId {
        self.institution_user_id
    }

    /// Returns whether the caller holds the privilege. No hierarchy, no inheritance.
    #[must_use]
    pub fn has_privilege(&self, privilege: Privilege) -> bool {
        self.privileges.contains(&privilege)
    }

    /// Returns the caller's privileges.
    #[must_use]
    pub fn privileges(&self) -> &BTreeSet<Privilege> {
        &self.privileges
    }
}
