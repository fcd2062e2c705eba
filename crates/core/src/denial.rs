use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Business-rule refusals that callers must be able to tell apart from plain validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    /// The root role cannot be deleted, renamed, demoted or have its grants changed.
    RootRoleModification,
    /// The last holder of a root role cannot lose it.
    OnlyUserUnderRootRole,
    /// Roles require a non-empty name.
    EmptyRoleName,
    /// Roles require at least one privilege.
    EmptyRolePrivileges,
    /// Institution users require at least one role.
    EmptyUserRoles,
}

impl Denial {
    /// Returns the fixed human-readable message returned to API callers.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::RootRoleModification => "The root role cannot be modified or deleted",
            Self::OnlyUserUnderRootRole => {
                "The role cannot be removed from the only user holding the root role"
            }
            Self::EmptyRoleName => "Role name must not be empty",
            Self::EmptyRolePrivileges => "Role must have at least one privilege",
            Self::EmptyUserRoles => "User must have at least one role",
        }
    }

    /// Returns a stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::RootRoleModification => "root_role_modification",
            Self::OnlyUserUnderRootRole => "only_user_under_root_role",
            Self::EmptyRoleName => "empty_role_name",
            Self::EmptyRolePrivileges => "empty_role_privileges",
            Self::EmptyUserRoles => "empty_user_roles",
        }
    }
}

impl Display for Denial {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.message())
    }
}
