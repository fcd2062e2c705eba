use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use userhub_core::{Denial, InstitutionId};

use crate::Privilege;

uuid_identifier!(
    /// Unique identifier for a role.
    RoleId
);

/// Named, institution-scoped bundle of privileges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role identifier.
    pub id: RoleId,
    /// Owning institution.
    pub institution_id: InstitutionId,
    /// Name, unique inside the institution.
    pub name: String,
    /// Marks the protected root role.
    pub is_root: bool,
    /// Granted privileges.
    pub privileges: Vec<Privilege>,
}

/// Role reference carried on institution users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSummary {
    /// Role identifier.
    pub id: RoleId,
    /// Role name.
    pub name: String,
    /// Marks the protected root role.
    pub is_root: bool,
}

/// Requested changes to an existing role. `None` leaves the attribute untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleChange {
    /// New name.
    pub name: Option<String>,
    /// New root flag.
    pub is_root: Option<bool>,
    /// Replacement privilege set.
    pub privileges: Option<Vec<Privilege>>,
}

impl Role {
    /// Returns the summary projection.
    #[must_use]
    pub fn summary(&self) -> RoleSummary {
        RoleSummary {
            id: self.id,
            name: self.name.clone(),
            is_root: self.is_root,
        }
    }

    /// Checks a requested change against the role invariants.
    ///
    /// A root role keeps its name, flag and grants. Any role keeps a non-empty name and at
    /// least one privilege.
    pub fn check_change(&self, change: &RoleChange) -> Result<(), Denial> {
        if let Some(name) = &change.name
            && name.trim().is_empty()
        {
            return Err(Denial::EmptyRoleName);
        }

        if let Some(privileges) = &change.privileges
            && privileges.is_empty()
        {
            return Err(Denial::EmptyRolePrivileges);
        }

        if !self.is_root {
            return Ok(());
        }

        let renames = change
            .name
            .as_deref()
            .is_some_and(|name| name.trim() != self.name);
        let demotes = change.is_root == Some(false);
        let regrants = change.privileges.as_ref().is_some_and(|privileges| {
            privileges.iter().collect::<BTreeSet<_>>() != self.privileges.iter().collect()
        });

        if renames || demotes || regrants {
            return Err(Denial::RootRoleModification);
        }

        Ok(())
    }

    /// Checks that the role may be deleted.
    pub fn check_delete(&self) -> Result<(), Denial> {
        if self.is_root {
            return Err(Denial::RootRoleModification);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use userhub_core::{Denial, InstitutionId};

    use super::{Role, RoleChange, RoleId};
    use crate::Privilege;

    fn role(is_root: bool) -> Role {
        Role {
            id: RoleId::new(),
            institution_id: InstitutionId::new(),
            name: "Administrator".to_owned(),
            is_root,
            privileges: vec![Privilege::ViewRole, Privilege::EditRole],
        }
    }

    #[test]
    fn root_role_cannot_be_demoted_or_renamed() {
        let root = role(true);

        let demote = RoleChange {
            is_root: Some(false),
            ..RoleChange::default()
        };
        assert_eq!(root.check_change(&demote), Err(Denial::RootRoleModification));

        let rename = RoleChange {
            name: Some("Owner".to_owned()),
            ..RoleChange::default()
        };
        assert_eq!(root.check_change(&rename), Err(Denial::RootRoleModification));
    }

    #[test]
    fn root_role_accepts_identical_values() {
        let root = role(true);
        let change = RoleChange {
            name: Some("Administrator".to_owned()),
            is_root: Some(true),
            privileges: Some(vec![Privilege::EditRole, Privilege::ViewRole]),
        };

        assert_eq!(root.check_change(&change), Ok(()));
    }

    #[test]
    fn root_role_grants_are_frozen() {
        let root = role(true);
        let change = RoleChange {
            privileges: Some(vec![Privilege::ViewRole]),
            ..RoleChange::default()
        };

        assert_eq!(root.check_change(&change), Err(Denial::RootRoleModification));
    }

    #[test]
    fn root_role_cannot_be_deleted() {
        assert_eq!(role(true).check_delete(), Err(Denial::RootRoleModification));
        assert_eq!(role(false).check_delete(), Ok(()));
    }

    #[test]
    fn regular_role_rejects_empty_name_and_grants() {
        let regular = role(false);

        let blank = RoleChange {
            name: Some("  ".to_owned()),
            ..RoleChange::default()
        };
        assert_eq!(regular.check_change(&blank), Err(Denial::EmptyRoleName));

        let no_grants = RoleChange {
            privileges: Some(Vec::new()),
            ..RoleChange::default()
        };
        assert_eq!(
            regular.check_change(&no_grants),
            Err(Denial::EmptyRolePrivileges)
        );
    }
}
