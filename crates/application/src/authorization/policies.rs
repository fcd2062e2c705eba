use userhub_core::InstitutionId;
use userhub_domain::{
    CallerContext, Department, Institution, InstitutionUser, Privilege, Role,
};

use super::{EntityPolicy, InstitutionScope, PolicyAction, Requirement};

/// Policy for the caller's own institution record.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstitutionPolicy;

impl EntityPolicy for InstitutionPolicy {
    type Entity = Institution;

    const ENTITY_NAME: &'static str = "institution";

    fn requirement(&self, action: PolicyAction) -> Requirement {
        match action {
            PolicyAction::View => Requirement::AnyCaller,
            PolicyAction::Update => Requirement::Privilege(Privilege::EditInstitution),
            _ => Requirement::Unsupported,
        }
    }

    fn owner(&self, entity: &Institution) -> Option<InstitutionId> {
        Some(entity.id)
    }
}

/// Policy for departments.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepartmentPolicy;

impl EntityPolicy for DepartmentPolicy {
    type Entity = Department;

    const ENTITY_NAME: &'static str = "department";

    fn requirement(&self, action: PolicyAction) -> Requirement {
        match action {
            PolicyAction::View => Requirement::AnyCaller,
            PolicyAction::Create => Requirement::Privilege(Privilege::AddDepartment),
            PolicyAction::Update => Requirement::Privilege(Privilege::EditDepartment),
            PolicyAction::Delete => Requirement::Privilege(Privilege::DeleteDepartment),
            _ => Requirement::Unsupported,
        }
    }

    fn owner(&self, entity: &Department) -> Option<InstitutionId> {
        Some(entity.institution_id)
    }
}

/// Policy for roles.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl EntityPolicy for RolePolicy {
    type Entity = Role;

    const ENTITY_NAME: &'static str = "role";

    fn requirement(&self, action: PolicyAction) -> Requirement {
        match action {
            PolicyAction::View => Requirement::Privilege(Privilege::ViewRole),
            PolicyAction::Create => Requirement::Privilege(Privilege::AddRole),
            PolicyAction::Update => Requirement::Privilege(Privilege::EditRole),
            PolicyAction::Delete => Requirement::Privilege(Privilege::DeleteRole),
            _ => Requirement::Unsupported,
        }
    }

    fn owner(&self, entity: &Role) -> Option<InstitutionId> {
        Some(entity.institution_id)
    }
}

/// Policy for institution memberships.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstitutionUserPolicy;

impl EntityPolicy for InstitutionUserPolicy {
    type Entity = InstitutionUser;

    const ENTITY_NAME: &'static str = "institution user";

    fn requirement(&self, action: PolicyAction) -> Requirement {
        let privilege = match action {
            PolicyAction::View => Privilege::ViewUser,
            PolicyAction::Create | PolicyAction::Import => Privilege::AddUser,
            PolicyAction::Update => Privilege::EditUser,
            PolicyAction::Delete => return Requirement::Unsupported,
            PolicyAction::Activate => Privilege::ActivateUser,
            PolicyAction::Deactivate => Privilege::DeactivateUser,
            PolicyAction::Archive => Privilege::ArchiveUser,
        };

        Requirement::Privilege(privilege)
    }

    fn owner(&self, entity: &InstitutionUser) -> Option<InstitutionId> {
        Some(entity.institution_id)
    }
}

/// Policy for the global privilege catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivilegePolicy;

impl EntityPolicy for PrivilegePolicy {
    type Entity = Privilege;

    const ENTITY_NAME: &'static str = "privilege";

    fn requirement(&self, action: PolicyAction) -> Requirement {
        match action {
            PolicyAction::View => Requirement::AnyCaller,
            _ => Requirement::Unsupported,
        }
    }

    fn owner(&self, _entity: &Privilege) -> Option<InstitutionId> {
        None
    }

    fn scope(&self, _context: &CallerContext) -> InstitutionScope {
        InstitutionScope::Global
    }
}
