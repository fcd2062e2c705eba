//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization;
mod claims_service;
pub mod csv_import;
mod department_service;
mod directory_ports;
mod entity_event_service;
mod institution_service;
mod institution_user_service;
mod privilege_service;
mod role_service;
mod user_import_service;

#[cfg(test)]
mod test_support;

pub use authorization::{
    DepartmentPolicy, EntityPolicy, InstitutionPolicy, InstitutionScope, InstitutionUserPolicy,
    PolicyAction, PrivilegePolicy, Requirement, RolePolicy, authorize,
};
pub use claims_service::ClaimsService;
pub use department_service::DepartmentService;
pub use directory_ports::{
    BootstrapInstitutionInput, BootstrapOutcome, DepartmentRepository, IdentityClaimsRepository,
    InstitutionRepository, InstitutionUpdate, InstitutionUserRepository, MembershipGrants,
    MembershipInput, MembershipUpdate, MembershipWrite, RoleRepository,
};
pub use entity_event_service::{EntityEventPublisher, EntityEventService};
pub use institution_service::{AdministratorInput, InstitutionDetailsInput, InstitutionService};
pub use institution_user_service::{
    CreateInstitutionUserInput, InstitutionUserService, UpdateInstitutionUserInput,
};
pub use privilege_service::PrivilegeService;
pub use role_service::{CreateRoleInput, RoleService};
pub use user_import_service::{
    FileValidation, ImportOutcome, USER_IMPORT_ATTRIBUTES, USER_IMPORT_HEADERS,
    UserImportService,
};
