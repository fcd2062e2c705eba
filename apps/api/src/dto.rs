mod common;
mod directory;
mod import;

pub use common::{HealthDependencyStatus, HealthResponse};
pub use directory::{
    AdministratorRequest, BootstrapRequest, BootstrapResponse, CreateInstitutionUserRequest,
    CreateRoleRequest, DeactivateInstitutionUserRequest, DepartmentRequest, DepartmentResponse,
    InstitutionRequest, InstitutionResponse, InstitutionUserResponse, JwtClaimsRequest,
    PrivilegeResponse, RoleResponse, UpdateInstitutionUserRequest, UpdateRoleRequest,
};
pub use import::{
    FileValidationResponse, ImportInterruptedResponse, ImportRejectedResponse, ImportResponse,
    RowErrorsResponse, ValidateRowRequest, ValidateRowResponse,
};
