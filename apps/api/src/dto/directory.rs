mod conversions;
mod types;

pub use types::{
    AdministratorRequest, BootstrapRequest, BootstrapResponse, CreateInstitutionUserRequest,
    CreateRoleRequest, DeactivateInstitutionUserRequest, DepartmentRequest, DepartmentResponse,
    InstitutionRequest, InstitutionResponse, InstitutionUserResponse, JwtClaimsRequest,
    PrivilegeResponse, RoleResponse, UpdateInstitutionUserRequest, UpdateRoleRequest,
};
