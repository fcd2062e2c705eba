use chrono::Utc;
use userhub_application::{
    AdministratorInput, BootstrapOutcome, CreateInstitutionUserInput, CreateRoleInput,
    InstitutionDetailsInput, UpdateInstitutionUserInput,
};
use userhub_core::{AppError, AppResult};
use userhub_domain::{
    Department, DepartmentId, Institution, InstitutionUser, Privilege, Role, RoleChange, RoleId,
    RoleSummary, User,
};

use super::types::{
    AdministratorRequest, BootstrapResponse, CreateInstitutionUserRequest, CreateRoleRequest,
    DepartmentResponse, InstitutionRequest, InstitutionResponse, InstitutionUserResponse,
    PrivilegeResponse, RoleResponse, RoleSummaryResponse, UpdateInstitutionUserRequest,
    UpdateRoleRequest, UserResponse,
};

fn parse_privileges(keys: &[String]) -> AppResult<Vec<Privilege>> {
    keys.iter()
        .map(|key| Privilege::from_transport(key.as_str()))
        .collect()
}

impl From<InstitutionRequest> for InstitutionDetailsInput {
    fn from(value: InstitutionRequest) -> Self {
        Self {
            name: value.name,
            short_name: value.short_name,
            email: value.email,
            phone: value.phone,
            logo_url: value.logo_url,
        }
    }
}

impl From<AdministratorRequest> for AdministratorInput {
    fn from(value: AdministratorRequest) -> Self {
        Self {
            personal_identification_code: value.personal_identification_code,
            name: value.name,
            email: value.email,
            phone: value.phone,
        }
    }
}

impl TryFrom<CreateRoleRequest> for CreateRoleInput {
    type Error = AppError;

    fn try_from(value: CreateRoleRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            privileges: parse_privileges(&value.privileges)?,
            name: value.name,
        })
    }
}

impl TryFrom<UpdateRoleRequest> for RoleChange {
    type Error = AppError;

    fn try_from(value: UpdateRoleRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name,
            is_root: value.is_root,
            privileges: value
                .privileges
                .as_deref()
                .map(parse_privileges)
                .transpose()?,
        })
    }
}

impl From<CreateInstitutionUserRequest> for CreateInstitutionUserInput {
    fn from(value: CreateInstitutionUserRequest) -> Self {
        Self {
            personal_identification_code: value.personal_identification_code,
            forename: value.forename,
            surname: value.surname,
            email: value.email,
            phone: value.phone,
            department_id: value.department_id.map(DepartmentId::from_uuid),
            role_ids: value.role_ids.into_iter().map(RoleId::from_uuid).collect(),
        }
    }
}

impl From<UpdateInstitutionUserRequest> for UpdateInstitutionUserInput {
    fn from(value: UpdateInstitutionUserRequest) -> Self {
        Self {
            email: value.email,
            phone: value.phone,
            department_id: value
                .department_id
                .map(|department_id| department_id.map(DepartmentId::from_uuid)),
            role_ids: value
                .role_ids
                .map(|role_ids| role_ids.into_iter().map(RoleId::from_uuid).collect()),
        }
    }
}

impl From<Institution> for InstitutionResponse {
    fn from(value: Institution) -> Self {
        Self {
            id: value.id.as_uuid(),
            name: value.name,
            short_name: value.short_name,
            email: value.email.map(|email| email.as_str().to_owned()),
            phone: value.phone.map(|phone| phone.as_str().to_owned()),
            logo_url: value.logo_url,
        }
    }
}

impl From<Department> for DepartmentResponse {
    fn from(value: Department) -> Self {
        Self {
            id: value.id.as_uuid(),
            institution_id: value.institution_id.as_uuid(),
            name: value.name,
        }
    }
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            id: value.id.as_uuid(),
            institution_id: value.institution_id.as_uuid(),
            name: value.name,
            is_root: value.is_root,
            privileges: value
                .privileges
                .into_iter()
                .map(|privilege| privilege.as_str().to_owned())
                .collect(),
        }
    }
}

impl From<RoleSummary> for RoleSummaryResponse {
    fn from(value: RoleSummary) -> Self {
        Self {
            id: value.id.as_uuid(),
            name: value.name,
            is_root: value.is_root,
        }
    }
}

impl From<Privilege> for PrivilegeResponse {
    fn from(value: Privilege) -> Self {
        Self {
            key: value.as_str(),
        }
    }
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id.as_uuid(),
            personal_identification_code: value.personal_identification_code.as_str().to_owned(),
            forename: value.forename,
            surname: value.surname,
        }
    }
}

impl From<InstitutionUser> for InstitutionUserResponse {
    fn from(value: InstitutionUser) -> Self {
        let active = value.is_active_on(Utc::now().date_naive());

        Self {
            id: value.id.as_uuid(),
            institution_id: value.institution_id.as_uuid(),
            user: UserResponse::from(value.user),
            email: value.email.map(|email| email.as_str().to_owned()),
            phone: value.phone.map(|phone| phone.as_str().to_owned()),
            department_id: value.department_id.map(|department_id| department_id.as_uuid()),
            deactivation_date: value.deactivation_date,
            archived_at: value.archived_at,
            active,
            roles: value
                .roles
                .into_iter()
                .map(RoleSummaryResponse::from)
                .collect(),
        }
    }
}

impl From<BootstrapOutcome> for BootstrapResponse {
    fn from(value: BootstrapOutcome) -> Self {
        Self {
            institution: InstitutionResponse::from(value.institution),
            root_role: RoleResponse::from(value.root_role),
            administrator: InstitutionUserResponse::from(value.administrator),
        }
    }
}
