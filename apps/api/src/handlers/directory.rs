use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use userhub_application::CreateRoleInput;
use userhub_domain::{CallerContext, DepartmentId, InstitutionUserId, RoleChange, RoleId};

use crate::dto::{
    CreateInstitutionUserRequest, CreateRoleRequest, DeactivateInstitutionUserRequest,
    DepartmentRequest, DepartmentResponse, InstitutionRequest, InstitutionResponse,
    InstitutionUserResponse, PrivilegeResponse, RoleResponse, UpdateInstitutionUserRequest,
    UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod departments;
mod institution;
mod institution_users;
mod privileges;
mod roles;

pub use departments::{
    create_department_handler, delete_department_handler, get_department_handler,
    list_departments_handler, update_department_handler,
};
pub use institution::{current_institution_handler, update_institution_handler};
pub use institution_users::{
    activate_institution_user_handler, archive_institution_user_handler,
    create_institution_user_handler, deactivate_institution_user_handler,
    get_institution_user_handler, list_institution_users_handler,
    update_institution_user_handler,
};
pub use privileges::list_privileges_handler;
pub use roles::{
    create_role_handler, delete_role_handler, get_role_handler, list_roles_handler,
    update_role_handler,
};
