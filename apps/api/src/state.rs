use std::sync::Arc;

use sqlx::PgPool;
use userhub_application::{
    ClaimsService, DepartmentService, InstitutionService, InstitutionUserService,
    PrivilegeService, RoleService, UserImportService,
};

use crate::auth::TokenVerifier;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub institution_service: InstitutionService,
    pub department_service: DepartmentService,
    pub role_service: RoleService,
    pub privilege_service: PrivilegeService,
    pub institution_user_service: InstitutionUserService,
    pub user_import_service: UserImportService,
    pub claims_service: ClaimsService,
    pub token_verifier: Arc<TokenVerifier>,
    pub bootstrap_token: String,
    pub claims_shared_secret: String,
    pub postgres_pool: PgPool,
    pub redis_client: Option<redis::Client>,
}
