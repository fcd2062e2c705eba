use std::sync::Arc;

use sqlx::PgPool;
use userhub_application::{
    ClaimsService, DepartmentService, EntityEventService, InstitutionService,
    InstitutionUserService, PrivilegeService, RoleService, UserImportService,
};
use userhub_core::AppError;
use userhub_infrastructure::{
    PostgresDepartmentRepository, PostgresIdentityClaimsRepository,
    PostgresInstitutionRepository, PostgresInstitutionUserRepository, PostgresRoleRepository,
};

use crate::api_config::ApiConfig;
use crate::auth::TokenVerifier;
use crate::state::AppState;

use super::events::build_event_publisher;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let events = build_event_publisher(config)?;
    let event_service = EntityEventService::new(events.publisher);

    let institution_repository = Arc::new(PostgresInstitutionRepository::new(pool.clone()));
    let department_repository = Arc::new(PostgresDepartmentRepository::new(pool.clone()));
    let role_repository = Arc::new(PostgresRoleRepository::new(pool.clone()));
    let institution_user_repository =
        Arc::new(PostgresInstitutionUserRepository::new(pool.clone()));
    let claims_repository = Arc::new(PostgresIdentityClaimsRepository::new(pool.clone()));

    let token_verifier = TokenVerifier::new(
        &config.token_key,
        config.jwt_audience.as_deref(),
        config.jwt_issuer.as_deref(),
    )?;

    Ok(AppState {
        institution_service: InstitutionService::new(
            institution_repository,
            event_service.clone(),
        ),
        department_service: DepartmentService::new(
            department_repository.clone(),
            event_service.clone(),
        ),
        role_service: RoleService::new(role_repository.clone(), event_service.clone()),
        privilege_service: PrivilegeService,
        institution_user_service: InstitutionUserService::new(
            institution_user_repository.clone(),
            role_repository.clone(),
            department_repository,
            event_service.clone(),
        ),
        user_import_service: UserImportService::new(
            institution_user_repository,
            role_repository,
            event_service,
        ),
        claims_service: ClaimsService::new(claims_repository),
        token_verifier: Arc::new(token_verifier),
        bootstrap_token: config.bootstrap_token.clone(),
        claims_shared_secret: config.claims_shared_secret.clone(),
        postgres_pool: pool,
        redis_client: events.redis_client,
    })
}
