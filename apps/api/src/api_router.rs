use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use userhub_core::AppError;

use crate::handlers::{bootstrap, claims, directory, health, import};
use crate::middleware;
use crate::state::AppState;

mod cors;


pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    Ok(routes(app_state).layer(cors::build_cors_layer(frontend_url)?))
}

fn routes(app_state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/privileges", get(directory::list_privileges_handler))
        .route(
            "/api/institution",
            get(directory::current_institution_handler).put(directory::update_institution_handler),
        )
        .route(
            "/api/departments",
            get(directory::list_departments_handler).post(directory::create_department_handler),
        )
        .route(
            "/api/departments/{department_id}",
            get(directory::get_department_handler)
                .put(directory::update_department_handler)
                .delete(directory::delete_department_handler),
        )
        .route(
            "/api/roles",
            get(directory::list_roles_handler).post(directory::create_role_handler),
        )
        .route(
            "/api/roles/{role_id}",
            get(directory::get_role_handler)
                .put(directory::update_role_handler)
                .delete(directory::delete_role_handler),
        )
        .route(
            "/api/institution-users",
            get(directory::list_institution_users_handler)
                .post(directory::create_institution_user_handler),
        )
        .route(
            "/api/institution-users/{institution_user_id}",
            get(directory::get_institution_user_handler)
                .put(directory::update_institution_user_handler),
        )
        .route(
            "/api/institution-users/{institution_user_id}/deactivate",
            post(directory::deactivate_institution_user_handler),
        )
        .route(
            "/api/institution-users/{institution_user_id}/activate",
            post(directory::activate_institution_user_handler),
        )
        .route(
            "/api/institution-users/{institution_user_id}/archive",
            post(directory::archive_institution_user_handler),
        )
        .route(
            "/api/institution-users/import",
            post(import::import_handler),
        )
        .route(
            "/api/institution-users/import/validate-file",
            post(import::validate_file_handler),
        )
        .route(
            "/api/institution-users/import/validate-row",
            post(import::validate_row_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    let identity_provider_routes = Router::new()
        .route("/internal/jwt-claims", post(claims::jwt_claims_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_claims_secret,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/bootstrap", post(bootstrap::bootstrap_handler))
        .merge(identity_provider_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
