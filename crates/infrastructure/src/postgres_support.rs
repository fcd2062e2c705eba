use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use userhub_application::InstitutionScope;
use userhub_core::{AppError, AppResult};

const UNIQUE_VIOLATION: &str = "23505";

/// Binds a scope as a nullable institution filter: `($n::uuid IS NULL OR institution_id = $n)`.
pub(crate) fn scope_filter(scope: InstitutionScope) -> Option<Uuid> {
    scope
        .institution_id()
        .map(|institution_id| institution_id.as_uuid())
}

pub(crate) async fn begin(pool: &PgPool) -> AppResult<Transaction<'static, Postgres>> {
    pool.begin()
        .await
        .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
}

pub(crate) async fn commit(transaction: Transaction<'_, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
}

/// Maps a unique violation to `Conflict` and everything else to `Internal`.
pub(crate) fn map_write_error(error: sqlx::Error, action: &str, conflict: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some(UNIQUE_VIOLATION)
    {
        return AppError::Conflict(conflict.to_owned());
    }

    AppError::Internal(format!("failed to {action}: {error}"))
}

pub(crate) fn internal(action: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |error| AppError::Internal(format!("failed to {action}: {error}"))
}
