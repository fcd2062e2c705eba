use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};

use userhub_application::{
    InstitutionScope, InstitutionUserRepository, MembershipInput, MembershipUpdate,
    MembershipWrite,
};
use userhub_core::{AppError, AppResult, InstitutionId};
use userhub_domain::{InstitutionUser, InstitutionUserId};

use crate::postgres_support::{begin, commit, internal, scope_filter};

mod rows;
mod sync;

#[cfg(test)]
mod tests;

pub(crate) use rows::{MembershipFilter, UserRow, fetch_memberships, stored};
pub(crate) use sync::upsert_membership_in;

/// PostgreSQL-backed repository for institution memberships and role attachments.
#[derive(Clone)]
pub struct PostgresInstitutionUserRepository {
    pool: PgPool,
}

impl PostgresInstitutionUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Locks a live membership inside the scope and returns its institution.
async fn lock_membership(
    connection: &mut PgConnection,
    scope: InstitutionScope,
    institution_user_id: InstitutionUserId,
) -> AppResult<InstitutionId> {
    sqlx::query_scalar::<_, uuid::Uuid>(
        r#"
        SELECT institution_id
        FROM institution_users
        WHERE id = $1
            AND deleted_at IS NULL
            AND ($2::uuid IS NULL OR institution_id = $2)
        FOR UPDATE
        "#,
    )
    .bind(institution_user_id.as_uuid())
    .bind(scope_filter(scope))
    .fetch_optional(&mut *connection)
    .await
    .map_err(internal("lock institution user"))?
    .map(InstitutionId::from_uuid)
    .ok_or_else(|| {
        AppError::NotFound(format!(
            "institution user '{institution_user_id}' not found"
        ))
    })
}

#[async_trait]
impl InstitutionUserRepository for PostgresInstitutionUserRepository {
    async fn list_institution_users(
        &self,
        scope: InstitutionScope,
    ) -> AppResult<Vec<InstitutionUser>> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(internal("acquire connection"))?;

        fetch_memberships(
            &mut connection,
            MembershipFilter {
                institution_id: scope_filter(scope),
                ..MembershipFilter::default()
            },
        )
        .await
    }

    async fn find_institution_user(
        &self,
        scope: InstitutionScope,
        institution_user_id: InstitutionUserId,
    ) -> AppResult<Option<InstitutionUser>> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(internal("acquire connection"))?;

        let memberships = fetch_memberships(
            &mut connection,
            MembershipFilter {
                institution_id: scope_filter(scope),
                institution_user_id: Some(institution_user_id.as_uuid()),
                ..MembershipFilter::default()
            },
        )
        .await?;

        Ok(memberships.into_iter().next())
    }

    async fn upsert_membership(
        &self,
        institution_id: InstitutionId,
        input: MembershipInput,
    ) -> AppResult<MembershipWrite> {
        let mut transaction = begin(&self.pool).await?;
        let write = upsert_membership_in(&mut transaction, institution_id, input).await?;
        commit(transaction).await?;

        Ok(write)
    }

    async fn update_institution_user(
        &self,
        scope: InstitutionScope,
        institution_user_id: InstitutionUserId,
        update: MembershipUpdate,
    ) -> AppResult<InstitutionUser> {
        let mut transaction = begin(&self.pool).await?;
        let institution_id = lock_membership(&mut transaction, scope, institution_user_id).await?;

        sqlx::query(
            r#"
            UPDATE institution_users
            SET email = CASE WHEN $2 THEN $3 ELSE email END,
                phone = CASE WHEN $4 THEN $5 ELSE phone END,
                department_id = CASE WHEN $6 THEN $7 ELSE department_id END,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(institution_user_id.as_uuid())
        .bind(update.email.is_some())
        .bind(update.email.flatten().map(String::from))
        .bind(update.phone.is_some())
        .bind(update.phone.flatten().map(String::from))
        .bind(update.department_id.is_some())
        .bind(
            update
                .department_id
                .flatten()
                .map(|department_id| department_id.as_uuid()),
        )
        .execute(&mut *transaction)
        .await
        .map_err(internal("update institution user"))?;

        if let Some(role_ids) = &update.role_ids {
            sync::sync_roles(&mut transaction, institution_id, institution_user_id, role_ids)
                .await?;
        }

        let institution_user = rows::fetch_membership(&mut transaction, institution_user_id).await?;
        commit(transaction).await?;

        Ok(institution_user)
    }

    async fn set_deactivation_date(
        &self,
        scope: InstitutionScope,
        institution_user_id: InstitutionUserId,
        deactivation_date: Option<NaiveDate>,
    ) -> AppResult<InstitutionUser> {
        let mut transaction = begin(&self.pool).await?;
        lock_membership(&mut transaction, scope, institution_user_id).await?;

        sqlx::query(
            r#"
            UPDATE institution_users
            SET deactivation_date = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(institution_user_id.as_uuid())
        .bind(deactivation_date)
        .execute(&mut *transaction)
        .await
        .map_err(internal("set deactivation date"))?;

        let institution_user = rows::fetch_membership(&mut transaction, institution_user_id).await?;
        commit(transaction).await?;

        Ok(institution_user)
    }

    async fn archive_institution_user(
        &self,
        scope: InstitutionScope,
        institution_user_id: InstitutionUserId,
        archived_at: DateTime<Utc>,
    ) -> AppResult<InstitutionUser> {
        let mut transaction = begin(&self.pool).await?;
        let institution_id = lock_membership(&mut transaction, scope, institution_user_id).await?;

        sync::sync_roles(&mut transaction, institution_id, institution_user_id, &[]).await?;

        sqlx::query(
            r#"
            UPDATE institution_users
            SET archived_at = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(institution_user_id.as_uuid())
        .bind(archived_at)
        .execute(&mut *transaction)
        .await
        .map_err(internal("archive institution user"))?;

        let institution_user = rows::fetch_membership(&mut transaction, institution_user_id).await?;
        commit(transaction).await?;

        Ok(institution_user)
    }
}
