use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;

use userhub_application::{IdentityClaimsRepository, MembershipGrants};
use userhub_core::{AppError, AppResult, InstitutionId};
use userhub_domain::{PersonalIdentificationCode, Privilege, User, UserId};

use crate::postgres_institution_user_repository::{MembershipFilter, UserRow, fetch_memberships};
use crate::postgres_support::internal;

/// PostgreSQL-backed lookups for identity-provider claims.
#[derive(Clone)]
pub struct PostgresIdentityClaimsRepository {
    pool: PgPool,
}

impl PostgresIdentityClaimsRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityClaimsRepository for PostgresIdentityClaimsRepository {
    async fn find_user_by_personal_code(
        &self,
        code: &PersonalIdentificationCode,
    ) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, personal_identification_code, forename, surname
            FROM users
            WHERE personal_identification_code = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("find user"))?
        .map(UserRow::into_user)
        .transpose()
    }

    async fn find_membership_grants(
        &self,
        user_id: UserId,
        institution_id: InstitutionId,
    ) -> AppResult<Option<MembershipGrants>> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(internal("acquire connection"))?;

        let Some(membership) = fetch_memberships(
            &mut connection,
            MembershipFilter {
                institution_id: Some(institution_id.as_uuid()),
                user_id: Some(user_id.as_uuid()),
                ..MembershipFilter::default()
            },
        )
        .await?
        .into_iter()
        .next() else {
            return Ok(None);
        };

        let institution_name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM institutions WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(institution_id.as_uuid())
        .fetch_optional(&mut *connection)
        .await
        .map_err(internal("find institution"))?
        .ok_or_else(|| AppError::NotFound(format!("institution '{institution_id}' not found")))?;

        let keys = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT grants.privilege_key
            FROM institution_user_roles AS attachments
            INNER JOIN roles
                ON roles.id = attachments.role_id
            INNER JOIN privilege_roles AS grants
                ON grants.role_id = roles.id
            WHERE attachments.institution_user_id = $1
                AND attachments.deleted_at IS NULL
                AND roles.deleted_at IS NULL
            ORDER BY grants.privilege_key
            "#,
        )
        .bind(membership.id.as_uuid())
        .fetch_all(&mut *connection)
        .await
        .map_err(internal("list membership privileges"))?;

        let privileges = keys
            .iter()
            .map(|key| {
                Privilege::from_str(key).map_err(|error| {
                    AppError::Internal(format!("invalid stored privilege '{key}': {error}"))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Some(MembershipGrants {
            institution_name,
            membership,
            privileges,
        }))
    }
}
