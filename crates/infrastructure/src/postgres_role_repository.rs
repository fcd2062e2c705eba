use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use userhub_application::{InstitutionScope, RoleRepository};
use userhub_core::{AppError, AppResult, InstitutionId};
use userhub_domain::{Privilege, Role, RoleId};

use crate::postgres_support::{begin, commit, internal, map_write_error, scope_filter};

#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for roles and their privilege grants.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: Uuid,
    institution_id: Uuid,
    name: String,
    is_root: bool,
    privilege_key: Option<String>,
}

#[derive(Debug, Default)]
struct RoleFilter {
    institution_id: Option<Uuid>,
    role_ids: Option<Vec<Uuid>>,
    names: Option<Vec<String>>,
}

impl RoleFilter {
    fn scoped(scope: InstitutionScope) -> Self {
        Self {
            institution_id: scope_filter(scope),
            ..Self::default()
        }
    }
}

async fn fetch_roles(pool: &PgPool, filter: RoleFilter) -> AppResult<Vec<Role>> {
    let rows = sqlx::query_as::<_, RoleRow>(
        r#"
        SELECT
            roles.id,
            roles.institution_id,
            roles.name,
            roles.is_root,
            grants.privilege_key
        FROM roles
        LEFT JOIN privilege_roles AS grants
            ON grants.role_id = roles.id
        WHERE roles.deleted_at IS NULL
            AND ($1::uuid IS NULL OR roles.institution_id = $1)
            AND ($2::uuid[] IS NULL OR roles.id = ANY($2))
            AND ($3::text[] IS NULL OR roles.name = ANY($3))
        ORDER BY roles.name, roles.id, grants.privilege_key
        "#,
    )
    .bind(filter.institution_id)
    .bind(filter.role_ids)
    .bind(filter.names)
    .fetch_all(pool)
    .await
    .map_err(internal("list roles"))?;

    aggregate_roles(rows)
}

fn aggregate_roles(rows: Vec<RoleRow>) -> AppResult<Vec<Role>> {
    let mut roles: Vec<Role> = Vec::new();

    for row in rows {
        let role_id = RoleId::from_uuid(row.id);
        if roles.last().is_none_or(|role| role.id != role_id) {
            roles.push(Role {
                id: role_id,
                institution_id: InstitutionId::from_uuid(row.institution_id),
                name: row.name,
                is_root: row.is_root,
                privileges: Vec::new(),
            });
        }

        if let (Some(key), Some(role)) = (row.privilege_key, roles.last_mut()) {
            let privilege = Privilege::from_str(key.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "invalid stored privilege '{key}' for role '{role_id}': {error}"
                ))
            })?;
            role.privileges.push(privilege);
        }
    }

    Ok(roles)
}

/// Replaces the grants of a role inside a transaction.
pub(crate) async fn replace_grants(
    connection: &mut PgConnection,
    role_id: RoleId,
    privileges: &[Privilege],
) -> AppResult<()> {
    sqlx::query("DELETE FROM privilege_roles WHERE role_id = $1")
        .bind(role_id.as_uuid())
        .execute(&mut *connection)
        .await
        .map_err(internal("clear role grants"))?;

    let keys = privileges
        .iter()
        .map(|privilege| privilege.as_str().to_owned())
        .collect::<Vec<_>>();

    sqlx::query(
        r#"
        INSERT INTO privilege_roles (privilege_key, role_id)
        SELECT DISTINCT key, $2
        FROM UNNEST($1::text[]) AS key
        "#,
    )
    .bind(keys)
    .bind(role_id.as_uuid())
    .execute(&mut *connection)
    .await
    .map_err(internal("persist role grants"))?;

    Ok(())
}

/// Inserts a role row with its grants inside a transaction.
pub(crate) async fn insert_role(connection: &mut PgConnection, role: &Role) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO roles (id, institution_id, name, is_root)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(role.id.as_uuid())
    .bind(role.institution_id.as_uuid())
    .bind(role.name.as_str())
    .bind(role.is_root)
    .execute(&mut *connection)
    .await
    .map_err(|error| {
        map_write_error(
            error,
            "create role",
            &format!("role '{}' already exists", role.name),
        )
    })?;

    replace_grants(connection, role.id, &role.privileges).await
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self, scope: InstitutionScope) -> AppResult<Vec<Role>> {
        fetch_roles(&self.pool, RoleFilter::scoped(scope)).await
    }

    async fn find_role(&self, scope: InstitutionScope, role_id: RoleId) -> AppResult<Option<Role>> {
        let roles = fetch_roles(
            &self.pool,
            RoleFilter {
                role_ids: Some(vec![role_id.as_uuid()]),
                ..RoleFilter::scoped(scope)
            },
        )
        .await?;

        Ok(roles.into_iter().next())
    }

    async fn find_roles_by_ids(
        &self,
        scope: InstitutionScope,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<Role>> {
        fetch_roles(
            &self.pool,
            RoleFilter {
                role_ids: Some(role_ids.iter().map(RoleId::as_uuid).collect()),
                ..RoleFilter::scoped(scope)
            },
        )
        .await
    }

    async fn find_roles_by_names(
        &self,
        scope: InstitutionScope,
        names: &[String],
    ) -> AppResult<Vec<Role>> {
        fetch_roles(
            &self.pool,
            RoleFilter {
                names: Some(names.to_vec()),
                ..RoleFilter::scoped(scope)
            },
        )
        .await
    }

    async fn create_role(&self, role: &Role) -> AppResult<()> {
        let mut transaction = begin(&self.pool).await?;
        insert_role(&mut transaction, role).await?;
        commit(transaction).await
    }

    async fn update_role(&self, scope: InstitutionScope, role: &Role) -> AppResult<()> {
        let mut transaction = begin(&self.pool).await?;

        let updated = sqlx::query(
            r#"
            UPDATE roles
            SET name = $2, is_root = $3, updated_at = now()
            WHERE id = $1
                AND deleted_at IS NULL
                AND ($4::uuid IS NULL OR institution_id = $4)
            "#,
        )
        .bind(role.id.as_uuid())
        .bind(role.name.as_str())
        .bind(role.is_root)
        .bind(scope_filter(scope))
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "update role",
                &format!("role '{}' already exists", role.name),
            )
        })?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound(format!("role '{}' not found", role.id)));
        }

        replace_grants(&mut transaction, role.id, &role.privileges).await?;
        commit(transaction).await
    }

    async fn delete_role(&self, scope: InstitutionScope, role_id: RoleId) -> AppResult<()> {
        let mut transaction = begin(&self.pool).await?;

        let deleted = sqlx::query(
            r#"
            UPDATE roles
            SET deleted_at = now()
            WHERE id = $1
                AND deleted_at IS NULL
                AND ($2::uuid IS NULL OR institution_id = $2)
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(scope_filter(scope))
        .execute(&mut *transaction)
        .await
        .map_err(internal("delete role"))?
        .rows_affected();

        if deleted == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' not found")));
        }

        sqlx::query(
            r#"
            UPDATE institution_user_roles
            SET deleted_at = now()
            WHERE role_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(internal("revoke deleted role"))?;

        commit(transaction).await
    }
}
