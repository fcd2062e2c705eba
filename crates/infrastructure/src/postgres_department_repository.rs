use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use userhub_application::{DepartmentRepository, InstitutionScope};
use userhub_core::{AppError, AppResult, InstitutionId};
use userhub_domain::{Department, DepartmentId};

use crate::postgres_support::{begin, commit, internal, map_write_error, scope_filter};


/// PostgreSQL-backed department repository.
#[derive(Clone)]
pub struct PostgresDepartmentRepository {
    pool: PgPool,
}

impl PostgresDepartmentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DepartmentRow {
    id: Uuid,
    institution_id: Uuid,
    name: String,
}

impl From<DepartmentRow> for Department {
    fn from(row: DepartmentRow) -> Self {
        Self {
            id: DepartmentId::from_uuid(row.id),
            institution_id: InstitutionId::from_uuid(row.institution_id),
            name: row.name,
        }
    }
}

#[async_trait]
impl DepartmentRepository for PostgresDepartmentRepository {
    async fn list_departments(&self, scope: InstitutionScope) -> AppResult<Vec<Department>> {
        let rows = sqlx::query_as::<_, DepartmentRow>(
            r#"
            SELECT id, institution_id, name
            FROM departments
            WHERE deleted_at IS NULL
                AND ($1::uuid IS NULL OR institution_id = $1)
            ORDER BY name
            "#,
        )
        .bind(scope_filter(scope))
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list departments"))?;

        Ok(rows.into_iter().map(Department::from).collect())
    }

    async fn find_department(
        &self,
        scope: InstitutionScope,
        department_id: DepartmentId,
    ) -> AppResult<Option<Department>> {
        let row = sqlx::query_as::<_, DepartmentRow>(
            r#"
            SELECT id, institution_id, name
            FROM departments
            WHERE id = $1
                AND deleted_at IS NULL
                AND ($2::uuid IS NULL OR institution_id = $2)
            "#,
        )
        .bind(department_id.as_uuid())
        .bind(scope_filter(scope))
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("find department"))?;

        Ok(row.map(Department::from))
    }

    async fn create_department(&self, department: &Department) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO departments (id, institution_id, name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(department.id.as_uuid())
        .bind(department.institution_id.as_uuid())
        .bind(department.name.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "create department",
                &format!("department '{}' already exists", department.name),
            )
        })?;

        Ok(())
    }

    async fn update_department(
        &self,
        scope: InstitutionScope,
        department: &Department,
    ) -> AppResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE departments
            SET name = $2, updated_at = now()
            WHERE id = $1
                AND deleted_at IS NULL
                AND ($3::uuid IS NULL OR institution_id = $3)
            "#,
        )
        .bind(department.id.as_uuid())
        .bind(department.name.as_str())
        .bind(scope_filter(scope))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                "update department",
                &format!("department '{}' already exists", department.name),
            )
        })?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound(format!(
                "department '{}' not found",
                department.id
            )));
        }

        Ok(())
    }

    async fn delete_department(
        &self,
        scope: InstitutionScope,
        department_id: DepartmentId,
    ) -> AppResult<()> {
        let mut transaction = begin(&self.pool).await?;

        let deleted = sqlx::query(
            r#"
            UPDATE departments
            SET deleted_at = now()
            WHERE id = $1
                AND deleted_at IS NULL
                AND ($2::uuid IS NULL OR institution_id = $2)
            "#,
        )
        .bind(department_id.as_uuid())
        .bind(scope_filter(scope))
        .execute(&mut *transaction)
        .await
        .map_err(internal("delete department"))?
        .rows_affected();

        if deleted == 0 {
            return Err(AppError::NotFound(format!(
                "department '{department_id}' not found"
            )));
        }

        sqlx::query(
            r#"
            UPDATE institution_users
            SET department_id = NULL, updated_at = now()
            WHERE department_id = $1
            "#,
        )
        .bind(department_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(internal("detach department members"))?;

        commit(transaction).await
    }
}
