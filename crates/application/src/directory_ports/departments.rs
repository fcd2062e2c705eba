use async_trait::async_trait;

use userhub_core::AppResult;
use userhub_domain::{Department, DepartmentId};

use crate::InstitutionScope;

/// Repository port for departments.
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// Lists live departments inside the scope, ordered by name.
    async fn list_departments(&self, scope: InstitutionScope) -> AppResult<Vec<Department>>;

    /// Finds a live department inside the scope.
    async fn find_department(
        &self,
        scope: InstitutionScope,
        department_id: DepartmentId,
    ) -> AppResult<Option<Department>>;

    /// Inserts a department. Duplicate live names are a conflict.
    async fn create_department(&self, department: &Department) -> AppResult<()>;

    /// Renames a live department inside the scope.
    async fn update_department(
        &self,
        scope: InstitutionScope,
        department: &Department,
    ) -> AppResult<()>;

    /// Soft deletes a department and detaches its members.
    async fn delete_department(
        &self,
        scope: InstitutionScope,
        department_id: DepartmentId,
    ) -> AppResult<()>;
}
