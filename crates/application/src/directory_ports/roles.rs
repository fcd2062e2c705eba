use async_trait::async_trait;

use userhub_core::AppResult;
use userhub_domain::{Role, RoleId};

use crate::InstitutionScope;

/// Repository port for roles and their privilege grants.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists live roles inside the scope with their grants, ordered by name.
    async fn list_roles(&self, scope: InstitutionScope) -> AppResult<Vec<Role>>;

    /// Finds a live role inside the scope.
    async fn find_role(&self, scope: InstitutionScope, role_id: RoleId)
    -> AppResult<Option<Role>>;

    /// Finds the live roles inside the scope among the given identifiers.
    async fn find_roles_by_ids(
        &self,
        scope: InstitutionScope,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<Role>>;

    /// Finds the live roles inside the scope among the given names.
    async fn find_roles_by_names(
        &self,
        scope: InstitutionScope,
        names: &[String],
    ) -> AppResult<Vec<Role>>;

    /// Inserts a role with its grants.
    async fn create_role(&self, role: &Role) -> AppResult<()>;

    /// Saves name, root flag and grants of a live role inside the scope.
    async fn update_role(&self, scope: InstitutionScope, role: &Role) -> AppResult<()>;

    /// Soft deletes a role together with its user attachments.
    async fn delete_role(&self, scope: InstitutionScope, role_id: RoleId) -> AppResult<()>;
}
