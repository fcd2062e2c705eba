
use std::collections::BTreeSet;
use std::sync::Arc;

use userhub_core::{AppError, AppResult, Denial};
use userhub_domain::{
    CallerContext, ChangeKind, EntityEvent, EntityKind, Privilege, Role, RoleChange, RoleId,
};

use crate::{EntityEventService, EntityPolicy, PolicyAction, RolePolicy, RoleRepository, authorize};

/// Input for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Name, unique inside the institution.
    pub name: String,
    /// Granted privileges, at least one.
    pub privileges: Vec<Privilege>,
}

/// Application service for roles.
#[derive(Clone)]
pub struct RoleService {
    repository: Arc<dyn RoleRepository>,
    events: EntityEventService,
}

impl RoleService {
    /// Creates a service from dependencies.
    #[must_use]
    pub fn new(repository: Arc<dyn RoleRepository>, events: EntityEventService) -> Self {
        Self { repository, events }
    }

    /// Lists roles of the caller's institution.
    pub async fn list(&self, context: &CallerContext) -> AppResult<Vec<Role>> {
        authorize(&RolePolicy, PolicyAction::View, context, None)?;
        self.repository.list_roles(RolePolicy.scope(context)).await
    }

    /// Returns one role.
    pub async fn get(&self, context: &CallerContext, role_id: RoleId) -> AppResult<Role> {
        let role = self.find(context, role_id).await?;
        authorize(&RolePolicy, PolicyAction::View, context, Some(&role))?;
        Ok(role)
    }

    /// Creates a non-root role.
    pub async fn create(&self, context: &CallerContext, input: CreateRoleInput) -> AppResult<Role> {
        authorize(&RolePolicy, PolicyAction::Create, context, None)?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(Denial::EmptyRoleName.into());
        }
        if input.privileges.is_empty() {
            return Err(Denial::EmptyRolePrivileges.into());
        }

        let role = Role {
            id: RoleId::new(),
            institution_id: context.institution_id(),
            name: name.to_owned(),
            is_root: false,
            privileges: distinct(input.privileges),
        };
        self.repository.create_role(&role).await?;

        self.events
            .dispatch([EntityEvent::new(
                EntityKind::Role,
                ChangeKind::Created,
                role.id.as_uuid(),
            )])
            .await;

        Ok(role)
    }

    /// Applies a partial change. Root roles accept only no-op changes.
    pub async fn update(
        &self,
        context: &CallerContext,
        role_id: RoleId,
        change: RoleChange,
    ) -> AppResult<Role> {
        let role = self.find(context, role_id).await?;
        authorize(&RolePolicy, PolicyAction::Update, context, Some(&role))?;

        role.check_change(&change)?;
        if !role.is_root && change.is_root == Some(true) {
            return Err(AppError::Validation(
                "a role cannot be promoted to the root role".to_owned(),
            ));
        }

        let updated = Role {
            name: change
                .name
                .map(|name| name.trim().to_owned())
                .unwrap_or_else(|| role.name.clone()),
            privileges: change
                .privileges
                .map(distinct)
                .unwrap_or_else(|| role.privileges.clone()),
            ..role
        };
        self.repository
            .update_role(RolePolicy.scope(context), &updated)
            .await?;

        self.events
            .dispatch([EntityEvent::new(
                EntityKind::Role,
                ChangeKind::Saved,
                updated.id.as_uuid(),
            )])
            .await;

        Ok(updated)
    }

    /// Soft deletes a non-root role and revokes it from its holders.
    pub async fn delete(&self, context: &CallerContext, role_id: RoleId) -> AppResult<()> {
        let role = self.find(context, role_id).await?;
        authorize(&RolePolicy, PolicyAction::Delete, context, Some(&role))?;
        role.check_delete()?;

        self.repository
            .delete_role(RolePolicy.scope(context), role.id)
            .await?;

        self.events
            .dispatch([EntityEvent::new(
                EntityKind::Role,
                ChangeKind::Deleted,
                role.id.as_uuid(),
            )])
            .await;

        Ok(())
    }

    async fn find(&self, context: &CallerContext, role_id: RoleId) -> AppResult<Role> {
        self.repository
            .find_role(RolePolicy.scope(context), role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' not found")))
    }
}

fn distinct(privileges: Vec<Privilege>) -> Vec<Privilege> {
    privileges
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
