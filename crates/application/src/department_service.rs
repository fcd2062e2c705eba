use std::sync::Arc;

use userhub_core::{AppError, AppResult, NonEmptyString};
use userhub_domain::{CallerContext, ChangeKind, Department, DepartmentId, EntityEvent, EntityKind};

use crate::{
    DepartmentPolicy, DepartmentRepository, EntityEventService, EntityPolicy, PolicyAction,
    authorize,
};

/// Application service for departments.
#[derive(Clone)]
pub struct DepartmentService {
    repository: Arc<dyn DepartmentRepository>,
    events: EntityEventService,
}

impl DepartmentService {
    /// Creates a service from dependencies.
    #[must_use]
    pub fn new(repository: Arc<dyn DepartmentRepository>, events: EntityEventService) -> Self {
        Self { repository, events }
    }

    /// Lists departments of the caller's institution.
    pub async fn list(&self, context: &CallerContext) -> AppResult<Vec<Department>> {
        authorize(&DepartmentPolicy, PolicyAction::View, context, None)?;
        self.repository
            .list_departments(DepartmentPolicy.scope(context))
            .await
    }

    /// Returns one department.
    pub async fn get(
        &self,
        context: &CallerContext,
        department_id: DepartmentId,
    ) -> AppResult<Department> {
        let department = self.find(context, department_id).await?;
        authorize(
            &DepartmentPolicy,
            PolicyAction::View,
            context,
            Some(&department),
        )?;

        Ok(department)
    }

    /// Creates a department in the caller's institution.
    pub async fn create(&self, context: &CallerContext, name: &str) -> AppResult<Department> {
        authorize(&DepartmentPolicy, PolicyAction::Create, context, None)?;

        let department = Department {
            id: DepartmentId::new(),
            institution_id: context.institution_id(),
            name: NonEmptyString::new(name.trim())?.into(),
        };
        self.repository.create_department(&department).await?;

        self.events
            .dispatch([EntityEvent::new(
                EntityKind::Department,
                ChangeKind::Created,
                department.id.as_uuid(),
            )])
            .await;

        Ok(department)
    }

    /// Renames a department.
    pub async fn update(
        &self,
        context: &CallerContext,
        department_id: DepartmentId,
        name: &str,
    ) -> AppResult<Department> {
        let mut department = self.find(context, department_id).await?;
        authorize(
            &DepartmentPolicy,
            PolicyAction::Update,
            context,
            Some(&department),
        )?;

        department.name = NonEmptyString::new(name.trim())?.into();
        self.repository
            .update_department(DepartmentPolicy.scope(context), &department)
            .await?;

        self.events
            .dispatch([EntityEvent::new(
                EntityKind::Department,
                ChangeKind::Saved,
                department.id.as_uuid(),
            )])
            .await;

        Ok(department)
    }

    /// Soft deletes a department.
    pub async fn delete(
        &self,
        context: &CallerContext,
        department_id: DepartmentId,
    ) -> AppResult<()> {
        let department = self.find(context, department_id).await?;
        authorize(
            &DepartmentPolicy,
            PolicyAction::Delete,
            context,
            Some(&department),
        )?;

        self.repository
            .delete_department(DepartmentPolicy.scope(context), department.id)
            .await?;

        self.events
            .dispatch([EntityEvent::new(
                EntityKind::Department,
                ChangeKind::Deleted,
                department.id.as_uuid(),
            )])
            .await;

        Ok(())
    }

    async fn find(
        &self,
        context: &CallerContext,
        department_id: DepartmentId,
    ) -> AppResult<Department> {
        self.repository
            .find_department(DepartmentPolicy.scope(context), department_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("department '{department_id}' not found")))
    }
}
