//! Per-entity authorization: a privilege predicate paired with an institution query scope.

mod policies;


use tracing::debug;
use userhub_core::{AppError, AppResult, InstitutionId};
use userhub_domain::{CallerContext, Privilege};

pub use policies::{
    DepartmentPolicy, InstitutionPolicy, InstitutionUserPolicy, PrivilegePolicy, RolePolicy,
};

/// Query filter narrowing reads and writes to the rows a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstitutionScope {
    /// Unscoped reference data.
    Global,
    /// Rows owned by one institution.
    Institution(InstitutionId),
}

impl InstitutionScope {
    /// Returns whether a row owned by `institution_id` passes the filter.
    #[must_use]
    pub fn admits(&self, institution_id: InstitutionId) -> bool {
        match self {
            Self::Global => true,
            Self::Institution(scoped) => *scoped == institution_id,
        }
    }

    /// Returns the scoping institution, `None` when global.
    #[must_use]
    pub fn institution_id(&self) -> Option<InstitutionId> {
        match self {
            Self::Global => None,
            Self::Institution(institution_id) => Some(*institution_id),
        }
    }
}

/// Actions checked by entity policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAction {
    /// List or read.
    View,
    /// Insert.
    Create,
    /// Change attributes.
    Update,
    /// Remove.
    Delete,
    /// Clear a deactivation.
    Activate,
    /// Schedule a deactivation.
    Deactivate,
    /// Archive.
    Archive,
    /// Bulk CSV import.
    Import,
}

/// What a caller needs for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any authenticated caller.
    AnyCaller,
    /// Membership of the privilege in the caller's set.
    Privilege(Privilege),
    /// Action not offered for the entity.
    Unsupported,
}

/// Authorization predicate and query scope for one entity type.
pub trait EntityPolicy {
    /// Entity guarded by the policy.
    type Entity;

    /// Entity name used in denial messages.
    const ENTITY_NAME: &'static str;

    /// Returns the requirement for an action.
    fn requirement(&self, action: PolicyAction) -> Requirement;

    /// Returns the owning institution, `None` for global entities.
    fn owner(&self, entity: &Self::Entity) -> Option<InstitutionId>;

    /// Returns the query scope for the caller.
    fn scope(&self, context: &CallerContext) -> InstitutionScope {
        InstitutionScope::Institution(context.institution_id())
    }

    /// Returns whether the caller may perform the action, on the entity when given.
    fn can(
        &self,
        action: PolicyAction,
        context: &CallerContext,
        entity: Option<&Self::Entity>,
    ) -> bool {
        let granted = match self.requirement(action) {
            Requirement::AnyCaller => true,
            Requirement::Privilege(privilege) => context.has_privilege(privilege),
            Requirement::Unsupported => false,
        };

        granted && entity.is_none_or(|entity| self.is_visible(context, entity))
    }

    /// Returns whether the entity falls inside the caller's scope.
    fn is_visible(&self, context: &CallerContext, entity: &Self::Entity) -> bool {
        self.owner(entity)
            .is_none_or(|institution_id| self.scope(context).admits(institution_id))
    }
}

/// Enforces a policy decision.
///
/// Missing privileges yield `Forbidden`; entities outside the caller's institution yield
/// `NotFound` so their existence is not disclosed.
pub fn authorize<P: EntityPolicy>(
    policy: &P,
    action: PolicyAction,
    context: &CallerContext,
    entity: Option<&P::Entity>,
) -> AppResult<()> {
    if let Some(entity) = entity
        && !policy.is_visible(context, entity)
    {
        return Err(AppError::NotFound(format!("{} not found", P::ENTITY_NAME)));
    }

    match policy.requirement(action) {
        Requirement::AnyCaller => Ok(()),
        Requirement::Privilege(privilege) if context.has_privilege(privilege) => Ok(()),
        Requirement::Privilege(privilege) => {
            debug!(
                user_id = %context.user_id(),
                institution_id = %context.institution_id(),
                privilege = privilege.as_str(),
                "privilege check failed"
            );
            Err(AppError::Forbidden(format!(
                "institution user '{}' is missing privilege '{}'",
                context.institution_user_id(),
                privilege.as_str()
            )))
        }
        Requirement::Unsupported => Err(AppError::Forbidden(format!(
            "action {action:?} is not available on {}",
            P::ENTITY_NAME
        ))),
    }
}
