mod lifecycle;


use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use userhub_core::{AppError, AppResult, Denial};
use userhub_domain::{
    CallerContext, ChangeKind, DepartmentId, EmailAddress, EntityEvent, EntityKind,
    InstitutionUser, InstitutionUserId, PersonName, PersonalIdentificationCode, PhoneNumber,
    RoleId,
};

use crate::institution_service::optional;
use crate::{
    DepartmentPolicy, DepartmentRepository, EntityEventService, EntityPolicy,
    InstitutionUserPolicy, InstitutionUserRepository, MembershipInput, MembershipUpdate,
    MembershipWrite, PolicyAction, RolePolicy, RoleRepository, authorize,
};

/// Raw values for adding a user to the caller's institution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateInstitutionUserInput {
    /// National identification code.
    pub personal_identification_code: String,
    /// Given name(s).
    pub forename: String,
    /// Family name.
    pub surname: String,
    /// Institution-scoped contact email.
    pub email: Option<String>,
    /// Institution-scoped contact phone.
    pub phone: Option<String>,
    /// Department inside the institution.
    pub department_id: Option<DepartmentId>,
    /// Roles inside the institution, at least one.
    pub role_ids: Vec<RoleId>,
}

/// Raw partial change of a membership. `None` leaves the attribute untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateInstitutionUserInput {
    /// Replacement email, `Some(None)` clears it.
    pub email: Option<Option<String>>,
    /// Replacement phone, `Some(None)` clears it.
    pub phone: Option<Option<String>>,
    /// Replacement department, `Some(None)` clears it.
    pub department_id: Option<Option<DepartmentId>>,
    /// Complete role set after the update.
    pub role_ids: Option<Vec<RoleId>>,
}

/// Application service for institution memberships.
#[derive(Clone)]
pub struct InstitutionUserService {
    repository: Arc<dyn InstitutionUserRepository>,
    role_repository: Arc<dyn RoleRepository>,
    department_repository: Arc<dyn DepartmentRepository>,
    events: EntityEventService,
}

impl InstitutionUserService {
    /// Creates a service from dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn InstitutionUserRepository>,
        role_repository: Arc<dyn RoleRepository>,
        department_repository: Arc<dyn DepartmentRepository>,
        events: EntityEventService,
    ) -> Self {
        Self {
            repository,
            role_repository,
            department_repository,
            events,
        }
    }

    /// Lists memberships of the caller's institution.
    pub async fn list(&self, context: &CallerContext) -> AppResult<Vec<InstitutionUser>> {
        authorize(&InstitutionUserPolicy, PolicyAction::View, context, None)?;
        self.repository
            .list_institution_users(InstitutionUserPolicy.scope(context))
            .await
    }

    /// Returns one membership.
    pub async fn get(
        &self,
        context: &CallerContext,
        institution_user_id: InstitutionUserId,
    ) -> AppResult<InstitutionUser> {
        let institution_user = self.find(context, institution_user_id).await?;
        authorize(
            &InstitutionUserPolicy,
            PolicyAction::View,
            context,
            Some(&institution_user),
        )?;

        Ok(institution_user)
    }

    /// Finds or creates the user and the membership, then syncs its roles.
    pub async fn create(
        &self,
        context: &CallerContext,
        input: CreateInstitutionUserInput,
    ) -> AppResult<InstitutionUser> {
        authorize(&InstitutionUserPolicy, PolicyAction::Create, context, None)?;

        if input.role_ids.is_empty() {
            return Err(Denial::EmptyUserRoles.into());
        }

        let personal_identification_code =
            PersonalIdentificationCode::parse(input.personal_identification_code.as_str())?;
        let name = PersonName::from_parts(&input.forename, &input.surname)?;
        self.ensure_department(context, input.department_id).await?;
        let role_ids = self.ensure_roles(context, input.role_ids).await?;

        let write = self
            .repository
            .upsert_membership(
                context.institution_id(),
                MembershipInput {
                    personal_identification_code,
                    forename: name.forename().to_owned(),
                    surname: name.surname().to_owned(),
                    email: optional(input.email, EmailAddress::new)?,
                    phone: optional(input.phone, PhoneNumber::new)?,
                    department_id: input.department_id,
                    role_ids,
                },
            )
            .await?;

        info!(
            institution_id = %context.institution_id(),
            institution_user_id = %write.institution_user.id,
            created = write.membership_created,
            "saved institution user"
        );
        self.events.dispatch(membership_events(&write)).await;

        Ok(write.institution_user)
    }

    /// Changes contacts, department and roles of a membership.
    pub async fn update(
        &self,
        context: &CallerContext,
        institution_user_id: InstitutionUserId,
        input: UpdateInstitutionUserInput,
    ) -> AppResult<InstitutionUser> {
        let institution_user = self.find(context, institution_user_id).await?;
        authorize(
            &InstitutionUserPolicy,
            PolicyAction::Update,
            context,
            Some(&institution_user),
        )?;

        let role_ids = match input.role_ids {
            Some(role_ids) if role_ids.is_empty() => return Err(Denial::EmptyUserRoles.into()),
            Some(role_ids) => Some(self.ensure_roles(context, role_ids).await?),
            None => None,
        };
        if let Some(department_id) = input.department_id {
            self.ensure_department(context, department_id).await?;
        }

        let update = MembershipUpdate {
            email: input
                .email
                .map(|email| optional(email, EmailAddress::new))
                .transpose()?,
            phone: input
                .phone
                .map(|phone| optional(phone, PhoneNumber::new))
                .transpose()?,
            department_id: input.department_id,
            role_ids,
        };

        let institution_user = self
            .repository
            .update_institution_user(
                InstitutionUserPolicy.scope(context),
                institution_user.id,
                update,
            )
            .await?;

        self.publish_saved(&institution_user).await;
        Ok(institution_user)
    }

    async fn find(
        &self,
        context: &CallerContext,
        institution_user_id: InstitutionUserId,
    ) -> AppResult<InstitutionUser> {
        self.repository
            .find_institution_user(InstitutionUserPolicy.scope(context), institution_user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "institution user '{institution_user_id}' not found"
                ))
            })
    }

    async fn ensure_department(
        &self,
        context: &CallerContext,
        department_id: Option<DepartmentId>,
    ) -> AppResult<()> {
        let Some(department_id) = department_id else {
            return Ok(());
        };

        self.department_repository
            .find_department(DepartmentPolicy.scope(context), department_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "department '{department_id}' does not belong to the institution"
                ))
            })
    }

    /// Returns the distinct role ids once all of them resolve inside the caller's institution.
    async fn ensure_roles(
        &self,
        context: &CallerContext,
        role_ids: Vec<RoleId>,
    ) -> AppResult<Vec<RoleId>> {
        let role_ids = role_ids
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let found = self
            .role_repository
            .find_roles_by_ids(RolePolicy.scope(context), &role_ids)
            .await?
            .into_iter()
            .map(|role| role.id)
            .collect::<BTreeSet<_>>();

        if let Some(missing) = role_ids.iter().find(|role_id| !found.contains(role_id)) {
            return Err(AppError::Validation(format!(
                "role '{missing}' does not belong to the institution"
            )));
        }

        Ok(role_ids)
    }

    async fn publish_saved(&self, institution_user: &InstitutionUser) {
        self.events
            .dispatch([EntityEvent::new(
                EntityKind::InstitutionUser,
                ChangeKind::Saved,
                institution_user.id.as_uuid(),
            )])
            .await;
    }
}

/// Events describing a committed membership upsert.
pub(crate) fn membership_events(write: &MembershipWrite) -> Vec<EntityEvent> {
    let mut events = Vec::with_capacity(2);
    if write.user_created {
        events.push(EntityEvent::new(
            EntityKind::User,
            ChangeKind::Created,
            write.institution_user.user.id.as_uuid(),
        ));
    }

    let change = if write.membership_created {
        ChangeKind::Created
    } else {
        ChangeKind::Saved
    };
    events.push(EntityEvent::new(
        EntityKind::InstitutionUser,
        change,
        write.institution_user.id.as_uuid(),
    ));

    events
}
