
use std::sync::Arc;

use tracing::info;

use userhub_core::{AppError, AppResult, InstitutionId, NonEmptyString};
use userhub_domain::{
    CallerContext, ChangeKind, EmailAddress, EntityEvent, EntityKind, Institution, PersonName,
    PersonalIdentificationCode, PhoneNumber, Privilege, Role, RoleId,
};

use crate::{
    BootstrapInstitutionInput, BootstrapOutcome, EntityEventService, InstitutionPolicy,
    InstitutionRepository, InstitutionUpdate, MembershipInput, PolicyAction, authorize,
};

const ROOT_ROLE_NAME: &str = "Administrator";

/// Raw values for institution details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionDetailsInput {
    /// Display name.
    pub name: String,
    /// Optional abbreviation.
    pub short_name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Logo location.
    pub logo_url: Option<String>,
}

/// Raw values for the first administrator of a new institution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdministratorInput {
    /// National identification code.
    pub personal_identification_code: String,
    /// Full display name, split on the last token.
    pub name: String,
    /// Institution-scoped contact email.
    pub email: Option<String>,
    /// Institution-scoped contact phone.
    pub phone: Option<String>,
}

/// Application service for institutions.
#[derive(Clone)]
pub struct InstitutionService {
    repository: Arc<dyn InstitutionRepository>,
    events: EntityEventService,
}

impl InstitutionService {
    /// Creates a service from dependencies.
    #[must_use]
    pub fn new(repository: Arc<dyn InstitutionRepository>, events: EntityEventService) -> Self {
        Self { repository, events }
    }

    /// Creates an institution, its root role holding every privilege, and a first member
    /// attached to it.
    pub async fn bootstrap_institution(
        &self,
        details: InstitutionDetailsInput,
        administrator: AdministratorInput,
    ) -> AppResult<BootstrapOutcome> {
        let institution_id = InstitutionId::new();
        let update = institution_update(details)?;
        let institution = Institution {
            id: institution_id,
            name: update.name,
            short_name: update.short_name,
            email: update.email,
            phone: update.phone,
            logo_url: update.logo_url,
        };

        let root_role = Role {
            id: RoleId::new(),
            institution_id,
            name: ROOT_ROLE_NAME.to_owned(),
            is_root: true,
            privileges: Privilege::all().to_vec(),
        };

        let name = PersonName::parse(administrator.name.as_str())?;
        let administrator = MembershipInput {
            personal_identification_code: PersonalIdentificationCode::parse(
                administrator.personal_identification_code.as_str(),
            )?,
            forename: name.forename().to_owned(),
            surname: name.surname().to_owned(),
            email: optional(administrator.email, EmailAddress::new)?,
            phone: optional(administrator.phone, PhoneNumber::new)?,
            department_id: None,
            role_ids: vec![root_role.id],
        };

        let outcome = self
            .repository
            .bootstrap_institution(BootstrapInstitutionInput {
                institution,
                root_role,
                administrator,
            })
            .await?;

        info!(
            institution_id = %outcome.institution.id,
            institution_user_id = %outcome.administrator.id,
            "bootstrapped institution"
        );

        let mut events = vec![
            EntityEvent::new(
                EntityKind::Institution,
                ChangeKind::Created,
                outcome.institution.id.as_uuid(),
            ),
            EntityEvent::new(
                EntityKind::Role,
                ChangeKind::Created,
                outcome.root_role.id.as_uuid(),
            ),
        ];
        if outcome.user_created {
            events.push(EntityEvent::new(
                EntityKind::User,
                ChangeKind::Created,
                outcome.administrator.user.id.as_uuid(),
            ));
        }
        events.push(EntityEvent::new(
            EntityKind::InstitutionUser,
            ChangeKind::Created,
            outcome.administrator.id.as_uuid(),
        ));
        self.events.dispatch(events).await;

        Ok(outcome)
    }

    /// Returns the caller's institution.
    pub async fn current_institution(&self, context: &CallerContext) -> AppResult<Institution> {
        let institution = self.find_current(context).await?;
        authorize(
            &InstitutionPolicy,
            PolicyAction::View,
            context,
            Some(&institution),
        )?;

        Ok(institution)
    }

    /// Saves details of the caller's institution.
    pub async fn update_institution(
        &self,
        context: &CallerContext,
        details: InstitutionDetailsInput,
    ) -> AppResult<Institution> {
        let institution = self.find_current(context).await?;
        authorize(
            &InstitutionPolicy,
            PolicyAction::Update,
            context,
            Some(&institution),
        )?;

        let update = institution_update(details)?;
        let institution = self
            .repository
            .update_institution(institution.id, &update)
            .await?;

        self.events
            .dispatch([EntityEvent::new(
                EntityKind::Institution,
                ChangeKind::Saved,
                institution.id.as_uuid(),
            )])
            .await;

        Ok(institution)
    }

    async fn find_current(&self, context: &CallerContext) -> AppResult<Institution> {
        self.repository
            .find_institution(context.institution_id())
            .await?
            .ok_or_else(|| AppError::NotFound("institution not found".to_owned()))
    }
}

fn institution_update(details: InstitutionDetailsInput) -> AppResult<InstitutionUpdate> {
    let name = NonEmptyString::new(details.name.trim())?;

    Ok(InstitutionUpdate {
        name: name.into(),
        short_name: non_blank(details.short_name),
        email: optional(details.email, EmailAddress::new)?,
        phone: optional(details.phone, PhoneNumber::new)?,
        logo_url: non_blank(details.logo_url),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Parses an optional raw value, treating blank input as absent.
pub(crate) fn optional<T>(
    value: Option<String>,
    parse: impl FnOnce(String) -> AppResult<T>,
) -> AppResult<Option<T>> {
    non_blank(value).map(parse).transpose()
}
