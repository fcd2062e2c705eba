use async_trait::async_trait;

use userhub_core::{AppResult, InstitutionId};
use userhub_domain::{EmailAddress, Institution, InstitutionUser, PhoneNumber, Role};

use super::MembershipInput;

/// Validated input for creating an institution with its first administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapInstitutionInput {
    /// Institution record to insert.
    pub institution: Institution,
    /// Root role holding every privilege.
    pub root_role: Role,
    /// First member, attached to the root role.
    pub administrator: MembershipInput,
}

/// Rows written by a bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOutcome {
    /// Created institution.
    pub institution: Institution,
    /// Created root role.
    pub root_role: Role,
    /// Created administrator membership.
    pub administrator: InstitutionUser,
    /// Whether the administrator's user row was inserted.
    pub user_created: bool,
}

/// Replacement values for institution details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionUpdate {
    /// Display name.
    pub name: String,
    /// Optional abbreviation.
    pub short_name: Option<String>,
    /// Contact email.
    pub email: Option<EmailAddress>,
    /// Contact phone.
    pub phone: Option<PhoneNumber>,
    /// Logo location.
    pub logo_url: Option<String>,
}

/// Repository port for institutions.
#[async_trait]
pub trait InstitutionRepository: Send + Sync {
    /// Finds a live institution.
    async fn find_institution(&self, institution_id: InstitutionId)
    -> AppResult<Option<Institution>>;

    /// Saves institution details.
    async fn update_institution(
        &self,
        institution_id: InstitutionId,
        update: &InstitutionUpdate,
    ) -> AppResult<Institution>;

    /// Inserts institution, root role and administrator membership in one transaction.
    async fn bootstrap_institution(
        &self,
        input: BootstrapInstitutionInput,
    ) -> AppResult<BootstrapOutcome>;
}
