use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use userhub_core::{AppResult, InstitutionId};
use userhub_domain::{IdentityClaims, PersonalIdentificationCode, SelectedInstitutionClaims};

use crate::IdentityClaimsRepository;

/// Builds the claims the identity provider embeds into issued tokens.
#[derive(Clone)]
pub struct ClaimsService {
    repository: Arc<dyn IdentityClaimsRepository>,
}

impl ClaimsService {
    /// Creates a service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn IdentityClaimsRepository>) -> Self {
        Self { repository }
    }

    /// Returns claims for a national identification code.
    ///
    /// Institution claims are present only for an active membership in the requested
    /// institution. Privileges are the union of the membership's live roles.
    pub async fn claims_for(
        &self,
        personal_identification_code: &str,
        institution_id: Option<InstitutionId>,
    ) -> AppResult<IdentityClaims> {
        let code = PersonalIdentificationCode::parse(personal_identification_code)?;
        let Some(user) = self.repository.find_user_by_personal_code(&code).await? else {
            return Ok(IdentityClaims::anonymous(code.as_str()));
        };

        let mut claims = IdentityClaims {
            user_id: Some(user.id),
            forename: Some(user.forename),
            surname: Some(user.surname),
            ..IdentityClaims::anonymous(code.as_str())
        };

        let Some(institution_id) = institution_id else {
            return Ok(claims);
        };

        let grants = self
            .repository
            .find_membership_grants(user.id, institution_id)
            .await?;
        let today = Utc::now().date_naive();

        match grants {
            Some(grants) if grants.membership.is_active_on(today) => {
                claims.selected_institution = Some(SelectedInstitutionClaims {
                    id: institution_id,
                    name: grants.institution_name,
                });
                claims.institution_user_id = Some(grants.membership.id);
                claims.privileges = grants
                    .privileges
                    .into_iter()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .map(|privilege| privilege.as_str().to_owned())
                    .collect();
            }
            _ => {
                debug!(
                    user_id = %user.id,
                    %institution_id,
                    "no active membership for requested institution"
                );
            }
        }

        Ok(claims)
    }
}
