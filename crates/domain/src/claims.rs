use serde::{Deserialize, Serialize};
use userhub_core::InstitutionId;

use crate::{InstitutionUserId, Privilege, UserId};

/// Identity claims handed to the identity provider and read back from its tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// National identification code of the subject.
    pub personal_identification_code: String,
    /// Subject user, absent when the code is unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Given name(s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forename: Option<String>,
    /// Family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    /// Institution the session is bound to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_institution: Option<SelectedInstitutionClaims>,
    /// Membership in the selected institution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_user_id: Option<InstitutionUserId>,
    /// Privilege keys granted in the selected institution.
    #[serde(default)]
    pub privileges: Vec<String>,
}

/// Selected institution reference inside identity claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedInstitutionClaims {
    /// Institution identifier.
    pub id: InstitutionId,
    /// Institution display name.
    pub name: String,
}

impl IdentityClaims {
    /// Claims for a code with no known user.
    #[must_use]
    pub fn anonymous(personal_identification_code: impl Into<String>) -> Self {
        Self {
            personal_identification_code: personal_identification_code.into(),
            user_id: None,
            forename: None,
            surname: None,
            selected_institution: None,
            institution_user_id: None,
            privileges: Vec::new(),
        }
    }

    /// Returns the known privileges, skipping keys outside the catalog.
    #[must_use]
    pub fn known_privileges(&self) -> Vec<Privilege> {
        self.privileges
            .iter()
            .filter_map(|key| Privilege::from_transport(key).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::IdentityClaims;
    use crate::Privilege;

    #[test]
    fn unknown_privilege_keys_are_skipped() {
        let mut claims = IdentityClaims::anonymous("38505268557");
        claims.privileges = vec!["VIEW_USER".to_owned(), "LAUNCH_ROCKETS".to_owned()];

        assert_eq!(claims.known_privileges(), vec![Privilege::ViewUser]);
    }

    #[test]
    fn anonymous_claims_omit_identity_fields() {
        let json = serde_json::to_value(IdentityClaims::anonymous("38505268557"))
            .unwrap_or_else(|error| panic!("serialize: {error}"));

        assert_eq!(
            json,
            serde_json::json!({
                "personal_identification_code": "38505268557",
                "privileges": []
            })
        );
    }
}
