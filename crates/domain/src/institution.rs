use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use userhub_core::InstitutionId;

use crate::{EmailAddress, PhoneNumber, RoleSummary, User};

uuid_identifier!(
    /// Unique identifier for a department.
    DepartmentId
);

uuid_identifier!(
    /// Unique identifier for a user's membership in an institution.
    InstitutionUserId
);

/// Tenant organization and primary scoping boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    /// Stable institution identifier.
    pub id: InstitutionId,
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

/// Organizational unit inside one institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Stable department identifier.
    pub id: DepartmentId,
    /// Owning institution.
    pub institution_id: InstitutionId,
    /// Name, unique inside the institution.
    pub name: String,
}

/// Membership binding a user to an institution with institution-local attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionUser {
    /// Stable membership identifier.
    pub id: InstitutionUserId,
    /// Owning institution.
    pub institution_id: InstitutionId,
    /// Member.
    pub user: User,
    /// Institution-scoped contact email.
    pub email: Option<EmailAddress>,
    /// Institution-scoped contact phone.
    pub phone: Option<PhoneNumber>,
    /// Optional department.
    pub department_id: Option<DepartmentId>,
    /// Date from which the membership is inactive.
    pub deactivation_date: Option<NaiveDate>,
    /// Archival timestamp.
    pub archived_at: Option<DateTime<Utc>>,
    /// Live role attachments.
    pub roles: Vec<RoleSummary>,
}

impl InstitutionUser {
    /// Returns whether the membership is usable on the given date.
    #[must_use]
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.archived_at.is_none()
            && self
                .deactivation_date
                .is_none_or(|deactivation_date| date < deactivation_date)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use userhub_core::InstitutionId;

    use super::{InstitutionUser, InstitutionUserId};
    use crate::{PersonalIdentificationCode, User, UserId};

    fn membership(deactivation_date: Option<NaiveDate>) -> InstitutionUser {
        InstitutionUser {
            id: InstitutionUserId::new(),
            institution_id: InstitutionId::new(),
            user: User {
                id: UserId::new(),
                personal_identification_code: PersonalIdentificationCode::parse("38505268557")
                    .unwrap_or_else(|error| panic!("fixture code: {error}")),
                forename: "Mari".to_owned(),
                surname: "Tamm".to_owned(),
            },
            email: None,
            phone: None,
            department_id: None,
            deactivation_date,
            archived_at: None,
            roles: Vec::new(),
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| panic!("fixture date"))
    }

    #[test]
    fn membership_is_active_before_deactivation_date() {
        let user = membership(Some(date(2026, 3, 1)));
        assert!(user.is_active_on(date(2026, 2, 28)));
        assert!(!user.is_active_on(date(2026, 3, 1)));
    }

    #[test]
    fn archived_membership_is_inactive() {
        let mut user = membership(None);
        user.archived_at = Some(Utc::now());
        assert!(!user.is_active_on(date(2026, 1, 1)));
    }
}
