use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use userhub_core::{AppResult, InstitutionId};
use userhub_domain::{
    DepartmentId, EmailAddress, InstitutionUser, InstitutionUserId, PersonalIdentificationCode,
    PhoneNumber, RoleId,
};

use crate::InstitutionScope;

/// Validated membership values used by direct creation and CSV import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipInput {
    /// Key for the find-or-create of the user.
    pub personal_identification_code: PersonalIdentificationCode,
    /// Forename for a newly created user. Existing users keep theirs.
    pub forename: String,
    /// Surname for a newly created user. Existing users keep theirs.
    pub surname: String,
    /// Institution-scoped contact email.
    pub email: Option<EmailAddress>,
    /// Institution-scoped contact phone.
    pub phone: Option<PhoneNumber>,
    /// Department inside the institution. `None` keeps the department of an existing
    /// membership.
    pub department_id: Option<DepartmentId>,
    /// Complete role set after the write.
    pub role_ids: Vec<RoleId>,
}

/// Result of a membership upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipWrite {
    /// Membership as committed.
    pub institution_user: InstitutionUser,
    /// Whether the user row was inserted.
    pub user_created: bool,
    /// Whether the membership row was inserted.
    pub membership_created: bool,
}

/// Partial membership change. `None` leaves the attribute untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipUpdate {
    /// Replacement email, `Some(None)` clears it.
    pub email: Option<Option<EmailAddress>>,
    /// Replacement phone, `Some(None)` clears it.
    pub phone: Option<Option<PhoneNumber>>,
    /// Replacement department, `Some(None)` clears it.
    pub department_id: Option<Option<DepartmentId>>,
    /// Complete role set after the write.
    pub role_ids: Option<Vec<RoleId>>,
}

/// Repository port for institution memberships and their role attachments.
///
/// Role writes are a replace-and-diff sync: attachments absent from the new set are soft
/// deleted, new ones inserted or restored. Removing the last live attachment of a root role
/// fails with `Denial::OnlyUserUnderRootRole`.
#[async_trait]
pub trait InstitutionUserRepository: Send + Sync {
    /// Lists memberships inside the scope, ordered by surname and forename.
    async fn list_institution_users(
        &self,
        scope: InstitutionScope,
    ) -> AppResult<Vec<InstitutionUser>>;

    /// Finds a membership inside the scope.
    async fn find_institution_user(
        &self,
        scope: InstitutionScope,
        institution_user_id: InstitutionUserId,
    ) -> AppResult<Option<InstitutionUser>>;

    /// Finds or creates the user and the membership, refreshes contacts and syncs roles in
    /// one transaction.
    async fn upsert_membership(
        &self,
        institution_id: InstitutionId,
        input: MembershipInput,
    ) -> AppResult<MembershipWrite>;

    /// Applies a partial change in one transaction.
    async fn update_institution_user(
        &self,
        scope: InstitutionScope,
        institution_user_id: InstitutionUserId,
        update: MembershipUpdate,
    ) -> AppResult<InstitutionUser>;

    /// Sets or clears the deactivation date.
    async fn set_deactivation_date(
        &self,
        scope: InstitutionScope,
        institution_user_id: InstitutionUserId,
        deactivation_date: Option<NaiveDate>,
    ) -> AppResult<InstitutionUser>;

    /// Archives the membership and revokes all its role attachments.
    async fn archive_institution_user(
        &self,
        scope: InstitutionScope,
        institution_user_id: InstitutionUserId,
        archived_at: DateTime<Utc>,
    ) -> AppResult<InstitutionUser>;
}
