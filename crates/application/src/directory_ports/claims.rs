use async_trait::async_trait;

use userhub_core::{AppResult, InstitutionId};
use userhub_domain::{InstitutionUser, PersonalIdentificationCode, Privilege, User, UserId};

/// Membership with the effective privileges of its live roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipGrants {
    /// Institution display name.
    pub institution_name: String,
    /// Membership record.
    pub membership: InstitutionUser,
    /// Union of the privileges of the membership's live roles.
    pub privileges: Vec<Privilege>,
}

/// Read port used when issuing identity-provider claims.
#[async_trait]
pub trait IdentityClaimsRepository: Send + Sync {
    /// Finds a user by national identification code.
    async fn find_user_by_personal_code(
        &self,
        code: &PersonalIdentificationCode,
    ) -> AppResult<Option<User>>;

    /// Finds the user's membership in an institution with its grants.
    async fn find_membership_grants(
        &self,
        user_id: UserId,
        institution_id: InstitutionId,
    ) -> AppResult<Option<MembershipGrants>>;
}
