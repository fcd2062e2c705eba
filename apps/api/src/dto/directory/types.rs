use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Institution details, for bootstrap and updates.
#[derive(Debug, Deserialize)]
pub struct InstitutionRequest {
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// First administrator created by a bootstrap.
#[derive(Debug, Deserialize)]
pub struct AdministratorRequest {
    pub personal_identification_code: String,
    /// Full name, split on the last space.
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BootstrapRequest {
    pub token: String,
    pub institution: InstitutionRequest,
    pub administrator: AdministratorRequest,
}

#[derive(Debug, Serialize)]
pub struct BootstrapResponse {
    pub institution: InstitutionResponse,
    pub root_role: RoleResponse,
    pub administrator: InstitutionUserResponse,
}

#[derive(Debug, Serialize)]
pub struct InstitutionResponse {
    pub id: Uuid,
    pub name: String,
    pub short_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DepartmentRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DepartmentResponse {
    pub id: Uuid,
    pub institution_id: Uuid,
    pub name: String,
}

/// Incoming payload for role creation.
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub privileges: Vec<String>,
}

/// Incoming payload for role updates. Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_root: Option<bool>,
    #[serde(default)]
    pub privileges: Option<Vec<String>>,
}

/// API representation of a role with its grants.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: Uuid,
    pub institution_id: Uuid,
    pub name: String,
    pub is_root: bool,
    pub privileges: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RoleSummaryResponse {
    pub id: Uuid,
    pub name: String,
    pub is_root: bool,
}

#[derive(Debug, Serialize)]
pub struct PrivilegeResponse {
    pub key: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CreateInstitutionUserRequest {
    pub personal_identification_code: String,
    pub forename: String,
    pub surname: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub department_id: Option<Uuid>,
    pub role_ids: Vec<Uuid>,
}

/// Partial membership update. An absent field is kept, an explicit `null` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateInstitutionUserRequest {
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub department_id: Option<Option<Uuid>>,
    #[serde(default)]
    pub role_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub struct DeactivateInstitutionUserRequest {
    pub deactivation_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub personal_identification_code: String,
    pub forename: String,
    pub surname: String,
}

#[derive(Debug, Serialize)]
pub struct InstitutionUserResponse {
    pub id: Uuid,
    pub institution_id: Uuid,
    pub user: UserResponse,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department_id: Option<Uuid>,
    pub deactivation_date: Option<NaiveDate>,
    pub archived_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub roles: Vec<RoleSummaryResponse>,
}

/// Claims lookup requested by the identity provider.
#[derive(Debug, Deserialize)]
pub struct JwtClaimsRequest {
    pub personal_identification_code: String,
    #[serde(default)]
    pub institution_id: Option<Uuid>,
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
