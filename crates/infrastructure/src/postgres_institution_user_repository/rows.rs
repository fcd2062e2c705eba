use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use userhub_core::{AppError, AppResult, InstitutionId};
use userhub_domain::{
    DepartmentId, EmailAddress, InstitutionUser, InstitutionUserId, PersonalIdentificationCode,
    PhoneNumber, RoleId, RoleSummary, User, UserId,
};

use crate::postgres_support::internal;

#[derive(Debug, FromRow)]
struct MembershipRow {
    id: Uuid,
    institution_id: Uuid,
    user_id: Uuid,
    personal_identification_code: String,
    forename: String,
    surname: String,
    email: Option<String>,
    phone: Option<String>,
    department_id: Option<Uuid>,
    deactivation_date: Option<NaiveDate>,
    archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct AttachmentRow {
    institution_user_id: Uuid,
    role_id: Uuid,
    role_name: String,
    is_root: bool,
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    pub(crate) id: Uuid,
    pub(crate) personal_identification_code: String,
    pub(crate) forename: String,
    pub(crate) surname: String,
}

impl UserRow {
    pub(crate) fn into_user(self) -> AppResult<User> {
        Ok(User {
            id: UserId::from_uuid(self.id),
            personal_identification_code: stored(
                PersonalIdentificationCode::parse(self.personal_identification_code.as_str()),
                "personal identification code",
            )?,
            forename: self.forename,
            surname: self.surname,
        })
    }
}

/// Narrows membership reads. Unset fields do not filter.
#[derive(Debug, Default)]
pub(crate) struct MembershipFilter {
    pub(crate) institution_id: Option<Uuid>,
    pub(crate) institution_user_id: Option<Uuid>,
    pub(crate) user_id: Option<Uuid>,
}

/// Loads live memberships with their live role attachments.
pub(crate) async fn fetch_memberships(
    connection: &mut PgConnection,
    filter: MembershipFilter,
) -> AppResult<Vec<InstitutionUser>> {
    let rows = sqlx::query_as::<_, MembershipRow>(
        r#"
        SELECT
            memberships.id,
            memberships.institution_id,
            users.id AS user_id,
            users.personal_identification_code,
            users.forename,
            users.surname,
            memberships.email,
            memberships.phone,
            memberships.department_id,
            memberships.deactivation_date,
            memberships.archived_at
        FROM institution_users AS memberships
        INNER JOIN users
            ON users.id = memberships.user_id
        WHERE memberships.deleted_at IS NULL
            AND ($1::uuid IS NULL OR memberships.institution_id = $1)
            AND ($2::uuid IS NULL OR memberships.id = $2)
            AND ($3::uuid IS NULL OR memberships.user_id = $3)
        ORDER BY users.surname, users.forename, memberships.id
        "#,
    )
    .bind(filter.institution_id)
    .bind(filter.institution_user_id)
    .bind(filter.user_id)
    .fetch_all(&mut *connection)
    .await
    .map_err(internal("list institution users"))?;

    let ids = rows.iter().map(|row| row.id).collect::<Vec<_>>();
    let attachments = sqlx::query_as::<_, AttachmentRow>(
        r#"
        SELECT
            attachments.institution_user_id,
            roles.id AS role_id,
            roles.name AS role_name,
            roles.is_root
        FROM institution_user_roles AS attachments
        INNER JOIN roles
            ON roles.id = attachments.role_id
        WHERE attachments.institution_user_id = ANY($1)
            AND attachments.deleted_at IS NULL
            AND roles.deleted_at IS NULL
        ORDER BY roles.name
        "#,
    )
    .bind(ids)
    .fetch_all(&mut *connection)
    .await
    .map_err(internal("list role attachments"))?;

    let mut roles_by_membership: HashMap<Uuid, Vec<RoleSummary>> = HashMap::new();
    for attachment in attachments {
        roles_by_membership
            .entry(attachment.institution_user_id)
            .or_default()
            .push(RoleSummary {
                id: RoleId::from_uuid(attachment.role_id),
                name: attachment.role_name,
                is_root: attachment.is_root,
            });
    }

    rows.into_iter()
        .map(|row| {
            let roles = roles_by_membership.remove(&row.id).unwrap_or_default();
            membership_from_row(row, roles)
        })
        .collect()
}

/// Loads one live membership or fails with `NotFound`.
pub(crate) async fn fetch_membership(
    connection: &mut PgConnection,
    institution_user_id: InstitutionUserId,
) -> AppResult<InstitutionUser> {
    fetch_memberships(
        connection,
        MembershipFilter {
            institution_user_id: Some(institution_user_id.as_uuid()),
            ..MembershipFilter::default()
        },
    )
    .await?
    .into_iter()
    .next()
    .ok_or_else(|| {
        AppError::NotFound(format!(
            "institution user '{institution_user_id}' not found"
        ))
    })
}

fn membership_from_row(row: MembershipRow, roles: Vec<RoleSummary>) -> AppResult<InstitutionUser> {
    let user = UserRow {
        id: row.user_id,
        personal_identification_code: row.personal_identification_code,
        forename: row.forename,
        surname: row.surname,
    }
    .into_user()?;

    Ok(InstitutionUser {
        id: InstitutionUserId::from_uuid(row.id),
        institution_id: InstitutionId::from_uuid(row.institution_id),
        user,
        email: row
            .email
            .map(|email| stored(EmailAddress::new(email), "email"))
            .transpose()?,
        phone: row
            .phone
            .map(|phone| stored(PhoneNumber::new(phone), "phone"))
            .transpose()?,
        department_id: row.department_id.map(DepartmentId::from_uuid),
        deactivation_date: row.deactivation_date,
        archived_at: row.archived_at,
        roles,
    })
}

/// Rejected stored values are data corruption, not caller mistakes.
pub(crate) fn stored<T>(value: AppResult<T>, field: &str) -> AppResult<T> {
    value.map_err(|error| AppError::Internal(format!("invalid stored {field}: {error}")))
}
