use std::collections::BTreeSet;

use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use userhub_application::{MembershipInput, MembershipWrite};
use userhub_core::{AppError, AppResult, Denial, InstitutionId};
use userhub_domain::{InstitutionUserId, RoleId, UserId};

use super::rows::{UserRow, fetch_membership};
use crate::postgres_support::{internal, map_write_error};

#[derive(Debug, FromRow)]
struct LiveAttachmentRow {
    role_id: Uuid,
    is_root: bool,
}

/// Replace-and-diff sync of a membership's role attachments inside a transaction.
///
/// Detached attachments are soft deleted and returning ones restored. Removing the last live
/// holder of a root role is denied; the count runs under a lock on the role row so concurrent
/// removals serialize.
pub(crate) async fn sync_roles(
    connection: &mut PgConnection,
    institution_id: InstitutionId,
    institution_user_id: InstitutionUserId,
    role_ids: &[RoleId],
) -> AppResult<()> {
    let wanted = role_ids
        .iter()
        .map(RoleId::as_uuid)
        .collect::<BTreeSet<_>>();

    let current = sqlx::query_as::<_, LiveAttachmentRow>(
        r#"
        SELECT attachments.role_id, roles.is_root
        FROM institution_user_roles AS attachments
        INNER JOIN roles
            ON roles.id = attachments.role_id
        WHERE attachments.institution_user_id = $1
            AND attachments.deleted_at IS NULL
            AND roles.deleted_at IS NULL
        "#,
    )
    .bind(institution_user_id.as_uuid())
    .fetch_all(&mut *connection)
    .await
    .map_err(internal("load role attachments"))?;

    let removed = current
        .iter()
        .filter(|attachment| !wanted.contains(&attachment.role_id))
        .collect::<Vec<_>>();

    for attachment in removed.iter().filter(|attachment| attachment.is_root) {
        ensure_other_root_holder(connection, attachment.role_id).await?;
    }

    if !removed.is_empty() {
        sqlx::query(
            r#"
            UPDATE institution_user_roles
            SET deleted_at = now()
            WHERE institution_user_id = $1
                AND role_id = ANY($2)
                AND deleted_at IS NULL
            "#,
        )
        .bind(institution_user_id.as_uuid())
        .bind(
            removed
                .iter()
                .map(|attachment| attachment.role_id)
                .collect::<Vec<_>>(),
        )
        .execute(&mut *connection)
        .await
        .map_err(internal("detach roles"))?;
    }

    if wanted.is_empty() {
        return Ok(());
    }

    let attached = sqlx::query(
        r#"
        INSERT INTO institution_user_roles (institution_user_id, role_id)
        SELECT $1, roles.id
        FROM roles
        WHERE roles.id = ANY($2)
            AND roles.institution_id = $3
            AND roles.deleted_at IS NULL
        ON CONFLICT (institution_user_id, role_id) DO UPDATE
        SET deleted_at = NULL
        "#,
    )
    .bind(institution_user_id.as_uuid())
    .bind(wanted.iter().copied().collect::<Vec<_>>())
    .bind(institution_id.as_uuid())
    .execute(&mut *connection)
    .await
    .map_err(internal("attach roles"))?
    .rows_affected();

    if attached != wanted.len() as u64 {
        return Err(AppError::Conflict(
            "some roles are no longer available in the institution".to_owned(),
        ));
    }

    Ok(())
}

async fn ensure_other_root_holder(connection: &mut PgConnection, role_id: Uuid) -> AppResult<()> {
    sqlx::query("SELECT id FROM roles WHERE id = $1 FOR UPDATE")
        .bind(role_id)
        .execute(&mut *connection)
        .await
        .map_err(internal("lock root role"))?;

    let holders = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM institution_user_roles AS attachments
        INNER JOIN institution_users AS memberships
            ON memberships.id = attachments.institution_user_id
        WHERE attachments.role_id = $1
            AND attachments.deleted_at IS NULL
            AND memberships.deleted_at IS NULL
        "#,
    )
    .bind(role_id)
    .fetch_one(&mut *connection)
    .await
    .map_err(internal("count root role holders"))?;

    if holders <= 1 {
        return Err(Denial::OnlyUserUnderRootRole.into());
    }

    Ok(())
}

/// Finds or creates the user and the membership, refreshes contacts and syncs roles.
///
/// Existing users keep their names. Runs inside the caller's transaction.
pub(crate) async fn upsert_membership_in(
    connection: &mut PgConnection,
    institution_id: InstitutionId,
    input: MembershipInput,
) -> AppResult<MembershipWrite> {
    let code = input.personal_identification_code.as_str();

    let existing_user = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, personal_identification_code, forename, surname
        FROM users
        WHERE personal_identification_code = $1
            AND deleted_at IS NULL
        "#,
    )
    .bind(code)
    .fetch_optional(&mut *connection)
    .await
    .map_err(internal("find user"))?;

    let user_created = existing_user.is_none();
    let user_id = match existing_user {
        Some(user) => UserId::from_uuid(user.id),
        None => {
            let user_id = UserId::new();
            sqlx::query(
                r#"
                INSERT INTO users (id, personal_identification_code, forename, surname)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(code)
            .bind(input.forename.as_str())
            .bind(input.surname.as_str())
            .execute(&mut *connection)
            .await
            .map_err(|error| {
                map_write_error(
                    error,
                    "create user",
                    &format!("user '{code}' was created concurrently"),
                )
            })?;
            user_id
        }
    };

    let existing_membership = sqlx::query_as::<_, (Uuid, bool)>(
        r#"
        SELECT id, archived_at IS NOT NULL
        FROM institution_users
        WHERE institution_id = $1
            AND user_id = $2
            AND deleted_at IS NULL
        FOR UPDATE
        "#,
    )
    .bind(institution_id.as_uuid())
    .bind(user_id.as_uuid())
    .fetch_optional(&mut *connection)
    .await
    .map_err(internal("find institution user"))?;

    let membership_created = existing_membership.is_none();
    let institution_user_id = match existing_membership {
        Some((_, true)) => {
            return Err(AppError::Conflict(format!(
                "institution user '{code}' is archived"
            )));
        }
        Some((id, false)) => InstitutionUserId::from_uuid(id),
        None => InstitutionUserId::new(),
    };

    sqlx::query(
        r#"
        INSERT INTO institution_users (id, institution_id, user_id, email, phone, department_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO UPDATE
        SET email = EXCLUDED.email,
            phone = EXCLUDED.phone,
            department_id = COALESCE(EXCLUDED.department_id, institution_users.department_id),
            updated_at = now()
        "#,
    )
    .bind(institution_user_id.as_uuid())
    .bind(institution_id.as_uuid())
    .bind(user_id.as_uuid())
    .bind(input.email.as_ref().map(|email| email.as_str()))
    .bind(input.phone.as_ref().map(|phone| phone.as_str()))
    .bind(input.department_id.map(|department_id| department_id.as_uuid()))
    .execute(&mut *connection)
    .await
    .map_err(|error| {
        map_write_error(
            error,
            "save institution user",
            &format!("user '{code}' was added to the institution concurrently"),
        )
    })?;

    sync_roles(
        connection,
        institution_id,
        institution_user_id,
        &input.role_ids,
    )
    .await?;

    Ok(MembershipWrite {
        institution_user: fetch_membership(connection, institution_user_id).await?,
        user_created,
        membership_created,
    })
}
