use userhub_application::{
    DepartmentRepository, InstitutionScope, InstitutionUserRepository, MembershipInput,
    MembershipUpdate, RoleRepository,
};
use userhub_core::{AppError, Denial, InstitutionId};
use userhub_domain::{
    Department, DepartmentId, PersonalIdentificationCode, Privilege, Role, RoleId,
};

use super::PostgresInstitutionUserRepository;
use crate::postgres_support::testing::{ensure_institution, test_pool};
use crate::{PostgresDepartmentRepository, PostgresRoleRepository};

async fn seed_role(
    repository: &PostgresRoleRepository,
    institution_id: InstitutionId,
    name: &str,
    is_root: bool,
) -> Role {
    let role = Role {
        id: RoleId::new(),
        institution_id,
        name: name.to_owned(),
        is_root,
        privileges: vec![Privilege::ViewUser],
    };
    if let Err(error) = repository.create_role(&role).await {
        panic!("create role '{name}': {error}");
    }
    role
}

fn membership(code: &str, forename: &str, role_ids: Vec<RoleId>) -> MembershipInput {
    MembershipInput {
        personal_identification_code: PersonalIdentificationCode::parse(code)
            .unwrap_or_else(|error| panic!("fixture code: {error}")),
        forename: forename.to_owned(),
        surname: "Tamm".to_owned(),
        email: None,
        phone: None,
        department_id: None,
        role_ids,
    }
}

#[tokio::test]
async fn repeated_upsert_replaces_role_set() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let roles = PostgresRoleRepository::new(pool.clone());
    let repository = PostgresInstitutionUserRepository::new(pool.clone());
    let institution_id = InstitutionId::new();
    ensure_institution(&pool, institution_id).await;
    let translator = seed_role(&roles, institution_id, "Translator", false).await;
    let manager = seed_role(&roles, institution_id, "Manager", false).await;

    let first = repository
        .upsert_membership(
            institution_id,
            membership("49403136526", "Mari", vec![translator.id, manager.id]),
        )
        .await
        .unwrap_or_else(|error| panic!("first upsert: {error}"));
    assert!(first.membership_created);

    let second = repository
        .upsert_membership(
            institution_id,
            membership("49403136526", "Maria", vec![manager.id]),
        )
        .await
        .unwrap_or_else(|error| panic!("second upsert: {error}"));

    assert!(!second.user_created);
    assert!(!second.membership_created);
    assert_eq!(second.institution_user.id, first.institution_user.id);
    assert_eq!(second.institution_user.user.forename, first.institution_user.user.forename);
    assert_eq!(second.institution_user.roles, vec![manager.summary()]);

    let restored = repository
        .upsert_membership(
            institution_id,
            membership("49403136526", "Mari", vec![translator.id]),
        )
        .await
        .unwrap_or_else(|error| panic!("third upsert: {error}"));
    assert_eq!(restored.institution_user.roles, vec![translator.summary()]);
}

#[tokio::test]
async fn upsert_without_department_keeps_the_stored_one() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let roles = PostgresRoleRepository::new(pool.clone());
    let departments = PostgresDepartmentRepository::new(pool.clone());
    let repository = PostgresInstitutionUserRepository::new(pool.clone());
    let institution_id = InstitutionId::new();
    ensure_institution(&pool, institution_id).await;
    let translator = seed_role(&roles, institution_id, "Translator", false).await;
    let department = Department {
        id: DepartmentId::new(),
        institution_id,
        name: "Translations".to_owned(),
    };
    if let Err(error) = departments.create_department(&department).await {
        panic!("create department: {error}");
    }

    let mut assigned = membership("60001019906", "Mari", vec![translator.id]);
    assigned.department_id = Some(department.id);
    repository
        .upsert_membership(institution_id, assigned)
        .await
        .unwrap_or_else(|error| panic!("first upsert: {error}"));

    let refreshed = repository
        .upsert_membership(
            institution_id,
            membership("60001019906", "Mari", vec![translator.id]),
        )
        .await
        .unwrap_or_else(|error| panic!("second upsert: {error}"));

    assert_eq!(refreshed.institution_user.department_id, Some(department.id));
}

#[tokio::test]
async fn roles_of_other_institutions_are_not_attached() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let roles = PostgresRoleRepository::new(pool.clone());
    let repository = PostgresInstitutionUserRepository::new(pool.clone());
    let institution_id = InstitutionId::new();
    let other_institution_id = InstitutionId::new();
    ensure_institution(&pool, institution_id).await;
    ensure_institution(&pool, other_institution_id).await;
    let foreign = seed_role(&roles, other_institution_id, "Translator", false).await;

    let result = repository
        .upsert_membership(
            institution_id,
            membership("60001019906", "Mari", vec![foreign.id]),
        )
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let listed = repository
        .list_institution_users(InstitutionScope::Institution(institution_id))
        .await
        .unwrap_or_else(|error| panic!("list: {error}"));
    assert!(listed.is_empty());
}

#[tokio::test]
async fn last_root_holder_cannot_be_detached_or_archived() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let roles = PostgresRoleRepository::new(pool.clone());
    let repository = PostgresInstitutionUserRepository::new(pool.clone());
    let institution_id = InstitutionId::new();
    ensure_institution(&pool, institution_id).await;
    let root = seed_role(&roles, institution_id, "Administrator", true).await;
    let translator = seed_role(&roles, institution_id, "Translator", false).await;
    let scope = InstitutionScope::Institution(institution_id);

    let holder = repository
        .upsert_membership(
            institution_id,
            membership("38505268557", "Mari", vec![root.id]),
        )
        .await
        .unwrap_or_else(|error| panic!("upsert holder: {error}"))
        .institution_user;

    let detach = repository
        .update_institution_user(
            scope,
            holder.id,
            MembershipUpdate {
                role_ids: Some(vec![translator.id]),
                ..MembershipUpdate::default()
            },
        )
        .await;
    assert!(matches!(
        detach,
        Err(AppError::Denied(Denial::OnlyUserUnderRootRole))
    ));

    let archive = repository
        .archive_institution_user(scope, holder.id, chrono::Utc::now())
        .await;
    assert!(matches!(
        archive,
        Err(AppError::Denied(Denial::OnlyUserUnderRootRole))
    ));

    repository
        .upsert_membership(
            institution_id,
            membership("37605030299", "Jüri", vec![root.id]),
        )
        .await
        .unwrap_or_else(|error| panic!("upsert second holder: {error}"));

    let archived = repository
        .archive_institution_user(scope, holder.id, chrono::Utc::now())
        .await
        .unwrap_or_else(|error| panic!("archive: {error}"));
    assert!(archived.archived_at.is_some());
    assert!(archived.roles.is_empty());
}

#[tokio::test]
async fn foreign_scope_cannot_change_membership() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let roles = PostgresRoleRepository::new(pool.clone());
    let repository = PostgresInstitutionUserRepository::new(pool.clone());
    let institution_id = InstitutionId::new();
    ensure_institution(&pool, institution_id).await;
    let translator = seed_role(&roles, institution_id, "Translator", false).await;

    let member = repository
        .upsert_membership(
            institution_id,
            membership("38505260075", "Kati", vec![translator.id]),
        )
        .await
        .unwrap_or_else(|error| panic!("upsert: {error}"))
        .institution_user;

    let foreign_scope = InstitutionScope::Institution(InstitutionId::new());
    let result = repository
        .set_deactivation_date(foreign_scope, member.id, None)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let found = repository
        .find_institution_user(foreign_scope, member.id)
        .await
        .unwrap_or_else(|error| panic!("find: {error}"));
    assert_eq!(found, None);
}
