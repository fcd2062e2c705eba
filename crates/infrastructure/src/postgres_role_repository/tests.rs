use userhub_application::{InstitutionScope, RoleRepository};
use userhub_core::{AppError, InstitutionId};
use userhub_domain::{Privilege, Role, RoleId};

use super::PostgresRoleRepository;
use crate::postgres_support::testing::{ensure_institution, test_pool};

fn role(institution_id: InstitutionId, name: &str, privileges: Vec<Privilege>) -> Role {
    Role {
        id: RoleId::new(),
        institution_id,
        name: name.to_owned(),
        is_root: false,
        privileges,
    }
}

#[tokio::test]
async fn create_and_update_replace_grants() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleRepository::new(pool.clone());
    let institution_id = InstitutionId::new();
    ensure_institution(&pool, institution_id).await;
    let scope = InstitutionScope::Institution(institution_id);

    let translator = role(
        institution_id,
        "Translator",
        vec![Privilege::ViewUser, Privilege::ViewRole],
    );
    assert!(repository.create_role(&translator).await.is_ok());

    let updated = Role {
        name: "Senior translator".to_owned(),
        privileges: vec![Privilege::EditUser],
        ..translator.clone()
    };
    assert!(repository.update_role(scope, &updated).await.is_ok());

    let stored = repository
        .find_role(scope, translator.id)
        .await
        .unwrap_or_else(|error| panic!("find role: {error}"));
    assert_eq!(stored, Some(updated));
}

#[tokio::test]
async fn lookups_respect_scope_and_deletion() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresRoleRepository::new(pool.clone());
    let institution_id = InstitutionId::new();
    let other_institution_id = InstitutionId::new();
    ensure_institution(&pool, institution_id).await;
    ensure_institution(&pool, other_institution_id).await;

    let manager = role(institution_id, "Manager", vec![Privilege::EditUser]);
    let foreign = role(other_institution_id, "Manager", vec![Privilege::EditUser]);
    assert!(repository.create_role(&manager).await.is_ok());
    assert!(repository.create_role(&foreign).await.is_ok());

    let scope = InstitutionScope::Institution(institution_id);
    let by_name = repository
        .find_roles_by_names(scope, &["Manager".to_owned()])
        .await
        .unwrap_or_else(|error| panic!("find by names: {error}"));
    assert_eq!(by_name, vec![manager.clone()]);

    let by_id = repository
        .find_roles_by_ids(scope, &[manager.id, foreign.id])
        .await
        .unwrap_or_else(|error| panic!("find by ids: {error}"));
    assert_eq!(by_id, vec![manager.clone()]);

    assert!(repository.delete_role(scope, manager.id).await.is_ok());
    let after_delete = repository
        .list_roles(scope)
        .await
        .unwrap_or_else(|error| panic!("list roles: {error}"));
    assert!(after_delete.is_empty());

    let missing = repository.delete_role(scope, manager.id).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}
