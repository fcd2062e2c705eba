//! In-memory port implementations shared by service tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;

use userhub_core::{AppError, AppResult, Denial, InstitutionId};
use userhub_domain::{
    CallerContext, Department, DepartmentId, EntityEvent, Institution, InstitutionUser,
    InstitutionUserId, PersonalIdentificationCode, Privilege, Role, RoleId, User, UserId,
};

use crate::{
    BootstrapInstitutionInput, BootstrapOutcome, DepartmentRepository, EntityEventPublisher,
    EntityEventService, IdentityClaimsRepository, InstitutionRepository, InstitutionScope,
    InstitutionUpdate, InstitutionUserRepository, MembershipGrants, MembershipInput,
    MembershipUpdate, MembershipWrite, RoleRepository,
};

#[derive(Default)]
struct DirectoryState {
    institutions: Vec<Institution>,
    departments: Vec<Department>,
    roles: Vec<Role>,
    users: Vec<User>,
    memberships: Vec<InstitutionUser>,
    failing_codes: Vec<String>,
}

impl DirectoryState {
    fn scoped_membership(
        &mut self,
        scope: InstitutionScope,
        institution_user_id: InstitutionUserId,
    ) -> AppResult<&mut InstitutionUser> {
        self.memberships
            .iter_mut()
            .find(|membership| {
                membership.id == institution_user_id && scope.admits(membership.institution_id)
            })
            .ok_or_else(|| AppError::NotFound("institution user not found".to_owned()))
    }

    fn root_holders(&self, role_id: RoleId) -> usize {
        self.memberships
            .iter()
            .filter(|membership| membership.roles.iter().any(|role| role.id == role_id))
            .count()
    }

    /// Replace-and-diff sync with the last-root-holder guard.
    fn sync_roles(
        &mut self,
        institution_user_id: InstitutionUserId,
        role_ids: &[RoleId],
    ) -> AppResult<()> {
        let Some(index) = self
            .memberships
            .iter()
            .position(|membership| membership.id == institution_user_id)
        else {
            return Err(AppError::NotFound("institution user not found".to_owned()));
        };

        let institution_id = self.memberships[index].institution_id;
        for removed in self.memberships[index]
            .roles
            .iter()
            .filter(|role| role.is_root && !role_ids.contains(&role.id))
        {
            if self.root_holders(removed.id) <= 1 {
                return Err(Denial::OnlyUserUnderRootRole.into());
            }
        }

        let roles = role_ids
            .iter()
            .map(|role_id| {
                self.roles
                    .iter()
                    .find(|role| role.id == *role_id && role.institution_id == institution_id)
                    .map(Role::summary)
                    .ok_or_else(|| {
                        AppError::Conflict(format!("role '{role_id}' is not available"))
                    })
            })
            .collect::<AppResult<Vec<_>>>()?;

        self.memberships[index].roles = roles;
        Ok(())
    }
}

/// In-memory directory implementing every repository port.
#[derive(Default)]
pub(crate) struct FakeDirectory {
    state: Mutex<DirectoryState>,
}

impl FakeDirectory {
    pub(crate) async fn seed_institution(&self, institution_id: InstitutionId, name: &str) {
        self.state.lock().await.institutions.push(Institution {
            id: institution_id,
            name: name.to_owned(),
            short_name: None,
            email: None,
            phone: None,
            logo_url: None,
        });
    }

    pub(crate) async fn seed_role(
        &self,
        institution_id: InstitutionId,
        name: &str,
        is_root: bool,
        privileges: Vec<Privilege>,
    ) -> Role {
        let role = Role {
            id: RoleId::new(),
            institution_id,
            name: name.to_owned(),
            is_root,
            privileges,
        };
        self.state.lock().await.roles.push(role.clone());
        role
    }

    pub(crate) async fn seed_department(
        &self,
        institution_id: InstitutionId,
        name: &str,
    ) -> Department {
        let department = Department {
            id: DepartmentId::new(),
            institution_id,
            name: name.to_owned(),
        };
        self.state.lock().await.departments.push(department.clone());
        department
    }

    /// Stores a membership attached to a fresh role holding `privileges`.
    pub(crate) async fn seed_membership(
        &self,
        mut membership: InstitutionUser,
        privileges: Vec<Privilege>,
    ) -> InstitutionUser {
        let role = self
            .seed_role(membership.institution_id, "Seeded", false, privileges)
            .await;
        membership.roles.push(role.summary());

        let mut state = self.state.lock().await;
        state.institutions.push(Institution {
            id: membership.institution_id,
            name: "Seeded institution".to_owned(),
            short_name: None,
            email: None,
            phone: None,
            logo_url: None,
        });
        state.users.push(membership.user.clone());
        state.memberships.push(membership.clone());
        membership
    }

    /// Stores a membership holding exactly the given roles.
    pub(crate) async fn seed_member_with_roles(
        &self,
        mut membership: InstitutionUser,
        roles: &[Role],
    ) -> InstitutionUser {
        membership.roles = roles.iter().map(Role::summary).collect();

        let mut state = self.state.lock().await;
        state.users.push(membership.user.clone());
        state.memberships.push(membership.clone());
        membership
    }

    pub(crate) async fn fail_upserts_for(&self, code: &str) {
        self.state.lock().await.failing_codes.push(code.to_owned());
    }

    pub(crate) async fn users(&self) -> Vec<User> {
        self.state.lock().await.users.clone()
    }

    pub(crate) async fn memberships(&self) -> Vec<InstitutionUser> {
        self.state.lock().await.memberships.clone()
    }

    pub(crate) async fn roles(&self) -> Vec<Role> {
        self.state.lock().await.roles.clone()
    }
}

#[async_trait]
impl InstitutionRepository for FakeDirectory {
    async fn find_institution(
        &self,
        institution_id: InstitutionId,
    ) -> AppResult<Option<Institution>> {
        Ok(self
            .state
            .lock()
            .await
            .institutions
            .iter()
            .find(|institution| institution.id == institution_id)
            .cloned())
    }

    async fn update_institution(
        &self,
        institution_id: InstitutionId,
        update: &InstitutionUpdate,
    ) -> AppResult<Institution> {
        let mut state = self.state.lock().await;
        let institution = state
            .institutions
            .iter_mut()
            .find(|institution| institution.id == institution_id)
            .ok_or_else(|| AppError::NotFound("institution not found".to_owned()))?;

        institution.name = update.name.clone();
        institution.short_name = update.short_name.clone();
        institution.email = update.email.clone();
        institution.phone = update.phone.clone();
        institution.logo_url = update.logo_url.clone();
        Ok(institution.clone())
    }

    async fn bootstrap_institution(
        &self,
        input: BootstrapInstitutionInput,
    ) -> AppResult<BootstrapOutcome> {
        {
            let mut state = self.state.lock().await;
            state.institutions.push(input.institution.clone());
            state.roles.push(input.root_role.clone());
        }

        let write = self
            .upsert_membership(input.institution.id, input.administrator)
            .await?;

        Ok(BootstrapOutcome {
            institution: input.institution,
            root_role: input.root_role,
            administrator: write.institution_user,
            user_created: write.user_created,
        })
    }
}

#[async_trait]
impl DepartmentRepository for FakeDirectory {
    async fn list_departments(&self, scope: InstitutionScope) -> AppResult<Vec<Department>> {
        Ok(self
            .state
            .lock()
            .await
            .departments
            .iter()
            .filter(|department| scope.admits(department.institution_id))
            .cloned()
            .collect())
    }

    async fn find_department(
        &self,
        scope: InstitutionScope,
        department_id: DepartmentId,
    ) -> AppResult<Option<Department>> {
        Ok(self
            .state
            .lock()
            .await
            .departments
            .iter()
            .find(|department| {
                department.id == department_id && scope.admits(department.institution_id)
            })
            .cloned())
    }

    async fn create_department(&self, department: &Department) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.departments.iter().any(|existing| {
            existing.institution_id == department.institution_id && existing.name == department.name
        }) {
            return Err(AppError::Conflict(format!(
                "department '{}' already exists",
                department.name
            )));
        }

        state.departments.push(department.clone());
        Ok(())
    }

    async fn update_department(
        &self,
        scope: InstitutionScope,
        department: &Department,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let existing = state
            .departments
            .iter_mut()
            .find(|existing| existing.id == department.id && scope.admits(existing.institution_id))
            .ok_or_else(|| AppError::NotFound("department not found".to_owned()))?;

        existing.name = department.name.clone();
        Ok(())
    }

    async fn delete_department(
        &self,
        scope: InstitutionScope,
        department_id: DepartmentId,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.departments.retain(|department| {
            !(department.id == department_id && scope.admits(department.institution_id))
        });
        for membership in &mut state.memberships {
            if membership.department_id == Some(department_id) {
                membership.department_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for FakeDirectory {
    async fn list_roles(&self, scope: InstitutionScope) -> AppResult<Vec<Role>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .iter()
            .filter(|role| scope.admits(role.institution_id))
            .cloned()
            .collect())
    }

    async fn find_role(&self, scope: InstitutionScope, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .iter()
            .find(|role| role.id == role_id && scope.admits(role.institution_id))
            .cloned())
    }

    async fn find_roles_by_ids(
        &self,
        scope: InstitutionScope,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<Role>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .iter()
            .filter(|role| role_ids.contains(&role.id) && scope.admits(role.institution_id))
            .cloned()
            .collect())
    }

    async fn find_roles_by_names(
        &self,
        scope: InstitutionScope,
        names: &[String],
    ) -> AppResult<Vec<Role>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .iter()
            .filter(|role| names.contains(&role.name) && scope.admits(role.institution_id))
            .cloned()
            .collect())
    }

    async fn create_role(&self, role: &Role) -> AppResult<()> {
        self.state.lock().await.roles.push(role.clone());
        Ok(())
    }

    async fn update_role(&self, scope: InstitutionScope, role: &Role) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let existing = state
            .roles
            .iter_mut()
            .find(|existing| existing.id == role.id && scope.admits(existing.institution_id))
            .ok_or_else(|| AppError::NotFound("role not found".to_owned()))?;

        *existing = role.clone();
        Ok(())
    }

    async fn delete_role(&self, scope: InstitutionScope, role_id: RoleId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .roles
            .retain(|role| !(role.id == role_id && scope.admits(role.institution_id)));
        for membership in &mut state.memberships {
            membership.roles.retain(|role| role.id != role_id);
        }
        Ok(())
    }
}

#[async_trait]
impl InstitutionUserRepository for FakeDirectory {
    async fn list_institution_users(
        &self,
        scope: InstitutionScope,
    ) -> AppResult<Vec<InstitutionUser>> {
        Ok(self
            .state
            .lock()
            .await
            .memberships
            .iter()
            .filter(|membership| scope.admits(membership.institution_id))
            .cloned()
            .collect())
    }

    async fn find_institution_user(
        &self,
        scope: InstitutionScope,
        institution_user_id: InstitutionUserId,
    ) -> AppResult<Option<InstitutionUser>> {
        Ok(self
            .state
            .lock()
            .await
            .memberships
            .iter()
            .find(|membership| {
                membership.id == institution_user_id && scope.admits(membership.institution_id)
            })
            .cloned())
    }

    async fn upsert_membership(
        &self,
        institution_id: InstitutionId,
        input: MembershipInput,
    ) -> AppResult<MembershipWrite> {
        let mut state = self.state.lock().await;
        let code = input.personal_identification_code.as_str().to_owned();
        if state.failing_codes.contains(&code) {
            return Err(AppError::Conflict(format!(
                "user '{code}' was created concurrently"
            )));
        }

        let existing_user = state
            .users
            .iter()
            .find(|user| user.personal_identification_code.as_str() == code)
            .cloned();
        let user_created = existing_user.is_none();
        let user = existing_user.unwrap_or_else(|| User {
            id: UserId::new(),
            personal_identification_code: input.personal_identification_code.clone(),
            forename: input.forename.clone(),
            surname: input.surname.clone(),
        });
        if user_created {
            state.users.push(user.clone());
        }

        let existing_membership = state.memberships.iter().position(|membership| {
            membership.institution_id == institution_id && membership.user.id == user.id
        });
        if existing_membership.is_some_and(|index| state.memberships[index].archived_at.is_some())
        {
            return Err(AppError::Conflict(format!(
                "institution user '{code}' is archived"
            )));
        }

        let membership_created = existing_membership.is_none();
        let index = match existing_membership {
            Some(index) => index,
            None => {
                state.memberships.push(InstitutionUser {
                    id: InstitutionUserId::new(),
                    institution_id,
                    user,
                    email: None,
                    phone: None,
                    department_id: None,
                    deactivation_date: None,
                    archived_at: None,
                    roles: Vec::new(),
                });
                state.memberships.len() - 1
            }
        };

        let snapshot = state.memberships[index].clone();
        {
            let membership = &mut state.memberships[index];
            membership.email = input.email;
            membership.phone = input.phone;
            if input.department_id.is_some() {
                membership.department_id = input.department_id;
            }
        }
        if let Err(error) = state.sync_roles(snapshot.id, &input.role_ids) {
            if membership_created {
                state.memberships.pop();
            } else {
                state.memberships[index] = snapshot;
            }
            return Err(error);
        }

        Ok(MembershipWrite {
            institution_user: state.memberships[index].clone(),
            user_created,
            membership_created,
        })
    }

    async fn update_institution_user(
        &self,
        scope: InstitutionScope,
        institution_user_id: InstitutionUserId,
        update: MembershipUpdate,
    ) -> AppResult<InstitutionUser> {
        let mut state = self.state.lock().await;
        if let Some(role_ids) = &update.role_ids {
            state.scoped_membership(scope, institution_user_id)?;
            state.sync_roles(institution_user_id, role_ids)?;
        }

        let membership = state.scoped_membership(scope, institution_user_id)?;
        if let Some(email) = update.email {
            membership.email = email;
        }
        if let Some(phone) = update.phone {
            membership.phone = phone;
        }
        if let Some(department_id) = update.department_id {
            membership.department_id = department_id;
        }
        Ok(membership.clone())
    }

    async fn set_deactivation_date(
        &self,
        scope: InstitutionScope,
        institution_user_id: InstitutionUserId,
        deactivation_date: Option<NaiveDate>,
    ) -> AppResult<InstitutionUser> {
        let mut state = self.state.lock().await;
        let membership = state.scoped_membership(scope, institution_user_id)?;
        membership.deactivation_date = deactivation_date;
        Ok(membership.clone())
    }

    async fn archive_institution_user(
        &self,
        scope: InstitutionScope,
        institution_user_id: InstitutionUserId,
        archived_at: DateTime<Utc>,
    ) -> AppResult<InstitutionUser> {
        let mut state = self.state.lock().await;
        state.scoped_membership(scope, institution_user_id)?;
        state.sync_roles(institution_user_id, &[])?;

        let membership = state.scoped_membership(scope, institution_user_id)?;
        membership.archived_at = Some(archived_at);
        Ok(membership.clone())
    }
}

#[async_trait]
impl IdentityClaimsRepository for FakeDirectory {
    async fn find_user_by_personal_code(
        &self,
        code: &PersonalIdentificationCode,
    ) -> AppResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .iter()
            .find(|user| &user.personal_identification_code == code)
            .cloned())
    }

    async fn find_membership_grants(
        &self,
        user_id: UserId,
        institution_id: InstitutionId,
    ) -> AppResult<Option<MembershipGrants>> {
        let state = self.state.lock().await;
        let Some(membership) = state.memberships.iter().find(|membership| {
            membership.user.id == user_id && membership.institution_id == institution_id
        }) else {
            return Ok(None);
        };

        let institution_name = state
            .institutions
            .iter()
            .find(|institution| institution.id == institution_id)
            .map(|institution| institution.name.clone())
            .unwrap_or_default();
        let privileges = state
            .roles
            .iter()
            .filter(|role| membership.roles.iter().any(|held| held.id == role.id))
            .flat_map(|role| role.privileges.iter().copied())
            .collect();

        Ok(Some(MembershipGrants {
            institution_name,
            membership: membership.clone(),
            privileges,
        }))
    }
}

/// Publisher recording topics in publication order.
#[derive(Default)]
pub(crate) struct RecordingPublisher {
    topics: Mutex<Vec<String>>,
}

impl RecordingPublisher {
    pub(crate) async fn topics(&self) -> Vec<String> {
        self.topics.lock().await.clone()
    }
}

#[async_trait]
impl EntityEventPublisher for RecordingPublisher {
    async fn publish(&self, event: &EntityEvent) -> AppResult<()> {
        self.topics.lock().await.push(event.topic());
        Ok(())
    }
}

pub(crate) fn recording_events() -> (Arc<RecordingPublisher>, EntityEventService) {
    let publisher = Arc::new(RecordingPublisher::default());
    let events = EntityEventService::new(publisher.clone());
    (publisher, events)
}

pub(crate) fn caller(institution_id: InstitutionId, privileges: &[Privilege]) -> CallerContext {
    CallerContext::new(
        institution_id,
        UserId::new(),
        InstitutionUserId::new(),
        privileges.iter().copied(),
    )
}

pub(crate) fn fixture_membership(institution_id: InstitutionId, code: &str) -> InstitutionUser {
    InstitutionUser {
        id: InstitutionUserId::new(),
        institution_id,
        user: User {
            id: UserId::new(),
            personal_identification_code: PersonalIdentificationCode::parse(code)
                .unwrap_or_else(|error| panic!("fixture code: {error}")),
            forename: "Mari".to_owned(),
            surname: "Tamm".to_owned(),
        },
        email: None,
        phone: None,
        department_id: None,
        deactivation_date: None,
        archived_at: None,
        roles: Vec::new(),
    }
}
