use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use userhub_application::{
    BootstrapInstitutionInput, BootstrapOutcome, InstitutionRepository, InstitutionUpdate,
};
use userhub_core::{AppError, AppResult, InstitutionId};
use userhub_domain::{EmailAddress, Institution, PhoneNumber};

use crate::postgres_institution_user_repository::{stored, upsert_membership_in};
use crate::postgres_role_repository::insert_role;
use crate::postgres_support::{begin, commit, internal};


/// PostgreSQL-backed institution repository.
#[derive(Clone)]
pub struct PostgresInstitutionRepository {
    pool: PgPool,
}

impl PostgresInstitutionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct InstitutionRow {
    id: Uuid,
    name: String,
    short_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    logo_url: Option<String>,
}

impl InstitutionRow {
    fn into_institution(self) -> AppResult<Institution> {
        Ok(Institution {
            id: InstitutionId::from_uuid(self.id),
            name: self.name,
            short_name: self.short_name,
            email: self
                .email
                .map(|email| stored(EmailAddress::new(email), "institution email"))
                .transpose()?,
            phone: self
                .phone
                .map(|phone| stored(PhoneNumber::new(phone), "institution phone"))
                .transpose()?,
            logo_url: self.logo_url,
        })
    }
}

#[async_trait]
impl InstitutionRepository for PostgresInstitutionRepository {
    async fn find_institution(
        &self,
        institution_id: InstitutionId,
    ) -> AppResult<Option<Institution>> {
        sqlx::query_as::<_, InstitutionRow>(
            r#"
            SELECT id, name, short_name, email, phone, logo_url
            FROM institutions
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(institution_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("find institution"))?
        .map(InstitutionRow::into_institution)
        .transpose()
    }

    async fn update_institution(
        &self,
        institution_id: InstitutionId,
        update: &InstitutionUpdate,
    ) -> AppResult<Institution> {
        sqlx::query_as::<_, InstitutionRow>(
            r#"
            UPDATE institutions
            SET name = $2,
                short_name = $3,
                email = $4,
                phone = $5,
                logo_url = $6,
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, short_name, email, phone, logo_url
            "#,
        )
        .bind(institution_id.as_uuid())
        .bind(update.name.as_str())
        .bind(update.short_name.as_deref())
        .bind(update.email.as_ref().map(|email| email.as_str()))
        .bind(update.phone.as_ref().map(|phone| phone.as_str()))
        .bind(update.logo_url.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("update institution"))?
        .ok_or_else(|| AppError::NotFound(format!("institution '{institution_id}' not found")))?
        .into_institution()
    }

    async fn bootstrap_institution(
        &self,
        input: BootstrapInstitutionInput,
    ) -> AppResult<BootstrapOutcome> {
        let BootstrapInstitutionInput {
            institution,
            root_role,
            administrator,
        } = input;

        let mut transaction = begin(&self.pool).await?;

        sqlx::query(
            r#"
            INSERT INTO institutions (id, name, short_name, email, phone, logo_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(institution.id.as_uuid())
        .bind(institution.name.as_str())
        .bind(institution.short_name.as_deref())
        .bind(institution.email.as_ref().map(|email| email.as_str()))
        .bind(institution.phone.as_ref().map(|phone| phone.as_str()))
        .bind(institution.logo_url.as_deref())
        .execute(&mut *transaction)
        .await
        .map_err(internal("create institution"))?;

        insert_role(&mut transaction, &root_role).await?;
        let write = upsert_membership_in(&mut transaction, institution.id, administrator).await?;

        commit(transaction).await?;

        Ok(BootstrapOutcome {
            institution,
            root_role,
            administrator: write.institution_user,
            user_created: write.user_created,
        })
    }
}
