
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use userhub_core::{AppError, AppResult};
use userhub_domain::{
    CallerContext, EmailAddress, PersonName, PersonalIdentificationCode, PhoneNumber,
};

use crate::csv_import::{
    CsvReader, CsvValidator, EmailRule, FieldErrors, KnownNamesRule, PersonNameRule,
    PersonalCodeRule, PhoneRule, RequiredRule, RowRecord, RuleSet,
};
use crate::institution_user_service::membership_events;
use crate::{
    EntityEventService, EntityPolicy, InstitutionUserPolicy, InstitutionUserRepository,
    MembershipInput, PolicyAction, RolePolicy, RoleRepository, authorize,
};

/// Header row of the user import file.
pub const USER_IMPORT_HEADERS: [&str; 7] = [
    "Isikukood",
    "Nimi",
    "E-mail",
    "Telefon",
    "Üksus",
    "Roll",
    "Teostaja",
];

/// Attribute names mapped positionally onto the import columns.
pub const USER_IMPORT_ATTRIBUTES: [&str; 7] = [
    PERSONAL_CODE,
    NAME,
    EMAIL,
    PHONE,
    "department",
    ROLE,
    "is_vendor",
];

const PERSONAL_CODE: &str = "personal_identification_code";
const NAME: &str = "name";
const EMAIL: &str = "email";
const PHONE: &str = "phone";
const ROLE: &str = "role";

/// Result of validating a whole file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileValidation {
    /// Number of data rows read.
    pub rows: usize,
    /// Rows with at least one rule failure, in input order.
    pub invalid_rows: Vec<RowRecord>,
}

/// Result of an import attempt.
#[derive(Debug)]
pub enum ImportOutcome {
    /// Content errors were found; nothing was imported.
    Rejected {
        /// Rows with rule failures, in input order.
        invalid_rows: Vec<RowRecord>,
    },
    /// Every row was committed.
    Completed {
        /// Number of committed rows.
        imported: usize,
    },
    /// A row failed while being committed; earlier rows stay committed.
    Interrupted {
        /// Number of committed rows.
        imported: usize,
        /// One-based number of the failed row.
        row: usize,
        /// Failure of the row transaction.
        error: AppError,
    },
}

/// Application service for bulk user import from CSV files.
#[derive(Clone)]
pub struct UserImportService {
    repository: Arc<dyn InstitutionUserRepository>,
    role_repository: Arc<dyn RoleRepository>,
    events: EntityEventService,
}

impl UserImportService {
    /// Creates a service from dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn InstitutionUserRepository>,
        role_repository: Arc<dyn RoleRepository>,
        events: EntityEventService,
    ) -> Self {
        Self {
            repository,
            role_repository,
            events,
        }
    }

    /// Validates every row of a file without writing anything.
    pub async fn validate_file(
        &self,
        context: &CallerContext,
        source: &[u8],
    ) -> AppResult<FileValidation> {
        authorize(&InstitutionUserPolicy, PolicyAction::Import, context, None)?;
        let validator = self.validator(context).await?;
        validate_source(&validator, source)
    }

    /// Validates attribute values of a single row.
    pub async fn validate_row(
        &self,
        context: &CallerContext,
        attributes: &BTreeMap<String, String>,
    ) -> AppResult<FieldErrors> {
        authorize(&InstitutionUserPolicy, PolicyAction::Import, context, None)?;
        let validator = self.validator(context).await?;
        Ok(validator.validate_attributes(attributes))
    }

    /// Imports a file. Nothing is written unless every row passes validation; each row is
    /// then committed in its own transaction.
    pub async fn import_file(
        &self,
        context: &CallerContext,
        source: &[u8],
    ) -> AppResult<ImportOutcome> {
        authorize(&InstitutionUserPolicy, PolicyAction::Import, context, None)?;
        let validator = self.validator(context).await?;

        let validation = validate_source(&validator, source)?;
        if !validation.invalid_rows.is_empty() {
            info!(
                institution_id = %context.institution_id(),
                invalid_rows = validation.invalid_rows.len(),
                "rejected user import file"
            );
            return Ok(ImportOutcome::Rejected {
                invalid_rows: validation.invalid_rows,
            });
        }

        let mut imported = 0;
        for record in validator.validated_rows(CsvReader::new(source))? {
            let record = record?;
            let row = record.row;

            if let Err(error) = self.import_row(context, record).await {
                warn!(
                    institution_id = %context.institution_id(),
                    row,
                    imported,
                    %error,
                    "user import interrupted"
                );
                return Ok(ImportOutcome::Interrupted {
                    imported,
                    row,
                    error,
                });
            }

            imported += 1;
        }

        info!(
            institution_id = %context.institution_id(),
            imported,
            "imported users"
        );
        Ok(ImportOutcome::Completed { imported })
    }

    async fn import_row(&self, context: &CallerContext, record: RowRecord) -> AppResult<()> {
        if !record.is_valid() {
            return Err(AppError::Validation(format!(
                "row {} changed between validation and import",
                record.row
            )));
        }

        let name = PersonName::parse(record.value(NAME))?;
        let role_names = KnownNamesRule::split(record.value(ROLE));
        let roles = self
            .role_repository
            .find_roles_by_names(RolePolicy.scope(context), &role_names)
            .await?;
        if roles.len() != role_names.len() {
            return Err(AppError::Conflict(format!(
                "roles '{}' are no longer available",
                role_names.join(", ")
            )));
        }

        let input = MembershipInput {
            personal_identification_code: PersonalIdentificationCode::parse(
                record.value(PERSONAL_CODE),
            )?,
            forename: name.forename().to_owned(),
            surname: name.surname().to_owned(),
            email: Some(EmailAddress::new(record.value(EMAIL))?),
            phone: Some(PhoneNumber::new(record.value(PHONE))?),
            department_id: None,
            role_ids: roles.into_iter().map(|role| role.id).collect(),
        };

        let write = self
            .repository
            .upsert_membership(context.institution_id(), input)
            .await?;

        debug!(
            row = record.row,
            institution_user_id = %write.institution_user.id,
            "imported user row"
        );
        self.events.dispatch(membership_events(&write)).await;

        Ok(())
    }

    async fn validator(&self, context: &CallerContext) -> AppResult<CsvValidator> {
        let role_names = self
            .role_repository
            .list_roles(RolePolicy.scope(context))
            .await?
            .into_iter()
            .map(|role| role.name);

        let rules = RuleSet::new()
            .rule(PERSONAL_CODE, RequiredRule)
            .rule(PERSONAL_CODE, PersonalCodeRule)
            .rule(NAME, RequiredRule)
            .rule(NAME, PersonNameRule)
            .rule(EMAIL, RequiredRule)
            .rule(EMAIL, EmailRule)
            .rule(PHONE, RequiredRule)
            .rule(PHONE, PhoneRule)
            .rule(ROLE, RequiredRule)
            .rule(ROLE, KnownNamesRule::new("role", role_names));

        let validator = CsvValidator::new(
            USER_IMPORT_ATTRIBUTES.map(str::to_owned).to_vec(),
            rules,
        )?
        .with_expected_headers(USER_IMPORT_HEADERS.map(str::to_owned).to_vec());

        Ok(validator)
    }
}

fn validate_source(validator: &CsvValidator, source: &[u8]) -> AppResult<FileValidation> {
    let mut rows = 0;
    let mut invalid_rows = Vec::new();

    for record in validator.validated_rows(CsvReader::new(source))? {
        let record = record?;
        rows += 1;
        if !record.is_valid() {
            invalid_rows.push(record);
        }
    }

    Ok(FileValidation { rows, invalid_rows })
}
