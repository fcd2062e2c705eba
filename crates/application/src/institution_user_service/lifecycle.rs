use chrono::{NaiveDate, Utc};
use tracing::info;

use userhub_core::{AppError, AppResult};
use userhub_domain::{CallerContext, InstitutionUser, InstitutionUserId};

use super::InstitutionUserService;
use crate::{EntityPolicy, InstitutionUserPolicy, PolicyAction, authorize};

impl InstitutionUserService {
    /// Schedules the membership to become inactive from the given date.
    pub async fn deactivate(
        &self,
        context: &CallerContext,
        institution_user_id: InstitutionUserId,
        deactivation_date: NaiveDate,
    ) -> AppResult<InstitutionUser> {
        let institution_user = self.find(context, institution_user_id).await?;
        authorize(
            &InstitutionUserPolicy,
            PolicyAction::Deactivate,
            context,
            Some(&institution_user),
        )?;
        ensure_not_archived(&institution_user)?;

        let institution_user = self
            .repository
            .set_deactivation_date(
                InstitutionUserPolicy.scope(context),
                institution_user.id,
                Some(deactivation_date),
            )
            .await?;

        info!(
            institution_user_id = %institution_user.id,
            %deactivation_date,
            "deactivated institution user"
        );
        self.publish_saved(&institution_user).await;
        Ok(institution_user)
    }

    /// Clears a scheduled or past deactivation.
    pub async fn activate(
        &self,
        context: &CallerContext,
        institution_user_id: InstitutionUserId,
    ) -> AppResult<InstitutionUser> {
        let institution_user = self.find(context, institution_user_id).await?;
        authorize(
            &InstitutionUserPolicy,
            PolicyAction::Activate,
            context,
            Some(&institution_user),
        )?;
        ensure_not_archived(&institution_user)?;

        let institution_user = self
            .repository
            .set_deactivation_date(InstitutionUserPolicy.scope(context), institution_user.id, None)
            .await?;

        self.publish_saved(&institution_user).await;
        Ok(institution_user)
    }

    /// Archives the membership and revokes its roles. The only holder of a root role is kept.
    pub async fn archive(
        &self,
        context: &CallerContext,
        institution_user_id: InstitutionUserId,
    ) -> AppResult<InstitutionUser> {
        let institution_user = self.find(context, institution_user_id).await?;
        authorize(
            &InstitutionUserPolicy,
            PolicyAction::Archive,
            context,
            Some(&institution_user),
        )?;
        ensure_not_archived(&institution_user)?;

        let institution_user = self
            .repository
            .archive_institution_user(
                InstitutionUserPolicy.scope(context),
                institution_user.id,
                Utc::now(),
            )
            .await?;

        info!(institution_user_id = %institution_user.id, "archived institution user");
        self.publish_saved(&institution_user).await;
        Ok(institution_user)
    }
}

fn ensure_not_archived(institution_user: &InstitutionUser) -> AppResult<()> {
    if institution_user.archived_at.is_some() {
        return Err(AppError::Conflict(format!(
            "institution user '{}' is archived",
            institution_user.id
        )));
    }

    Ok(())
}
