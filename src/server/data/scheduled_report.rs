use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::server::model::scheduled_report::{ScheduledReport, UpsertScheduledReportParams};

pub struct ScheduledReportRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ScheduledReportRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, param: UpsertScheduledReportParams) -> Result<ScheduledReport, DbErr> {
        let schedule = entity::scheduled_report::ActiveModel {
            organization_id: ActiveValue::Set(param.organization_id),
            frequency: ActiveValue::Set(param.frequency.as_str().to_string()),
            webhook_url: ActiveValue::Set(param.webhook_url),
            webhook_kind: ActiveValue::Set(param.webhook_kind.as_str().to_string()),
            enabled: ActiveValue::Set(param.enabled),
            last_sent_at: ActiveValue::Set(None),
            next_run_at: ActiveValue::Set(param.next_run_at),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        to_domain(schedule)
    }

    pub async fn list_by_organization(
        &self,
        organization_id: i32,
    ) -> Result<Vec<ScheduledReport>, DbErr> {
        entity::prelude::ScheduledReport::find()
            .filter(entity::scheduled_report::Column::OrganizationId.eq(organization_id))
            .order_by_asc(entity::scheduled_report::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    /// Replaces the settings of a schedule in the organization.
    ///
    /// # Returns
    /// - `Ok(Some(schedule))` - Updated schedule
    /// - `Ok(None)` - Schedule not found in the organization
    pub async fn update(
        &self,
        id: i32,
        param: UpsertScheduledReportParams,
    ) -> Result<Option<ScheduledReport>, DbErr> {
        let Some(existing) = entity::prelude::ScheduledReport::find_by_id(id)
            .filter(entity::scheduled_report::Column::OrganizationId.eq(param.organization_id))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: entity::scheduled_report::ActiveModel = existing.into();
        active.frequency = ActiveValue::Set(param.frequency.as_str().to_string());
        active.webhook_url = ActiveValue::Set(param.webhook_url);
        active.webhook_kind = ActiveValue::Set(param.webhook_kind.as_str().to_string());
        active.enabled = ActiveValue::Set(param.enabled);
        active.next_run_at = ActiveValue::Set(param.next_run_at);
        let schedule = active.update(self.db).await?;

        to_domain(schedule).map(Some)
    }

    pub async fn delete(&self, organization_id: i32, id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::ScheduledReport::delete_many()
            .filter(entity::scheduled_report::Column::Id.eq(id))
            .filter(entity::scheduled_report::Column::OrganizationId.eq(organization_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Enabled schedules whose next run is at or before `now`.
    pub async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledReport>, DbErr> {
        entity::prelude::ScheduledReport::find()
            .filter(entity::scheduled_report::Column::Enabled.eq(true))
            .filter(entity::scheduled_report::Column::NextRunAt.lte(now))
            .order_by_asc(entity::scheduled_report::Column::NextRunAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    pub async fn mark_sent(
        &self,
        id: i32,
        sent_at: DateTime<Utc>,
        next_run_at: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        entity::scheduled_report::ActiveModel {
            id: ActiveValue::Unchanged(id),
            last_sent_at: ActiveValue::Set(Some(sent_at)),
            next_run_at: ActiveValue::Set(next_run_at),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(())
    }
}

fn to_domain(entity: entity::scheduled_report::Model) -> Result<ScheduledReport, DbErr> {
    ScheduledReport::from_entity(entity).map_err(|e| DbErr::Custom(e.to_string()))
}
