use chrono::{DateTime, Utc};

use crate::{
    model::{
        alert::WebhookKind,
        scheduled_report::{Frequency, ScheduledReportDto},
    },
    server::{error::internal::InternalError, util::parse::parse_column},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledReport {
    pub id: i32,
    pub organization_id: i32,
    pub frequency: Frequency,
    pub webhook_url: String,
    pub webhook_kind: WebhookKind,
    pub enabled: bool,
    pub last_sent_at: Option<DateTime<Utc>>,
    pub next_run_at: DateTime<Utc>,
}

impl ScheduledReport {
    pub fn from_entity(entity: entity::scheduled_report::Model) -> Result<Self, InternalError> {
        Ok(Self {
            id: entity.id,
            organization_id: entity.organization_id,
            frequency: parse_column("scheduled_report.frequency", &entity.frequency)?,
            webhook_url: entity.webhook_url,
            webhook_kind: parse_column("scheduled_report.webhook_kind", &entity.webhook_kind)?,
            enabled: entity.enabled,
            last_sent_at: entity.last_sent_at,
            next_run_at: entity.next_run_at,
        })
    }

    pub fn into_dto(self) -> ScheduledReportDto {
        ScheduledReportDto {
            id: self.id,
            organization_id: self.organization_id,
            frequency: self.frequency,
            webhook_url: self.webhook_url,
            webhook_kind: self.webhook_kind,
            enabled: self.enabled,
            last_sent_at: self.last_sent_at,
            next_run_at: self.next_run_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpsertScheduledReportParams {
    pub organization_id: i32,
    pub frequency: Frequency,
    pub webhook_url: String,
    pub webhook_kind: WebhookKind,
    pub enabled: bool,
    pub next_run_at: DateTime<Utc>,
}
