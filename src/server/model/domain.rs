use chrono::{DateTime, Utc};

use crate::model::domain::{DomainDto, DomainSummaryDto};

#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    pub id: i32,
    pub organization_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_report_at: Option<DateTime<Utc>>,
}

impl Domain {
    pub fn from_entity(entity: entity::domain::Model) -> Self {
        Self {
            id: entity.id,
            organization_id: entity.organization_id,
            name: entity.name,
            created_at: entity.created_at,
            last_report_at: entity.last_report_at,
        }
    }

    pub fn into_dto(self) -> DomainDto {
        DomainDto {
            id: self.id,
            organization_id: self.organization_id,
            name: self.name,
            created_at: self.created_at,
            last_report_at: self.last_report_at,
        }
    }
}

/// Domain with its message totals over the last 30 days.
#[derive(Debug, Clone)]
pub struct DomainSummary {
    pub domain: Domain,
    pub total_messages: i64,
    pub pass_rate: f64,
}

impl DomainSummary {
    pub fn into_dto(self) -> DomainSummaryDto {
        DomainSummaryDto {
            domain: self.domain.into_dto(),
            total_messages: self.total_messages,
            pass_rate: self.pass_rate,
        }
    }
}
