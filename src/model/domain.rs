use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct DomainDto {
    pub id: i32,
    pub organization_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_report_at: Option<DateTime<Utc>>,
}

/// Domain with its 30-day headline numbers, as shown in domain lists.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct DomainSummaryDto {
    #[serde(flatten)]
    pub domain: DomainDto,
    pub total_messages: i64,
    pub pass_rate: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct CreateDomainDto {
    pub name: String,
}
