use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct SourceDto {
    pub id: i32,
    pub domain_id: i32,
    pub ip: String,
    pub hostname: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub isp: Option<String>,
    pub known_sender: Option<String>,
    pub total_count: i64,
    pub pass_count: i64,
    pub pass_rate: f64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct KnownSenderDto {
    pub id: i32,
    /// Absent for built-in senders shared by all organizations
    pub organization_id: Option<i32>,
    pub name: String,
    pub hostname_suffix: String,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct CreateKnownSenderDto {
    pub name: String,
    pub hostname_suffix: String,
    pub description: Option<String>,
}
