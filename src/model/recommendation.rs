use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DmarcPolicy {
    None,
    Quarantine,
    Reject,
}

impl DmarcPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Quarantine => "quarantine",
            Self::Reject => "reject",
        }
    }
}

impl FromStr for DmarcPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "quarantine" => Ok(Self::Quarantine),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown DMARC policy '{}'", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct RecommendationDto {
    pub current_policy: Option<DmarcPolicy>,
    pub policy: DmarcPolicy,
    pub pct: Option<u8>,
    pub confidence: Confidence,
    pub reasons: Vec<String>,
    pub suggested_record: String,
    pub pass_rate_7d: f64,
    pub pass_rate_30d: f64,
    pub pass_rate_all: f64,
    pub unknown_sources: u64,
    pub days_monitored: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct AiRecommendationDto {
    pub domain_id: i32,
    pub model: String,
    pub markdown: String,
    pub html: String,
    pub cached: bool,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
