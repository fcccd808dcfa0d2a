use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct AiIntegrationDto {
    pub organization_id: i32,
    pub provider: String,
    pub model: String,
    pub enabled: bool,
    /// API key reduced to its last four characters
    pub api_key_hint: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct UpsertAiIntegrationDto {
    /// Omit to keep the stored key
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub enabled: bool,
}
