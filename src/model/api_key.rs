use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct ApiKeyDto {
    pub id: i32,
    pub name: String,
    pub prefix: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct CreateApiKeyDto {
    pub name: String,
}

/// Returned once on creation; the plain key is never retrievable again.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct CreatedApiKeyDto {
    pub api_key: ApiKeyDto,
    pub key: String,
}
