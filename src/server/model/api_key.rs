use chrono::{DateTime, Utc};

use crate::model::api_key::ApiKeyDto;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiKey {
    pub id: i32,
    pub organization_id: i32,
    pub name: String,
    pub prefix: String,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    pub fn from_entity(entity: entity::api_key::Model) -> Self {
        Self {
            id: entity.id,
            organization_id: entity.organization_id,
            name: entity.name,
            prefix: entity.prefix,
            created_by: entity.created_by,
            created_at: entity.created_at,
            last_used_at: entity.last_used_at,
            revoked_at: entity.revoked_at,
        }
    }

    pub fn into_dto(self) -> ApiKeyDto {
        ApiKeyDto {
            id: self.id,
            name: self.name,
            prefix: self.prefix,
            created_at: self.created_at,
            last_used_at: self.last_used_at,
            revoked: self.revoked_at.is_some(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateApiKeyParams {
    pub organization_id: i32,
    pub name: String,
    pub prefix: String,
    pub key_hash: String,
    pub created_by: i32,
}
