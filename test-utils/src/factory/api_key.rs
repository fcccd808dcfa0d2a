use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Inserts an API key row with an already computed `key_hash`.
///
/// The plaintext key never reaches the database, so tests hash it the same way
/// the server does before calling this.
pub async fn create_api_key(
    db: &DatabaseConnection,
    organization_id: i32,
    created_by: i32,
    key_hash: impl Into<String>,
    revoked_at: Option<DateTime<Utc>>,
) -> Result<entity::api_key::Model, DbErr> {
    entity::api_key::ActiveModel {
        organization_id: ActiveValue::Set(organization_id),
        name: ActiveValue::Set("Test key".to_string()),
        prefix: ActiveValue::Set("dmarc_test".to_string()),
        key_hash: ActiveValue::Set(key_hash.into()),
        created_by: ActiveValue::Set(created_by),
        created_at: ActiveValue::Set(Utc::now()),
        last_used_at: ActiveValue::Set(None),
        revoked_at: ActiveValue::Set(revoked_at),
        ..Default::default()
    }
    .insert(db)
    .await
}
