use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Inserts a connected mailbox in the given sync status ("idle", "syncing" or "error").
pub async fn create_gmail_account(
    db: &DatabaseConnection,
    organization_id: i32,
    email: impl Into<String>,
    sync_status: impl Into<String>,
) -> Result<entity::gmail_account::Model, DbErr> {
    entity::gmail_account::ActiveModel {
        organization_id: ActiveValue::Set(organization_id),
        email: ActiveValue::Set(email.into()),
        access_token: ActiveValue::Set("ya29.test-token".to_string()),
        refresh_token: ActiveValue::Set(Some("1//test-refresh".to_string())),
        token_expires_at: ActiveValue::Set(None),
        sync_status: ActiveValue::Set(sync_status.into()),
        last_sync_at: ActiveValue::Set(None),
        last_error: ActiveValue::Set(None),
        created_at: ActiveValue::Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
}
