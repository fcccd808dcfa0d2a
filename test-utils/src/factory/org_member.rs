use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Adds `user_id` to `organization_id` with `role` (`"owner"`, `"admin"` or `"member"`).
pub async fn create_member(
    db: &DatabaseConnection,
    organization_id: i32,
    user_id: i32,
    role: &str,
) -> Result<entity::org_member::Model, DbErr> {
    entity::org_member::ActiveModel {
        organization_id: ActiveValue::Set(organization_id),
        user_id: ActiveValue::Set(user_id),
        role: ActiveValue::Set(role.to_string()),
        created_at: ActiveValue::Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
}
