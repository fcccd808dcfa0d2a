use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};

use crate::server::model::user::{UpsertUserParams, User};

pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates or refreshes a user from their Google profile.
    ///
    /// Looks the user up by Google subject id. Existing users get their email,
    /// name and avatar refreshed; `last_login_at` is set to now in both cases.
    pub async fn upsert(&self, params: UpsertUserParams) -> Result<User, DbErr> {
        let now = Utc::now();

        let existing = entity::prelude::User::find()
            .filter(entity::user::Column::GoogleId.eq(&params.google_id))
            .one(self.db)
            .await?;

        let user = match existing {
            Some(existing) => {
                let mut active: entity::user::ActiveModel = existing.into();
                active.email = ActiveValue::Set(params.email);
                active.name = ActiveValue::Set(params.name);
                active.avatar_url = ActiveValue::Set(params.avatar_url);
                active.last_login_at = ActiveValue::Set(now);
                active.update(self.db).await?
            }
            None => {
                entity::user::ActiveModel {
                    google_id: ActiveValue::Set(params.google_id),
                    email: ActiveValue::Set(params.email),
                    name: ActiveValue::Set(params.name),
                    avatar_url: ActiveValue::Set(params.avatar_url),
                    created_at: ActiveValue::Set(now),
                    last_login_at: ActiveValue::Set(now),
                    ..Default::default()
                }
                .insert(self.db)
                .await?
            }
        };

        Ok(User::from_entity(user))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, DbErr> {
        let user = entity::prelude::User::find_by_id(id).one(self.db).await?;

        Ok(user.map(User::from_entity))
    }

    pub async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, DbErr> {
        let user = entity::prelude::User::find()
            .filter(entity::user::Column::GoogleId.eq(google_id))
            .one(self.db)
            .await?;

        Ok(user.map(User::from_entity))
    }
}
