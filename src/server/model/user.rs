use chrono::{DateTime, Utc};

use crate::model::user::UserDto;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i32,
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

impl User {
    pub fn from_entity(entity: entity::user::Model) -> Self {
        Self {
            id: entity.id,
            google_id: entity.google_id,
            email: entity.email,
            name: entity.name,
            avatar_url: entity.avatar_url,
            created_at: entity.created_at,
            last_login_at: entity.last_login_at,
        }
    }

    pub fn into_dto(self) -> UserDto {
        UserDto {
            id: self.id,
            email: self.email,
            name: self.name,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
        }
    }
}

/// Profile returned by Google after sign-in.
#[derive(Debug, Clone)]
pub struct UpsertUserParams {
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
}
