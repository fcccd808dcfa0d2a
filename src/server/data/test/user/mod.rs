use crate::server::{data::user::UserRepository, model::user::UpsertUserParams};
use sea_orm::DbErr;
use test_utils::builder::TestBuilder;

mod upsert;
