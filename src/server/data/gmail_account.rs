use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder,
};

use crate::{
    model::gmail::SyncStatus,
    server::model::gmail::{GmailAccount, UpsertGmailAccountParams},
};

pub struct GmailAccountRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GmailAccountRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates or refreshes the connection of a mailbox to an organization.
    ///
    /// A reconnect keeps the stored refresh token when Google doesn't issue a new one.
    pub async fn upsert(&self, param: UpsertGmailAccountParams) -> Result<GmailAccount, DbErr> {
        let existing = entity::prelude::GmailAccount::find()
            .filter(entity::gmail_account::Column::OrganizationId.eq(param.organization_id))
            .filter(entity::gmail_account::Column::Email.eq(&param.email))
            .one(self.db)
            .await?;

        let account = match existing {
            Some(existing) => {
                let refresh_token = param.refresh_token.or(existing.refresh_token.clone());
                let mut active: entity::gmail_account::ActiveModel = existing.into();
                active.access_token = ActiveValue::Set(param.access_token);
                active.refresh_token = ActiveValue::Set(refresh_token);
                active.token_expires_at = ActiveValue::Set(param.token_expires_at);
                active.sync_status = ActiveValue::Set(SyncStatus::Idle.as_str().to_string());
                active.last_error = ActiveValue::Set(None);
                active.update(self.db).await?
            }
            None => {
                entity::gmail_account::ActiveModel {
                    organization_id: ActiveValue::Set(param.organization_id),
                    email: ActiveValue::Set(param.email),
                    access_token: ActiveValue::Set(param.access_token),
                    refresh_token: ActiveValue::Set(param.refresh_token),
                    token_expires_at: ActiveValue::Set(param.token_expires_at),
                    sync_status: ActiveValue::Set(SyncStatus::Idle.as_str().to_string()),
                    last_sync_at: ActiveValue::Set(None),
                    last_error: ActiveValue::Set(None),
                    created_at: ActiveValue::Set(Utc::now()),
                    ..Default::default()
                }
                .insert(self.db)
                .await?
            }
        };

        to_domain(account)
    }

    pub async fn find(&self, organization_id: i32, id: i32) -> Result<Option<GmailAccount>, DbErr> {
        entity::prelude::GmailAccount::find_by_id(id)
            .filter(entity::gmail_account::Column::OrganizationId.eq(organization_id))
            .one(self.db)
            .await?
            .map(to_domain)
            .transpose()
    }

    pub async fn list_by_organization(
        &self,
        organization_id: i32,
    ) -> Result<Vec<GmailAccount>, DbErr> {
        entity::prelude::GmailAccount::find()
            .filter(entity::gmail_account::Column::OrganizationId.eq(organization_id))
            .order_by_asc(entity::gmail_account::Column::Email)
            .all(self.db)
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    /// Every connected mailbox, for the periodic sync job.
    pub async fn list_all(&self) -> Result<Vec<GmailAccount>, DbErr> {
        entity::prelude::GmailAccount::find()
            .order_by_asc(entity::gmail_account::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    pub async fn set_status(
        &self,
        id: i32,
        status: SyncStatus,
        error: Option<String>,
    ) -> Result<(), DbErr> {
        entity::gmail_account::ActiveModel {
            id: ActiveValue::Unchanged(id),
            sync_status: ActiveValue::Set(status.as_str().to_string()),
            last_error: ActiveValue::Set(error),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(())
    }

    pub async fn update_tokens(
        &self,
        id: i32,
        access_token: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), DbErr> {
        entity::gmail_account::ActiveModel {
            id: ActiveValue::Unchanged(id),
            access_token: ActiveValue::Set(access_token),
            token_expires_at: ActiveValue::Set(expires_at),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(())
    }

    /// Records a completed sync, resetting the status to idle.
    ///
    /// `cursor` becomes the lower bound of the next sync's search.
    pub async fn mark_synced(&self, id: i32, cursor: Option<DateTime<Utc>>) -> Result<(), DbErr> {
        entity::gmail_account::ActiveModel {
            id: ActiveValue::Unchanged(id),
            sync_status: ActiveValue::Set(SyncStatus::Idle.as_str().to_string()),
            last_sync_at: ActiveValue::Set(cursor),
            last_error: ActiveValue::Set(None),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(())
    }

    /// Sets accounts left syncing by a stopped process back to idle.
    ///
    /// # Returns
    /// - `Ok(count)` - Number of accounts reset
    pub async fn reset_interrupted_syncs(&self) -> Result<u64, DbErr> {
        let result = entity::prelude::GmailAccount::update_many()
            .col_expr(
                entity::gmail_account::Column::SyncStatus,
                Expr::value(SyncStatus::Idle.as_str()),
            )
            .filter(entity::gmail_account::Column::SyncStatus.eq(SyncStatus::Syncing.as_str()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn delete(&self, organization_id: i32, id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::GmailAccount::delete_many()
            .filter(entity::gmail_account::Column::Id.eq(id))
            .filter(entity::gmail_account::Column::OrganizationId.eq(organization_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

fn to_domain(entity: entity::gmail_account::Model) -> Result<GmailAccount, DbErr> {
    GmailAccount::from_entity(entity).map_err(|e| DbErr::Custom(e.to_string()))
}
