use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::source::{CreateKnownSenderParams, KnownSender};

pub struct KnownSenderRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> KnownSenderRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, param: CreateKnownSenderParams) -> Result<KnownSender, DbErr> {
        let sender = entity::known_sender::ActiveModel {
            organization_id: ActiveValue::Set(param.organization_id),
            name: ActiveValue::Set(param.name),
            hostname_suffix: ActiveValue::Set(param.hostname_suffix.to_ascii_lowercase()),
            description: ActiveValue::Set(param.description),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(KnownSender::from_entity(sender))
    }

    /// Lists the global senders plus the organization's own, ordered by name.
    pub async fn list_for_organization(
        &self,
        organization_id: i32,
    ) -> Result<Vec<KnownSender>, DbErr> {
        let senders = entity::prelude::KnownSender::find()
            .filter(
                Condition::any()
                    .add(entity::known_sender::Column::OrganizationId.is_null())
                    .add(entity::known_sender::Column::OrganizationId.eq(organization_id)),
            )
            .order_by_asc(entity::known_sender::Column::Name)
            .all(self.db)
            .await?;

        Ok(senders.into_iter().map(KnownSender::from_entity).collect())
    }

    /// Whether a global sender with this hostname suffix exists.
    pub async fn global_exists(&self, hostname_suffix: &str) -> Result<bool, DbErr> {
        let count = entity::prelude::KnownSender::find()
            .filter(entity::known_sender::Column::OrganizationId.is_null())
            .filter(entity::known_sender::Column::HostnameSuffix.eq(hostname_suffix))
            .count(self.db)
            .await?;

        Ok(count > 0)
    }

    /// Deletes a sender owned by the organization.
    ///
    /// Global senders can't be deleted through this method.
    ///
    /// # Returns
    /// - `Ok(true)` - Sender was deleted
    /// - `Ok(false)` - No sender with that ID belongs to the organization
    pub async fn delete(&self, organization_id: i32, id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::KnownSender::delete_many()
            .filter(entity::known_sender::Column::Id.eq(id))
            .filter(entity::known_sender::Column::OrganizationId.eq(organization_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
