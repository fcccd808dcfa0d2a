use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::alert::{Alert, CreateAlertParams};

pub struct AlertRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AlertRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, param: CreateAlertParams) -> Result<Alert, DbErr> {
        let alert = entity::alert::ActiveModel {
            organization_id: ActiveValue::Set(param.organization_id),
            domain_id: ActiveValue::Set(param.domain_id),
            rule_id: ActiveValue::Set(param.rule_id),
            kind: ActiveValue::Set(param.kind.as_str().to_string()),
            severity: ActiveValue::Set(param.severity.as_str().to_string()),
            message: ActiveValue::Set(param.message),
            read: ActiveValue::Set(false),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        to_domain(alert)
    }

    /// Gets a page of an organization's alerts, newest first.
    ///
    /// # Arguments
    /// - `unread_only` - Only return alerts not yet marked as read
    pub async fn get_paginated(
        &self,
        organization_id: i32,
        unread_only: bool,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Alert>, u64), DbErr> {
        let mut query = entity::prelude::Alert::find()
            .filter(entity::alert::Column::OrganizationId.eq(organization_id));
        if unread_only {
            query = query.filter(entity::alert::Column::Read.eq(false));
        }

        let paginator = query
            .order_by_desc(entity::alert::Column::CreatedAt)
            .order_by_desc(entity::alert::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let alerts = paginator
            .fetch_page(page)
            .await?
            .into_iter()
            .map(to_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((alerts, total))
    }

    pub async fn count_unread(&self, organization_id: i32) -> Result<u64, DbErr> {
        entity::prelude::Alert::find()
            .filter(entity::alert::Column::OrganizationId.eq(organization_id))
            .filter(entity::alert::Column::Read.eq(false))
            .count(self.db)
            .await
    }

    /// Marks one alert of the organization as read.
    ///
    /// # Returns
    /// - `Ok(true)` - Alert exists in the organization
    /// - `Ok(false)` - Alert not found
    pub async fn mark_read(&self, organization_id: i32, id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::Alert::update_many()
            .col_expr(entity::alert::Column::Read, Expr::value(true))
            .filter(entity::alert::Column::Id.eq(id))
            .filter(entity::alert::Column::OrganizationId.eq(organization_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Marks every unread alert of the organization as read and returns how many changed.
    pub async fn mark_all_read(&self, organization_id: i32) -> Result<u64, DbErr> {
        let result = entity::prelude::Alert::update_many()
            .col_expr(entity::alert::Column::Read, Expr::value(true))
            .filter(entity::alert::Column::OrganizationId.eq(organization_id))
            .filter(entity::alert::Column::Read.eq(false))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}

fn to_domain(entity: entity::alert::Model) -> Result<Alert, DbErr> {
    Alert::from_entity(entity).map_err(|e| DbErr::Custom(e.to_string()))
}
