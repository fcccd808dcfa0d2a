use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::server::model::alert::{AlertRule, CreateAlertRuleParams, UpdateAlertRuleParams};

pub struct AlertRuleRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AlertRuleRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, param: CreateAlertRuleParams) -> Result<AlertRule, DbErr> {
        let rule = entity::alert_rule::ActiveModel {
            organization_id: ActiveValue::Set(param.organization_id),
            domain_id: ActiveValue::Set(param.domain_id),
            kind: ActiveValue::Set(param.kind.as_str().to_string()),
            threshold: ActiveValue::Set(param.threshold),
            enabled: ActiveValue::Set(param.enabled),
            webhook_url: ActiveValue::Set(param.webhook_url),
            webhook_kind: ActiveValue::Set(param.webhook_kind.map(|k| k.as_str().to_string())),
            last_triggered_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        to_domain(rule)
    }

    pub async fn find(&self, organization_id: i32, id: i32) -> Result<Option<AlertRule>, DbErr> {
        entity::prelude::AlertRule::find_by_id(id)
            .filter(entity::alert_rule::Column::OrganizationId.eq(organization_id))
            .one(self.db)
            .await?
            .map(to_domain)
            .transpose()
    }

    pub async fn list_by_organization(&self, organization_id: i32) -> Result<Vec<AlertRule>, DbErr> {
        entity::prelude::AlertRule::find()
            .filter(entity::alert_rule::Column::OrganizationId.eq(organization_id))
            .order_by_asc(entity::alert_rule::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    /// Enabled rules that apply to a domain: rules scoped to it and
    /// organization-wide rules.
    pub async fn list_enabled_for_domain(
        &self,
        organization_id: i32,
        domain_id: i32,
    ) -> Result<Vec<AlertRule>, DbErr> {
        entity::prelude::AlertRule::find()
            .filter(entity::alert_rule::Column::OrganizationId.eq(organization_id))
            .filter(entity::alert_rule::Column::Enabled.eq(true))
            .filter(
                Condition::any()
                    .add(entity::alert_rule::Column::DomainId.is_null())
                    .add(entity::alert_rule::Column::DomainId.eq(domain_id)),
            )
            .order_by_asc(entity::alert_rule::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    /// Updates the mutable fields of a rule in the organization.
    ///
    /// # Returns
    /// - `Ok(Some(rule))` - Updated rule
    /// - `Ok(None)` - Rule not found in the organization
    pub async fn update(&self, param: UpdateAlertRuleParams) -> Result<Option<AlertRule>, DbErr> {
        let Some(existing) = entity::prelude::AlertRule::find_by_id(param.id)
            .filter(entity::alert_rule::Column::OrganizationId.eq(param.organization_id))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: entity::alert_rule::ActiveModel = existing.into();
        active.threshold = ActiveValue::Set(param.threshold);
        active.enabled = ActiveValue::Set(param.enabled);
        active.webhook_url = ActiveValue::Set(param.webhook_url);
        active.webhook_kind = ActiveValue::Set(param.webhook_kind.map(|k| k.as_str().to_string()));
        let rule = active.update(self.db).await?;

        to_domain(rule).map(Some)
    }

    pub async fn mark_triggered(&self, id: i32, at: DateTime<Utc>) -> Result<(), DbErr> {
        entity::alert_rule::ActiveModel {
            id: ActiveValue::Unchanged(id),
            last_triggered_at: ActiveValue::Set(Some(at)),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, organization_id: i32, id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::AlertRule::delete_many()
            .filter(entity::alert_rule::Column::Id.eq(id))
            .filter(entity::alert_rule::Column::OrganizationId.eq(organization_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}

fn to_domain(entity: entity::alert_rule::Model) -> Result<AlertRule, DbErr> {
    AlertRule::from_entity(entity).map_err(|e| DbErr::Custom(e.to_string()))
}
