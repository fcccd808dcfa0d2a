use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for alert rules.
///
/// Defaults to an enabled organization-wide rule without a webhook.
pub struct AlertRuleFactory<'a> {
    db: &'a DatabaseConnection,
    organization_id: i32,
    domain_id: Option<i32>,
    kind: String,
    threshold: Option<f64>,
    enabled: bool,
    webhook_url: Option<String>,
    webhook_kind: Option<String>,
}

impl<'a> AlertRuleFactory<'a> {
    /// `kind` is one of `"pass_rate_below"`, `"new_source"` or `"failure_volume"`.
    pub fn new(db: &'a DatabaseConnection, organization_id: i32, kind: impl Into<String>) -> Self {
        Self {
            db,
            organization_id,
            domain_id: None,
            kind: kind.into(),
            threshold: None,
            enabled: true,
            webhook_url: None,
            webhook_kind: None,
        }
    }

    pub fn domain_id(mut self, domain_id: i32) -> Self {
        self.domain_id = Some(domain_id);
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn webhook(mut self, kind: impl Into<String>, url: impl Into<String>) -> Self {
        self.webhook_kind = Some(kind.into());
        self.webhook_url = Some(url.into());
        self
    }

    pub async fn build(self) -> Result<entity::alert_rule::Model, DbErr> {
        entity::alert_rule::ActiveModel {
            organization_id: ActiveValue::Set(self.organization_id),
            domain_id: ActiveValue::Set(self.domain_id),
            kind: ActiveValue::Set(self.kind),
            threshold: ActiveValue::Set(self.threshold),
            enabled: ActiveValue::Set(self.enabled),
            webhook_url: ActiveValue::Set(self.webhook_url),
            webhook_kind: ActiveValue::Set(self.webhook_kind),
            last_triggered_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}
