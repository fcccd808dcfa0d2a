use chrono::{DateTime, Utc};

use crate::{
    model::alert::{AlertDto, AlertKind, AlertRuleDto, Severity, WebhookKind},
    server::{error::internal::InternalError, util::parse::parse_column},
};

#[derive(Debug, Clone, PartialEq)]
pub struct AlertRule {
    pub id: i32,
    pub organization_id: i32,
    pub domain_id: Option<i32>,
    pub kind: AlertKind,
    pub threshold: Option<f64>,
    pub enabled: bool,
    pub webhook_url: Option<String>,
    pub webhook_kind: Option<WebhookKind>,
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AlertRule {
    pub fn from_entity(entity: entity::alert_rule::Model) -> Result<Self, InternalError> {
        Ok(Self {
            id: entity.id,
            organization_id: entity.organization_id,
            domain_id: entity.domain_id,
            kind: parse_column("alert_rule.kind", &entity.kind)?,
            threshold: entity.threshold,
            enabled: entity.enabled,
            webhook_url: entity.webhook_url,
            webhook_kind: entity
                .webhook_kind
                .as_deref()
                .map(|k| parse_column("alert_rule.webhook_kind", k))
                .transpose()?,
            last_triggered_at: entity.last_triggered_at,
            created_at: entity.created_at,
        })
    }

    /// Webhook target when both URL and kind are configured.
    pub fn webhook(&self) -> Option<(&str, WebhookKind)> {
        match (&self.webhook_url, self.webhook_kind) {
            (Some(url), Some(kind)) => Some((url.as_str(), kind)),
            _ => None,
        }
    }

    pub fn into_dto(self) -> AlertRuleDto {
        AlertRuleDto {
            id: self.id,
            organization_id: self.organization_id,
            domain_id: self.domain_id,
            kind: self.kind,
            threshold: self.threshold,
            enabled: self.enabled,
            webhook_url: self.webhook_url,
            webhook_kind: self.webhook_kind,
            last_triggered_at: self.last_triggered_at,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateAlertRuleParams {
    pub organization_id: i32,
    pub domain_id: Option<i32>,
    pub kind: AlertKind,
    pub threshold: Option<f64>,
    pub enabled: bool,
    pub webhook_url: Option<String>,
    pub webhook_kind: Option<WebhookKind>,
}

#[derive(Debug, Clone)]
pub struct UpdateAlertRuleParams {
    pub id: i32,
    pub organization_id: i32,
    pub threshold: Option<f64>,
    pub enabled: bool,
    pub webhook_url: Option<String>,
    pub webhook_kind: Option<WebhookKind>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: i32,
    pub organization_id: i32,
    pub domain_id: Option<i32>,
    pub rule_id: Option<i32>,
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn from_entity(entity: entity::alert::Model) -> Result<Self, InternalError> {
        Ok(Self {
            id: entity.id,
            organization_id: entity.organization_id,
            domain_id: entity.domain_id,
            rule_id: entity.rule_id,
            kind: parse_column("alert.kind", &entity.kind)?,
            severity: parse_column("alert.severity", &entity.severity)?,
            message: entity.message,
            read: entity.read,
            created_at: entity.created_at,
        })
    }

    pub fn into_dto(self) -> AlertDto {
        AlertDto {
            id: self.id,
            organization_id: self.organization_id,
            domain_id: self.domain_id,
            rule_id: self.rule_id,
            kind: self.kind,
            severity: self.severity,
            message: self.message,
            read: self.read,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateAlertParams {
    pub organization_id: i32,
    pub domain_id: Option<i32>,
    pub rule_id: Option<i32>,
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
}
