use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    PassRateBelow,
    NewSource,
    FailureVolume,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PassRateBelow => "pass_rate_below",
            Self::NewSource => "new_source",
            Self::FailureVolume => "failure_volume",
        }
    }

    /// Whether rules of this kind need a numeric threshold.
    pub fn requires_threshold(&self) -> bool {
        !matches!(self, Self::NewSource)
    }
}

impl FromStr for AlertKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass_rate_below" => Ok(Self::PassRateBelow),
            "new_source" => Ok(Self::NewSource),
            "failure_volume" => Ok(Self::FailureVolume),
            other => Err(format!("unknown alert kind '{}'", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WebhookKind {
    Slack,
    Discord,
    Generic,
}

impl WebhookKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slack => "slack",
            Self::Discord => "discord",
            Self::Generic => "generic",
        }
    }
}

impl FromStr for WebhookKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slack" => Ok(Self::Slack),
            "discord" => Ok(Self::Discord),
            "generic" => Ok(Self::Generic),
            other => Err(format!("unknown webhook kind '{}'", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct AlertDto {
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

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct AlertRuleDto {
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

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct CreateAlertRuleDto {
    pub domain_id: Option<i32>,
    pub kind: AlertKind,
    pub threshold: Option<f64>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub webhook_url: Option<String>,
    pub webhook_kind: Option<WebhookKind>,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct UpdateAlertRuleDto {
    pub threshold: Option<f64>,
    pub enabled: bool,
    pub webhook_url: Option<String>,
    pub webhook_kind: Option<WebhookKind>,
}

fn default_enabled() -> bool {
    true
}
