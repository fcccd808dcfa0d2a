//! Alert rules, their evaluation after ingestion, and the alert inbox.

use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;
use serenity::http::Http;

use crate::{
    model::alert::{AlertKind, Severity},
    server::{
        data::{
            alert::AlertRepository, alert_rule::AlertRuleRepository, domain::DomainRepository,
            report::ReportRepository,
        },
        error::AppError,
        model::{
            alert::{Alert, AlertRule, CreateAlertParams, CreateAlertRuleParams, UpdateAlertRuleParams},
            domain::Domain,
            pagination::Paginated,
            report::Report,
            source::Source,
        },
        service::notify::{Notification, WebhookNotifier},
        util::parse::pass_rate,
    },
};

/// Window the `pass_rate_below` rule measures over.
const PASS_RATE_WINDOW_DAYS: i64 = 7;
/// Minimum time between two `pass_rate_below` alerts of one rule.
const PASS_RATE_COOLDOWN_HOURS: i64 = 24;
/// New-source alerts list at most this many addresses.
const MAX_LISTED_SOURCES: usize = 5;

pub struct AlertService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AlertService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_rules(&self, organization_id: i32) -> Result<Vec<AlertRule>, AppError> {
        Ok(AlertRuleRepository::new(self.db)
            .list_by_organization(organization_id)
            .await?)
    }

    /// Creates an alert rule after validating its scope, threshold and webhook.
    ///
    /// # Returns
    /// - `Ok(AlertRule)` - Created rule
    /// - `Err(AppError::BadRequest)` - Domain not in the organization, missing
    ///   or out-of-range threshold, or incomplete webhook settings
    pub async fn create_rule(&self, params: CreateAlertRuleParams) -> Result<AlertRule, AppError> {
        if let Some(domain_id) = params.domain_id {
            let domain = DomainRepository::new(self.db).find_by_id(domain_id).await?;
            if domain.is_none_or(|d| d.organization_id != params.organization_id) {
                return Err(AppError::BadRequest(format!(
                    "Domain {} does not belong to this organization",
                    domain_id
                )));
            }
        }
        validate_threshold(params.kind, params.threshold)?;
        validate_webhook(params.webhook_url.as_deref(), params.webhook_kind.is_some())?;

        Ok(AlertRuleRepository::new(self.db).create(params).await?)
    }

    /// Updates a rule's threshold, state and webhook.
    ///
    /// # Returns
    /// - `Ok(Some(rule))` - Updated rule
    /// - `Ok(None)` - Rule not found in the organization
    pub async fn update_rule(
        &self,
        params: UpdateAlertRuleParams,
    ) -> Result<Option<AlertRule>, AppError> {
        let repo = AlertRuleRepository::new(self.db);

        let Some(existing) = repo.find(params.organization_id, params.id).await? else {
            return Ok(None);
        };
        validate_threshold(existing.kind, params.threshold)?;
        validate_webhook(params.webhook_url.as_deref(), params.webhook_kind.is_some())?;

        Ok(repo.update(params).await?)
    }

    pub async fn delete_rule(&self, organization_id: i32, id: i32) -> Result<bool, AppError> {
        Ok(AlertRuleRepository::new(self.db)
            .delete(organization_id, id)
            .await?)
    }

    pub async fn list_alerts(
        &self,
        organization_id: i32,
        unread_only: bool,
        page: u64,
        per_page: u64,
    ) -> Result<Paginated<Alert>, AppError> {
        let (alerts, total) = AlertRepository::new(self.db)
            .get_paginated(organization_id, unread_only, page, per_page)
            .await?;

        Ok(Paginated::new(alerts, total, page, per_page))
    }

    pub async fn mark_read(&self, organization_id: i32, id: i32) -> Result<bool, AppError> {
        Ok(AlertRepository::new(self.db)
            .mark_read(organization_id, id)
            .await?)
    }

    pub async fn mark_all_read(&self, organization_id: i32) -> Result<u64, AppError> {
        Ok(AlertRepository::new(self.db)
            .mark_all_read(organization_id)
            .await?)
    }

    /// Evaluates the domain's enabled rules against a freshly stored report.
    ///
    /// Fired rules create an alert, get their trigger time stamped and post
    /// their webhook. Webhook failures are logged only.
    ///
    /// # Arguments
    /// - `domain` - Domain the report was stored for
    /// - `report` - Stored aggregate report
    /// - `new_unknown_sources` - Sources first seen in this report that match no known sender
    /// - `notifier` - Webhook sender
    /// - `app_url` - Base URL used for dashboard links
    ///
    /// # Returns
    /// - `Ok(alerts)` - Alerts created
    pub async fn evaluate_after_ingest(
        &self,
        domain: &Domain,
        report: &Report,
        new_unknown_sources: &[Source],
        notifier: &WebhookNotifier<'_>,
        app_url: &str,
    ) -> Result<Vec<Alert>, AppError> {
        let rule_repo = AlertRuleRepository::new(self.db);
        let alert_repo = AlertRepository::new(self.db);

        let rules = rule_repo
            .list_enabled_for_domain(domain.organization_id, domain.id)
            .await?;
        if rules.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let mut window_rate = None;
        let mut created = Vec::new();

        for rule in rules {
            let fired = match rule.kind {
                AlertKind::PassRateBelow => {
                    let Some(threshold) = rule.threshold else {
                        continue;
                    };
                    if !cooldown_elapsed(rule.last_triggered_at, now) {
                        continue;
                    }
                    let (total, rate) = match window_rate {
                        Some(cached) => cached,
                        None => {
                            let cached = self.window_pass_rate(domain.id, now).await?;
                            window_rate = Some(cached);
                            cached
                        }
                    };
                    (total > 0 && rate < threshold).then(|| {
                        (
                            pass_rate_severity(rate),
                            format!(
                                "{} pass rate is {:.1}% over the last {} days (threshold {:.1}%)",
                                domain.name, rate, PASS_RATE_WINDOW_DAYS, threshold
                            ),
                        )
                    })
                }
                AlertKind::NewSource => (!new_unknown_sources.is_empty()).then(|| {
                    let listed: Vec<&str> = new_unknown_sources
                        .iter()
                        .take(MAX_LISTED_SOURCES)
                        .map(|s| s.ip.as_str())
                        .collect();
                    let more = new_unknown_sources.len().saturating_sub(listed.len());
                    let mut message = format!(
                        "{} new unknown sender(s) for {}: {}",
                        new_unknown_sources.len(),
                        domain.name,
                        listed.join(", ")
                    );
                    if more > 0 {
                        message.push_str(&format!(" and {} more", more));
                    }
                    (Severity::Warning, message)
                }),
                AlertKind::FailureVolume => {
                    let Some(threshold) = rule.threshold else {
                        continue;
                    };
                    (report.fail_count as f64 >= threshold).then(|| {
                        (
                            failure_severity(report.fail_count, threshold),
                            format!(
                                "{} failed messages for {} in report {} from {}",
                                report.fail_count, domain.name, report.report_id, report.org_name
                            ),
                        )
                    })
                }
            };

            let Some((severity, message)) = fired else {
                continue;
            };

            let alert = alert_repo
                .create(CreateAlertParams {
                    organization_id: domain.organization_id,
                    domain_id: Some(domain.id),
                    rule_id: Some(rule.id),
                    kind: rule.kind,
                    severity,
                    message,
                })
                .await?;
            rule_repo.mark_triggered(rule.id, now).await?;

            tracing::info!(
                "Alert rule {} ({}) fired for domain {}",
                rule.id,
                rule.kind.as_str(),
                domain.id
            );

            if let Some((url, kind)) = rule.webhook() {
                let notification = Notification {
                    title: format!("DMARC alert: {}", domain.name),
                    text: alert.message.clone(),
                    severity: alert.severity,
                    fields: vec![
                        ("Rule".to_string(), rule.kind.as_str().to_string()),
                        ("Severity".to_string(), alert.severity.as_str().to_string()),
                    ],
                    link: Some(format!("{}/domains/{}", app_url, domain.id)),
                };
                notifier.send_logged(url, kind, &notification).await;
            }

            created.push(alert);
        }

        Ok(created)
    }

    async fn window_pass_rate(
        &self,
        domain_id: i32,
        now: DateTime<Utc>,
    ) -> Result<(i64, f64), AppError> {
        let reports = ReportRepository::new(self.db)
            .get_since(domain_id, now - Duration::days(PASS_RATE_WINDOW_DAYS))
            .await?;
        let (total, passed) = reports
            .iter()
            .fold((0, 0), |(t, p), r| (t + r.total_count, p + r.pass_count));

        Ok((total, pass_rate(passed, total)))
    }
}

fn validate_threshold(kind: AlertKind, threshold: Option<f64>) -> Result<(), AppError> {
    match (kind, threshold) {
        (AlertKind::PassRateBelow, Some(t)) if !(0.0..=100.0).contains(&t) => Err(
            AppError::BadRequest("Pass rate threshold must be between 0 and 100".to_string()),
        ),
        (AlertKind::FailureVolume, Some(t)) if t < 1.0 => Err(AppError::BadRequest(
            "Failure volume threshold must be at least 1".to_string(),
        )),
        (kind, None) if kind.requires_threshold() => Err(AppError::BadRequest(format!(
            "Rule kind {} requires a threshold",
            kind.as_str()
        ))),
        _ => Ok(()),
    }
}

fn validate_webhook(url: Option<&str>, has_kind: bool) -> Result<(), AppError> {
    match url {
        Some(url) if !url.starts_with("https://") => Err(AppError::BadRequest(
            "Webhook URL must use https".to_string(),
        )),
        Some(_) if !has_kind => Err(AppError::BadRequest(
            "Webhook kind is required with a webhook URL".to_string(),
        )),
        _ => Ok(()),
    }
}

fn cooldown_elapsed(last_triggered_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    last_triggered_at.is_none_or(|at| now - at >= Duration::hours(PASS_RATE_COOLDOWN_HOURS))
}

fn pass_rate_severity(rate: f64) -> Severity {
    if rate < 50.0 {
        Severity::Critical
    } else {
        Severity::Warning
    }
}

fn failure_severity(failures: i64, threshold: f64) -> Severity {
    if failures as f64 >= threshold * 10.0 {
        Severity::Critical
    } else {
        Severity::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expected: critical below 50 percent, warning otherwise
    #[test]
    fn grades_pass_rate_severity() {
        assert_eq!(pass_rate_severity(49.9), Severity::Critical);
        assert_eq!(pass_rate_severity(50.0), Severity::Warning);
    }

    /// Expected: critical once failures reach ten times the threshold
    #[test]
    fn grades_failure_severity() {
        assert_eq!(failure_severity(99, 10.0), Severity::Warning);
        assert_eq!(failure_severity(100, 10.0), Severity::Critical);
    }

    #[test]
    fn respects_cooldown() {
        let now = Utc::now();
        assert!(cooldown_elapsed(None, now));
        assert!(!cooldown_elapsed(Some(now - Duration::hours(23)), now));
        assert!(cooldown_elapsed(Some(now - Duration::hours(24)), now));
    }

    #[test]
    fn validates_thresholds() {
        assert!(validate_threshold(AlertKind::PassRateBelow, Some(90.0)).is_ok());
        assert!(validate_threshold(AlertKind::PassRateBelow, Some(120.0)).is_err());
        assert!(validate_threshold(AlertKind::PassRateBelow, None).is_err());
        assert!(validate_threshold(AlertKind::FailureVolume, Some(0.0)).is_err());
        assert!(validate_threshold(AlertKind::NewSource, None).is_ok());
    }

    #[test]
    fn validates_webhooks() {
        assert!(validate_webhook(None, false).is_ok());
        assert!(validate_webhook(Some("https://hooks.slack.com/x"), true).is_ok());
        assert!(validate_webhook(Some("http://hooks.slack.com/x"), true).is_err());
        assert!(validate_webhook(Some("https://hooks.slack.com/x"), false).is_err());
    }
}
