//! Periodic summaries posted to an organization's webhook.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Months, Utc};
use sea_orm::DatabaseConnection;
use serenity::http::Http;

use crate::{
    model::{
        alert::{Severity, WebhookKind},
        scheduled_report::Frequency,
    },
    server::{
        data::{
            domain::DomainRepository, organization::OrganizationRepository,
            report::ReportRepository, scheduled_report::ScheduledReportRepository,
        },
        error::AppError,
        model::{
            domain::Domain,
            report::RecordWithReport,
            scheduled_report::{ScheduledReport, UpsertScheduledReportParams},
        },
        service::notify::{Notification, WebhookNotifier},
        util::parse::pass_rate,
    },
};

/// Failing sources listed per domain in a summary.
const TOP_FAILING_SOURCES: usize = 3;

pub struct ScheduledReportService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ScheduledReportService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, organization_id: i32) -> Result<Vec<ScheduledReport>, AppError> {
        Ok(ScheduledReportRepository::new(self.db)
            .list_by_organization(organization_id)
            .await?)
    }

    /// Creates a schedule whose first run is one period from now.
    pub async fn create(
        &self,
        organization_id: i32,
        frequency: Frequency,
        webhook_url: String,
        webhook_kind: WebhookKind,
        enabled: bool,
    ) -> Result<ScheduledReport, AppError> {
        validate_url(&webhook_url)?;

        let schedule = ScheduledReportRepository::new(self.db)
            .create(UpsertScheduledReportParams {
                organization_id,
                frequency,
                webhook_url,
                webhook_kind,
                enabled,
                next_run_at: next_run(Utc::now(), frequency),
            })
            .await?;

        tracing::info!(
            "Created {} scheduled report {} for organization {}",
            frequency.as_str(),
            schedule.id,
            organization_id
        );

        Ok(schedule)
    }

    /// Replaces a schedule's settings and restarts its period from now.
    ///
    /// # Returns
    /// - `Ok(Some(schedule))` - Updated schedule
    /// - `Ok(None)` - Schedule not found in the organization
    pub async fn update(
        &self,
        id: i32,
        organization_id: i32,
        frequency: Frequency,
        webhook_url: String,
        webhook_kind: WebhookKind,
        enabled: bool,
    ) -> Result<Option<ScheduledReport>, AppError> {
        validate_url(&webhook_url)?;

        Ok(ScheduledReportRepository::new(self.db)
            .update(
                id,
                UpsertScheduledReportParams {
                    organization_id,
                    frequency,
                    webhook_url,
                    webhook_kind,
                    enabled,
                    next_run_at: next_run(Utc::now(), frequency),
                },
            )
            .await?)
    }

    pub async fn delete(&self, organization_id: i32, id: i32) -> Result<bool, AppError> {
        Ok(ScheduledReportRepository::new(self.db)
            .delete(organization_id, id)
            .await?)
    }

    /// Sends every due summary and schedules its next run.
    ///
    /// A failure to build or deliver one summary is logged and does not stop
    /// the others.
    ///
    /// # Returns
    /// - `Ok(count)` - Number of summaries processed
    pub async fn send_due(
        &self,
        http_client: &reqwest::Client,
        discord_http: &Http,
        app_url: &str,
    ) -> Result<usize, AppError> {
        let repo = ScheduledReportRepository::new(self.db);
        let notifier = WebhookNotifier::new(http_client, discord_http);
        let now = Utc::now();

        let due = repo.list_due(now).await?;
        for schedule in &due {
            match self.build_summary(schedule, now, app_url).await {
                Ok(Some(notification)) => {
                    notifier
                        .send_logged(&schedule.webhook_url, schedule.webhook_kind, &notification)
                        .await;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("Failed to build scheduled report {}: {}", schedule.id, e);
                }
            }
            repo.mark_sent(schedule.id, now, next_run(now, schedule.frequency))
                .await?;
        }

        if !due.is_empty() {
            tracing::info!("Processed {} scheduled reports", due.len());
        }

        Ok(due.len())
    }

    /// Summary of every domain of the organization over the reports ingested
    /// since the previous summary.
    ///
    /// # Returns
    /// - `Ok(None)` - The organization no longer exists
    async fn build_summary(
        &self,
        schedule: &ScheduledReport,
        now: DateTime<Utc>,
        app_url: &str,
    ) -> Result<Option<Notification>, AppError> {
        let Some(organization) = OrganizationRepository::new(self.db)
            .find_by_id(schedule.organization_id)
            .await?
        else {
            return Ok(None);
        };

        let since = schedule
            .last_sent_at
            .unwrap_or_else(|| previous_run(now, schedule.frequency));
        let domains = DomainRepository::new(self.db)
            .list_by_organization(schedule.organization_id)
            .await?;

        let report_repo = ReportRepository::new(self.db);
        let mut summaries = Vec::with_capacity(domains.len());
        for domain in &domains {
            let rows = report_repo
                .get_records_ingested_between(domain.id, since, now)
                .await?;
            summaries.push(summarize_domain(domain, &rows));
        }

        let total: i64 = summaries.iter().map(|s| s.total).sum();
        let passed: i64 = summaries.iter().map(|s| s.passed).sum();
        let rate = pass_rate(passed, total);

        Ok(Some(Notification {
            title: format!(
                "{} DMARC summary for {}",
                title_case(schedule.frequency.as_str()),
                organization.name
            ),
            text: format!(
                "{} messages since {}, {:.1}% passed DMARC.",
                total,
                since.format("%Y-%m-%d %H:%M UTC"),
                rate
            ),
            severity: if total > 0 && rate < 90.0 {
                Severity::Warning
            } else {
                Severity::Info
            },
            fields: summaries.iter().map(DomainSummaryLine::field).collect(),
            link: Some(app_url.to_string()),
        }))
    }
}

/// Per-domain line of a summary.
#[derive(Debug, Clone, PartialEq)]
struct DomainSummaryLine {
    domain: String,
    total: i64,
    passed: i64,
    failing_sources: Vec<(String, i64)>,
}

impl DomainSummaryLine {
    fn field(&self) -> (String, String) {
        let mut value = if self.total == 0 {
            "No reports".to_string()
        } else {
            format!(
                "{} messages, {:.1}% passed",
                self.total,
                pass_rate(self.passed, self.total)
            )
        };
        if !self.failing_sources.is_empty() {
            let sources: Vec<String> = self
                .failing_sources
                .iter()
                .map(|(ip, count)| format!("{} ({})", ip, count))
                .collect();
            value.push_str(&format!("; top failing: {}", sources.join(", ")));
        }
        (self.domain.clone(), value)
    }
}

fn summarize_domain(domain: &Domain, rows: &[RecordWithReport]) -> DomainSummaryLine {
    let mut total = 0;
    let mut passed = 0;
    let mut failing: HashMap<&str, i64> = HashMap::new();

    for row in rows {
        total += row.record.count;
        if row.record.dmarc_pass() {
            passed += row.record.count;
        } else {
            *failing.entry(row.record.source_ip.as_str()).or_default() += row.record.count;
        }
    }

    let mut failing_sources: Vec<(String, i64)> = failing
        .into_iter()
        .map(|(ip, count)| (ip.to_string(), count))
        .collect();
    failing_sources.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    failing_sources.truncate(TOP_FAILING_SOURCES);

    DomainSummaryLine {
        domain: domain.name.clone(),
        total,
        passed,
        failing_sources,
    }
}

/// Next run one period after `from`; months are calendar months.
pub fn next_run(from: DateTime<Utc>, frequency: Frequency) -> DateTime<Utc> {
    match frequency {
        Frequency::Daily => from + Duration::days(1),
        Frequency::Weekly => from + Duration::days(7),
        Frequency::Monthly => from
            .checked_add_months(Months::new(1))
            .unwrap_or(from + Duration::days(30)),
    }
}

fn previous_run(from: DateTime<Utc>, frequency: Frequency) -> DateTime<Utc> {
    match frequency {
        Frequency::Daily => from - Duration::days(1),
        Frequency::Weekly => from - Duration::days(7),
        Frequency::Monthly => from
            .checked_sub_months(Months::new(1))
            .unwrap_or(from - Duration::days(30)),
    }
}

fn validate_url(url: &str) -> Result<(), AppError> {
    if url.starts_with("https://") {
        Ok(())
    } else {
        Err(AppError::BadRequest("Webhook URL must use https".to_string()))
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use test_utils::{builder::TestBuilder, factory};

    use super::*;
    use crate::server::model::report::{Record, Report};

    fn row(ip: &str, count: i64, dkim: &str) -> RecordWithReport {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        RecordWithReport {
            record: Record {
                id: 0,
                report_id: 1,
                source_ip: ip.into(),
                count,
                disposition: "none".into(),
                dkim: dkim.into(),
                spf: "fail".into(),
                header_from: "example.com".into(),
                envelope_from: None,
                dkim_domain: None,
                dkim_result: None,
                spf_domain: None,
                spf_result: None,
            },
            report: Report {
                id: 1,
                domain_id: 1,
                org_name: "google.com".into(),
                reporter_email: None,
                report_id: "r1".into(),
                date_begin: at,
                date_end: at,
                policy_domain: "example.com".into(),
                policy_p: "none".into(),
                policy_sp: None,
                policy_pct: None,
                policy_adkim: None,
                policy_aspf: None,
                total_count: 0,
                pass_count: 0,
                fail_count: 0,
                created_at: at,
            },
        }
    }

    /// Expected: +1 day, +7 days, +1 calendar month clamped to month end
    #[test]
    fn computes_next_run() {
        let at = Utc.with_ymd_and_hms(2026, 1, 31, 8, 0, 0).unwrap();

        assert_eq!(
            next_run(at, Frequency::Daily),
            Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap()
        );
        assert_eq!(
            next_run(at, Frequency::Weekly),
            Utc.with_ymd_and_hms(2026, 2, 7, 8, 0, 0).unwrap()
        );
        assert_eq!(
            next_run(at, Frequency::Monthly),
            Utc.with_ymd_and_hms(2026, 2, 28, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn summarizes_failing_sources() {
        let domain = Domain {
            id: 1,
            organization_id: 1,
            name: "example.com".into(),
            created_at: Utc::now(),
            last_report_at: None,
        };
        let rows = vec![
            row("192.0.2.1", 100, "pass"),
            row("192.0.2.2", 5, "fail"),
            row("192.0.2.3", 9, "fail"),
            row("192.0.2.2", 6, "fail"),
        ];

        let line = summarize_domain(&domain, &rows);

        assert_eq!(line.total, 120);
        assert_eq!(line.passed, 100);
        assert_eq!(
            line.failing_sources,
            vec![("192.0.2.2".to_string(), 11), ("192.0.2.3".to_string(), 9)]
        );
        assert_eq!(
            line.field().1,
            "120 messages, 83.3% passed; top failing: 192.0.2.2 (11), 192.0.2.3 (9)"
        );
    }

    /// Tests a daily summary counts a report ingested after the previous send
    /// even though its period started before it.
    ///
    /// Reports ingested before the previous send were already summarized.
    ///
    /// Expected: only the 50 messages of the newly ingested report
    #[tokio::test]
    async fn summary_counts_reports_by_ingestion_time() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let (_, organization, domain) = factory::helpers::create_domain_with_owner(db).await?;
        let now = Utc::now();
        let last_sent_at = now - Duration::hours(24);

        let fresh = factory::report::ReportFactory::new(db, domain.id)
            .window(now - Duration::hours(34), now - Duration::hours(10))
            .counts(50, 50)
            .created_at(now - Duration::hours(1))
            .build()
            .await?;
        factory::report::RecordFactory::new(db, fresh.id)
            .count(50)
            .build()
            .await?;
        let summarized = factory::report::ReportFactory::new(db, domain.id)
            .window(now - Duration::hours(58), now - Duration::hours(34))
            .counts(7, 0)
            .created_at(now - Duration::hours(30))
            .build()
            .await?;
        factory::report::RecordFactory::new(db, summarized.id)
            .count(7)
            .results("fail", "fail")
            .build()
            .await?;

        let schedule = ScheduledReport {
            id: 1,
            organization_id: organization.id,
            frequency: Frequency::Daily,
            webhook_url: "https://hooks.example.com/dmarc".to_string(),
            webhook_kind: WebhookKind::Generic,
            enabled: true,
            last_sent_at: Some(last_sent_at),
            next_run_at: now,
        };

        let notification = ScheduledReportService::new(db)
            .build_summary(&schedule, now, "http://localhost:8080")
            .await?
            .unwrap();

        assert!(notification.text.starts_with("50 messages since"));
        assert_eq!(notification.fields.len(), 1);
        assert_eq!(notification.fields[0].1, "50 messages, 100.0% passed");

        Ok(())
    }
}
