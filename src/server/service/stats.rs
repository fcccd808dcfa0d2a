use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::DatabaseConnection;

use crate::server::{
    data::report::ReportRepository,
    error::AppError,
    model::{
        report::{is_aligned_pass, RecordWithReport, Report},
        stats::{Overview, TimelinePoint, TopSource},
    },
};

/// Window used when a request does not specify one.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;
const MAX_WINDOW_DAYS: i64 = 365;
const TOP_SOURCES: usize = 10;

/// Clamps a requested window to `1..=365` days, defaulting to 30.
pub fn window_days(days: Option<i64>) -> i64 {
    days.unwrap_or(DEFAULT_WINDOW_DAYS).clamp(1, MAX_WINDOW_DAYS)
}

pub struct StatsService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> StatsService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Aggregates a domain's reports whose `date_begin` falls in the last `days` days.
    ///
    /// # Arguments
    /// - `domain_id` - Domain to aggregate
    /// - `days` - Window length, already clamped by the caller
    ///
    /// # Returns
    /// - `Ok(Overview)` - Counters for the window, zeroed when no reports exist
    /// - `Err(AppError::DbErr)` - Database error
    pub async fn overview(&self, domain_id: i32, days: i64) -> Result<Overview, AppError> {
        let repo = ReportRepository::new(self.db);
        let since = Utc::now() - Duration::days(days);

        let report_count = repo.get_since(domain_id, since).await?.len() as u64;
        let rows = repo.get_records_since(domain_id, since).await?;

        Ok(summarize(domain_id, days, report_count, &rows))
    }

    /// One point per UTC day of the window, oldest first, days without reports zeroed.
    pub async fn timeline(&self, domain_id: i32, days: i64) -> Result<Vec<TimelinePoint>, AppError> {
        let now = Utc::now();
        let since = timeline_start(now, days);

        let reports = ReportRepository::new(self.db)
            .get_since(domain_id, since)
            .await?;

        Ok(daily_points(
            &reports,
            since.date_naive(),
            now.date_naive(),
        ))
    }
}

/// Midnight UTC of the first day of a `days`-long timeline ending on the day of `now`.
fn timeline_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    let first = now.date_naive() - Duration::days(days - 1);
    first.and_time(NaiveTime::MIN).and_utc()
}

/// Folds records of a window into an [`Overview`].
pub fn summarize(
    domain_id: i32,
    days: i64,
    report_count: u64,
    rows: &[RecordWithReport],
) -> Overview {
    let mut overview = Overview {
        domain_id,
        days,
        report_count,
        ..Default::default()
    };
    let mut by_source: HashMap<&str, (i64, i64)> = HashMap::new();

    for row in rows {
        let r = &row.record;
        overview.total_messages += r.count;
        if is_aligned_pass(&r.dkim, &r.spf) {
            overview.passed += r.count;
        }
        if r.dkim.eq_ignore_ascii_case("pass") {
            overview.dkim_pass += r.count;
        }
        if r.spf.eq_ignore_ascii_case("pass") {
            overview.spf_pass += r.count;
        }
        match r.disposition.to_ascii_lowercase().as_str() {
            "quarantine" => overview.disposition_quarantine += r.count,
            "reject" => overview.disposition_reject += r.count,
            _ => overview.disposition_none += r.count,
        }

        let entry = by_source.entry(r.source_ip.as_str()).or_default();
        entry.0 += r.count;
        if r.dmarc_pass() {
            entry.1 += r.count;
        }
    }

    overview.source_count = by_source.len() as u64;

    let mut top: Vec<TopSource> = by_source
        .into_iter()
        .map(|(ip, (total, passed))| TopSource {
            source_ip: ip.to_string(),
            total,
            passed,
        })
        .collect();
    top.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.source_ip.cmp(&b.source_ip)));
    top.truncate(TOP_SOURCES);
    overview.top_sources = top;

    overview
}

/// Buckets reports by the UTC day of `date_begin` between `start` and `end` inclusive.
pub fn daily_points(reports: &[Report], start: NaiveDate, end: NaiveDate) -> Vec<TimelinePoint> {
    let mut days: BTreeMap<NaiveDate, (i64, i64)> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|d| (d, (0, 0)))
        .collect();

    for report in reports {
        if let Some(entry) = days.get_mut(&report.date_begin.date_naive()) {
            entry.0 += report.total_count;
            entry.1 += report.pass_count;
        }
    }

    days.into_iter()
        .map(|(date, (total, passed))| TimelinePoint {
            date,
            total,
            passed,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use test_utils::{builder::TestBuilder, factory};

    use super::*;
    use crate::server::model::report::Record;

    fn report(id: i32, day: u32, total: i64, passed: i64) -> Report {
        let begin = Utc.with_ymd_and_hms(2026, 3, day, 0, 0, 0).unwrap();
        Report {
            id,
            domain_id: 1,
            org_name: "google.com".into(),
            reporter_email: None,
            report_id: format!("r{}", id),
            date_begin: begin,
            date_end: begin + Duration::days(1),
            policy_domain: "example.com".into(),
            policy_p: "none".into(),
            policy_sp: None,
            policy_pct: None,
            policy_adkim: None,
            policy_aspf: None,
            total_count: total,
            pass_count: passed,
            fail_count: total - passed,
            created_at: begin,
        }
    }

    fn row(ip: &str, count: i64, dkim: &str, spf: &str, disposition: &str) -> RecordWithReport {
        RecordWithReport {
            record: Record {
                id: 0,
                report_id: 1,
                source_ip: ip.into(),
                count,
                disposition: disposition.into(),
                dkim: dkim.into(),
                spf: spf.into(),
                header_from: "example.com".into(),
                envelope_from: None,
                dkim_domain: None,
                dkim_result: None,
                spf_domain: None,
                spf_result: None,
            },
            report: report(1, 1, 0, 0),
        }
    }

    #[test]
    fn clamps_window() {
        assert_eq!(window_days(None), 30);
        assert_eq!(window_days(Some(0)), 1);
        assert_eq!(window_days(Some(1000)), 365);
        assert_eq!(window_days(Some(7)), 7);
    }

    /// Expected: counters summed per column, sources ranked by volume
    #[test]
    fn summarizes_records() {
        let rows = vec![
            row("192.0.2.1", 90, "pass", "pass", "none"),
            row("192.0.2.2", 7, "fail", "pass", "none"),
            row("192.0.2.3", 3, "fail", "fail", "reject"),
            row("192.0.2.1", 10, "pass", "fail", "none"),
        ];

        let overview = summarize(1, 30, 2, &rows);

        assert_eq!(overview.total_messages, 110);
        assert_eq!(overview.passed, 107);
        assert_eq!(overview.failed(), 3);
        assert_eq!(overview.dkim_pass, 100);
        assert_eq!(overview.spf_pass, 97);
        assert_eq!(overview.disposition_none, 107);
        assert_eq!(overview.disposition_reject, 3);
        assert_eq!(overview.source_count, 3);
        assert_eq!(overview.report_count, 2);
        assert_eq!(overview.top_sources[0].source_ip, "192.0.2.1");
        assert_eq!(overview.top_sources[0].total, 100);
        assert_eq!(overview.pass_rate(), 97.3);
    }

    #[test]
    fn empty_window_has_zero_pass_rate() {
        let overview = summarize(1, 30, 0, &[]);

        assert_eq!(overview.total_messages, 0);
        assert_eq!(overview.pass_rate(), 0.0);
        assert!(overview.top_sources.is_empty());
    }

    /// Expected: every day present, reports on the same day summed
    #[test]
    fn fills_missing_days() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        let reports = vec![report(1, 2, 10, 8), report(2, 2, 5, 5), report(3, 4, 4, 0)];

        let points = daily_points(&reports, start, end);

        assert_eq!(points.len(), 4);
        assert_eq!(points[0].total, 0);
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(points[1].total, 15);
        assert_eq!(points[1].passed, 13);
        assert_eq!(points[2].total, 0);
        assert_eq!(points[3].passed, 0);
    }

    /// Expected: the window starts at midnight and spans exactly `days` days
    #[test]
    fn timeline_starts_at_midnight_of_first_day() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 15, 30, 0).unwrap();

        let since = timeline_start(now, 7);

        assert_eq!(since, Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap());
        assert_eq!(daily_points(&[], since.date_naive(), now.date_naive()).len(), 7);
        assert_eq!(timeline_start(now, 1), Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap());
    }

    /// Tests a report starting just after midnight of the first day is counted.
    ///
    /// Expected: `days` points with the report in the first one
    #[tokio::test]
    async fn timeline_counts_first_day_in_full() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_domain_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let (_, _, domain) = factory::helpers::create_domain_with_owner(db).await?;
        let first_day = Utc::now().date_naive() - Duration::days(2);
        let begin = first_day.and_hms_opt(0, 0, 1).unwrap().and_utc();
        factory::report::ReportFactory::new(db, domain.id)
            .window(begin, begin + Duration::days(1))
            .counts(20, 15)
            .build()
            .await?;

        let points = StatsService::new(db).timeline(domain.id, 3).await?;

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].date, first_day);
        assert_eq!(points[0].total, 20);
        assert_eq!(points[0].passed, 15);

        Ok(())
    }
}
