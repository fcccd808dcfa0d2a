use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use crate::factory::helpers::next_id;

/// Factory for aggregate reports.
///
/// Defaults to a one day window ending now, a `p=none` policy and zero counts.
/// Counts are stored as given; add records with [`RecordFactory`] and set the
/// matching totals here when a test depends on them.
pub struct ReportFactory<'a> {
    db: &'a DatabaseConnection,
    domain_id: i32,
    org_name: String,
    report_id: String,
    policy_domain: String,
    policy_p: String,
    policy_pct: Option<i32>,
    date_begin: DateTime<Utc>,
    date_end: DateTime<Utc>,
    total_count: i64,
    pass_count: i64,
    created_at: DateTime<Utc>,
}

impl<'a> ReportFactory<'a> {
    pub fn new(db: &'a DatabaseConnection, domain_id: i32) -> Self {
        let id = next_id();
        let date_end = Utc::now();
        Self {
            db,
            domain_id,
            org_name: "google.com".to_string(),
            report_id: format!("report-{}", id),
            policy_domain: "example.com".to_string(),
            policy_p: "none".to_string(),
            policy_pct: Some(100),
            date_begin: date_end - Duration::days(1),
            date_end,
            total_count: 0,
            pass_count: 0,
            created_at: date_end,
        }
    }

    pub fn org_name(mut self, org_name: impl Into<String>) -> Self {
        self.org_name = org_name.into();
        self
    }

    pub fn report_id(mut self, report_id: impl Into<String>) -> Self {
        self.report_id = report_id.into();
        self
    }

    pub fn policy_domain(mut self, policy_domain: impl Into<String>) -> Self {
        self.policy_domain = policy_domain.into();
        self
    }

    pub fn policy(mut self, p: impl Into<String>, pct: Option<i32>) -> Self {
        self.policy_p = p.into();
        self.policy_pct = pct;
        self
    }

    pub fn window(mut self, date_begin: DateTime<Utc>, date_end: DateTime<Utc>) -> Self {
        self.date_begin = date_begin;
        self.date_end = date_end;
        self
    }

    /// Sets total and passing message counts; the fail count is the difference.
    pub fn counts(mut self, total: i64, pass: i64) -> Self {
        self.total_count = total;
        self.pass_count = pass;
        self
    }

    /// Sets when the report was ingested.
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub async fn build(self) -> Result<entity::report::Model, DbErr> {
        entity::report::ActiveModel {
            domain_id: ActiveValue::Set(self.domain_id),
            org_name: ActiveValue::Set(self.org_name),
            reporter_email: ActiveValue::Set(Some("noreply-dmarc-support@google.com".to_string())),
            report_id: ActiveValue::Set(self.report_id),
            date_begin: ActiveValue::Set(self.date_begin),
            date_end: ActiveValue::Set(self.date_end),
            policy_domain: ActiveValue::Set(self.policy_domain),
            policy_p: ActiveValue::Set(self.policy_p),
            policy_sp: ActiveValue::Set(None),
            policy_pct: ActiveValue::Set(self.policy_pct),
            policy_adkim: ActiveValue::Set(Some("r".to_string())),
            policy_aspf: ActiveValue::Set(Some("r".to_string())),
            total_count: ActiveValue::Set(self.total_count),
            pass_count: ActiveValue::Set(self.pass_count),
            fail_count: ActiveValue::Set(self.total_count - self.pass_count),
            created_at: ActiveValue::Set(self.created_at),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Factory for report records.
///
/// Defaults to one aligned, passing message from `192.0.2.1`.
pub struct RecordFactory<'a> {
    db: &'a DatabaseConnection,
    report_id: i32,
    source_ip: String,
    count: i64,
    disposition: String,
    dkim: String,
    spf: String,
    header_from: String,
}

impl<'a> RecordFactory<'a> {
    pub fn new(db: &'a DatabaseConnection, report_id: i32) -> Self {
        Self {
            db,
            report_id,
            source_ip: "192.0.2.1".to_string(),
            count: 1,
            disposition: "none".to_string(),
            dkim: "pass".to_string(),
            spf: "pass".to_string(),
            header_from: "example.com".to_string(),
        }
    }

    pub fn source_ip(mut self, source_ip: impl Into<String>) -> Self {
        self.source_ip = source_ip.into();
        self
    }

    pub fn count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    pub fn disposition(mut self, disposition: impl Into<String>) -> Self {
        self.disposition = disposition.into();
        self
    }

    /// Sets the aligned DKIM and SPF policy results.
    pub fn results(mut self, dkim: impl Into<String>, spf: impl Into<String>) -> Self {
        self.dkim = dkim.into();
        self.spf = spf.into();
        self
    }

    pub fn header_from(mut self, header_from: impl Into<String>) -> Self {
        self.header_from = header_from.into();
        self
    }

    pub async fn build(self) -> Result<entity::record::Model, DbErr> {
        entity::record::ActiveModel {
            report_id: ActiveValue::Set(self.report_id),
            source_ip: ActiveValue::Set(self.source_ip),
            count: ActiveValue::Set(self.count),
            disposition: ActiveValue::Set(self.disposition),
            dkim_result: ActiveValue::Set(Some(self.dkim.clone())),
            spf_result: ActiveValue::Set(Some(self.spf.clone())),
            dkim: ActiveValue::Set(self.dkim),
            spf: ActiveValue::Set(self.spf),
            dkim_domain: ActiveValue::Set(Some(self.header_from.clone())),
            spf_domain: ActiveValue::Set(Some(self.header_from.clone())),
            header_from: ActiveValue::Set(self.header_from),
            envelope_from: ActiveValue::Set(None),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

pub async fn create_report(
    db: &DatabaseConnection,
    domain_id: i32,
) -> Result<entity::report::Model, DbErr> {
    ReportFactory::new(db, domain_id).build().await
}

pub async fn create_record(
    db: &DatabaseConnection,
    report_id: i32,
) -> Result<entity::record::Model, DbErr> {
    RecordFactory::new(db, report_id).build().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builder::TestBuilder, factory};

    #[tokio::test]
    async fn derives_fail_count_from_counts() -> Result<(), DbErr> {
        let test = TestBuilder::new()
            .with_domain_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let (_, _, domain) = factory::helpers::create_domain_with_owner(db).await?;
        let report = ReportFactory::new(db, domain.id)
            .counts(10, 7)
            .build()
            .await?;

        assert_eq!(report.total_count, 10);
        assert_eq!(report.fail_count, 3);
        assert!(report.date_begin < report.date_end);

        Ok(())
    }

    #[tokio::test]
    async fn creates_record_for_report() -> Result<(), DbErr> {
        let test = TestBuilder::new()
            .with_domain_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let (_, _, domain) = factory::helpers::create_domain_with_owner(db).await?;
        let report = create_report(db, domain.id).await?;
        let record = RecordFactory::new(db, report.id)
            .results("fail", "pass")
            .count(5)
            .build()
            .await?;

        assert_eq!(record.report_id, report.id);
        assert_eq!(record.dkim, "fail");
        assert_eq!(record.count, 5);

        Ok(())
    }
}
