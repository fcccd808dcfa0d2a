use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

use crate::server::{
    data::source::upsert_traffic,
    model::{
        report::{ParsedAggregateReport, Record, RecordWithReport, Report},
        search::SearchHit,
        source::Source,
    },
};

/// Records per `INSERT` statement. Each record binds 12 values and SQLite
/// builds before 3.32 accept at most 999 variables per statement.
const RECORD_INSERT_BATCH: usize = 80;

pub struct ReportRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReportRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Whether a report with the same reporter and report id was already stored
    /// for the domain.
    pub async fn exists(
        &self,
        domain_id: i32,
        org_name: &str,
        report_id: &str,
    ) -> Result<bool, DbErr> {
        let count = entity::prelude::Report::find()
            .filter(entity::report::Column::DomainId.eq(domain_id))
            .filter(entity::report::Column::OrgName.eq(org_name))
            .filter(entity::report::Column::ReportId.eq(report_id))
            .count(self.db)
            .await?;

        Ok(count > 0)
    }

    /// Stores a parsed aggregate report with its records, adds its traffic to
    /// the domain's sources and sets the domain's last report time, all in one
    /// transaction.
    ///
    /// Message totals are computed from the records. Sources are stamped with
    /// the end of the report period.
    ///
    /// # Returns
    /// - `Ok((report, new_sources))` - Stored report and the sources it created
    pub async fn create(
        &self,
        domain_id: i32,
        parsed: ParsedAggregateReport,
        ingested_at: DateTime<Utc>,
    ) -> Result<(Report, Vec<Source>), DbErr> {
        let traffic = parsed.traffic_by_source();
        let txn = self.db.begin().await?;

        let report = insert_report(&txn, domain_id, parsed).await?;

        entity::domain::ActiveModel {
            id: ActiveValue::Unchanged(domain_id),
            last_report_at: ActiveValue::Set(Some(ingested_at)),
            ..Default::default()
        }
        .update(&txn)
        .await?;

        let mut created = Vec::new();
        for t in &traffic {
            let (source, is_new) = upsert_traffic(&txn, domain_id, t, report.date_end).await?;
            if is_new {
                created.push(source);
            }
        }

        txn.commit().await?;

        Ok((report, created))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Report>, DbErr> {
        let report = entity::prelude::Report::find_by_id(id).one(self.db).await?;

        Ok(report.map(Report::from_entity))
    }

    /// Gets a page of a domain's reports, newest period first.
    ///
    /// # Returns
    /// - `Ok((reports, total))` - Reports on the requested page and total count
    pub async fn get_by_domain_paginated(
        &self,
        domain_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Report>, u64), DbErr> {
        let paginator = entity::prelude::Report::find()
            .filter(entity::report::Column::DomainId.eq(domain_id))
            .order_by_desc(entity::report::Column::DateBegin)
            .order_by_desc(entity::report::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let reports = paginator.fetch_page(page).await?;

        Ok((reports.into_iter().map(Report::from_entity).collect(), total))
    }

    pub async fn get_records(&self, report_id: i32) -> Result<Vec<Record>, DbErr> {
        let records = entity::prelude::Record::find()
            .filter(entity::record::Column::ReportId.eq(report_id))
            .order_by_desc(entity::record::Column::Count)
            .all(self.db)
            .await?;

        Ok(records.into_iter().map(Record::from_entity).collect())
    }

    /// Reports of a domain whose period starts at or after `since`.
    pub async fn get_since(&self, domain_id: i32, since: DateTime<Utc>) -> Result<Vec<Report>, DbErr> {
        let reports = entity::prelude::Report::find()
            .filter(entity::report::Column::DomainId.eq(domain_id))
            .filter(entity::report::Column::DateBegin.gte(since))
            .order_by_asc(entity::report::Column::DateBegin)
            .all(self.db)
            .await?;

        Ok(reports.into_iter().map(Report::from_entity).collect())
    }

    /// Records of reports whose period starts at or after `since`, with the
    /// owning report, ordered by report date then record id.
    pub async fn get_records_since(
        &self,
        domain_id: i32,
        since: DateTime<Utc>,
    ) -> Result<Vec<RecordWithReport>, DbErr> {
        let rows = entity::prelude::Record::find()
            .find_also_related(entity::prelude::Report)
            .filter(entity::report::Column::DomainId.eq(domain_id))
            .filter(entity::report::Column::DateBegin.gte(since))
            .order_by_asc(entity::report::Column::DateBegin)
            .order_by_asc(entity::record::Column::Id)
            .all(self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(record, report)| {
                report.map(|report| RecordWithReport {
                    record: Record::from_entity(record),
                    report: Report::from_entity(report),
                })
            })
            .collect())
    }

    /// Records of reports ingested in `[since, until)`, with the owning report,
    /// ordered by ingestion time then record id.
    ///
    /// Consecutive windows count every report exactly once, whatever period
    /// the report covers.
    pub async fn get_records_ingested_between(
        &self,
        domain_id: i32,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<RecordWithReport>, DbErr> {
        let rows = entity::prelude::Record::find()
            .find_also_related(entity::prelude::Report)
            .filter(entity::report::Column::DomainId.eq(domain_id))
            .filter(entity::report::Column::CreatedAt.gte(since))
            .filter(entity::report::Column::CreatedAt.lt(until))
            .order_by_asc(entity::report::Column::CreatedAt)
            .order_by_asc(entity::record::Column::Id)
            .all(self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(record, report)| {
                report.map(|report| RecordWithReport {
                    record: Record::from_entity(record),
                    report: Report::from_entity(report),
                })
            })
            .collect())
    }

    /// Start of the earliest report period stored for the domain.
    pub async fn first_report_date(&self, domain_id: i32) -> Result<Option<DateTime<Utc>>, DbErr> {
        let first = entity::prelude::Report::find()
            .filter(entity::report::Column::DomainId.eq(domain_id))
            .order_by_asc(entity::report::Column::DateBegin)
            .one(self.db)
            .await?;

        Ok(first.map(|r| r.date_begin))
    }

    /// All-time `(total, passed)` message counts of a domain.
    pub async fn all_time_totals(&self, domain_id: i32) -> Result<(i64, i64), DbErr> {
        let reports = entity::prelude::Report::find()
            .filter(entity::report::Column::DomainId.eq(domain_id))
            .all(self.db)
            .await?;

        Ok(reports
            .iter()
            .fold((0, 0), |(t, p), r| (t + r.total_count, p + r.pass_count)))
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Report::delete_by_id(id).exec(self.db).await?;

        Ok(())
    }

    /// Reports of the given organizations whose reporter or report id contains `query`.
    pub async fn search(
        &self,
        organization_ids: &[i32],
        query: &str,
        limit: u64,
    ) -> Result<Vec<SearchHit>, DbErr> {
        let rows = entity::prelude::Report::find()
            .find_also_related(entity::prelude::Domain)
            .filter(entity::domain::Column::OrganizationId.is_in(organization_ids.to_vec()))
            .filter(
                Condition::any()
                    .add(entity::report::Column::OrgName.contains(query))
                    .add(entity::report::Column::ReportId.contains(query)),
            )
            .order_by_desc(entity::report::Column::DateBegin)
            .limit(limit)
            .all(self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(report, domain)| {
                domain.map(|domain| SearchHit {
                    id: report.id,
                    organization_id: domain.organization_id,
                    domain_id: Some(domain.id),
                    title: format!("{} ({})", report.org_name, report.report_id),
                    subtitle: Some(domain.name),
                })
            })
            .collect())
    }
}

/// Inserts a report row and its records on `conn`, records in batches.
async fn insert_report<C: ConnectionTrait>(
    conn: &C,
    domain_id: i32,
    parsed: ParsedAggregateReport,
) -> Result<Report, DbErr> {
    let (total, passed) = parsed.totals();

    let report = entity::report::ActiveModel {
        domain_id: ActiveValue::Set(domain_id),
        org_name: ActiveValue::Set(parsed.org_name),
        reporter_email: ActiveValue::Set(parsed.reporter_email),
        report_id: ActiveValue::Set(parsed.report_id),
        date_begin: ActiveValue::Set(parsed.date_begin),
        date_end: ActiveValue::Set(parsed.date_end),
        policy_domain: ActiveValue::Set(parsed.policy_domain),
        policy_p: ActiveValue::Set(parsed.policy_p),
        policy_sp: ActiveValue::Set(parsed.policy_sp),
        policy_pct: ActiveValue::Set(parsed.policy_pct),
        policy_adkim: ActiveValue::Set(parsed.policy_adkim),
        policy_aspf: ActiveValue::Set(parsed.policy_aspf),
        total_count: ActiveValue::Set(total),
        pass_count: ActiveValue::Set(passed),
        fail_count: ActiveValue::Set(total - passed),
        created_at: ActiveValue::Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    let records: Vec<entity::record::ActiveModel> = parsed
        .records
        .into_iter()
        .map(|r| entity::record::ActiveModel {
            report_id: ActiveValue::Set(report.id),
            source_ip: ActiveValue::Set(r.source_ip),
            count: ActiveValue::Set(r.count),
            disposition: ActiveValue::Set(r.disposition),
            dkim: ActiveValue::Set(r.dkim),
            spf: ActiveValue::Set(r.spf),
            header_from: ActiveValue::Set(r.header_from),
            envelope_from: ActiveValue::Set(r.envelope_from),
            dkim_domain: ActiveValue::Set(r.dkim_domain),
            dkim_result: ActiveValue::Set(r.dkim_result),
            spf_domain: ActiveValue::Set(r.spf_domain),
            spf_result: ActiveValue::Set(r.spf_result),
            ..Default::default()
        })
        .collect();

    for batch in records.chunks(RECORD_INSERT_BATCH) {
        entity::prelude::Record::insert_many(batch.to_vec())
            .exec(conn)
            .await?;
    }

    Ok(Report::from_entity(report))
}
