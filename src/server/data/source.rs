use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::server::model::{
    report::SourceTraffic,
    search::SearchHit,
    source::{GeoLocation, Source, SourceWithSender},
};

pub struct SourceRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SourceRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets a page of a domain's sources by descending volume, with known sender names.
    pub async fn get_by_domain_paginated(
        &self,
        domain_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<SourceWithSender>, u64), DbErr> {
        let paginator = entity::prelude::Source::find()
            .filter(entity::source::Column::DomainId.eq(domain_id))
            .find_also_related(entity::prelude::KnownSender)
            .order_by_desc(entity::source::Column::TotalCount)
            .order_by_asc(entity::source::Column::Ip)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page).await?;

        let sources = rows
            .into_iter()
            .map(|(source, sender)| SourceWithSender {
                source: Source::from_entity(source),
                known_sender: sender.map(|s| s.name),
            })
            .collect();

        Ok((sources, total))
    }

    /// Counts sources not attributed to any known sender.
    pub async fn count_unknown(&self, domain_id: i32) -> Result<u64, DbErr> {
        entity::prelude::Source::find()
            .filter(entity::source::Column::DomainId.eq(domain_id))
            .filter(entity::source::Column::KnownSenderId.is_null())
            .count(self.db)
            .await
    }

    /// Sources never looked up by the geolocation job, oldest first.
    pub async fn get_pending_geo(&self, limit: u64) -> Result<Vec<Source>, DbErr> {
        let sources = entity::prelude::Source::find()
            .filter(entity::source::Column::GeoCheckedAt.is_null())
            .order_by_asc(entity::source::Column::FirstSeen)
            .limit(limit)
            .all(self.db)
            .await?;

        Ok(sources.into_iter().map(Source::from_entity).collect())
    }

    /// Stores a geolocation result and marks the source as checked.
    ///
    /// The check timestamp is written even when the lookup found nothing so
    /// the source is not retried on every run.
    pub async fn set_geo(&self, id: i32, geo: GeoLocation) -> Result<(), DbErr> {
        entity::source::ActiveModel {
            id: ActiveValue::Unchanged(id),
            country: ActiveValue::Set(geo.country),
            city: ActiveValue::Set(geo.city),
            isp: ActiveValue::Set(geo.isp),
            geo_checked_at: ActiveValue::Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(())
    }

    pub async fn set_hostname(
        &self,
        id: i32,
        hostname: Option<String>,
        known_sender_id: Option<i32>,
    ) -> Result<(), DbErr> {
        entity::source::ActiveModel {
            id: ActiveValue::Unchanged(id),
            hostname: ActiveValue::Set(hostname),
            known_sender_id: ActiveValue::Set(known_sender_id),
            ..Default::default()
        }
        .update(self.db)
        .await?;

        Ok(())
    }

    /// Sources of the given organizations whose IP or hostname contains `query`.
    pub async fn search(
        &self,
        organization_ids: &[i32],
        query: &str,
        limit: u64,
    ) -> Result<Vec<SearchHit>, DbErr> {
        let rows = entity::prelude::Source::find()
            .find_also_related(entity::prelude::Domain)
            .filter(entity::domain::Column::OrganizationId.is_in(organization_ids.to_vec()))
            .filter(
                Condition::any()
                    .add(entity::source::Column::Ip.contains(query))
                    .add(entity::source::Column::Hostname.contains(query)),
            )
            .order_by_desc(entity::source::Column::TotalCount)
            .limit(limit)
            .all(self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(source, domain)| {
                domain.map(|domain| SearchHit {
                    id: source.id,
                    organization_id: domain.organization_id,
                    domain_id: Some(domain.id),
                    title: source.ip,
                    subtitle: source.hostname.or(Some(domain.name)),
                })
            })
            .collect())
    }
}

/// Adds one report's traffic to a source on any connection, creating the
/// source on first sight.
///
/// Runs inside the report ingestion transaction.
pub(super) async fn upsert_traffic<C: ConnectionTrait>(
    conn: &C,
    domain_id: i32,
    traffic: &SourceTraffic,
    seen_at: DateTime<Utc>,
) -> Result<(Source, bool), DbErr> {
    let existing = entity::prelude::Source::find()
        .filter(entity::source::Column::DomainId.eq(domain_id))
        .filter(entity::source::Column::Ip.eq(traffic.ip.as_str()))
        .one(conn)
        .await?;

    match existing {
        Some(existing) => {
            let first_seen = existing.first_seen.min(seen_at);
            let last_seen = existing.last_seen.max(seen_at);
            let total = existing.total_count + traffic.count;
            let pass = existing.pass_count + traffic.passed;

            let mut active: entity::source::ActiveModel = existing.into();
            active.total_count = ActiveValue::Set(total);
            active.pass_count = ActiveValue::Set(pass);
            active.first_seen = ActiveValue::Set(first_seen);
            active.last_seen = ActiveValue::Set(last_seen);
            let updated = active.update(conn).await?;

            Ok((Source::from_entity(updated), false))
        }
        None => {
            let created = entity::source::ActiveModel {
                domain_id: ActiveValue::Set(domain_id),
                ip: ActiveValue::Set(traffic.ip.clone()),
                hostname: ActiveValue::Set(None),
                country: ActiveValue::Set(None),
                city: ActiveValue::Set(None),
                isp: ActiveValue::Set(None),
                known_sender_id: ActiveValue::Set(None),
                total_count: ActiveValue::Set(traffic.count),
                pass_count: ActiveValue::Set(traffic.passed),
                first_seen: ActiveValue::Set(seen_at),
                last_seen: ActiveValue::Set(seen_at),
                geo_checked_at: ActiveValue::Set(None),
                ..Default::default()
            }
            .insert(conn)
            .await?;

            Ok((Source::from_entity(created), true))
        }
    }
}
