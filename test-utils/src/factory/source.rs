use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for sending sources.
///
/// Defaults to an unclassified source without geolocation.
pub struct SourceFactory<'a> {
    db: &'a DatabaseConnection,
    domain_id: i32,
    ip: String,
    hostname: Option<String>,
    country: Option<String>,
    known_sender_id: Option<i32>,
    total_count: i64,
    pass_count: i64,
    geo_checked_at: Option<DateTime<Utc>>,
}

impl<'a> SourceFactory<'a> {
    pub fn new(db: &'a DatabaseConnection, domain_id: i32, ip: impl Into<String>) -> Self {
        Self {
            db,
            domain_id,
            ip: ip.into(),
            hostname: None,
            country: None,
            known_sender_id: None,
            total_count: 1,
            pass_count: 1,
            geo_checked_at: None,
        }
    }

    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn known_sender_id(mut self, known_sender_id: i32) -> Self {
        self.known_sender_id = Some(known_sender_id);
        self
    }

    pub fn counts(mut self, total: i64, pass: i64) -> Self {
        self.total_count = total;
        self.pass_count = pass;
        self
    }

    pub fn geo_checked_at(mut self, at: DateTime<Utc>) -> Self {
        self.geo_checked_at = Some(at);
        self
    }

    pub async fn build(self) -> Result<entity::source::Model, DbErr> {
        let now = Utc::now();
        entity::source::ActiveModel {
            domain_id: ActiveValue::Set(self.domain_id),
            ip: ActiveValue::Set(self.ip),
            hostname: ActiveValue::Set(self.hostname),
            country: ActiveValue::Set(self.country),
            city: ActiveValue::Set(None),
            isp: ActiveValue::Set(None),
            known_sender_id: ActiveValue::Set(self.known_sender_id),
            total_count: ActiveValue::Set(self.total_count),
            pass_count: ActiveValue::Set(self.pass_count),
            first_seen: ActiveValue::Set(now),
            last_seen: ActiveValue::Set(now),
            geo_checked_at: ActiveValue::Set(self.geo_checked_at),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

pub async fn create_source(
    db: &DatabaseConnection,
    domain_id: i32,
    ip: &str,
) -> Result<entity::source::Model, DbErr> {
    SourceFactory::new(db, domain_id, ip).build().await
}
