use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use crate::factory::helpers::next_id;

/// Factory for monitored domains.
///
/// Defaults to `"domain{n}.example"` without any report received.
pub struct DomainFactory<'a> {
    db: &'a DatabaseConnection,
    organization_id: i32,
    name: String,
    last_report_at: Option<DateTime<Utc>>,
}

impl<'a> DomainFactory<'a> {
    pub fn new(db: &'a DatabaseConnection, organization_id: i32) -> Self {
        Self {
            db,
            organization_id,
            name: format!("domain{}.example", next_id()),
            last_report_at: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn last_report_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_report_at = Some(at);
        self
    }

    pub async fn build(self) -> Result<entity::domain::Model, DbErr> {
        entity::domain::ActiveModel {
            organization_id: ActiveValue::Set(self.organization_id),
            name: ActiveValue::Set(self.name),
            created_at: ActiveValue::Set(Utc::now()),
            last_report_at: ActiveValue::Set(self.last_report_at),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

pub async fn create_domain(
    db: &DatabaseConnection,
    organization_id: i32,
) -> Result<entity::domain::Model, DbErr> {
    DomainFactory::new(db, organization_id).build().await
}
