pub use sea_orm_migration::prelude::*;

mod m20260901_000001_create_user_table;
mod m20260901_000002_create_organization_table;
mod m20260901_000003_create_org_member_table;
mod m20260901_000004_create_invitation_table;
mod m20260901_000005_create_domain_table;
mod m20260901_000006_create_report_table;
mod m20260901_000007_create_record_table;
mod m20260901_000008_create_forensic_report_table;
mod m20260901_000009_create_known_sender_table;
mod m20260901_000010_create_source_table;
mod m20260901_000011_create_alert_rule_table;
mod m20260901_000012_create_alert_table;
mod m20260901_000013_create_api_key_table;
mod m20260901_000014_create_scheduled_report_table;
mod m20260901_000015_create_gmail_account_table;
mod m20260901_000016_create_ai_integration_table;
mod m20260901_000017_create_ai_recommendation_cache_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260901_000001_create_user_table::Migration),
            Box::new(m20260901_000002_create_organization_table::Migration),
            Box::new(m20260901_000003_create_org_member_table::Migration),
            Box::new(m20260901_000004_create_invitation_table::Migration),
            Box::new(m20260901_000005_create_domain_table::Migration),
            Box::new(m20260901_000006_create_report_table::Migration),
            Box::new(m20260901_000007_create_record_table::Migration),
            Box::new(m20260901_000008_create_forensic_report_table::Migration),
            Box::new(m20260901_000009_create_known_sender_table::Migration),
            Box::new(m20260901_000010_create_source_table::Migration),
            Box::new(m20260901_000011_create_alert_rule_table::Migration),
            Box::new(m20260901_000012_create_alert_table::Migration),
            Box::new(m20260901_000013_create_api_key_table::Migration),
            Box::new(m20260901_000014_create_scheduled_report_table::Migration),
            Box::new(m20260901_000015_create_gmail_account_table::Migration),
            Box::new(m20260901_000016_create_ai_integration_table::Migration),
            Box::new(m20260901_000017_create_ai_recommendation_cache_table::Migration),
        ]
    }
}
