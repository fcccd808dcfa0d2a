//! SeaORM entity definitions for the DMARC analyser schema.
//!
//! One module per table. Foreign keys mirror the hierarchy
//! organization → domain → report → record and cascade on delete.

pub mod prelude;

pub mod ai_integration;
pub mod ai_recommendation_cache;
pub mod alert;
pub mod alert_rule;
pub mod api_key;
pub mod domain;
pub mod forensic_report;
pub mod gmail_account;
pub mod invitation;
pub mod known_sender;
pub mod org_member;
pub mod organization;
pub mod record;
pub mod report;
pub mod scheduled_report;
pub mod source;
pub mod user;
