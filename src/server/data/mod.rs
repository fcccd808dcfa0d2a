//! Database repository layer for all domain entities.
//!
//! Each repository wraps a borrowed database connection and performs the queries for
//! one table. Repositories take SeaORM entity models internally and return the server
//! domain models, keeping entity types out of the service layer. Organization-scoped
//! lookups and deletes filter on `organization_id` so a row of another tenant behaves
//! as if it didn't exist.

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
pub mod report;
pub mod scheduled_report;
pub mod source;
pub mod user;

#[cfg(test)]
mod test;
