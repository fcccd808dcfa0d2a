//! Domain models and operation parameters used by the service and data layers.
//!
//! Models are converted from entities at the repository boundary with
//! `from_entity` and into API DTOs with `into_dto` in controllers.

pub mod ai;
pub mod alert;
pub mod api_key;
pub mod dns;
pub mod domain;
pub mod gmail;
pub mod organization;
pub mod pagination;
pub mod recommendation;
pub mod report;
pub mod scheduled_report;
pub mod search;
pub mod source;
pub mod stats;
pub mod user;
