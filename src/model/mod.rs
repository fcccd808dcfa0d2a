//! Request and response DTOs for the JSON API.
//!
//! These types define the wire format of every endpoint and double as the
//! OpenAPI schemas. Small enums shared with the service layer (roles, plans,
//! policies) live next to the DTOs that expose them.

pub mod ai;
pub mod alert;
pub mod api;
pub mod api_key;
pub mod billing;
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
