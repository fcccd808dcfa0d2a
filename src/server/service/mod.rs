//! Service layer for business logic and orchestration.
//!
//! This module contains the service layer of the application, which sits between the
//! controller (API) layer and the data (repository) layer. Services are responsible for:
//!
//! - **Business Logic**: Implementing core business rules and validation
//! - **Orchestration**: Coordinating repository calls with DNS, webhook and
//!   third-party API requests
//! - **Domain Models**: Working with domain models rather than DTOs or entity models

pub mod ai;
pub mod alert;
pub mod api_key;
pub mod auth;
pub mod billing;
pub mod dns;
pub mod domain;
pub mod export;
pub mod gmail;
pub mod ingest;
pub mod invitation;
pub mod known_sender;
pub mod member;
pub mod notify;
pub mod organization;
pub mod recommendation;
pub mod report;
pub mod scheduled_report;
pub mod search;
pub mod source;
pub mod stats;
