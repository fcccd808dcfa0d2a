//! DMARC Analyser backend.
//!
//! Receives DMARC aggregate and forensic reports (uploads, API key ingestion
//! and connected Gmail mailboxes), stores them per organization and domain,
//! and serves statistics, sender classification, policy recommendations,
//! alerts and billing over a JSON API documented with OpenAPI.
//!
//! # Layout
//!
//! - `controller/` - Axum handlers; each checks access through [`middleware::auth::AuthGuard`]
//!   or the API key guard before calling a service, and returns DTOs
//! - `service/` - Ingestion, statistics, DNS, recommendations and third-party integrations
//! - `data/` - One SeaORM repository per table, returning `model/` types
//! - `error/` - `AppError` and its HTTP mapping
//! - `scheduler/` - Gmail sync, geolocation enrichment and scheduled summaries
//! - `config`, `state`, `startup`, `router` - Wiring done once in `main`

pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod middleware;
pub mod model;
pub mod router;
pub mod scheduler;
pub mod service;
pub mod startup;
pub mod state;
pub mod util;
