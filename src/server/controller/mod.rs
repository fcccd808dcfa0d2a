//! HTTP request handlers.
//!
//! Each submodule groups the endpoints of one resource. Handlers check access
//! through [`AuthGuard`](crate::server::middleware::auth::AuthGuard), convert
//! DTOs to service parameters, call the service layer and convert the
//! resulting domain models back into DTOs.

use serde::Deserialize;
use utoipa::IntoParams;

pub mod ai;
pub mod alert;
pub mod api_key;
pub mod auth;
pub mod billing;
pub mod domain;
pub mod gmail;
pub mod known_sender;
pub mod member;
pub mod organization;
pub mod recommendation;
pub mod report;
pub mod scheduled_report;
pub mod search;
pub mod source;
pub mod stats;

/// Upper bound for the `entries` query parameter.
const MAX_ENTRIES: u64 = 100;

/// Page selection shared by every paginated listing.
#[derive(Deserialize, IntoParams)]
pub struct PaginationParams {
    /// Zero-based page index
    #[serde(default)]
    pub page: u64,
    /// Entries per page, 1 to 100
    #[serde(default = "default_entries")]
    pub entries: u64,
}

pub(super) fn default_entries() -> u64 {
    10
}

impl PaginationParams {
    pub fn per_page(&self) -> u64 {
        self.entries.clamp(1, MAX_ENTRIES)
    }
}

/// Reporting window in days, defaulting to 30 when absent.
#[derive(Deserialize, IntoParams)]
pub struct WindowParams {
    /// Number of days, clamped to 1..=365
    pub days: Option<i64>,
}
