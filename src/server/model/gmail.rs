use chrono::{DateTime, Utc};

use crate::{
    model::gmail::{GmailAccountDto, GmailSyncResultDto, SyncStatus},
    server::{error::internal::InternalError, util::parse::parse_column},
};

#[derive(Debug, Clone, PartialEq)]
pub struct GmailAccount {
    pub id: i32,
    pub organization_id: i32,
    pub email: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub sync_status: SyncStatus,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl GmailAccount {
    pub fn from_entity(entity: entity::gmail_account::Model) -> Result<Self, InternalError> {
        Ok(Self {
            id: entity.id,
            organization_id: entity.organization_id,
            email: entity.email,
            access_token: entity.access_token,
            refresh_token: entity.refresh_token,
            token_expires_at: entity.token_expires_at,
            sync_status: parse_column("gmail_account.sync_status", &entity.sync_status)?,
            last_sync_at: entity.last_sync_at,
            last_error: entity.last_error,
            created_at: entity.created_at,
        })
    }

    /// Whether the access token must be refreshed before use.
    ///
    /// Tokens are refreshed one minute ahead of expiry.
    pub fn token_expired(&self, now: DateTime<Utc>) -> bool {
        self.token_expires_at
            .is_some_and(|at| at <= now + chrono::Duration::minutes(1))
    }

    pub fn into_dto(self) -> GmailAccountDto {
        GmailAccountDto {
            id: self.id,
            organization_id: self.organization_id,
            email: self.email,
            sync_status: self.sync_status,
            last_sync_at: self.last_sync_at,
            last_error: self.last_error,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpsertGmailAccountParams {
    pub organization_id: i32,
    pub email: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GmailSyncResult {
    pub messages: u64,
    pub reports: u64,
    pub duplicates: u64,
    pub failures: u64,
}

impl GmailSyncResult {
    pub fn into_dto(self) -> GmailSyncResultDto {
        GmailSyncResultDto {
            messages: self.messages,
            reports: self.reports,
            duplicates: self.duplicates,
            failures: self.failures,
        }
    }
}
