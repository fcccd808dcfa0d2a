//! Gmail mailbox integration
//!
//! Organizations connect a mailbox that receives DMARC reports through a
//! separate Google OAuth flow requesting read-only Gmail access. The sync
//! job then downloads report attachments and feeds them to ingestion.

use sea_orm::DatabaseConnection;

use crate::server::{
    data::gmail_account::GmailAccountRepository, error::AppError, model::gmail::GmailAccount,
    state::OAuth2Client,
};

pub mod connect;
pub mod sync;

const GMAIL_API_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

pub struct GmailService<'a> {
    pub db: &'a DatabaseConnection,
    pub http_client: &'a reqwest::Client,
    pub oauth_client: &'a OAuth2Client,
}

impl<'a> GmailService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        http_client: &'a reqwest::Client,
        oauth_client: &'a OAuth2Client,
    ) -> Self {
        Self {
            db,
            http_client,
            oauth_client,
        }
    }

    pub async fn list(&self, organization_id: i32) -> Result<Vec<GmailAccount>, AppError> {
        Ok(GmailAccountRepository::new(self.db)
            .list_by_organization(organization_id)
            .await?)
    }

    pub async fn delete(&self, organization_id: i32, id: i32) -> Result<bool, AppError> {
        let deleted = GmailAccountRepository::new(self.db)
            .delete(organization_id, id)
            .await?;
        if deleted {
            tracing::info!(
                "Disconnected Gmail account {} from organization {}",
                id,
                organization_id
            );
        }

        Ok(deleted)
    }
}
