use chrono::Utc;
use oauth2::{AuthorizationCode, CsrfToken, Scope, TokenResponse};
use serde::Deserialize;
use url::Url;

use crate::server::{
    data::gmail_account::GmailAccountRepository,
    error::{auth::AuthError, AppError},
    model::gmail::{GmailAccount, UpsertGmailAccountParams},
    service::gmail::{GmailService, GMAIL_API_URL, GMAIL_READONLY_SCOPE},
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailProfile {
    email_address: String,
}

impl<'a> GmailService<'a> {
    /// Builds the authorize URL for connecting a mailbox.
    ///
    /// Requests offline access with a forced consent prompt so Google always
    /// returns a refresh token for the background sync.
    pub fn connect_url(&self) -> (Url, CsrfToken) {
        self.oauth_client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(GMAIL_READONLY_SCOPE.to_string()))
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .url()
    }

    /// Exchanges the authorization code and stores the mailbox for the organization.
    ///
    /// # Arguments
    /// - `organization_id` - Organization that started the connect flow
    /// - `authorization_code` - Code returned by Google to the callback
    ///
    /// # Returns
    /// - `Ok(GmailAccount)` - Connected or reconnected account
    /// - `Err(AuthError::TokenExchange)` - Code exchange rejected by Google
    /// - `Err(AppError::ReqwestErr)` - Profile request failed
    pub async fn complete_connect(
        &self,
        organization_id: i32,
        authorization_code: String,
    ) -> Result<GmailAccount, AppError> {
        let token = self
            .oauth_client
            .exchange_code(AuthorizationCode::new(authorization_code))
            .request_async(self.http_client)
            .await
            .map_err(AuthError::from)?;

        let access_token = token.access_token().secret().to_string();
        let profile = self
            .http_client
            .get(format!("{}/profile", GMAIL_API_URL))
            .bearer_auth(&access_token)
            .send()
            .await?
            .error_for_status()?
            .json::<GmailProfile>()
            .await?;

        let token_expires_at = token
            .expires_in()
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| Utc::now() + d);

        let account = GmailAccountRepository::new(self.db)
            .upsert(UpsertGmailAccountParams {
                organization_id,
                email: profile.email_address,
                access_token,
                refresh_token: token.refresh_token().map(|t| t.secret().to_string()),
                token_expires_at,
            })
            .await?;

        tracing::info!(
            "Connected Gmail account {} to organization {}",
            account.email,
            organization_id
        );

        Ok(account)
    }
}
