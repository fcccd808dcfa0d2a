use oauth2::{AuthorizationCode, TokenResponse};
use serde::Deserialize;

use crate::server::{
    data::user::UserRepository,
    error::{auth::AuthError, AppError},
    model::user::{UpsertUserParams, User},
    service::auth::{GoogleAuthService, GOOGLE_USERINFO_URL},
};

/// Subset of the OpenID Connect userinfo response.
#[derive(Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

impl<'a> GoogleAuthService<'a> {
    /// Exchanges the authorization code and upserts the signed-in user.
    ///
    /// # Arguments
    /// - `authorization_code` - Code returned by Google to the callback
    ///
    /// # Returns
    /// - `Ok(User)` - Created or refreshed user
    /// - `Err(AuthError::TokenExchange)` - Code exchange rejected by Google
    /// - `Err(AppError::ReqwestErr)` - Userinfo request failed
    pub async fn callback(&self, authorization_code: String) -> Result<User, AppError> {
        let user_repo = UserRepository::new(self.db);

        let token = self
            .oauth_client
            .exchange_code(AuthorizationCode::new(authorization_code))
            .request_async(self.http_client)
            .await
            .map_err(AuthError::from)?;

        let info = self.fetch_google_user(token.access_token().secret()).await?;

        let user = user_repo
            .upsert(UpsertUserParams {
                name: info.name.unwrap_or_else(|| info.email.clone()),
                google_id: info.sub,
                email: info.email,
                avatar_url: info.picture,
            })
            .await?;

        Ok(user)
    }

    /// Retrieves the Google account's profile using the provided access token
    async fn fetch_google_user(&self, access_token: &str) -> Result<GoogleUserInfo, AppError> {
        let info = self
            .http_client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json::<GoogleUserInfo>()
            .await?;

        Ok(info)
    }
}
