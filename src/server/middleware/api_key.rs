use axum::http::{header::AUTHORIZATION, HeaderMap};
use sea_orm::DatabaseConnection;

use crate::server::{
    error::{auth::AuthError, AppError},
    model::api_key::ApiKey,
    service::api_key::ApiKeyService,
};

/// Authenticates machine clients by `Authorization: Bearer <key>`.
pub struct ApiKeyGuard<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ApiKeyGuard<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// # Returns
    /// - `Ok(ApiKey)` - Active key, its `last_used_at` updated
    /// - `Err(AuthError::InvalidApiKey)` - Header missing or key unknown or revoked
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<ApiKey, AppError> {
        let key = bearer_token(headers).ok_or(AuthError::InvalidApiKey)?;

        ApiKeyService::new(self.db).authenticate(key).await
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer dmarc_abc")), Some("dmarc_abc"));
        assert_eq!(bearer_token(&headers("bearer  dmarc_abc ")), Some("dmarc_abc"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
