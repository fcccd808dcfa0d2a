//! Organization API keys for machine report ingestion.

use rand::{distr::Alphanumeric, Rng};
use sea_orm::DatabaseConnection;
use sha2::{Digest, Sha256};

use crate::server::{
    data::api_key::ApiKeyRepository,
    error::{auth::AuthError, AppError},
    model::api_key::{ApiKey, CreateApiKeyParams},
};

const KEY_PREFIX: &str = "dmarc_";
const KEY_RANDOM_LENGTH: usize = 40;
const DISPLAY_PREFIX_LENGTH: usize = 12;
const MAX_NAME_LENGTH: usize = 100;

pub struct ApiKeyService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ApiKeyService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a key for an organization.
    ///
    /// Only the SHA-256 hash of the key is stored, the plaintext is returned
    /// once and cannot be retrieved again.
    ///
    /// # Returns
    /// - `Ok((ApiKey, String))` - Stored key and its plaintext value
    /// - `Err(AppError::BadRequest)` - Empty or overly long name
    pub async fn create(
        &self,
        organization_id: i32,
        created_by: i32,
        name: &str,
    ) -> Result<(ApiKey, String), AppError> {
        let name = name.trim();
        if name.is_empty() || name.len() > MAX_NAME_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Key name must be between 1 and {} characters",
                MAX_NAME_LENGTH
            )));
        }

        let key = generate_key();
        let api_key = ApiKeyRepository::new(self.db)
            .create(CreateApiKeyParams {
                organization_id,
                name: name.to_string(),
                prefix: key[..DISPLAY_PREFIX_LENGTH].to_string(),
                key_hash: hash_key(&key),
                created_by,
            })
            .await?;

        tracing::info!(
            "User {} created API key {} for organization {}",
            created_by,
            api_key.id,
            organization_id
        );

        Ok((api_key, key))
    }

    pub async fn list(&self, organization_id: i32) -> Result<Vec<ApiKey>, AppError> {
        Ok(ApiKeyRepository::new(self.db)
            .list_by_organization(organization_id)
            .await?)
    }

    pub async fn revoke(&self, organization_id: i32, id: i32) -> Result<bool, AppError> {
        let revoked = ApiKeyRepository::new(self.db)
            .revoke(organization_id, id)
            .await?;
        if revoked {
            tracing::info!("Revoked API key {} of organization {}", id, organization_id);
        }

        Ok(revoked)
    }

    /// Resolves a plaintext key to an active stored key and stamps its last use.
    ///
    /// # Returns
    /// - `Ok(ApiKey)` - Key exists and is not revoked
    /// - `Err(AuthError::InvalidApiKey)` - Malformed, unknown or revoked key
    pub async fn authenticate(&self, key: &str) -> Result<ApiKey, AppError> {
        if !key.starts_with(KEY_PREFIX) {
            return Err(AuthError::InvalidApiKey.into());
        }

        let repo = ApiKeyRepository::new(self.db);
        let api_key = repo
            .find_active_by_hash(&hash_key(key))
            .await?
            .ok_or(AuthError::InvalidApiKey)?;

        repo.touch(api_key.id).await?;

        Ok(api_key)
    }
}

/// Generates `dmarc_` followed by 40 random alphanumerics.
pub fn generate_key() -> String {
    let random: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_RANDOM_LENGTH)
        .map(char::from)
        .collect();
    format!("{}{}", KEY_PREFIX, random)
}

/// Lowercase hex SHA-256 of a key.
pub fn hash_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_prefixed_keys() {
        let key = generate_key();

        assert!(key.starts_with("dmarc_"));
        assert_eq!(key.len(), 46);
        assert!(key[6..].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(key, generate_key());
    }

    /// Expected: SHA-256 of "abc" as lowercase hex
    #[test]
    fn hashes_key() {
        assert_eq!(
            hash_key("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
