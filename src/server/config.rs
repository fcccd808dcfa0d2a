use crate::server::error::{config::ConfigError, AppError};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Stripe credentials, only present when billing is configured.
#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    pub price_pro: String,
    pub price_business: String,
}

pub struct Config {
    pub database_url: String,
    pub bind_addr: String,

    /// Public base URL of the application without trailing slash
    pub app_url: String,

    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_auth_url: String,
    pub google_token_url: String,
    pub google_redirect_url: String,
    pub gmail_redirect_url: String,

    pub stripe: Option<StripeConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let app_url = required("APP_URL")?.trim_end_matches('/').to_string();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            google_client_id: required("GOOGLE_CLIENT_ID")?,
            google_client_secret: required("GOOGLE_CLIENT_SECRET")?,
            google_auth_url: GOOGLE_AUTH_URL.to_string(),
            google_token_url: GOOGLE_TOKEN_URL.to_string(),
            google_redirect_url: format!("{}/api/auth/callback", app_url),
            gmail_redirect_url: format!("{}/api/gmail/callback", app_url),
            stripe: stripe_from_env(),
            app_url,
        })
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Billing is optional; all four Stripe variables must be set to enable it.
fn stripe_from_env() -> Option<StripeConfig> {
    Some(StripeConfig {
        secret_key: std::env::var("STRIPE_SECRET_KEY").ok()?,
        webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").ok()?,
        price_pro: std::env::var("STRIPE_PRICE_PRO").ok()?,
        price_business: std::env::var("STRIPE_PRICE_BUSINESS").ok()?,
    })
}
