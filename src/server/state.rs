//! Shared handles cloned into every handler and scheduled job.

use oauth2::basic::{BasicErrorResponseType, BasicTokenType};
use oauth2::{
    Client, EmptyExtraTokenFields, EndpointNotSet, EndpointSet, RevocationErrorResponseType,
    StandardErrorResponse, StandardRevocableToken, StandardTokenIntrospectionResponse,
    StandardTokenResponse,
};
use sea_orm::DatabaseConnection;
use serenity::http::Http;
use std::sync::Arc;

use crate::server::config::StripeConfig;

/// Type alias for the OAuth2 client configured against Google's endpoints.
pub(crate) type OAuth2Client = Client<
    StandardErrorResponse<BasicErrorResponseType>,
    StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardTokenIntrospectionResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardRevocableToken,
    StandardErrorResponse<RevocationErrorResponseType>,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Handles shared by handlers and jobs; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,

    /// Shared client for Google, Stripe, Gemini, DNS-over-HTTPS and webhooks.
    /// Does not follow redirects.
    pub http_client: reqwest::Client,

    /// OAuth2 client for the Google sign-in flow.
    pub oauth_client: OAuth2Client,

    /// OAuth2 client for connecting Gmail mailboxes.
    ///
    /// Same Google application as `oauth_client` but redirects to the Gmail
    /// callback and requests the read-only mailbox scope.
    pub gmail_oauth_client: OAuth2Client,

    /// Discord HTTP client used to execute webhooks.
    ///
    /// Created without a bot token; webhook execution authenticates through
    /// the token embedded in the webhook URL.
    pub discord_http: Arc<Http>,

    /// Application base URL for generating links.
    pub app_url: String,

    /// Stripe credentials, `None` when billing is not configured.
    pub stripe: Option<StripeConfig>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        http_client: reqwest::Client,
        oauth_client: OAuth2Client,
        gmail_oauth_client: OAuth2Client,
        discord_http: Arc<Http>,
        app_url: String,
        stripe: Option<StripeConfig>,
    ) -> Self {
        Self {
            db,
            http_client,
            oauth_client,
            gmail_oauth_client,
            discord_http,
            app_url,
            stripe,
        }
    }
}
