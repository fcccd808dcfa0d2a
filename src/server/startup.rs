use oauth2::{basic::BasicClient, AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl};
use sea_orm::DatabaseConnection;
use time::Duration;
use tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::server::{
    config::Config,
    data::gmail_account::GmailAccountRepository,
    error::{config::ConfigError, AppError},
    service::known_sender::KnownSenderService,
    state::OAuth2Client,
};

/// Connects to the Sqlite database and runs pending migrations.
///
/// Establishes a connection pool to the Sqlite database using the connection string from
/// configuration, then automatically runs all pending SeaORM migrations to ensure the database
/// schema is up-to-date. This function must complete successfully before the application can
/// access the database.
///
/// # Arguments
/// - `config` - Application configuration containing the database URL
///
/// # Returns
/// - `Ok(DatabaseConnection)` - Connected database with migrations applied
/// - `Err(Error)` - Failed to connect to database or run migrations
pub async fn connect_to_database(config: &Config) -> Result<DatabaseConnection, AppError> {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.sqlx_logging(false);

    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Creates the session layer backed by the application database.
///
/// Sessions are stored in the same SQLite pool as application data and expire
/// after 7 days of inactivity. Cookies are only marked secure when the
/// application is served over HTTPS.
///
/// # Arguments
/// - `db` - Database connection whose pool hosts the session table
/// - `config` - Application configuration, used to detect HTTPS
///
/// # Returns
/// - `Ok(SessionManagerLayer)` - Layer ready to be applied to the router
/// - `Err(AppError::DbErr)` - Failed to create the session table
pub async fn connect_to_session(
    db: &DatabaseConnection,
    config: &Config,
) -> Result<SessionManagerLayer<SqliteStore>, AppError> {
    let pool = db.get_sqlite_connection_pool();
    let session_store = SqliteStore::new(pool.clone());

    session_store
        .migrate()
        .await
        .map_err(|e| sea_orm::DbErr::Custom(e.to_string()))?;

    let session = SessionManagerLayer::new(session_store)
        .with_secure(config.app_url.starts_with("https://"))
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(7)));

    Ok(session)
}

/// Builds the shared HTTP client.
///
/// Redirects are disabled so that user-supplied URLs (webhooks) cannot be
/// bounced to internal addresses.
pub fn setup_reqwest_client() -> Result<reqwest::Client, AppError> {
    let client = reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(std::time::Duration::from_secs(30))
        .user_agent(concat!("dmarc-analyser/", env!("CARGO_PKG_VERSION")))
        .build()?;

    Ok(client)
}

/// Builds a Google OAuth2 client redirecting to `redirect_url`.
///
/// # Arguments
/// - `config` - Application configuration holding Google credentials and endpoints
/// - `redirect_url` - Callback URL registered with Google
///
/// # Returns
/// - `Ok(OAuth2Client)` - Configured client
/// - `Err(ConfigError::InvalidEnvVar)` - One of the URLs failed to parse
pub fn setup_oauth_client(config: &Config, redirect_url: &str) -> Result<OAuth2Client, AppError> {
    let invalid = |name: &str, e: url::ParseError| ConfigError::InvalidEnvVar {
        name: name.to_string(),
        reason: e.to_string(),
    };

    let client = BasicClient::new(ClientId::new(config.google_client_id.clone()))
        .set_client_secret(ClientSecret::new(config.google_client_secret.clone()))
        .set_auth_uri(
            AuthUrl::new(config.google_auth_url.clone()).map_err(|e| invalid("google_auth_url", e))?,
        )
        .set_token_uri(
            TokenUrl::new(config.google_token_url.clone())
                .map_err(|e| invalid("google_token_url", e))?,
        )
        .set_redirect_uri(
            RedirectUrl::new(redirect_url.to_string()).map_err(|e| invalid("APP_URL", e))?,
        );

    Ok(client)
}

/// Inserts the built-in known senders that are missing from the database.
pub async fn seed_known_senders(db: &DatabaseConnection) -> Result<(), AppError> {
    let inserted = KnownSenderService::new(db).seed_defaults().await?;

    if inserted > 0 {
        tracing::info!("Seeded {} built-in known senders", inserted);
    }

    Ok(())
}

/// Returns Gmail accounts left syncing by a previous run to idle so the sync
/// job picks them up again.
pub async fn reset_interrupted_gmail_syncs(db: &DatabaseConnection) -> Result<(), AppError> {
    let reset = GmailAccountRepository::new(db)
        .reset_interrupted_syncs()
        .await?;

    if reset > 0 {
        tracing::warn!("Reset {} Gmail accounts interrupted while syncing", reset);
    }

    Ok(())
}
