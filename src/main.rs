mod model;
mod server;

use std::{net::SocketAddr, sync::Arc};

use serenity::http::Http;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::server::{
    config::Config, error::AppError, router, scheduler, startup, state::AppState,
};

/// Log filter applied when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "dmarc_analyser=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env()?;

    let db = startup::connect_to_database(&config).await?;
    let session = startup::connect_to_session(&db, &config).await?;
    let http_client = startup::setup_reqwest_client()?;
    let oauth_client = startup::setup_oauth_client(&config, &config.google_redirect_url)?;
    let gmail_oauth_client = startup::setup_oauth_client(&config, &config.gmail_redirect_url)?;

    startup::seed_known_senders(&db).await?;
    startup::reset_interrupted_gmail_syncs(&db).await?;

    // Webhook execution authenticates with the token in the webhook URL
    let discord_http = Arc::new(Http::new(""));

    let state = AppState::new(
        db,
        http_client,
        oauth_client,
        gmail_oauth_client,
        discord_http,
        config.app_url.clone(),
        config.stripe.clone(),
    );

    if state.stripe.is_none() {
        tracing::warn!("Stripe is not configured, billing endpoints are disabled");
    }

    let mut job_scheduler = scheduler::start_schedulers(&state).await?;

    let app = router::router(&config.app_url)?
        .with_state(state)
        .layer(session);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    job_scheduler.shutdown().await?;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }

        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
