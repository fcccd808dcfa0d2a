use tokio_cron_scheduler::Job;

use crate::server::{
    error::AppError,
    service::{gmail::GmailService, ingest::IngestService},
    state::AppState,
};

/// Every 15 minutes
const SCHEDULE: &str = "0 */15 * * * *";

/// Builds the job pulling new report mail from every connected mailbox.
pub fn job(state: AppState) -> Result<Job, AppError> {
    let job = Job::new_async(SCHEDULE, move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            if let Err(e) = sync_mailboxes(&state).await {
                tracing::error!("Error syncing Gmail mailboxes: {}", e);
            }
        })
    })?;

    Ok(job)
}

async fn sync_mailboxes(state: &AppState) -> Result<(), AppError> {
    let ingest = IngestService::new(
        &state.db,
        &state.http_client,
        &state.discord_http,
        &state.app_url,
    );

    let synced = GmailService::new(&state.db, &state.http_client, &state.gmail_oauth_client)
        .sync_all(&ingest)
        .await?;

    if synced > 0 {
        tracing::info!("Synced {} Gmail mailboxes", synced);
    }

    Ok(())
}
