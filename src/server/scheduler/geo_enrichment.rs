use tokio_cron_scheduler::Job;

use crate::server::{error::AppError, service::source::SourceService, state::AppState};

/// Every 5 minutes
const SCHEDULE: &str = "0 */5 * * * *";

/// Builds the job geolocating sources that were never checked.
pub fn job(state: AppState) -> Result<Job, AppError> {
    let job = Job::new_async(SCHEDULE, move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            match SourceService::new(&state.db)
                .enrich_pending(&state.http_client)
                .await
            {
                Ok(0) => {}
                Ok(count) => tracing::info!("Enriched {} sending sources", count),
                Err(e) => tracing::error!("Error enriching sending sources: {}", e),
            }
        })
    })?;

    Ok(job)
}
