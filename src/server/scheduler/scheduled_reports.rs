use tokio_cron_scheduler::Job;

use crate::server::{
    error::AppError, service::scheduled_report::ScheduledReportService, state::AppState,
};

/// Top of every hour
const SCHEDULE: &str = "0 0 * * * *";

/// Builds the job posting due summaries to their webhooks.
pub fn job(state: AppState) -> Result<Job, AppError> {
    let job = Job::new_async(SCHEDULE, move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            match ScheduledReportService::new(&state.db)
                .send_due(&state.http_client, &state.discord_http, &state.app_url)
                .await
            {
                Ok(0) => {}
                Ok(count) => tracing::info!("Sent {} scheduled reports", count),
                Err(e) => tracing::error!("Error sending scheduled reports: {}", e),
            }
        })
    })?;

    Ok(job)
}
