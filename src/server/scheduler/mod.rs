//! Background jobs run by `tokio-cron-scheduler`.
//!
//! Job failures are logged and the job runs again at its next tick.

use tokio_cron_scheduler::JobScheduler;

use crate::server::{error::AppError, state::AppState};

pub mod geo_enrichment;
pub mod gmail_sync;
pub mod scheduled_reports;

/// Registers every job on a new scheduler and starts it.
///
/// # Returns
/// - `Ok(JobScheduler)` - Running scheduler, kept for shutdown
/// - `Err(AppError::SchedulerErr)` - Scheduler could not be created or a cron expression was rejected
pub async fn start_schedulers(state: &AppState) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new().await?;

    scheduler.add(gmail_sync::job(state.clone())?).await?;
    scheduler.add(geo_enrichment::job(state.clone())?).await?;
    scheduler.add(scheduled_reports::job(state.clone())?).await?;

    scheduler.start().await?;

    tracing::info!("Background job scheduler started");

    Ok(scheduler)
}
