//! Wedding Contest Engine - Main Entry Point
//! Wires the SQLite store, the Graph API provider and the four lifecycle jobs
//! into one scheduler.

mod logging;
mod settings;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use contest_core::application::constants::{
    ADMIT_PARTICIPANTS_JOB, CLOSE_COMPETITIONS_JOB, CREATE_COMPETITION_JOB, REFRESH_METRICS_JOB,
};
use contest_core::application::{
    AdmissionService, BackoffPolicy, CompetitionCloser, CompetitionCreator, JobScheduler,
    MetricsRefreshJob, ParticipantRefresher, RetryingMetricsProvider,
};
use contest_core::port::{ConfigStore, SystemTimeProvider, ACCESS_TOKEN_KEY};
use contest_infra_http::GraphMetricsProvider;
use contest_infra_sqlite::{create_pool, run_migrations, SqliteConfigStore, SqliteContestStore};
use settings::Settings;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let settings = Settings::load().context("Failed to load settings")?;

    // 2. Initialize logging
    let _log_guard = logging::init(&settings.log).context("Failed to initialize logging")?;
    info!("Contest Engine v{} starting...", VERSION);

    let timezone = settings.timezone()?;

    // 3. Initialize database
    info!(database_url = %settings.database.url, "Initializing database...");
    let pool = create_pool(&settings.database.url)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Read the provider credential once
    let config_store = SqliteConfigStore::new(pool.clone());
    let credential = config_store
        .get(ACCESS_TOKEN_KEY)
        .await
        .map_err(|e| anyhow::anyhow!("Reading config failed: {}", e))?;
    if credential.is_none() {
        warn!(
            key = ACCESS_TOKEN_KEY,
            "No access token configured, metrics refresh will fail until one is set"
        );
    }

    // 5. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider::new(timezone));
    let store = Arc::new(SqliteContestStore::new(pool.clone()));

    let graph = GraphMetricsProvider::new(
        settings.provider.base_url.clone(),
        settings.provider.timeout(),
    )
    .context("HTTP client creation failed")?;
    let provider = Arc::new(RetryingMetricsProvider::new(
        Arc::new(graph),
        BackoffPolicy::new(
            settings.provider.max_attempts,
            settings.provider.retry_base_delay(),
        ),
    ));
    let refresher = Arc::new(ParticipantRefresher::new(provider, credential));

    let creator = CompetitionCreator::new(store.clone(), time_provider.clone())
        .with_duration_months(settings.contest.duration_months);
    let admission = AdmissionService::new(store.clone(), time_provider.clone());
    let refresh = MetricsRefreshJob::new(store.clone(), time_provider.clone(), refresher.clone());
    let closer = CompetitionCloser::new(store.clone(), time_provider.clone(), refresher);

    // 6. Register lifecycle jobs
    let intervals = &settings.scheduler;
    let mut scheduler = JobScheduler::new().with_run_on_start(intervals.run_on_start);
    scheduler.register(
        REFRESH_METRICS_JOB,
        intervals.refresh_interval(),
        Arc::new(refresh),
    )?;
    scheduler.register(
        CREATE_COMPETITION_JOB,
        intervals.create_interval(),
        Arc::new(creator),
    )?;
    scheduler.register(
        ADMIT_PARTICIPANTS_JOB,
        intervals.admission_interval(),
        Arc::new(admission),
    )?;
    scheduler.register(
        CLOSE_COMPETITIONS_JOB,
        intervals.close_interval(),
        Arc::new(closer),
    )?;

    scheduler.start();
    info!(jobs = ?scheduler.job_ids(), "System ready");
    info!("Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown
    scheduler.shutdown(intervals.shutdown_grace()).await;
    pool.close().await;

    info!("Shutdown complete.");
    Ok(())
}
