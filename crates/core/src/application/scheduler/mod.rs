//! Job Scheduler - recurring timers for the lifecycle jobs
//!
//! An explicitly owned scheduler: built at startup, jobs registered under
//! stable ids, torn down with `shutdown`.
//! - Registration is idempotent per id
//! - Each job has its own interval loop; a job never overlaps itself
//! - Every run executes on its own task, so an error or panic is logged
//!   and the loop carries on

mod panic_guard;
mod shutdown;

pub use panic_guard::{run_guarded, RunOutcome};
pub use shutdown::{shutdown_channel, ShutdownToken, ShutdownTrigger};

use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

/// A unit of recurring work.
///
/// `tick` must handle its own errors; the scheduler only guards against
/// panics.
#[async_trait]
pub trait ScheduledJob: Send + Sync + 'static {
    async fn tick(&self);
}

struct JobEntry {
    id: String,
    interval: Duration,
    job: Arc<dyn ScheduledJob>,
}

/// Owned recurring-timer registry
pub struct JobScheduler {
    entries: Vec<JobEntry>,
    handles: Vec<(String, JoinHandle<()>)>,
    trigger: ShutdownTrigger,
    run_on_start: bool,
    started: bool,
}

impl Default for JobScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl JobScheduler {
    pub fn new() -> Self {
        let (trigger, _token) = shutdown_channel();
        Self {
            entries: Vec::new(),
            handles: Vec::new(),
            trigger,
            run_on_start: false,
            started: false,
        }
    }

    /// Fire each job immediately on start instead of after one interval
    pub fn with_run_on_start(mut self, run_on_start: bool) -> Self {
        self.run_on_start = run_on_start;
        self
    }

    /// Register `job` under `id`.
    ///
    /// Returns `Ok(false)` without touching anything when `id` is already
    /// registered. Jobs registered after `start` begin running immediately.
    ///
    /// # Errors
    /// - AppError::Config if `interval` is zero
    pub fn register(
        &mut self,
        id: impl Into<String>,
        interval: Duration,
        job: Arc<dyn ScheduledJob>,
    ) -> Result<bool> {
        let id = id.into();
        if self.is_registered(&id) {
            info!(job = %id, "Job already registered, skipping");
            return Ok(false);
        }
        if interval.is_zero() {
            return Err(AppError::Config(format!(
                "job {} needs a non-zero interval",
                id
            )));
        }

        info!(job = %id, interval_secs = interval.as_secs(), "Job registered");
        self.entries.push(JobEntry { id, interval, job });

        if self.started {
            if let Some(entry) = self.entries.last() {
                let handle = self.spawn_loop(entry);
                self.handles.push((entry.id.clone(), handle));
            }
        }
        Ok(true)
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn job_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.id.as_str()).collect()
    }

    pub fn is_running(&self) -> bool {
        self.started
    }

    /// Spawn one timer loop per registered job; no-op when already started
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let handles: Vec<(String, JoinHandle<()>)> = self
            .entries
            .iter()
            .map(|entry| (entry.id.clone(), self.spawn_loop(entry)))
            .collect();
        self.handles.extend(handles);

        info!(jobs = self.entries.len(), "Scheduler started");
    }

    /// Stop every loop and wait up to `grace` per in-flight run
    pub async fn shutdown(self, grace: Duration) {
        info!("Scheduler shutting down...");
        self.trigger.shutdown();

        for (id, mut handle) in self.handles {
            match tokio::time::timeout(grace, &mut handle).await {
                Ok(_) => {}
                Err(_) => {
                    warn!(job = %id, "Job still running after grace period, aborting");
                    handle.abort();
                    // Aborting the loop also cancels its in-flight run
                    let _ = handle.await;
                }
            }
        }

        info!("Scheduler stopped");
    }

    fn spawn_loop(&self, entry: &JobEntry) -> JoinHandle<()> {
        let id = entry.id.clone();
        let period = entry.interval;
        let job = entry.job.clone();
        let first_tick = if self.run_on_start {
            Instant::now()
        } else {
            Instant::now() + period
        };
        let shutdown = self.trigger.token();

        tokio::spawn(run_loop(id, period, first_tick, job, shutdown))
    }
}

async fn run_loop(
    id: String,
    period: Duration,
    first_tick: Instant,
    job: Arc<dyn ScheduledJob>,
    mut shutdown: ShutdownToken,
) {
    let mut ticker = interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {},
            _ = shutdown.wait() => break,
        }
        if shutdown.is_shutdown() {
            break;
        }
        run_guarded(&id, job.clone()).await;
    }

    info!(job = %id, "Job loop stopped");
}
