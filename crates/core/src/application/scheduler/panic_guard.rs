// Failure isolation for scheduled runs
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::AbortHandle;
use tracing::{debug, error};

use super::ScheduledJob;

/// Result of one guarded run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Run completed (errors are handled inside the job)
    Completed,
    /// Run panicked
    Panicked(String),
    /// Run task was cancelled before finishing
    Cancelled,
}

/// Aborts the run task when the awaiting future is dropped
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Execute one run of `job` on its own task.
///
/// A panic inside the job is caught at the task boundary and reported as
/// `RunOutcome::Panicked`, so the calling loop keeps its schedule. Dropping
/// the returned future (e.g. when the scheduler aborts its loop) cancels the
/// run as well.
pub async fn run_guarded(job_id: &str, job: Arc<dyn ScheduledJob>) -> RunOutcome {
    let started = Instant::now();
    let handle = tokio::spawn(async move { job.tick().await });
    let _abort = AbortOnDrop(handle.abort_handle());

    match handle.await {
        Ok(()) => {
            debug!(
                job = job_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Job run finished"
            );
            RunOutcome::Completed
        }
        Err(join_err) if join_err.is_panic() => {
            let panic_msg = panic_message(join_err.into_panic());
            error!(job = job_id, panic_msg = %panic_msg, "Job run panicked");
            RunOutcome::Panicked(panic_msg)
        }
        Err(join_err) => {
            error!(job = job_id, error = %join_err, "Job run cancelled");
            RunOutcome::Cancelled
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
