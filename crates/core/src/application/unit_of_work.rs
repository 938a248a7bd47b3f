// Unit of work: close a job's transaction on every exit path

use crate::error::Result;
use crate::port::ContestTransaction;
use tracing::warn;

/// Commit on success, roll back on error.
///
/// The original error is returned even when the rollback itself fails; a
/// transaction dropped without either (panic, cancellation) is rolled back by
/// the store adapter.
pub async fn settle<T>(
    tx: Box<dyn ContestTransaction>,
    job: &str,
    outcome: Result<T>,
) -> Result<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(job = job, error = %rollback_err, "Rollback failed");
            }
            Err(e)
        }
    }
}
