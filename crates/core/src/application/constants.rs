// Lifecycle constants (no magic values)
use std::time::Duration;

/// Scheduler id of the metrics refresh job
pub const REFRESH_METRICS_JOB: &str = "refresh_metrics";

/// Scheduler id of the competition creator job
pub const CREATE_COMPETITION_JOB: &str = "create_competition";

/// Scheduler id of the admission job
pub const ADMIT_PARTICIPANTS_JOB: &str = "admit_participants";

/// Scheduler id of the closer job
pub const CLOSE_COMPETITIONS_JOB: &str = "close_competitions";

/// Metrics refresh cadence (15 minutes)
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Competition creation cadence (24 hours)
pub const DEFAULT_CREATE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Admission cadence (5 minutes)
pub const DEFAULT_ADMISSION_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Closing cadence (60 minutes)
pub const DEFAULT_CLOSE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Registration phase length in months; the scoring phase has the same length
pub const DEFAULT_COMPETITION_DURATION_MONTHS: u32 = 1;

/// Attempts per provider call, first call included
pub const DEFAULT_FETCH_MAX_ATTEMPTS: u32 = 3;

/// Base delay of the provider retry backoff (1s)
pub const DEFAULT_FETCH_RETRY_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Backoff multiplier between provider retries
pub const DEFAULT_FETCH_BACKOFF_FACTOR: f64 = 2.0;

/// How long shutdown waits for an in-flight job run (30s)
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);
