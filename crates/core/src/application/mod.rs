// Application Layer - Lifecycle jobs and their plumbing

pub mod admission;
pub mod closer;
pub mod constants;
pub mod creator;
pub mod refresh;
pub mod retry;
pub mod scheduler;
pub mod unit_of_work;

// Re-exports
pub use admission::{AdmissionReport, AdmissionService};
pub use closer::CompetitionCloser;
pub use creator::CompetitionCreator;
pub use refresh::{FetchedMetrics, MetricsRefreshJob, ParticipantRefresher, RefreshReport};
pub use retry::{BackoffPolicy, RetryingMetricsProvider};
pub use scheduler::{JobScheduler, ScheduledJob};
