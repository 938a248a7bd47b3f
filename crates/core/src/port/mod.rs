// Port Layer - Interfaces for external dependencies

pub mod config_store;
pub mod metrics_provider;
pub mod time_provider; // For deterministic testing
pub mod transaction;

// Re-exports
pub use config_store::{ConfigStore, ACCESS_TOKEN_KEY};
pub use metrics_provider::{MetricsError, MetricsProvider, VideoMetrics};
pub use time_provider::{SystemTimeProvider, TimeProvider};
pub use transaction::{ContestStore, ContestTransaction, Transaction};
