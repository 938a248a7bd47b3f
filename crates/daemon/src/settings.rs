//! Daemon settings: optional `contest.toml` plus `CONTEST_*` environment
//! variables, e.g. `CONTEST_SCHEDULER__RUN_ON_START=true`.

use chrono::FixedOffset;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use contest_core::application::constants::{
    DEFAULT_ADMISSION_INTERVAL, DEFAULT_CLOSE_INTERVAL, DEFAULT_COMPETITION_DURATION_MONTHS,
    DEFAULT_CREATE_INTERVAL, DEFAULT_FETCH_MAX_ATTEMPTS, DEFAULT_FETCH_RETRY_BASE_DELAY,
    DEFAULT_REFRESH_INTERVAL, DEFAULT_SHUTDOWN_GRACE,
};
use contest_infra_http::DEFAULT_BASE_URL;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "contest";
const DEFAULT_DATABASE_URL: &str = "sqlite://contest.db";
/// Africa/Tunis, UTC+01:00 all year
const DEFAULT_UTC_OFFSET_MINUTES: i64 = 60;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub log: LogSettings,
    pub contest: ContestSettings,
    pub scheduler: SchedulerSettings,
    pub provider: ProviderSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `pretty` or `json`
    pub format: String,
    /// Directory for daily rolling log files; stdout only when unset
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContestSettings {
    pub utc_offset_minutes: i32,
    pub duration_months: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    pub refresh_interval_secs: u64,
    pub create_interval_secs: u64,
    pub admission_interval_secs: u64,
    pub close_interval_secs: u64,
    pub run_on_start: bool,
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
}

impl Settings {
    /// Load from `$CONTEST_CONFIG` (default `contest.toml`, optional) and the
    /// environment
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONTEST_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        defaults()?
            .add_source(File::with_name(&config_path).required(false))
            .add_source(
                Environment::with_prefix("CONTEST")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn timezone(&self) -> Result<FixedOffset, ConfigError> {
        self.contest
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::Message(format!(
                    "contest.utc_offset_minutes out of range: {}",
                    self.contest.utc_offset_minutes
                ))
            })
    }
}

impl SchedulerSettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn create_interval(&self) -> Duration {
        Duration::from_secs(self.create_interval_secs)
    }

    pub fn admission_interval(&self) -> Duration {
        Duration::from_secs(self.admission_interval_secs)
    }

    pub fn close_interval(&self) -> Duration {
        Duration::from_secs(self.close_interval_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl ProviderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("database.url", DEFAULT_DATABASE_URL)?
        .set_default("log.format", "pretty")?
        .set_default("contest.utc_offset_minutes", DEFAULT_UTC_OFFSET_MINUTES)?
        .set_default(
            "contest.duration_months",
            i64::from(DEFAULT_COMPETITION_DURATION_MONTHS),
        )?
        .set_default(
            "scheduler.refresh_interval_secs",
            DEFAULT_REFRESH_INTERVAL.as_secs(),
        )?
        .set_default(
            "scheduler.create_interval_secs",
            DEFAULT_CREATE_INTERVAL.as_secs(),
        )?
        .set_default(
            "scheduler.admission_interval_secs",
            DEFAULT_ADMISSION_INTERVAL.as_secs(),
        )?
        .set_default(
            "scheduler.close_interval_secs",
            DEFAULT_CLOSE_INTERVAL.as_secs(),
        )?
        .set_default("scheduler.run_on_start", false)?
        .set_default(
            "scheduler.shutdown_grace_secs",
            DEFAULT_SHUTDOWN_GRACE.as_secs(),
        )?
        .set_default("provider.base_url", DEFAULT_BASE_URL)?
        .set_default("provider.timeout_secs", DEFAULT_PROVIDER_TIMEOUT_SECS)?
        .set_default(
            "provider.max_attempts",
            i64::from(DEFAULT_FETCH_MAX_ATTEMPTS),
        )?
        .set_default(
            "provider.retry_base_delay_ms",
            DEFAULT_FETCH_RETRY_BASE_DELAY.as_millis() as u64,
        )
}
