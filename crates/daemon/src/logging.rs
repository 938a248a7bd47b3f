// Tracing subscriber setup

use crate::settings::LogSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "contest=info";
const LOG_FILE_PREFIX: &str = "contest-engine.log";

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must live until
/// shutdown.
pub fn init(settings: &LogSettings) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let json = settings.format == "json";
    let stdout_layer = if json {
        // Production: JSON structured logging
        fmt::layer().json().boxed()
    } else {
        // Development: Pretty formatting with colors
        fmt::layer().pretty().boxed()
    };

    let (file_layer, guard) = match &settings.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
