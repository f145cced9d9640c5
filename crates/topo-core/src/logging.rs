//! Logging initialization using the `tracing` ecosystem.
//!
//! Provides:
//! - Console output (colored, human-readable)
//! - File output (daily rotation via `tracing-appender`), as plain text or
//!   one JSON object per line
//! - Configurable log level via env var `RUST_LOG` or explicit parameter

use serde::Deserialize;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Line format of the rolling log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    /// Newline-delimited JSON with `fields.message`, level and target.
    Json,
}

/// Initialize the global tracing subscriber.
///
/// Should be called once at program start. A second call keeps the
/// subscriber already installed and logs a warning through it.
///
/// # Parameters
///
/// - `log_level`: default level if `RUST_LOG` env var is not set (e.g. `"info"`)
/// - `log_dir`: optional directory for daily-rotating log files
/// - `module_name`: used as the log file prefix (e.g. `"topo"`)
/// - `format`: line format of the file output; the console is always text
pub fn init_logging(
    log_level: &str,
    log_dir: Option<&str>,
    module_name: &str,
    format: LogFormat,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let console_layer = fmt::layer().with_target(true).with_thread_ids(true).with_ansi(true);

    let file_layer = log_dir.map(|dir| {
        let file_appender = tracing_appender::rolling::daily(dir, module_name);
        match format {
            LogFormat::Text => fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(file_appender)
                .with_current_span(false)
                .with_target(true)
                .with_thread_ids(true)
                .boxed(),
        }
    });

    let installed = tracing_subscriber::registry().with(env_filter).with(console_layer).with(file_layer).try_init();
    if let Err(e) = installed {
        tracing::warn!("logging already initialized, keeping the existing subscriber: {e}");
    }
    Ok(())
}
