//! Structured logging setup.
//!
//! The trader only emits `tracing` events; installing a subscriber is left to
//! the host. `init_logging` is a convenience for hosts that have none.
//!
//! # Component Targets
//!
//! | Target | Description |
//! |--------|-------------|
//! | `tick_trader::trader` | Tick lifecycle |
//! | `tick_trader::trader::history` | History store appends and gaps |
//! | `tick_trader::trader::estimator` | Intervals, hedge ratios, trend signals |
//! | `tick_trader::trader::execution` | Emitted orders |
//! | `tick_trader::trader::strategy` | Regime dispatch and skips |
//!
//! ```bash
//! # Only order flow
//! RUST_LOG=warn,tick_trader::trader::execution=debug
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::prelude::{Error, Result};

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable format (default for development)
    #[default]
    Pretty,
    /// JSON format (best for log aggregation)
    Json,
    /// Compact single-line format
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Format for stdout logging
    #[serde(default)]
    pub stdout_format: LogFormat,

    /// Directory for a daily-rotated JSON log file (disabled when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            stdout_format: LogFormat::default(),
            log_dir: None,
        }
    }
}

impl LogConfig {
    /// JSON stdout plus rotated files under `log_dir`.
    pub fn production(log_dir: PathBuf) -> Self {
        Self {
            stdout_format: LogFormat::Json,
            log_dir: Some(log_dir),
            ..Default::default()
        }
    }

    /// Resolve the filter: explicit override, then `RUST_LOG`, then `level`.
    fn env_filter(&self, env_filter_override: Option<&str>) -> EnvFilter {
        match env_filter_override {
            Some(filter) => EnvFilter::new(filter),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level)),
        }
    }
}

/// Install a global subscriber.
///
/// Returns the `WorkerGuard`s of any file writers; keep them alive for the
/// lifetime of the process or buffered lines are lost.
pub fn init_logging(
    config: &LogConfig,
    env_filter_override: Option<&str>,
) -> Result<Vec<WorkerGuard>> {
    let mut guards = Vec::new();
    let filter = config.env_filter(env_filter_override);

    let stdout_layer = match config.stdout_format {
        LogFormat::Json => fmt::layer().json().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
        LogFormat::Pretty => fmt::layer().with_target(false).boxed(),
    };

    let file_layer = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|e| Error::Logging(format!("{}: {}", dir.display(), e)))?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "tick-trader.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);
            Some(fmt::layer().with_writer(writer).with_ansi(false).json())
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    Ok(guards)
}
