//! Tracing setup for both binaries.
//!
//! Stdout carries the MCP stdio transport, so records go to rotating files
//! under the configured log directory and only errors reach stderr:
//! - `mql5_docs.<date>.json.log`: every record as one JSON object per line
//! - `mql5_docs.<date>.text.log`: the same records as plain text
//! - `errors.<date>.log`: ERROR records only

use crate::config::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const LOG_FILE_PREFIX: &str = "mql5_docs";
pub const JSON_LOG_SUFFIX: &str = "json.log";
pub const TEXT_LOG_SUFFIX: &str = "text.log";
pub const ERROR_LOG_PREFIX: &str = "errors";
pub const ERROR_LOG_SUFFIX: &str = "log";

const MAX_LOG_FILES: usize = 5;
const MAX_ERROR_LOG_FILES: usize = 10;

fn rolling(dir: &Path, prefix: &str, suffix: &str, keep: usize) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix(suffix)
        .max_log_files(keep)
        .build(dir)
        .with_context(|| format!("failed to open {}.*.{} in {:?}", prefix, suffix, dir))
}

/// Build the subscriber without installing it
pub fn subscriber(config: &Config) -> Result<impl Subscriber + Send + Sync + 'static> {
    fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("failed to create log directory {:?}", config.log_dir))?;

    let json_file = rolling(&config.log_dir, LOG_FILE_PREFIX, JSON_LOG_SUFFIX, MAX_LOG_FILES)?;
    let text_file = rolling(&config.log_dir, LOG_FILE_PREFIX, TEXT_LOG_SUFFIX, MAX_LOG_FILES)?;
    let error_file = rolling(
        &config.log_dir,
        ERROR_LOG_PREFIX,
        ERROR_LOG_SUFFIX,
        MAX_ERROR_LOG_FILES,
    )?;

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_target(true)
        .with_ansi(false)
        .with_writer(json_file);

    let text_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(text_file);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(error_file)
        .with_filter(LevelFilter::ERROR);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(LevelFilter::ERROR);

    Ok(tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(json_layer)
        .with(text_layer)
        .with(error_layer)
        .with(stderr_layer))
}

/// Install the global subscriber. Calling it again after a subscriber is set is a no-op.
pub fn init(config: &Config) -> Result<()> {
    let initialized = subscriber(config)?.try_init().is_ok();

    if initialized {
        tracing::info!(log_dir = %config.log_dir.display(), "Logging initialized");
    }
    Ok(())
}
