//! File logging.
//!
//! The terminal belongs to the UI, so events go to a daily rolling file under
//! the state directory (`~/.local/state/layertype/logs/layertype.log`).
//! Filtering follows `RUST_LOG`, e.g. `RUST_LOG=layertype::typing=debug`.

use crate::app_dirs::AppDirs;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber. Returns the log directory in use, or
/// `None` when no directory could be created (logging is then disabled).
pub fn init() -> Option<PathBuf> {
    let logs_dir = AppDirs::log_dir()?;
    if let Err(e) = std::fs::create_dir_all(&logs_dir) {
        eprintln!("Warning: Could not initialize file logging: {}", e);
        return None;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "layertype.log");

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .ok()?;

    Some(logs_dir)
}
