#![warn(missing_docs)]
//! # dashprint-app
//!
//! ## Purpose
//! Host-side policy for the Print Dashboard desktop shell: configuration,
//! per-run logging, window and lifecycle rules, and About metadata.
//!
//! ## Responsibilities
//! - Load [`ShellConfig`] from environment variables with safe defaults.
//! - Install the per-run file logger behind the `log` facade.
//! - Describe the primary window and the remote origin allowed to reach the
//!   bridge commands.
//! - Decide quit/re-create behaviour for the platform lifecycle.
//!
//! ## Data flow
//! Environment -> [`ShellConfig`] -> binary wires the bridge, dispatcher and
//! update controller -> primary window loads the dashboard URL.
//!
//! ## Ownership and lifetimes
//! Configuration is read once at startup and handed out by value. The run
//! logger lives in a process-wide `OnceLock` for the lifetime of the process.
//!
//! ## Error model
//! Configuration and startup failures are wrapped in [`AppError`]; the binary
//! logs them and exits non-zero.
//!
//! ## Security and privacy notes
//! - The dashboard and update feed URLs must use HTTPS.
//! - Only the dashboard origin is granted the three bridge commands.

mod config;
mod logging;

use dashprint_ui::AboutInfo;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;

pub use config::{ConfigError, DEFAULT_DASHBOARD_URL, ShellConfig, parse_flag};
pub use logging::{RunLogger, default_log_dir, format_line, install_run_logger};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("DASHPRINT_VERSION");

/// Unix seconds at which the binary was built.
pub const BUILD_UNIX_SECONDS: &str = env!("DASHPRINT_BUILD_UNIX");

/// Product name shown in the title bar and the About dialog.
pub const PRODUCT_NAME: &str = "Print Dashboard";

/// Label of the primary window.
pub const MAIN_WINDOW_LABEL: &str = "main";

/// Primary window inner width in logical pixels.
pub const WINDOW_WIDTH: f64 = 1000.0;

/// Primary window inner height in logical pixels.
pub const WINDOW_HEIGHT: f64 = 800.0;

/// Identifier of the runtime capability granting the bridge commands.
pub const BRIDGE_CAPABILITY_ID: &str = "dashboard-bridge";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Returns the build time as RFC 3339, or the raw seconds when unparsable.
pub fn build_timestamp() -> String {
    BUILD_UNIX_SECONDS
        .parse::<i64>()
        .ok()
        .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
        .and_then(|moment| moment.format(&Rfc3339).ok())
        .unwrap_or_else(|| BUILD_UNIX_SECONDS.to_string())
}

/// Package metadata shown by Help -> About.
pub fn about_info() -> AboutInfo {
    AboutInfo {
        name: PRODUCT_NAME.to_string(),
        version: APP_VERSION.to_string(),
        author: env!("CARGO_PKG_AUTHORS").replace(':', ", "),
        description: env!("CARGO_PKG_DESCRIPTION").to_string(),
    }
}

/// Remote URL pattern matching every page under the dashboard origin.
pub fn bridge_origin_pattern(dashboard: &Url) -> String {
    format!("{}/*", dashboard.origin().ascii_serialization())
}

/// Whether the process stays alive after its last window closes.
///
/// Only macOS keeps running so the dock icon can re-open the window.
pub fn keep_running_without_windows(is_macos: bool) -> bool {
    is_macos
}

/// Whether an app re-activation should create a fresh primary window.
pub fn should_recreate_primary(has_visible_windows: bool, primary_alive: bool) -> bool {
    !has_visible_windows && !primary_alive
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Environment configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Run log file could not be created.
    #[error("log file '{path}' could not be created: {source}")]
    LogFile {
        /// Attempted log file path.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A logger was already installed for this process.
    #[error("a logger is already installed")]
    LoggerInstalled,
    /// Print dispatcher could not be started.
    #[error("print dispatcher error: {0}")]
    Print(#[from] dashprint_print::PrintError),
    /// Desktop runtime failed to build or create a window.
    #[error("desktop runtime error: {0}")]
    Runtime(#[from] tauri::Error),
}
