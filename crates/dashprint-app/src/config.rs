//! Environment-driven shell configuration.

use std::time::Duration;

use dashprint_print::DisposalPolicy;
use dashprint_update::UpdatePolicy;
use thiserror::Error;
use url::Url;

/// Dashboard page loaded when `DASHPRINT_DASHBOARD_URL` is unset.
pub const DEFAULT_DASHBOARD_URL: &str = "https://ecw.excelindia.com/svkmprinttest/PrintDashboard";

const DEFAULT_UPDATE_DELAY_MS: u64 = 3_000;

const VAR_DASHBOARD_URL: &str = "DASHPRINT_DASHBOARD_URL";
const VAR_UPDATE_DELAY_MS: &str = "DASHPRINT_UPDATE_DELAY_MS";
const VAR_UPDATE_ENDPOINT: &str = "DASHPRINT_UPDATE_ENDPOINT";
const VAR_UPDATE_ERROR_DIALOGS: &str = "DASHPRINT_UPDATE_ERROR_DIALOGS";
const VAR_ANNOUNCE_MANUAL_CHECKS: &str = "DASHPRINT_ANNOUNCE_MANUAL_CHECKS";
const VAR_INSTALL_ON_QUIT: &str = "DASHPRINT_INSTALL_ON_QUIT";
const VAR_PRINT_WINDOW_DISPOSAL: &str = "DASHPRINT_PRINT_WINDOW_DISPOSAL";

/// Runtime configuration of the desktop shell.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    /// Remote dashboard page shown in the primary window.
    pub dashboard_url: Url,
    /// Optional update feed overriding the bundled updater endpoints.
    pub update_endpoint: Option<Url>,
    /// Update dialog and install behaviour.
    pub update_policy: UpdatePolicy,
    /// Hidden print window disposal.
    pub print_window_disposal: DisposalPolicy,
}

impl ShellConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when any variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which returns a variable's value
    /// or `None` when unset.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when any variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let dashboard_url = https_url(
            VAR_DASHBOARD_URL,
            read(VAR_DASHBOARD_URL).as_deref().unwrap_or(DEFAULT_DASHBOARD_URL),
        )?;
        let update_endpoint = read(VAR_UPDATE_ENDPOINT)
            .map(|raw| https_url(VAR_UPDATE_ENDPOINT, &raw))
            .transpose()?;

        let startup_delay = match read(VAR_UPDATE_DELAY_MS) {
            Some(raw) => Duration::from_millis(raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidDelay {
                    name: VAR_UPDATE_DELAY_MS,
                    value: raw.clone(),
                }
            })?),
            None => Duration::from_millis(DEFAULT_UPDATE_DELAY_MS),
        };

        let defaults = UpdatePolicy::default();
        let update_policy = UpdatePolicy {
            error_dialogs: flag(&read, VAR_UPDATE_ERROR_DIALOGS, defaults.error_dialogs)?,
            announce_manual_checks: flag(
                &read,
                VAR_ANNOUNCE_MANUAL_CHECKS,
                defaults.announce_manual_checks,
            )?,
            install_on_quit: flag(&read, VAR_INSTALL_ON_QUIT, defaults.install_on_quit)?,
            startup_delay,
        };

        let print_window_disposal = match read(VAR_PRINT_WINDOW_DISPOSAL) {
            Some(raw) => DisposalPolicy::parse(&raw).ok_or(ConfigError::InvalidDisposal(raw))?,
            None => DisposalPolicy::default(),
        };

        Ok(Self {
            dashboard_url,
            update_endpoint,
            update_policy,
            print_window_disposal,
        })
    }
}

/// Parses an on/off switch.
///
/// Semantics:
/// - `0`, `false`, `off`, `no` (case-insensitive) => `Some(false)`.
/// - `1`, `true`, `on`, `yes` (case-insensitive) => `Some(true)`.
/// - Any other value => `None`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "0" | "false" | "off" | "no" => Some(false),
        "1" | "true" | "on" | "yes" => Some(true),
        _ => None,
    }
}

fn flag<R>(read: &R, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    R: Fn(&str) -> Option<String>,
{
    match read(name) {
        Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag { name, value: raw }),
        None => Ok(default),
    }
}

fn https_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|_| ConfigError::InvalidUrl {
        name,
        value: raw.to_string(),
    })?;
    if url.scheme() != "https" {
        return Err(ConfigError::InsecureUrl {
            name,
            value: raw.to_string(),
        });
    }
    Ok(url)
}

/// Configuration loading errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is not a parsable URL.
    #[error("{name} is not a valid URL: {value}")]
    InvalidUrl {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
    /// Variable is a URL without HTTPS.
    #[error("{name} must use https: {value}")]
    InsecureUrl {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
    /// Variable is not an on/off switch.
    #[error("{name} must be one of 0/1/true/false/on/off/yes/no, got {value}")]
    InvalidFlag {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
    /// Delay is not a non-negative integer of milliseconds.
    #[error("{name} must be a whole number of milliseconds, got {value}")]
    InvalidDelay {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
    /// Disposal policy is neither `destroy` nor `keep`.
    #[error("DASHPRINT_PRINT_WINDOW_DISPOSAL must be destroy or keep, got {0}")]
    InvalidDisposal(String),
}
