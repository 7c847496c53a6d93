#![warn(missing_docs)]
//! # dashprint-update
//!
//! ## Purpose
//! Drives the self-update lifecycle around a third-party update client.
//!
//! ## Responsibilities
//! - Model the update lifecycle as an explicit [`UpdateMachine`] with a
//!   single transition function over typed [`UpdateEvent`] values.
//! - Decide which dialogs each transition shows, depending on whether the
//!   check was automatic or manual.
//! - Run the resulting [`UpdateEffect`] values against injected seams in
//!   [`UpdateController`].
//!
//! ## Data flow
//! Menu/startup trigger -> [`UpdateController::check`] -> machine emits
//! `StartCheck` -> [`UpdateClient`] reports lifecycle events back -> machine
//! emits dialogs, downloads, window release and install effects.
//!
//! ## Ownership and lifetimes
//! The controller owns the machine behind a mutex and releases the lock
//! before running effects, so clients may report events synchronously.
//!
//! ## Error model
//! Update failures arrive as [`UpdateEvent::Failed`]; they are logged, shown
//! when the policy asks for it, and the machine returns to `Idle`. Nothing is
//! retried.
//!
//! ## Security and privacy notes
//! Signature verification and transport security belong to the wrapped
//! update client.

mod controller;

use std::fmt;
use std::time::Duration;

use dashprint_ui::MessageDialog;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use controller::{UpdateClient, UpdateController, UpdateEventSink};

const LOG_TARGET: &str = "dashprint::update";

/// Button index of "Restart" in the restart prompt.
pub const RESTART_CHOICE: usize = 0;

/// Who asked for an update check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTrigger {
    /// Startup check; silent unless something actionable happens.
    Automatic,
    /// Help -> Check for Updates.
    Manual,
}

/// Release metadata reported by the update client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInfo {
    /// Version being offered.
    pub version: String,
    /// Version currently running.
    pub current_version: String,
    /// Release notes, when the feed has them.
    pub notes: Option<String>,
}

/// Download progress snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadProgress {
    /// Bytes received so far.
    pub transferred: u64,
    /// Expected total, when the server announced one.
    pub total: Option<u64>,
    /// Average transfer speed in bytes per second.
    pub bytes_per_second: f64,
}

impl DownloadProgress {
    /// Completion percentage, `None` without a known total.
    pub fn percent(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some(self.transferred as f64 * 100.0 / total as f64),
            _ => None,
        }
    }
}

impl fmt::Display for DownloadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let percent = self
            .percent()
            .map_or_else(|| "?".to_string(), |percent| format!("{percent:.1}"));
        let total = self
            .total
            .map_or_else(|| "?".to_string(), |total| total.to_string());
        write!(
            f,
            "Downloaded {percent}% ({}/{total}) at {:.0} B/s",
            self.transferred, self.bytes_per_second
        )
    }
}

/// Phases of the update lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePhase {
    /// Nothing in flight.
    Idle,
    /// Waiting for the feed.
    Checking,
    /// Feed reported no newer release.
    NoUpdateFound,
    /// Newer release announced; download about to start.
    UpdateAvailable(UpdateInfo),
    /// Release is downloading.
    Downloading(UpdateInfo),
    /// Release is staged; waiting for the restart choice.
    UpdateReady(UpdateInfo),
    /// Restart chosen; installing and relaunching.
    Installing(UpdateInfo),
}

impl UpdatePhase {
    /// Returns `true` while a check, download or install is running.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Checking | Self::UpdateAvailable(_) | Self::Downloading(_) | Self::Installing(_)
        )
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::NoUpdateFound => "no-update-found",
            Self::UpdateAvailable(_) => "update-available",
            Self::Downloading(_) => "downloading",
            Self::UpdateReady(_) => "update-ready",
            Self::Installing(_) => "installing",
        }
    }
}

/// Lifecycle events consumed by [`UpdateMachine::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEvent {
    /// A check was requested.
    CheckRequested(UpdateTrigger),
    /// The client started contacting the feed.
    CheckingForUpdate,
    /// The feed offers a newer release.
    UpdateAvailable(UpdateInfo),
    /// The feed has nothing newer.
    UpdateNotAvailable,
    /// Download progressed.
    DownloadProgress(DownloadProgress),
    /// Download finished and the release is staged.
    UpdateDownloaded(UpdateInfo),
    /// User picked "Restart" in the restart prompt.
    RestartChosen,
    /// User picked "Later" in the restart prompt.
    LaterChosen,
    /// Check, download or install failed.
    Failed(String),
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEffect {
    /// Ask the client to contact the feed.
    StartCheck,
    /// Ask the client to download the announced release.
    StartDownload,
    /// Show a dialog; nothing waits on the answer.
    Notify(MessageDialog),
    /// Show the two-button restart prompt.
    PromptRestart(MessageDialog),
    /// Tear down the primary window before installing.
    ReleasePrimaryWindow,
    /// Install the staged release and relaunch.
    InstallAndRelaunch,
}

/// Host facts consulted by transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostContext {
    /// Whether the primary window currently has focus.
    pub primary_focused: bool,
}

/// User-visible update behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatePolicy {
    /// Show a blocking dialog for update errors.
    pub error_dialogs: bool,
    /// Show a "checking" notification for manual checks.
    pub announce_manual_checks: bool,
    /// Install a staged release when the process exits.
    pub install_on_quit: bool,
    /// Delay before the automatic startup check.
    pub startup_delay: Duration,
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self {
            error_dialogs: true,
            announce_manual_checks: false,
            install_on_quit: true,
            startup_delay: Duration::from_millis(3_000),
        }
    }
}

/// Update lifecycle state machine.
#[derive(Debug, Clone)]
pub struct UpdateMachine {
    phase: UpdatePhase,
    policy: UpdatePolicy,
    trigger: UpdateTrigger,
    staged: Option<UpdateInfo>,
    last_error: Option<String>,
}

impl UpdateMachine {
    /// Creates an idle machine.
    pub fn new(policy: UpdatePolicy) -> Self {
        Self {
            phase: UpdatePhase::Idle,
            policy,
            trigger: UpdateTrigger::Automatic,
            staged: None,
            last_error: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &UpdatePhase {
        &self.phase
    }

    /// Active policy.
    pub fn policy(&self) -> &UpdatePolicy {
        &self.policy
    }

    /// Release downloaded and waiting for installation, if any.
    pub fn staged(&self) -> Option<&UpdateInfo> {
        self.staged.as_ref()
    }

    /// Message of the most recent failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns `true` when a staged release should be installed at exit.
    pub fn should_install_on_quit(&self) -> bool {
        self.policy.install_on_quit
            && self.staged.is_some()
            && !matches!(self.phase, UpdatePhase::Installing(_))
    }

    /// Applies one event and returns the effects to run, in order.
    pub fn apply(&mut self, event: UpdateEvent, context: HostContext) -> Vec<UpdateEffect> {
        let before = self.phase.name();
        let effects = self.transition(event, context);
        let after = self.phase.name();
        if before != after {
            log::info!(target: LOG_TARGET, "update phase {before} -> {after}");
        }
        effects
    }

    fn transition(&mut self, event: UpdateEvent, context: HostContext) -> Vec<UpdateEffect> {
        match event {
            UpdateEvent::CheckRequested(trigger) => self.on_check_requested(trigger),
            UpdateEvent::CheckingForUpdate => {
                log::info!(target: LOG_TARGET, "Checking for update...");
                Vec::new()
            }
            UpdateEvent::UpdateAvailable(info) => {
                if self.phase != UpdatePhase::Checking {
                    return self.ignore("update-available");
                }
                log::info!(target: LOG_TARGET, "Update available: {}", info.version);
                let notice = MessageDialog::info(
                    "Update Available",
                    format!("New version {} is downloading in background.", info.version),
                )
                .non_blocking();
                self.phase = UpdatePhase::UpdateAvailable(info);
                vec![UpdateEffect::Notify(notice), UpdateEffect::StartDownload]
            }
            UpdateEvent::UpdateNotAvailable => {
                if self.phase != UpdatePhase::Checking {
                    return self.ignore("update-not-available");
                }
                log::info!(target: LOG_TARGET, "No updates available");
                self.phase = UpdatePhase::NoUpdateFound;
                if self.trigger == UpdateTrigger::Manual && context.primary_focused {
                    vec![UpdateEffect::Notify(MessageDialog::info(
                        "No Updates",
                        "You are running the latest version.",
                    ))]
                } else {
                    Vec::new()
                }
            }
            UpdateEvent::DownloadProgress(progress) => {
                match &self.phase {
                    UpdatePhase::UpdateAvailable(info) => {
                        self.phase = UpdatePhase::Downloading(info.clone());
                        log::info!(target: LOG_TARGET, "{progress}");
                    }
                    UpdatePhase::Downloading(_) => log::info!(target: LOG_TARGET, "{progress}"),
                    _ => return self.ignore("download-progress"),
                }
                Vec::new()
            }
            UpdateEvent::UpdateDownloaded(info) => {
                if !matches!(
                    self.phase,
                    UpdatePhase::UpdateAvailable(_) | UpdatePhase::Downloading(_)
                ) {
                    return self.ignore("update-downloaded");
                }
                log::info!(target: LOG_TARGET, "Update {} downloaded", info.version);
                self.staged = Some(info.clone());
                self.phase = UpdatePhase::UpdateReady(info);
                vec![UpdateEffect::PromptRestart(restart_prompt())]
            }
            UpdateEvent::RestartChosen => {
                let UpdatePhase::UpdateReady(info) = &self.phase else {
                    return self.ignore("restart");
                };
                log::info!(target: LOG_TARGET, "Restarting to install {}", info.version);
                self.phase = UpdatePhase::Installing(info.clone());
                vec![
                    UpdateEffect::ReleasePrimaryWindow,
                    UpdateEffect::InstallAndRelaunch,
                ]
            }
            UpdateEvent::LaterChosen => {
                if !matches!(self.phase, UpdatePhase::UpdateReady(_)) {
                    return self.ignore("later");
                }
                log::info!(target: LOG_TARGET, "Update staged for installation on quit");
                self.phase = UpdatePhase::Idle;
                Vec::new()
            }
            UpdateEvent::Failed(message) => self.on_failed(message),
        }
    }

    fn on_check_requested(&mut self, trigger: UpdateTrigger) -> Vec<UpdateEffect> {
        if self.phase.is_busy() {
            log::info!(
                target: LOG_TARGET,
                "{trigger:?} check ignored while {}",
                self.phase.name()
            );
            return Vec::new();
        }

        if let Some(staged) = self.staged.clone() {
            if trigger == UpdateTrigger::Manual {
                self.phase = UpdatePhase::UpdateReady(staged);
                return vec![UpdateEffect::PromptRestart(restart_prompt())];
            }
            log::info!(target: LOG_TARGET, "automatic check skipped: update already staged");
            return Vec::new();
        }

        self.trigger = trigger;
        self.phase = UpdatePhase::Checking;
        let mut effects = Vec::new();
        if trigger == UpdateTrigger::Manual && self.policy.announce_manual_checks {
            effects.push(UpdateEffect::Notify(MessageDialog::info(
                "Checking for Updates",
                "Checking for updates...",
            )));
        }
        effects.push(UpdateEffect::StartCheck);
        effects
    }

    fn on_failed(&mut self, message: String) -> Vec<UpdateEffect> {
        log::error!(target: LOG_TARGET, "Auto update error: {message}");
        if !matches!(
            self.phase,
            UpdatePhase::Checking
                | UpdatePhase::UpdateAvailable(_)
                | UpdatePhase::Downloading(_)
                | UpdatePhase::Installing(_)
        ) {
            return Vec::new();
        }

        if matches!(self.phase, UpdatePhase::Installing(_)) {
            // The client consumed the staged payload; the next check must go
            // back to the feed.
            self.staged = None;
        }
        self.phase = UpdatePhase::Idle;
        let effects = if self.policy.error_dialogs {
            vec![UpdateEffect::Notify(MessageDialog::error(
                "Update Error",
                message.clone(),
            ))]
        } else {
            Vec::new()
        };
        self.last_error = Some(message);
        effects
    }

    fn ignore(&self, event: &str) -> Vec<UpdateEffect> {
        log::debug!(
            target: LOG_TARGET,
            "{event} ignored in phase {}",
            self.phase.name()
        );
        Vec::new()
    }
}

fn restart_prompt() -> MessageDialog {
    MessageDialog::info("Update Ready", "Update downloaded. Restart to apply?")
        .with_buttons(["Restart", "Later"])
}

/// Errors raised by update client implementations.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Client could not be configured.
    #[error("update client configuration failed: {0}")]
    Configuration(String),
    /// Feed could not be checked.
    #[error("update check failed: {0}")]
    Check(String),
    /// Release could not be downloaded.
    #[error("update download failed: {0}")]
    Download(String),
    /// Release could not be installed.
    #[error("update install failed: {0}")]
    Install(String),
    /// An operation needed an update the client no longer holds.
    #[error("no update is pending")]
    NothingPending,
}
