//! [`UpdateClient`] over the Tauri updater plugin.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use dashprint_update::{
    DownloadProgress, UpdateClient, UpdateError, UpdateEvent, UpdateEventSink, UpdateInfo,
};
use tauri::AppHandle;
use tauri_plugin_updater::{Update, Updater, UpdaterExt};
use url::Url;

const LOG_TARGET: &str = "dashprint::update";

/// Minimum bytes between progress reports when the total size is unknown.
const PROGRESS_STEP_BYTES: u64 = 1024 * 1024;

/// Release found by the last check, and its payload once downloaded.
#[derive(Default)]
struct Slots {
    available: Option<Update>,
    staged: Option<(Update, Vec<u8>)>,
}

/// Update client backed by `tauri-plugin-updater`.
pub struct TauriUpdateClient {
    app: AppHandle,
    endpoint: Option<Url>,
    slots: Arc<Mutex<Slots>>,
}

impl TauriUpdateClient {
    pub fn new(app: AppHandle, endpoint: Option<Url>) -> Self {
        Self {
            app,
            endpoint,
            slots: Arc::new(Mutex::new(Slots::default())),
        }
    }

    fn updater(&self) -> Result<Updater, UpdateError> {
        let mut builder = self.app.updater_builder();
        if let Some(endpoint) = &self.endpoint {
            builder = builder
                .endpoints(vec![endpoint.clone()])
                .map_err(|error| UpdateError::Configuration(error.to_string()))?;
        }
        builder
            .build()
            .map_err(|error| UpdateError::Configuration(error.to_string()))
    }

    fn take_staged(&self) -> Option<(Update, Vec<u8>)> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .staged
            .take()
    }
}

impl UpdateClient for TauriUpdateClient {
    fn check(&self, events: UpdateEventSink) {
        let updater = match self.updater() {
            Ok(updater) => updater,
            Err(error) => {
                events(failed(error));
                return;
            }
        };
        let slots = Arc::clone(&self.slots);

        tauri::async_runtime::spawn(async move {
            events(UpdateEvent::CheckingForUpdate);
            match updater.check().await {
                Ok(Some(update)) => {
                    let info = release_info(&update);
                    slots
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .available = Some(update);
                    events(UpdateEvent::UpdateAvailable(info));
                }
                Ok(None) => events(UpdateEvent::UpdateNotAvailable),
                Err(error) => events(failed(UpdateError::Check(error.to_string()))),
            }
        });
    }

    fn download(&self, events: UpdateEventSink) {
        let update = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .available
            .take();
        let Some(update) = update else {
            events(failed(UpdateError::NothingPending));
            return;
        };
        let slots = Arc::clone(&self.slots);

        tauri::async_runtime::spawn(async move {
            let started = Instant::now();
            let mut transferred = 0_u64;
            let mut reported = 0_u64;
            let progress_events = Arc::clone(&events);

            let result = update
                .download(
                    move |chunk, total| {
                        transferred += chunk as u64;
                        if !progress_due(transferred, reported, total) {
                            return;
                        }
                        reported = transferred;
                        let seconds = started.elapsed().as_secs_f64();
                        progress_events(UpdateEvent::DownloadProgress(DownloadProgress {
                            transferred,
                            total,
                            bytes_per_second: if seconds > 0.0 {
                                transferred as f64 / seconds
                            } else {
                                0.0
                            },
                        }));
                    },
                    || log::debug!(target: LOG_TARGET, "update payload fully received"),
                )
                .await;

            match result {
                Ok(bytes) => {
                    let info = release_info(&update);
                    slots
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .staged = Some((update, bytes));
                    events(UpdateEvent::UpdateDownloaded(info));
                }
                Err(error) => events(failed(UpdateError::Download(error.to_string()))),
            }
        });
    }

    fn install_and_relaunch(&self, events: UpdateEventSink) {
        let Some((update, bytes)) = self.take_staged() else {
            events(failed(UpdateError::NothingPending));
            return;
        };
        log::info!(target: LOG_TARGET, "installing {} and relaunching", update.version);
        match update.install(&bytes) {
            Ok(()) => self.app.restart(),
            Err(error) => events(failed(UpdateError::Install(error.to_string()))),
        }
    }

    fn install_on_quit(&self) {
        let Some((update, bytes)) = self.take_staged() else {
            return;
        };
        if let Err(error) = update.install(&bytes) {
            log::error!(
                target: LOG_TARGET,
                "staged update {} failed to install on quit: {error}",
                update.version
            );
        }
    }
}

fn failed(error: UpdateError) -> UpdateEvent {
    UpdateEvent::Failed(error.to_string())
}

fn release_info(update: &Update) -> UpdateInfo {
    UpdateInfo {
        version: update.version.clone(),
        current_version: update.current_version.clone(),
        notes: update.body.clone(),
    }
}

/// Reports on every whole percent when the size is known, else every MiB.
fn progress_due(transferred: u64, reported: u64, total: Option<u64>) -> bool {
    match total {
        Some(total) if total > 0 => {
            transferred >= total || transferred * 100 / total > reported * 100 / total
        }
        _ => transferred - reported >= PROGRESS_STEP_BYTES,
    }
}
