//! Effect runner binding [`UpdateMachine`] to its injected seams.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use dashprint_ui::{DialogPresenter, WindowHost};

use crate::{
    HostContext, LOG_TARGET, RESTART_CHOICE, UpdateEffect, UpdateEvent, UpdateMachine,
    UpdatePolicy, UpdateTrigger,
};

/// Callback through which a client reports lifecycle events.
pub type UpdateEventSink = Arc<dyn Fn(UpdateEvent) + Send + Sync + 'static>;

/// Third-party update client wrapped by the controller.
///
/// Every method returns immediately; progress and results arrive through
/// the event sink, possibly from another thread.
pub trait UpdateClient: Send + Sync {
    /// Contacts the feed and reports `CheckingForUpdate` followed by
    /// `UpdateAvailable`, `UpdateNotAvailable` or `Failed`.
    fn check(&self, events: UpdateEventSink);

    /// Downloads the announced release, reporting `DownloadProgress` and
    /// then `UpdateDownloaded` or `Failed`.
    fn download(&self, events: UpdateEventSink);

    /// Installs the staged release and relaunches the application.
    fn install_and_relaunch(&self, events: UpdateEventSink);

    /// Installs the staged release without relaunching, during exit.
    fn install_on_quit(&self);
}

/// Owns the update machine and runs its effects.
pub struct UpdateController {
    machine: Mutex<UpdateMachine>,
    client: Arc<dyn UpdateClient>,
    dialogs: Arc<dyn DialogPresenter>,
    windows: Arc<dyn WindowHost>,
    this: Weak<UpdateController>,
}

impl UpdateController {
    /// Creates a controller over injected seams.
    pub fn new(
        policy: UpdatePolicy,
        client: Arc<dyn UpdateClient>,
        dialogs: Arc<dyn DialogPresenter>,
        windows: Arc<dyn WindowHost>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            machine: Mutex::new(UpdateMachine::new(policy)),
            client,
            dialogs,
            windows,
            this: this.clone(),
        })
    }

    /// Requests an update check.
    pub fn check(&self, trigger: UpdateTrigger) {
        self.handle(UpdateEvent::CheckRequested(trigger));
    }

    /// Feeds one lifecycle event through the machine and runs its effects.
    pub fn handle(&self, event: UpdateEvent) {
        let context = HostContext {
            primary_focused: self
                .windows
                .primary_window()
                .is_some_and(|window| self.windows.is_focused(&window)),
        };

        let effects = self
            .machine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(event, context);

        for effect in effects {
            self.run(effect);
        }
    }

    /// Snapshot of the machine for inspection.
    pub fn snapshot(&self) -> UpdateMachine {
        self.machine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs a staged release when the policy asks for it. Called on exit.
    pub fn finish_on_quit(&self) {
        let install = self
            .machine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .should_install_on_quit();
        if install {
            log::info!(target: LOG_TARGET, "installing staged update on quit");
            self.client.install_on_quit();
        }
    }

    fn sink(&self) -> UpdateEventSink {
        let this = self.this.clone();
        Arc::new(move |event| {
            if let Some(controller) = this.upgrade() {
                controller.handle(event);
            }
        })
    }

    fn run(&self, effect: UpdateEffect) {
        match effect {
            UpdateEffect::StartCheck => self.client.check(self.sink()),
            UpdateEffect::StartDownload => self.client.download(self.sink()),
            UpdateEffect::Notify(dialog) => {
                let parent = self.windows.primary_window();
                self.dialogs.show(parent.as_ref(), dialog);
            }
            UpdateEffect::PromptRestart(dialog) => {
                let parent = self.windows.primary_window();
                let this = self.this.clone();
                self.dialogs.choose(
                    parent.as_ref(),
                    dialog,
                    Box::new(move |choice| {
                        let Some(controller) = this.upgrade() else {
                            return;
                        };
                        if choice == RESTART_CHOICE {
                            controller.handle(UpdateEvent::RestartChosen);
                        } else {
                            controller.handle(UpdateEvent::LaterChosen);
                        }
                    }),
                );
            }
            UpdateEffect::ReleasePrimaryWindow => {
                if let Some(window) = self.windows.primary_window() {
                    log::info!(target: LOG_TARGET, "releasing primary window {window} before install");
                    self.windows.destroy_window(&window);
                }
            }
            UpdateEffect::InstallAndRelaunch => self.client.install_and_relaunch(self.sink()),
        }
    }
}
