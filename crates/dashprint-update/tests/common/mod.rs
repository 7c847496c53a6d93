//! Shared fakes for update controller integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use dashprint_core::WindowId;
use dashprint_ui::{ChoiceCallback, DialogPresenter, MessageDialog, WindowHost};
use dashprint_update::{
    DownloadProgress, UpdateClient, UpdateController, UpdateEvent, UpdateEventSink, UpdateInfo,
    UpdatePolicy,
};

/// Ordered record of side effects across all fakes.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn info(version: &str) -> UpdateInfo {
    UpdateInfo {
        version: version.to_string(),
        current_version: "0.1.0".to_string(),
        notes: None,
    }
}

/// What the scripted feed answers.
#[derive(Debug, Clone)]
pub enum FeedAnswer {
    Newer(String),
    UpToDate,
    CheckFails(String),
    DownloadFails(String),
}

/// Update client that answers synchronously from a script.
pub struct ScriptedClient {
    pub answer: Mutex<FeedAnswer>,
    pub install_failure: Mutex<Option<String>>,
    pub journal: Journal,
}

impl UpdateClient for ScriptedClient {
    fn check(&self, events: UpdateEventSink) {
        self.journal.lock().expect("journal").push("check".to_string());
        events(UpdateEvent::CheckingForUpdate);
        let answer = self.answer.lock().expect("answer lock").clone();
        match answer {
            FeedAnswer::Newer(version) | FeedAnswer::DownloadFails(version) => {
                events(UpdateEvent::UpdateAvailable(info(&version)));
            }
            FeedAnswer::UpToDate => events(UpdateEvent::UpdateNotAvailable),
            FeedAnswer::CheckFails(message) => events(UpdateEvent::Failed(message)),
        }
    }

    fn download(&self, events: UpdateEventSink) {
        self.journal.lock().expect("journal").push("download".to_string());
        let answer = self.answer.lock().expect("answer lock").clone();
        match answer {
            FeedAnswer::Newer(version) => {
                for transferred in [512_u64, 1_024] {
                    events(UpdateEvent::DownloadProgress(DownloadProgress {
                        transferred,
                        total: Some(1_024),
                        bytes_per_second: 2_048.0,
                    }));
                }
                events(UpdateEvent::UpdateDownloaded(info(&version)));
            }
            FeedAnswer::DownloadFails(message) => events(UpdateEvent::Failed(message)),
            FeedAnswer::UpToDate | FeedAnswer::CheckFails(_) => {}
        }
    }

    fn install_and_relaunch(&self, events: UpdateEventSink) {
        self.journal
            .lock()
            .expect("journal")
            .push("install_and_relaunch".to_string());
        let failure = self.install_failure.lock().expect("install lock").clone();
        if let Some(message) = failure {
            events(UpdateEvent::Failed(message));
        }
    }

    fn install_on_quit(&self) {
        self.journal
            .lock()
            .expect("journal")
            .push("install_on_quit".to_string());
    }
}

/// Dialog presenter answering choice dialogs with a fixed button index.
pub struct ScriptedDialogs {
    pub shown: Mutex<Vec<MessageDialog>>,
    pub choice: Mutex<Option<usize>>,
    pub journal: Journal,
}

impl DialogPresenter for ScriptedDialogs {
    fn show(&self, _parent: Option<&WindowId>, dialog: MessageDialog) {
        self.journal
            .lock()
            .expect("journal")
            .push(format!("dialog:{}", dialog.title));
        self.shown.lock().expect("dialog lock").push(dialog);
    }

    fn choose(&self, parent: Option<&WindowId>, dialog: MessageDialog, on_choice: ChoiceCallback) {
        self.show(parent, dialog);
        let choice = *self.choice.lock().expect("choice lock");
        if let Some(index) = choice {
            on_choice(index);
        }
    }
}

/// Window registry with a single primary window.
pub struct FakeWindows {
    pub primary: Mutex<Option<WindowId>>,
    pub focused: Mutex<bool>,
    pub journal: Journal,
}

impl WindowHost for FakeWindows {
    fn primary_window(&self) -> Option<WindowId> {
        self.primary.lock().expect("primary lock").clone()
    }

    fn is_focused(&self, _window: &WindowId) -> bool {
        *self.focused.lock().expect("focus lock")
    }

    fn destroy_window(&self, window: &WindowId) {
        self.journal
            .lock()
            .expect("journal")
            .push(format!("destroy:{window}"));
        *self.primary.lock().expect("primary lock") = None;
    }
}

pub struct Harness {
    pub controller: Arc<UpdateController>,
    pub client: Arc<ScriptedClient>,
    pub dialogs: Arc<ScriptedDialogs>,
    pub windows: Arc<FakeWindows>,
    pub journal: Journal,
}

impl Harness {
    pub fn new(answer: FeedAnswer, policy: UpdatePolicy) -> Self {
        let journal: Journal = Arc::new(Mutex::new(Vec::new()));
        let client = Arc::new(ScriptedClient {
            answer: Mutex::new(answer),
            install_failure: Mutex::new(None),
            journal: journal.clone(),
        });
        let dialogs = Arc::new(ScriptedDialogs {
            shown: Mutex::new(Vec::new()),
            choice: Mutex::new(None),
            journal: journal.clone(),
        });
        let windows = Arc::new(FakeWindows {
            primary: Mutex::new(Some(WindowId::new("main"))),
            focused: Mutex::new(true),
            journal: journal.clone(),
        });
        let controller =
            UpdateController::new(policy, client.clone(), dialogs.clone(), windows.clone());

        Self {
            controller,
            client,
            dialogs,
            windows,
            journal,
        }
    }

    pub fn choose(&self, index: Option<usize>) {
        *self.dialogs.choice.lock().expect("choice lock") = index;
    }

    pub fn set_answer(&self, answer: FeedAnswer) {
        *self.client.answer.lock().expect("answer lock") = answer;
    }

    pub fn fail_install(&self, message: &str) {
        *self.client.install_failure.lock().expect("install lock") = Some(message.to_string());
    }

    pub fn set_focused(&self, focused: bool) {
        *self.windows.focused.lock().expect("focus lock") = focused;
    }

    pub fn dialog_titles(&self) -> Vec<String> {
        self.dialogs
            .shown
            .lock()
            .expect("dialog lock")
            .iter()
            .map(|dialog| dialog.title.clone())
            .collect()
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().expect("journal").clone()
    }
}
