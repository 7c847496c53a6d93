//! Shared fakes for print dispatcher integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dashprint_core::{DocumentSource, PrintOptions, WindowId};
use dashprint_print::{
    DisposalPolicy, LoadCallback, PrintCallback, PrintCompletion, PrintDispatcher, PrintError,
    PrintFailure, PrintHost, SpoolDirectory,
};
use dashprint_ui::{ChoiceCallback, DialogPresenter, MessageDialog, WindowHost};

/// How the fake host answers print calls.
#[derive(Debug, Clone)]
pub enum PrintBehavior {
    Succeed,
    /// Accepts the print without ever reporting that it finished.
    RequestOnly,
    Fail(String),
    Hold,
}

/// Fake native host recording every interaction.
pub struct FakeHost {
    pub primary: Mutex<Option<WindowId>>,
    pub behavior: Mutex<PrintBehavior>,
    pub printed: Mutex<Vec<(WindowId, PrintOptions)>>,
    pub opened: Mutex<Vec<(WindowId, DocumentSource)>>,
    pub pending_loads: Mutex<Vec<(WindowId, LoadCallback)>>,
    pub pending_prints: Mutex<Vec<PrintCallback>>,
    pub destroyed: Mutex<Vec<WindowId>>,
    pub fail_open: Mutex<bool>,
}

impl FakeHost {
    pub fn with_primary() -> Arc<Self> {
        Arc::new(Self {
            primary: Mutex::new(Some(WindowId::new("main"))),
            behavior: Mutex::new(PrintBehavior::Succeed),
            printed: Mutex::new(Vec::new()),
            opened: Mutex::new(Vec::new()),
            pending_loads: Mutex::new(Vec::new()),
            pending_prints: Mutex::new(Vec::new()),
            destroyed: Mutex::new(Vec::new()),
            fail_open: Mutex::new(false),
        })
    }

    pub fn without_primary() -> Arc<Self> {
        let host = Self::with_primary();
        *host.primary.lock().expect("primary lock") = None;
        host
    }

    pub fn set_behavior(&self, behavior: PrintBehavior) {
        *self.behavior.lock().expect("behavior lock") = behavior;
    }

    /// Fires every pending load-completion signal.
    pub fn finish_loads(&self) {
        let pending = std::mem::take(&mut *self.pending_loads.lock().expect("loads lock"));
        for (window, on_loaded) in pending {
            on_loaded(window);
        }
    }

    /// Completes every held print call successfully.
    pub fn complete_prints(&self) {
        let pending = std::mem::take(&mut *self.pending_prints.lock().expect("prints lock"));
        for done in pending {
            done(Ok(PrintCompletion::Finished));
        }
    }

    pub fn spool_paths(&self) -> Vec<PathBuf> {
        self.opened
            .lock()
            .expect("opened lock")
            .iter()
            .filter_map(|(_, document)| match document {
                DocumentSource::File(path) => Some(path.clone()),
                DocumentSource::DataUrl(_) => None,
            })
            .collect()
    }
}

impl WindowHost for FakeHost {
    fn primary_window(&self) -> Option<WindowId> {
        self.primary.lock().expect("primary lock").clone()
    }

    fn is_focused(&self, window: &WindowId) -> bool {
        window.as_str() == "main"
    }

    fn destroy_window(&self, window: &WindowId) {
        self.destroyed
            .lock()
            .expect("destroyed lock")
            .push(window.clone());
    }
}

impl PrintHost for FakeHost {
    fn print_window(&self, window: &WindowId, options: PrintOptions, done: PrintCallback) {
        self.printed
            .lock()
            .expect("printed lock")
            .push((window.clone(), options));
        let behavior = self.behavior.lock().expect("behavior lock").clone();
        match behavior {
            PrintBehavior::Succeed => done(Ok(PrintCompletion::Finished)),
            PrintBehavior::RequestOnly => done(Ok(PrintCompletion::Requested)),
            PrintBehavior::Fail(reason) => done(Err(PrintFailure(reason))),
            PrintBehavior::Hold => self.pending_prints.lock().expect("prints lock").push(done),
        }
    }

    fn open_hidden_window(
        &self,
        document: &DocumentSource,
        on_loaded: LoadCallback,
    ) -> Result<WindowId, PrintError> {
        if *self.fail_open.lock().expect("fail lock") {
            return Err(PrintError::Window("webview refused".to_string()));
        }

        let mut opened = self.opened.lock().expect("opened lock");
        let window = WindowId::new(format!("print-job-{}", opened.len() + 1));
        opened.push((window.clone(), document.clone()));
        self.pending_loads
            .lock()
            .expect("loads lock")
            .push((window.clone(), on_loaded));
        Ok(window)
    }
}

/// Dialog presenter recording everything it is asked to show.
#[derive(Default)]
pub struct RecordingDialogs {
    pub shown: Mutex<Vec<(Option<WindowId>, MessageDialog)>>,
}

impl DialogPresenter for RecordingDialogs {
    fn show(&self, parent: Option<&WindowId>, dialog: MessageDialog) {
        self.shown
            .lock()
            .expect("dialog lock")
            .push((parent.cloned(), dialog));
    }

    fn choose(&self, parent: Option<&WindowId>, dialog: MessageDialog, on_choice: ChoiceCallback) {
        self.show(parent, dialog);
        on_choice(0);
    }
}

pub fn unique_spool(tag: &str) -> SpoolDirectory {
    SpoolDirectory::new(std::env::temp_dir().join(format!(
        "dashprint-spool-{tag}-{}",
        std::process::id()
    )))
}

pub fn dispatcher(
    host: &Arc<FakeHost>,
    dialogs: &Arc<RecordingDialogs>,
    spool: SpoolDirectory,
    disposal: DisposalPolicy,
) -> PrintDispatcher {
    PrintDispatcher::new(host.clone(), dialogs.clone(), spool, disposal)
}
