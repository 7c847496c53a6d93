//! Shared fakes for app integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use dashprint_core::{DocumentSource, PrintOptions, WindowId};
use dashprint_print::{LoadCallback, PrintCallback, PrintCompletion, PrintError, PrintHost};
use dashprint_ui::{ChoiceCallback, DialogPresenter, MessageDialog, WindowHost};

/// Lookup over a fixed set of variables, standing in for the environment.
pub fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

/// Host that loads instantly. Silent prints finish at once; interactive
/// prints only hand the job to a platform dialog.
#[derive(Default)]
pub struct InstantHost {
    pub printed: Mutex<Vec<(WindowId, PrintOptions)>>,
    pub dialogs: Mutex<Vec<MessageDialog>>,
    pub destroyed: Mutex<Vec<WindowId>>,
}

impl WindowHost for InstantHost {
    fn primary_window(&self) -> Option<WindowId> {
        Some(WindowId::new("main"))
    }

    fn is_focused(&self, _window: &WindowId) -> bool {
        true
    }

    fn destroy_window(&self, window: &WindowId) {
        self.destroyed
            .lock()
            .expect("destroyed lock")
            .push(window.clone());
    }
}

impl PrintHost for InstantHost {
    fn print_window(&self, window: &WindowId, options: PrintOptions, done: PrintCallback) {
        let silent = options.silent;
        self.printed
            .lock()
            .expect("printed lock")
            .push((window.clone(), options));
        done(Ok(if silent {
            PrintCompletion::Finished
        } else {
            PrintCompletion::Requested
        }));
    }

    fn open_hidden_window(
        &self,
        _document: &DocumentSource,
        on_loaded: LoadCallback,
    ) -> Result<WindowId, PrintError> {
        let window = WindowId::new("print-job-1");
        on_loaded(window.clone());
        Ok(window)
    }
}

impl DialogPresenter for InstantHost {
    fn show(&self, _parent: Option<&WindowId>, dialog: MessageDialog) {
        self.dialogs.lock().expect("dialog lock").push(dialog);
    }

    fn choose(&self, parent: Option<&WindowId>, dialog: MessageDialog, on_choice: ChoiceCallback) {
        self.show(parent, dialog);
        on_choice(0);
    }
}
