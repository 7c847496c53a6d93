#![warn(missing_docs)]
//! # dashprint-print
//!
//! ## Purpose
//! Handles forwarded print requests inside the privileged host.
//!
//! ## Responsibilities
//! - Resolve simple prints against the live primary window.
//! - Load HTML and byte payloads into hidden windows and print them once
//!   they finish loading.
//! - Report simple-print outcomes through modal dialogs.
//! - Spool byte payloads to per-request files and dispose of hidden windows.
//!
//! ## Data flow
//! [`DispatchWorker`] receives [`BridgeMessage`] values -> [`PrintDispatcher`]
//! resolves a window and [`PrintOptions`] -> [`PrintHost`] drives the native
//! print facility and reports back through callbacks.
//!
//! ## Ownership and lifetimes
//! The dispatcher owns injected `Arc` handles to the host and the dialog
//! presenter. Callbacks capture clones of those handles plus the window id
//! they act on; nothing borrows across the event loop.
//!
//! ## Error model
//! Setup failures (spooling, window creation, document encoding) return
//! [`PrintError`]. Print failures after load completion are logged; only the
//! simple-print path reports them to the user. A print the platform only
//! accepted ([`PrintCompletion::Requested`]) never triggers disposal or the
//! completion dialog.
//!
//! ## Security and privacy notes
//! Payloads are referenced in logs by length and digest only. Spool files are
//! created with unique names and removed after printing.

mod spool;
mod worker;

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use dashprint_core::{
    BridgeMessage, CoreError, DocumentSource, PrintOptions, PrintProfile, PrinterTarget, WindowId,
    payload_digest,
};
use dashprint_ui::{DialogPresenter, MessageDialog, WindowHost};
use thiserror::Error;

pub use spool::SpoolDirectory;
pub use worker::DispatchWorker;

const LOG_TARGET: &str = "dashprint::print";

/// Reason reported by the native print facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintFailure(pub String);

impl fmt::Display for PrintFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How far a successful print call got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintCompletion {
    /// The job was handed to the printer and the platform reported completion.
    Finished,
    /// The platform accepted the request (for example by opening its print
    /// dialog) but reports no completion. The window must stay alive.
    Requested,
}

/// Result of one native print call.
pub type PrintOutcome = Result<PrintCompletion, PrintFailure>;

/// Invoked once when a print call completes.
pub type PrintCallback = Box<dyn FnOnce(PrintOutcome) + Send + 'static>;

/// Invoked once when a hidden window signals load completion.
pub type LoadCallback = Box<dyn FnOnce(WindowId) + Send + 'static>;

/// Native window and print facility used by the dispatcher.
pub trait PrintHost: WindowHost {
    /// Prints the current content of `window`.
    ///
    /// `done` receives [`PrintCompletion::Finished`] only once the platform
    /// signals that the job left the window.
    fn print_window(&self, window: &WindowId, options: PrintOptions, done: PrintCallback);

    /// Opens a hidden window showing `document`.
    ///
    /// `on_loaded` fires once after the document finished loading.
    ///
    /// # Errors
    /// Returns [`PrintError::Window`] when the window cannot be created.
    fn open_hidden_window(
        &self,
        document: &DocumentSource,
        on_loaded: LoadCallback,
    ) -> Result<WindowId, PrintError>;
}

/// What happens to hidden print windows after their print completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisposalPolicy {
    /// Destroy the window and remove its spool file on completion.
    #[default]
    DestroyOnCompletion,
    /// Leave windows and spool files until process exit.
    KeepUntilExit,
}

impl DisposalPolicy {
    /// Parses `destroy` / `keep`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "destroy" => Some(Self::DestroyOnCompletion),
            "keep" => Some(Self::KeepUntilExit),
            _ => None,
        }
    }
}

/// Whether a message reached the native print facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// A print call was issued or is waiting for load completion.
    Submitted,
    /// The message was dropped without printing.
    Dropped,
}

/// Routes forwarded print messages to the host.
#[derive(Clone)]
pub struct PrintDispatcher {
    host: Arc<dyn PrintHost>,
    dialogs: Arc<dyn DialogPresenter>,
    spool: SpoolDirectory,
    disposal: DisposalPolicy,
}

impl PrintDispatcher {
    /// Creates a dispatcher over injected host seams.
    pub fn new(
        host: Arc<dyn PrintHost>,
        dialogs: Arc<dyn DialogPresenter>,
        spool: SpoolDirectory,
        disposal: DisposalPolicy,
    ) -> Self {
        Self {
            host,
            dialogs,
            spool,
            disposal,
        }
    }

    /// Handles one forwarded message.
    ///
    /// # Errors
    /// Returns [`PrintError`] when spooling, document encoding or hidden
    /// window creation fails.
    pub fn dispatch(&self, message: BridgeMessage) -> Result<Dispatched, PrintError> {
        let options = message.profile().options(message.printer().clone());
        match message {
            BridgeMessage::Print { .. } => Ok(self.print_primary(options)),
            BridgeMessage::PrintHtmlContent { html, .. } => {
                log::info!(
                    target: LOG_TARGET,
                    "html print printer={} html_len={} digest={}",
                    options.printer,
                    html.len(),
                    payload_digest(html.as_bytes())
                );
                let document = DocumentSource::inline_html(&html)?;
                self.print_hidden(document, options, None)?;
                Ok(Dispatched::Submitted)
            }
            BridgeMessage::PrintBytes { bytes, .. } => {
                let path = self.spool.write(&bytes)?;
                log::info!(
                    target: LOG_TARGET,
                    "bytes print printer={} byte_len={} digest={} spool={}",
                    options.printer,
                    bytes.len(),
                    payload_digest(&bytes),
                    path.display()
                );
                let document = DocumentSource::File(path.clone());
                if let Err(error) = self.print_hidden(document, options, Some(path.clone())) {
                    self.spool.remove(&path);
                    return Err(error);
                }
                Ok(Dispatched::Submitted)
            }
        }
    }

    fn print_primary(&self, options: PrintOptions) -> Dispatched {
        let Some(window) = self.host.primary_window() else {
            log::warn!(
                target: LOG_TARGET,
                "simple print to {} dropped: no primary window",
                options.printer
            );
            return Dispatched::Dropped;
        };

        let dialogs = Arc::clone(&self.dialogs);
        let parent = window.clone();
        let printer = options.printer.clone();
        self.host.print_window(
            &window,
            options,
            Box::new(move |outcome| report_simple_outcome(&*dialogs, &parent, &printer, outcome)),
        );
        Dispatched::Submitted
    }

    fn print_hidden(
        &self,
        document: DocumentSource,
        options: PrintOptions,
        spool_file: Option<PathBuf>,
    ) -> Result<WindowId, PrintError> {
        let host = Arc::clone(&self.host);
        let spool = self.spool.clone();
        let disposal = self.disposal;

        let window = self.host.open_hidden_window(
            &document,
            Box::new(move |window| {
                log::debug!(target: LOG_TARGET, "hidden window {window} loaded; printing");
                let printer = options.printer.clone();
                let print_host = Arc::clone(&host);
                let target = window.clone();
                host.print_window(
                    &target,
                    options,
                    Box::new(move |outcome| {
                        match &outcome {
                            Ok(PrintCompletion::Finished) => log::info!(
                                target: LOG_TARGET,
                                "hidden window {window} printed to {printer}"
                            ),
                            Ok(PrintCompletion::Requested) => log::info!(
                                target: LOG_TARGET,
                                "hidden window {window} print to {printer} handed to the platform dialog; kept until exit"
                            ),
                            Err(failure) => log::error!(
                                target: LOG_TARGET,
                                "hidden window {window} print to {printer} failed: {failure}"
                            ),
                        }

                        let settled = outcome != Ok(PrintCompletion::Requested);
                        if settled && disposal == DisposalPolicy::DestroyOnCompletion {
                            print_host.destroy_window(&window);
                            if let Some(path) = spool_file {
                                spool.remove(&path);
                            }
                        }
                    }),
                );
            }),
        )?;

        log::debug!(target: LOG_TARGET, "hidden window {window} opened");
        Ok(window)
    }
}

fn report_simple_outcome(
    dialogs: &dyn DialogPresenter,
    parent: &WindowId,
    printer: &PrinterTarget,
    outcome: PrintOutcome,
) {
    match outcome {
        Ok(PrintCompletion::Requested) => {
            log::info!(target: LOG_TARGET, "simple print to {printer} handed to the platform dialog");
        }
        Ok(PrintCompletion::Finished) => {
            log::info!(target: LOG_TARGET, "simple print to {printer} completed");
            dialogs.show(
                Some(parent),
                MessageDialog::info("Print", "Simple Print Completed!"),
            );
        }
        Err(failure) => {
            log::error!(target: LOG_TARGET, "simple print to {printer} failed: {failure}");
            dialogs.show(
                Some(parent),
                MessageDialog::error("Print Failed", format!("Print failed: {failure}")),
            );
        }
    }
}

/// Errors produced while setting up a print.
#[derive(Debug, Error)]
pub enum PrintError {
    /// Spool file could not be written.
    #[error("spool write failed at {path}: {source}")]
    Spool {
        /// Spool file or directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Hidden window could not be created or loaded.
    #[error("print window failure: {0}")]
    Window(String),
    /// Document could not be encoded.
    #[error("print document failure: {0}")]
    Document(#[from] CoreError),
    /// Dispatch worker thread could not be started.
    #[error("dispatch worker failed to start: {0}")]
    Worker(io::Error),
}
