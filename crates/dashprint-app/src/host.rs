//! Tauri-backed implementations of the window, print and dialog seams.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashprint_app::{MAIN_WINDOW_LABEL, PRODUCT_NAME};
use dashprint_core::{DocumentSource, PrintOptions, WindowId};
use dashprint_print::{
    LoadCallback, PrintCallback, PrintCompletion, PrintError, PrintFailure, PrintHost,
};
use dashprint_ui::{ChoiceCallback, DialogKind, DialogPresenter, MessageDialog, WindowHost};
use tauri::webview::PageLoadEvent;
use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use tauri_plugin_dialog::{DialogExt, MessageDialogBuilder, MessageDialogButtons, MessageDialogKind};

const LOG_TARGET: &str = "dashprint::host";

/// Window registry, print facility and dialog presenter over one app handle.
pub struct TauriHost {
    app: AppHandle,
    next_job: AtomicU64,
}

impl TauriHost {
    pub fn new(app: AppHandle) -> Self {
        Self {
            app,
            next_job: AtomicU64::new(1),
        }
    }

    fn window(&self, id: &WindowId) -> Option<WebviewWindow> {
        self.app.get_webview_window(id.as_str())
    }

    fn message(&self, parent: Option<&WindowId>, dialog: &MessageDialog) -> MessageDialogBuilder<tauri::Wry> {
        let kind = match dialog.kind {
            DialogKind::Info => MessageDialogKind::Info,
            DialogKind::Warning => MessageDialogKind::Warning,
            DialogKind::Error => MessageDialogKind::Error,
        };
        let buttons = match dialog.buttons.as_slice() {
            [] => MessageDialogButtons::Ok,
            [only] => MessageDialogButtons::OkCustom(only.clone()),
            [first, second, rest @ ..] => {
                if !rest.is_empty() {
                    log::warn!(
                        target: LOG_TARGET,
                        "dialog '{}' has {} buttons; only two are shown",
                        dialog.title,
                        dialog.buttons.len()
                    );
                }
                MessageDialogButtons::OkCancelCustom(first.clone(), second.clone())
            }
        };

        let mut builder = self
            .app
            .dialog()
            .message(dialog.body())
            .title(dialog.title.clone())
            .kind(kind)
            .buttons(buttons);
        if let Some(window) = parent.and_then(|id| self.window(id)) {
            builder = builder.parent(&window);
        }
        builder
    }
}

impl WindowHost for TauriHost {
    fn primary_window(&self) -> Option<WindowId> {
        self.app
            .get_webview_window(MAIN_WINDOW_LABEL)
            .map(|window| WindowId::new(window.label()))
    }

    fn is_focused(&self, window: &WindowId) -> bool {
        self.window(window)
            .and_then(|window| window.is_focused().ok())
            .unwrap_or(false)
    }

    fn destroy_window(&self, window: &WindowId) {
        let Some(handle) = self.window(window) else {
            return;
        };
        if let Err(error) = handle.destroy() {
            log::error!(target: LOG_TARGET, "window {window} could not be destroyed: {error}");
        }
    }
}

impl PrintHost for TauriHost {
    fn print_window(&self, window: &WindowId, options: PrintOptions, done: PrintCallback) {
        let Some(handle) = self.window(window) else {
            done(Err(PrintFailure(format!("window {window} is closed"))));
            return;
        };

        if options.silent {
            print_silently(&handle, options, done);
            return;
        }

        request_print_dialog(&handle, done);
    }

    fn open_hidden_window(
        &self,
        document: &DocumentSource,
        on_loaded: LoadCallback,
    ) -> Result<WindowId, PrintError> {
        let url = document.to_url()?;
        let label = format!("print-job-{}", self.next_job.fetch_add(1, Ordering::Relaxed));
        let pending = Arc::new(Mutex::new(Some(on_loaded)));

        let window = WebviewWindowBuilder::new(&self.app, &label, WebviewUrl::External(url))
            .title(format!("{PRODUCT_NAME} print job"))
            .visible(false)
            .focused(false)
            .skip_taskbar(true)
            .on_page_load(move |window, payload| {
                if payload.event() != PageLoadEvent::Finished {
                    return;
                }
                let callback = pending
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                if let Some(callback) = callback {
                    callback(WindowId::new(window.label()));
                }
            })
            .build()
            .map_err(|error| PrintError::Window(error.to_string()))?;

        Ok(WindowId::new(window.label()))
    }
}

impl DialogPresenter for TauriHost {
    fn show(&self, parent: Option<&WindowId>, dialog: MessageDialog) {
        log::debug!(target: LOG_TARGET, "dialog '{}' shown", dialog.title);
        self.message(parent, &dialog).show(|_| {});
    }

    fn choose(&self, parent: Option<&WindowId>, dialog: MessageDialog, on_choice: ChoiceCallback) {
        log::debug!(target: LOG_TARGET, "choice dialog '{}' shown", dialog.title);
        self.message(parent, &dialog)
            .show(move |first| on_choice(if first { 0 } else { 1 }));
    }
}

#[cfg(windows)]
fn print_silently(window: &WebviewWindow, options: PrintOptions, done: PrintCallback) {
    let slot = Arc::new(Mutex::new(Some(done)));
    let fallback = Arc::clone(&slot);

    let scheduled = window.with_webview(move |webview| {
        if let Err(error) = webview2::print(&webview, &options, Arc::clone(&slot)) {
            finish(&slot, Err(PrintFailure(error.message().to_string())));
        }
    });
    if let Err(error) = scheduled {
        finish(&fallback, Err(PrintFailure(error.to_string())));
    }
}

#[cfg(not(windows))]
fn print_silently(window: &WebviewWindow, options: PrintOptions, done: PrintCallback) {
    log::warn!(
        target: LOG_TARGET,
        "silent printing to {} is unavailable on this platform; showing print dialog",
        options.printer
    );
    request_print_dialog(window, done);
}

/// Opens the platform print dialog. The webview reports no completion for
/// it, so the outcome is at most [`PrintCompletion::Requested`].
fn request_print_dialog(window: &WebviewWindow, done: PrintCallback) {
    match window.print() {
        Ok(()) => done(Ok(PrintCompletion::Requested)),
        Err(error) => done(Err(PrintFailure(error.to_string()))),
    }
}

#[cfg(windows)]
fn finish(slot: &Mutex<Option<PrintCallback>>, outcome: dashprint_print::PrintOutcome) {
    let callback = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(callback) = callback {
        callback(outcome);
    }
}

#[cfg(windows)]
mod webview2 {
    //! Silent printing through the WebView2 print API.

    use std::sync::{Arc, Mutex};

    use dashprint_core::PrintOptions;
    use dashprint_print::{PrintCallback, PrintCompletion, PrintFailure};
    use tauri::webview::PlatformWebview;
    use webview2_com::Microsoft::Web::WebView2::Win32::{
        COREWEBVIEW2_PRINT_STATUS_PRINTER_UNAVAILABLE, COREWEBVIEW2_PRINT_STATUS_SUCCEEDED,
        ICoreWebView2_16, ICoreWebView2Environment6, ICoreWebView2PrintSettings2,
    };
    use webview2_com::PrintCompletedHandler;
    use windows::core::{HSTRING, Interface};

    pub(super) fn print(
        webview: &PlatformWebview,
        options: &PrintOptions,
        slot: Arc<Mutex<Option<PrintCallback>>>,
    ) -> windows::core::Result<()> {
        // SAFETY: called on the UI thread that owns the WebView2 controller.
        unsafe {
            let core = webview
                .controller()
                .CoreWebView2()?
                .cast::<ICoreWebView2_16>()?;
            let settings = webview
                .environment()
                .cast::<ICoreWebView2Environment6>()?
                .CreatePrintSettings()?;
            settings.SetShouldPrintBackgrounds(options.print_background.into())?;
            if let Some(name) = options.printer.device_name() {
                settings
                    .cast::<ICoreWebView2PrintSettings2>()?
                    .SetPrinterName(&HSTRING::from(name))?;
            }

            let handler_slot = Arc::clone(&slot);
            let handler = PrintCompletedHandler::create(Box::new(move |result, status| {
                let outcome = match result {
                    Err(error) => Err(PrintFailure(error.message().to_string())),
                    Ok(()) if status == COREWEBVIEW2_PRINT_STATUS_SUCCEEDED => {
                        Ok(PrintCompletion::Finished)
                    }
                    Ok(()) if status == COREWEBVIEW2_PRINT_STATUS_PRINTER_UNAVAILABLE => {
                        Err(PrintFailure("printer unavailable".to_string()))
                    }
                    Ok(()) => Err(PrintFailure(format!("print status {}", status.0))),
                };
                super::finish(&handler_slot, outcome);
                Ok(())
            }));
            core.Print(&settings, &handler)
        }
    }
}
