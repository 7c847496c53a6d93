#![warn(missing_docs)]
//! # dashprint-ui
//!
//! ## Purpose
//! Defines the host-side presentation model for `dashprint`.
//!
//! ## Responsibilities
//! - Describe modal dialogs independently of the native dialog toolkit.
//! - Define the seams through which components reach dialogs and windows.
//! - Describe the two-menu application menu and the About dialog.
//!
//! ## Data flow
//! Print and update components build [`MessageDialog`] values and hand them
//! to a [`DialogPresenter`]. The desktop shell renders them natively and
//! routes menu clicks back through [`MenuAction`].
//!
//! ## Ownership and lifetimes
//! Dialogs own their strings so they can be queued onto the UI thread.
//! Seams are `Send + Sync` trait objects shared behind `Arc`.
//!
//! ## Error model
//! This crate favors explicit values over recoverable errors. Unknown menu
//! ids map to `None`.
//!
//! ## Security and privacy notes
//! Dialog text never includes print payloads.

use dashprint_core::WindowId;

/// Severity icon of a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    /// Informational message.
    Info,
    /// Warning message.
    Warning,
    /// Error message.
    Error,
}

/// Whether the dialog waits for the user before the flow continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    /// The flow waits for the dialog to be dismissed.
    Blocking,
    /// Shown for information; nothing waits on it.
    NonBlocking,
}

/// Toolkit-independent message box description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDialog {
    /// Severity icon.
    pub kind: DialogKind,
    /// Window title.
    pub title: String,
    /// Main message.
    pub message: String,
    /// Secondary text shown under the message.
    pub detail: Option<String>,
    /// Button labels; empty means a single default `OK`.
    pub buttons: Vec<String>,
    /// Blocking behaviour.
    pub modality: Modality,
}

impl MessageDialog {
    /// Creates a blocking informational dialog.
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Info, title, message)
    }

    /// Creates a blocking error dialog.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DialogKind::Error, title, message)
    }

    fn new(kind: DialogKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            detail: None,
            buttons: Vec::new(),
            modality: Modality::Blocking,
        }
    }

    /// Adds secondary text.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Replaces the button labels.
    pub fn with_buttons<I, S>(mut self, buttons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.buttons = buttons.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the dialog as non-blocking.
    pub fn non_blocking(mut self) -> Self {
        self.modality = Modality::NonBlocking;
        self
    }

    /// Message and detail joined for toolkits without a detail field.
    pub fn body(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{}\n\n{detail}", self.message),
            None => self.message.clone(),
        }
    }
}

/// Callback receiving the index of the button the user picked.
pub type ChoiceCallback = Box<dyn FnOnce(usize) + Send + 'static>;

/// Renders dialogs on behalf of host components.
pub trait DialogPresenter: Send + Sync {
    /// Shows a message; the caller does not observe dismissal.
    fn show(&self, parent: Option<&WindowId>, dialog: MessageDialog);

    /// Shows a dialog with buttons and reports the chosen index.
    fn choose(&self, parent: Option<&WindowId>, dialog: MessageDialog, on_choice: ChoiceCallback);
}

/// Host window registry visible to components.
pub trait WindowHost: Send + Sync {
    /// Returns the primary window when it is alive.
    fn primary_window(&self) -> Option<WindowId>;

    /// Returns `true` when the window currently has input focus.
    fn is_focused(&self, window: &WindowId) -> bool;

    /// Destroys a window and releases its resources.
    fn destroy_window(&self, window: &WindowId);
}

/// Actions reachable from the application menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// File -> Exit.
    Exit,
    /// Help -> Check for Updates.
    CheckForUpdates,
    /// Help -> About.
    About,
}

impl MenuAction {
    /// Stable menu item id.
    pub fn id(self) -> &'static str {
        match self {
            Self::Exit => "file.exit",
            Self::CheckForUpdates => "help.check_updates",
            Self::About => "help.about",
        }
    }

    /// Resolves a menu item id back into an action.
    pub fn from_id(id: &str) -> Option<Self> {
        [Self::Exit, Self::CheckForUpdates, Self::About]
            .into_iter()
            .find(|action| action.id() == id)
    }
}

/// One clickable menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    /// Action fired on click.
    pub action: MenuAction,
    /// Visible label.
    pub label: &'static str,
    /// Optional keyboard accelerator.
    pub accelerator: Option<&'static str>,
}

/// One top-level menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submenu {
    /// Visible label.
    pub label: &'static str,
    /// Entries in display order.
    pub entries: Vec<MenuEntry>,
}

/// Returns the application menu: File -> Exit, Help -> updates + About.
pub fn menu_template() -> Vec<Submenu> {
    vec![
        Submenu {
            label: "File",
            entries: vec![MenuEntry {
                action: MenuAction::Exit,
                label: "Exit",
                accelerator: Some("Alt+F4"),
            }],
        },
        Submenu {
            label: "Help",
            entries: vec![
                MenuEntry {
                    action: MenuAction::CheckForUpdates,
                    label: "Check for Updates",
                    accelerator: None,
                },
                MenuEntry {
                    action: MenuAction::About,
                    label: "About",
                    accelerator: None,
                },
            ],
        },
    ]
}

/// Static package metadata shown by Help -> About.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AboutInfo {
    /// Product name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Package author(s).
    pub author: String,
    /// Package description.
    pub description: String,
}

impl AboutInfo {
    /// Builds the About dialog.
    pub fn dialog(&self) -> MessageDialog {
        MessageDialog::info("About", self.name.clone())
            .with_detail(format!(
                "Version: {}\nAuthor: {}\nDescription: {}",
                self.version, self.author, self.description
            ))
            .with_buttons(["OK"])
    }
}
