#![warn(missing_docs)]
//! # dashprint-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `dashprint` workspace.
//!
//! ## Responsibilities
//! - Identify host windows and target printers.
//! - Describe the one-way messages the bridge forwards to the host.
//! - Fix the print profile used by each message kind.
//! - Coerce page-supplied copy counts and encode inline HTML documents.
//!
//! ## Data flow
//! The bridge turns page calls into [`BridgeMessage`] values. The print
//! dispatcher resolves each message into a [`DocumentSource`] plus the
//! [`PrintOptions`] of its [`PrintProfile`] and hands both to the host.
//!
//! ## Ownership and lifetimes
//! Messages own their payloads (`String`, `Vec<u8>`) so they can cross the
//! channel between the bridge and the dispatch worker without borrowing.
//!
//! ## Error model
//! Encoding and decoding failures return [`CoreError`].
//!
//! ## Security and privacy notes
//! Payload contents are never formatted into log lines; use
//! [`payload_digest`] to refer to a payload in diagnostics.
//!
//! ## Example
//! ```rust
//! use dashprint_core::{BridgeMessage, PrinterTarget, copies_from_value};
//!
//! let copies = copies_from_value(&serde_json::json!("3"));
//! assert_eq!(copies, 3);
//! let message = BridgeMessage::Print { printer: PrinterTarget::named("HP-LaserJet") };
//! assert_eq!(message.channel(), "print");
//! ```

use std::fmt;
use std::path::PathBuf;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

/// Characters escaped by JavaScript `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Opaque identifier of one host window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(String);

impl WindowId {
    /// Wraps a host window label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the host window label.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Printer a request is routed to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrinterTarget(Option<String>);

impl PrinterTarget {
    /// Targets the printer with the given device name.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.trim().is_empty() {
            return Self(None);
        }
        Self(Some(name))
    }

    /// Targets the system default printer.
    pub fn system_default() -> Self {
        Self(None)
    }

    /// Interprets a page-supplied printer id.
    ///
    /// Only a non-blank string names a printer; every other value falls back
    /// to the system default.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(name) => Self::named(name.clone()),
            _ => Self::system_default(),
        }
    }

    /// Returns the device name, `None` for the system default.
    pub fn device_name(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Display for PrinterTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(name) => f.write_str(name),
            None => f.write_str("<system default>"),
        }
    }
}

/// One-way message forwarded from the bridge to the privileged host.
///
/// The serialized form carries the channel name in a `channel` tag so the
/// wire shape matches the three host channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "kebab-case")]
pub enum BridgeMessage {
    /// Print the primary window's current content.
    Print {
        /// Target printer.
        #[serde(rename = "printerName")]
        printer: PrinterTarget,
    },
    /// Print an inline HTML document in a hidden window.
    PrintHtmlContent {
        /// Full HTML markup, unmodified.
        html: String,
        /// Target printer.
        #[serde(rename = "printerName")]
        printer: PrinterTarget,
    },
    /// Print a byte payload after spooling it to disk.
    PrintBytes {
        /// Raw payload bytes, unmodified.
        bytes: Vec<u8>,
        /// Target printer.
        #[serde(rename = "printerName")]
        printer: PrinterTarget,
    },
}

impl BridgeMessage {
    /// Returns the host channel this message travels on.
    pub fn channel(&self) -> &'static str {
        match self {
            Self::Print { .. } => "print",
            Self::PrintHtmlContent { .. } => "print-html-content",
            Self::PrintBytes { .. } => "print-bytes",
        }
    }

    /// Returns the printer this message targets.
    pub fn printer(&self) -> &PrinterTarget {
        match self {
            Self::Print { printer }
            | Self::PrintHtmlContent { printer, .. }
            | Self::PrintBytes { printer, .. } => printer,
        }
    }

    /// Returns the print profile used for this message kind.
    pub fn profile(&self) -> PrintProfile {
        match self {
            Self::Print { .. } => PrintProfile::Simple,
            Self::PrintHtmlContent { .. } => PrintProfile::HtmlContent,
            Self::PrintBytes { .. } => PrintProfile::ByteContent,
        }
    }

    /// Serializes the message to compact JSON bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(self).map_err(CoreError::Codec)
    }

    /// Deserializes a message from JSON bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON decoding fails.
    pub fn from_json_bytes(raw: &[u8]) -> Result<Self, CoreError> {
        serde_json::from_slice(raw).map_err(CoreError::Codec)
    }
}

/// Fixed print configuration per message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintProfile {
    /// Primary window print: silent, with background graphics.
    Simple,
    /// Inline HTML print: system dialog, without background graphics.
    HtmlContent,
    /// Spooled bytes print: silent, with background graphics.
    ByteContent,
}

impl PrintProfile {
    /// Builds the concrete options for one print call.
    pub fn options(self, printer: PrinterTarget) -> PrintOptions {
        let (silent, print_background) = match self {
            Self::Simple | Self::ByteContent => (true, true),
            Self::HtmlContent => (false, false),
        };

        PrintOptions {
            silent,
            print_background,
            printer,
        }
    }
}

/// Options handed to the native print facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// Skip the system print dialog.
    pub silent: bool,
    /// Include background colors and images.
    pub print_background: bool,
    /// Target printer.
    pub printer: PrinterTarget,
}

/// Document loaded into a hidden print window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Inline document addressed by a `data:` URL.
    DataUrl(Url),
    /// Document read from a local file.
    File(PathBuf),
}

impl DocumentSource {
    /// Builds an inline `text/html` document from markup.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDocumentUrl`] when the encoded URL does
    /// not parse.
    pub fn inline_html(html: &str) -> Result<Self, CoreError> {
        let raw = html_data_url(html);
        let url = Url::parse(&raw)
            .map_err(|error| CoreError::InvalidDocumentUrl(error.to_string()))?;
        Ok(Self::DataUrl(url))
    }

    /// Returns the URL a webview should navigate to.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDocumentUrl`] for relative file paths.
    pub fn to_url(&self) -> Result<Url, CoreError> {
        match self {
            Self::DataUrl(url) => Ok(url.clone()),
            Self::File(path) => Url::from_file_path(path).map_err(|()| {
                CoreError::InvalidDocumentUrl(format!(
                    "spool path is not absolute: {}",
                    path.display()
                ))
            }),
        }
    }
}

/// Encodes markup as a `data:text/html` URL the way `encodeURIComponent`
/// would.
pub fn html_data_url(html: &str) -> String {
    format!(
        "data:text/html;charset=utf-8,{}",
        utf8_percent_encode(html, URI_COMPONENT)
    )
}

/// Converts a page-supplied copy count into a message count.
///
/// # Semantics
/// Mirrors `Number(value)` followed by `floor`: numbers as-is, trimmed
/// numeric strings (empty string is zero), booleans as 1/0, `[]` as zero and
/// a one-element array as its element's string form. `null`, objects, longer
/// arrays, NaN, infinities and negatives yield zero.
pub fn copies_from_value(value: &Value) -> usize {
    copies_from_f64(js_number(value))
}

fn js_number(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(flag) => f64::from(u8::from(*flag)),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            // Arrays convert through their joined string: `[null]` is "" and
            // `[true]` is "true".
            [Value::Null] => 0.0,
            [Value::Bool(_)] | [Value::Object(_)] => f64::NAN,
            [only] => js_number(only),
            _ => f64::NAN,
        },
        Value::Null | Value::Object(_) => f64::NAN,
    }
}

/// Floors a numeric copy count; anything below one yields zero.
pub fn copies_from_f64(number: f64) -> usize {
    if !number.is_finite() || number < 1.0 {
        return 0;
    }
    number.floor() as usize
}

/// Short SHA-256 digest used to refer to payloads in log lines.
pub fn payload_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..8])
}

/// Error type for core model encoding failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A document URL could not be built.
    #[error("invalid document url: {0}")]
    InvalidDocumentUrl(String),
    /// JSON encoding/decoding error.
    #[error("message codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    //! Unit tests for copy coercion and profile options.

    use serde_json::json;

    use super::*;

    #[test]
    fn copies_follow_number_then_floor() {
        assert_eq!(copies_from_value(&json!(3)), 3);
        assert_eq!(copies_from_value(&json!(2.9)), 2);
        assert_eq!(copies_from_value(&json!(" 4 ")), 4);
        assert_eq!(copies_from_value(&json!("")), 0);
        assert_eq!(copies_from_value(&json!("two")), 0);
        assert_eq!(copies_from_value(&json!(true)), 1);
        assert_eq!(copies_from_value(&json!(null)), 0);
        assert_eq!(copies_from_value(&json!(-5)), 0);
        assert_eq!(copies_from_value(&json!(0)), 0);
    }

    #[test]
    fn arrays_convert_like_their_string_form() {
        assert_eq!(copies_from_value(&json!([2])), 2);
        assert_eq!(copies_from_value(&json!(["3.7"])), 3);
        assert_eq!(copies_from_value(&json!([[4]])), 4);
        assert_eq!(copies_from_value(&json!([])), 0);
        assert_eq!(copies_from_value(&json!([null])), 0);
        assert_eq!(copies_from_value(&json!([true])), 0);
        assert_eq!(copies_from_value(&json!([1, 2])), 0);
    }

    #[test]
    fn large_counts_are_floored_not_limited() {
        assert_eq!(copies_from_f64(1500.0), 1500);
        assert_eq!(copies_from_f64(1e6 + 0.5), 1_000_000);
        assert_eq!(copies_from_f64(f64::INFINITY), 0);
        assert_eq!(copies_from_f64(f64::NAN), 0);
    }

    #[test]
    fn profiles_fix_silent_and_background_flags() {
        let simple = PrintProfile::Simple.options(PrinterTarget::named("P1"));
        assert!(simple.silent && simple.print_background);

        let html = PrintProfile::HtmlContent.options(PrinterTarget::named("P1"));
        assert!(!html.silent && !html.print_background);

        let bytes = PrintProfile::ByteContent.options(PrinterTarget::system_default());
        assert!(bytes.silent && bytes.print_background);
        assert_eq!(bytes.printer.device_name(), None);
    }

    #[test]
    fn blank_printer_name_means_system_default() {
        assert_eq!(PrinterTarget::named("  "), PrinterTarget::system_default());
        assert_eq!(
            PrinterTarget::from_value(&json!(42)),
            PrinterTarget::system_default()
        );
    }
}
