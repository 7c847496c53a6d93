#![warn(missing_docs)]
//! # dashprint-bridge
//!
//! ## Purpose
//! Implements the capability-scoped bridge between the untrusted remote
//! dashboard page and the privileged print host.
//!
//! ## Responsibilities
//! - Enumerate the fixed set of page-callable capabilities.
//! - Turn page calls into one-way [`BridgeMessage`] values.
//! - Forward messages through an injectable [`MessageSink`].
//! - Provide the page-side initialization script that publishes the API.
//!
//! ## Data flow
//! Page calls `electronAPI.print(...)` -> initialization script invokes the
//! matching host command -> [`PrintBridge`] coerces arguments and sends
//! messages to the sink -> dispatch worker consumes them.
//!
//! ## Ownership and lifetimes
//! The bridge owns only its sink. It never holds a window handle and never
//! sees print outcomes.
//!
//! ## Error model
//! Sink failures surface as [`BridgeError`] to host code and are logged; the
//! page receives no return value and no error channel.
//!
//! ## Security and privacy notes
//! The page can request prints but cannot observe outcomes or reach any
//! other host capability. Payload contents are not logged.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, mpsc};
//!
//! use dashprint_bridge::PrintBridge;
//! use serde_json::json;
//!
//! let (tx, rx) = mpsc::channel();
//! let bridge = PrintBridge::new(Arc::new(tx));
//! bridge.print(&json!("HP-LaserJet"), &json!(2));
//! assert_eq!(rx.try_iter().count(), 2);
//! ```

use std::sync::Arc;
use std::sync::mpsc::Sender;

use dashprint_core::{BridgeMessage, PrinterTarget, copies_from_value, payload_digest};
use serde_json::Value;
use thiserror::Error;

/// Global name under which the page-side API is published.
pub const BRIDGE_GLOBAL: &str = "electronAPI";

const LOG_TARGET: &str = "dashprint::bridge";

/// Capabilities the page may call. Nothing else is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeCapability {
    /// `print(printerId, copies)`.
    Print,
    /// `printHtmlContent(html, printerId)`.
    PrintHtmlContent,
    /// `printBytes(bytes, printerId)`.
    PrintBytes,
}

impl BridgeCapability {
    /// Every capability, in declaration order.
    pub const ALL: [Self; 3] = [Self::Print, Self::PrintHtmlContent, Self::PrintBytes];

    /// Method name on the page-side API object.
    pub fn page_method(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::PrintHtmlContent => "printHtmlContent",
            Self::PrintBytes => "printBytes",
        }
    }

    /// Host command invoked by the page-side method.
    pub fn command(self) -> &'static str {
        match self {
            Self::Print => "bridge_print",
            Self::PrintHtmlContent => "bridge_print_html_content",
            Self::PrintBytes => "bridge_print_bytes",
        }
    }

    /// Permission identifier granting the host command.
    pub fn permission(self) -> String {
        format!("allow-{}", self.command().replace('_', "-"))
    }
}

/// One-way channel towards the privileged host.
pub trait MessageSink: Send + Sync {
    /// Forwards one message without waiting for it to be handled.
    ///
    /// # Errors
    /// Returns [`BridgeError::Disconnected`] when the receiving side is gone.
    fn send(&self, message: BridgeMessage) -> Result<(), BridgeError>;
}

impl MessageSink for Sender<BridgeMessage> {
    fn send(&self, message: BridgeMessage) -> Result<(), BridgeError> {
        Sender::send(self, message).map_err(|_| BridgeError::Disconnected)
    }
}

/// Host-side half of the bridge surface.
#[derive(Clone)]
pub struct PrintBridge {
    sink: Arc<dyn MessageSink>,
}

impl PrintBridge {
    /// Creates a bridge forwarding into `sink`.
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self { sink }
    }

    /// Forwards one simple-print message per copy.
    ///
    /// A non-numeric, zero or negative `copies` forwards nothing. Returns the
    /// number of messages forwarded.
    pub fn print(&self, printer: &Value, copies: &Value) -> usize {
        let printer = PrinterTarget::from_value(printer);
        let count = copies_from_value(copies);
        log::info!(target: LOG_TARGET, "print requested printer={printer} copies={count}");

        if count == 0 {
            log::debug!(target: LOG_TARGET, "print ignored: copies={copies} yields no messages");
            return 0;
        }

        let mut forwarded = 0;
        for _ in 0..count {
            let message = BridgeMessage::Print {
                printer: printer.clone(),
            };
            if !self.forward(message) {
                break;
            }
            forwarded += 1;
        }
        forwarded
    }

    /// Forwards an HTML document print as a single message.
    pub fn print_html_content(&self, html: String, printer: &Value) -> bool {
        let printer = PrinterTarget::from_value(printer);
        log::info!(
            target: LOG_TARGET,
            "printHtmlContent requested printer={printer} html_len={} digest={}",
            html.len(),
            payload_digest(html.as_bytes())
        );
        self.forward(BridgeMessage::PrintHtmlContent { html, printer })
    }

    /// Forwards a byte payload print as a single message.
    pub fn print_bytes(&self, bytes: Vec<u8>, printer: &Value) -> bool {
        let printer = PrinterTarget::from_value(printer);
        log::info!(
            target: LOG_TARGET,
            "printBytes requested printer={printer} byte_len={} digest={}",
            bytes.len(),
            payload_digest(&bytes)
        );
        self.forward(BridgeMessage::PrintBytes { bytes, printer })
    }

    fn forward(&self, message: BridgeMessage) -> bool {
        let channel = message.channel();
        match self.sink.send(message) {
            Ok(()) => true,
            Err(error) => {
                log::error!(target: LOG_TARGET, "forward on channel {channel} failed: {error}");
                false
            }
        }
    }
}

/// Builds the script injected into the remote page before it loads.
///
/// The script publishes a frozen object under `global_name` exposing exactly
/// the [`BridgeCapability`] methods. Every method returns `undefined` and
/// swallows transport errors.
pub fn initialization_script(global_name: &str) -> String {
    let mut methods = String::new();
    for capability in BridgeCapability::ALL {
        let args = match capability {
            BridgeCapability::Print => "(printerName, copies) => send(\"{cmd}\", { printerName: printerName ?? null, copies: copies ?? null })",
            BridgeCapability::PrintHtmlContent => "(html, printerName) => send(\"{cmd}\", { html: String(html ?? \"\"), printerName: printerName ?? null })",
            BridgeCapability::PrintBytes => "(bytes, printerName) => send(\"{cmd}\", { bytes: toByteArray(bytes), printerName: printerName ?? null })",
        };
        methods.push_str(&format!(
            "    {}: {},\n",
            capability.page_method(),
            args.replace("{cmd}", capability.command())
        ));
    }

    format!(
        r#"(function () {{
  "use strict";
  const internals = window.__TAURI_INTERNALS__;
  if (!internals || typeof internals.invoke !== "function") {{
    return;
  }}
  const send = (command, args) => {{
    internals.invoke(command, args).catch(() => {{}});
  }};
  const toByteArray = (input) => {{
    if (input == null) return [];
    if (typeof input === "string") return Array.from(new TextEncoder().encode(input));
    if (input instanceof ArrayBuffer) return Array.from(new Uint8Array(input));
    if (ArrayBuffer.isView(input)) {{
      return Array.from(new Uint8Array(input.buffer, input.byteOffset, input.byteLength));
    }}
    return Array.from(input, (value) => Number(value) & 0xff);
  }};
  const api = Object.freeze({{
{methods}  }});
  Object.defineProperty(window, "{global_name}", {{
    value: api,
    writable: false,
    configurable: false,
  }});
}})();
"#
    )
}

/// Errors produced while forwarding bridge messages.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The dispatcher side of the channel has shut down.
    #[error("print dispatcher is not accepting messages")]
    Disconnected,
}
