//! Integration tests for primary-window printing and its outcome dialogs.

mod common;

use std::sync::Arc;

use common::{FakeHost, PrintBehavior, RecordingDialogs};
use dashprint_core::{BridgeMessage, PrinterTarget};
use dashprint_print::{Dispatched, DisposalPolicy};
use dashprint_ui::DialogKind;

fn simple(printer: &str) -> BridgeMessage {
    BridgeMessage::Print {
        printer: PrinterTarget::named(printer),
    }
}

#[test]
fn simple_print_tests_success_shows_exactly_one_confirmation() {
    let host = FakeHost::with_primary();
    let dialogs = Arc::new(RecordingDialogs::default());
    let dispatcher = common::dispatcher(
        &host,
        &dialogs,
        common::unique_spool("simple-ok"),
        DisposalPolicy::default(),
    );

    let result = dispatcher.dispatch(simple("HP-LaserJet")).expect("dispatch");
    assert_eq!(result, Dispatched::Submitted);

    let printed = host.printed.lock().expect("printed lock");
    assert_eq!(printed.len(), 1);
    let (window, options) = &printed[0];
    assert_eq!(window.as_str(), "main");
    assert!(options.silent);
    assert!(options.print_background);
    assert_eq!(options.printer.device_name(), Some("HP-LaserJet"));

    let shown = dialogs.shown.lock().expect("dialog lock");
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].1.kind, DialogKind::Info);
    assert_eq!(shown[0].1.message, "Simple Print Completed!");
    assert_eq!(shown[0].0.as_ref().map(|id| id.as_str()), Some("main"));
}

#[test]
fn simple_print_tests_failure_names_the_reason() {
    let host = FakeHost::with_primary();
    host.set_behavior(PrintBehavior::Fail("invalidDeviceName".to_string()));
    let dialogs = Arc::new(RecordingDialogs::default());
    let dispatcher = common::dispatcher(
        &host,
        &dialogs,
        common::unique_spool("simple-fail"),
        DisposalPolicy::default(),
    );

    dispatcher.dispatch(simple("Nope")).expect("dispatch");

    let shown = dialogs.shown.lock().expect("dialog lock");
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].1.kind, DialogKind::Error);
    assert_eq!(shown[0].1.title, "Print Failed");
    assert_eq!(shown[0].1.message, "Print failed: invalidDeviceName");
}

#[test]
fn simple_print_tests_without_primary_window_drop_silently() {
    let host = FakeHost::without_primary();
    let dialogs = Arc::new(RecordingDialogs::default());
    let dispatcher = common::dispatcher(
        &host,
        &dialogs,
        common::unique_spool("simple-none"),
        DisposalPolicy::default(),
    );

    let result = dispatcher.dispatch(simple("HP-LaserJet")).expect("dispatch");

    assert_eq!(result, Dispatched::Dropped);
    assert!(host.printed.lock().expect("printed lock").is_empty());
    assert!(dialogs.shown.lock().expect("dialog lock").is_empty());
}

#[test]
fn simple_print_tests_dialog_only_print_claims_no_completion() {
    let host = FakeHost::with_primary();
    host.set_behavior(PrintBehavior::RequestOnly);
    let dialogs = Arc::new(RecordingDialogs::default());
    let dispatcher = common::dispatcher(
        &host,
        &dialogs,
        common::unique_spool("simple-requested"),
        DisposalPolicy::default(),
    );

    let result = dispatcher.dispatch(simple("HP-LaserJet")).expect("dispatch");

    assert_eq!(result, Dispatched::Submitted);
    assert_eq!(host.printed.lock().expect("printed lock").len(), 1);
    assert!(dialogs.shown.lock().expect("dialog lock").is_empty());
    assert!(host.destroyed.lock().expect("destroyed lock").is_empty());
}
