//! Integration tests for the dispatch worker thread.

mod common;

use std::sync::Arc;

use common::{FakeHost, RecordingDialogs};
use dashprint_core::{BridgeMessage, PrinterTarget};
use dashprint_print::{DispatchWorker, DisposalPolicy};

#[test]
fn dispatch_worker_tests_process_every_message_before_shutdown() {
    let host = FakeHost::with_primary();
    let dialogs = Arc::new(RecordingDialogs::default());
    let dispatcher = common::dispatcher(
        &host,
        &dialogs,
        common::unique_spool("worker"),
        DisposalPolicy::default(),
    );

    let worker = DispatchWorker::spawn(dispatcher).expect("worker should start");
    let sender = worker.sender();
    for _ in 0..4 {
        sender
            .send(BridgeMessage::Print {
                printer: PrinterTarget::named("HP-LaserJet"),
            })
            .expect("worker should accept messages");
    }
    drop(sender);
    worker.shutdown();

    assert_eq!(host.printed.lock().expect("printed lock").len(), 4);
    assert_eq!(dialogs.shown.lock().expect("dialog lock").len(), 4);
}
