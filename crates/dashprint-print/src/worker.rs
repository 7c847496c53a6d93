//! Dispatch worker thread owning the receiving end of the bridge channel.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use dashprint_core::BridgeMessage;

use crate::{Dispatched, LOG_TARGET, PrintDispatcher, PrintError};

/// Background thread draining forwarded messages in arrival order.
pub struct DispatchWorker {
    sender: Sender<BridgeMessage>,
    join: JoinHandle<()>,
}

impl DispatchWorker {
    /// Starts the worker thread.
    ///
    /// # Errors
    /// Returns [`PrintError::Worker`] when the OS refuses to spawn a thread.
    pub fn spawn(dispatcher: PrintDispatcher) -> Result<Self, PrintError> {
        let (sender, receiver) = mpsc::channel();
        let join = thread::Builder::new()
            .name("dashprint-dispatch".to_string())
            .spawn(move || run(&dispatcher, receiver))
            .map_err(PrintError::Worker)?;

        log::info!(target: LOG_TARGET, "dispatch worker started");
        Ok(Self { sender, join })
    }

    /// Returns a sender the bridge can forward into.
    pub fn sender(&self) -> Sender<BridgeMessage> {
        self.sender.clone()
    }

    /// Drops the worker's own sender and waits for the thread to drain.
    ///
    /// Blocks until every sender handed out by [`Self::sender`] is dropped.
    pub fn shutdown(self) {
        drop(self.sender);
        if self.join.join().is_err() {
            log::error!(target: LOG_TARGET, "dispatch worker panicked");
        } else {
            log::info!(target: LOG_TARGET, "dispatch worker joined");
        }
    }
}

fn run(dispatcher: &PrintDispatcher, receiver: Receiver<BridgeMessage>) {
    for message in receiver {
        let channel = message.channel();
        match dispatcher.dispatch(message) {
            Ok(Dispatched::Submitted) => {
                log::debug!(target: LOG_TARGET, "{channel} message submitted");
            }
            Ok(Dispatched::Dropped) => {
                log::debug!(target: LOG_TARGET, "{channel} message dropped");
            }
            Err(error) => {
                log::error!(target: LOG_TARGET, "{channel} message failed: {error}");
            }
        }
    }
}
