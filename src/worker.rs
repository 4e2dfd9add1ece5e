//! Background execution of one annotation run, used by the desktop shell.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::config::Config;
use crate::errors::Result;
use crate::progress::{AnnotationEvent, RunStatus};
use crate::traits::ObjectDetector;
use crate::Annotator;

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerMessage {
    Event(AnnotationEvent),
    Failed(String),
}

/// Loads a detector and runs the annotation loop on a new thread.
///
/// Progress is sent over `tx`; `notify` is called after every message so the
/// receiving side can wake up (the GUI requests a repaint). The first error
/// ends the run with a single `WorkerMessage::Failed`.
pub fn spawn_worker<D, L, N>(
    config: Config,
    load: L,
    tx: Sender<WorkerMessage>,
    notify: N,
) -> JoinHandle<()>
where
    D: ObjectDetector + 'static,
    L: FnOnce(&Config) -> Result<D> + Send + 'static,
    N: Fn() + Send + 'static,
{
    thread::spawn(move || {
        let send = |message: WorkerMessage| {
            // receiver gone means the window closed; nothing left to report to
            let _ = tx.send(message);
            notify();
        };

        let result = load(&config).and_then(|detector| {
            Annotator::new(detector, config)
                .process_directory_with_progress(|event| send(WorkerMessage::Event(event)))
        });

        match result {
            Ok(processed) => log::info!("annotation run finished, {} images", processed),
            Err(e) => {
                let message = format!("{:#}", anyhow::Error::from(e));
                log::error!("annotation run failed: {}", message);
                send(WorkerMessage::Failed(message));
            }
        }
    })
}

/// Applies every pending worker message to `status`.
///
/// Returns whether the receiver should be kept for the next poll. A worker
/// that hangs up before reporting completion or failure (a panic in the model
/// runtime, for instance) fails the run instead of leaving it running forever.
pub fn drain_messages(status: &mut RunStatus, rx: &Receiver<WorkerMessage>) -> bool {
    loop {
        match rx.try_recv() {
            Ok(WorkerMessage::Event(event)) => status.apply(&event),
            Ok(WorkerMessage::Failed(message)) => status.fail(message),
            Err(TryRecvError::Empty) => return status.running,
            Err(TryRecvError::Disconnected) => {
                if status.running {
                    log::error!("annotation worker exited without reporting a result");
                    status.fail("annotation worker stopped unexpectedly");
                }
                return false;
            }
        }
    }
}
