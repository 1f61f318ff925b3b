//! Single-worker callback delivery executor.
//!
//! Session callbacks arrive from one dedicated worker thread: one callback
//! in flight at a time process-wide, in submission order, exactly like the
//! platform's single-thread delivery queue. Backends enqueue closures here
//! instead of invoking the registry inline.

use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce() + Send>;

/// A FIFO executor backed by a single worker thread.
///
/// Jobs submitted after the executor is dropped are discarded. Dropping the
/// executor lets the worker drain its queue and exit.
pub struct SerialExecutor {
    tx: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl SerialExecutor {
    /// Spawn the worker thread.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        let worker = std::thread::Builder::new()
            .name("ranging-callbacks".into())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    job();
                }
            })
            .unwrap_or_else(|e| panic!("failed to spawn callback worker: {}", e));

        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Enqueue a job for serial execution.
    ///
    /// Returns false if the worker has shut down.
    pub fn execute(&self, job: impl FnOnce() + Send + 'static) -> bool {
        match &self.tx {
            Some(tx) => tx.send(Box::new(job)).is_ok(),
            None => false,
        }
    }
}

impl Default for SerialExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SerialExecutor {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain remaining jobs and exit.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
