//! Serialized background worker and scheduled-task primitives.
//!
//! Replaces the fire-and-forget timer plus deferred-work chain of the
//! original driver with an explicit single-worker executor: timers only ever
//! enqueue work onto the worker thread, so a scheduled task and anything
//! else running on the worker are never interleaved. Scheduled tasks carry a
//! cancellation token; cancelling after the task has started has no effect.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use log::warn;

/// A unit of work executed on the worker thread.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Retry discipline for an operation driven by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Retry until the operation succeeds, with no backoff and no ceiling.
    /// The restart acknowledgment deliberately uses this: the only exit is
    /// the transport itself recovering.
    Unbounded,
    /// Give up after the given number of attempts.
    Limited(u32),
}

impl RetryPolicy {
    /// Whether a further attempt (1-based) is permitted.
    pub fn allows(&self, attempt: u32) -> bool {
        match self {
            RetryPolicy::Unbounded => true,
            RetryPolicy::Limited(max) => attempt <= *max,
        }
    }
}

enum Command {
    Run(Job),
    Schedule(Scheduled),
    Shutdown,
}

struct Scheduled {
    deadline: Instant,
    job: Job,
    cancelled: Arc<AtomicBool>,
}

/// Handle to a task scheduled on a [`SerialWorker`].
///
/// Dropping the handle does not cancel the task.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    cancelled: Arc<AtomicBool>,
}

impl ScheduledTask {
    /// Prevents the task from running if it has not started yet.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A single dedicated thread draining jobs in submission order.
///
/// Dropping the worker shuts the thread down; scheduled tasks that have not
/// fired by then are discarded.
#[derive(Debug)]
pub struct SerialWorker {
    tx: Sender<Command>,
    thread: Option<JoinHandle<()>>,
}

impl SerialWorker {
    /// Spawns the worker thread.
    pub fn spawn(name: &str) -> Self {
        let (tx, rx) = unbounded();
        let thread = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || run_loop(rx))
            .expect("failed to spawn serial worker thread");
        Self {
            tx,
            thread: Some(thread),
        }
    }

    /// Enqueues a job for immediate execution.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) {
        if self.tx.send(Command::Run(Box::new(job))).is_err() {
            warn!("job submitted after worker shutdown; dropped");
        }
    }

    /// Schedules a job to run on the worker thread after `delay`.
    pub fn schedule_in(
        &self,
        delay: std::time::Duration,
        job: impl FnOnce() + Send + 'static,
    ) -> ScheduledTask {
        let cancelled = Arc::new(AtomicBool::new(false));
        let task = ScheduledTask {
            cancelled: Arc::clone(&cancelled),
        };
        let scheduled = Scheduled {
            deadline: Instant::now() + delay,
            job: Box::new(job),
            cancelled,
        };
        if self.tx.send(Command::Schedule(scheduled)).is_err() {
            warn!("task scheduled after worker shutdown; dropped");
            task.cancel();
        }
        task
    }
}

impl Drop for SerialWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run_loop(rx: Receiver<Command>) {
    let mut pending: Vec<Scheduled> = Vec::new();
    loop {
        let command = match pending.iter().map(|s| s.deadline).min() {
            Some(deadline) => {
                let now = Instant::now();
                if deadline <= now {
                    run_due(&mut pending);
                    continue;
                }
                match rx.recv_timeout(deadline - now) {
                    Ok(cmd) => cmd,
                    Err(RecvTimeoutError::Timeout) => {
                        run_due(&mut pending);
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
            None => match rx.recv() {
                Ok(cmd) => cmd,
                Err(_) => return,
            },
        };
        match command {
            Command::Run(job) => job(),
            Command::Schedule(scheduled) => pending.push(scheduled),
            Command::Shutdown => return,
        }
    }
}

fn run_due(pending: &mut Vec<Scheduled>) {
    let now = Instant::now();
    let mut index = 0;
    while index < pending.len() {
        if pending[index].deadline <= now {
            let due = pending.swap_remove(index);
            if !due.cancelled.load(Ordering::SeqCst) {
                (due.job)();
            }
        } else {
            index += 1;
        }
    }
}
