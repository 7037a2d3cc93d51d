//! Restart-recovery controller for the WiFi hotspot feature.
//!
//! A modem restart voids all session state on the remote side while this
//! side may be mid-sequence. On the restart indication the controller
//! freezes the state machine (every event absorbed, no action), then
//! retries a zero-payload acknowledgment on the serialized worker until the
//! transport accepts it. On success the live tables are restored and, unless
//! the machine was still before its first enable, the state is forced to
//! `WaitEnable` and the enable sequence restarted from scratch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{info, warn};
use parking_lot::Mutex;

use crate::message::{MdMessage, MdNotifyInfo};
use crate::worker::{RetryPolicy, ScheduledTask};

use super::{FastPathEvent, FastPathState, WifiFastPath};

/// Recovery bookkeeping: exists as live state only between a restart
/// indication and a successful acknowledgment.
#[derive(Debug)]
pub(super) struct RecoveryState {
    /// Set while a recovery cycle is running; dedups racing indications.
    in_progress: AtomicBool,
    ack_retry_delay: Duration,
    retry_policy: RetryPolicy,
    pending: Mutex<Option<ScheduledTask>>,
}

impl RecoveryState {
    pub(super) fn new(ack_retry_delay: Duration) -> Self {
        Self {
            in_progress: AtomicBool::new(false),
            ack_retry_delay,
            // Deliberately unbounded: the acknowledgment keeps retrying
            // until the transport itself recovers.
            retry_policy: RetryPolicy::Unbounded,
            pending: Mutex::new(None),
        }
    }

    pub(super) fn in_progress(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    pub(super) fn cancel_pending(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.cancel();
        }
    }
}

impl WifiFastPath {
    /// Whether a restart recovery cycle is currently running.
    pub fn recovery_in_progress(&self) -> bool {
        self.recovery.in_progress()
    }

    /// Entry point for an unsolicited restart indication from the modem.
    pub(super) fn handle_restart_indication(self: &Arc<Self>) {
        if self
            .recovery
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("restart recovery already in progress; duplicate indication ignored");
            return;
        }

        {
            // Freezing is a table swap; it takes the context lock like any
            // other.
            let mut cell = self.sm.lock();
            cell.frozen = true;
            info!(
                "state machine frozen in {:?} pending restart acknowledgment",
                cell.state
            );
        }
        self.schedule_ack_attempt(1);
    }

    fn schedule_ack_attempt(self: &Arc<Self>, attempt: u32) {
        if !self.recovery.retry_policy.allows(attempt) {
            warn!("restart acknowledgment abandoned after {} attempts", attempt - 1);
            self.sm.lock().frozen = false;
            self.recovery.in_progress.store(false, Ordering::SeqCst);
            return;
        }
        let weak = Arc::downgrade(self);
        let task = self
            .worker
            .schedule_in(self.recovery.ack_retry_delay, move || {
                if let Some(app) = weak.upgrade() {
                    app.ack_md_reset(attempt);
                }
            });
        *self.recovery.pending.lock() = Some(task);
    }

    /// The acknowledgment-retry task. Runs only on the serialized worker.
    fn ack_md_reset(self: &Arc<Self>, attempt: u32) {
        let Some(endpoints) = self.endpoints() else {
            warn!("restart acknowledgment attempted while unprovisioned; recovery stalled");
            return;
        };

        match self.transport.send(endpoints, MdMessage::reset_ack()) {
            Ok(()) => {
                info!("restart acknowledgment sent (attempt {attempt})");
                let forced = {
                    let mut cell = self.sm.lock();
                    cell.frozen = false;
                    if matches!(
                        cell.state,
                        FastPathState::Uninit | FastPathState::WaitDriverRegistration
                    ) {
                        false
                    } else {
                        // Any in-flight activation or deactivation died with
                        // the modem; only a full re-enable is meaningful.
                        cell.state = FastPathState::WaitEnable;
                        true
                    }
                };
                if forced {
                    info!("resuming enable sequence after modem restart");
                    self.apply(FastPathEvent::EnableRequested);
                }
                if let Some(hooks) = self.driver_hooks() {
                    hooks.notify_md_info(&MdNotifyInfo::reset());
                }
                self.recovery.in_progress.store(false, Ordering::SeqCst);
            }
            Err(e) => {
                info!(
                    "restart acknowledgment failed ({e}); retrying in {:?}",
                    self.recovery.ack_retry_delay
                );
                self.schedule_ack_attempt(attempt.saturating_add(1));
            }
        }
    }
}
