//! WiFi hotspot fast-path feature.
//!
//! This module and its submodules contain the feature-specific logic driving
//! the tethered-WiFi offload sequence:
//! - `tables`: declarative per-state transition tables.
//! - `actions`: handlers building and sending inter-processor requests and
//!   delivering replies to the driver and upper control plane.
//! - `dispatcher`: demultiplexes inbound modem messages into state-machine
//!   events.
//! - `recovery`: detects modem restarts, freezes the state machine, retries
//!   the acknowledgment and resumes the enable sequence.
//!
//! [`WifiFastPath`] is the per-feature application context: one long-lived
//! instance owned by the process-wide feature registry, handed by reference
//! into every call.

mod actions;
mod dispatcher;
mod recovery;
pub mod tables;

pub use self::tables::{FastPathEvent, FastPathState, WifiAction};

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use log::debug;
use parking_lot::{Mutex, RwLock};

use crate::driver::{DriverHooks, WifiDriverHandle};
use crate::error::FastPathError;
use crate::message::DeactivateResponse;
use crate::sm;
use crate::stats::{NetStats, StatsTracker};
use crate::traits::{ChannelEndpoints, ControlPlane, PacketFilter, Transport};
use crate::types::ProtocolVersion;
use crate::worker::SerialWorker;

use self::recovery::RecoveryState;

/// Fixed configuration block for the WiFi hotspot feature, installed once
/// at provisioning time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiConfig {
    /// Channel user ids identifying this feature to the modem.
    pub endpoints: ChannelEndpoints,
    /// Name of the uplink (WAN-side) virtual network device.
    pub uplink_dev: String,
    /// Name of the downlink (tethered-side) virtual network device.
    pub downlink_dev: String,
}

/// State guarded by the context lock: the machine state plus the frozen
/// gate substituted for the live tables during restart recovery.
#[derive(Debug)]
pub(crate) struct SmCell {
    pub(crate) state: FastPathState,
    pub(crate) frozen: bool,
}

/// The WiFi hotspot fast-path application context.
///
/// Drives the enable/disable/activate/deactivate sequence toward the modem
/// through the transition tables in [`tables`], dispatches modem responses
/// back into the machine, and recovers the sequence across modem restarts.
///
/// All entry points serialize on one context-scoped lock for the duration
/// of table lookup, state mutation and action dispatch. Collaborator and
/// driver callbacks are invoked with that lock held and must not re-enter
/// the state machine.
#[derive(Debug)]
pub struct WifiFastPath {
    sm: Mutex<SmCell>,
    config: RwLock<Option<WifiConfig>>,
    driver: RwLock<Option<Arc<dyn DriverHooks>>>,
    transport: Arc<dyn Transport>,
    filter: Arc<dyn PacketFilter>,
    control: Arc<dyn ControlPlane>,
    stats: StatsTracker,
    deact_metadata: Mutex<Option<DeactivateResponse>>,
    modem_version: AtomicU32,
    recovery: RecoveryState,
    worker: SerialWorker,
}

impl WifiFastPath {
    /// Creates the feature context.
    ///
    /// `ack_retry_delay` is the interval between attempts to acknowledge a
    /// modem restart; production callers pass
    /// [`DEFAULT_ACK_RETRY_DELAY`](crate::constants::DEFAULT_ACK_RETRY_DELAY).
    /// The context starts unprovisioned in [`FastPathState::Uninit`]; call
    /// [`provision`](Self::provision) before driving events.
    pub fn new(
        ack_retry_delay: Duration,
        transport: Arc<dyn Transport>,
        filter: Arc<dyn PacketFilter>,
        control: Arc<dyn ControlPlane>,
    ) -> Arc<Self> {
        Arc::new(Self {
            sm: Mutex::new(SmCell {
                state: FastPathState::Uninit,
                frozen: false,
            }),
            config: RwLock::new(None),
            driver: RwLock::new(None),
            transport,
            filter,
            control,
            stats: StatsTracker::new(),
            deact_metadata: Mutex::new(None),
            modem_version: AtomicU32::new(0),
            recovery: RecoveryState::new(ack_retry_delay),
            worker: SerialWorker::spawn("mdoffload-wifi"),
        })
    }

    /// Installs the feature configuration and marks the feature provisioned.
    pub fn provision(&self, config: WifiConfig) {
        *self.config.write() = Some(config);
    }

    /// Whether the feature has been provisioned.
    pub fn is_provisioned(&self) -> bool {
        self.config.read().is_some()
    }

    /// Current state, for diagnostics.
    pub fn state(&self) -> FastPathState {
        self.sm.lock().state
    }

    /// Modem protocol version recorded from the last enable response.
    pub fn modem_version(&self) -> ProtocolVersion {
        ProtocolVersion::new(self.modem_version.load(Ordering::Relaxed))
    }

    /// Most recent deactivation metadata reported by the modem, for
    /// diagnostics. Updated on accepted and rejected deactivations alike.
    pub fn last_deactivate_metadata(&self) -> Option<DeactivateResponse> {
        *self.deact_metadata.lock()
    }

    /// Last absolute statistics snapshot observed, for diagnostics.
    pub fn last_stats_snapshot(&self) -> NetStats {
        self.stats.snapshot()
    }

    /// Requests the fast path be enabled toward the modem.
    pub fn enable(&self) -> Result<(), FastPathError> {
        self.dispatch_request(FastPathEvent::EnableRequested)
    }

    /// Requests the fast path be disabled.
    pub fn disable(&self) -> Result<(), FastPathError> {
        self.dispatch_request(FastPathEvent::DisableRequested)
    }

    /// Requests traffic offload activation.
    pub fn activate(&self) -> Result<(), FastPathError> {
        self.dispatch_request(FastPathEvent::ActivateRequested)
    }

    /// Requests traffic offload deactivation.
    pub fn deactivate(&self) -> Result<(), FastPathError> {
        self.dispatch_request(FastPathEvent::DeactivateRequested)
    }

    /// Installs the driver capability set and feeds `DriverRegistered` into
    /// the state machine. Returns the operations handle exposed to the
    /// driver.
    pub fn register_driver(
        self: &Arc<Self>,
        hooks: Arc<dyn DriverHooks>,
    ) -> Result<WifiDriverHandle, FastPathError> {
        if !self.is_provisioned() {
            return Err(FastPathError::NotProvisioned);
        }
        *self.driver.write() = Some(hooks);
        self.apply(FastPathEvent::DriverRegistered);
        Ok(WifiDriverHandle::new(Arc::clone(self)))
    }

    /// Clears the driver capability set as a unit and feeds
    /// `DriverDeregistered` into the state machine. Outstanding
    /// [`WifiDriverHandle`]s fail all further calls.
    pub fn deregister_driver(&self) -> Result<(), FastPathError> {
        if self.driver.write().take().is_none() {
            return Err(FastPathError::DriverHandleMissing);
        }
        self.apply(FastPathEvent::DriverDeregistered);
        Ok(())
    }

    fn dispatch_request(&self, event: FastPathEvent) -> Result<(), FastPathError> {
        if !self.is_provisioned() {
            return Err(FastPathError::NotProvisioned);
        }
        self.apply(event);
        Ok(())
    }

    /// Applies one event: table lookup, state mutation and action dispatch
    /// under the context lock. During restart recovery every event is
    /// absorbed with no state change and no action.
    pub(crate) fn apply(&self, event: FastPathEvent) {
        let mut cell = self.sm.lock();
        if cell.frozen {
            debug!("event {event:?} absorbed during restart recovery");
            return;
        }
        let previous = cell.state;
        let action = sm::transition(&mut cell.state, tables::table_for(previous), event);
        if previous != cell.state {
            debug!("state {previous:?} -> {:?} on {event:?}", cell.state);
        }
        if let Some(action) = action {
            actions::run(self, &mut cell, action);
        }
    }

    // Accessors for the sibling modules and the driver capability shim.

    pub(crate) fn transport_ref(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub(crate) fn filter_ref(&self) -> &Arc<dyn PacketFilter> {
        &self.filter
    }

    pub(crate) fn control_ref(&self) -> &Arc<dyn ControlPlane> {
        &self.control
    }

    pub(crate) fn stats_ref(&self) -> &StatsTracker {
        &self.stats
    }

    pub(crate) fn driver_registered(&self) -> bool {
        self.driver.read().is_some()
    }

    pub(crate) fn driver_hooks(&self) -> Option<Arc<dyn DriverHooks>> {
        self.driver.read().clone()
    }

    pub(crate) fn endpoints(&self) -> Option<ChannelEndpoints> {
        self.config.read().as_ref().map(|config| config.endpoints)
    }

    pub(crate) fn config_snapshot(&self) -> Option<WifiConfig> {
        self.config.read().clone()
    }

    pub(crate) fn set_modem_version(&self, version: ProtocolVersion) {
        self.modem_version.store(version.value(), Ordering::Relaxed);
    }

    pub(crate) fn cache_deactivate_metadata(&self, response: DeactivateResponse) {
        *self.deact_metadata.lock() = Some(response);
    }
}

impl Drop for WifiFastPath {
    fn drop(&mut self) {
        self.recovery.cancel_pending();
    }
}
