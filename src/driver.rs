//! Driver capability shim for the WiFi fast-path feature.
//!
//! The WiFi driver and this subsystem exchange capabilities in both
//! directions. The driver installs a [`DriverHooks`] implementation (status
//! callback plus modem-info notifications) and receives a
//! [`WifiDriverHandle`] exposing the operations this subsystem implements on
//! its behalf: TX descriptor forwarding, delta traffic statistics, reorder
//! buffer access and modem notifications. Registration and deregistration
//! install and clear the whole set as a unit; a handle that outlives
//! deregistration fails every call with [`FastPathError::DriverHandleMissing`].

use std::fmt::Debug;
use std::sync::Arc;

use log::warn;

use crate::error::FastPathError;
use crate::message::{DriverNotify, MdMessage, MdNotifyInfo, SmemMapping, SmemUser, TxDescriptor};
use crate::stats::NetStats;
use crate::wifi::WifiFastPath;

/// Callbacks the WiFi driver provides when registering.
///
/// Invoked best-effort: the core never fails an operation because a hook is
/// absent or slow. Hooks must not call back into the state machine; they may
/// be invoked with the context lock held.
pub trait DriverHooks: Send + Sync + Debug {
    /// Pushes the driver-facing fast-path status.
    fn change_state(&self, state: crate::wifi::FastPathState);

    /// Delivers a modem-info record (forwarded or synthesized).
    fn notify_md_info(&self, info: &MdNotifyInfo);
}

/// The capability set exposed to a registered WiFi driver.
#[derive(Debug, Clone)]
pub struct WifiDriverHandle {
    app: Arc<WifiFastPath>,
}

impl WifiDriverHandle {
    pub(crate) fn new(app: Arc<WifiFastPath>) -> Self {
        Self { app }
    }

    fn ensure_usable(&self) -> Result<(), FastPathError> {
        if !self.app.is_provisioned() {
            return Err(FastPathError::NotProvisioned);
        }
        if !self.app.driver_registered() {
            return Err(FastPathError::DriverHandleMissing);
        }
        Ok(())
    }

    /// Forwards a TX descriptor from the driver to the modem.
    pub fn send_txd(&self, txd: &TxDescriptor) -> Result<(), FastPathError> {
        self.ensure_usable()?;
        let endpoints = self
            .app
            .endpoints()
            .ok_or(FastPathError::NotProvisioned)?;
        self.app
            .transport_ref()
            .send(endpoints, MdMessage::txd_notify(txd))?;
        Ok(())
    }

    /// Reads the modem traffic counters and returns the delta since the
    /// previous call. A counter running backwards (modem-side reset) yields
    /// a zero delta for that field, never a negative one.
    pub fn net_stats(&self) -> Result<NetStats, FastPathError> {
        self.ensure_usable()?;
        let mapping = self
            .app
            .transport_ref()
            .region_by_id(SmemUser::WifiStatistics)?;
        let Some(current) = NetStats::decode(&mapping.data) else {
            warn!(
                "statistics region too short ({} bytes); reporting zero usage",
                mapping.data.len()
            );
            return Ok(NetStats::default());
        };
        Ok(self.app.stats_ref().advance(&current))
    }

    /// Maps the reorder synchronization table written by this side.
    pub fn local_reorder_buffer(&self) -> Result<SmemMapping, FastPathError> {
        self.ensure_usable()?;
        Ok(self
            .app
            .transport_ref()
            .region_by_id(SmemUser::RxReorderToModem)?)
    }

    /// Maps the reorder synchronization table written by the modem.
    pub fn remote_reorder_buffer(&self) -> Result<SmemMapping, FastPathError> {
        self.ensure_usable()?;
        Ok(self
            .app
            .transport_ref()
            .region_by_id(SmemUser::RxReorderFromModem)?)
    }

    /// Forwards a driver-originated notification to the modem.
    pub fn notify_driver_event(&self, notify: &DriverNotify) -> Result<(), FastPathError> {
        self.ensure_usable()?;
        let endpoints = self
            .app
            .endpoints()
            .ok_or(FastPathError::NotProvisioned)?;
        self.app
            .transport_ref()
            .send(endpoints, MdMessage::driver_notify(notify))?;
        Ok(())
    }
}
