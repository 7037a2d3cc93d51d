//! Common test utilities for the WiFi fast-path integration tests.
//!
//! Provides recording implementations of the collaborator traits, payload
//! encoders matching the modem wire shapes, and helpers for assembling a
//! provisioned feature context.

#![allow(dead_code)] // Not every helper is used by every test binary.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::Mutex;

use mdoffload::driver::DriverHooks;
use mdoffload::error::TransportError;
use mdoffload::message::{
    MdMessage, MdNotifyInfo, MessageKind, SmemMapping, SmemRegion, SmemUser,
};
use mdoffload::traits::{ChannelEndpoints, ControlPlane, ControlReply, PacketFilter, Transport};
use mdoffload::types::{NetifId, RegionId};
use mdoffload::wifi::{FastPathState, WifiConfig, WifiFastPath};

/// Short retry interval so recovery tests complete quickly.
pub const TEST_ACK_RETRY_DELAY: Duration = Duration::from_millis(2);

/// Transport double recording every send and serving canned region data.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub sent: Mutex<Vec<(ChannelEndpoints, MdMessage)>>,
    /// Number of upcoming sends to fail before succeeding again.
    pub send_failures: Mutex<u32>,
    pub regions: Mutex<Vec<SmemRegion>>,
    pub regions_unavailable: Mutex<bool>,
    pub mappings: Mutex<HashMap<SmemUser, Bytes>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next_sends(&self, count: u32) {
        *self.send_failures.lock() = count;
    }

    pub fn sent_kinds(&self) -> Vec<MessageKind> {
        self.sent.lock().iter().map(|(_, msg)| msg.kind).collect()
    }

    pub fn sent_count(&self, kind: MessageKind) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|(_, msg)| msg.kind == kind)
            .count()
    }

    pub fn last_sent(&self) -> Option<MdMessage> {
        self.sent.lock().last().map(|(_, msg)| msg.clone())
    }

    pub fn install_mapping(&self, user: SmemUser, data: &[u8]) {
        self.mappings
            .lock()
            .insert(user, Bytes::copy_from_slice(data));
    }
}

impl Transport for MockTransport {
    fn send(&self, endpoints: ChannelEndpoints, message: MdMessage) -> Result<(), TransportError> {
        let mut failures = self.send_failures.lock();
        if *failures > 0 {
            *failures -= 1;
            return Err(TransportError::SendFailed("injected failure".into()));
        }
        drop(failures);
        self.sent.lock().push((endpoints, message));
        Ok(())
    }

    fn shared_regions(&self) -> Result<Vec<SmemRegion>, TransportError> {
        if *self.regions_unavailable.lock() {
            return Err(TransportError::ChannelDown);
        }
        Ok(self.regions.lock().clone())
    }

    fn region_by_id(&self, user: SmemUser) -> Result<SmemMapping, TransportError> {
        self.mappings
            .lock()
            .get(&user)
            .map(|data| SmemMapping {
                data: data.clone(),
                attributes: 0,
            })
            .ok_or(TransportError::RegionUnavailable { user })
    }
}

/// One recorded traffic-filter operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCall {
    RegisterUplink(String),
    RegisterDownlink(String, NetifId),
    UnregisterUplink(String),
    UnregisterDownlink(String),
}

#[derive(Debug, Default)]
pub struct MockFilter {
    pub calls: Mutex<Vec<FilterCall>>,
}

impl MockFilter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<FilterCall> {
        self.calls.lock().clone()
    }
}

impl PacketFilter for MockFilter {
    fn register_uplink_device(&self, name: &str) {
        self.calls.lock().push(FilterCall::RegisterUplink(name.into()));
    }

    fn register_downlink_device(&self, name: &str, netif: NetifId) {
        self.calls
            .lock()
            .push(FilterCall::RegisterDownlink(name.into(), netif));
    }

    fn unregister_uplink_device(&self, name: &str) {
        self.calls
            .lock()
            .push(FilterCall::UnregisterUplink(name.into()));
    }

    fn unregister_downlink_device(&self, name: &str) {
        self.calls
            .lock()
            .push(FilterCall::UnregisterDownlink(name.into()));
    }
}

#[derive(Debug, Default)]
pub struct MockControl {
    pub replies: Mutex<Vec<ControlReply>>,
}

impl MockControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn replies(&self) -> Vec<ControlReply> {
        self.replies.lock().clone()
    }
}

impl ControlPlane for MockControl {
    fn notify(&self, reply: ControlReply) {
        self.replies.lock().push(reply);
    }
}

/// Driver hooks double recording status pushes and modem-info records.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    pub states: Mutex<Vec<FastPathState>>,
    pub md_infos: Mutex<Vec<MdNotifyInfo>>,
}

impl RecordingDriver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn states(&self) -> Vec<FastPathState> {
        self.states.lock().clone()
    }

    pub fn md_infos(&self) -> Vec<MdNotifyInfo> {
        self.md_infos.lock().clone()
    }
}

impl DriverHooks for RecordingDriver {
    fn change_state(&self, state: FastPathState) {
        self.states.lock().push(state);
    }

    fn notify_md_info(&self, info: &MdNotifyInfo) {
        self.md_infos.lock().push(info.clone());
    }
}

/// Assembled feature context plus its collaborator doubles.
pub struct Harness {
    pub app: Arc<WifiFastPath>,
    pub transport: Arc<MockTransport>,
    pub filter: Arc<MockFilter>,
    pub control: Arc<MockControl>,
}

pub fn test_config() -> WifiConfig {
    WifiConfig {
        endpoints: ChannelEndpoints {
            host_user: 1,
            modem_user: 8,
        },
        uplink_dev: "ccmni0".to_string(),
        downlink_dev: "ap0".to_string(),
    }
}

pub fn test_region() -> SmemRegion {
    SmemRegion {
        id: RegionId::new(1),
        address: 0x9000_0000,
        size: 4096,
        attributes: 0x3,
    }
}

/// Builds a provisioned context with the test retry delay.
pub fn build_provisioned() -> Harness {
    let transport = MockTransport::new();
    let filter = MockFilter::new();
    let control = MockControl::new();
    let app = WifiFastPath::new(
        TEST_ACK_RETRY_DELAY,
        Arc::clone(&transport) as Arc<dyn Transport>,
        Arc::clone(&filter) as Arc<dyn PacketFilter>,
        Arc::clone(&control) as Arc<dyn ControlPlane>,
    );
    app.provision(test_config());
    Harness {
        app,
        transport,
        filter,
        control,
    }
}

/// Builds a context with no configuration installed.
pub fn build_unprovisioned() -> Harness {
    let transport = MockTransport::new();
    let filter = MockFilter::new();
    let control = MockControl::new();
    let app = WifiFastPath::new(
        TEST_ACK_RETRY_DELAY,
        Arc::clone(&transport) as Arc<dyn Transport>,
        Arc::clone(&filter) as Arc<dyn PacketFilter>,
        Arc::clone(&control) as Arc<dyn ControlPlane>,
    );
    Harness {
        app,
        transport,
        filter,
        control,
    }
}

/// Registers a recording driver and returns it with its capability handle.
pub fn register_recording_driver(
    harness: &Harness,
) -> (Arc<RecordingDriver>, mdoffload::driver::WifiDriverHandle) {
    let driver = RecordingDriver::new();
    let handle = harness
        .app
        .register_driver(Arc::clone(&driver) as Arc<dyn DriverHooks>)
        .expect("driver registration failed");
    (driver, handle)
}

/// Drives a freshly provisioned context to `Deactivated`:
/// driver registration, enable request, modem acceptance.
pub fn drive_to_deactivated(harness: &Harness) -> Arc<RecordingDriver> {
    let (driver, _) = register_recording_driver(harness);
    harness.app.enable().expect("enable rejected");
    assert_eq!(harness.app.state(), FastPathState::Enabling);
    harness
        .app
        .handle_modem_message(
            MessageKind::EnableResponse.raw(),
            &encode_enable_response(true, 2),
        )
        .expect("enable response rejected");
    assert_eq!(harness.app.state(), FastPathState::Deactivated);
    driver
}

/// Drives a context to `Activated` (via `drive_to_deactivated`).
pub fn drive_to_activated(harness: &Harness) -> Arc<RecordingDriver> {
    let driver = drive_to_deactivated(harness);
    harness.app.activate().expect("activate rejected");
    harness
        .app
        .handle_modem_message(
            MessageKind::ActivateResponse.raw(),
            &encode_common_response(true),
        )
        .expect("activate response rejected");
    assert_eq!(harness.app.state(), FastPathState::Activated);
    driver
}

/// Encodes a common (disable/activate) response payload.
pub fn encode_common_response(accepted: bool) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&1u32.to_le_bytes()); // mode: tether
    buf.extend_from_slice(&(accepted as u32).to_le_bytes());
    buf
}

/// Encodes an enable response payload carrying the modem version.
pub fn encode_enable_response(accepted: bool, version: u32) -> Vec<u8> {
    let mut buf = encode_common_response(accepted);
    buf.extend_from_slice(&version.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // reserved
    buf
}

/// Encodes a deactivate response payload.
pub fn encode_deactivate_response(accepted: bool) -> Vec<u8> {
    let mut buf = encode_common_response(accepted);
    buf.extend_from_slice(&0u32.to_le_bytes()); // reserved
    buf
}

/// Spins until `predicate` holds or `timeout` elapses.
pub fn wait_until(predicate: impl Fn() -> bool, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    predicate()
}
