//! `mdoffload`: coordination of a hardware-offload fast path between an
//! application processor and a modem processor.
//!
//! This library drives the tethered-WiFi offload sequence over an
//! asynchronous inter-processor channel: a declarative transition-table
//! state machine sequences enable/disable/activate/deactivate requests, a
//! dispatcher resolves modem responses back into the machine, and a
//! recovery controller restores the sequence when the modem restarts
//! mid-operation. The primary entry point is [`WifiFastPath`].
//!
//! ## Core Concepts
//!
//! - **[`WifiFastPath`]**: the per-feature application context. Owned by the
//!   process-wide feature registry and handed by reference into every call.
//! - **Transition tables**: per-state event maps in [`wifi::tables`],
//!   consumed by the generic engine in [`sm`]. Tables are data and can be
//!   inspected in tests.
//! - **Collaborators**: the inter-processor [`Transport`], the traffic
//!   [`PacketFilter`] and the upper [`ControlPlane`] are traits implemented
//!   by the surrounding driver stack.
//! - **Recovery**: a modem restart freezes the machine, an acknowledgment
//!   is retried on a serialized worker until the transport accepts it, then
//!   the enable sequence restarts from scratch.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use mdoffload::driver::DriverHooks;
//! use mdoffload::error::TransportError;
//! use mdoffload::message::{MdMessage, MdNotifyInfo, MessageKind, SmemMapping, SmemRegion, SmemUser};
//! use mdoffload::traits::{ChannelEndpoints, ControlPlane, ControlReply, PacketFilter, Transport};
//! use mdoffload::types::NetifId;
//! use mdoffload::wifi::{FastPathState, WifiConfig, WifiFastPath};
//!
//! #[derive(Debug, Default)]
//! struct NullTransport;
//! impl Transport for NullTransport {
//!     fn send(
//!         &self,
//!         _endpoints: ChannelEndpoints,
//!         _message: MdMessage,
//!     ) -> Result<(), TransportError> {
//!         Ok(())
//!     }
//!     fn shared_regions(&self) -> Result<Vec<SmemRegion>, TransportError> {
//!         Ok(Vec::new())
//!     }
//!     fn region_by_id(&self, user: SmemUser) -> Result<SmemMapping, TransportError> {
//!         Err(TransportError::RegionUnavailable { user })
//!     }
//! }
//!
//! #[derive(Debug, Default)]
//! struct NullFilter;
//! impl PacketFilter for NullFilter {
//!     fn register_uplink_device(&self, _name: &str) {}
//!     fn register_downlink_device(&self, _name: &str, _netif: NetifId) {}
//!     fn unregister_uplink_device(&self, _name: &str) {}
//!     fn unregister_downlink_device(&self, _name: &str) {}
//! }
//!
//! #[derive(Debug, Default)]
//! struct NullControl;
//! impl ControlPlane for NullControl {
//!     fn notify(&self, _reply: ControlReply) {}
//! }
//!
//! #[derive(Debug, Default)]
//! struct NullDriver;
//! impl DriverHooks for NullDriver {
//!     fn change_state(&self, _state: FastPathState) {}
//!     fn notify_md_info(&self, _info: &MdNotifyInfo) {}
//! }
//!
//! let app = WifiFastPath::new(
//!     mdoffload::constants::DEFAULT_ACK_RETRY_DELAY,
//!     Arc::new(NullTransport),
//!     Arc::new(NullFilter),
//!     Arc::new(NullControl),
//! );
//! app.provision(WifiConfig {
//!     endpoints: ChannelEndpoints { host_user: 1, modem_user: 8 },
//!     uplink_dev: "ccmni0".into(),
//!     downlink_dev: "ap0".into(),
//! });
//!
//! // Driver registration, then the first enable request goes in flight.
//! let _handle = app.register_driver(Arc::new(NullDriver)).unwrap();
//! app.enable().unwrap();
//! assert_eq!(app.state(), FastPathState::Enabling);
//!
//! // The modem accepts: mode, result, version, reserved (little-endian u32s).
//! let mut rsp = Vec::new();
//! for field in [1u32, 1, 2, 0] {
//!     rsp.extend_from_slice(&field.to_le_bytes());
//! }
//! app.handle_modem_message(MessageKind::EnableResponse.raw(), &rsp).unwrap();
//! assert_eq!(app.state(), FastPathState::Deactivated);
//! ```

pub mod constants;
pub mod driver;
pub mod error;
pub mod message;
pub mod sm;
pub mod stats;
pub mod traits;
pub mod types;
pub mod wifi;
pub mod worker;

pub use driver::{DriverHooks, WifiDriverHandle};
pub use error::{FastPathError, TransportError};
pub use message::{MdMessage, MessageKind};
pub use stats::NetStats;
pub use traits::{ChannelEndpoints, ControlOp, ControlPlane, ControlReply, PacketFilter, Transport};
pub use wifi::{FastPathEvent, FastPathState, WifiConfig, WifiFastPath};
