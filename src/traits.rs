//! Collaborator interfaces consumed by the fast-path offload core.
//!
//! This module defines the seams between the core and its surroundings: the
//! inter-processor transport, the traffic filter that attaches virtual
//! network devices to the fast path, and the upper control plane that
//! receives operation results. The core only ever talks to these traits;
//! concrete implementations live with the owning driver stack.

use std::fmt::Debug;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::message::{MdMessage, SmemMapping, SmemRegion, SmemUser};
use crate::types::NetifId;

/// The pair of channel user ids identifying a feature to the modem
/// fast-path manager. Part of the feature's fixed configuration block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEndpoints {
    pub host_user: u8,
    pub modem_user: u8,
}

/// The inter-processor transport toward the modem processor.
///
/// `send` takes ownership of the message: it is marshaled at most once and
/// never retained by the caller afterward. Implementations are expected to
/// be cheap to call from the context lock; they must not call back into the
/// state machine.
pub trait Transport: Send + Sync + Debug {
    /// Submits one request message to the modem on behalf of the feature
    /// identified by `endpoints`.
    fn send(&self, endpoints: ChannelEndpoints, message: MdMessage) -> Result<(), TransportError>;

    /// Enumerates the shared-memory regions to advertise in an enable
    /// request.
    fn shared_regions(&self) -> Result<Vec<SmemRegion>, TransportError>;

    /// Maps the shared-memory region owned by `user` for reading.
    fn region_by_id(&self, user: SmemUser) -> Result<SmemMapping, TransportError>;
}

/// The traffic filter that classifies packets onto the fast path.
///
/// Registration must complete before the corresponding activate request is
/// in flight; deregistration happens exactly once when deactivation leaves
/// its in-flight state.
pub trait PacketFilter: Send + Sync + Debug {
    fn register_uplink_device(&self, name: &str);
    fn register_downlink_device(&self, name: &str, netif: NetifId);
    fn unregister_uplink_device(&self, name: &str);
    fn unregister_downlink_device(&self, name: &str);
}

/// Operations whose results are reported to the upper control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOp {
    Enable,
    Activate,
    Deactivate,
}

/// A result record delivered to the upper control plane.
///
/// The payload is empty for the WiFi hotspot feature; the contract allows
/// richer payloads for other features sharing the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlReply {
    pub op: ControlOp,
    pub success: bool,
    pub payload: Bytes,
}

impl ControlReply {
    pub fn new(op: ControlOp, success: bool) -> Self {
        Self {
            op,
            success,
            payload: Bytes::new(),
        }
    }
}

/// The upper control plane receiving enable/activate/deactivate results.
pub trait ControlPlane: Send + Sync + Debug {
    fn notify(&self, reply: ControlReply);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_reply_defaults_to_empty_payload() {
        let reply = ControlReply::new(ControlOp::Enable, true);
        assert!(reply.payload.is_empty());
        assert!(reply.success);
        assert_eq!(reply.op, ControlOp::Enable);
    }
}
