//! Inter-processor message definitions for the fast-path offload core.
//!
//! Defines the message-kind namespace shared with the modem processor, the
//! request envelope handed to the transport, and the payload shapes carried
//! by requests and responses. Envelope payloads are plain little-endian
//! field sequences; the layout of the shared-memory regions themselves is
//! owned by the transport and never interpreted here.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::FastPathError;
use crate::types::{ProtocolVersion, RegionId};

/// Message kinds exchanged with the modem fast-path manager.
///
/// Request/response pairs share a kind namespace; the restart indication is
/// reused in both directions (unsolicited from the modem, acknowledgment
/// from this side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MessageKind {
    /// Enable the fast path on the modem (carries shared-memory descriptors).
    EnableRequest = 0x0F01,
    /// Modem reply to [`MessageKind::EnableRequest`].
    EnableResponse = 0x0F02,
    /// Disable the fast path on the modem.
    DisableRequest = 0x0F03,
    /// Modem reply to [`MessageKind::DisableRequest`].
    DisableResponse = 0x0F04,
    /// Activate traffic offload for the feature.
    ActivateRequest = 0x0F05,
    /// Modem reply to [`MessageKind::ActivateRequest`].
    ActivateResponse = 0x0F06,
    /// Deactivate traffic offload for the feature.
    DeactivateRequest = 0x0F07,
    /// Modem reply to [`MessageKind::DeactivateRequest`].
    DeactivateResponse = 0x0F08,
    /// Unsolicited modem restart indication; also sent back (zero payload)
    /// as the restart acknowledgment.
    ResetIndication = 0x0F09,
    /// Unsolicited informational notification from the modem.
    ModemNotify = 0x0F0A,
    /// TX descriptor forwarded from the WiFi driver to the modem.
    TxdNotify = 0x0F0B,
    /// Driver-originated notification forwarded to the modem.
    DriverNotify = 0x0F0C,
}

impl MessageKind {
    /// Maps a raw wire identifier to a known kind.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0x0F01 => Some(Self::EnableRequest),
            0x0F02 => Some(Self::EnableResponse),
            0x0F03 => Some(Self::DisableRequest),
            0x0F04 => Some(Self::DisableResponse),
            0x0F05 => Some(Self::ActivateRequest),
            0x0F06 => Some(Self::ActivateResponse),
            0x0F07 => Some(Self::DeactivateRequest),
            0x0F08 => Some(Self::DeactivateResponse),
            0x0F09 => Some(Self::ResetIndication),
            0x0F0A => Some(Self::ModemNotify),
            0x0F0B => Some(Self::TxdNotify),
            0x0F0C => Some(Self::DriverNotify),
            _ => None,
        }
    }

    /// Raw wire identifier.
    #[inline]
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Minimum payload length expected for an inbound message of this kind.
    ///
    /// `None` means the kind is outbound-only and never validated on receive.
    /// Shorter payloads are rejected before any decoding or state change.
    pub fn expected_inbound_len(self) -> Option<usize> {
        match self {
            Self::EnableResponse => Some(EnableResponse::WIRE_LEN),
            Self::DisableResponse | Self::ActivateResponse => Some(CommonResponse::WIRE_LEN),
            Self::DeactivateResponse => Some(DeactivateResponse::WIRE_LEN),
            Self::ResetIndication => Some(0),
            Self::ModemNotify => Some(MdNotifyInfo::HEADER_LEN),
            _ => None,
        }
    }
}

/// Operating mode carried by every fast-path request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u32)]
pub enum FunctionMode {
    /// Tethered traffic offload (the only mode the WiFi hotspot feature uses).
    #[default]
    Tether = 1,
}

impl FunctionMode {
    fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Self::Tether),
            _ => None,
        }
    }
}

/// Descriptor of one shared-memory region handed to the modem for zero-copy
/// access, as enumerated by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmemRegion {
    pub id: RegionId,
    pub address: u64,
    pub size: u32,
    pub attributes: u32,
}

impl SmemRegion {
    /// Encoded size of one descriptor in an enable request.
    pub const WIRE_LEN: usize = 20;

    fn encode_into(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.id.value());
        buf.put_u64_le(self.address);
        buf.put_u32_le(self.size);
        buf.put_u32_le(self.attributes);
    }
}

/// Well-known shared-memory region users the WiFi feature reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmemUser {
    /// Absolute traffic counters maintained by the modem.
    WifiStatistics,
    /// Reorder synchronization table written by this side, read by the modem.
    RxReorderToModem,
    /// Reorder synchronization table written by the modem, read by this side.
    RxReorderFromModem,
}

/// A mapped view of a shared-memory region returned by the transport.
///
/// The `data` snapshot is valid at read time; callers needing a live view
/// re-query the transport.
#[derive(Debug, Clone)]
pub struct SmemMapping {
    pub data: Bytes,
    pub attributes: u8,
}

/// A request envelope bound for the modem processor.
///
/// Built by an action handler, moved into `Transport::send` exactly once and
/// never retained afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdMessage {
    pub kind: MessageKind,
    pub payload: Bytes,
}

impl MdMessage {
    /// Builds an enable request carrying the shared-memory descriptor list.
    pub fn enable_request(
        mode: FunctionMode,
        version: ProtocolVersion,
        regions: &[SmemRegion],
    ) -> Self {
        let mut buf = BytesMut::with_capacity(12 + regions.len() * SmemRegion::WIRE_LEN);
        buf.put_u32_le(mode as u32);
        buf.put_u32_le(version.value());
        buf.put_u32_le(regions.len() as u32);
        for region in regions {
            region.encode_into(&mut buf);
        }
        Self {
            kind: MessageKind::EnableRequest,
            payload: buf.freeze(),
        }
    }

    /// Builds a fixed-size request carrying only the mode field
    /// (disable / activate / deactivate).
    pub fn common_request(kind: MessageKind, mode: FunctionMode) -> Self {
        debug_assert!(
            matches!(
                kind,
                MessageKind::DisableRequest
                    | MessageKind::ActivateRequest
                    | MessageKind::DeactivateRequest
            ),
            "common_request used for a kind with a non-common payload"
        );
        let mut buf = BytesMut::with_capacity(4);
        buf.put_u32_le(mode as u32);
        Self {
            kind,
            payload: buf.freeze(),
        }
    }

    /// Builds the zero-payload acknowledgment for a modem restart indication.
    pub fn reset_ack() -> Self {
        Self {
            kind: MessageKind::ResetIndication,
            payload: Bytes::new(),
        }
    }

    /// Builds a TX descriptor notification for the modem.
    pub fn txd_notify(txd: &TxDescriptor) -> Self {
        let mut buf = BytesMut::with_capacity(8 + txd.payload.len());
        buf.put_u8(txd.version);
        buf.put_u8(0); // reserved
        buf.put_u16_le(0); // reserved
        buf.put_u32_le(txd.payload.len() as u32);
        buf.put_slice(&txd.payload);
        Self {
            kind: MessageKind::TxdNotify,
            payload: buf.freeze(),
        }
    }

    /// Builds a driver-originated notification for the modem.
    pub fn driver_notify(notify: &DriverNotify) -> Self {
        let mut buf = BytesMut::with_capacity(8 + notify.buf.len());
        buf.put_u8(notify.version);
        buf.put_u8(notify.info_type);
        buf.put_u16_le(0); // reserved
        buf.put_u32_le(notify.buf.len() as u32);
        buf.put_slice(&notify.buf);
        Self {
            kind: MessageKind::DriverNotify,
            payload: buf.freeze(),
        }
    }
}

/// Common response shape shared by disable and activate replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonResponse {
    pub mode: Option<FunctionMode>,
    pub accepted: bool,
}

impl CommonResponse {
    pub const WIRE_LEN: usize = 8;

    /// Decodes a common response from a validated payload.
    pub fn decode(kind: MessageKind, mut payload: &[u8]) -> Result<Self, FastPathError> {
        if payload.len() < Self::WIRE_LEN {
            return Err(FastPathError::InvalidResponseLength {
                kind,
                expected: Self::WIRE_LEN,
                got: payload.len(),
            });
        }
        let mode = FunctionMode::from_raw(payload.get_u32_le());
        let accepted = payload.get_u32_le() != 0;
        Ok(Self { mode, accepted })
    }
}

/// Enable response: common result plus the modem's protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnableResponse {
    pub mode: Option<FunctionMode>,
    pub accepted: bool,
    pub version: ProtocolVersion,
    pub reserved: u32,
}

impl EnableResponse {
    pub const WIRE_LEN: usize = 16;

    pub fn decode(mut payload: &[u8]) -> Result<Self, FastPathError> {
        if payload.len() < Self::WIRE_LEN {
            return Err(FastPathError::InvalidResponseLength {
                kind: MessageKind::EnableResponse,
                expected: Self::WIRE_LEN,
                got: payload.len(),
            });
        }
        let mode = FunctionMode::from_raw(payload.get_u32_le());
        let accepted = payload.get_u32_le() != 0;
        let version = ProtocolVersion::new(payload.get_u32_le());
        let reserved = payload.get_u32_le();
        Ok(Self {
            mode,
            accepted,
            version,
            reserved,
        })
    }
}

/// Deactivate response, cached whole as the most-recent deactivation
/// metadata for external diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeactivateResponse {
    pub mode: Option<FunctionMode>,
    pub accepted: bool,
    pub reserved: u32,
}

impl DeactivateResponse {
    pub const WIRE_LEN: usize = 12;

    pub fn decode(mut payload: &[u8]) -> Result<Self, FastPathError> {
        if payload.len() < Self::WIRE_LEN {
            return Err(FastPathError::InvalidResponseLength {
                kind: MessageKind::DeactivateResponse,
                expected: Self::WIRE_LEN,
                got: payload.len(),
            });
        }
        let mode = FunctionMode::from_raw(payload.get_u32_le());
        let accepted = payload.get_u32_le() != 0;
        let reserved = payload.get_u32_le();
        Ok(Self {
            mode,
            accepted,
            reserved,
        })
    }
}

/// Informational record delivered to the driver's notification hook,
/// either forwarded from the modem or synthesized after a restart recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdNotifyInfo {
    pub version: u8,
    pub info_type: u8,
    pub buf: Bytes,
}

impl MdNotifyInfo {
    /// Fixed prefix before the variable-length buffer.
    pub const HEADER_LEN: usize = 8;

    pub fn decode(mut payload: &[u8]) -> Result<Self, FastPathError> {
        if payload.len() < Self::HEADER_LEN {
            return Err(FastPathError::InvalidResponseLength {
                kind: MessageKind::ModemNotify,
                expected: Self::HEADER_LEN,
                got: payload.len(),
            });
        }
        let version = payload.get_u8();
        let info_type = payload.get_u8();
        let _reserved = payload.get_u16_le();
        let buf_len = payload.get_u32_le() as usize;
        if payload.len() < buf_len {
            return Err(FastPathError::MalformedPayload {
                kind: MessageKind::ModemNotify,
                reason: format!(
                    "declared buffer of {} bytes but only {} remain",
                    buf_len,
                    payload.len()
                ),
            });
        }
        Ok(Self {
            version,
            info_type,
            buf: Bytes::copy_from_slice(&payload[..buf_len]),
        })
    }

    /// Synthetic modem-reset indication delivered after recovery completes.
    pub fn reset() -> Self {
        Self {
            version: 0,
            info_type: crate::constants::MD_INFO_TYPE_RESET,
            buf: Bytes::new(),
        }
    }
}

/// TX descriptor handed over by the WiFi driver for forwarding to the modem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxDescriptor {
    pub version: u8,
    pub payload: Bytes,
}

/// Driver-originated notification forwarded verbatim to the modem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverNotify {
    pub version: u8,
    pub info_type: u8,
    pub buf: Bytes,
}
