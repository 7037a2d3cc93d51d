//! Constants shared across the fast-path offload core.
//!
//! Defines identifiers and defaults broadly applicable across the crate.
//! Feature-specific transition tables live with the feature module.

use std::time::Duration;

use crate::types::{NetifId, ProtocolVersion};

/// Fast-path protocol version advertised in enable requests.
pub const FASTPATH_PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion::new(2);

/// Network interface id the modem uses to address the tethered WiFi
/// downlink device.
pub const WIFI_NETIF_ID: NetifId = NetifId::new(0x500);

/// Delay between attempts to acknowledge a modem restart indication.
pub const DEFAULT_ACK_RETRY_DELAY: Duration = Duration::from_millis(100);

/// `info_type` value of the synthetic modem-info record delivered to the
/// driver after a restart recovery completes.
pub const MD_INFO_TYPE_RESET: u8 = 1;
