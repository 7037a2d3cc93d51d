//! Traffic statistics with per-call delta semantics.
//!
//! The modem maintains absolute counters in shared memory. Callers of the
//! driver capability set expect deltas per read, so the tracker persists the
//! last absolute snapshot and subtracts it from each new reading. A reading
//! lower than the snapshot means the modem reset its counters; the delta is
//! clamped to zero rather than reported negative.

use bytes::Buf;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One set of absolute or delta traffic counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetStats {
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    pub tx_errors: u64,
    pub rx_errors: u64,
}

impl NetStats {
    /// Encoded size of a counter set in the statistics shared-memory region.
    pub const WIRE_LEN: usize = 48;

    /// Decodes a counter set from a shared-memory snapshot.
    ///
    /// Returns `None` when the snapshot is shorter than a full counter set.
    pub fn decode(mut data: &[u8]) -> Option<Self> {
        if data.len() < Self::WIRE_LEN {
            return None;
        }
        Some(Self {
            tx_packets: data.get_u64_le(),
            rx_packets: data.get_u64_le(),
            tx_bytes: data.get_u64_le(),
            rx_bytes: data.get_u64_le(),
            tx_errors: data.get_u64_le(),
            rx_errors: data.get_u64_le(),
        })
    }

    fn delta_from(&self, previous: &NetStats) -> NetStats {
        NetStats {
            tx_packets: self.tx_packets.saturating_sub(previous.tx_packets),
            rx_packets: self.rx_packets.saturating_sub(previous.rx_packets),
            tx_bytes: self.tx_bytes.saturating_sub(previous.tx_bytes),
            rx_bytes: self.rx_bytes.saturating_sub(previous.rx_bytes),
            tx_errors: self.tx_errors.saturating_sub(previous.tx_errors),
            rx_errors: self.rx_errors.saturating_sub(previous.rx_errors),
        }
    }
}

/// Converts absolute shared-memory counters into monotonic per-call deltas.
///
/// The snapshot starts at zero, is updated on every successful read and
/// lives for the process lifetime of the feature. Updates are atomic with
/// respect to concurrent readers: the whole snapshot is replaced under one
/// lock.
#[derive(Debug, Default)]
pub struct StatsTracker {
    last: Mutex<NetStats>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the delta from the stored snapshot to `current` and stores
    /// `current` as the new snapshot.
    pub fn advance(&self, current: &NetStats) -> NetStats {
        let mut last = self.last.lock();
        let delta = current.delta_from(&last);
        *last = *current;
        delta
    }

    /// Last absolute counter set observed, for diagnostics.
    pub fn snapshot(&self) -> NetStats {
        *self.last.lock()
    }
}
