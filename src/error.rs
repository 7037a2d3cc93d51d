//! Error types for the modem fast-path offload core.
//!
//! This module defines the error taxonomy used throughout the crate. It
//! distinguishes between failures of the inter-processor transport (owned by
//! the transport collaborator, surfaced here) and failures of the fast-path
//! core itself. The `thiserror` crate is used for ergonomic error definitions.

use thiserror::Error;

use crate::message::{MessageKind, SmemUser};

/// Errors surfaced by the inter-processor transport collaborator.
///
/// Produced by implementations of [`Transport`] and wrapped into
/// [`FastPathError`] when they cross into the fast-path core.
///
/// [`Transport`]: crate::traits::Transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The inter-processor channel is not available (modem down or not yet up).
    #[error("inter-processor channel is down")]
    ChannelDown,

    /// A message was accepted by the transport but could not be delivered.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// A shared-memory region lookup failed.
    #[error("shared-memory region for {user:?} unavailable")]
    RegionUnavailable { user: SmemUser },
}

/// Main error type for fast-path offload operations.
///
/// Nothing in this crate treats an error as fatal: every failure degrades to
/// "no-op, logged, caller or timer retries".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FastPathError {
    /// The feature has not been provisioned; the call is rejected with no
    /// state change.
    #[error("feature is not provisioned")]
    NotProvisioned,

    /// An operation requiring a registered driver capability set was invoked
    /// after deregistration (or before registration).
    #[error("no driver handle registered")]
    DriverHandleMissing,

    /// An inbound modem message failed length validation for its kind.
    #[error("response for {kind:?} too short: expected at least {expected} bytes, got {got}")]
    InvalidResponseLength {
        kind: MessageKind,
        expected: usize,
        got: usize,
    },

    /// A payload field could not be decoded.
    #[error("malformed payload for {kind:?}: {reason}")]
    MalformedPayload { kind: MessageKind, reason: String },

    /// Error from the inter-processor transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
