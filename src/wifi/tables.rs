//! Transition tables for the WiFi hotspot fast-path state machine.
//!
//! Only `Enabling`, `Activating`, `Deactivating` and `Disabling` are
//! in-flight states awaiting a modem response; every other state accepts
//! only driver-originated events. Activate and deactivate can interrupt
//! each other mid-flight (the crossover edges between `Activating` and
//! `Deactivating`): the underlying feature toggle is idempotent from the
//! modem's perspective, so the last request wins.

use serde::{Deserialize, Serialize};

use crate::sm::SmEntry;

/// States of the WiFi hotspot fast-path sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FastPathState {
    Uninit,
    WaitDriverRegistration,
    WaitEnable,
    Enabling,
    Deactivated,
    Activating,
    Activated,
    Deactivating,
    Disabling,
    DriverDisabling,
}

impl FastPathState {
    /// Number of states, and length of the per-state table array.
    pub const COUNT: usize = 10;

    /// Index into the per-state table array.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether a request is in flight toward the modem in this state.
    pub const fn is_in_flight(self) -> bool {
        matches!(
            self,
            Self::Enabling | Self::Activating | Self::Deactivating | Self::Disabling
        )
    }
}

/// Events consumed by the WiFi hotspot state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FastPathEvent {
    EnableRequested,
    DisableRequested,
    ActivateRequested,
    DeactivateRequested,
    DriverRegistered,
    DriverDeregistered,
    ModemAccepted,
    ModemRejected,
}

/// Actions attached to WiFi hotspot transitions, dispatched by the feature
/// orchestrator after the state mutation commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiAction {
    SendEnable,
    SendDisable,
    SendActivate,
    SendDeactivate,
    ReplyEnableOk,
    ReplyEnableFail,
    ReplyActivateOk,
    ReplyActivateFail,
    ReplyDisable,
    ReplyDeactivate,
}

type Entry = SmEntry<FastPathState, FastPathEvent, WifiAction>;

use self::FastPathEvent as Ev;
use self::FastPathState as St;
use self::WifiAction as Act;

const UNINIT: &[Entry] = &[
    Entry::on(Ev::EnableRequested, St::WaitDriverRegistration, None),
    Entry::on(Ev::DriverRegistered, St::WaitEnable, None),
    Entry::default_self(St::Uninit),
];

const WAIT_DRIVER_REGISTRATION: &[Entry] = &[
    Entry::on(Ev::DriverRegistered, St::Enabling, Some(Act::SendEnable)),
    Entry::default_self(St::WaitDriverRegistration),
];

const WAIT_ENABLE: &[Entry] = &[
    Entry::on(Ev::EnableRequested, St::Enabling, Some(Act::SendEnable)),
    Entry::on(Ev::DriverDeregistered, St::Uninit, None),
    Entry::default_self(St::WaitEnable),
];

const ENABLING: &[Entry] = &[
    Entry::on(Ev::ModemAccepted, St::Deactivated, Some(Act::ReplyEnableOk)),
    Entry::on(Ev::ModemRejected, St::WaitEnable, Some(Act::ReplyEnableFail)),
    Entry::default_self(St::Enabling),
];

const DEACTIVATED: &[Entry] = &[
    Entry::on(Ev::ActivateRequested, St::Activating, Some(Act::SendActivate)),
    Entry::on(Ev::DisableRequested, St::Disabling, Some(Act::SendDisable)),
    Entry::default_self(St::Deactivated),
];

const ACTIVATING: &[Entry] = &[
    Entry::on(
        Ev::DeactivateRequested,
        St::Deactivating,
        Some(Act::SendDeactivate),
    ),
    Entry::on(Ev::ModemAccepted, St::Activated, Some(Act::ReplyActivateOk)),
    Entry::on(
        Ev::ModemRejected,
        St::Deactivated,
        Some(Act::ReplyActivateFail),
    ),
    Entry::default_self(St::Activating),
];

const ACTIVATED: &[Entry] = &[
    Entry::on(
        Ev::DeactivateRequested,
        St::Deactivating,
        Some(Act::SendDeactivate),
    ),
    Entry::on(Ev::DisableRequested, St::Disabling, Some(Act::SendDisable)),
    Entry::default_self(St::Activated),
];

const DEACTIVATING: &[Entry] = &[
    Entry::on(Ev::ActivateRequested, St::Activating, Some(Act::SendActivate)),
    Entry::on(Ev::ModemAccepted, St::Deactivated, Some(Act::ReplyDeactivate)),
    Entry::on(Ev::ModemRejected, St::Deactivated, Some(Act::ReplyDeactivate)),
    Entry::default_self(St::Deactivating),
];

const DISABLING: &[Entry] = &[
    Entry::on(Ev::ModemAccepted, St::WaitEnable, Some(Act::ReplyDisable)),
    Entry::on(Ev::ModemRejected, St::WaitEnable, Some(Act::ReplyDisable)),
    Entry::default_self(St::Disabling),
];

const DRIVER_DISABLING: &[Entry] = &[Entry::default_self(St::DriverDisabling)];

/// Per-state transition tables, indexed by [`FastPathState::index`].
pub const STATE_TABLES: [&[Entry]; FastPathState::COUNT] = [
    UNINIT,
    WAIT_DRIVER_REGISTRATION,
    WAIT_ENABLE,
    ENABLING,
    DEACTIVATED,
    ACTIVATING,
    ACTIVATED,
    DEACTIVATING,
    DISABLING,
    DRIVER_DISABLING,
];

/// Table bound to `state` during normal operation.
///
/// During restart recovery the orchestrator bypasses table consultation
/// entirely (the frozen gate), which is the degenerate-table behavior.
#[inline]
pub fn table_for(state: FastPathState) -> &'static [Entry] {
    STATE_TABLES[state.index()]
}
