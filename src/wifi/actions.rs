//! Action handlers for the WiFi hotspot transition tables.
//!
//! `send-*` handlers build one request message, push the driver-facing
//! status and move ownership of the message into the transport. A send
//! failure is logged and not retried here: the state transition has already
//! committed, so the machine stays in its in-flight state until the caller
//! re-issues the event or a restart recovery cycle intervenes.
//!
//! `reply-*` handlers push the now-current state to the driver and, except
//! for disable, notify the upper control plane with a fixed result record.

use log::warn;

use crate::constants::{FASTPATH_PROTOCOL_VERSION, WIFI_NETIF_ID};
use crate::message::{FunctionMode, MdMessage, MessageKind};
use crate::traits::{ChannelEndpoints, ControlOp, ControlReply};

use super::tables::WifiAction;
use super::{SmCell, WifiFastPath};

/// Dispatches one table action. Runs with the context lock held.
pub(super) fn run(app: &WifiFastPath, cell: &mut SmCell, action: WifiAction) {
    match action {
        WifiAction::SendEnable => send_enable(app, cell),
        WifiAction::SendDisable => send_common(app, cell, MessageKind::DisableRequest),
        WifiAction::SendActivate => send_activate(app, cell),
        WifiAction::SendDeactivate => send_common(app, cell, MessageKind::DeactivateRequest),
        WifiAction::ReplyEnableOk => reply(app, cell, ControlOp::Enable, true),
        WifiAction::ReplyEnableFail => reply(app, cell, ControlOp::Enable, false),
        WifiAction::ReplyActivateOk => reply(app, cell, ControlOp::Activate, true),
        WifiAction::ReplyActivateFail => reply(app, cell, ControlOp::Activate, false),
        WifiAction::ReplyDisable => reply_disable(app, cell),
        WifiAction::ReplyDeactivate => reply_deactivate(app, cell),
    }
}

/// Best-effort driver status callback; absent hooks are not an error.
fn push_driver_state(app: &WifiFastPath, cell: &SmCell) {
    if let Some(hooks) = app.driver_hooks() {
        hooks.change_state(cell.state);
    }
}

fn submit(app: &WifiFastPath, endpoints: ChannelEndpoints, message: MdMessage) {
    let kind = message.kind;
    if let Err(e) = app.transport_ref().send(endpoints, message) {
        warn!("{kind:?} send failed: {e}; awaiting re-issue or restart recovery");
    }
}

fn send_enable(app: &WifiFastPath, cell: &mut SmCell) {
    push_driver_state(app, cell);

    // A region enumeration failure degrades to an empty descriptor list.
    let regions = match app.transport_ref().shared_regions() {
        Ok(regions) => regions,
        Err(e) => {
            warn!("failed to enumerate shared-memory regions: {e}; advertising none");
            Vec::new()
        }
    };

    let Some(endpoints) = app.endpoints() else {
        warn!("enable action with no configuration installed; dropped");
        return;
    };
    submit(
        app,
        endpoints,
        MdMessage::enable_request(FunctionMode::Tether, FASTPATH_PROTOCOL_VERSION, &regions),
    );
}

fn send_activate(app: &WifiFastPath, cell: &mut SmCell) {
    // Classification must be active no later than the in-flight window
    // begins, so the devices are registered before the request is sent.
    if let Some(config) = app.config_snapshot() {
        app.filter_ref().register_uplink_device(&config.uplink_dev);
        app.filter_ref()
            .register_downlink_device(&config.downlink_dev, WIFI_NETIF_ID);
    }
    send_common(app, cell, MessageKind::ActivateRequest);
}

fn send_common(app: &WifiFastPath, cell: &mut SmCell, kind: MessageKind) {
    push_driver_state(app, cell);
    let Some(endpoints) = app.endpoints() else {
        warn!("{kind:?} action with no configuration installed; dropped");
        return;
    };
    submit(
        app,
        endpoints,
        MdMessage::common_request(kind, FunctionMode::Tether),
    );
}

fn reply(app: &WifiFastPath, cell: &mut SmCell, op: ControlOp, success: bool) {
    push_driver_state(app, cell);
    app.control_ref().notify(ControlReply::new(op, success));
}

fn reply_disable(app: &WifiFastPath, cell: &mut SmCell) {
    // No result record toward the upper control plane for disable.
    push_driver_state(app, cell);
}

fn reply_deactivate(app: &WifiFastPath, cell: &mut SmCell) {
    // Runs exactly once, on the transition out of Deactivating, whether the
    // modem accepted or rejected: deactivation is complete locally either
    // way.
    if let Some(config) = app.config_snapshot() {
        app.filter_ref().unregister_uplink_device(&config.uplink_dev);
        app.filter_ref()
            .unregister_downlink_device(&config.downlink_dev);
    }
    push_driver_state(app, cell);
    app.control_ref()
        .notify(ControlReply::new(ControlOp::Deactivate, true));
}
