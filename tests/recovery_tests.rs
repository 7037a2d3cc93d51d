//! Integration tests for restart recovery.
//!
//! A modem restart mid-sequence freezes the state machine, retries the
//! acknowledgment until the transport accepts it, then resumes by forcing
//! the machine back to `WaitEnable` and re-issuing the enable request.

mod common;
use common::{
    build_provisioned, drive_to_activated, encode_common_response, register_recording_driver,
    wait_until,
};

use std::time::Duration;

use mdoffload::message::MessageKind;
use mdoffload::wifi::FastPathState;

const RECOVERY_TIMEOUT: Duration = Duration::from_secs(2);

#[test]
fn restart_recovery_resumes_enable_sequence() {
    let harness = build_provisioned();
    let driver = drive_to_activated(&harness);
    assert_eq!(harness.transport.sent_count(MessageKind::EnableRequest), 1);

    harness
        .app
        .handle_modem_message(MessageKind::ResetIndication.raw(), &[])
        .unwrap();
    assert!(harness.app.recovery_in_progress());

    assert!(wait_until(
        || !harness.app.recovery_in_progress(),
        RECOVERY_TIMEOUT
    ));

    // One acknowledgment on the wire, state forced through WaitEnable and
    // exactly one re-issued enable request.
    assert_eq!(harness.transport.sent_count(MessageKind::ResetIndication), 1);
    assert_eq!(harness.app.state(), FastPathState::Enabling);
    assert_eq!(harness.transport.sent_count(MessageKind::EnableRequest), 2);

    // The driver received the synthetic modem-reset indication.
    let infos = driver.md_infos();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].info_type, 1);
    assert_eq!(infos[0].version, 0);
    assert!(infos[0].buf.is_empty());
}

#[test]
fn acknowledgment_retries_until_transport_recovers() {
    let harness = build_provisioned();
    drive_to_activated(&harness);

    // The first three acknowledgment attempts fail; the fourth succeeds.
    harness.transport.fail_next_sends(3);
    harness
        .app
        .handle_modem_message(MessageKind::ResetIndication.raw(), &[])
        .unwrap();

    assert!(wait_until(
        || !harness.app.recovery_in_progress(),
        RECOVERY_TIMEOUT
    ));
    assert_eq!(harness.transport.sent_count(MessageKind::ResetIndication), 1);
    assert_eq!(*harness.transport.send_failures.lock(), 0);
    assert_eq!(harness.app.state(), FastPathState::Enabling);
}

#[test]
fn duplicate_restart_indications_run_one_recovery_cycle() {
    let harness = build_provisioned();
    let driver = drive_to_activated(&harness);

    harness
        .app
        .handle_modem_message(MessageKind::ResetIndication.raw(), &[])
        .unwrap();
    // Second indication while the first is still pending: a no-op.
    harness
        .app
        .handle_modem_message(MessageKind::ResetIndication.raw(), &[])
        .unwrap();

    assert!(wait_until(
        || !harness.app.recovery_in_progress(),
        RECOVERY_TIMEOUT
    ));
    assert_eq!(harness.transport.sent_count(MessageKind::ResetIndication), 1);
    assert_eq!(driver.md_infos().len(), 1);
    assert_eq!(harness.transport.sent_count(MessageKind::EnableRequest), 2);
}

#[test]
fn events_are_absorbed_while_frozen() {
    let harness = build_provisioned();
    drive_to_activated(&harness);

    // Keep the acknowledgment failing so the machine stays frozen.
    harness.transport.fail_next_sends(1000);
    harness
        .app
        .handle_modem_message(MessageKind::ResetIndication.raw(), &[])
        .unwrap();

    let state_before = harness.app.state();
    harness.app.deactivate().unwrap();
    harness.app.disable().unwrap();
    harness
        .app
        .handle_modem_message(
            MessageKind::ActivateResponse.raw(),
            &encode_common_response(true),
        )
        .unwrap();

    // Nothing moved and nothing was sent while frozen.
    assert_eq!(harness.app.state(), state_before);
    assert_eq!(
        harness.transport.sent_count(MessageKind::DeactivateRequest),
        0
    );
    assert_eq!(harness.transport.sent_count(MessageKind::DisableRequest), 0);

    // Let the transport recover and the cycle complete.
    harness.transport.fail_next_sends(0);
    assert!(wait_until(
        || !harness.app.recovery_in_progress(),
        RECOVERY_TIMEOUT
    ));
    assert_eq!(harness.app.state(), FastPathState::Enabling);
}

#[test]
fn recovery_before_first_enable_does_not_force_resume() {
    let harness = build_provisioned();
    // Provisioned but no driver: the machine sits in Uninit.
    assert_eq!(harness.app.state(), FastPathState::Uninit);

    harness
        .app
        .handle_modem_message(MessageKind::ResetIndication.raw(), &[])
        .unwrap();
    assert!(wait_until(
        || !harness.app.recovery_in_progress(),
        RECOVERY_TIMEOUT
    ));

    assert_eq!(harness.transport.sent_count(MessageKind::ResetIndication), 1);
    assert_eq!(harness.app.state(), FastPathState::Uninit);
    assert_eq!(harness.transport.sent_count(MessageKind::EnableRequest), 0);
}

#[test]
fn recovery_from_wait_driver_registration_keeps_state() {
    let harness = build_provisioned();
    harness.app.enable().unwrap();
    assert_eq!(harness.app.state(), FastPathState::WaitDriverRegistration);

    harness
        .app
        .handle_modem_message(MessageKind::ResetIndication.raw(), &[])
        .unwrap();
    assert!(wait_until(
        || !harness.app.recovery_in_progress(),
        RECOVERY_TIMEOUT
    ));

    assert_eq!(harness.app.state(), FastPathState::WaitDriverRegistration);
    assert_eq!(harness.transport.sent_count(MessageKind::EnableRequest), 0);

    // The pending registration still completes the enable afterwards.
    register_recording_driver(&harness);
    assert_eq!(harness.app.state(), FastPathState::Enabling);
    assert_eq!(harness.transport.sent_count(MessageKind::EnableRequest), 1);
}

#[test]
fn recovery_completion_allows_full_reenable_round_trip() {
    let harness = build_provisioned();
    drive_to_activated(&harness);
    harness
        .app
        .handle_modem_message(MessageKind::ResetIndication.raw(), &[])
        .unwrap();
    assert!(wait_until(
        || !harness.app.recovery_in_progress(),
        RECOVERY_TIMEOUT
    ));
    assert_eq!(harness.app.state(), FastPathState::Enabling);

    // The re-issued enable resolves like any other.
    harness
        .app
        .handle_modem_message(
            MessageKind::EnableResponse.raw(),
            &common::encode_enable_response(true, 2),
        )
        .unwrap();
    assert_eq!(harness.app.state(), FastPathState::Deactivated);
}
