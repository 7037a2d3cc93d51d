//! Modem-response dispatcher for the WiFi hotspot feature.
//!
//! Demultiplexes inbound modem messages by kind, validates payload lengths
//! and feeds `ModemAccepted` / `ModemRejected` events into the state
//! machine. Unsolicited notifications are routed to the recovery controller
//! (restart indication) or the driver's notification hook (modem info).
//! Unknown kinds are dropped with a diagnostic, never treated as fatal.

use std::sync::Arc;

use log::{info, warn};

use crate::error::FastPathError;
use crate::message::{CommonResponse, DeactivateResponse, EnableResponse, MdNotifyInfo, MessageKind};

use super::{FastPathEvent, WifiFastPath};

fn result_event(accepted: bool) -> FastPathEvent {
    if accepted {
        FastPathEvent::ModemAccepted
    } else {
        FastPathEvent::ModemRejected
    }
}

impl WifiFastPath {
    /// Handles one inbound modem message.
    ///
    /// The payload is only borrowed for the duration of the call; anything
    /// retained (deactivation metadata, modem version) is copied out here.
    ///
    /// # Errors
    /// - [`FastPathError::InvalidResponseLength`] - payload shorter than the
    ///   kind's expected size; no state change, no event emitted
    /// - [`FastPathError::MalformedPayload`] - a field failed to decode
    pub fn handle_modem_message(
        self: &Arc<Self>,
        raw_kind: u32,
        payload: &[u8],
    ) -> Result<(), FastPathError> {
        let Some(kind) = MessageKind::from_raw(raw_kind) else {
            warn!("unsupported message kind 0x{raw_kind:08X} from modem; dropped");
            return Ok(());
        };

        if let Some(expected) = kind.expected_inbound_len() {
            if payload.len() < expected {
                warn!(
                    "{kind:?} length validation failed: expected at least {expected} bytes, got {}",
                    payload.len()
                );
                return Err(FastPathError::InvalidResponseLength {
                    kind,
                    expected,
                    got: payload.len(),
                });
            }
        }

        match kind {
            MessageKind::EnableResponse => {
                let rsp = EnableResponse::decode(payload)?;
                // The modem version is recorded before the result is
                // evaluated; a rejected enable still reports it.
                self.set_modem_version(rsp.version);
                if rsp.accepted {
                    info!("enable accepted, modem version {}", rsp.version);
                } else {
                    warn!("enable rejected by modem");
                }
                self.apply(result_event(rsp.accepted));
            }
            MessageKind::DisableResponse | MessageKind::ActivateResponse => {
                let rsp = CommonResponse::decode(kind, payload)?;
                if rsp.accepted {
                    info!("{kind:?} accepted");
                } else {
                    warn!("{kind:?} rejected by modem");
                }
                self.apply(result_event(rsp.accepted));
            }
            MessageKind::DeactivateResponse => {
                let rsp = DeactivateResponse::decode(payload)?;
                // Cached whether accepted or rejected; the external
                // diagnostics reporter consumes the latest snapshot.
                self.cache_deactivate_metadata(rsp);
                if rsp.accepted {
                    info!("deactivate accepted");
                } else {
                    warn!("deactivate rejected by modem");
                }
                self.apply(result_event(rsp.accepted));
            }
            MessageKind::ResetIndication => {
                warn!("received modem restart indication");
                self.handle_restart_indication();
            }
            MessageKind::ModemNotify => {
                let notify = MdNotifyInfo::decode(payload)?;
                match self.driver_hooks() {
                    Some(hooks) => {
                        info!(
                            "modem notify info_type {} ({} bytes) forwarded to driver",
                            notify.info_type,
                            notify.buf.len()
                        );
                        hooks.notify_md_info(&notify);
                    }
                    None => {
                        info!("modem notify with no driver registered; dropped");
                    }
                }
            }
            other => {
                warn!("request kind {other:?} arrived inbound; dropped");
            }
        }

        Ok(())
    }
}
