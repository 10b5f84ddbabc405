use log::debug;

use crate::device::JoinOutcome;
use crate::lorawan::engine::MacPrimitives;
use crate::lorawan::primitives::{
    McpsConfirm, McpsIndication, McpsType, MlmeConfirm, MlmeIndication, MlmeType,
};

use super::mailbox::Mailbox;
use super::message::Message;

/// Confirm/indication sink registered with the engine.
///
/// Translates engine callbacks into actor messages; the terminal events are
/// handled later by the actor loop in mailbox order.
pub(crate) struct EngineCallbacks<E> {
    mailbox: Mailbox<E>,
}

impl<E> EngineCallbacks<E> {
    pub(crate) fn new(mailbox: Mailbox<E>) -> Self {
        Self { mailbox }
    }
}

impl<E> MacPrimitives for EngineCallbacks<E> {
    fn mcps_confirm(&mut self, confirm: &McpsConfirm) {
        if !confirm.status.is_ok() {
            debug!("MCPS confirm failed: {:?}", confirm.status);
            self.mailbox.post(Message::TxConfirmFailed);
            return;
        }

        match confirm.request {
            McpsType::Unconfirmed => {
                debug!("MCPS confirm: unconfirmed uplink done");
                self.mailbox.post(Message::TxDone);
            }
            McpsType::Confirmed => {
                debug!("MCPS confirm: confirmed uplink, ack {}", confirm.ack_received);
            }
            McpsType::Proprietary => debug!("MCPS confirm: proprietary"),
            McpsType::Multicast => debug!("MCPS confirm: unexpected multicast"),
        }
    }

    fn mcps_indication(&mut self, indication: &McpsIndication) {
        if !indication.status.is_ok() {
            debug!("MCPS indication not OK: {:?}", indication.status);
            return;
        }
        debug!("MCPS indication {:?}", indication.indication);

        if indication.frame_pending {
            // Give the network an uplink slot to flush its queue
            debug!("MCPS indication: pending data, schedule an uplink");
            self.mailbox.post(Message::TxScheduleRequest);
        }

        if indication.rx_data {
            debug!("MCPS indication: {} bytes on port {}", indication.payload.len(), indication.port);
            self.mailbox.post(Message::RxData(indication.clone()));
        } else {
            self.mailbox.post(Message::TxDone);
        }
    }

    fn mlme_confirm(&mut self, confirm: &MlmeConfirm) {
        match confirm.request {
            MlmeType::Join => {
                let outcome = if confirm.status.is_ok() {
                    debug!("join succeeded");
                    JoinOutcome::Succeeded
                } else {
                    debug!("join not successful: {:?}", confirm.status);
                    JoinOutcome::Failed
                };
                self.mailbox.post(Message::JoinResult(outcome));
            }
            MlmeType::LinkCheck => {
                if confirm.status.is_ok() {
                    debug!("link check answer received");
                    self.mailbox.post(Message::LinkCheckResult {
                        demod_margin: confirm.demod_margin,
                        nb_gateways: confirm.nb_gateways,
                    });
                } else {
                    debug!("link check failed: {:?}", confirm.status);
                }
            }
            MlmeType::TxCw => {}
        }
    }

    fn mlme_indication(&mut self, indication: &MlmeIndication) {
        match indication {
            MlmeIndication::ScheduleUplink => {
                debug!("MLME indication: schedule an uplink");
                self.mailbox.post(Message::TxScheduleRequest);
            }
            MlmeIndication::BeaconLocked | MlmeIndication::BeaconLost => {
                debug!("MLME indication {:?} ignored", indication);
            }
        }
    }
}
