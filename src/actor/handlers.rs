use log::{debug, warn};

use crate::config::device::JoinType;
use crate::config::mac::TxMode;
use crate::device::{JoinOutcome, ReceiveOutcome};
use crate::lorawan::engine::MacEngine;
use crate::lorawan::primitives::{LoRaMacStatus, McpsRequest, MibParam, MlmeRequest, Payload};
use crate::radio::traits::RadioDriver;

use super::context::{lock, MacState};
use super::message::{Command, CommandReply};
use super::worker::{InFlight, Worker};

impl<E, R> Worker<E, R>
where
    E: MacEngine + 'static,
    R: RadioDriver,
{
    /// Run a caller command on the actor thread
    pub(super) fn execute(&mut self, command: Command) -> CommandReply {
        self.sync_settings();

        match command {
            Command::Join {
                join_type,
                reply_to,
            } => {
                if lock(&self.context).state != MacState::Idle {
                    debug!("join rejected, MAC is busy");
                    return CommandReply::Busy;
                }
                match join_type {
                    JoinType::Otaa => {
                        self.in_flight = Some(InFlight::Join(reply_to));
                        self.join_otaa();
                        CommandReply::JoinPending
                    }
                    JoinType::Abp => {
                        self.join_abp();
                        CommandReply::Joined
                    }
                }
            }
            Command::Send { payload, reply_to } => {
                {
                    let mut ctx = lock(&self.context);
                    if !ctx.joined {
                        debug!("network is not joined");
                        return CommandReply::NotJoined;
                    }
                    if ctx.state != MacState::Idle {
                        debug!("send rejected, MAC is busy");
                        return CommandReply::Busy;
                    }
                    ctx.state = MacState::Busy;
                }
                self.in_flight = Some(InFlight::Uplink(reply_to));
                let port = lock(&self.context).settings.tx_port;
                if self.schedule_uplink(port, payload) != LoRaMacStatus::Ok {
                    self.finish_uplink(ReceiveOutcome::TxConfirmFailed);
                }
                CommandReply::TxScheduled
            }
            Command::Listen(reply_to) => {
                self.listeners.push_back(reply_to);
                CommandReply::Queued
            }
            Command::LinkCheck => {
                self.request_link_check();
                CommandReply::Queued
            }
        }
    }

    fn join_otaa(&mut self) {
        debug!("starting OTAA join");
        let request = {
            let mut ctx = lock(&self.context);
            ctx.state = MacState::Busy;
            ctx.joined = false;
            MlmeRequest::Join {
                dev_eui: ctx.identity.dev_eui,
                app_eui: ctx.identity.app_eui,
                app_key: ctx.identity.app_key,
                datarate: ctx.settings.datarate,
            }
        };

        self.engine.mib_set(MibParam::NetworkJoined(false));
        match self.engine.mlme_request(&request) {
            LoRaMacStatus::Ok => debug!("join request sent"),
            LoRaMacStatus::DutyCycleRestricted => {
                debug!("join request duty cycle restricted");
                self.finish_join(JoinOutcome::Restricted);
            }
            status => {
                debug!("join request rejected: {:?}", status);
                self.finish_join(JoinOutcome::Failed);
            }
        }
    }

    /// Program a pre-provisioned session. No radio exchange, never Busy.
    fn join_abp(&mut self) {
        debug!("starting ABP join");
        let (net_id, identity) = {
            let ctx = lock(&self.context);
            (ctx.settings.net_id, ctx.identity.clone())
        };

        for param in [
            MibParam::NetworkJoined(false),
            MibParam::NetId(net_id),
            MibParam::DevAddr(identity.dev_addr_u32()),
            MibParam::NwkSKey(identity.nwk_skey),
            MibParam::AppSKey(identity.app_skey),
            MibParam::NetworkJoined(true),
        ] {
            let status = self.engine.mib_set(param);
            if status != LoRaMacStatus::Ok {
                warn!("MIB set during ABP join rejected: {:?}", status);
            }
        }

        lock(&self.context).joined = true;
    }

    /// Hand an uplink to the engine.
    ///
    /// When the payload does not fit, an empty frame is sent instead so the
    /// pending MAC commands still go out.
    fn schedule_uplink(&mut self, port: u8, payload: Payload) -> LoRaMacStatus {
        let (tx_mode, retries, datarate) = {
            let ctx = lock(&self.context);
            (ctx.settings.tx_mode, ctx.settings.retries, ctx.settings.datarate)
        };

        let request = if self.engine.query_tx_possible(payload.len()) != LoRaMacStatus::Ok {
            debug!("empty frame in order to flush MAC commands");
            McpsRequest::flush(datarate)
        } else {
            match tx_mode {
                TxMode::Unconfirmed => McpsRequest::Unconfirmed {
                    port,
                    payload,
                    datarate,
                },
                TxMode::Confirmed => McpsRequest::Confirmed {
                    port,
                    payload,
                    trials: retries,
                    datarate,
                },
            }
        };

        let status = self.engine.mcps_request(&request);
        match status {
            LoRaMacStatus::Ok => debug!("MCPS request OK ({:?}, port {})", request.kind(), port),
            LoRaMacStatus::Busy => warn!("MCPS request rejected: engine busy"),
            LoRaMacStatus::DutyCycleRestricted => warn!("MCPS request rejected: duty cycle"),
            other => warn!("MCPS request error {:?}", other),
        }
        status
    }

    /// Empty port 0 uplink on behalf of the engine or network
    pub(super) fn flush_uplink(&mut self) {
        self.schedule_uplink(0, Payload::new());
    }

    fn request_link_check(&mut self) {
        lock(&self.context).link_check_available = false;
        let status = self.engine.mlme_request(&MlmeRequest::LinkCheck);
        if status != LoRaMacStatus::Ok {
            warn!("link check request rejected: {:?}", status);
        }
    }
}
