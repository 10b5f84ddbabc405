use std::collections::VecDeque;
use std::fmt::Debug;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};

use crate::device::{JoinOutcome, ReceiveOutcome};
use crate::lorawan::engine::MacEngine;
use crate::lorawan::primitives::{LoRaMacStatus, McpsIndication, MibParam};
use crate::radio::traits::RadioDriver;

use super::callbacks::EngineCallbacks;
use super::context::{lock, MacState, RxData, SharedContext};
use super::mailbox::Mailbox;
use super::message::{JoinWaiter, Message, UplinkWaiter};
use super::radio_events::RadioEventAdapter;

/// Caller operation awaiting its terminal event
#[derive(Debug)]
pub(super) enum InFlight {
    Join(JoinWaiter),
    Uplink(UplinkWaiter),
}

/// The actor: sole owner of the engine and the radio.
pub(crate) struct Worker<E, R> {
    pub(super) engine: E,
    pub(super) radio: R,
    pub(super) context: SharedContext,
    pub(super) mailbox: Mailbox<E>,
    pub(super) adapter: RadioEventAdapter<E>,
    /// Set exactly while the gate is Busy
    pub(super) in_flight: Option<InFlight>,
    /// Threads waiting for a downlink outside an uplink cycle, oldest first
    pub(super) listeners: VecDeque<UplinkWaiter>,
}

impl<E, R> Worker<E, R>
where
    E: MacEngine + 'static,
    R: RadioDriver,
{
    pub(crate) fn new(
        engine: E,
        radio: R,
        context: SharedContext,
        mailbox: Mailbox<E>,
    ) -> Self {
        Self {
            engine,
            radio,
            context,
            adapter: RadioEventAdapter::new(mailbox.clone()),
            mailbox,
            in_flight: None,
            listeners: VecDeque::new(),
        }
    }

    /// Thread entry: initialize the engine, report the status, then serve
    pub(crate) fn start(mut self, inbox: Receiver<Message<E>>, ready: Sender<LoRaMacStatus>) {
        let status = self.initialize();
        // init() may have given up waiting; nothing to do about it here
        let _ = ready.send(status);
        if status == LoRaMacStatus::Ok {
            self.run(inbox);
        }
    }

    fn initialize(&mut self) -> LoRaMacStatus {
        debug!("initializing MAC engine");
        let region = lock(&self.context).settings.region;
        let callbacks = EngineCallbacks::new(self.mailbox.clone());
        let status = self.engine.initialize(callbacks, region);
        if status != LoRaMacStatus::Ok {
            warn!("MAC engine initialization failed: {:?}", status);
            return status;
        }

        self.sync_settings();
        lock(&self.context).link_check_available = false;
        status
    }

    fn run(&mut self, inbox: Receiver<Message<E>>) {
        while let Ok(msg) = inbox.recv() {
            if let Message::Isr = msg {
                // Keep interrupt latency bounded: no state machine involved
                self.adapter.service(&mut self.radio, &mut self.engine);
                continue;
            }
            if !self.dispatch(msg) {
                break;
            }
        }
        debug!("MAC worker stopped");
    }

    /// Handle one message; false stops the loop
    pub(crate) fn dispatch(&mut self, msg: Message<E>) -> bool {
        match msg {
            Message::Isr => self.adapter.service(&mut self.radio, &mut self.engine),
            Message::RxTimeout => {
                debug!("RX timer timeout");
                self.engine.rx_timeout();
            }
            Message::TxTimeout => {
                debug!("TX timer timeout");
                self.engine.tx_timeout();
            }
            Message::TimerExpired(callback) => callback(&mut self.engine),
            Message::Command(command, reply) => {
                let answer = self.execute(command);
                if let Some(reply) = reply {
                    reply.send(answer);
                }
            }
            Message::JoinResult(outcome) => self.finish_join(outcome),
            Message::LinkCheckResult {
                demod_margin,
                nb_gateways,
            } => {
                debug!(
                    "link check info: margin {} dB, {} gateway(s)",
                    demod_margin, nb_gateways
                );
                let mut ctx = lock(&self.context);
                ctx.link_check.demod_margin = demod_margin;
                ctx.link_check.nb_gateways = nb_gateways;
                ctx.link_check_available = true;
            }
            Message::TxDone => {
                debug!("TX done");
                self.finish_uplink(ReceiveOutcome::TxDone);
            }
            Message::TxScheduleRequest => {
                debug!("schedule immediate TX");
                self.flush_uplink();
            }
            Message::TxConfirmFailed => {
                debug!("TX failed");
                self.finish_uplink(ReceiveOutcome::TxConfirmFailed);
            }
            Message::RxData(indication) => self.deliver_downlink(&indication),
            Message::Shutdown => return false,
        }
        true
    }

    fn deliver_downlink(&mut self, indication: &McpsIndication) {
        let rx = RxData::from(indication);
        debug!(
            "RX {}: {} bytes, port {}, RSSI {}, DR {}",
            if rx.ack { "ACK" } else { "data" },
            rx.payload.len(),
            rx.port,
            rx.rssi,
            rx.datarate
        );
        lock(&self.context).rx_data = rx.clone();
        self.finish_uplink(ReceiveOutcome::DataReceived(rx));
    }

    /// Terminal event of an OTAA join
    pub(super) fn finish_join(&mut self, outcome: JoinOutcome) {
        debug!("join notification: {:?}", outcome);
        if outcome == JoinOutcome::Succeeded {
            lock(&self.context).joined = true;
        }
        match self.in_flight.take() {
            Some(InFlight::Join(waiter)) => {
                lock(&self.context).state = MacState::Idle;
                deliver(waiter, outcome);
            }
            other => {
                self.in_flight = other;
                debug!("no join in flight, dropped {:?}", outcome);
            }
        }
    }

    /// Terminal event of an uplink cycle, or an unsolicited downlink
    pub(super) fn finish_uplink(&mut self, outcome: ReceiveOutcome) {
        match self.in_flight.take() {
            Some(InFlight::Uplink(waiter)) => {
                lock(&self.context).state = MacState::Idle;
                deliver(waiter, outcome);
            }
            other => {
                self.in_flight = other;
                match outcome {
                    ReceiveOutcome::DataReceived(_) => self.notify_listener(outcome),
                    // Second event of a finished cycle, or a flush completing
                    _ => debug!("no uplink in flight, dropped {:?}", outcome),
                }
            }
        }
    }

    fn notify_listener(&mut self, mut outcome: ReceiveOutcome) {
        while let Some(listener) = self.listeners.pop_front() {
            match listener.try_send(outcome) {
                Ok(()) => return,
                Err(e) => outcome = e.into_inner(),
            }
        }
        debug!("no receiver waiting, dropped {:?}", outcome);
    }

    /// Push engine-facing settings changed since the last command
    pub(super) fn sync_settings(&mut self) {
        let settings = {
            let mut ctx = lock(&self.context);
            if !ctx.settings_dirty {
                return;
            }
            ctx.settings_dirty = false;
            ctx.settings.clone()
        };

        for param in [
            MibParam::ChannelsDatarate(settings.datarate),
            MibParam::Adr(settings.adr),
            MibParam::PublicNetwork(settings.public_network),
            MibParam::DeviceClass(settings.class),
        ] {
            let status = self.engine.mib_set(param);
            if status != LoRaMacStatus::Ok {
                warn!("MIB set {:?} rejected: {:?}", param, status);
            }
        }
    }
}

/// Hand a terminal event to its single-use waiter
fn deliver<T: Debug>(waiter: Sender<T>, outcome: T) {
    if let Err(e) = waiter.try_send(outcome) {
        debug!("caller stopped waiting for {:?}", e.into_inner());
    }
}
