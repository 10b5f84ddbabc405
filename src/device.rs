//! High-level device interface
//!
//! [`MacDevice`] is the handle application threads use to drive the MAC
//! actor: join, send, wait for the outcome, and read back downlinks and
//! link-check results. All methods take `&self`; share the device between
//! threads with an `Arc`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam_channel::{bounded, Receiver};
use log::debug;

use crate::{
    actor::{
        self, lock, Command, CommandReply, LinkCheckInfo, MacContext, MacState, Mailbox, Message,
        RadioNotifier, RxData, SharedContext, TimerDispatcher,
    },
    config::{
        device::{AESKey, DevAddr, DeviceClass, DeviceConfig, JoinType, EUI64},
        mac::{MacSettings, TxMode},
    },
    error::ActorError,
    lorawan::{engine::MacEngine, primitives::Payload},
    radio::traits::RadioDriver,
};

/// Result of [`MacDevice::join`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JoinOutcome {
    /// The device is activated
    Succeeded,
    /// The network did not accept the join, or the engine refused it
    Failed,
    /// Duty cycle forbids joining now
    Restricted,
    /// Another operation is in flight
    Busy,
}

/// Result of [`MacDevice::send`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendOutcome {
    /// Uplink handed to the engine, outcome follows on [`MacDevice::receive`]
    TxScheduled,
    /// The device has not joined a network
    NotJoined,
    /// Another operation is in flight
    Busy,
}

/// Terminal event returned by [`MacDevice::receive`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// A downlink with application data arrived
    DataReceived(RxData),
    /// The uplink cycle finished without application data
    TxDone,
    /// The uplink failed
    TxConfirmFailed,
}

/// Outcome endpoint of the last accepted uplink and the thread that sent it
type PendingUplink = Option<(ThreadId, Receiver<ReceiveOutcome>)>;

/// Handle to a running MAC actor
pub struct MacDevice<E> {
    mailbox: Mailbox<E>,
    context: SharedContext,
    pending_uplink: Mutex<PendingUplink>,
    worker: Option<JoinHandle<()>>,
}

impl<E: MacEngine + Send + 'static> MacDevice<E> {
    /// Start the actor with default MAC settings
    pub fn init<R>(engine: E, radio: R, config: DeviceConfig) -> Result<Self, ActorError>
    where
        R: RadioDriver + Send + 'static,
    {
        Self::with_settings(engine, radio, config, MacSettings::default())
    }

    /// Start the actor.
    ///
    /// Spawns the worker thread, which initializes the engine and pushes the
    /// engine-facing settings before this returns.
    pub fn with_settings<R>(
        engine: E,
        radio: R,
        config: DeviceConfig,
        settings: MacSettings,
    ) -> Result<Self, ActorError>
    where
        R: RadioDriver + Send + 'static,
    {
        let context = Arc::new(Mutex::new(MacContext::new(config, settings)));
        let (mailbox, inbox) = Mailbox::new();

        let worker = actor::spawn(engine, radio, Arc::clone(&context), mailbox.clone(), inbox)?;

        Ok(Self {
            mailbox,
            context,
            pending_uplink: Mutex::new(None),
            worker: Some(worker),
        })
    }
}

impl<E> MacDevice<E> {
    /// Activate the device.
    ///
    /// OTAA blocks until the network answers or the engine gives up. ABP
    /// completes immediately.
    pub fn join(&self, join_type: JoinType) -> Result<JoinOutcome, ActorError> {
        debug!("starting join procedure: {:?}", join_type);
        if self.state() != MacState::Idle {
            debug!("internal mac is busy");
            return Ok(JoinOutcome::Busy);
        }

        let (reply_to, result) = bounded(1);
        match self.mailbox.call(Command::Join {
            join_type,
            reply_to,
        })? {
            CommandReply::JoinPending => result.recv().map_err(|_| ActorError::Disconnected),
            CommandReply::Joined => Ok(JoinOutcome::Succeeded),
            CommandReply::Busy => Ok(JoinOutcome::Busy),
            other => {
                debug!("unexpected join reply {:?}", other);
                Ok(JoinOutcome::Failed)
            }
        }
    }

    /// Queue an uplink on the configured port.
    ///
    /// `TxScheduled` only means the actor handed the frame to the engine; the
    /// outcome of the transmission is returned by [`MacDevice::receive`] on the
    /// same thread.
    pub fn send(&self, data: &[u8]) -> Result<SendOutcome, ActorError> {
        let payload = Payload::from_slice(data)
            .map_err(|_| ActorError::PayloadTooLarge { len: data.len() })?;

        {
            let mut ctx = lock(&self.context);
            // A new uplink invalidates the previous link check answer
            ctx.link_check_available = false;
            if !ctx.joined {
                debug!("network is not joined");
                return Ok(SendOutcome::NotJoined);
            }
            if ctx.state != MacState::Idle {
                debug!("internal mac is busy");
                return Ok(SendOutcome::Busy);
            }
        }

        let (reply_to, outcome) = bounded(1);
        match self.mailbox.call(Command::Send { payload, reply_to })? {
            CommandReply::TxScheduled => {
                *self.pending_uplink() = Some((thread::current().id(), outcome));
                Ok(SendOutcome::TxScheduled)
            }
            CommandReply::NotJoined => Ok(SendOutcome::NotJoined),
            CommandReply::Busy => Ok(SendOutcome::Busy),
            other => {
                debug!("unexpected send reply {:?}", other);
                Ok(SendOutcome::Busy)
            }
        }
    }

    /// Block until the next uplink outcome or downlink.
    ///
    /// On the thread that issued the last accepted [`MacDevice::send`], this
    /// returns the terminal event of that uplink. On any other thread, or once
    /// that event has been taken, it waits for the next downlink received
    /// outside an uplink cycle.
    pub fn receive(&self) -> Result<ReceiveOutcome, ActorError> {
        let current = thread::current().id();
        let pending = {
            let mut pending = self.pending_uplink();
            match pending.take() {
                Some((owner, outcome)) if owner == current => Some(outcome),
                other => {
                    *pending = other;
                    None
                }
            }
        };

        let outcome = match pending {
            Some(outcome) => outcome,
            None => {
                let (reply_to, outcome) = bounded(1);
                self.mailbox.cast(Command::Listen(reply_to))?;
                outcome
            }
        };

        let outcome = outcome.recv().map_err(|_| ActorError::Disconnected)?;
        debug!("MAC reply received: {:?}", outcome);
        Ok(outcome)
    }

    /// Ask the network for a link check on the next uplink.
    ///
    /// The answer is read with [`MacDevice::link_check`].
    pub fn request_link_check(&self) -> Result<(), ActorError> {
        self.mailbox.cast(Command::LinkCheck)
    }

    /// Cached link check answer, if one arrived since the last request
    pub fn link_check(&self) -> Option<LinkCheckInfo> {
        let ctx = lock(&self.context);
        ctx.link_check_available.then_some(ctx.link_check)
    }

    /// Last downlink carrying application data
    pub fn rx_data(&self) -> RxData {
        lock(&self.context).rx_data.clone()
    }

    /// Current operation gate
    pub fn state(&self) -> MacState {
        lock(&self.context).state
    }

    /// Whether a join has completed successfully
    pub fn is_joined(&self) -> bool {
        lock(&self.context).joined
    }

    /// Producer for the radio interrupt and timeout sources
    pub fn radio_notifier(&self) -> RadioNotifier<E> {
        RadioNotifier::new(self.mailbox.clone())
    }

    /// Producer for engine timer expiries
    pub fn timer_dispatcher(&self) -> TimerDispatcher<E> {
        TimerDispatcher::new(self.mailbox.clone())
    }

    /// Copy of the device identity
    pub fn config(&self) -> DeviceConfig {
        lock(&self.context).identity.clone()
    }

    /// Copy of the MAC settings
    pub fn settings(&self) -> MacSettings {
        lock(&self.context).settings.clone()
    }

    /// Set the device EUI used by the next OTAA join
    pub fn set_dev_eui(&self, dev_eui: EUI64) {
        lock(&self.context).identity.dev_eui = dev_eui;
    }

    /// Set the application EUI used by the next OTAA join
    pub fn set_app_eui(&self, app_eui: EUI64) {
        lock(&self.context).identity.app_eui = app_eui;
    }

    /// Set the application key used by the next OTAA join
    pub fn set_app_key(&self, app_key: AESKey) {
        lock(&self.context).identity.app_key = app_key;
    }

    /// Set the device address used by the next ABP join
    pub fn set_dev_addr(&self, dev_addr: DevAddr) {
        lock(&self.context).identity.dev_addr = dev_addr;
    }

    /// Set the network session key used by the next ABP join
    pub fn set_nwk_skey(&self, nwk_skey: AESKey) {
        lock(&self.context).identity.nwk_skey = nwk_skey;
    }

    /// Set the application session key used by the next ABP join
    pub fn set_app_skey(&self, app_skey: AESKey) {
        lock(&self.context).identity.app_skey = app_skey;
    }

    /// Set the network identifier programmed by the next ABP join
    pub fn set_net_id(&self, net_id: u32) {
        lock(&self.context).settings.net_id = net_id;
    }

    /// Set the uplink datarate
    pub fn set_datarate(&self, datarate: u8) {
        self.update_engine_setting(|s| s.datarate = datarate);
    }

    /// Enable or disable adaptive data rate
    pub fn set_adr(&self, adr: bool) {
        self.update_engine_setting(|s| s.adr = adr);
    }

    /// Select the public or private network sync word
    pub fn set_public_network(&self, public_network: bool) {
        self.update_engine_setting(|s| s.public_network = public_network);
    }

    /// Set the device class
    pub fn set_class(&self, class: DeviceClass) {
        self.update_engine_setting(|s| s.class = class);
    }

    /// Set the uplink application port
    pub fn set_tx_port(&self, port: u8) {
        lock(&self.context).settings.tx_port = port;
    }

    /// Select confirmed or unconfirmed uplinks
    pub fn set_tx_mode(&self, mode: TxMode) {
        lock(&self.context).settings.tx_mode = mode;
    }

    /// Set the number of transmissions for confirmed uplinks
    pub fn set_retries(&self, retries: u8) {
        lock(&self.context).settings.retries = retries;
    }

    fn pending_uplink(&self) -> MutexGuard<'_, PendingUplink> {
        self.pending_uplink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // Engine-facing settings are pushed by the actor before its next command
    fn update_engine_setting(&self, update: impl FnOnce(&mut MacSettings)) {
        let mut ctx = lock(&self.context);
        update(&mut ctx.settings);
        ctx.settings_dirty = true;
    }
}

impl<E> Drop for MacDevice<E> {
    fn drop(&mut self) {
        if self.mailbox.send_blocking(Message::Shutdown).is_err() {
            debug!("MAC worker already stopped");
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
