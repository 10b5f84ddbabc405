use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{DeviceConfig, MacSettings};
use crate::lorawan::primitives::{McpsIndication, Payload};

/// Operation gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacState {
    /// No caller operation in flight
    Idle,
    /// A join or send awaits its terminal event
    Busy,
}

/// Result of the last LinkCheckAns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkCheckInfo {
    /// Demodulation margin in dB above the gateway sensitivity
    pub demod_margin: u8,
    /// Number of gateways that received the LinkCheckReq
    pub nb_gateways: u8,
}

/// Last downlink carrying application data
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RxData {
    /// Application payload
    pub payload: Payload,
    /// Application port
    pub port: u8,
    /// Received signal strength in dBm
    pub rssi: i16,
    /// Datarate the frame was received on
    pub datarate: u8,
    /// Frame acknowledged the last confirmed uplink
    pub ack: bool,
    /// Frame was addressed to a multicast group
    pub multicast: bool,
}

impl From<&McpsIndication> for RxData {
    fn from(indication: &McpsIndication) -> Self {
        Self {
            payload: indication.payload.clone(),
            port: indication.port,
            rssi: indication.rssi,
            datarate: indication.rx_datarate,
            ack: indication.ack_received,
            multicast: indication.multicast,
        }
    }
}

/// State shared between the actor thread and its callers.
///
/// Identity and settings are written by callers; everything else is written
/// only by the actor thread and read by callers.
#[derive(Debug)]
pub(crate) struct MacContext {
    pub(crate) identity: DeviceConfig,
    pub(crate) settings: MacSettings,
    /// Engine-facing settings changed since last pushed to the engine
    pub(crate) settings_dirty: bool,
    pub(crate) state: MacState,
    pub(crate) joined: bool,
    pub(crate) rx_data: RxData,
    pub(crate) link_check: LinkCheckInfo,
    pub(crate) link_check_available: bool,
}

impl MacContext {
    pub(crate) fn new(identity: DeviceConfig, settings: MacSettings) -> Self {
        Self {
            identity,
            settings,
            settings_dirty: true,
            state: MacState::Idle,
            joined: false,
            rx_data: RxData::default(),
            link_check: LinkCheckInfo::default(),
            link_check_available: false,
        }
    }
}

pub(crate) type SharedContext = Arc<Mutex<MacContext>>;

/// Take the coarse lock. A panic while holding it leaves plain data behind,
/// so a poisoned lock is still usable.
pub(crate) fn lock(context: &Mutex<MacContext>) -> MutexGuard<'_, MacContext> {
    context.lock().unwrap_or_else(PoisonError::into_inner)
}
