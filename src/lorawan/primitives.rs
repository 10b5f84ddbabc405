use heapless::Vec;

use crate::config::device::{AESKey, DeviceClass, EUI64};

/// Maximum MAC payload size
pub const MAX_MAC_PAYLOAD_SIZE: usize = 242;

/// Application payload buffer
pub type Payload = Vec<u8, MAX_MAC_PAYLOAD_SIZE>;

/// Synchronous status returned by engine requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoRaMacStatus {
    /// Request accepted
    Ok,
    /// The engine is running another procedure
    Busy,
    /// Unknown service or request type
    ServiceUnknown,
    /// A parameter was rejected
    ParameterInvalid,
    /// No network joined
    NoNetworkJoined,
    /// Payload does not fit at the current datarate
    LengthError,
    /// The engine is not initialized
    DeviceOff,
    /// The region is not compiled into the engine
    RegionNotSupported,
    /// Regulatory duty cycle forbids transmitting now
    DutyCycleRestricted,
}

/// Asynchronous status carried by confirms and indications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventInfoStatus {
    /// Service performed successfully
    Ok,
    /// Unspecified error
    Error,
    /// Transmission did not complete in time
    TxTimeout,
    /// No frame in the first receive window
    Rx1Timeout,
    /// No frame in the second receive window
    Rx2Timeout,
    /// Reception error in the first receive window
    Rx1Error,
    /// Reception error in the second receive window
    Rx2Error,
    /// The network rejected or never answered the join
    JoinFail,
    /// Downlink with an already seen frame counter
    DownlinkRepeated,
    /// Payload too large for the datarate
    TxDrPayloadSizeError,
    /// Frame addressed to another device
    AddressFail,
    /// Message integrity check failed
    MicFail,
}

impl EventInfoStatus {
    /// Whether the event reports success
    pub fn is_ok(self) -> bool {
        self == EventInfoStatus::Ok
    }
}

/// MCPS service kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum McpsType {
    /// Unconfirmed data frame
    Unconfirmed,
    /// Confirmed data frame
    Confirmed,
    /// Multicast downlink
    Multicast,
    /// Proprietary frame
    Proprietary,
}

/// Data uplink request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McpsRequest {
    /// Unconfirmed uplink
    Unconfirmed {
        /// Application port (0 carries MAC commands only)
        port: u8,
        /// Application payload
        payload: Payload,
        /// Uplink datarate index
        datarate: u8,
    },
    /// Confirmed uplink
    Confirmed {
        /// Application port
        port: u8,
        /// Application payload
        payload: Payload,
        /// Maximum number of transmissions
        trials: u8,
        /// Uplink datarate index
        datarate: u8,
    },
}

impl McpsRequest {
    /// Empty unconfirmed uplink used to push pending MAC commands
    pub fn flush(datarate: u8) -> Self {
        McpsRequest::Unconfirmed {
            port: 0,
            payload: Payload::new(),
            datarate,
        }
    }

    /// Service kind of the request
    pub fn kind(&self) -> McpsType {
        match self {
            McpsRequest::Unconfirmed { .. } => McpsType::Unconfirmed,
            McpsRequest::Confirmed { .. } => McpsType::Confirmed,
        }
    }

    /// Application port
    pub fn port(&self) -> u8 {
        match self {
            McpsRequest::Unconfirmed { port, .. } | McpsRequest::Confirmed { port, .. } => *port,
        }
    }

    /// Application payload
    pub fn payload(&self) -> &[u8] {
        match self {
            McpsRequest::Unconfirmed { payload, .. } | McpsRequest::Confirmed { payload, .. } => {
                payload
            }
        }
    }
}

/// Outcome of a previously accepted MCPS request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpsConfirm {
    /// Kind of the confirmed request
    pub request: McpsType,
    /// Transmission status
    pub status: EventInfoStatus,
    /// Acknowledgement received for a confirmed uplink
    pub ack_received: bool,
}

/// Downlink delivered by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpsIndication {
    /// Kind of the downlink
    pub indication: McpsType,
    /// Reception status
    pub status: EventInfoStatus,
    /// Frame was addressed to a multicast group
    pub multicast: bool,
    /// Application port
    pub port: u8,
    /// Datarate the frame was received on
    pub rx_datarate: u8,
    /// Network has more data queued for the device
    pub frame_pending: bool,
    /// Frame carried application data
    pub rx_data: bool,
    /// Application payload
    pub payload: Payload,
    /// Received signal strength in dBm
    pub rssi: i16,
    /// Signal to noise ratio in dB
    pub snr: i8,
    /// Frame acknowledges the last confirmed uplink
    pub ack_received: bool,
}

impl Default for McpsIndication {
    fn default() -> Self {
        Self {
            indication: McpsType::Unconfirmed,
            status: EventInfoStatus::Ok,
            multicast: false,
            port: 0,
            rx_datarate: 0,
            frame_pending: false,
            rx_data: false,
            payload: Payload::new(),
            rssi: 0,
            snr: 0,
            ack_received: false,
        }
    }
}

/// Management request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MlmeRequest {
    /// Over-the-air join
    Join {
        /// Device EUI
        dev_eui: EUI64,
        /// Application EUI
        app_eui: EUI64,
        /// Application root key
        app_key: AESKey,
        /// Datarate for the join request
        datarate: u8,
    },
    /// Piggy-back a LinkCheckReq on the next uplink
    LinkCheck,
}

/// MLME service kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MlmeType {
    /// Over-the-air join
    Join,
    /// LinkCheckReq/Ans exchange
    LinkCheck,
    /// Continuous wave test transmission
    TxCw,
}

/// Outcome of a previously accepted MLME request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MlmeConfirm {
    /// Kind of the confirmed request
    pub request: MlmeType,
    /// Procedure status
    pub status: EventInfoStatus,
    /// Link margin reported by LinkCheckAns
    pub demod_margin: u8,
    /// Number of gateways reported by LinkCheckAns
    pub nb_gateways: u8,
}

/// Unsolicited management events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MlmeIndication {
    /// The device shall send an uplink as soon as possible
    ScheduleUplink,
    /// Class B beacon acquired
    BeaconLocked,
    /// Class B beacon lost
    BeaconLost,
}

/// Engine information base attributes written by the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MibParam {
    /// Activation state
    NetworkJoined(bool),
    /// Network identifier
    NetId(u32),
    /// Device address
    DevAddr(u32),
    /// Network session key
    NwkSKey(AESKey),
    /// Application session key
    AppSKey(AESKey),
    /// Adaptive data rate
    Adr(bool),
    /// Public or private network sync word
    PublicNetwork(bool),
    /// Device class
    DeviceClass(DeviceClass),
    /// Default uplink datarate
    ChannelsDatarate(u8),
}
