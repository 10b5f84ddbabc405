use crate::config::mac::ActiveRegion;

use super::primitives::{
    LoRaMacStatus, McpsConfirm, McpsIndication, McpsRequest, MibParam, MlmeConfirm,
    MlmeIndication, MlmeRequest,
};

/// Radio-side entry points of the MAC engine.
///
/// The actor calls these on its own thread when the radio driver reports an
/// event, so an implementation never sees two of them concurrently.
pub trait RadioEvents {
    /// Transmission finished
    fn tx_done(&mut self);
    /// Frame received
    fn rx_done(&mut self, payload: &[u8], rssi: i16, snr: i8);
    /// Frame received with a bad CRC
    fn rx_error(&mut self);
    /// Receive window closed without a frame
    fn rx_timeout(&mut self);
    /// Transmission did not complete in time
    fn tx_timeout(&mut self);
    /// Frequency hopping moved to another channel
    fn fhss_change_channel(&mut self, channel: u8);
    /// Channel activity detection finished
    fn cad_done(&mut self, detected: bool);
}

/// Confirm/indication callbacks the engine invokes.
///
/// The actor registers one implementation at initialization. Callbacks only
/// enqueue work for the actor loop; they never block.
pub trait MacPrimitives: Send {
    /// MCPS request finished
    fn mcps_confirm(&mut self, confirm: &McpsConfirm);
    /// Downlink received
    fn mcps_indication(&mut self, indication: &McpsIndication);
    /// MLME request finished
    fn mlme_confirm(&mut self, confirm: &MlmeConfirm);
    /// Unsolicited management event
    fn mlme_indication(&mut self, indication: &MlmeIndication);
}

/// Request surface of the external LoRaWAN MAC engine
pub trait MacEngine: RadioEvents {
    /// Register callbacks and start the engine for `region`
    fn initialize<P: MacPrimitives + 'static>(
        &mut self,
        primitives: P,
        region: ActiveRegion,
    ) -> LoRaMacStatus;

    /// Check whether `len` application bytes fit the next uplink
    fn query_tx_possible(&mut self, len: usize) -> LoRaMacStatus;

    /// Queue a data uplink
    fn mcps_request(&mut self, request: &McpsRequest) -> LoRaMacStatus;

    /// Start a management procedure
    fn mlme_request(&mut self, request: &MlmeRequest) -> LoRaMacStatus;

    /// Write an information base attribute
    fn mib_set(&mut self, param: MibParam) -> LoRaMacStatus;
}
