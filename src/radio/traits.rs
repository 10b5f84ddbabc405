use heapless::Vec;

/// Largest frame the transceiver FIFO can hold
pub const RX_BUFFER_SIZE: usize = 255;

/// Upper bound on events reported by a single interrupt service pass
pub const MAX_IRQ_EVENTS: usize = 8;

/// Events raised by the radio driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioEvent {
    /// Interrupt line asserted; service it outside interrupt context
    Isr,
    /// Transmission finished
    TxComplete,
    /// Transmission did not finish in time
    TxTimeout,
    /// Frame received and waiting in the FIFO
    RxComplete,
    /// Receive window closed without a frame
    RxTimeout,
    /// Frame received with a bad payload CRC
    CrcError,
    /// Frequency hopping period elapsed
    FhssChangeChannel,
    /// Channel activity detection finished
    CadDone,
    /// Channel activity detected
    CadDetected,
    /// Valid LoRa header received
    ValidHeader,
}

/// Events collected by one interrupt service pass
pub type IrqEvents = Vec<RadioEvent, MAX_IRQ_EVENTS>;

/// Metadata of a received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketInfo {
    /// Received signal strength in dBm
    pub rssi: i16,
    /// Signal to noise ratio in dB
    pub snr: i8,
}

/// Transceiver driver as seen by the MAC actor
pub trait RadioDriver {
    /// Error type for radio operations
    type Error: core::fmt::Debug;

    /// Service a pending interrupt and report what it signalled
    fn isr(&mut self) -> Result<IrqEvents, Self::Error>;

    /// Copy the last received frame into `buffer`
    /// Returns the frame length and its signal metadata
    fn read_packet(&mut self, buffer: &mut [u8]) -> Result<(usize, PacketInfo), Self::Error>;

    /// Put the radio into sleep mode
    fn sleep(&mut self) -> Result<(), Self::Error>;

    /// Channel selected by the last frequency hop
    fn last_channel(&self) -> u8;

    /// Whether the last CAD found activity
    fn last_cad_success(&self) -> bool;
}
