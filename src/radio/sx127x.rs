use embedded_hal::{
    blocking::{
        delay::DelayMs,
        spi::{Transfer, Write},
    },
    digital::v2::OutputPin,
};

use crate::radio::traits::{IrqEvents, PacketInfo, RadioDriver, RadioEvent};

// SX127x Register Map
const REG_FIFO: u8 = 0x00;
const REG_OP_MODE: u8 = 0x01;
const REG_FIFO_ADDR_PTR: u8 = 0x0D;
const REG_FIFO_TX_BASE_ADDR: u8 = 0x0E;
const REG_FIFO_RX_BASE_ADDR: u8 = 0x0F;
const REG_FIFO_RX_CURRENT_ADDR: u8 = 0x10;
const REG_IRQ_FLAGS: u8 = 0x12;
const REG_RX_NB_BYTES: u8 = 0x13;
const REG_PKT_SNR_VALUE: u8 = 0x19;
const REG_PKT_RSSI_VALUE: u8 = 0x1A;
const REG_HOP_CHANNEL: u8 = 0x1C;
const REG_VERSION: u8 = 0x42;

const CHIP_VERSION: u8 = 0x12;

// Operating Mode bits
const MODE_LONG_RANGE_MODE: u8 = 0x80;
const MODE_SLEEP: u8 = 0x00;
const MODE_STDBY: u8 = 0x01;

// IRQ Flags
const IRQ_RX_TIMEOUT_MASK: u8 = 0x80;
const IRQ_RX_DONE_MASK: u8 = 0x40;
const IRQ_PAYLOAD_CRC_ERROR_MASK: u8 = 0x20;
const IRQ_VALID_HEADER_MASK: u8 = 0x10;
const IRQ_TX_DONE_MASK: u8 = 0x08;
const IRQ_CAD_DONE_MASK: u8 = 0x04;
const IRQ_FHSS_CHANGE_CHANNEL_MASK: u8 = 0x02;
const IRQ_CAD_DETECTED_MASK: u8 = 0x01;

const HOP_CHANNEL_MASK: u8 = 0x3F;

// Packet RSSI offset for the high-frequency port (band 1)
const RSSI_OFFSET_HF: i16 = -157;

/// Possible errors in radio operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    /// SPI transfer error
    Spi,
    /// GPIO error
    Gpio,
    /// Caller buffer cannot hold the received frame
    BufferTooSmall,
    /// Unexpected silicon version
    Hardware,
}

/// SX127x Radio Driver
pub struct SX127x<SPI, CS, RESET>
where
    SPI: Transfer<u8> + Write<u8>,
    CS: OutputPin,
    RESET: OutputPin,
{
    spi: SPI,
    cs: CS,
    reset: RESET,
    last_channel: u8,
    last_cad_success: bool,
}

impl<SPI, CS, RESET> SX127x<SPI, CS, RESET>
where
    SPI: Transfer<u8> + Write<u8>,
    CS: OutputPin,
    RESET: OutputPin,
{
    /// Create new instance of SX127x driver
    ///
    /// Pulses the reset line, checks the silicon version and leaves the chip
    /// in LoRa standby mode.
    pub fn new<D: DelayMs<u8>>(
        spi: SPI,
        cs: CS,
        reset: RESET,
        delay: &mut D,
    ) -> Result<Self, RadioError> {
        let mut radio = Self {
            spi,
            cs,
            reset,
            last_channel: 0,
            last_cad_success: false,
        };

        radio.cs.set_high().map_err(|_| RadioError::Gpio)?;

        // Reset is active low
        radio.reset.set_low().map_err(|_| RadioError::Gpio)?;
        delay.delay_ms(1);
        radio.reset.set_high().map_err(|_| RadioError::Gpio)?;
        delay.delay_ms(6);

        let version = radio.read_register(REG_VERSION)?;
        if version != CHIP_VERSION {
            return Err(RadioError::Hardware);
        }

        // LoRa mode can only be selected from sleep
        radio.set_mode(MODE_SLEEP)?;
        radio.write_register(REG_FIFO_TX_BASE_ADDR, 0x00)?;
        radio.write_register(REG_FIFO_RX_BASE_ADDR, 0x00)?;
        radio.set_mode(MODE_STDBY)?;

        Ok(radio)
    }

    /// Release the bus and pins
    pub fn release(self) -> (SPI, CS, RESET) {
        (self.spi, self.cs, self.reset)
    }

    /// Read a radio register
    fn read_register(&mut self, addr: u8) -> Result<u8, RadioError> {
        self.cs.set_low().map_err(|_| RadioError::Gpio)?;
        let mut buffer = [addr & 0x7F, 0];
        let result = self.spi.transfer(&mut buffer).map(|b| b[1]);
        self.cs.set_high().map_err(|_| RadioError::Gpio)?;
        result.map_err(|_| RadioError::Spi)
    }

    /// Write to a radio register
    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), RadioError> {
        self.cs.set_low().map_err(|_| RadioError::Gpio)?;
        let result = self.spi.write(&[addr | 0x80, value]);
        self.cs.set_high().map_err(|_| RadioError::Gpio)?;
        result.map_err(|_| RadioError::Spi)
    }

    /// Set operating mode
    fn set_mode(&mut self, mode: u8) -> Result<(), RadioError> {
        self.write_register(REG_OP_MODE, MODE_LONG_RANGE_MODE | mode)
    }
}

impl<SPI, CS, RESET> RadioDriver for SX127x<SPI, CS, RESET>
where
    SPI: Transfer<u8> + Write<u8>,
    CS: OutputPin,
    RESET: OutputPin,
{
    type Error = RadioError;

    fn isr(&mut self) -> Result<IrqEvents, Self::Error> {
        let flags = self.read_register(REG_IRQ_FLAGS)?;
        // Flags are cleared by writing them back
        self.write_register(REG_IRQ_FLAGS, flags)?;

        let mut events = IrqEvents::new();
        let mut report = |event| {
            // Every flag maps to at most one event, capacity covers all of them
            let _ = events.push(event);
        };

        if flags & IRQ_TX_DONE_MASK != 0 {
            report(RadioEvent::TxComplete);
        }
        if flags & IRQ_RX_DONE_MASK != 0 {
            if flags & IRQ_PAYLOAD_CRC_ERROR_MASK != 0 {
                report(RadioEvent::CrcError);
            } else {
                report(RadioEvent::RxComplete);
            }
        }
        if flags & IRQ_RX_TIMEOUT_MASK != 0 {
            report(RadioEvent::RxTimeout);
        }
        if flags & IRQ_VALID_HEADER_MASK != 0 {
            report(RadioEvent::ValidHeader);
        }
        if flags & IRQ_CAD_DONE_MASK != 0 {
            self.last_cad_success = flags & IRQ_CAD_DETECTED_MASK != 0;
            if self.last_cad_success {
                report(RadioEvent::CadDetected);
            }
            report(RadioEvent::CadDone);
        }
        if flags & IRQ_FHSS_CHANGE_CHANNEL_MASK != 0 {
            self.last_channel = self.read_register(REG_HOP_CHANNEL)? & HOP_CHANNEL_MASK;
            report(RadioEvent::FhssChangeChannel);
        }

        Ok(events)
    }

    fn read_packet(&mut self, buffer: &mut [u8]) -> Result<(usize, PacketInfo), Self::Error> {
        self.set_mode(MODE_STDBY)?;

        let len = self.read_register(REG_RX_NB_BYTES)? as usize;
        if len > buffer.len() {
            return Err(RadioError::BufferTooSmall);
        }

        // Point the FIFO at the start of the last frame
        let rx_addr = self.read_register(REG_FIFO_RX_CURRENT_ADDR)?;
        self.write_register(REG_FIFO_ADDR_PTR, rx_addr)?;

        self.cs.set_low().map_err(|_| RadioError::Gpio)?;
        let result = match self.spi.write(&[REG_FIFO & 0x7F]) {
            Ok(()) => self
                .spi
                .transfer(&mut buffer[..len])
                .map(|_| ())
                .map_err(|_| RadioError::Spi),
            Err(_) => Err(RadioError::Spi),
        };
        self.cs.set_high().map_err(|_| RadioError::Gpio)?;
        result?;

        let rssi = RSSI_OFFSET_HF + self.read_register(REG_PKT_RSSI_VALUE)? as i16;
        let snr = (self.read_register(REG_PKT_SNR_VALUE)? as i8) / 4;

        Ok((len, PacketInfo { rssi, snr }))
    }

    fn sleep(&mut self) -> Result<(), Self::Error> {
        self.set_mode(MODE_SLEEP)
    }

    fn last_channel(&self) -> u8 {
        self.last_channel
    }

    fn last_cad_success(&self) -> bool {
        self.last_cad_success
    }
}
