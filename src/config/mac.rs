use super::device::DeviceClass;

/// Default uplink datarate index
pub const DEFAULT_DATARATE: u8 = 0;
/// Default uplink application port
pub const DEFAULT_TX_PORT: u8 = 2;
/// Default number of transmissions for confirmed uplinks
pub const DEFAULT_RETRIES: u8 = 5;
/// Default network identifier
pub const DEFAULT_NET_ID: u32 = 1;

/// Uplink acknowledgement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxMode {
    /// Network must acknowledge the uplink
    Confirmed,
    /// Fire-and-forget uplink
    Unconfirmed,
}

/// Region handed to the MAC engine at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveRegion {
    /// Asia 923 MHz
    AS923,
    /// Australia 915 MHz
    AU915,
    /// China 470 MHz
    CN470,
    /// China 779 MHz
    CN779,
    /// Europe 433 MHz
    EU433,
    /// Europe 868 MHz
    EU868,
    /// India 865 MHz
    IN865,
    /// South Korea 920 MHz
    KR920,
    /// North America 915 MHz
    US915,
}

/// Runtime MAC parameters a caller may change between operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacSettings {
    /// Uplink datarate index
    pub datarate: u8,
    /// Adaptive data rate enabled
    pub adr: bool,
    /// Public (true) or private network sync word
    pub public_network: bool,
    /// Device class
    pub class: DeviceClass,
    /// Uplink application port
    pub tx_port: u8,
    /// Confirmed or unconfirmed uplinks
    pub tx_mode: TxMode,
    /// Transmissions attempted for a confirmed uplink
    pub retries: u8,
    /// Network identifier programmed on ABP join
    pub net_id: u32,
    /// Region passed to the engine at startup
    pub region: ActiveRegion,
}

impl Default for MacSettings {
    fn default() -> Self {
        Self {
            datarate: DEFAULT_DATARATE,
            adr: false,
            public_network: true,
            class: DeviceClass::A,
            tx_port: DEFAULT_TX_PORT,
            tx_mode: TxMode::Confirmed,
            retries: DEFAULT_RETRIES,
            net_id: DEFAULT_NET_ID,
            region: ActiveRegion::EU868,
        }
    }
}
