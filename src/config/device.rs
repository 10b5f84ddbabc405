/// EUI-64 (8 bytes)
pub type EUI64 = [u8; 8];
/// AES-128 key (16 bytes)
pub type AESKey = [u8; 16];
/// Device Address (4 bytes, most significant byte first)
pub type DevAddr = [u8; 4];

/// LoRaWAN device class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceClass {
    /// Class A: Uplink followed by two receive windows
    A,
    /// Class B: Scheduled receive slots (beaconing)
    B,
    /// Class C: Continuously listening except when transmitting
    C,
}

/// Activation procedure requested by a join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JoinType {
    /// Over-the-air activation (radio exchange with the network)
    Otaa,
    /// Activation by personalization (pre-provisioned session)
    Abp,
}

/// Device identity used for both OTAA and ABP activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Device EUI (unique device identifier)
    pub dev_eui: EUI64,
    /// Application EUI
    pub app_eui: EUI64,
    /// Application key (used for OTAA)
    pub app_key: AESKey,
    /// Device address (used for ABP)
    pub dev_addr: DevAddr,
    /// Network session key (used for ABP)
    pub nwk_skey: AESKey,
    /// Application session key (used for ABP)
    pub app_skey: AESKey,
}

impl DeviceConfig {
    /// Create a new OTAA device configuration
    pub fn new_otaa(dev_eui: EUI64, app_eui: EUI64, app_key: AESKey) -> Self {
        Self {
            dev_eui,
            app_eui,
            app_key,
            dev_addr: [0; 4],
            nwk_skey: [0; 16],
            app_skey: [0; 16],
        }
    }

    /// Create a new ABP device configuration
    pub fn new_abp(
        dev_eui: EUI64,
        app_eui: EUI64,
        dev_addr: DevAddr,
        nwk_skey: AESKey,
        app_skey: AESKey,
    ) -> Self {
        Self {
            dev_eui,
            app_eui,
            app_key: [0; 16], // Not used in ABP
            dev_addr,
            nwk_skey,
            app_skey,
        }
    }

    /// Device address packed the way the MAC engine stores it
    pub fn dev_addr_u32(&self) -> u32 {
        u32::from_be_bytes(self.dev_addr)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new_otaa([0; 8], [0; 8], [0; 16])
    }
}
