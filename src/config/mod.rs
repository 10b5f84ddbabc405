//! Device and network configuration
//!
//! This module contains types for configuring the MAC actor. It includes:
//! - Device identity (DevEUI, AppEUI, keys, device address)
//! - Runtime MAC settings (datarate, port, uplink mode, retries)
//! - Engine start-up parameters (region, network type, class)

/// Device identity and activation types
pub mod device;

/// Runtime MAC settings and their defaults
pub mod mac;

pub use device::{AESKey, DevAddr, DeviceClass, DeviceConfig, JoinType, EUI64};
pub use mac::{ActiveRegion, MacSettings, TxMode};
