//! Serialized LoRaWAN MAC control in Rust
//!
//! This crate runs a device-side LoRaWAN MAC engine behind a single actor
//! thread. The engine and the radio driver are owned by that thread; radio
//! interrupts, timer expiries, engine callbacks and application requests all
//! reach it through one bounded mailbox, so the engine is never re-entered.
//!
//! # Features
//! - OTAA and ABP activation
//! - Confirmed and unconfirmed uplinks with a single operation in flight
//! - Downlink and link-check result delivery
//! - Automatic empty uplinks when the network has pending data
//! - SX127x driver over `embedded-hal`
//!
//! # Example
//! ```no_run
//! use loramac_actor::{
//!     config::device::{DeviceConfig, JoinType},
//!     device::{JoinOutcome, MacDevice, ReceiveOutcome, SendOutcome},
//!     lorawan::MacEngine,
//!     radio::RadioDriver,
//!     ActorError,
//! };
//!
//! fn run<E, R>(engine: E, radio: R) -> Result<(), ActorError>
//! where
//!     E: MacEngine + Send + 'static,
//!     R: RadioDriver + Send + 'static,
//! {
//!     let config = DeviceConfig::new_otaa(
//!         [0x00; 8],  // DevEUI
//!         [0x00; 8],  // AppEUI
//!         [0x00; 16], // AppKey
//!     );
//!
//!     let device = MacDevice::init(engine, radio, config)?;
//!
//!     // Hand this to the radio interrupt handler
//!     let _notifier = device.radio_notifier();
//!
//!     if device.join(JoinType::Otaa)? == JoinOutcome::Succeeded
//!         && device.send(b"Hello, LoRaWAN!")? == SendOutcome::TxScheduled
//!     {
//!         if let ReceiveOutcome::DataReceived(rx) = device.receive()? {
//!             println!("{} bytes on port {}", rx.payload.len(), rx.port);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

/// Device and network configuration
pub mod config;

/// LoRaWAN MAC engine interface
pub mod lorawan;

/// Radio hardware abstraction layer
pub mod radio;

/// MAC actor thread and its producers
#[cfg(feature = "std")]
pub mod actor;

/// High-level device interface
#[cfg(feature = "std")]
pub mod device;

/// Actor infrastructure errors
#[cfg(feature = "std")]
pub mod error;

#[cfg(feature = "std")]
pub use device::{JoinOutcome, MacDevice, ReceiveOutcome, SendOutcome};
#[cfg(feature = "std")]
pub use error::ActorError;
