//! Radio hardware abstraction layer

/// Driver trait and event types
pub mod traits;
/// Semtech SX127x driver
pub mod sx127x;

pub use traits::{IrqEvents, PacketInfo, RadioDriver, RadioEvent};
pub use sx127x::SX127x;
