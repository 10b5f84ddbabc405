use thiserror::Error;

use crate::lorawan::primitives::{LoRaMacStatus, MAX_MAC_PAYLOAD_SIZE};

/// Failures of the actor infrastructure itself.
///
/// Protocol outcomes (busy, not joined, restricted, ...) are reported through
/// the outcome enums in [`crate::device`], not through this type.
#[derive(Debug, Error)]
pub enum ActorError {
    /// The worker thread could not be spawned
    #[error("failed to spawn MAC worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    /// The engine refused to initialize
    #[error("MAC engine initialization failed: {0:?}")]
    EngineInit(LoRaMacStatus),
    /// The worker thread is gone
    #[error("MAC worker is no longer running")]
    Disconnected,
    /// Payload exceeds the largest MAC payload
    #[error("payload of {len} bytes exceeds the {max} byte limit", max = MAX_MAC_PAYLOAD_SIZE)]
    PayloadTooLarge {
        /// Offending payload length
        len: usize,
    },
}
