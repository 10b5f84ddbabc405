//! LoRaWAN MAC engine interface
//!
//! The protocol itself (channel plans, ADR, duty cycle, encryption) lives in an
//! external engine. This module describes the surface the actor drives:
//! - Request primitives (MCPS data, MLME management, MIB attributes)
//! - Confirm and indication callbacks
//! - Radio event entry points

/// Engine traits
pub mod engine;

/// Request, confirm and indication types
pub mod primitives;

pub use engine::{MacEngine, MacPrimitives, RadioEvents};
pub use primitives::{
    EventInfoStatus, LoRaMacStatus, McpsConfirm, McpsIndication, McpsRequest, McpsType, MibParam,
    MlmeConfirm, MlmeIndication, MlmeRequest, MlmeType, Payload, MAX_MAC_PAYLOAD_SIZE,
};
