//! Protocol Stack Layers Library
//!
//! This crate implements the NR RRC control plane of the gNodeB (3GPP TS 38.331)
//! together with the contracts it uses to drive the MAC scheduler, RLC, PDCP,
//! NGAP and the companion LTE (EUTRA) RRC.

pub mod mac;
pub mod rlc;
pub mod pdcp;
pub mod rrc;
pub mod ngap;
pub mod eutra;

use common::types::Rnti;
use nr_asn1::{DecodeError, EncodeError};
use thiserror::Error;

/// Common errors for protocol layers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayerError {
    #[error("Invalid protocol data unit")]
    InvalidPdu,

    #[error("Layer not initialized")]
    NotInitialized,

    /// Also raised when an outbound message does not fit its buffer
    #[error("Failed to pack message: {0}")]
    Encode(#[from] EncodeError),

    #[error("Failed to unpack message: {0}")]
    Decode(#[from] DecodeError),

    #[error("rnti={0} already exists")]
    DuplicateSession(Rnti),

    #[error("rnti={0} does not exist")]
    UnknownSession(Rnti),

    #[error("Scheduler could not reserve an RNTI")]
    ResourceReservationFailure,

    #[error("Unhandled activity timeout kind {0}")]
    UnhandledTimeoutKind(u8),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Bearer configuration error: {0}")]
    BearerConfig(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unsupported message: {0}")]
    UnsupportedMessage(String),

    #[error("SIB index {0} is not configured")]
    NoSuchSib(usize),
}
