//! NR RRC message trees (TS 38.331) and their packed representation
//!
//! Every message is a plain serde tree: optional IEs are `Option`s, CHOICEs are
//! enums and `SetupRelease` fields use [`SetupRelease`]. [`pack`] serializes a
//! tree into a byte buffer of bounded capacity and [`unpack`] parses one back.

pub mod bcch;
pub mod ccch;
pub mod cell_group;
pub mod dcch;
pub mod radio_bearer;

pub use bcch::*;
pub use ccch::*;
pub use cell_group::*;
pub use dcch::*;
pub use radio_bearer::*;

use bincode::Options;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Largest PDU accepted by [`unpack`]
pub const MAX_PDU_LEN: usize = 9000;

/// Errors raised while packing a message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("message does not fit into {capacity} bytes")]
    BufferTooSmall { capacity: usize },

    #[error("encoder rejected message: {0}")]
    Invalid(String),
}

/// Errors raised while unpacking a PDU
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty PDU")]
    Empty,

    #[error("PDU of {0} bytes exceeds the maximum PDU length")]
    TooLong(usize),

    #[error("malformed PDU: {0}")]
    Malformed(String),
}

/// SetupRelease { T } wrapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupRelease<T> {
    Release,
    Setup(T),
}

impl<T> SetupRelease<T> {
    pub fn setup(&self) -> Option<&T> {
        match self {
            SetupRelease::Setup(v) => Some(v),
            SetupRelease::Release => None,
        }
    }

    pub fn setup_mut(&mut self) -> Option<&mut T> {
        match self {
            SetupRelease::Setup(v) => Some(v),
            SetupRelease::Release => None,
        }
    }
}

/// Name of the selected CHOICE, used when logging messages
pub trait MessageName {
    fn message_name(&self) -> &'static str;
}

fn codec() -> bincode::DefaultOptions {
    bincode::DefaultOptions::new()
}

/// Pack `msg` into at most `capacity` bytes
pub fn pack<T: Serialize>(msg: &T, capacity: usize) -> Result<Bytes, EncodeError> {
    codec()
        .with_limit(capacity as u64)
        .serialize(msg)
        .map(Bytes::from)
        .map_err(|e| match *e {
            bincode::ErrorKind::SizeLimit => EncodeError::BufferTooSmall { capacity },
            other => EncodeError::Invalid(other.to_string()),
        })
}

/// Unpack a PDU into a message tree. Trailing bytes are rejected.
pub fn unpack<T: DeserializeOwned>(pdu: &[u8]) -> Result<T, DecodeError> {
    if pdu.is_empty() {
        return Err(DecodeError::Empty);
    }
    if pdu.len() > MAX_PDU_LEN {
        return Err(DecodeError::TooLong(pdu.len()));
    }
    codec()
        .with_limit(MAX_PDU_LEN as u64)
        .deserialize(pdu)
        .map_err(|e| DecodeError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_request() -> UlCcchMsg {
        UlCcchMsg::C1(UlCcchC1::RrcSetupRequest(RrcSetupRequest {
            ue_identity: InitialUeIdentity::RandomValue(0x12_3456_789a),
            establishment_cause: EstablishmentCause::MoSignalling,
        }))
    }

    #[test]
    fn test_pack_unpack_ul_ccch() {
        let msg = setup_request();
        let pdu = pack(&msg, MAX_PDU_LEN).unwrap();
        let decoded: UlCcchMsg = unpack(&pdu).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.message_name(), "rrcSetupRequest");
    }

    #[test]
    fn test_pack_reports_small_buffer() {
        let err = pack(&setup_request(), 2).unwrap_err();
        assert_eq!(err, EncodeError::BufferTooSmall { capacity: 2 });
    }

    #[test]
    fn test_unpack_rejects_garbage() {
        assert_eq!(unpack::<UlCcchMsg>(&[]).unwrap_err(), DecodeError::Empty);
        assert!(matches!(unpack::<UlCcchMsg>(&[0xff, 0xff, 0xff]), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_unpack_rejects_trailing_bytes() {
        let mut pdu = pack(&setup_request(), MAX_PDU_LEN).unwrap().to_vec();
        pdu.push(0);
        assert!(unpack::<UlCcchMsg>(&pdu).is_err());
    }

    #[test]
    fn test_messages_render_as_json() {
        let json = serde_json::to_string(&setup_request()).unwrap();
        assert!(json.contains("RrcSetupRequest"));
    }
}
