//! Radio Link Control (RLC) Layer Interface
//!
//! Bearer configuration and the RLC services used by RRC (3GPP TS 38.322)

use crate::LayerError;
use bytes::Bytes;
use common::types::Rnti;

/// RLC operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RlcMode {
    /// Transparent Mode
    Tm,
    /// Unacknowledged Mode
    Um {
        /// SN field length in bits (6 or 12)
        sn_field_length: u8,
        t_reassembly_ms: u32,
    },
    /// Acknowledged Mode
    Am {
        /// SN field length in bits (12 or 18)
        sn_field_length: u8,
        t_poll_retx_ms: u32,
        /// Poll PDU trigger threshold, `None` for infinity
        poll_pdu: Option<u32>,
        /// Poll byte trigger threshold in kB, `None` for infinity
        poll_byte_kb: Option<u32>,
        max_retx_thresh: u8,
        t_reassembly_ms: u32,
        t_status_prohibit_ms: u32,
    },
}

/// RLC bearer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RlcConfig {
    /// SRB or DRB identity served by the entity
    pub bearer_id: u8,
    /// Operating mode
    pub mode: RlcMode,
}

impl RlcConfig {
    /// Check the SN field length against the mode
    pub fn validate(&self) -> Result<(), LayerError> {
        match self.mode {
            RlcMode::Tm => Ok(()),
            RlcMode::Um { sn_field_length, .. } if sn_field_length == 6 || sn_field_length == 12 => Ok(()),
            RlcMode::Am { sn_field_length, .. } if sn_field_length == 12 || sn_field_length == 18 => Ok(()),
            RlcMode::Um { sn_field_length, .. } | RlcMode::Am { sn_field_length, .. } => Err(
                LayerError::BearerConfig(format!("Invalid RLC SN length {} for {:?}", sn_field_length, self.mode)),
            ),
        }
    }
}

/// RLC services used by RRC
pub trait RlcInterface: Send + Sync {
    fn add_session(&self, rnti: Rnti);

    fn remove_session(&self, rnti: Rnti);

    /// Create an RLC entity for `lcid`
    fn add_bearer(&self, rnti: Rnti, lcid: u32, cfg: &RlcConfig) -> Result<(), LayerError>;

    /// Transmit an RRC PDU, used for SRB0 where PDCP is bypassed
    fn write_sdu(&self, rnti: Rnti, lcid: u32, sdu: Bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rlc_config_validation() {
        let um = RlcConfig {
            bearer_id: 1,
            mode: RlcMode::Um { sn_field_length: 12, t_reassembly_ms: 50 },
        };
        assert!(um.validate().is_ok());

        let bad = RlcConfig {
            bearer_id: 1,
            mode: RlcMode::Um { sn_field_length: 18, t_reassembly_ms: 50 },
        };
        assert!(matches!(bad.validate(), Err(LayerError::BearerConfig(_))));

        let tm = RlcConfig { bearer_id: 0, mode: RlcMode::Tm };
        assert!(tm.validate().is_ok());
    }
}
