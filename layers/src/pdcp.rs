//! Packet Data Convergence Protocol (PDCP) Layer Interface
//!
//! Bearer configuration and the PDCP services used by RRC (3GPP TS 38.323)

use crate::LayerError;
use bytes::Bytes;
use common::types::Rnti;

/// Radio bearer kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdcpRbType {
    Srb,
    Drb,
}

/// PDCP bearer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdcpConfig {
    /// SRB or DRB identity
    pub bearer_id: u8,
    pub rb_type: PdcpRbType,
    /// SN size in bits (12 or 18)
    pub sn_size: u8,
    /// Discard timer in ms, `None` for infinity
    pub discard_timer: Option<u32>,
    /// Reordering timer in ms
    pub t_reordering: u32,
    /// Enable integrity protection
    pub integrity_protection: bool,
    /// Enable ciphering
    pub ciphering: bool,
    pub status_report_required: bool,
}

impl PdcpConfig {
    /// Default SRB configuration (12-bit SN, no discard timer)
    pub fn srb(srb_id: u8) -> Self {
        Self {
            bearer_id: srb_id,
            rb_type: PdcpRbType::Srb,
            sn_size: 12,
            discard_timer: None,
            t_reordering: 0,
            integrity_protection: false,
            ciphering: false,
            status_report_required: false,
        }
    }

    pub fn validate(&self) -> Result<(), LayerError> {
        if self.sn_size != 12 && self.sn_size != 18 {
            return Err(LayerError::BearerConfig(format!(
                "Invalid PDCP SN size {}: must be 12 or 18 bits",
                self.sn_size
            )));
        }
        if self.rb_type == PdcpRbType::Srb && self.sn_size != 12 {
            return Err(LayerError::BearerConfig("SRBs require a 12-bit PDCP SN".to_string()));
        }
        Ok(())
    }
}

/// PDCP services used by RRC
pub trait PdcpInterface: Send + Sync {
    fn add_session(&self, rnti: Rnti);

    fn remove_session(&self, rnti: Rnti);

    /// Create a PDCP entity for `lcid`
    fn add_bearer(&self, rnti: Rnti, lcid: u32, cfg: &PdcpConfig) -> Result<(), LayerError>;

    /// Transmit an RRC PDU on a DCCH bearer
    fn write_sdu(&self, rnti: Rnti, lcid: u32, sdu: Bytes);
}
