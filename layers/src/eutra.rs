//! EUTRA RRC Interface
//!
//! EN-DC coordination between the LTE master node RRC and this NR secondary
//! node (3GPP TS 37.340). RNTIs passed to the LTE side are LTE C-RNTIs unless
//! named otherwise.

use bytes::Bytes;
use common::types::Rnti;

/// Parameters of an SgNB Addition Request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SgnbAdditionReqParams {
    pub eps_bearer_id: u8,
}

/// Parameters of an SgNB Addition Request Acknowledge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SgnbAdditionAckParams {
    pub nr_rnti: Rnti,
    pub eps_bearer_id: u8,
    /// Packed RRCReconfiguration carrying the secondary cell group
    pub nr_secondary_cell_group_cfg: Bytes,
    /// Packed RadioBearerConfig
    pub nr_radio_bearer_cfg: Bytes,
}

/// Services of the LTE RRC used by the NR RRC
pub trait EutraInterface: Send + Sync {
    fn addition_ack(&self, eutra_rnti: Rnti, params: SgnbAdditionAckParams);

    fn addition_reject(&self, eutra_rnti: Rnti);

    fn release_ack(&self, eutra_rnti: Rnti);

    fn inactivity_notice(&self, eutra_rnti: Rnti);

    /// The UE completed random access on the NR cell with `nr_rnti`
    fn addition_complete(&self, eutra_rnti: Rnti, nr_rnti: Rnti);

    fn set_activity(&self, eutra_rnti: Rnti);
}
