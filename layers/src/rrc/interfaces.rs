//! Services the NR RRC offers to the other layers

use crate::eutra::SgnbAdditionReqParams;
use crate::mac::SchedUeCfg;
use crate::LayerError;
use bytes::Bytes;
use common::types::Rnti;

/// RRC services used by the MAC
pub trait RrcMacInterface {
    /// Packed BCCH-BCH message for the given slot
    fn read_master_info(&self, slot: u32) -> Result<Bytes, LayerError>;

    /// Packed BCCH-DL-SCH message, index 0 is SIB1
    fn read_system_info(&self, sib_idx: usize) -> Result<Bytes, LayerError>;

    /// A PRACH was detected and the MAC allocated `rnti` for it
    fn create_session(&mut self, rnti: Rnti, uecfg: &SchedUeCfg) -> Result<(), LayerError>;

    fn destroy_session(&mut self, rnti: Rnti);

    /// A C-RNTI MAC CE carrying `old_rnti` was received from `new_rnti`
    fn rename_session(&mut self, new_rnti: Rnti, old_rnti: Rnti) -> Result<(), LayerError>;

    /// UL or DL traffic was scheduled for the UE
    fn mark_active(&mut self, rnti: Rnti);
}

/// RRC services used by PDCP (and by RLC for SRB0)
pub trait RrcPdcpInterface {
    /// Deliver an UL RRC PDU received on logical channel `lcid`
    fn deliver_pdu(&mut self, rnti: Rnti, lcid: u32, pdu: &[u8]) -> Result<(), LayerError>;
}

/// RRC services used by the LTE RRC for EN-DC
pub trait RrcEndcInterface {
    /// SgNB Addition Request. Returns the NR RNTI reserved for the UE.
    fn request_addition(&mut self, eutra_rnti: Rnti, params: SgnbAdditionReqParams) -> Result<Rnti, LayerError>;

    /// The UE acknowledged the NR configuration on the LTE side
    fn confirm_reconfiguration(&mut self, eutra_rnti: Rnti, response: &[u8]);

    /// SgNB Release Request
    fn request_release(&mut self, nr_rnti: Rnti);
}
