//! Cell context and broadcast generation
//!
//! The MIB, SIB1 and SI messages are built and packed once at init. MAC reads
//! the packed buffers through [`CellContext::mib_pdu`] and
//! [`CellContext::si_pdu`]; nothing is re-encoded per slot.

use super::cell_group::{make_base_sp_cell_cfg, make_serving_cell_config_common};
use super::config::{RrcCellConfig, RrcNrConfig};
use super::phy_cfg::{make_duplex_cfg, make_pdcch_cfg, make_pdsch_cfg, make_ssb_cfg};
use super::{log_rrc_message, Direction};
use crate::mac::ue_cfg::PdcchCfgNr;
use crate::mac::{SchedBwpCfg, SchedCellCfg, SibCfg};
use crate::LayerError;
use bytes::Bytes;
use common::types::{Pci, SubcarrierSpacing};
use nr_asn1 as asn1;
use tracing::debug;

/// Packed MIB is 24 bits on air, leave room for the codec framing
const MIB_BUF_LEN: usize = 64;

/// SIB1 is always broadcast every 160 ms
const SIB1_PERIOD_RF: u32 = 16;
const SIB1_WINDOW_SLOTS: u32 = 160;

/// Broadcast state of the serving cell
#[derive(Debug, Clone)]
pub struct CellContext {
    pub mib: asn1::Mib,
    /// Only present in SA operation
    pub sib1: Option<asn1::Sib1>,
    /// Supported SIBs, indexed by [`asn1::SibType::index`]
    pub sibs: Vec<asn1::SibTypeAndInfo>,
    pub mib_buffer: Bytes,
    /// Index 0 is SIB1, index k the k-th SI message
    pub sib_buffer: Vec<Bytes>,
    /// Template every dedicated SpCell configuration starts from
    pub base_sp_cell_cfg: asn1::SpCellConfig,
    /// PDCCH configuration shared by the scheduler and new sessions
    pub pdcch: PdcchCfgNr,
}

impl CellContext {
    /// Build the cell context and pack the broadcast messages
    pub fn new(cfg: &RrcNrConfig) -> Result<Self, LayerError> {
        let cell = cfg.pscell()?;

        let base_sp_cell_cfg = make_base_sp_cell_cfg(cell)?;
        let mib = fill_mib(cell)?;
        let sib1 = if cfg.is_standalone { Some(fill_sib1(cfg)?) } else { None };

        // SA UEs learn the common PDCCH from SIB1, NSA UEs from ReconfigurationWithSync
        let common = match &sib1 {
            Some(sib1) => sib1.serving_cell_config_common.as_ref(),
            None => base_common(&base_sp_cell_cfg),
        }
        .ok_or_else(|| LayerError::InvalidConfiguration("ServingCellConfigCommon not present".to_string()))?;
        let pdcch_common = common
            .downlink_config_common
            .as_ref()
            .and_then(|dl| dl.initial_downlink_bwp.as_ref())
            .and_then(|bwp| bwp.pdcch_config_common.as_ref())
            .and_then(|p| p.setup())
            .ok_or_else(|| LayerError::InvalidConfiguration("PDCCH-ConfigCommon not present".to_string()))?;
        let pdcch_ded = base_sp_cell_cfg
            .sp_cell_config_dedicated
            .as_ref()
            .and_then(|ded| ded.initial_downlink_bwp.as_ref())
            .and_then(|bwp| bwp.pdcch_config.as_ref())
            .and_then(|p| p.setup());
        let pdcch = make_pdcch_cfg(pdcch_common, pdcch_ded)?;

        let mut ctx = Self {
            mib,
            sib1,
            sibs: default_sibs(),
            mib_buffer: Bytes::new(),
            sib_buffer: Vec::new(),
            base_sp_cell_cfg,
            pdcch,
        };
        ctx.generate_sibs()?;
        Ok(ctx)
    }

    /// Pack the MIB and, in SA mode, SIB1 and every SI message.
    /// On failure the previously packed buffers are left untouched.
    pub fn generate_sibs(&mut self) -> Result<(), LayerError> {
        let mib_msg = asn1::BcchBchMsg::Mib(self.mib.clone());
        let mib_buffer = asn1::pack(&mib_msg, MIB_BUF_LEN)?;
        debug!("MIB payload ({} B)", mib_buffer.len());

        let Some(sib1) = &self.sib1 else {
            self.mib_buffer = mib_buffer;
            self.sib_buffer.clear();
            return Ok(());
        };

        let mut msgs = vec![asn1::BcchDlSchMsg::C1(asn1::BcchDlSchC1::SystemInformationBlockType1(sib1.clone()))];
        let sched_list = sib1
            .si_scheduling_info
            .as_ref()
            .map(|si| si.scheduling_info_list.as_slice())
            .unwrap_or_default();
        for sched in sched_list {
            let mut si = asn1::SystemInformation::default();
            for mapping in &sched.sib_mapping_info {
                let sib = self.sibs.get(mapping.sib_type.index()).ok_or_else(|| {
                    LayerError::InvalidConfiguration(format!(
                        "SIB{} is not supported",
                        mapping.sib_type.to_number()
                    ))
                })?;
                si.sib_type_and_info.push(sib.clone());
            }
            msgs.push(asn1::BcchDlSchMsg::C1(asn1::BcchDlSchC1::SystemInformation(si)));
        }

        let mut sib_buffer = Vec::with_capacity(msgs.len());
        for (msg_idx, msg) in msgs.iter().enumerate() {
            let pdu = asn1::pack(msg, asn1::MAX_PDU_LEN)?;
            let label = if msg_idx == 0 {
                "SIB1 payload".to_string()
            } else {
                format!("SI message={} payload", msg_idx + 1)
            };
            log_rrc_message("BCCH", Direction::Tx, &label, pdu.len(), msg);
            sib_buffer.push(pdu);
        }

        self.mib_buffer = mib_buffer;
        self.sib_buffer = sib_buffer;
        Ok(())
    }

    /// Scheduler cell configuration matching the broadcast state
    pub fn sched_cell_cfg(&self, cfg: &RrcNrConfig) -> Result<SchedCellCfg, LayerError> {
        let cell = cfg.pscell()?;
        let pci = Pci::new(cell.pci)
            .ok_or_else(|| LayerError::InvalidConfiguration(format!("Invalid PCI {}", cell.pci)))?;
        let serv_cell = self
            .base_sp_cell_cfg
            .sp_cell_config_dedicated
            .as_ref()
            .ok_or_else(|| LayerError::InvalidConfiguration("SpCellConfigDedicated not present".to_string()))?;
        let common = base_common(&self.base_sp_cell_cfg)
            .ok_or_else(|| LayerError::InvalidConfiguration("ServingCellConfigCommon not present".to_string()))?;

        let mut sibs = Vec::with_capacity(self.sib_buffer.len());
        if let Some(sib1) = self.sib_buffer.first() {
            sibs.push(SibCfg { len: sib1.len(), period_rf: SIB1_PERIOD_RF, si_window_slots: SIB1_WINDOW_SLOTS });
            for (entry, pdu) in cfg.sib_sched_info.iter().zip(self.sib_buffer.iter().skip(1)) {
                sibs.push(SibCfg {
                    len: pdu.len(),
                    period_rf: entry.si_periodicity_rf,
                    si_window_slots: cfg.si_window_length_slots,
                });
            }
        }

        Ok(SchedCellCfg {
            pci,
            dl_arfcn: cell.dl_arfcn,
            nof_prb: cell.nof_prb,
            scs: cell.scs,
            bwps: vec![SchedBwpCfg { pdcch: self.pdcch.clone(), pdsch: make_pdsch_cfg(serv_cell)? }],
            ssb: make_ssb_cfg(common)?,
            duplex: make_duplex_cfg(common),
            sibs,
        })
    }

    pub fn mib_pdu(&self) -> Result<Bytes, LayerError> {
        if self.mib_buffer.is_empty() {
            return Err(LayerError::NotInitialized);
        }
        Ok(self.mib_buffer.clone())
    }

    pub fn si_pdu(&self, sib_idx: usize) -> Result<Bytes, LayerError> {
        self.sib_buffer.get(sib_idx).cloned().ok_or(LayerError::NoSuchSib(sib_idx))
    }

    /// Common configuration carried by the base ReconfigurationWithSync
    pub fn base_common(&self) -> Option<&asn1::ServingCellConfigCommon> {
        base_common(&self.base_sp_cell_cfg)
    }
}

fn base_common(sp_cell: &asn1::SpCellConfig) -> Option<&asn1::ServingCellConfigCommon> {
    sp_cell
        .reconfiguration_with_sync
        .as_ref()
        .and_then(|sync| sync.sp_cell_config_common.as_ref())
}

fn fill_mib(cell: &RrcCellConfig) -> Result<asn1::Mib, LayerError> {
    let sub_carrier_spacing_common = match cell.scs {
        SubcarrierSpacing::Scs15 | SubcarrierSpacing::Scs60 => asn1::ScsCommon::Scs15or60,
        SubcarrierSpacing::Scs30 | SubcarrierSpacing::Scs120 => asn1::ScsCommon::Scs30or120,
        SubcarrierSpacing::Scs240 => {
            return Err(LayerError::InvalidConfiguration(
                "240 kHz is not a valid common subcarrier spacing".to_string(),
            ))
        }
    };

    Ok(asn1::Mib {
        system_frame_number: 0,
        sub_carrier_spacing_common,
        ssb_subcarrier_offset: 0,
        dmrs_type_a_position: asn1::DmrsTypeAPosition::Pos2,
        pdcch_config_sib1: asn1::PdcchConfigSib1 {
            control_resource_set_zero: cell.coreset0_idx,
            search_space_zero: cell.search_space0_idx,
        },
        cell_barred: false,
        intra_freq_reselection: true,
    })
}

fn fill_sib1(cfg: &RrcNrConfig) -> Result<asn1::Sib1, LayerError> {
    let cell = cfg.pscell()?;

    let plmn = asn1::PlmnIdentityInfo {
        plmn_identity_list: vec![asn1::PlmnIdentity {
            mcc: Some(cell.plmn.mcc),
            mnc: cell.plmn.mnc_digits().to_vec(),
        }],
        tracking_area_code: Some(cell.tac),
        cell_identity: cell.cell_id,
        cell_reserved_for_operator_use: false,
    };

    let si_scheduling_info = if cfg.sib_sched_info.is_empty() {
        None
    } else {
        let mut scheduling_info_list = Vec::with_capacity(cfg.sib_sched_info.len());
        for entry in &cfg.sib_sched_info {
            let si_periodicity = asn1::SiPeriodicity::from_rf(entry.si_periodicity_rf).ok_or_else(|| {
                LayerError::InvalidConfiguration(format!("Invalid SI periodicity {} rf", entry.si_periodicity_rf))
            })?;
            let sib_mapping_info = entry
                .sib_types
                .iter()
                .map(|&n| {
                    asn1::SibType::from_number(n)
                        .map(|sib_type| asn1::SibTypeInfo { sib_type, value_tag: Some(0), area_scope: false })
                        .ok_or_else(|| LayerError::InvalidConfiguration(format!("Unknown SIB type {}", n)))
                })
                .collect::<Result<Vec<_>, _>>()?;
            scheduling_info_list.push(asn1::SchedulingInfo {
                si_broadcast_status: asn1::SiBroadcastStatus::Broadcasting,
                si_periodicity,
                sib_mapping_info,
            });
        }
        let si_window_length = asn1::SiWindowLength::from_slots(cfg.si_window_length_slots).ok_or_else(|| {
            LayerError::InvalidConfiguration(format!("Invalid SI window length {} slots", cfg.si_window_length_slots))
        })?;
        Some(asn1::SiSchedulingInfo { scheduling_info_list, si_window_length })
    };

    Ok(asn1::Sib1 {
        cell_selection_info: Some(asn1::CellSelectionInfo { q_rx_lev_min: -70, q_qual_min: Some(-20) }),
        cell_access_related_info: asn1::CellAccessRelatedInfo { plmn_identity_list: vec![plmn] },
        si_scheduling_info,
        serving_cell_config_common: Some(make_serving_cell_config_common(cell)?),
        ue_timers_and_constants: Some(asn1::UeTimersAndConstants {
            t300: 1000,
            t301: 1000,
            t310: 1000,
            n310: 1,
            t311: 30000,
            n311: 1,
            t319: 1000,
        }),
    })
}

/// SIB2 and SIB3 are the only SIBs this cell can broadcast
fn default_sibs() -> Vec<asn1::SibTypeAndInfo> {
    let mut sib2 = asn1::Sib2::default();
    sib2.cell_reselection_info_common.q_hyst = asn1::QHyst::Db5;
    vec![asn1::SibTypeAndInfo::Sib2(sib2), asn1::SibTypeAndInfo::Sib3(asn1::Sib3::default())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rrc::config::SibSchedInfo;

    fn sa_config() -> RrcNrConfig {
        RrcNrConfig { is_standalone: true, ..Default::default() }
    }

    #[test]
    fn test_nsa_broadcasts_mib_only() {
        let ctx = CellContext::new(&RrcNrConfig::default()).unwrap();
        assert!(!ctx.mib_buffer.is_empty());
        assert!(ctx.sib_buffer.is_empty());
        assert!(ctx.sib1.is_none());
        assert_eq!(ctx.si_pdu(0), Err(LayerError::NoSuchSib(0)));

        let mib: asn1::BcchBchMsg = asn1::unpack(&ctx.mib_pdu().unwrap()).unwrap();
        match mib {
            asn1::BcchBchMsg::Mib(mib) => assert_eq!(mib.pdcch_config_sib1.control_resource_set_zero, 6),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_sa_sib_grouping() {
        let mut cfg = sa_config();
        cfg.sib_sched_info = vec![
            SibSchedInfo { si_periodicity_rf: 16, sib_types: vec![2] },
            SibSchedInfo { si_periodicity_rf: 32, sib_types: vec![3] },
        ];
        let ctx = CellContext::new(&cfg).unwrap();
        assert_eq!(ctx.sib_buffer.len(), 3);

        let sib1: asn1::BcchDlSchMsg = asn1::unpack(&ctx.si_pdu(0).unwrap()).unwrap();
        assert!(matches!(sib1, asn1::BcchDlSchMsg::C1(asn1::BcchDlSchC1::SystemInformationBlockType1(_))));

        for (idx, expected) in [(1, asn1::SibType::SibType2), (2, asn1::SibType::SibType3)] {
            let msg: asn1::BcchDlSchMsg = asn1::unpack(&ctx.si_pdu(idx).unwrap()).unwrap();
            match msg {
                asn1::BcchDlSchMsg::C1(asn1::BcchDlSchC1::SystemInformation(si)) => {
                    assert_eq!(si.sib_type_and_info.len(), 1);
                    assert_eq!(si.sib_type_and_info[0].sib_type(), expected);
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_unsupported_sib_aborts_generation() {
        let mut cfg = sa_config();
        cfg.sib_sched_info = vec![SibSchedInfo { si_periodicity_rf: 16, sib_types: vec![2, 4] }];
        assert!(matches!(CellContext::new(&cfg), Err(LayerError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_sched_cell_cfg() {
        let mut cfg = sa_config();
        cfg.si_window_length_slots = 20;
        let ctx = CellContext::new(&cfg).unwrap();
        let sched = ctx.sched_cell_cfg(&cfg).unwrap();

        assert_eq!(sched.pci, Pci(1));
        assert_eq!(sched.bwps.len(), 1);
        assert_eq!(sched.bwps[0].pdcch, ctx.pdcch);
        assert_eq!(sched.bwps[0].pdsch.nof_harq_processes, 16);
        assert_eq!(sched.sibs.len(), 2);
        assert_eq!(sched.sibs[0].period_rf, 16);
        assert_eq!(sched.sibs[0].si_window_slots, 160);
        assert_eq!(sched.sibs[0].len, ctx.sib_buffer[0].len());
        assert_eq!(sched.sibs[1].period_rf, 16);
        assert_eq!(sched.sibs[1].si_window_slots, 20);
    }

    #[test]
    fn test_pdcch_from_sib1_and_base_agree() {
        let sa = CellContext::new(&sa_config()).unwrap();
        let nsa = CellContext::new(&RrcNrConfig::default()).unwrap();
        assert_eq!(sa.pdcch, nsa.pdcch);
        assert!(sa.pdcch.coreset(0).is_some_and(|c| c.interleaved));
    }
}
