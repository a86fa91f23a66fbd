//! Conversions from RRC configuration trees to layer configuration
//!
//! The scheduler, RLC and PDCP do not consume ASN.1 trees. These helpers derive
//! their configuration from the dedicated and common serving cell IEs the RRC
//! signals to the UE, so both sides always agree.

use crate::mac::scheduler::Coreset0Config;
use crate::mac::ue_cfg::{
    CoresetNr, CsiCfgNr, CsiReportNr, DuplexCfgNr, PdcchCfgNr, PdschAllocType, PdschCfgNr, SearchSpaceKind,
    SearchSpaceNr, SsbCfgNr, TddPatternNr,
};
use crate::pdcp::{PdcpConfig, PdcpRbType};
use crate::rlc::{RlcConfig, RlcMode};
use crate::LayerError;
use common::types::{DuplexMode, SubcarrierSpacing};
use nr_asn1 as asn1;

pub fn scs_to_asn1(scs: SubcarrierSpacing) -> Result<asn1::SubcarrierSpacing, LayerError> {
    match scs {
        SubcarrierSpacing::Scs15 => Ok(asn1::SubcarrierSpacing::Khz15),
        SubcarrierSpacing::Scs30 => Ok(asn1::SubcarrierSpacing::Khz30),
        SubcarrierSpacing::Scs60 => Ok(asn1::SubcarrierSpacing::Khz60),
        SubcarrierSpacing::Scs120 => Ok(asn1::SubcarrierSpacing::Khz120),
        SubcarrierSpacing::Scs240 => Err(LayerError::InvalidConfiguration(
            "240 kHz is not a valid data subcarrier spacing".to_string(),
        )),
    }
}

pub fn scs_from_asn1(scs: asn1::SubcarrierSpacing) -> SubcarrierSpacing {
    match scs {
        asn1::SubcarrierSpacing::Khz15 => SubcarrierSpacing::Scs15,
        asn1::SubcarrierSpacing::Khz30 => SubcarrierSpacing::Scs30,
        asn1::SubcarrierSpacing::Khz60 => SubcarrierSpacing::Scs60,
        asn1::SubcarrierSpacing::Khz120 => SubcarrierSpacing::Scs120,
    }
}

/// PDSCH parameters of the initial DL BWP
pub fn make_pdsch_cfg(serv_cell: &asn1::ServingCellConfig) -> Result<PdschCfgNr, LayerError> {
    let pdsch = serv_cell
        .initial_downlink_bwp
        .as_ref()
        .and_then(|bwp| bwp.pdsch_config.as_ref())
        .and_then(|p| p.setup())
        .ok_or_else(|| LayerError::InvalidConfiguration("PDSCH-Config not present".to_string()))?;

    let mut cfg = PdschCfgNr::default();
    if let Some(dmrs) = pdsch
        .dmrs_downlink_for_pdsch_mapping_type_a
        .as_ref()
        .and_then(|d| d.setup())
    {
        cfg.dmrs_type2 = dmrs.dmrs_type2;
        // Absent field means pos2 (TS 38.331 DMRS-DownlinkConfig)
        cfg.dmrs_additional_pos = dmrs.dmrs_additional_position.map(|p| p.to_number()).unwrap_or(2);
    }
    cfg.alloc_type = match pdsch.resource_allocation {
        asn1::ResourceAllocation::Type0 => PdschAllocType::Type0,
        asn1::ResourceAllocation::Type1 => PdschAllocType::Type1,
        asn1::ResourceAllocation::DynamicSwitch => PdschAllocType::DynamicSwitch,
    };
    cfg.rbg_size_cfg_1 = pdsch.rbg_size == asn1::RbgSize::Config1;
    cfg.mcs_table_256qam = pdsch.mcs_table == Some(asn1::McsTable::Qam256);
    cfg.tci_ssb_idx = pdsch
        .tci_states_to_add_mod_list
        .iter()
        .find_map(|tci| match tci.qcl_type1.reference_signal {
            asn1::QclReferenceSignal::Ssb(idx) => Some(idx),
            asn1::QclReferenceSignal::CsiRs(_) => None,
        });
    cfg.wideband_bundling = matches!(
        pdsch.prb_bundling_type,
        asn1::PrbBundlingType::StaticBundling { bundle_size: Some(asn1::BundleSize::Wideband) }
    );

    if let Some(nof_harq) = serv_cell
        .pdsch_serving_cell_config
        .as_ref()
        .and_then(|p| p.setup())
        .and_then(|p| p.nrof_harq_processes_for_pdsch)
    {
        cfg.nof_harq_processes = nof_harq.to_number();
    }

    Ok(cfg)
}

/// Periodic CSI reports. No CSI-MeasConfig means CSI reporting is disabled.
pub fn make_csi_cfg(serv_cell: &asn1::ServingCellConfig) -> CsiCfgNr {
    let reports = serv_cell
        .csi_meas_config
        .as_ref()
        .and_then(|c| c.setup())
        .map(|meas| {
            meas.csi_report_config_to_add_mod_list
                .iter()
                .map(|r| CsiReportNr {
                    id: r.report_config_id,
                    period: u32::from(r.periodicity_slots),
                    offset: u32::from(r.offset),
                    pucch_resource: r.pucch_resource,
                })
                .collect()
        })
        .unwrap_or_default();
    CsiCfgNr { reports }
}

pub fn make_ssb_cfg(common: &asn1::ServingCellConfigCommon) -> Result<SsbCfgNr, LayerError> {
    let periodicity = common
        .ssb_periodicity_serving_cell
        .ok_or_else(|| LayerError::InvalidConfiguration("SSB periodicity not present".to_string()))?;
    let scs = common
        .ssb_subcarrier_spacing
        .ok_or_else(|| LayerError::InvalidConfiguration("SSB subcarrier spacing not present".to_string()))?;
    let position_in_burst = match common.ssb_positions_in_burst {
        Some(asn1::SsbPositionsInBurst::Short(bitmap)) | Some(asn1::SsbPositionsInBurst::Medium(bitmap)) => {
            u64::from(bitmap)
        }
        Some(asn1::SsbPositionsInBurst::Long(bitmap)) => bitmap,
        None => {
            return Err(LayerError::InvalidConfiguration(
                "SSB positions in burst not present".to_string(),
            ))
        }
    };

    Ok(SsbCfgNr {
        periodicity_ms: periodicity.to_ms(),
        position_in_burst,
        scs: scs_from_asn1(scs),
    })
}

pub fn make_duplex_cfg(common: &asn1::ServingCellConfigCommon) -> DuplexCfgNr {
    match &common.tdd_ul_dl_configuration_common {
        Some(tdd) => {
            let p = &tdd.pattern1;
            DuplexCfgNr {
                mode: DuplexMode::Tdd,
                tdd: Some(TddPatternNr {
                    period_us: p.dl_ul_transmission_periodicity.to_us(),
                    nof_dl_slots: p.nrof_downlink_slots,
                    nof_dl_symbols: p.nrof_downlink_symbols,
                    nof_ul_slots: p.nrof_uplink_slots,
                    nof_ul_symbols: p.nrof_uplink_symbols,
                }),
            }
        }
        None => DuplexCfgNr { mode: DuplexMode::Fdd, tdd: None },
    }
}

fn make_coreset(coreset: &asn1::ControlResourceSet) -> CoresetNr {
    CoresetNr {
        id: coreset.control_resource_set_id,
        freq_resources: coreset.frequency_domain_resources,
        duration: coreset.duration,
        interleaved: false,
    }
}

fn make_search_space(ss: &asn1::SearchSpace, ra_search_space: Option<u8>) -> Result<SearchSpaceNr, LayerError> {
    let coreset_id = ss.control_resource_set_id.ok_or_else(|| {
        LayerError::InvalidConfiguration(format!("SearchSpace#{} has no CORESET", ss.search_space_id))
    })?;
    let kind = match ss.search_space_type {
        Some(asn1::SearchSpaceType::Common { .. }) if ra_search_space == Some(ss.search_space_id) => {
            SearchSpaceKind::Common1
        }
        Some(asn1::SearchSpaceType::Common { .. }) => SearchSpaceKind::Common3,
        Some(asn1::SearchSpaceType::UeSpecific { .. }) => SearchSpaceKind::UeSpecific,
        None => {
            return Err(LayerError::InvalidConfiguration(format!(
                "SearchSpace#{} has no type",
                ss.search_space_id
            )))
        }
    };
    let c = ss.nrof_candidates.unwrap_or_default();

    Ok(SearchSpaceNr {
        id: ss.search_space_id,
        coreset_id,
        kind,
        nof_candidates: [
            c.aggregation_level1,
            c.aggregation_level2,
            c.aggregation_level4,
            c.aggregation_level8,
            c.aggregation_level16,
        ],
        duration: ss.duration.unwrap_or(1),
    })
}

/// PDCCH configuration from the common and the UE-specific PDCCH IEs.
/// CORESET#0 and SearchSpace#0 are derived from their table indices.
pub fn make_pdcch_cfg(
    common: &asn1::PdcchConfigCommon,
    dedicated: Option<&asn1::PdcchConfig>,
) -> Result<PdcchCfgNr, LayerError> {
    let mut cfg = PdcchCfgNr { ra_search_space: common.ra_search_space, ..Default::default() };

    if let Some(idx) = common.control_resource_set_zero {
        let coreset0 = Coreset0Config::from_index(idx)?;
        cfg.coresets.push(CoresetNr {
            id: 0,
            freq_resources: coreset0.freq_resources(),
            duration: coreset0.num_symbols as u8,
            interleaved: true,
        });
    }
    if let Some(coreset) = &common.common_control_resource_set {
        cfg.coresets.push(make_coreset(coreset));
    }
    if common.search_space_zero.is_some() {
        cfg.search_spaces.push(SearchSpaceNr {
            id: 0,
            coreset_id: 0,
            kind: SearchSpaceKind::Common0,
            nof_candidates: [1, 1, 1, 0, 0],
            duration: 1,
        });
    }
    for ss in &common.common_search_space_list {
        cfg.search_spaces.push(make_search_space(ss, common.ra_search_space)?);
    }

    if let Some(ded) = dedicated {
        cfg.coresets.extend(ded.control_resource_set_to_add_mod_list.iter().map(make_coreset));
        for ss in &ded.search_spaces_to_add_mod_list {
            cfg.search_spaces.push(make_search_space(ss, common.ra_search_space)?);
        }
    }

    for ss in &cfg.search_spaces {
        if cfg.coreset(ss.coreset_id).is_none() {
            return Err(LayerError::InvalidConfiguration(format!(
                "SearchSpace#{} refers to unknown CORESET#{}",
                ss.id, ss.coreset_id
            )));
        }
    }

    Ok(cfg)
}

/// Build a PUCCH-Resource, checking the format limits of TS 38.213 Table 9.2.1-1
pub fn make_pucch_resource(
    id: u8,
    starting_prb: u16,
    format: asn1::PucchFormat,
) -> Result<asn1::PucchResource, LayerError> {
    let invalid = |what: &str| {
        Err(LayerError::InvalidConfiguration(format!("PUCCH resource {}: invalid {}", id, what)))
    };

    if starting_prb > 274 {
        return invalid("starting PRB");
    }
    match format {
        asn1::PucchFormat::Format0 { initial_cyclic_shift, nrof_symbols, starting_symbol_index } => {
            if initial_cyclic_shift > 11 {
                return invalid("initial cyclic shift");
            }
            if !(1..=2).contains(&nrof_symbols) || starting_symbol_index > 13 {
                return invalid("symbol allocation");
            }
        }
        asn1::PucchFormat::Format1 {
            initial_cyclic_shift,
            nrof_symbols,
            starting_symbol_index,
            time_domain_occ,
        } => {
            if initial_cyclic_shift > 11 {
                return invalid("initial cyclic shift");
            }
            if !(4..=14).contains(&nrof_symbols) || starting_symbol_index > 10 {
                return invalid("symbol allocation");
            }
            if time_domain_occ > 6 {
                return invalid("time domain OCC");
            }
        }
        asn1::PucchFormat::Format2 { nrof_prbs, nrof_symbols, starting_symbol_index } => {
            if !(1..=16).contains(&nrof_prbs) {
                return invalid("number of PRBs");
            }
            if !(1..=2).contains(&nrof_symbols) || starting_symbol_index > 13 {
                return invalid("symbol allocation");
            }
        }
    }

    let (nof_symbols, start) = match format {
        asn1::PucchFormat::Format0 { nrof_symbols, starting_symbol_index, .. }
        | asn1::PucchFormat::Format1 { nrof_symbols, starting_symbol_index, .. }
        | asn1::PucchFormat::Format2 { nrof_symbols, starting_symbol_index, .. } => {
            (nrof_symbols, starting_symbol_index)
        }
    };
    if nof_symbols + start > 14 {
        return invalid("symbol allocation");
    }

    Ok(asn1::PucchResource {
        pucch_resource_id: id,
        starting_prb,
        intra_slot_frequency_hopping: false,
        second_hop_prb: None,
        format,
    })
}

/// RLC entity configuration for a bearer
pub fn make_rlc_config(rlc: &asn1::RlcConfig, bearer_id: u8) -> Result<RlcConfig, LayerError> {
    let missing_sn = || LayerError::BearerConfig(format!("RLC bearer {} has no SN field length", bearer_id));

    let mode = match rlc {
        asn1::RlcConfig::Am { ul, dl } => RlcMode::Am {
            sn_field_length: ul.sn_field_length.ok_or_else(missing_sn)?.bits(),
            t_poll_retx_ms: u32::from(ul.t_poll_retransmit_ms),
            poll_pdu: ul.poll_pdu,
            poll_byte_kb: ul.poll_byte_kb,
            max_retx_thresh: ul.max_retx_threshold,
            t_reassembly_ms: dl.t_reassembly.to_ms(),
            t_status_prohibit_ms: u32::from(dl.t_status_prohibit_ms),
        },
        asn1::RlcConfig::UmBiDirectional { ul, dl } => {
            let sn = dl.sn_field_length.ok_or_else(missing_sn)?;
            if ul.sn_field_length.is_some_and(|ul_sn| ul_sn != sn) {
                return Err(LayerError::BearerConfig(format!(
                    "RLC bearer {} uses different UL and DL SN lengths",
                    bearer_id
                )));
            }
            RlcMode::Um { sn_field_length: sn.bits(), t_reassembly_ms: dl.t_reassembly.to_ms() }
        }
    };

    let cfg = RlcConfig { bearer_id, mode };
    cfg.validate()?;
    Ok(cfg)
}

/// PDCP entity configuration for a DRB
pub fn make_drb_pdcp_config(drb_id: u8, pdcp: &asn1::PdcpConfig) -> Result<PdcpConfig, LayerError> {
    let drb = pdcp
        .drb
        .as_ref()
        .ok_or_else(|| LayerError::BearerConfig(format!("DRB{} has no PDCP DRB parameters", drb_id)))?;
    let sn_size = drb
        .pdcp_sn_size_dl
        .ok_or_else(|| LayerError::BearerConfig(format!("DRB{} has no PDCP SN size", drb_id)))?;

    let cfg = PdcpConfig {
        bearer_id: drb_id,
        rb_type: PdcpRbType::Drb,
        sn_size: sn_size.bits(),
        discard_timer: drb.discard_timer.and_then(|t| t.to_ms()),
        t_reordering: pdcp.t_reordering.map(|t| t.to_ms()).unwrap_or(0),
        integrity_protection: false,
        ciphering: !pdcp.ciphering_disabled,
        status_report_required: drb.status_report_required,
    };
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn um_config(sn: asn1::SnFieldLengthUm) -> asn1::RlcConfig {
        asn1::RlcConfig::UmBiDirectional {
            ul: asn1::UlUmRlc { sn_field_length: Some(sn) },
            dl: asn1::DlUmRlc { sn_field_length: Some(sn), t_reassembly: asn1::TReassembly::Ms50 },
        }
    }

    #[test]
    fn test_make_rlc_config_um() {
        let cfg = make_rlc_config(&um_config(asn1::SnFieldLengthUm::Size12), 1).unwrap();
        assert_eq!(cfg.bearer_id, 1);
        assert_eq!(cfg.mode, RlcMode::Um { sn_field_length: 12, t_reassembly_ms: 50 });
    }

    #[test]
    fn test_make_rlc_config_requires_sn() {
        let rlc = asn1::RlcConfig::UmBiDirectional {
            ul: asn1::UlUmRlc { sn_field_length: None },
            dl: asn1::DlUmRlc { sn_field_length: None, t_reassembly: asn1::TReassembly::Ms50 },
        };
        assert!(matches!(make_rlc_config(&rlc, 1), Err(LayerError::BearerConfig(_))));
    }

    #[test]
    fn test_pucch_resource_limits() {
        let f1 = asn1::PucchFormat::Format1 {
            initial_cyclic_shift: 0,
            nrof_symbols: 14,
            starting_symbol_index: 0,
            time_domain_occ: 0,
        };
        assert!(make_pucch_resource(0, 0, f1).is_ok());

        let f2 = asn1::PucchFormat::Format2 { nrof_prbs: 1, nrof_symbols: 2, starting_symbol_index: 12 };
        assert!(make_pucch_resource(1, 51, f2).is_ok());

        let too_long = asn1::PucchFormat::Format2 { nrof_prbs: 1, nrof_symbols: 2, starting_symbol_index: 13 };
        assert!(make_pucch_resource(1, 51, too_long).is_err());
        assert!(make_pucch_resource(0, 300, f1).is_err());
    }

    #[test]
    fn test_make_duplex_cfg_fdd_without_tdd_pattern() {
        let common = asn1::ServingCellConfigCommon {
            phys_cell_id: Some(1),
            downlink_config_common: None,
            uplink_config_common: None,
            ssb_positions_in_burst: Some(asn1::SsbPositionsInBurst::Medium(0x80)),
            ssb_periodicity_serving_cell: Some(asn1::SsbPeriodicity::Ms20),
            dmrs_type_a_position: asn1::DmrsTypeAPosition::Pos2,
            ssb_subcarrier_spacing: Some(asn1::SubcarrierSpacing::Khz15),
            tdd_ul_dl_configuration_common: None,
            ss_pbch_block_power: 0,
        };
        assert_eq!(make_duplex_cfg(&common).mode, DuplexMode::Fdd);

        let ssb = make_ssb_cfg(&common).unwrap();
        assert_eq!(ssb.periodicity_ms, 20);
        assert_eq!(ssb.position_in_burst, 0x80);
    }
}
