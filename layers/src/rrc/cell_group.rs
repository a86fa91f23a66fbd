//! Cell and cell group configuration trees
//!
//! Builders for the ServingCellConfigCommon broadcast in SIB1, the base
//! SpCellConfig derived from the cell configuration at init, and the fixed
//! bearer profile (SRB1 in AM, DRB1 in UM) used by every session.
//!
//! The secondary cell group sent during EN-DC addition is assembled by a
//! pipeline of `fill_*` functions working on a caller-owned draft. Each step
//! writes one subtree and every failure is returned to the caller, who
//! discards the draft.

use super::config::RrcCellConfig;
use super::phy_cfg::{make_pucch_resource, scs_to_asn1};
use crate::LayerError;
use common::types::{DuplexMode, Rnti, SubcarrierSpacing};
use nr_asn1 as asn1;
use nr_asn1::SetupRelease;

/// Logical channel carrying DRB1
pub const DRB1_LCID: u32 = 4;
pub const DRB1_ID: u8 = 1;
/// EPS bearer DRB1 is associated with
pub const DRB1_EPS_BEARER_ID: u8 = 5;

/// Logical channel group of DRB1 when added as a master cell group bearer
pub const DRB1_LCG: u8 = 3;
/// Logical channel group of DRB1 in the secondary cell group
pub const DRB1_SCG_LCG: u8 = 6;

/// N_BWP^size used to encode locationAndBandwidth (TS 38.331 BWP)
const LOCATION_AND_BW_NOF_PRB: u32 = 275;

/// Resource indication value of `len` contiguous PRBs starting at `start`
/// (TS 38.214 5.1.2.2.2)
pub fn location_and_bandwidth(start: u16, len: u16) -> Result<u16, LayerError> {
    let n = LOCATION_AND_BW_NOF_PRB;
    let (start, len) = (u32::from(start), u32::from(len));
    if len == 0 || start + len > n {
        return Err(LayerError::InvalidConfiguration(format!(
            "BWP of {} PRBs at {} does not fit the carrier",
            len, start
        )));
    }

    let riv = if len - 1 <= n / 2 {
        n * (len - 1) + start
    } else {
        n * (n - len + 1) + (n - 1 - start)
    };
    Ok(riv as u16)
}

/// ARFCN of point A for a carrier of `nof_prb` PRBs centred on `center_arfcn`
pub fn point_a_arfcn(center_arfcn: u32, nof_prb: u16, scs: SubcarrierSpacing) -> u32 {
    // Raster granularity per frequency range (TS 38.104 5.4.2.1)
    let step_khz = match center_arfcn {
        0..=599_999 => 5,
        600_000..=2_016_666 => 15,
        _ => 60,
    };
    let half_bw_khz = u32::from(nof_prb) * 12 * scs.khz() / 2;
    center_arfcn.saturating_sub(half_bw_khz / step_khz)
}

/// CORESET bitmap covering the whole carrier, one bit per 6 PRBs, MSB first
fn coreset_freq_resources(nof_prb: u16) -> u64 {
    let nof_groups = u32::from(nof_prb / 6).min(45);
    if nof_groups == 0 {
        return 0;
    }
    ((1u64 << nof_groups) - 1) << (45 - nof_groups)
}

// ---------------------------------------------------------------------------
// Common configuration (SIB1 and ReconfigurationWithSync)
// ---------------------------------------------------------------------------

pub fn make_pdcch_config_common(cell: &RrcCellConfig) -> asn1::PdcchConfigCommon {
    asn1::PdcchConfigCommon {
        control_resource_set_zero: Some(cell.coreset0_idx),
        common_control_resource_set: Some(asn1::ControlResourceSet {
            control_resource_set_id: 1,
            frequency_domain_resources: coreset_freq_resources(cell.nof_prb),
            duration: 1,
            precoder_granularity: asn1::PrecoderGranularity::SameAsRegBundle,
        }),
        search_space_zero: Some(cell.search_space0_idx),
        common_search_space_list: vec![asn1::SearchSpace {
            search_space_id: 1,
            control_resource_set_id: Some(1),
            monitoring_slot_periodicity: Some(1),
            duration: None,
            nrof_candidates: Some(asn1::NrofCandidates {
                aggregation_level2: 2,
                aggregation_level4: 1,
                ..Default::default()
            }),
            search_space_type: Some(asn1::SearchSpaceType::Common { dci_format0_0_and_format1_0: true }),
        }],
        search_space_sib1: Some(0),
        paging_search_space: Some(1),
        ra_search_space: Some(1),
    }
}

fn pdsch_config_common() -> asn1::PdschConfigCommon {
    asn1::PdschConfigCommon {
        pdsch_time_domain_allocation_list: vec![asn1::PdschTimeDomainResourceAllocation {
            k0: None,
            mapping_type: asn1::MappingType::TypeA,
            start_symbol_and_length: 40,
        }],
    }
}

fn rach_config_common() -> asn1::RachConfigCommon {
    asn1::RachConfigCommon {
        prach_configuration_index: 0,
        msg1_fdm: 1,
        msg1_frequency_start: 1,
        zero_correlation_zone_config: 0,
        preamble_received_target_power: -110,
        preamble_trans_max: 7,
        power_ramping_step_db: 4,
        ra_response_window_sl: 10,
        ra_contention_resolution_timer_sf: 64,
        prach_root_sequence_index: 1,
    }
}

fn tdd_ul_dl_config_common(scs: asn1::SubcarrierSpacing) -> asn1::TddUlDlConfigCommon {
    asn1::TddUlDlConfigCommon {
        reference_subcarrier_spacing: scs,
        pattern1: asn1::TddUlDlPattern {
            dl_ul_transmission_periodicity: asn1::TddPeriodicity::Ms10,
            nrof_downlink_slots: 6,
            nrof_downlink_symbols: 0,
            nrof_uplink_slots: 4,
            nrof_uplink_symbols: 0,
        },
    }
}

/// ServingCellConfigCommon of the cell, as broadcast in SIB1
pub fn make_serving_cell_config_common(
    cell: &RrcCellConfig,
) -> Result<asn1::ServingCellConfigCommon, LayerError> {
    let scs = scs_to_asn1(cell.scs)?;
    let ssb_periodicity = asn1::SsbPeriodicity::from_ms(cell.ssb_periodicity_ms).ok_or_else(|| {
        LayerError::InvalidConfiguration(format!("Invalid SSB periodicity {} ms", cell.ssb_periodicity_ms))
    })?;
    let generic_parameters = asn1::Bwp {
        location_and_bandwidth: location_and_bandwidth(0, cell.nof_prb)?,
        subcarrier_spacing: scs,
        cyclic_prefix_extended: false,
    };
    let carrier = asn1::ScsSpecificCarrier {
        offset_to_carrier: 0,
        subcarrier_spacing: scs,
        carrier_bandwidth: cell.nof_prb,
    };

    let downlink = asn1::DownlinkConfigCommon {
        frequency_info_dl: Some(asn1::FrequencyInfoDl {
            absolute_frequency_ssb: Some(cell.ssb_arfcn),
            frequency_band_list: vec![cell.band],
            absolute_frequency_point_a: point_a_arfcn(cell.dl_arfcn, cell.nof_prb, cell.scs),
            scs_specific_carrier_list: vec![carrier.clone()],
        }),
        initial_downlink_bwp: Some(asn1::BwpDownlinkCommon {
            generic_parameters: generic_parameters.clone(),
            pdcch_config_common: Some(SetupRelease::Setup(make_pdcch_config_common(cell))),
            pdsch_config_common: Some(SetupRelease::Setup(pdsch_config_common())),
        }),
    };

    let uplink = asn1::UplinkConfigCommon {
        frequency_info_ul: Some(asn1::FrequencyInfoUl {
            frequency_band_list: vec![cell.band],
            absolute_frequency_point_a: Some(point_a_arfcn(cell.ul_arfcn(), cell.nof_prb, cell.scs)),
            scs_specific_carrier_list: vec![carrier],
            p_max: Some(10),
        }),
        initial_uplink_bwp: Some(asn1::BwpUplinkCommon {
            generic_parameters,
            rach_config_common: Some(SetupRelease::Setup(rach_config_common())),
            pusch_config_common: Some(SetupRelease::Setup(asn1::PuschConfigCommon {
                pusch_time_domain_allocation_list: vec![asn1::PuschTimeDomainResourceAllocation {
                    k2: Some(4),
                    mapping_type: asn1::MappingType::TypeA,
                    start_symbol_and_length: 27,
                }],
                msg3_delta_preamble: Some(6),
                p0_nominal_with_grant: Some(-76),
            })),
            pucch_config_common: Some(SetupRelease::Setup(asn1::PucchConfigCommon {
                pucch_resource_common: Some(11),
                pucch_group_hopping: asn1::PucchGroupHopping::Neither,
                hopping_id: None,
                p0_nominal: Some(-90),
            })),
        }),
        dummy: asn1::TimeAlignmentTimer::Infinity,
    };

    Ok(asn1::ServingCellConfigCommon {
        phys_cell_id: Some(cell.pci),
        downlink_config_common: Some(downlink),
        uplink_config_common: Some(uplink),
        ssb_positions_in_burst: Some(asn1::SsbPositionsInBurst::Medium(0x80)),
        ssb_periodicity_serving_cell: Some(ssb_periodicity),
        dmrs_type_a_position: asn1::DmrsTypeAPosition::Pos2,
        ssb_subcarrier_spacing: Some(scs),
        tdd_ul_dl_configuration_common: match cell.duplex_mode {
            DuplexMode::Fdd => None,
            DuplexMode::Tdd => Some(tdd_ul_dl_config_common(scs)),
        },
        ss_pbch_block_power: -16,
    })
}

// ---------------------------------------------------------------------------
// Dedicated configuration
// ---------------------------------------------------------------------------

/// UE-specific search space on the common CORESET
pub fn make_pdcch_config() -> asn1::PdcchConfig {
    asn1::PdcchConfig {
        control_resource_set_to_add_mod_list: Vec::new(),
        search_spaces_to_add_mod_list: vec![asn1::SearchSpace {
            search_space_id: 2,
            control_resource_set_id: Some(1),
            monitoring_slot_periodicity: Some(1),
            duration: None,
            nrof_candidates: Some(asn1::NrofCandidates {
                aggregation_level2: 2,
                aggregation_level4: 1,
                ..Default::default()
            }),
            search_space_type: Some(asn1::SearchSpaceType::UeSpecific {
                dci_formats: asn1::DciFormats::Formats00And10,
            }),
        }],
    }
}

pub fn make_pdsch_config() -> asn1::PdschConfig {
    asn1::PdschConfig {
        dmrs_downlink_for_pdsch_mapping_type_a: Some(SetupRelease::Setup(asn1::DmrsDownlinkConfig {
            dmrs_type2: false,
            dmrs_additional_position: Some(asn1::DmrsAdditionalPosition::Pos1),
        })),
        tci_states_to_add_mod_list: vec![asn1::TciState {
            tci_state_id: 0,
            qcl_type1: asn1::QclInfo {
                cell: None,
                bwp_id: None,
                reference_signal: asn1::QclReferenceSignal::Ssb(0),
                qcl_type: asn1::QclType::TypeD,
            },
        }],
        resource_allocation: asn1::ResourceAllocation::Type1,
        rbg_size: asn1::RbgSize::Config1,
        mcs_table: None,
        prb_bundling_type: asn1::PrbBundlingType::StaticBundling {
            bundle_size: Some(asn1::BundleSize::Wideband),
        },
    }
}

/// Radio link failure detection on SSB#0
pub fn make_radio_link_monitoring_config() -> asn1::RadioLinkMonitoringConfig {
    asn1::RadioLinkMonitoringConfig {
        failure_detection_resources_to_add_mod_list: vec![asn1::RadioLinkMonitoringRs {
            radio_link_monitoring_rs_id: 0,
            purpose: asn1::RlmPurpose::Rlf,
            detection_resource: asn1::DetectionResource::SsbIndex(0),
        }],
    }
}

/// PUCCH with one resource for 1-2 bit HARQ-ACK, one for larger UCI and one for SR.
/// The last two sit on the upper carrier edge.
pub fn make_pucch_config(cell: &RrcCellConfig) -> Result<asn1::PucchConfig, LayerError> {
    let edge_prb = cell.nof_prb.saturating_sub(1);

    let resource_small = make_pucch_resource(
        0,
        0,
        asn1::PucchFormat::Format1 {
            initial_cyclic_shift: 0,
            nrof_symbols: 14,
            starting_symbol_index: 0,
            time_domain_occ: 0,
        },
    )?;
    let resource_big = make_pucch_resource(
        1,
        edge_prb,
        asn1::PucchFormat::Format2 { nrof_prbs: 1, nrof_symbols: 2, starting_symbol_index: 12 },
    )?;
    let resource_sr = make_pucch_resource(
        2,
        edge_prb,
        asn1::PucchFormat::Format1 {
            initial_cyclic_shift: 0,
            nrof_symbols: 14,
            starting_symbol_index: 0,
            time_domain_occ: 0,
        },
    )?;

    let dl_data_to_ul_ack = match cell.duplex_mode {
        DuplexMode::Fdd => vec![4],
        DuplexMode::Tdd => vec![6, 5, 4, 4, 4, 4],
    };

    Ok(asn1::PucchConfig {
        resource_set_to_add_mod_list: vec![
            asn1::PucchResourceSet { pucch_resource_set_id: 0, resource_list: vec![0; 8], max_payload_size: None },
            asn1::PucchResourceSet { pucch_resource_set_id: 1, resource_list: vec![1; 8], max_payload_size: None },
        ],
        resource_to_add_mod_list: vec![resource_small, resource_big, resource_sr],
        format1: None,
        format2: Some(SetupRelease::Setup(asn1::PucchFormatConfig {
            max_code_rate: Some(asn1::PucchMaxCodeRate::ZeroDot25),
            ..Default::default()
        })),
        scheduling_request_resource_to_add_mod_list: vec![asn1::SchedulingRequestResourceConfig {
            scheduling_request_resource_id: 1,
            scheduling_request_id: 0,
            periodicity_and_offset: Some(asn1::SrPeriodicityAndOffset::Sl40(8)),
            resource: Some(2),
        }],
        dl_data_to_ul_ack,
    })
}

pub fn make_pusch_config() -> asn1::PuschConfig {
    asn1::PuschConfig {
        dmrs_uplink_for_pusch_mapping_type_a: Some(SetupRelease::Setup(asn1::DmrsUplinkConfig {
            dmrs_type2: false,
            dmrs_additional_position: Some(asn1::DmrsAdditionalPosition::Pos1),
        })),
        resource_allocation: asn1::ResourceAllocation::Type1,
        uci_on_pusch: Some(SetupRelease::Setup(asn1::UciOnPusch {
            beta_offsets: Some(asn1::BetaOffsetsChoice::SemiStatic(asn1::BetaOffsets {
                beta_offset_ack_index1: Some(9),
                beta_offset_ack_index2: Some(9),
                beta_offset_ack_index3: Some(9),
                beta_offset_csi_part1_index1: Some(6),
                beta_offset_csi_part1_index2: Some(6),
                beta_offset_csi_part2_index1: Some(6),
                beta_offset_csi_part2_index2: Some(6),
            })),
            scaling: asn1::UciScaling::F1,
        })),
    }
}

/// One periodic NZP-CSI-RS resource and its periodic report on PUCCH resource 1
pub fn make_csi_meas_config() -> asn1::CsiMeasConfig {
    asn1::CsiMeasConfig {
        nzp_csi_rs_resource_to_add_mod_list: vec![asn1::NzpCsiRsResource {
            nzp_csi_rs_resource_id: 0,
            periodicity_slots: 80,
            offset: 1,
        }],
        csi_report_config_to_add_mod_list: vec![asn1::CsiReportConfig {
            report_config_id: 0,
            periodicity_slots: 80,
            offset: 1,
            pucch_resource: 1,
        }],
    }
}

fn make_serving_cell_config(cell: &RrcCellConfig) -> Result<asn1::ServingCellConfig, LayerError> {
    Ok(asn1::ServingCellConfig {
        initial_downlink_bwp: Some(asn1::BwpDownlinkDedicated {
            pdcch_config: Some(SetupRelease::Setup(make_pdcch_config())),
            pdsch_config: Some(SetupRelease::Setup(make_pdsch_config())),
            radio_link_monitoring_config: None,
        }),
        first_active_downlink_bwp_id: Some(0),
        uplink_config: Some(asn1::UplinkConfig {
            initial_uplink_bwp: Some(asn1::BwpUplinkDedicated {
                pucch_config: Some(SetupRelease::Setup(make_pucch_config(cell)?)),
                pusch_config: Some(SetupRelease::Setup(make_pusch_config())),
            }),
            first_active_uplink_bwp_id: Some(0),
        }),
        pdcch_serving_cell_config: Some(SetupRelease::Setup(asn1::PdcchServingCellConfig::default())),
        pdsch_serving_cell_config: Some(SetupRelease::Setup(asn1::PdschServingCellConfig {
            nrof_harq_processes_for_pdsch: Some(asn1::NrofHarqProcesses::N16),
            max_mimo_layers: None,
        })),
        csi_meas_config: Some(SetupRelease::Setup(make_csi_meas_config())),
        tag_id: 0,
    })
}

/// SpCellConfig every session configuration starts from.
///
/// ReconfigurationWithSync carries the common configuration of the cell and a
/// placeholder identity that is replaced per session.
pub fn make_base_sp_cell_cfg(cell: &RrcCellConfig) -> Result<asn1::SpCellConfig, LayerError> {
    Ok(asn1::SpCellConfig {
        serv_cell_index: None,
        reconfiguration_with_sync: Some(asn1::ReconfigurationWithSync {
            sp_cell_config_common: Some(make_serving_cell_config_common(cell)?),
            new_ue_identity: 0,
            t304: asn1::T304::Ms1000,
            smtc: None,
        }),
        sp_cell_config_dedicated: Some(make_serving_cell_config(cell)?),
    })
}

// ---------------------------------------------------------------------------
// Bearers
// ---------------------------------------------------------------------------

/// RLC bearer of SRB1, AM with 12 bit SNs
pub fn make_srb1_rlc_bearer() -> asn1::RlcBearerConfig {
    asn1::RlcBearerConfig {
        logical_channel_identity: 1,
        served_radio_bearer: Some(asn1::ServedRadioBearer::SrbIdentity(1)),
        rlc_config: Some(asn1::RlcConfig::Am {
            ul: asn1::UlAmRlc {
                sn_field_length: Some(asn1::SnFieldLengthAm::Size12),
                t_poll_retransmit_ms: 45,
                poll_pdu: None,
                poll_byte_kb: None,
                max_retx_threshold: 8,
            },
            dl: asn1::DlAmRlc {
                sn_field_length: Some(asn1::SnFieldLengthAm::Size12),
                t_reassembly: asn1::TReassembly::Ms35,
                t_status_prohibit_ms: 0,
            },
        }),
        mac_logical_channel_config: Some(asn1::LogicalChannelConfig {
            ul_specific_parameters: Some(asn1::UlSpecificParameters {
                priority: 1,
                prioritised_bit_rate: asn1::PrioritisedBitRate::Infinity,
                bucket_size_duration: asn1::BucketSizeDuration::Ms5,
                logical_channel_group: Some(0),
                scheduling_request_id: Some(0),
                logical_channel_sr_mask: false,
                logical_channel_sr_delay_timer_applied: false,
            }),
        }),
    }
}

pub fn make_srb1_to_add_mod() -> asn1::SrbToAddMod {
    asn1::SrbToAddMod { srb_identity: 1, ..Default::default() }
}

/// RLC bearer of DRB1, bidirectional UM with 12 bit SNs
pub fn make_drb1_rlc_bearer(lc_group: u8) -> asn1::RlcBearerConfig {
    asn1::RlcBearerConfig {
        logical_channel_identity: DRB1_LCID as u8,
        served_radio_bearer: Some(asn1::ServedRadioBearer::DrbIdentity(DRB1_ID)),
        rlc_config: Some(asn1::RlcConfig::UmBiDirectional {
            ul: asn1::UlUmRlc { sn_field_length: Some(asn1::SnFieldLengthUm::Size12) },
            dl: asn1::DlUmRlc {
                sn_field_length: Some(asn1::SnFieldLengthUm::Size12),
                t_reassembly: asn1::TReassembly::Ms50,
            },
        }),
        mac_logical_channel_config: Some(asn1::LogicalChannelConfig {
            ul_specific_parameters: Some(asn1::UlSpecificParameters {
                priority: 11,
                prioritised_bit_rate: asn1::PrioritisedBitRate::Kbps0,
                bucket_size_duration: asn1::BucketSizeDuration::Ms100,
                logical_channel_group: Some(lc_group),
                scheduling_request_id: Some(0),
                logical_channel_sr_mask: false,
                logical_channel_sr_delay_timer_applied: false,
            }),
        }),
    }
}

/// DRB1 on EPS bearer 5 with 18 bit PDCP SNs and ciphering disabled
pub fn make_drb1_to_add_mod() -> asn1::DrbToAddMod {
    asn1::DrbToAddMod {
        drb_identity: DRB1_ID,
        cn_association: Some(asn1::CnAssociation::EpsBearerIdentity(DRB1_EPS_BEARER_ID)),
        pdcp_config: Some(asn1::PdcpConfig {
            drb: Some(asn1::PdcpDrbConfig {
                discard_timer: Some(asn1::DiscardTimer::Ms100),
                pdcp_sn_size_ul: Some(asn1::PdcpSnSize::Len18Bits),
                pdcp_sn_size_dl: Some(asn1::PdcpSnSize::Len18Bits),
                header_compression: asn1::HeaderCompression::NotUsed,
                status_report_required: false,
            }),
            t_reordering: Some(asn1::TReordering::Ms0),
            ciphering_disabled: true,
        }),
    }
}

/// Security of the bearers terminated in the secondary node
pub fn make_security_config() -> asn1::SecurityConfig {
    asn1::SecurityConfig {
        security_algorithm_config: Some(asn1::SecurityAlgorithmConfig {
            ciphering_algorithm: asn1::CipheringAlgorithm::Nea0,
            integrity_prot_algorithm: Some(asn1::IntegrityProtAlgorithm::Nia0),
        }),
        key_to_use: Some(asn1::KeyToUse::Secondary),
    }
}

// ---------------------------------------------------------------------------
// Cell groups
// ---------------------------------------------------------------------------

/// SR and BSR configuration. TAG and PHR are not configured.
pub fn make_mac_cell_group_config() -> asn1::MacCellGroupConfig {
    asn1::MacCellGroupConfig {
        scheduling_request_config: Some(asn1::SchedulingRequestConfig {
            scheduling_request_to_add_mod_list: vec![asn1::SchedulingRequestToAddMod {
                scheduling_request_id: 0,
                sr_trans_max: asn1::SrTransMax::N64,
            }],
        }),
        bsr_config: Some(asn1::BsrConfig {
            periodic_bsr_timer: asn1::PeriodicBsrTimer::Sf20,
            retx_bsr_timer: asn1::RetxBsrTimer::Sf320,
        }),
        tag_config: None,
        skip_uplink_tx_dynamic: false,
    }
}

pub fn make_physical_cell_group_config() -> asn1::PhysicalCellGroupConfig {
    asn1::PhysicalCellGroupConfig {
        pdsch_harq_ack_codebook: asn1::PdschHarqAckCodebook::Dynamic,
        p_nr_fr1: None,
    }
}

/// Master cell group with the given RLC bearers and the dedicated SpCell
/// configuration of the base template
pub fn make_master_cell_group(
    base: &asn1::SpCellConfig,
    rlc_bearers: Vec<asn1::RlcBearerConfig>,
) -> asn1::CellGroupConfig {
    asn1::CellGroupConfig {
        cell_group_id: 0,
        rlc_bearer_to_add_mod_list: rlc_bearers,
        rlc_bearer_to_release_list: Vec::new(),
        mac_cell_group_config: Some(make_mac_cell_group_config()),
        physical_cell_group_config: Some(make_physical_cell_group_config()),
        sp_cell_config: Some(asn1::SpCellConfig {
            serv_cell_index: None,
            reconfiguration_with_sync: None,
            sp_cell_config_dedicated: base.sp_cell_config_dedicated.clone(),
        }),
    }
}

/// DRB1 is the only bearer of the secondary cell group
pub fn fill_scg_rlc_bearers(cell_group: &mut asn1::CellGroupConfig) {
    cell_group.rlc_bearer_to_add_mod_list = vec![make_drb1_rlc_bearer(DRB1_SCG_LCG)];
}

pub fn fill_scg_mac_cell_group(cell_group: &mut asn1::CellGroupConfig) {
    cell_group.mac_cell_group_config = Some(make_mac_cell_group_config());
}

/// PSCell dedicated configuration on top of the base template
pub fn fill_scg_sp_cell_dedicated(
    serv_cell: &mut asn1::ServingCellConfig,
    cell: &RrcCellConfig,
) -> Result<(), LayerError> {
    serv_cell.first_active_downlink_bwp_id = Some(match cell.duplex_mode {
        DuplexMode::Fdd => 0,
        DuplexMode::Tdd => 1,
    });

    serv_cell.uplink_config = Some(asn1::UplinkConfig {
        initial_uplink_bwp: Some(asn1::BwpUplinkDedicated {
            pucch_config: Some(SetupRelease::Setup(make_pucch_config(cell)?)),
            pusch_config: Some(SetupRelease::Setup(make_pusch_config())),
        }),
        first_active_uplink_bwp_id: Some(0),
    });

    let dl_bwp = serv_cell.initial_downlink_bwp.get_or_insert_with(Default::default);
    dl_bwp.pdsch_config = Some(SetupRelease::Setup(make_pdsch_config()));
    dl_bwp.radio_link_monitoring_config = Some(SetupRelease::Setup(make_radio_link_monitoring_config()));

    serv_cell.pdcch_serving_cell_config = Some(SetupRelease::Setup(asn1::PdcchServingCellConfig::default()));
    serv_cell.pdsch_serving_cell_config = Some(SetupRelease::Setup(asn1::PdschServingCellConfig {
        nrof_harq_processes_for_pdsch: Some(asn1::NrofHarqProcesses::N16),
        max_mimo_layers: None,
    }));
    Ok(())
}

/// SpCell of the secondary cell group. The PSCell always uses serving cell index 1.
pub fn fill_scg_sp_cell(
    cell_group: &mut asn1::CellGroupConfig,
    base: &asn1::SpCellConfig,
    cell: &RrcCellConfig,
) -> Result<(), LayerError> {
    let mut sp_cell = base.clone();
    sp_cell.serv_cell_index = Some(1);
    let serv_cell = sp_cell.sp_cell_config_dedicated.get_or_insert_with(Default::default);
    fill_scg_sp_cell_dedicated(serv_cell, cell)?;

    cell_group.sp_cell_config = Some(sp_cell);
    Ok(())
}

fn fill_recfg_dl_common(
    common: &mut asn1::ServingCellConfigCommon,
    cell: &RrcCellConfig,
) -> Result<(), LayerError> {
    let generic_parameters = asn1::Bwp {
        location_and_bandwidth: location_and_bandwidth(0, cell.nof_prb)?,
        subcarrier_spacing: scs_to_asn1(cell.scs)?,
        cyclic_prefix_extended: false,
    };

    let dl = common.downlink_config_common.get_or_insert_with(Default::default);
    match dl.initial_downlink_bwp.as_mut() {
        Some(bwp) => {
            bwp.generic_parameters = generic_parameters;
            bwp.pdsch_config_common = Some(SetupRelease::Setup(pdsch_config_common()));
        }
        None => {
            dl.initial_downlink_bwp = Some(asn1::BwpDownlinkCommon {
                generic_parameters,
                pdcch_config_common: None,
                pdsch_config_common: Some(SetupRelease::Setup(pdsch_config_common())),
            });
        }
    }
    Ok(())
}

fn fill_recfg_ul_common(
    common: &mut asn1::ServingCellConfigCommon,
    cell: &RrcCellConfig,
) -> Result<(), LayerError> {
    let generic_parameters = asn1::Bwp {
        location_and_bandwidth: location_and_bandwidth(0, cell.nof_prb)?,
        subcarrier_spacing: scs_to_asn1(cell.scs)?,
        cyclic_prefix_extended: false,
    };
    let pusch = asn1::PuschConfigCommon {
        pusch_time_domain_allocation_list: [4, 3]
            .into_iter()
            .map(|k2| asn1::PuschTimeDomainResourceAllocation {
                k2: Some(k2),
                mapping_type: asn1::MappingType::TypeA,
                start_symbol_and_length: 27,
            })
            .collect(),
        msg3_delta_preamble: None,
        p0_nominal_with_grant: Some(-60),
    };
    let pucch = asn1::PucchConfigCommon {
        pucch_resource_common: None,
        pucch_group_hopping: asn1::PucchGroupHopping::Neither,
        hopping_id: None,
        p0_nominal: Some(-60),
    };

    let ul = common.uplink_config_common.get_or_insert_with(|| asn1::UplinkConfigCommon {
        frequency_info_ul: None,
        initial_uplink_bwp: None,
        dummy: asn1::TimeAlignmentTimer::Ms500,
    });
    ul.dummy = asn1::TimeAlignmentTimer::Ms500;
    match ul.initial_uplink_bwp.as_mut() {
        Some(bwp) => {
            bwp.generic_parameters = generic_parameters;
            bwp.pusch_config_common = Some(SetupRelease::Setup(pusch));
            bwp.pucch_config_common = Some(SetupRelease::Setup(pucch));
        }
        None => {
            ul.initial_uplink_bwp = Some(asn1::BwpUplinkCommon {
                generic_parameters,
                rach_config_common: None,
                pusch_config_common: Some(SetupRelease::Setup(pusch)),
                pucch_config_common: Some(SetupRelease::Setup(pucch)),
            });
        }
    }
    Ok(())
}

/// ReconfigurationWithSync towards the PSCell for the session `rnti`
pub fn fill_recfg_with_sync(
    cell_group: &mut asn1::CellGroupConfig,
    rnti: Rnti,
    cell: &RrcCellConfig,
) -> Result<(), LayerError> {
    // 0 identifies the MCG
    cell_group.cell_group_id = 1;
    cell_group.physical_cell_group_config = Some(make_physical_cell_group_config());

    let sync = cell_group
        .sp_cell_config
        .as_mut()
        .and_then(|sp_cell| sp_cell.reconfiguration_with_sync.as_mut())
        .ok_or_else(|| LayerError::InvalidConfiguration("SpCell has no ReconfigurationWithSync".to_string()))?;
    sync.new_ue_identity = rnti.value();
    sync.t304 = asn1::T304::Ms1000;
    if cell.duplex_mode == DuplexMode::Tdd {
        sync.smtc = Some(SetupRelease::Release);
    }

    let common = sync
        .sp_cell_config_common
        .as_mut()
        .ok_or_else(|| LayerError::InvalidConfiguration("SpCell has no common configuration".to_string()))?;
    fill_recfg_dl_common(common, cell)?;
    fill_recfg_ul_common(common, cell)
}

/// Build the complete secondary cell group into `cell_group`
pub fn fill_secondary_cell_group(
    cell_group: &mut asn1::CellGroupConfig,
    base: &asn1::SpCellConfig,
    cell: &RrcCellConfig,
    rnti: Rnti,
) -> Result<(), LayerError> {
    fill_scg_rlc_bearers(cell_group);
    fill_scg_mac_cell_group(cell_group);
    fill_scg_sp_cell(cell_group, base, cell)?;
    fill_recfg_with_sync(cell_group, rnti, cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rrc::phy_cfg::{make_pdcch_cfg, make_rlc_config};
    use crate::rlc::RlcMode;

    fn tdd_cell() -> RrcCellConfig {
        RrcCellConfig {
            dl_arfcn: 634240,
            ssb_arfcn: 633984,
            band: 78,
            nof_prb: 52,
            duplex_mode: DuplexMode::Tdd,
            ..Default::default()
        }
    }

    fn scg(cell: &RrcCellConfig, rnti: Rnti) -> asn1::CellGroupConfig {
        let base = make_base_sp_cell_cfg(cell).unwrap();
        let mut cg = asn1::CellGroupConfig::default();
        fill_secondary_cell_group(&mut cg, &base, cell, rnti).unwrap();
        cg
    }

    #[test]
    fn test_location_and_bandwidth() {
        assert_eq!(location_and_bandwidth(0, 52).unwrap(), 14025);
        assert_eq!(location_and_bandwidth(0, 1).unwrap(), 0);
        assert_eq!(location_and_bandwidth(0, 275).unwrap(), 549);
        assert!(location_and_bandwidth(0, 0).is_err());
        assert!(location_and_bandwidth(270, 10).is_err());
    }

    #[test]
    fn test_point_a() {
        // 52 PRBs at 15 kHz span 9360 kHz, point A sits 4680 kHz below the centre
        assert_eq!(point_a_arfcn(368500, 52, SubcarrierSpacing::Scs15), 367564);
        assert_eq!(point_a_arfcn(634240, 52, SubcarrierSpacing::Scs15), 633928);
    }

    #[test]
    fn test_base_sp_cell_pdcch_is_consistent() {
        let cell = RrcCellConfig::default();
        let base = make_base_sp_cell_cfg(&cell).unwrap();
        let common = base
            .reconfiguration_with_sync
            .as_ref()
            .and_then(|s| s.sp_cell_config_common.as_ref())
            .unwrap();
        let pdcch_common = common
            .downlink_config_common
            .as_ref()
            .and_then(|dl| dl.initial_downlink_bwp.as_ref())
            .and_then(|bwp| bwp.pdcch_config_common.as_ref())
            .and_then(|p| p.setup())
            .unwrap();
        let pdcch_ded = base
            .sp_cell_config_dedicated
            .as_ref()
            .and_then(|d| d.initial_downlink_bwp.as_ref())
            .and_then(|bwp| bwp.pdcch_config.as_ref())
            .and_then(|p| p.setup());

        let pdcch = make_pdcch_cfg(pdcch_common, pdcch_ded).unwrap();
        assert_eq!(pdcch.coresets.len(), 2);
        assert_eq!(pdcch.search_spaces.len(), 3);
        assert_eq!(pdcch.ra_search_space, Some(1));
    }

    #[test]
    fn test_secondary_cell_group_fdd() {
        let cell = RrcCellConfig::default();
        let cg = scg(&cell, Rnti(0x4601));

        assert_eq!(cg.cell_group_id, 1);
        assert_eq!(cg.rlc_bearer_to_add_mod_list.len(), 1);
        let lc = cg.rlc_bearer_to_add_mod_list[0]
            .mac_logical_channel_config
            .as_ref()
            .and_then(|c| c.ul_specific_parameters.as_ref())
            .unwrap();
        assert_eq!(lc.logical_channel_group, Some(DRB1_SCG_LCG));

        let sp_cell = cg.sp_cell_config.as_ref().unwrap();
        assert_eq!(sp_cell.serv_cell_index, Some(1));
        let sync = sp_cell.reconfiguration_with_sync.as_ref().unwrap();
        assert_eq!(sync.new_ue_identity, 0x4601);
        assert_eq!(sync.t304, asn1::T304::Ms1000);
        assert!(sync.smtc.is_none());

        let ded = sp_cell.sp_cell_config_dedicated.as_ref().unwrap();
        assert_eq!(ded.first_active_downlink_bwp_id, Some(0));
        let pucch = ded
            .uplink_config
            .as_ref()
            .and_then(|ul| ul.initial_uplink_bwp.as_ref())
            .and_then(|bwp| bwp.pucch_config.as_ref())
            .and_then(|p| p.setup())
            .unwrap();
        assert_eq!(pucch.dl_data_to_ul_ack, vec![4]);
        assert_eq!(pucch.resource_to_add_mod_list.len(), 3);
        assert_eq!(pucch.resource_to_add_mod_list[1].starting_prb, 51);
        assert_eq!(pucch.resource_set_to_add_mod_list[1].resource_list, vec![1; 8]);

        let ul_common = sync
            .sp_cell_config_common
            .as_ref()
            .and_then(|c| c.uplink_config_common.as_ref())
            .unwrap();
        assert_eq!(ul_common.dummy, asn1::TimeAlignmentTimer::Ms500);
        let pusch_common = ul_common
            .initial_uplink_bwp
            .as_ref()
            .and_then(|bwp| bwp.pusch_config_common.as_ref())
            .and_then(|p| p.setup())
            .unwrap();
        assert_eq!(pusch_common.pusch_time_domain_allocation_list.len(), 2);
        assert_eq!(pusch_common.p0_nominal_with_grant, Some(-60));
        assert_eq!(
            cg.physical_cell_group_config.as_ref().map(|p| p.pdsch_harq_ack_codebook),
            Some(asn1::PdschHarqAckCodebook::Dynamic)
        );
    }

    #[test]
    fn test_secondary_cell_group_tdd() {
        let cell = tdd_cell();
        let cg = scg(&cell, Rnti(0x4602));
        let sp_cell = cg.sp_cell_config.as_ref().unwrap();
        let ded = sp_cell.sp_cell_config_dedicated.as_ref().unwrap();
        assert_eq!(ded.first_active_downlink_bwp_id, Some(1));
        assert_eq!(
            sp_cell.reconfiguration_with_sync.as_ref().and_then(|s| s.smtc.clone()),
            Some(SetupRelease::Release)
        );
        let common = sp_cell
            .reconfiguration_with_sync
            .as_ref()
            .and_then(|s| s.sp_cell_config_common.as_ref())
            .unwrap();
        assert!(common.tdd_ul_dl_configuration_common.is_some());
    }

    #[test]
    fn test_scg_requires_recfg_with_sync() {
        let cell = RrcCellConfig::default();
        let mut base = make_base_sp_cell_cfg(&cell).unwrap();
        base.reconfiguration_with_sync = None;
        let mut cg = asn1::CellGroupConfig::default();
        assert!(fill_secondary_cell_group(&mut cg, &base, &cell, Rnti(0x4601)).is_err());
    }

    #[test]
    fn test_bearer_profiles_convert() {
        let drb = make_drb1_rlc_bearer(DRB1_LCG);
        let rlc = make_rlc_config(drb.rlc_config.as_ref().unwrap(), DRB1_ID).unwrap();
        assert_eq!(rlc.mode, RlcMode::Um { sn_field_length: 12, t_reassembly_ms: 50 });

        let srb = make_srb1_rlc_bearer();
        let rlc = make_rlc_config(srb.rlc_config.as_ref().unwrap(), 1).unwrap();
        assert!(matches!(rlc.mode, RlcMode::Am { sn_field_length: 12, t_poll_retx_ms: 45, max_retx_thresh: 8, .. }));
    }
}
