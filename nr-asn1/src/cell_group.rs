//! CellGroupConfig and the serving-cell IEs nested inside it

use crate::SetupRelease;
use serde::{Deserialize, Serialize};

/// SubcarrierSpacing IE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubcarrierSpacing {
    Khz15,
    Khz30,
    Khz60,
    Khz120,
}

impl SubcarrierSpacing {
    pub fn to_khz(self) -> u32 {
        match self {
            SubcarrierSpacing::Khz15 => 15,
            SubcarrierSpacing::Khz30 => 30,
            SubcarrierSpacing::Khz60 => 60,
            SubcarrierSpacing::Khz120 => 120,
        }
    }
}

/// CellGroupConfig
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellGroupConfig {
    /// 0 identifies the MCG, other values identify SCGs
    pub cell_group_id: u8,
    pub rlc_bearer_to_add_mod_list: Vec<RlcBearerConfig>,
    pub rlc_bearer_to_release_list: Vec<u8>,
    pub mac_cell_group_config: Option<MacCellGroupConfig>,
    pub physical_cell_group_config: Option<PhysicalCellGroupConfig>,
    pub sp_cell_config: Option<SpCellConfig>,
}

// ---------------------------------------------------------------------------
// RLC bearers
// ---------------------------------------------------------------------------

/// RLC-BearerConfig
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RlcBearerConfig {
    pub logical_channel_identity: u8,
    pub served_radio_bearer: Option<ServedRadioBearer>,
    pub rlc_config: Option<RlcConfig>,
    pub mac_logical_channel_config: Option<LogicalChannelConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServedRadioBearer {
    SrbIdentity(u8),
    DrbIdentity(u8),
}

/// RLC-Config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RlcConfig {
    Am { ul: UlAmRlc, dl: DlAmRlc },
    UmBiDirectional { ul: UlUmRlc, dl: DlUmRlc },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UlAmRlc {
    pub sn_field_length: Option<SnFieldLengthAm>,
    pub t_poll_retransmit_ms: u16,
    /// `None` means infinity
    pub poll_pdu: Option<u32>,
    /// `None` means infinity
    pub poll_byte_kb: Option<u32>,
    pub max_retx_threshold: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlAmRlc {
    pub sn_field_length: Option<SnFieldLengthAm>,
    pub t_reassembly: TReassembly,
    pub t_status_prohibit_ms: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UlUmRlc {
    pub sn_field_length: Option<SnFieldLengthUm>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlUmRlc {
    pub sn_field_length: Option<SnFieldLengthUm>,
    pub t_reassembly: TReassembly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnFieldLengthUm {
    Size6,
    Size12,
}

impl SnFieldLengthUm {
    pub fn bits(self) -> u8 {
        match self {
            SnFieldLengthUm::Size6 => 6,
            SnFieldLengthUm::Size12 => 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnFieldLengthAm {
    Size12,
    Size18,
}

impl SnFieldLengthAm {
    pub fn bits(self) -> u8 {
        match self {
            SnFieldLengthAm::Size12 => 12,
            SnFieldLengthAm::Size18 => 18,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TReassembly {
    Ms0,
    Ms5,
    Ms10,
    Ms15,
    Ms20,
    Ms25,
    Ms30,
    Ms35,
    Ms40,
    Ms45,
    Ms50,
    Ms80,
    Ms100,
    Ms200,
}

impl TReassembly {
    pub fn to_ms(self) -> u32 {
        match self {
            TReassembly::Ms0 => 0,
            TReassembly::Ms5 => 5,
            TReassembly::Ms10 => 10,
            TReassembly::Ms15 => 15,
            TReassembly::Ms20 => 20,
            TReassembly::Ms25 => 25,
            TReassembly::Ms30 => 30,
            TReassembly::Ms35 => 35,
            TReassembly::Ms40 => 40,
            TReassembly::Ms45 => 45,
            TReassembly::Ms50 => 50,
            TReassembly::Ms80 => 80,
            TReassembly::Ms100 => 100,
            TReassembly::Ms200 => 200,
        }
    }
}

/// LogicalChannelConfig
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalChannelConfig {
    pub ul_specific_parameters: Option<UlSpecificParameters>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UlSpecificParameters {
    pub priority: u8,
    pub prioritised_bit_rate: PrioritisedBitRate,
    pub bucket_size_duration: BucketSizeDuration,
    pub logical_channel_group: Option<u8>,
    pub scheduling_request_id: Option<u8>,
    pub logical_channel_sr_mask: bool,
    pub logical_channel_sr_delay_timer_applied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrioritisedBitRate {
    Kbps0,
    Kbps8,
    Kbps16,
    Kbps32,
    Kbps64,
    Kbps128,
    Kbps256,
    Kbps512,
    Kbps1024,
    Kbps2048,
    Kbps4096,
    Kbps8192,
    Kbps16384,
    Kbps32768,
    Kbps65536,
    Infinity,
}

impl PrioritisedBitRate {
    /// Rate in kbps, `None` for infinity
    pub fn to_kbps(self) -> Option<u32> {
        Some(match self {
            PrioritisedBitRate::Kbps0 => 0,
            PrioritisedBitRate::Kbps8 => 8,
            PrioritisedBitRate::Kbps16 => 16,
            PrioritisedBitRate::Kbps32 => 32,
            PrioritisedBitRate::Kbps64 => 64,
            PrioritisedBitRate::Kbps128 => 128,
            PrioritisedBitRate::Kbps256 => 256,
            PrioritisedBitRate::Kbps512 => 512,
            PrioritisedBitRate::Kbps1024 => 1024,
            PrioritisedBitRate::Kbps2048 => 2048,
            PrioritisedBitRate::Kbps4096 => 4096,
            PrioritisedBitRate::Kbps8192 => 8192,
            PrioritisedBitRate::Kbps16384 => 16384,
            PrioritisedBitRate::Kbps32768 => 32768,
            PrioritisedBitRate::Kbps65536 => 65536,
            PrioritisedBitRate::Infinity => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BucketSizeDuration {
    Ms5,
    Ms10,
    Ms20,
    Ms50,
    Ms100,
    Ms150,
    Ms300,
    Ms500,
    Ms1000,
}

impl BucketSizeDuration {
    pub fn to_ms(self) -> u32 {
        match self {
            BucketSizeDuration::Ms5 => 5,
            BucketSizeDuration::Ms10 => 10,
            BucketSizeDuration::Ms20 => 20,
            BucketSizeDuration::Ms50 => 50,
            BucketSizeDuration::Ms100 => 100,
            BucketSizeDuration::Ms150 => 150,
            BucketSizeDuration::Ms300 => 300,
            BucketSizeDuration::Ms500 => 500,
            BucketSizeDuration::Ms1000 => 1000,
        }
    }
}

// ---------------------------------------------------------------------------
// MAC and physical cell group
// ---------------------------------------------------------------------------

/// MAC-CellGroupConfig
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacCellGroupConfig {
    pub scheduling_request_config: Option<SchedulingRequestConfig>,
    pub bsr_config: Option<BsrConfig>,
    pub tag_config: Option<TagConfig>,
    pub skip_uplink_tx_dynamic: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingRequestConfig {
    pub scheduling_request_to_add_mod_list: Vec<SchedulingRequestToAddMod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingRequestToAddMod {
    pub scheduling_request_id: u8,
    pub sr_trans_max: SrTransMax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SrTransMax {
    N4,
    N8,
    N16,
    N32,
    N64,
}

impl SrTransMax {
    pub fn to_number(self) -> u32 {
        match self {
            SrTransMax::N4 => 4,
            SrTransMax::N8 => 8,
            SrTransMax::N16 => 16,
            SrTransMax::N32 => 32,
            SrTransMax::N64 => 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BsrConfig {
    pub periodic_bsr_timer: PeriodicBsrTimer,
    pub retx_bsr_timer: RetxBsrTimer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodicBsrTimer {
    Sf1,
    Sf5,
    Sf10,
    Sf16,
    Sf20,
    Sf32,
    Sf40,
    Sf64,
    Sf80,
    Sf128,
    Sf160,
    Sf320,
    Sf640,
    Sf1280,
    Sf2560,
    Infinity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetxBsrTimer {
    Sf10,
    Sf20,
    Sf40,
    Sf80,
    Sf160,
    Sf320,
    Sf640,
    Sf1280,
    Sf2560,
    Sf5120,
    Sf10240,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagConfig {
    pub tag_to_add_mod_list: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub tag_id: u8,
    pub time_alignment_timer: TimeAlignmentTimer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeAlignmentTimer {
    Ms500,
    Ms750,
    Ms1280,
    Ms1920,
    Ms2560,
    Ms5120,
    Ms10240,
    Infinity,
}

/// PhysicalCellGroupConfig
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalCellGroupConfig {
    pub pdsch_harq_ack_codebook: PdschHarqAckCodebook,
    pub p_nr_fr1: Option<i8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PdschHarqAckCodebook {
    SemiStatic,
    Dynamic,
}

// ---------------------------------------------------------------------------
// SpCell
// ---------------------------------------------------------------------------

/// SpCellConfig
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpCellConfig {
    pub serv_cell_index: Option<u8>,
    pub reconfiguration_with_sync: Option<ReconfigurationWithSync>,
    pub sp_cell_config_dedicated: Option<ServingCellConfig>,
}

/// ReconfigurationWithSync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconfigurationWithSync {
    pub sp_cell_config_common: Option<ServingCellConfigCommon>,
    pub new_ue_identity: u16,
    pub t304: T304,
    pub smtc: Option<SetupRelease<SsbMtc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum T304 {
    Ms50,
    Ms100,
    Ms150,
    Ms200,
    Ms500,
    Ms1000,
    Ms2000,
    Ms10000,
}

/// SSB-MTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsbMtc {
    pub periodicity_sf: u8,
    pub offset_sf: u8,
    pub duration_sf: u8,
}

/// ServingCellConfigCommon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServingCellConfigCommon {
    pub phys_cell_id: Option<u16>,
    pub downlink_config_common: Option<DownlinkConfigCommon>,
    pub uplink_config_common: Option<UplinkConfigCommon>,
    pub ssb_positions_in_burst: Option<SsbPositionsInBurst>,
    pub ssb_periodicity_serving_cell: Option<SsbPeriodicity>,
    pub dmrs_type_a_position: DmrsTypeAPosition,
    pub ssb_subcarrier_spacing: Option<SubcarrierSpacing>,
    pub tdd_ul_dl_configuration_common: Option<TddUlDlConfigCommon>,
    pub ss_pbch_block_power: i8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownlinkConfigCommon {
    pub frequency_info_dl: Option<FrequencyInfoDl>,
    pub initial_downlink_bwp: Option<BwpDownlinkCommon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyInfoDl {
    pub absolute_frequency_ssb: Option<u32>,
    pub frequency_band_list: Vec<u16>,
    pub absolute_frequency_point_a: u32,
    pub scs_specific_carrier_list: Vec<ScsSpecificCarrier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScsSpecificCarrier {
    pub offset_to_carrier: u16,
    pub subcarrier_spacing: SubcarrierSpacing,
    pub carrier_bandwidth: u16,
}

/// BWP generic parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bwp {
    /// RIV of the BWP start and size (TS 38.214)
    pub location_and_bandwidth: u16,
    pub subcarrier_spacing: SubcarrierSpacing,
    pub cyclic_prefix_extended: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BwpDownlinkCommon {
    pub generic_parameters: Bwp,
    pub pdcch_config_common: Option<SetupRelease<PdcchConfigCommon>>,
    pub pdsch_config_common: Option<SetupRelease<PdschConfigCommon>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdcchConfigCommon {
    pub control_resource_set_zero: Option<u8>,
    pub common_control_resource_set: Option<ControlResourceSet>,
    pub search_space_zero: Option<u8>,
    pub common_search_space_list: Vec<SearchSpace>,
    pub search_space_sib1: Option<u8>,
    pub paging_search_space: Option<u8>,
    pub ra_search_space: Option<u8>,
}

/// ControlResourceSet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResourceSet {
    pub control_resource_set_id: u8,
    /// 45-bit bitmap, one bit per group of 6 RBs, MSB first
    pub frequency_domain_resources: u64,
    pub duration: u8,
    pub precoder_granularity: PrecoderGranularity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrecoderGranularity {
    SameAsRegBundle,
    AllContiguousRbs,
}

/// SearchSpace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpace {
    pub search_space_id: u8,
    pub control_resource_set_id: Option<u8>,
    /// Monitoring periodicity in slots, offset zero
    pub monitoring_slot_periodicity: Option<u16>,
    pub duration: Option<u16>,
    pub nrof_candidates: Option<NrofCandidates>,
    pub search_space_type: Option<SearchSpaceType>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NrofCandidates {
    pub aggregation_level1: u8,
    pub aggregation_level2: u8,
    pub aggregation_level4: u8,
    pub aggregation_level8: u8,
    pub aggregation_level16: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchSpaceType {
    Common { dci_format0_0_and_format1_0: bool },
    UeSpecific { dci_formats: DciFormats },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DciFormats {
    Formats00And10,
    Formats01And11,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdschConfigCommon {
    pub pdsch_time_domain_allocation_list: Vec<PdschTimeDomainResourceAllocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdschTimeDomainResourceAllocation {
    pub k0: Option<u8>,
    pub mapping_type: MappingType,
    pub start_symbol_and_length: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingType {
    TypeA,
    TypeB,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UplinkConfigCommon {
    pub frequency_info_ul: Option<FrequencyInfoUl>,
    pub initial_uplink_bwp: Option<BwpUplinkCommon>,
    pub dummy: TimeAlignmentTimer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyInfoUl {
    pub frequency_band_list: Vec<u16>,
    pub absolute_frequency_point_a: Option<u32>,
    pub scs_specific_carrier_list: Vec<ScsSpecificCarrier>,
    pub p_max: Option<i8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BwpUplinkCommon {
    pub generic_parameters: Bwp,
    pub rach_config_common: Option<SetupRelease<RachConfigCommon>>,
    pub pusch_config_common: Option<SetupRelease<PuschConfigCommon>>,
    pub pucch_config_common: Option<SetupRelease<PucchConfigCommon>>,
}

/// RACH-ConfigCommon, numeric fields carry their natural units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RachConfigCommon {
    pub prach_configuration_index: u8,
    pub msg1_fdm: u8,
    pub msg1_frequency_start: u16,
    pub zero_correlation_zone_config: u8,
    pub preamble_received_target_power: i16,
    pub preamble_trans_max: u8,
    pub power_ramping_step_db: u8,
    pub ra_response_window_sl: u8,
    pub ra_contention_resolution_timer_sf: u8,
    pub prach_root_sequence_index: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuschConfigCommon {
    pub pusch_time_domain_allocation_list: Vec<PuschTimeDomainResourceAllocation>,
    pub msg3_delta_preamble: Option<i8>,
    pub p0_nominal_with_grant: Option<i16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuschTimeDomainResourceAllocation {
    pub k2: Option<u8>,
    pub mapping_type: MappingType,
    pub start_symbol_and_length: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PucchConfigCommon {
    pub pucch_resource_common: Option<u8>,
    pub pucch_group_hopping: PucchGroupHopping,
    pub hopping_id: Option<u16>,
    pub p0_nominal: Option<i16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PucchGroupHopping {
    Neither,
    Enable,
    Disable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SsbPositionsInBurst {
    Short(u8),
    Medium(u8),
    Long(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SsbPeriodicity {
    Ms5,
    Ms10,
    Ms20,
    Ms40,
    Ms80,
    Ms160,
}

impl SsbPeriodicity {
    pub fn from_ms(ms: u32) -> Option<Self> {
        match ms {
            5 => Some(SsbPeriodicity::Ms5),
            10 => Some(SsbPeriodicity::Ms10),
            20 => Some(SsbPeriodicity::Ms20),
            40 => Some(SsbPeriodicity::Ms40),
            80 => Some(SsbPeriodicity::Ms80),
            160 => Some(SsbPeriodicity::Ms160),
            _ => None,
        }
    }

    pub fn to_ms(self) -> u32 {
        match self {
            SsbPeriodicity::Ms5 => 5,
            SsbPeriodicity::Ms10 => 10,
            SsbPeriodicity::Ms20 => 20,
            SsbPeriodicity::Ms40 => 40,
            SsbPeriodicity::Ms80 => 80,
            SsbPeriodicity::Ms160 => 160,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DmrsTypeAPosition {
    Pos2,
    Pos3,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TddUlDlConfigCommon {
    pub reference_subcarrier_spacing: SubcarrierSpacing,
    pub pattern1: TddUlDlPattern,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TddUlDlPattern {
    pub dl_ul_transmission_periodicity: TddPeriodicity,
    pub nrof_downlink_slots: u8,
    pub nrof_downlink_symbols: u8,
    pub nrof_uplink_slots: u8,
    pub nrof_uplink_symbols: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TddPeriodicity {
    Ms0p5,
    Ms0p625,
    Ms1,
    Ms1p25,
    Ms2,
    Ms2p5,
    Ms5,
    Ms10,
}

impl TddPeriodicity {
    /// Period in microseconds
    pub fn to_us(self) -> u32 {
        match self {
            TddPeriodicity::Ms0p5 => 500,
            TddPeriodicity::Ms0p625 => 625,
            TddPeriodicity::Ms1 => 1000,
            TddPeriodicity::Ms1p25 => 1250,
            TddPeriodicity::Ms2 => 2000,
            TddPeriodicity::Ms2p5 => 2500,
            TddPeriodicity::Ms5 => 5000,
            TddPeriodicity::Ms10 => 10000,
        }
    }
}

// ---------------------------------------------------------------------------
// Dedicated serving cell configuration
// ---------------------------------------------------------------------------

/// ServingCellConfig
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServingCellConfig {
    pub initial_downlink_bwp: Option<BwpDownlinkDedicated>,
    pub first_active_downlink_bwp_id: Option<u8>,
    pub uplink_config: Option<UplinkConfig>,
    pub pdcch_serving_cell_config: Option<SetupRelease<PdcchServingCellConfig>>,
    pub pdsch_serving_cell_config: Option<SetupRelease<PdschServingCellConfig>>,
    pub csi_meas_config: Option<SetupRelease<CsiMeasConfig>>,
    pub tag_id: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BwpDownlinkDedicated {
    pub pdcch_config: Option<SetupRelease<PdcchConfig>>,
    pub pdsch_config: Option<SetupRelease<PdschConfig>>,
    pub radio_link_monitoring_config: Option<SetupRelease<RadioLinkMonitoringConfig>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdcchConfig {
    pub control_resource_set_to_add_mod_list: Vec<ControlResourceSet>,
    pub search_spaces_to_add_mod_list: Vec<SearchSpace>,
}

/// PDSCH-Config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdschConfig {
    pub dmrs_downlink_for_pdsch_mapping_type_a: Option<SetupRelease<DmrsDownlinkConfig>>,
    pub tci_states_to_add_mod_list: Vec<TciState>,
    pub resource_allocation: ResourceAllocation,
    pub rbg_size: RbgSize,
    pub mcs_table: Option<McsTable>,
    pub prb_bundling_type: PrbBundlingType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmrsDownlinkConfig {
    pub dmrs_type2: bool,
    pub dmrs_additional_position: Option<DmrsAdditionalPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DmrsAdditionalPosition {
    Pos0,
    Pos1,
    Pos3,
}

impl DmrsAdditionalPosition {
    pub fn to_number(self) -> u8 {
        match self {
            DmrsAdditionalPosition::Pos0 => 0,
            DmrsAdditionalPosition::Pos1 => 1,
            DmrsAdditionalPosition::Pos3 => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TciState {
    pub tci_state_id: u8,
    pub qcl_type1: QclInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QclInfo {
    pub cell: Option<u8>,
    pub bwp_id: Option<u8>,
    pub reference_signal: QclReferenceSignal,
    pub qcl_type: QclType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QclReferenceSignal {
    CsiRs(u8),
    Ssb(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QclType {
    TypeA,
    TypeB,
    TypeC,
    TypeD,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceAllocation {
    Type0,
    Type1,
    DynamicSwitch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RbgSize {
    Config1,
    Config2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum McsTable {
    Qam256,
    Qam64LowSe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrbBundlingType {
    StaticBundling { bundle_size: Option<BundleSize> },
    DynamicBundling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BundleSize {
    N4,
    Wideband,
}

/// RadioLinkMonitoringConfig
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioLinkMonitoringConfig {
    pub failure_detection_resources_to_add_mod_list: Vec<RadioLinkMonitoringRs>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioLinkMonitoringRs {
    pub radio_link_monitoring_rs_id: u8,
    pub purpose: RlmPurpose,
    pub detection_resource: DetectionResource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RlmPurpose {
    BeamFailure,
    Rlf,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionResource {
    SsbIndex(u8),
    CsiRsIndex(u8),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UplinkConfig {
    pub initial_uplink_bwp: Option<BwpUplinkDedicated>,
    pub first_active_uplink_bwp_id: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BwpUplinkDedicated {
    pub pucch_config: Option<SetupRelease<PucchConfig>>,
    pub pusch_config: Option<SetupRelease<PuschConfig>>,
}

/// PUCCH-Config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PucchConfig {
    pub resource_set_to_add_mod_list: Vec<PucchResourceSet>,
    pub resource_to_add_mod_list: Vec<PucchResource>,
    pub format1: Option<SetupRelease<PucchFormatConfig>>,
    pub format2: Option<SetupRelease<PucchFormatConfig>>,
    pub scheduling_request_resource_to_add_mod_list: Vec<SchedulingRequestResourceConfig>,
    pub dl_data_to_ul_ack: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PucchResourceSet {
    pub pucch_resource_set_id: u8,
    pub resource_list: Vec<u8>,
    pub max_payload_size: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PucchResource {
    pub pucch_resource_id: u8,
    pub starting_prb: u16,
    pub intra_slot_frequency_hopping: bool,
    pub second_hop_prb: Option<u16>,
    pub format: PucchFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PucchFormat {
    Format0 {
        initial_cyclic_shift: u8,
        nrof_symbols: u8,
        starting_symbol_index: u8,
    },
    Format1 {
        initial_cyclic_shift: u8,
        nrof_symbols: u8,
        starting_symbol_index: u8,
        time_domain_occ: u8,
    },
    Format2 {
        nrof_prbs: u8,
        nrof_symbols: u8,
        starting_symbol_index: u8,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PucchFormatConfig {
    pub max_code_rate: Option<PucchMaxCodeRate>,
    pub nrof_slots: Option<u8>,
    pub additional_dmrs: bool,
    pub simultaneous_harq_ack_csi: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PucchMaxCodeRate {
    ZeroDot08,
    ZeroDot15,
    ZeroDot25,
    ZeroDot35,
    ZeroDot45,
    ZeroDot60,
    ZeroDot80,
}

impl PucchMaxCodeRate {
    pub fn to_number(self) -> f32 {
        match self {
            PucchMaxCodeRate::ZeroDot08 => 0.08,
            PucchMaxCodeRate::ZeroDot15 => 0.15,
            PucchMaxCodeRate::ZeroDot25 => 0.25,
            PucchMaxCodeRate::ZeroDot35 => 0.35,
            PucchMaxCodeRate::ZeroDot45 => 0.45,
            PucchMaxCodeRate::ZeroDot60 => 0.60,
            PucchMaxCodeRate::ZeroDot80 => 0.80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingRequestResourceConfig {
    pub scheduling_request_resource_id: u8,
    pub scheduling_request_id: u8,
    pub periodicity_and_offset: Option<SrPeriodicityAndOffset>,
    pub resource: Option<u8>,
}

/// SR periodicity in slots together with the slot offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SrPeriodicityAndOffset {
    Sl1,
    Sl2(u8),
    Sl4(u8),
    Sl5(u8),
    Sl8(u8),
    Sl10(u8),
    Sl16(u8),
    Sl20(u8),
    Sl40(u8),
    Sl80(u8),
    Sl160(u8),
    Sl320(u16),
    Sl640(u16),
}

impl SrPeriodicityAndOffset {
    pub fn period(self) -> u32 {
        match self {
            SrPeriodicityAndOffset::Sl1 => 1,
            SrPeriodicityAndOffset::Sl2(_) => 2,
            SrPeriodicityAndOffset::Sl4(_) => 4,
            SrPeriodicityAndOffset::Sl5(_) => 5,
            SrPeriodicityAndOffset::Sl8(_) => 8,
            SrPeriodicityAndOffset::Sl10(_) => 10,
            SrPeriodicityAndOffset::Sl16(_) => 16,
            SrPeriodicityAndOffset::Sl20(_) => 20,
            SrPeriodicityAndOffset::Sl40(_) => 40,
            SrPeriodicityAndOffset::Sl80(_) => 80,
            SrPeriodicityAndOffset::Sl160(_) => 160,
            SrPeriodicityAndOffset::Sl320(_) => 320,
            SrPeriodicityAndOffset::Sl640(_) => 640,
        }
    }

    pub fn offset(self) -> u32 {
        match self {
            SrPeriodicityAndOffset::Sl1 => 0,
            SrPeriodicityAndOffset::Sl2(o)
            | SrPeriodicityAndOffset::Sl4(o)
            | SrPeriodicityAndOffset::Sl5(o)
            | SrPeriodicityAndOffset::Sl8(o)
            | SrPeriodicityAndOffset::Sl10(o)
            | SrPeriodicityAndOffset::Sl16(o)
            | SrPeriodicityAndOffset::Sl20(o)
            | SrPeriodicityAndOffset::Sl40(o)
            | SrPeriodicityAndOffset::Sl80(o)
            | SrPeriodicityAndOffset::Sl160(o) => o as u32,
            SrPeriodicityAndOffset::Sl320(o) | SrPeriodicityAndOffset::Sl640(o) => o as u32,
        }
    }
}

/// PUSCH-Config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuschConfig {
    pub dmrs_uplink_for_pusch_mapping_type_a: Option<SetupRelease<DmrsUplinkConfig>>,
    pub resource_allocation: ResourceAllocation,
    pub uci_on_pusch: Option<SetupRelease<UciOnPusch>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmrsUplinkConfig {
    pub dmrs_type2: bool,
    pub dmrs_additional_position: Option<DmrsAdditionalPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UciOnPusch {
    pub beta_offsets: Option<BetaOffsetsChoice>,
    pub scaling: UciScaling,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetaOffsetsChoice {
    Dynamic(Vec<BetaOffsets>),
    SemiStatic(BetaOffsets),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetaOffsets {
    pub beta_offset_ack_index1: Option<u8>,
    pub beta_offset_ack_index2: Option<u8>,
    pub beta_offset_ack_index3: Option<u8>,
    pub beta_offset_csi_part1_index1: Option<u8>,
    pub beta_offset_csi_part1_index2: Option<u8>,
    pub beta_offset_csi_part2_index1: Option<u8>,
    pub beta_offset_csi_part2_index2: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UciScaling {
    F0p5,
    F0p65,
    F0p8,
    F1,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdcchServingCellConfig {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdschServingCellConfig {
    pub nrof_harq_processes_for_pdsch: Option<NrofHarqProcesses>,
    pub max_mimo_layers: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NrofHarqProcesses {
    N2,
    N4,
    N6,
    N10,
    N12,
    N16,
}

impl NrofHarqProcesses {
    pub fn to_number(self) -> u8 {
        match self {
            NrofHarqProcesses::N2 => 2,
            NrofHarqProcesses::N4 => 4,
            NrofHarqProcesses::N6 => 6,
            NrofHarqProcesses::N10 => 10,
            NrofHarqProcesses::N12 => 12,
            NrofHarqProcesses::N16 => 16,
        }
    }
}

/// CSI-MeasConfig, reduced to periodic NZP-CSI-RS resources and reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsiMeasConfig {
    pub nzp_csi_rs_resource_to_add_mod_list: Vec<NzpCsiRsResource>,
    pub csi_report_config_to_add_mod_list: Vec<CsiReportConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NzpCsiRsResource {
    pub nzp_csi_rs_resource_id: u8,
    pub periodicity_slots: u16,
    pub offset: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsiReportConfig {
    pub report_config_id: u8,
    pub periodicity_slots: u16,
    pub offset: u16,
    pub pucch_resource: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pack, unpack, MAX_PDU_LEN};

    #[test]
    fn test_sr_periodicity_and_offset() {
        let sr = SrPeriodicityAndOffset::Sl40(8);
        assert_eq!(sr.period(), 40);
        assert_eq!(sr.offset(), 8);
        assert_eq!(SrPeriodicityAndOffset::Sl1.offset(), 0);
    }

    #[test]
    fn test_ssb_periodicity_from_ms() {
        assert_eq!(SsbPeriodicity::from_ms(20), Some(SsbPeriodicity::Ms20));
        assert_eq!(SsbPeriodicity::from_ms(30), None);
        assert_eq!(SsbPeriodicity::Ms160.to_ms(), 160);
    }

    #[test]
    fn test_empty_cell_group_packs() {
        let cg = CellGroupConfig { cell_group_id: 1, ..Default::default() };
        let pdu = pack(&cg, MAX_PDU_LEN).unwrap();
        let back: CellGroupConfig = unpack(&pdu).unwrap();
        assert_eq!(back.cell_group_id, 1);
        assert!(back.sp_cell_config.is_none());
    }
}
