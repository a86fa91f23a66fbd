//! BCCH-BCH (MIB) and BCCH-DL-SCH (SIB1 / SystemInformation) messages

use crate::cell_group::{DmrsTypeAPosition, ServingCellConfigCommon};
use crate::MessageName;
use serde::{Deserialize, Serialize};

/// BCCH-BCH-Message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BcchBchMsg {
    Mib(Mib),
    MessageClassExtension,
}

/// MIB
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mib {
    /// 6 MSBs of the SFN
    pub system_frame_number: u8,
    pub sub_carrier_spacing_common: ScsCommon,
    pub ssb_subcarrier_offset: u8,
    pub dmrs_type_a_position: DmrsTypeAPosition,
    pub pdcch_config_sib1: PdcchConfigSib1,
    pub cell_barred: bool,
    pub intra_freq_reselection: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScsCommon {
    Scs15or60,
    Scs30or120,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdcchConfigSib1 {
    pub control_resource_set_zero: u8,
    pub search_space_zero: u8,
}

/// BCCH-DL-SCH-Message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BcchDlSchMsg {
    C1(BcchDlSchC1),
    MessageClassExtension,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BcchDlSchC1 {
    SystemInformation(SystemInformation),
    SystemInformationBlockType1(Sib1),
}

/// SIB1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sib1 {
    pub cell_selection_info: Option<CellSelectionInfo>,
    pub cell_access_related_info: CellAccessRelatedInfo,
    pub si_scheduling_info: Option<SiSchedulingInfo>,
    pub serving_cell_config_common: Option<ServingCellConfigCommon>,
    pub ue_timers_and_constants: Option<UeTimersAndConstants>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSelectionInfo {
    pub q_rx_lev_min: i8,
    pub q_qual_min: Option<i8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellAccessRelatedInfo {
    pub plmn_identity_list: Vec<PlmnIdentityInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlmnIdentityInfo {
    pub plmn_identity_list: Vec<PlmnIdentity>,
    pub tracking_area_code: Option<u32>,
    /// 36-bit NR cell identity
    pub cell_identity: u64,
    pub cell_reserved_for_operator_use: bool,
}

/// PLMN-Identity as decimal digits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlmnIdentity {
    pub mcc: Option<[u8; 3]>,
    pub mnc: Vec<u8>,
}

/// UE-TimersAndConstants, values in ms or occurrences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeTimersAndConstants {
    pub t300: u16,
    pub t301: u16,
    pub t310: u16,
    pub n310: u8,
    pub t311: u16,
    pub n311: u8,
    pub t319: u16,
}

/// SI-SchedulingInfo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiSchedulingInfo {
    pub scheduling_info_list: Vec<SchedulingInfo>,
    pub si_window_length: SiWindowLength,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingInfo {
    pub si_broadcast_status: SiBroadcastStatus,
    pub si_periodicity: SiPeriodicity,
    pub sib_mapping_info: Vec<SibTypeInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiBroadcastStatus {
    Broadcasting,
    NotBroadcasting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SibTypeInfo {
    pub sib_type: SibType,
    pub value_tag: Option<u8>,
    pub area_scope: bool,
}

/// SIB type carried in an SI message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SibType {
    SibType2,
    SibType3,
    SibType4,
    SibType5,
    SibType6,
    SibType7,
    SibType8,
    SibType9,
}

impl SibType {
    /// SIB number, e.g. 2 for SIB2
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            2 => Some(SibType::SibType2),
            3 => Some(SibType::SibType3),
            4 => Some(SibType::SibType4),
            5 => Some(SibType::SibType5),
            6 => Some(SibType::SibType6),
            7 => Some(SibType::SibType7),
            8 => Some(SibType::SibType8),
            9 => Some(SibType::SibType9),
            _ => None,
        }
    }

    pub fn to_number(self) -> u8 {
        self.index() as u8 + 2
    }

    /// Position in the SIB table, SIB2 is 0
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiPeriodicity {
    Rf8,
    Rf16,
    Rf32,
    Rf64,
    Rf128,
    Rf256,
    Rf512,
}

impl SiPeriodicity {
    pub fn from_rf(rf: u32) -> Option<Self> {
        match rf {
            8 => Some(SiPeriodicity::Rf8),
            16 => Some(SiPeriodicity::Rf16),
            32 => Some(SiPeriodicity::Rf32),
            64 => Some(SiPeriodicity::Rf64),
            128 => Some(SiPeriodicity::Rf128),
            256 => Some(SiPeriodicity::Rf256),
            512 => Some(SiPeriodicity::Rf512),
            _ => None,
        }
    }

    /// Periodicity in radio frames
    pub fn to_number(self) -> u32 {
        match self {
            SiPeriodicity::Rf8 => 8,
            SiPeriodicity::Rf16 => 16,
            SiPeriodicity::Rf32 => 32,
            SiPeriodicity::Rf64 => 64,
            SiPeriodicity::Rf128 => 128,
            SiPeriodicity::Rf256 => 256,
            SiPeriodicity::Rf512 => 512,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiWindowLength {
    S5,
    S10,
    S20,
    S40,
    S80,
    S160,
    S320,
    S640,
    S1280,
}

impl SiWindowLength {
    pub fn from_slots(slots: u32) -> Option<Self> {
        match slots {
            5 => Some(SiWindowLength::S5),
            10 => Some(SiWindowLength::S10),
            20 => Some(SiWindowLength::S20),
            40 => Some(SiWindowLength::S40),
            80 => Some(SiWindowLength::S80),
            160 => Some(SiWindowLength::S160),
            320 => Some(SiWindowLength::S320),
            640 => Some(SiWindowLength::S640),
            1280 => Some(SiWindowLength::S1280),
            _ => None,
        }
    }

    /// Window length in slots
    pub fn to_number(self) -> u32 {
        match self {
            SiWindowLength::S5 => 5,
            SiWindowLength::S10 => 10,
            SiWindowLength::S20 => 20,
            SiWindowLength::S40 => 40,
            SiWindowLength::S80 => 80,
            SiWindowLength::S160 => 160,
            SiWindowLength::S320 => 320,
            SiWindowLength::S640 => 640,
            SiWindowLength::S1280 => 1280,
        }
    }
}

/// SIB2, cell re-selection common to intra/inter frequency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sib2 {
    pub cell_reselection_info_common: CellReselectionInfoCommon,
    pub cell_reselection_serving_freq_info: CellReselectionServingFreqInfo,
    pub intra_freq_cell_reselection_info: IntraFreqCellReselectionInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellReselectionInfoCommon {
    pub nrof_ss_blocks_to_average: Option<u8>,
    pub q_hyst: QHyst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QHyst {
    Db0,
    Db1,
    Db2,
    Db3,
    Db4,
    Db5,
    Db6,
    Db8,
    Db10,
    Db12,
    Db14,
    Db16,
    Db18,
    Db20,
    Db22,
    Db24,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellReselectionServingFreqInfo {
    pub thresh_serving_low_p: u8,
    pub cell_reselection_priority: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntraFreqCellReselectionInfo {
    pub q_rx_lev_min: i8,
    pub s_intra_search_p: u8,
    pub t_reselection_nr: u8,
}

impl Default for Sib2 {
    fn default() -> Self {
        Self {
            cell_reselection_info_common: CellReselectionInfoCommon {
                nrof_ss_blocks_to_average: None,
                q_hyst: QHyst::Db0,
            },
            cell_reselection_serving_freq_info: CellReselectionServingFreqInfo {
                thresh_serving_low_p: 0,
                cell_reselection_priority: 0,
            },
            intra_freq_cell_reselection_info: IntraFreqCellReselectionInfo {
                q_rx_lev_min: -70,
                s_intra_search_p: 31,
                t_reselection_nr: 1,
            },
        }
    }
}

/// SIB3, intra-frequency neighbour cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sib3 {
    pub intra_freq_neigh_cell_list: Vec<u16>,
    pub intra_freq_black_cell_list: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SibTypeAndInfo {
    Sib2(Sib2),
    Sib3(Sib3),
}

impl SibTypeAndInfo {
    pub fn sib_type(&self) -> SibType {
        match self {
            SibTypeAndInfo::Sib2(_) => SibType::SibType2,
            SibTypeAndInfo::Sib3(_) => SibType::SibType3,
        }
    }
}

/// SystemInformation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInformation {
    pub sib_type_and_info: Vec<SibTypeAndInfo>,
}

impl MessageName for BcchBchMsg {
    fn message_name(&self) -> &'static str {
        match self {
            BcchBchMsg::Mib(_) => "mib",
            BcchBchMsg::MessageClassExtension => "messageClassExtension",
        }
    }
}

impl MessageName for BcchDlSchMsg {
    fn message_name(&self) -> &'static str {
        match self {
            BcchDlSchMsg::C1(BcchDlSchC1::SystemInformation(_)) => "systemInformation",
            BcchDlSchMsg::C1(BcchDlSchC1::SystemInformationBlockType1(_)) => "systemInformationBlockType1",
            BcchDlSchMsg::MessageClassExtension => "messageClassExtension",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sib_type_numbering() {
        assert_eq!(SibType::from_number(2), Some(SibType::SibType2));
        assert_eq!(SibType::SibType2.index(), 0);
        assert_eq!(SibType::SibType3.to_number(), 3);
        assert_eq!(SibType::from_number(1), None);
        assert_eq!(SibType::from_number(10), None);
    }

    #[test]
    fn test_si_enumerations() {
        assert_eq!(SiPeriodicity::from_rf(16).map(SiPeriodicity::to_number), Some(16));
        assert_eq!(SiPeriodicity::from_rf(17), None);
        assert_eq!(SiWindowLength::from_slots(160), Some(SiWindowLength::S160));
        assert_eq!(SiWindowLength::S20.to_number(), 20);
    }
}
