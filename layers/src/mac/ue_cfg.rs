//! Scheduler-facing per-UE configuration
//!
//! Mirror of the dedicated RRC configuration in the form the MAC scheduler
//! consumes: active carriers, logical channel directions and the PHY
//! parameters (PDCCH, PDSCH, PUCCH, CSI, SSB, duplex) of the UE.

use common::types::{DuplexMode, SubcarrierSpacing};

/// Number of logical channel identities tracked per UE
pub const MAX_NOF_LCIDS: usize = 32;

/// Direction a logical channel is scheduled in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LcChDirection {
    /// Not scheduled
    #[default]
    Idle,
    Ul,
    Dl,
    Both,
}

/// Scheduler view of one logical channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LcChCfg {
    pub direction: LcChDirection,
    /// Logical channel group used for BSR reporting
    pub group: u8,
}

impl LcChCfg {
    pub fn is_active(&self) -> bool {
        self.direction != LcChDirection::Idle
    }
}

/// Carrier configured for the UE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UeCarrierCfg {
    pub active: bool,
    /// Cell index in the scheduler cell list
    pub cc: u32,
}

/// Configuration of one UE as seen by the scheduler
#[derive(Debug, Clone, PartialEq)]
pub struct SchedUeCfg {
    pub carriers: Vec<UeCarrierCfg>,
    /// Indexed by LCID
    pub ue_bearers: [LcChCfg; MAX_NOF_LCIDS],
    pub phy_cfg: PhyCfgNr,
}

impl Default for SchedUeCfg {
    fn default() -> Self {
        Self {
            carriers: Vec::new(),
            ue_bearers: [LcChCfg::default(); MAX_NOF_LCIDS],
            phy_cfg: PhyCfgNr::default(),
        }
    }
}

impl SchedUeCfg {
    /// LCIDs that are currently scheduled in any direction
    pub fn active_lcids(&self) -> impl Iterator<Item = usize> + '_ {
        self.ue_bearers
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_active())
            .map(|(lcid, _)| lcid)
    }
}

/// CORESET as used by the PDCCH scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoresetNr {
    pub id: u8,
    /// 45-bit bitmap of 6-RB groups
    pub freq_resources: u64,
    /// Duration in symbols
    pub duration: u8,
    pub interleaved: bool,
}

/// Search space kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSpaceKind {
    /// Type0 common search space (SIB1)
    Common0,
    /// Type1 common search space (RAR, Msg4)
    Common1,
    Common3,
    UeSpecific,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSpaceNr {
    pub id: u8,
    pub coreset_id: u8,
    pub kind: SearchSpaceKind,
    /// Candidates for aggregation levels 1, 2, 4, 8 and 16
    pub nof_candidates: [u8; 5],
    pub duration: u16,
}

/// PDCCH configuration of a BWP
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PdcchCfgNr {
    pub coresets: Vec<CoresetNr>,
    pub search_spaces: Vec<SearchSpaceNr>,
    pub ra_search_space: Option<u8>,
}

impl PdcchCfgNr {
    pub fn coreset(&self, id: u8) -> Option<&CoresetNr> {
        self.coresets.iter().find(|c| c.id == id)
    }

    pub fn search_space(&self, id: u8) -> Option<&SearchSpaceNr> {
        self.search_spaces.iter().find(|s| s.id == id)
    }
}

/// PDSCH resource allocation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PdschAllocType {
    Type0,
    #[default]
    Type1,
    DynamicSwitch,
}

/// PDSCH configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdschCfgNr {
    pub dmrs_type2: bool,
    pub dmrs_additional_pos: u8,
    pub alloc_type: PdschAllocType,
    pub rbg_size_cfg_1: bool,
    pub mcs_table_256qam: bool,
    /// SSB index the DMRS is QCL'ed with (typeD)
    pub tci_ssb_idx: Option<u8>,
    pub nof_harq_processes: u8,
    pub wideband_bundling: bool,
}

impl Default for PdschCfgNr {
    fn default() -> Self {
        Self {
            dmrs_type2: false,
            dmrs_additional_pos: 2,
            alloc_type: PdschAllocType::Type1,
            rbg_size_cfg_1: true,
            mcs_table_256qam: false,
            tci_ssb_idx: None,
            nof_harq_processes: 8,
            wideband_bundling: false,
        }
    }
}

/// PUCCH configuration for HARQ-ACK and SR
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PucchCfgNr {
    /// K1 candidates, in slots
    pub dl_data_to_ul_ack: Vec<u8>,
    pub sr_resources: Vec<SrResourceNr>,
    pub max_code_rate: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SrResourceNr {
    pub sr_id: u8,
    pub period: u32,
    pub offset: u32,
    pub pucch_resource: u8,
}

/// Periodic CSI reporting
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CsiCfgNr {
    pub reports: Vec<CsiReportNr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsiReportNr {
    pub id: u8,
    pub period: u32,
    pub offset: u32,
    pub pucch_resource: u8,
}

/// SS/PBCH block configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SsbCfgNr {
    pub periodicity_ms: u32,
    /// Transmitted SSB positions, MSB is SSB index 0
    pub position_in_burst: u64,
    pub scs: SubcarrierSpacing,
}

impl Default for SsbCfgNr {
    fn default() -> Self {
        Self {
            periodicity_ms: 10,
            position_in_burst: 0x80,
            scs: SubcarrierSpacing::Scs15,
        }
    }
}

/// TDD UL/DL pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TddPatternNr {
    pub period_us: u32,
    pub nof_dl_slots: u8,
    pub nof_dl_symbols: u8,
    pub nof_ul_slots: u8,
    pub nof_ul_symbols: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplexCfgNr {
    pub mode: DuplexMode,
    pub tdd: Option<TddPatternNr>,
}

impl Default for DuplexCfgNr {
    fn default() -> Self {
        Self { mode: DuplexMode::Fdd, tdd: None }
    }
}

/// PHY configuration of one UE
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhyCfgNr {
    pub pdcch: PdcchCfgNr,
    pub pdsch: PdschCfgNr,
    pub pucch: PucchCfgNr,
    pub csi: CsiCfgNr,
    pub ssb: SsbCfgNr,
    pub duplex: DuplexCfgNr,
}

impl PhyCfgNr {
    /// Reference configuration for the given duplex mode.
    ///
    /// TDD uses a 10 ms pattern with 6 DL and 4 UL slots.
    pub fn reference(duplex: DuplexMode) -> Self {
        let (dl_data_to_ul_ack, tdd) = match duplex {
            DuplexMode::Fdd => (vec![4], None),
            DuplexMode::Tdd => (
                vec![6, 5, 4, 4, 4, 4],
                Some(TddPatternNr {
                    period_us: 10_000,
                    nof_dl_slots: 6,
                    nof_dl_symbols: 0,
                    nof_ul_slots: 4,
                    nof_ul_symbols: 0,
                }),
            ),
        };

        Self {
            pdcch: PdcchCfgNr::default(),
            pdsch: PdschCfgNr::default(),
            pucch: PucchCfgNr {
                dl_data_to_ul_ack,
                sr_resources: vec![SrResourceNr { sr_id: 0, period: 40, offset: 8, pucch_resource: 2 }],
                max_code_rate: Some(0.25),
            },
            csi: CsiCfgNr {
                reports: vec![CsiReportNr { id: 0, period: 80, offset: 1, pucch_resource: 1 }],
            },
            ssb: SsbCfgNr::default(),
            duplex: DuplexCfgNr { mode: duplex, tdd },
        }
    }
}
