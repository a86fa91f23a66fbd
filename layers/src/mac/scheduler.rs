//! MAC Scheduler Cell Configuration
//!
//! Cell-wide configuration handed to the scheduler by RRC: CORESET#0 layout,
//! the BWP PDCCH/PDSCH parameters, SSB and duplex setup and the broadcast
//! schedule of SIB1 and the SI messages.

use crate::mac::ue_cfg::{DuplexCfgNr, PdcchCfgNr, PdschCfgNr, SsbCfgNr};
use crate::LayerError;
use common::types::{Pci, SubcarrierSpacing};

/// CORESET#0 configuration based on 3GPP TS 38.213
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coreset0Config {
    /// Number of resource blocks
    pub num_rbs: u32,
    /// Number of symbols
    pub num_symbols: u32,
    /// RB offset from point A
    pub rb_offset: u32,
}

impl Coreset0Config {
    /// Get CORESET#0 configuration from table index
    /// Based on 3GPP TS 38.213 Table 13-1 for {15, 15} kHz SCS
    pub fn from_index(index: u8) -> Result<Self, LayerError> {
        let config = match index {
            0 => Self { num_rbs: 24, num_symbols: 2, rb_offset: 0 },
            1 => Self { num_rbs: 24, num_symbols: 2, rb_offset: 2 },
            2 => Self { num_rbs: 24, num_symbols: 2, rb_offset: 4 },
            3 => Self { num_rbs: 24, num_symbols: 3, rb_offset: 0 },
            4 => Self { num_rbs: 24, num_symbols: 3, rb_offset: 2 },
            5 => Self { num_rbs: 24, num_symbols: 3, rb_offset: 4 },
            6 => Self { num_rbs: 48, num_symbols: 1, rb_offset: 12 },
            7 => Self { num_rbs: 48, num_symbols: 1, rb_offset: 16 },
            8 => Self { num_rbs: 48, num_symbols: 2, rb_offset: 12 },
            9 => Self { num_rbs: 48, num_symbols: 2, rb_offset: 16 },
            10 => Self { num_rbs: 48, num_symbols: 3, rb_offset: 12 },
            11 => Self { num_rbs: 48, num_symbols: 3, rb_offset: 16 },
            12 => Self { num_rbs: 96, num_symbols: 1, rb_offset: 38 },
            13 => Self { num_rbs: 96, num_symbols: 2, rb_offset: 38 },
            14 => Self { num_rbs: 96, num_symbols: 3, rb_offset: 38 },
            _ => return Err(LayerError::InvalidConfiguration(
                format!("Invalid CORESET#0 index: {}", index)
            )),
        };
        Ok(config)
    }

    /// 45-bit frequency domain bitmap covering the CORESET, one bit per 6 RBs
    pub fn freq_resources(&self) -> u64 {
        let nof_groups = (self.num_rbs / 6).min(45);
        let mask = (1u64 << nof_groups) - 1;
        mask << (45 - nof_groups)
    }
}

/// Scheduling of one broadcast message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SibCfg {
    /// Packed size in bytes
    pub len: usize,
    /// Periodicity in radio frames
    pub period_rf: u32,
    /// SI window length in slots
    pub si_window_slots: u32,
}

impl SibCfg {
    /// Whether a new SI period starts in this system frame
    pub fn is_period_start(&self, sfn: u32) -> bool {
        self.period_rf > 0 && sfn % self.period_rf == 0
    }
}

/// BWP parameters used by the scheduler
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchedBwpCfg {
    pub pdcch: PdcchCfgNr,
    pub pdsch: PdschCfgNr,
}

/// Cell configuration handed to the scheduler
#[derive(Debug, Clone, PartialEq)]
pub struct SchedCellCfg {
    pub pci: Pci,
    pub dl_arfcn: u32,
    pub nof_prb: u16,
    pub scs: SubcarrierSpacing,
    pub bwps: Vec<SchedBwpCfg>,
    pub ssb: SsbCfgNr,
    pub duplex: DuplexCfgNr,
    /// SIB1 first, followed by the SI messages in scheduling order
    pub sibs: Vec<SibCfg>,
}

impl SchedCellCfg {
    /// Broadcast messages whose period starts in frame `sfn`
    pub fn sibs_due(&self, sfn: u32) -> impl Iterator<Item = usize> + '_ {
        self.sibs
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.is_period_start(sfn))
            .map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coreset0_config() {
        // Test valid index
        let config = Coreset0Config::from_index(1).unwrap();
        assert_eq!(config.num_rbs, 24);
        assert_eq!(config.num_symbols, 2);
        assert_eq!(config.rb_offset, 2);

        // Test invalid index
        assert!(Coreset0Config::from_index(20).is_err());
    }

    #[test]
    fn test_coreset0_freq_resources() {
        let config = Coreset0Config::from_index(6).unwrap();
        // 48 RBs -> 8 groups, MSB aligned in 45 bits
        assert_eq!(config.freq_resources(), 0xFFu64 << 37);
    }

    #[test]
    fn test_sibs_due() {
        let cell = SchedCellCfg {
            pci: Pci(1),
            dl_arfcn: 368500,
            nof_prb: 52,
            scs: SubcarrierSpacing::Scs15,
            bwps: vec![SchedBwpCfg::default()],
            ssb: SsbCfgNr::default(),
            duplex: DuplexCfgNr::default(),
            sibs: vec![
                SibCfg { len: 80, period_rf: 16, si_window_slots: 160 },
                SibCfg { len: 20, period_rf: 32, si_window_slots: 20 },
            ],
        };
        assert_eq!(cell.sibs_due(0).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(cell.sibs_due(16).collect::<Vec<_>>(), vec![0]);
        assert_eq!(cell.sibs_due(3).count(), 0);
    }
}
