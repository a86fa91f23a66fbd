//! RRC configuration
//!
//! Cell list, SIB scheduling and the default timer profile of the NR RRC.

use crate::mac::Coreset0Config;
use crate::LayerError;
use common::types::{DuplexMode, Pci, PlmnId, SubcarrierSpacing};
use nr_asn1 as asn1;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// RRC configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RrcNrConfig {
    /// Standalone (SA) operation. In NSA mode only the MIB is broadcast.
    #[serde(default)]
    pub is_standalone: bool,
    /// Served cells; the first entry is the PSCell
    pub cell_list: Vec<RrcCellConfig>,
    /// One entry per SI message
    #[serde(default = "default_sib_sched_info")]
    pub sib_sched_info: Vec<SibSchedInfo>,
    /// SI window length in slots
    #[serde(default = "default_si_window_length")]
    pub si_window_length_slots: u32,
    #[serde(default)]
    pub timers: RrcTimersConfig,
    /// Wait time signalled in RRCReject, in seconds
    #[serde(default = "default_reject_wait_time")]
    pub reject_wait_time_s: u8,
}

/// Configuration of one NR cell
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RrcCellConfig {
    pub pci: u16,
    /// 36-bit NR cell identity
    pub cell_id: u64,
    pub dl_arfcn: u32,
    /// Defaults to the DL ARFCN (TDD)
    #[serde(default)]
    pub ul_arfcn: Option<u32>,
    pub ssb_arfcn: u32,
    pub band: u16,
    pub nof_prb: u16,
    #[serde(default = "default_scs")]
    pub scs: SubcarrierSpacing,
    #[serde(default = "default_duplex_mode")]
    pub duplex_mode: DuplexMode,
    /// CORESET#0 index (TS 38.213 Table 13-1)
    #[serde(default = "default_coreset0_idx")]
    pub coreset0_idx: u8,
    #[serde(default)]
    pub search_space0_idx: u8,
    #[serde(default = "default_ssb_periodicity")]
    pub ssb_periodicity_ms: u32,
    pub tac: u32,
    pub plmn: PlmnId,
}

/// SI message scheduling entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SibSchedInfo {
    /// Periodicity in radio frames
    pub si_periodicity_rf: u32,
    /// SIB numbers carried in the message (2..=9)
    pub sib_types: Vec<u8>,
}

/// Activity timeouts in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RrcTimersConfig {
    #[serde(default = "default_msg3_rx_timeout")]
    pub msg3_rx_timeout_ms: u32,
    #[serde(default = "default_msg5_rx_timeout")]
    pub msg5_rx_timeout_ms: u32,
    #[serde(default = "default_ue_inactivity_timeout")]
    pub ue_inactivity_timeout_ms: u32,
}

impl Default for RrcTimersConfig {
    fn default() -> Self {
        Self {
            msg3_rx_timeout_ms: default_msg3_rx_timeout(),
            msg5_rx_timeout_ms: default_msg5_rx_timeout(),
            ue_inactivity_timeout_ms: default_ue_inactivity_timeout(),
        }
    }
}

fn default_sib_sched_info() -> Vec<SibSchedInfo> {
    vec![SibSchedInfo { si_periodicity_rf: 16, sib_types: vec![2] }]
}

fn default_si_window_length() -> u32 {
    160
}

fn default_reject_wait_time() -> u8 {
    16 // TS 38.331 RejectWaitTime
}

fn default_scs() -> SubcarrierSpacing {
    SubcarrierSpacing::Scs15
}

fn default_duplex_mode() -> DuplexMode {
    DuplexMode::Fdd
}

fn default_coreset0_idx() -> u8 {
    6
}

fn default_ssb_periodicity() -> u32 {
    10
}

fn default_msg3_rx_timeout() -> u32 {
    100
}

fn default_msg5_rx_timeout() -> u32 {
    5000
}

fn default_ue_inactivity_timeout() -> u32 {
    10000
}

impl Default for RrcCellConfig {
    /// 10 MHz FDD cell in band 3
    fn default() -> Self {
        Self {
            pci: 1,
            cell_id: 0x19B01,
            dl_arfcn: 368500,
            ul_arfcn: None,
            ssb_arfcn: 368410,
            band: 3,
            nof_prb: 52,
            scs: default_scs(),
            duplex_mode: default_duplex_mode(),
            coreset0_idx: default_coreset0_idx(),
            search_space0_idx: 0,
            ssb_periodicity_ms: default_ssb_periodicity(),
            tac: 7,
            plmn: PlmnId { mcc: [0, 0, 1], mnc: [0, 1, 0], mnc_len: 2 },
        }
    }
}

impl Default for RrcNrConfig {
    fn default() -> Self {
        Self {
            is_standalone: false,
            cell_list: vec![RrcCellConfig::default()],
            sib_sched_info: default_sib_sched_info(),
            si_window_length_slots: default_si_window_length(),
            timers: RrcTimersConfig::default(),
            reject_wait_time_s: default_reject_wait_time(),
        }
    }
}

impl RrcCellConfig {
    pub fn ul_arfcn(&self) -> u32 {
        self.ul_arfcn.unwrap_or(self.dl_arfcn)
    }

    pub fn validate(&self) -> Result<(), LayerError> {
        if Pci::new(self.pci).is_none() {
            return Err(LayerError::InvalidConfiguration(format!("Invalid PCI {}", self.pci)));
        }
        if self.cell_id >= 1 << 36 {
            return Err(LayerError::InvalidConfiguration(format!(
                "Cell identity {:#x} exceeds 36 bits",
                self.cell_id
            )));
        }
        if self.nof_prb == 0 || self.nof_prb > 275 {
            return Err(LayerError::InvalidConfiguration(format!(
                "Invalid number of PRBs {}",
                self.nof_prb
            )));
        }
        if !matches!(self.scs, SubcarrierSpacing::Scs15 | SubcarrierSpacing::Scs30) {
            return Err(LayerError::InvalidConfiguration(format!(
                "Unsupported subcarrier spacing {} kHz",
                self.scs.khz()
            )));
        }
        Coreset0Config::from_index(self.coreset0_idx)?;
        if asn1::SsbPeriodicity::from_ms(self.ssb_periodicity_ms).is_none() {
            return Err(LayerError::InvalidConfiguration(format!(
                "Invalid SSB periodicity {} ms",
                self.ssb_periodicity_ms
            )));
        }
        Ok(())
    }
}

impl RrcNrConfig {
    /// Check the configuration before the cell is set up
    pub fn validate(&self) -> Result<(), LayerError> {
        if self.cell_list.is_empty() {
            return Err(LayerError::InvalidConfiguration("No cells configured".to_string()));
        }
        for cell in &self.cell_list {
            cell.validate()?;
        }

        if asn1::SiWindowLength::from_slots(self.si_window_length_slots).is_none() {
            return Err(LayerError::InvalidConfiguration(format!(
                "Invalid SI window length {} slots",
                self.si_window_length_slots
            )));
        }

        let mut seen = HashSet::new();
        for entry in &self.sib_sched_info {
            if asn1::SiPeriodicity::from_rf(entry.si_periodicity_rf).is_none() {
                return Err(LayerError::InvalidConfiguration(format!(
                    "Invalid SI periodicity {} rf",
                    entry.si_periodicity_rf
                )));
            }
            for &n in &entry.sib_types {
                let sib = asn1::SibType::from_number(n).ok_or_else(|| {
                    LayerError::InvalidConfiguration(format!("Unknown SIB type {}", n))
                })?;
                // A SIB can only be carried by one SI message
                if !seen.insert(sib) {
                    return Err(LayerError::InvalidConfiguration(format!(
                        "SIB{} mapped to more than one SI message",
                        n
                    )));
                }
            }
        }
        Ok(())
    }

    /// The primary (and only scheduled) cell
    pub fn pscell(&self) -> Result<&RrcCellConfig, LayerError> {
        self.cell_list
            .first()
            .ok_or_else(|| LayerError::InvalidConfiguration("No cells configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = RrcNrConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.timers.msg3_rx_timeout_ms, 100);
        assert_eq!(cfg.timers.msg5_rx_timeout_ms, 5000);
        assert_eq!(cfg.timers.ue_inactivity_timeout_ms, 10000);
        assert_eq!(cfg.reject_wait_time_s, 16);
    }

    #[test]
    fn test_duplicate_sib_mapping_rejected() {
        let mut cfg = RrcNrConfig::default();
        cfg.sib_sched_info.push(SibSchedInfo { si_periodicity_rf: 32, sib_types: vec![2] });
        assert!(matches!(cfg.validate(), Err(LayerError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_invalid_cell_parameters() {
        let mut cfg = RrcNrConfig::default();
        cfg.cell_list[0].coreset0_idx = 15;
        assert!(cfg.validate().is_err());

        let mut cfg = RrcNrConfig::default();
        cfg.cell_list[0].ssb_periodicity_ms = 7;
        assert!(cfg.validate().is_err());

        let mut cfg = RrcNrConfig::default();
        cfg.cell_list.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "is_standalone": true,
            "cell_list": [{
                "pci": 500, "cell_id": 4097, "dl_arfcn": 368500, "ssb_arfcn": 368410,
                "band": 3, "nof_prb": 52, "tac": 7,
                "plmn": { "mcc": [0, 0, 1], "mnc": [0, 1, 0], "mnc_len": 2 }
            }]
        }"#;
        let cfg: RrcNrConfig = serde_json::from_str(json).unwrap();
        assert!(cfg.is_standalone);
        assert_eq!(cfg.cell_list[0].coreset0_idx, 6);
        assert_eq!(cfg.sib_sched_info, vec![SibSchedInfo { si_periodicity_rf: 16, sib_types: vec![2] }]);
        assert_eq!(cfg.si_window_length_slots, 160);
        assert!(cfg.validate().is_ok());
    }
}
