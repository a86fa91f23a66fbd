//! Base station configuration file
//!
//! srsRAN-style layout (`cu_cp`, `cell_cfg`, `rrc`, `log`), read from YAML or TOML
//! depending on the file extension.

use anyhow::{anyhow, bail, Context};
use common::types::{DuplexMode, PlmnId, SubcarrierSpacing};
use common::utils::max_nof_prb;
use layers::ngap::NgapConfig;
use layers::rrc::{RrcCellConfig, RrcNrConfig, RrcTimersConfig, SibSchedInfo};
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GnbConfig {
    /// gNB identifier
    #[serde(default = "default_gnb_id")]
    pub gnb_id: u32,
    /// Number of bits of the NR cell identity taken by the gNB identifier (22..=32)
    #[serde(default = "default_gnb_id_bit_length")]
    pub gnb_id_bit_length: u8,
    /// CU-CP configuration
    pub cu_cp: CuCpConfig,
    /// Cell configuration
    pub cell_cfg: CellConfig,
    #[serde(default)]
    pub rrc: RrcSection,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

fn default_gnb_id() -> u32 {
    411
}

fn default_gnb_id_bit_length() -> u8 {
    32
}

/// CU-CP (Control Plane) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CuCpConfig {
    /// AMF configuration
    pub amf: AmfConfig,
    /// Inactivity timer in seconds
    #[serde(default = "default_inactivity_timer")]
    pub inactivity_timer: u32,
}

fn default_inactivity_timer() -> u32 {
    10
}

/// AMF configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AmfConfig {
    /// AMF address
    pub addr: String,
    /// AMF port
    #[serde(default = "default_amf_port")]
    pub port: u16,
    /// Bind address for gNodeB
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Treat the NG link as established without an AMF (lab setups)
    #[serde(default)]
    pub no_core: bool,
}

fn default_amf_port() -> u16 {
    38412
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

/// Cell configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CellConfig {
    /// Downlink ARFCN
    pub dl_arfcn: u32,
    /// Uplink ARFCN, defaults to the DL ARFCN
    #[serde(default)]
    pub ul_arfcn: Option<u32>,
    /// SSB ARFCN, defaults to the DL ARFCN
    #[serde(default)]
    pub ssb_arfcn: Option<u32>,
    /// Band number
    pub band: u16,
    /// Channel bandwidth in MHz
    #[serde(rename = "channel_bandwidth_MHz")]
    pub channel_bandwidth_mhz: u32,
    /// Common subcarrier spacing in kHz
    pub common_scs: u32,
    #[serde(default = "default_duplex")]
    pub duplex_mode: DuplexMode,
    /// PLMN
    pub plmn: String,
    /// Tracking area code
    pub tac: u32,
    /// Physical Cell ID
    pub pci: u16,
    /// Lower bits of the NR cell identity
    #[serde(default = "default_sector_id")]
    pub sector_id: u32,
    #[serde(default = "default_ssb_period")]
    pub ssb_period_ms: u32,
    /// PDCCH configuration
    #[serde(default)]
    pub pdcch: PdcchConfig,
}

fn default_duplex() -> DuplexMode {
    DuplexMode::Fdd
}

fn default_sector_id() -> u32 {
    1
}

fn default_ssb_period() -> u32 {
    10
}

/// PDCCH configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PdcchConfig {
    /// Common PDCCH configuration
    #[serde(default)]
    pub common: CommonPdcchConfig,
}

/// Common PDCCH configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommonPdcchConfig {
    /// Search space 0 index
    pub ss0_index: u8,
    /// CORESET#0 index
    pub coreset0_index: u8,
}

impl Default for CommonPdcchConfig {
    fn default() -> Self {
        Self { ss0_index: 0, coreset0_index: 6 }
    }
}

/// RRC section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RrcSection {
    /// Standalone operation. NSA cells only broadcast the MIB.
    #[serde(default)]
    pub standalone: bool,
    /// SI message scheduling
    #[serde(default = "default_si_messages")]
    pub si_messages: Vec<SiMessageConfig>,
    /// SI window length in slots
    #[serde(default = "default_si_window")]
    pub si_window_length: u32,
    #[serde(default = "default_msg3_timeout")]
    pub msg3_timeout_ms: u32,
    #[serde(default = "default_msg5_timeout")]
    pub msg5_timeout_ms: u32,
}

impl Default for RrcSection {
    fn default() -> Self {
        Self {
            standalone: false,
            si_messages: default_si_messages(),
            si_window_length: default_si_window(),
            msg3_timeout_ms: default_msg3_timeout(),
            msg5_timeout_ms: default_msg5_timeout(),
        }
    }
}

/// One SI message
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiMessageConfig {
    /// Periodicity in radio frames
    pub period_rf: u32,
    /// SIB numbers carried in the message
    pub sibs: Vec<u8>,
}

fn default_si_messages() -> Vec<SiMessageConfig> {
    vec![SiMessageConfig { period_rf: 16, sibs: vec![2] }]
}

fn default_si_window() -> u32 {
    160
}

fn default_msg3_timeout() -> u32 {
    100
}

fn default_msg5_timeout() -> u32 {
    5000
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Log filename, stdout when absent
    #[serde(default)]
    pub filename: Option<String>,
    /// All layers log level
    #[serde(default = "default_log_level")]
    pub all_level: String,
    /// RRC layer log level
    #[serde(default)]
    pub rrc_level: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { filename: None, all_level: default_log_level(), rrc_level: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LogConfig {
    /// `EnvFilter` directive equivalent to the configured levels
    pub fn filter_directive(&self) -> String {
        match &self.rrc_level {
            Some(rrc) => format!("{},layers::rrc={}", self.all_level, rrc),
            None => self.all_level.clone(),
        }
    }
}

impl GnbConfig {
    /// Load configuration from a YAML or TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }
        .with_context(|| format!("Failed to parse {}", path))
    }

    pub fn from_yaml_str(contents: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// 36-bit NR cell identity
    pub fn nr_cell_id(&self) -> anyhow::Result<u64> {
        if !(22..=32).contains(&self.gnb_id_bit_length) {
            bail!("Invalid gNB ID bit length {}", self.gnb_id_bit_length);
        }
        let sector_bits = 36 - u32::from(self.gnb_id_bit_length);
        if u64::from(self.gnb_id) >= 1u64 << self.gnb_id_bit_length {
            bail!("gNB ID {} does not fit in {} bits", self.gnb_id, self.gnb_id_bit_length);
        }
        if u64::from(self.cell_cfg.sector_id) >= 1u64 << sector_bits {
            bail!("Sector ID {} does not fit in {} bits", self.cell_cfg.sector_id, sector_bits);
        }
        Ok((u64::from(self.gnb_id) << sector_bits) | u64::from(self.cell_cfg.sector_id))
    }

    /// RRC configuration of the single served cell
    pub fn to_rrc_config(&self) -> anyhow::Result<RrcNrConfig> {
        let cell = &self.cell_cfg;
        let scs = SubcarrierSpacing::from_u32(cell.common_scs)
            .ok_or_else(|| anyhow!("Invalid subcarrier spacing: {} kHz", cell.common_scs))?;
        let nof_prb = max_nof_prb(cell.channel_bandwidth_mhz, scs).ok_or_else(|| {
            anyhow!(
                "Bandwidth {} MHz is not supported with {} kHz SCS",
                cell.channel_bandwidth_mhz,
                cell.common_scs
            )
        })?;
        let plmn = PlmnId::from_digits(&cell.plmn).ok_or_else(|| anyhow!("Invalid PLMN format: {}", cell.plmn))?;

        let cfg = RrcNrConfig {
            is_standalone: self.rrc.standalone,
            cell_list: vec![RrcCellConfig {
                pci: cell.pci,
                cell_id: self.nr_cell_id()?,
                dl_arfcn: cell.dl_arfcn,
                ul_arfcn: cell.ul_arfcn,
                ssb_arfcn: cell.ssb_arfcn.unwrap_or(cell.dl_arfcn),
                band: cell.band,
                nof_prb,
                scs,
                duplex_mode: cell.duplex_mode,
                coreset0_idx: cell.pdcch.common.coreset0_index,
                search_space0_idx: cell.pdcch.common.ss0_index,
                ssb_periodicity_ms: cell.ssb_period_ms,
                tac: cell.tac,
                plmn,
            }],
            sib_sched_info: self
                .rrc
                .si_messages
                .iter()
                .map(|si| SibSchedInfo { si_periodicity_rf: si.period_rf, sib_types: si.sibs.clone() })
                .collect(),
            si_window_length_slots: self.rrc.si_window_length,
            timers: RrcTimersConfig {
                msg3_rx_timeout_ms: self.rrc.msg3_timeout_ms,
                msg5_rx_timeout_ms: self.rrc.msg5_timeout_ms,
                ue_inactivity_timeout_ms: self.cu_cp.inactivity_timer.saturating_mul(1000),
            },
            ..Default::default()
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// NGAP link parameters
    pub fn ngap_config(&self) -> anyhow::Result<NgapConfig> {
        let amf = &self.cu_cp.amf;
        let amf_address: SocketAddr = format!("{}:{}", amf.addr, amf.port)
            .parse()
            .with_context(|| format!("Invalid AMF address {}:{}", amf.addr, amf.port))?;
        Ok(NgapConfig { amf_address, gnb_id: self.gnb_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
gnb_id: 411
cu_cp:
  amf:
    addr: 127.0.1.100
    no_core: true
cell_cfg:
  dl_arfcn: 368500
  ssb_arfcn: 368410
  band: 3
  channel_bandwidth_MHz: 10
  common_scs: 15
  plmn: "00101"
  tac: 7
  pci: 1
rrc:
  standalone: true
  si_messages:
    - period_rf: 16
      sibs: [2, 3]
log:
  all_level: warn
  rrc_level: debug
"#;

    #[test]
    fn test_yaml_to_rrc_config() {
        let cfg = GnbConfig::from_yaml_str(YAML).unwrap();
        let rrc = cfg.to_rrc_config().unwrap();

        assert!(rrc.is_standalone);
        let cell = rrc.pscell().unwrap();
        assert_eq!(cell.nof_prb, 52);
        assert_eq!(cell.cell_id, (411 << 4) | 1);
        assert_eq!(cell.ssb_arfcn, 368410);
        assert_eq!(cell.plmn.mnc_digits(), &[0, 1]);
        assert_eq!(rrc.sib_sched_info[0].sib_types, vec![2, 3]);
        assert_eq!(rrc.timers.ue_inactivity_timeout_ms, 10000);
        assert_eq!(cfg.log.filter_directive(), "warn,layers::rrc=debug");
        assert_eq!(cfg.ngap_config().unwrap().amf_address.port(), 38412);
    }

    #[test]
    fn test_toml_matches_yaml() {
        let toml = r#"
[cu_cp.amf]
addr = "127.0.1.100"

[cell_cfg]
dl_arfcn = 368500
band = 3
channel_bandwidth_MHz = 10
common_scs = 15
plmn = "00101"
tac = 7
pci = 1
"#;
        let cfg = GnbConfig::from_toml_str(toml).unwrap();
        let rrc = cfg.to_rrc_config().unwrap();
        assert!(!rrc.is_standalone);
        assert_eq!(rrc.pscell().unwrap().ssb_arfcn, 368500);
        assert_eq!(cfg.log.filter_directive(), "info");
    }

    #[test]
    fn test_invalid_cell_rejected() {
        let mut cfg = GnbConfig::from_yaml_str(YAML).unwrap();
        cfg.cell_cfg.plmn = "0010".to_string();
        assert!(cfg.to_rrc_config().is_err());

        let mut cfg = GnbConfig::from_yaml_str(YAML).unwrap();
        cfg.cell_cfg.channel_bandwidth_mhz = 7;
        assert!(cfg.to_rrc_config().is_err());

        let mut cfg = GnbConfig::from_yaml_str(YAML).unwrap();
        cfg.gnb_id_bit_length = 20;
        assert!(cfg.nr_cell_id().is_err());
    }
}
