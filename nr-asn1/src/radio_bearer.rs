//! RadioBearerConfig and the PDCP/security IEs it carries

use serde::{Deserialize, Serialize};

/// RadioBearerConfig
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioBearerConfig {
    pub srb_to_add_mod_list: Vec<SrbToAddMod>,
    pub drb_to_add_mod_list: Vec<DrbToAddMod>,
    pub drb_to_release_list: Vec<u8>,
    pub security_config: Option<SecurityConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrbToAddMod {
    pub srb_identity: u8,
    pub reestablish_pdcp: bool,
    pub pdcp_config: Option<PdcpConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrbToAddMod {
    pub drb_identity: u8,
    pub cn_association: Option<CnAssociation>,
    pub pdcp_config: Option<PdcpConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CnAssociation {
    EpsBearerIdentity(u8),
    SdapConfig { pdu_session: u16 },
}

/// PDCP-Config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdcpConfig {
    pub drb: Option<PdcpDrbConfig>,
    pub t_reordering: Option<TReordering>,
    pub ciphering_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdcpDrbConfig {
    pub discard_timer: Option<DiscardTimer>,
    pub pdcp_sn_size_ul: Option<PdcpSnSize>,
    pub pdcp_sn_size_dl: Option<PdcpSnSize>,
    pub header_compression: HeaderCompression,
    pub status_report_required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscardTimer {
    Ms10,
    Ms20,
    Ms30,
    Ms40,
    Ms50,
    Ms60,
    Ms75,
    Ms100,
    Ms150,
    Ms200,
    Ms250,
    Ms300,
    Ms500,
    Ms750,
    Ms1500,
    Infinity,
}

impl DiscardTimer {
    /// Duration in ms, `None` for infinity
    pub fn to_ms(self) -> Option<u32> {
        Some(match self {
            DiscardTimer::Ms10 => 10,
            DiscardTimer::Ms20 => 20,
            DiscardTimer::Ms30 => 30,
            DiscardTimer::Ms40 => 40,
            DiscardTimer::Ms50 => 50,
            DiscardTimer::Ms60 => 60,
            DiscardTimer::Ms75 => 75,
            DiscardTimer::Ms100 => 100,
            DiscardTimer::Ms150 => 150,
            DiscardTimer::Ms200 => 200,
            DiscardTimer::Ms250 => 250,
            DiscardTimer::Ms300 => 300,
            DiscardTimer::Ms500 => 500,
            DiscardTimer::Ms750 => 750,
            DiscardTimer::Ms1500 => 1500,
            DiscardTimer::Infinity => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PdcpSnSize {
    Len12Bits,
    Len18Bits,
}

impl PdcpSnSize {
    pub fn bits(self) -> u8 {
        match self {
            PdcpSnSize::Len12Bits => 12,
            PdcpSnSize::Len18Bits => 18,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TReordering {
    Ms0,
    Ms1,
    Ms2,
    Ms4,
    Ms5,
    Ms8,
    Ms10,
    Ms20,
    Ms40,
    Ms80,
    Ms100,
    Ms200,
    Ms500,
    Ms1000,
    Ms3000,
}

impl TReordering {
    pub fn to_ms(self) -> u32 {
        match self {
            TReordering::Ms0 => 0,
            TReordering::Ms1 => 1,
            TReordering::Ms2 => 2,
            TReordering::Ms4 => 4,
            TReordering::Ms5 => 5,
            TReordering::Ms8 => 8,
            TReordering::Ms10 => 10,
            TReordering::Ms20 => 20,
            TReordering::Ms40 => 40,
            TReordering::Ms80 => 80,
            TReordering::Ms100 => 100,
            TReordering::Ms200 => 200,
            TReordering::Ms500 => 500,
            TReordering::Ms1000 => 1000,
            TReordering::Ms3000 => 3000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderCompression {
    NotUsed,
    Rohc { max_cid: u16 },
}

/// SecurityConfig
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub security_algorithm_config: Option<SecurityAlgorithmConfig>,
    pub key_to_use: Option<KeyToUse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityAlgorithmConfig {
    pub ciphering_algorithm: CipheringAlgorithm,
    pub integrity_prot_algorithm: Option<IntegrityProtAlgorithm>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CipheringAlgorithm {
    Nea0,
    Nea1,
    Nea2,
    Nea3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrityProtAlgorithm {
    Nia0,
    Nia1,
    Nia2,
    Nia3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyToUse {
    Master,
    Secondary,
}
