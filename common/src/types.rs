//! Common Types for 5G GNodeB
//! 
//! Defines fundamental types used throughout the protocol stack

use serde::{Deserialize, Serialize};
use num_derive::{FromPrimitive, ToPrimitive};
use std::fmt;

/// Radio Network Temporary Identifier (RNTI)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rnti(pub u16);

impl Rnti {
    /// Sentinel meaning "no session"
    pub const INVALID: Self = Self(0xFFFF);

    /// Create a new RNTI
    pub fn new(value: u16) -> Self {
        Self(value)
    }
    
    /// Get the RNTI value
    pub fn value(&self) -> u16 {
        self.0
    }

    /// Whether this RNTI can identify a live session
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl fmt::Display for Rnti {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Physical Cell Identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pci(pub u16);

impl Pci {
    /// Maximum valid PCI value (0-1007)
    pub const MAX: u16 = 1007;
    
    /// Create a new PCI with validation
    pub fn new(value: u16) -> Option<Self> {
        if value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }
}

/// Subcarrier spacing values in kHz
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive, Serialize, Deserialize)]
pub enum SubcarrierSpacing {
    /// 15 kHz
    Scs15 = 15,
    /// 30 kHz
    Scs30 = 30,
    /// 60 kHz
    Scs60 = 60,
    /// 120 kHz
    Scs120 = 120,
    /// 240 kHz
    Scs240 = 240,
}

impl SubcarrierSpacing {
    /// Spacing in kHz
    pub fn khz(&self) -> u32 {
        *self as u32
    }

    /// Numerology index mu (15 kHz * 2^mu)
    pub fn numerology(&self) -> u8 {
        match self {
            SubcarrierSpacing::Scs15 => 0,
            SubcarrierSpacing::Scs30 => 1,
            SubcarrierSpacing::Scs60 => 2,
            SubcarrierSpacing::Scs120 => 3,
            SubcarrierSpacing::Scs240 => 4,
        }
    }

    /// Number of slots in one 10 ms radio frame
    pub fn slots_per_frame(&self) -> u32 {
        10 << self.numerology()
    }
}

/// Duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplexMode {
    /// Frequency Division Duplex
    Fdd,
    /// Time Division Duplex
    Tdd,
}

/// NR signalling radio bearers, numbered by their logical channel identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive, Serialize, Deserialize)]
pub enum NrSrb {
    /// SRB0, carried on CCCH
    Srb0 = 0,
    /// SRB1
    Srb1 = 1,
    /// SRB2
    Srb2 = 2,
    /// SRB3
    Srb3 = 3,
}

impl NrSrb {
    /// Logical channel identity of this bearer
    pub fn lcid(&self) -> u32 {
        *self as u32
    }

    /// Printable bearer name
    pub fn name(&self) -> &'static str {
        match self {
            NrSrb::Srb0 => "SRB0",
            NrSrb::Srb1 => "SRB1",
            NrSrb::Srb2 => "SRB2",
            NrSrb::Srb3 => "SRB3",
        }
    }
}

/// PLMN Identity (MCC + MNC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlmnId {
    /// Mobile Country Code
    pub mcc: [u8; 3],
    /// Mobile Network Code (2 or 3 digits)
    pub mnc: [u8; 3],
    /// MNC length (2 or 3)
    pub mnc_len: u8,
}

impl PlmnId {
    /// Create a new PLMN ID
    pub fn new(mcc: [u8; 3], mnc: [u8; 3], mnc_len: u8) -> Option<Self> {
        if mnc_len == 2 || mnc_len == 3 {
            Some(Self { mcc, mnc, mnc_len })
        } else {
            None
        }
    }

    /// Parse a digit string such as "00101" or "310260"
    pub fn from_digits(digits: &str) -> Option<Self> {
        if !(5..=6).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let d: Vec<u8> = digits.bytes().map(|b| b - b'0').collect();
        let mut mnc = [0u8; 3];
        mnc[..d.len() - 3].copy_from_slice(&d[3..]);
        Self::new([d[0], d[1], d[2]], mnc, (d.len() - 3) as u8)
    }

    /// MNC digits actually in use
    pub fn mnc_digits(&self) -> &[u8] {
        &self.mnc[..self.mnc_len as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;
    
    #[test]
    fn test_pci_validation() {
        assert!(Pci::new(0).is_some());
        assert!(Pci::new(1007).is_some());
        assert!(Pci::new(1008).is_none());
    }

    #[test]
    fn test_rnti_sentinel_and_display() {
        assert!(!Rnti::INVALID.is_valid());
        assert!(Rnti::new(0x4601).is_valid());
        assert_eq!(Rnti::new(0x4601).to_string(), "0x4601");
    }

    #[test]
    fn test_srb_from_lcid() {
        assert_eq!(NrSrb::from_u32(0), Some(NrSrb::Srb0));
        assert_eq!(NrSrb::from_u32(3).map(|s| s.name()), Some("SRB3"));
        assert_eq!(NrSrb::from_u32(4), None);
    }

    #[test]
    fn test_scs_slots() {
        assert_eq!(SubcarrierSpacing::Scs15.slots_per_frame(), 10);
        assert_eq!(SubcarrierSpacing::Scs30.slots_per_frame(), 20);
    }
    
    #[test]
    fn test_plmn_from_digits() {
        let plmn = PlmnId::from_digits("00101").unwrap();
        assert_eq!(plmn.mcc, [0, 0, 1]);
        assert_eq!(plmn.mnc_digits(), &[0, 1]);

        let plmn = PlmnId::from_digits("310260").unwrap();
        assert_eq!(plmn.mnc_digits(), &[2, 6, 0]);

        assert!(PlmnId::from_digits("0010").is_none());
        assert!(PlmnId::from_digits("00a01").is_none());
    }
}
