//! Common Utilities
//! 
//! Provides utility functions used across the GNodeB implementation

use crate::types::{NrSrb, SubcarrierSpacing};
use num_traits::FromPrimitive;
use tracing::trace;

/// Convert a byte slice to hex string for debugging
pub fn bytes_to_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Radio bearer name for a logical channel identity
pub fn rb_name(lcid: u32) -> &'static str {
    match NrSrb::from_u32(lcid) {
        Some(srb) => srb.name(),
        None if lcid < 32 => "DRB",
        None => "invalid",
    }
}

/// Maximum transmission bandwidth in resource blocks for FR1 (TS 38.101-1 Table 5.3.2-1)
pub fn max_nof_prb(bandwidth_mhz: u32, scs: SubcarrierSpacing) -> Option<u16> {
    let nrb = match (scs, bandwidth_mhz) {
        (SubcarrierSpacing::Scs15, 5) => 25,
        (SubcarrierSpacing::Scs15, 10) => 52,
        (SubcarrierSpacing::Scs15, 15) => 79,
        (SubcarrierSpacing::Scs15, 20) => 106,
        (SubcarrierSpacing::Scs15, 25) => 133,
        (SubcarrierSpacing::Scs15, 30) => 160,
        (SubcarrierSpacing::Scs15, 40) => 216,
        (SubcarrierSpacing::Scs15, 50) => 270,
        (SubcarrierSpacing::Scs30, 5) => 11,
        (SubcarrierSpacing::Scs30, 10) => 24,
        (SubcarrierSpacing::Scs30, 15) => 38,
        (SubcarrierSpacing::Scs30, 20) => 51,
        (SubcarrierSpacing::Scs30, 25) => 65,
        (SubcarrierSpacing::Scs30, 30) => 78,
        (SubcarrierSpacing::Scs30, 40) => 106,
        (SubcarrierSpacing::Scs30, 50) => 133,
        (SubcarrierSpacing::Scs30, 60) => 162,
        (SubcarrierSpacing::Scs30, 80) => 217,
        (SubcarrierSpacing::Scs30, 100) => 273,
        _ => return None,
    };

    trace!("{} MHz at {} kHz SCS spans {} RBs", bandwidth_mhz, scs.khz(), nrb);

    Some(nrb)
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_bytes_to_hex() {
        let data = vec![0x12, 0x34, 0xAB, 0xCD];
        assert_eq!(bytes_to_hex(&data), "12 34 ab cd");
    }

    #[test]
    fn test_rb_name() {
        assert_eq!(rb_name(0), "SRB0");
        assert_eq!(rb_name(1), "SRB1");
        assert_eq!(rb_name(4), "DRB");
        assert_eq!(rb_name(64), "invalid");
    }
    
    #[test]
    fn test_max_nof_prb() {
        assert_eq!(max_nof_prb(10, SubcarrierSpacing::Scs15), Some(52));
        assert_eq!(max_nof_prb(20, SubcarrierSpacing::Scs30), Some(51));
        assert_eq!(max_nof_prb(100, SubcarrierSpacing::Scs15), None);
    }
}
