//! NG Application Protocol (NGAP) Link State
//!
//! RRC only needs to know whether the NG-C association towards the AMF
//! (3GPP TS 38.413) is up before admitting new connections.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// NGAP services used by RRC
pub trait NgapInterface: Send + Sync {
    /// Whether the NG Setup with the AMF completed
    fn is_link_up(&self) -> bool;
}

/// NGAP layer configuration
#[derive(Debug, Clone)]
pub struct NgapConfig {
    /// AMF address
    pub amf_address: SocketAddr,
    /// gNB ID
    pub gnb_id: u32,
}

/// Tracks the NG connection state reported by the NGAP task
pub struct NgapLayer {
    config: NgapConfig,
    /// NG connection state
    ng_connected: AtomicBool,
}

impl NgapLayer {
    /// Create a new NGAP layer instance with the link down
    pub fn new(config: NgapConfig) -> Self {
        Self {
            config,
            ng_connected: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &NgapConfig {
        &self.config
    }

    /// Record the outcome of the NG Setup procedure
    pub fn set_connected(&self, connected: bool) {
        let was = self.ng_connected.swap(connected, Ordering::SeqCst);
        if was != connected {
            info!(
                "NG connection to AMF at {} is {} (gnb_id={:#x})",
                self.config.amf_address,
                if connected { "up" } else { "down" },
                self.config.gnb_id
            );
        }
    }
}

impl NgapInterface for NgapLayer {
    fn is_link_up(&self) -> bool {
        self.ng_connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ngap_link_state() {
        let config = NgapConfig {
            amf_address: SocketAddr::from_str("127.0.0.1:38412").unwrap(),
            gnb_id: 0x19B,
        };

        let ngap = NgapLayer::new(config);
        assert!(!ngap.is_link_up());
        ngap.set_connected(true);
        assert!(ngap.is_link_up());
        ngap.set_connected(false);
        assert!(!ngap.is_link_up());
    }
}
