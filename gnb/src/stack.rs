//! Protocol stack assembly
//!
//! The RRC runs on top of collaborators that only log what they are asked to
//! do. The scheduler stand-in hands out C-RNTIs so SgNB additions can be
//! served without a radio.

use bytes::Bytes;
use common::types::Rnti;
use layers::eutra::{EutraInterface, SgnbAdditionAckParams};
use layers::mac::{MacInterface, SchedCellCfg, SchedUeCfg};
use layers::ngap::NgapLayer;
use layers::pdcp::{PdcpConfig, PdcpInterface};
use layers::rlc::{RlcConfig, RlcInterface};
use layers::rrc::{RrcCollaborators, RrcNr, RrcNrConfig};
use layers::LayerError;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{debug, error, info};

/// First C-RNTI handed out
pub const FIRST_RNTI: u16 = 0x4601;
/// Last C-RNTI value (TS 38.321 Table 7.1-1)
const LAST_RNTI: u16 = 0xFFEF;

/// Scheduler stand-in
pub struct LoggingMac {
    next_rnti: AtomicU16,
}

impl LoggingMac {
    pub fn new() -> Self {
        Self { next_rnti: AtomicU16::new(FIRST_RNTI) }
    }
}

impl Default for LoggingMac {
    fn default() -> Self {
        Self::new()
    }
}

impl MacInterface for LoggingMac {
    fn reserve_identifier(&self, cc: u32, _cfg: &SchedUeCfg) -> Rnti {
        match self
            .next_rnti
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |r| (r <= LAST_RNTI).then_some(r + 1))
        {
            Ok(rnti) => {
                debug!("MAC: reserved rnti=0x{:x} on cc={}", rnti, cc);
                Rnti(rnti)
            }
            Err(_) => {
                error!("MAC: C-RNTI space exhausted");
                Rnti::INVALID
            }
        }
    }

    fn apply_config(&self, rnti: Rnti, cfg: &SchedUeCfg) -> Result<(), LayerError> {
        let lcids: Vec<usize> = cfg.active_lcids().collect();
        debug!("MAC: rnti={} configured, active LCIDs {:?}", rnti, lcids);
        Ok(())
    }

    fn remove_session(&self, rnti: Rnti) {
        debug!("MAC: rnti={} removed", rnti);
    }

    fn cell_config(&self, cells: &[SchedCellCfg]) -> Result<(), LayerError> {
        for cell in cells {
            info!(
                "MAC: cell pci={} dl_arfcn={} nof_prb={} with {} broadcast message(s)",
                cell.pci.0,
                cell.dl_arfcn,
                cell.nof_prb,
                cell.sibs.len()
            );
        }
        Ok(())
    }
}

/// RLC stand-in
pub struct LoggingRlc;

impl RlcInterface for LoggingRlc {
    fn add_session(&self, rnti: Rnti) {
        debug!("RLC: rnti={} added", rnti);
    }

    fn remove_session(&self, rnti: Rnti) {
        debug!("RLC: rnti={} removed", rnti);
    }

    fn add_bearer(&self, rnti: Rnti, lcid: u32, cfg: &RlcConfig) -> Result<(), LayerError> {
        cfg.validate()?;
        debug!("RLC: rnti={} lcid={} {:?}", rnti, lcid, cfg.mode);
        Ok(())
    }

    fn write_sdu(&self, rnti: Rnti, lcid: u32, sdu: Bytes) {
        debug!("RLC: rnti={} lcid={} Tx SDU ({} B)", rnti, lcid, sdu.len());
    }
}

/// PDCP stand-in
pub struct LoggingPdcp;

impl PdcpInterface for LoggingPdcp {
    fn add_session(&self, rnti: Rnti) {
        debug!("PDCP: rnti={} added", rnti);
    }

    fn remove_session(&self, rnti: Rnti) {
        debug!("PDCP: rnti={} removed", rnti);
    }

    fn add_bearer(&self, rnti: Rnti, lcid: u32, cfg: &PdcpConfig) -> Result<(), LayerError> {
        cfg.validate()?;
        debug!("PDCP: rnti={} lcid={} {:?} SN={} bits", rnti, lcid, cfg.rb_type, cfg.sn_size);
        Ok(())
    }

    fn write_sdu(&self, rnti: Rnti, lcid: u32, sdu: Bytes) {
        debug!("PDCP: rnti={} lcid={} Tx SDU ({} B)", rnti, lcid, sdu.len());
    }
}

/// LTE RRC stand-in
pub struct LoggingEutra;

impl EutraInterface for LoggingEutra {
    fn addition_ack(&self, eutra_rnti: Rnti, params: SgnbAdditionAckParams) {
        info!(
            "EUTRA: SgNB addition ack for rnti={} (nr rnti={}, SCG {} B, RB config {} B)",
            eutra_rnti,
            params.nr_rnti,
            params.nr_secondary_cell_group_cfg.len(),
            params.nr_radio_bearer_cfg.len()
        );
    }

    fn addition_reject(&self, eutra_rnti: Rnti) {
        info!("EUTRA: SgNB addition reject for rnti={}", eutra_rnti);
    }

    fn release_ack(&self, eutra_rnti: Rnti) {
        info!("EUTRA: SgNB release ack for rnti={}", eutra_rnti);
    }

    fn inactivity_notice(&self, eutra_rnti: Rnti) {
        info!("EUTRA: inactivity of rnti={}", eutra_rnti);
    }

    fn addition_complete(&self, eutra_rnti: Rnti, nr_rnti: Rnti) {
        info!("EUTRA: SgNB addition complete for rnti={} (nr rnti={})", eutra_rnti, nr_rnti);
    }

    fn set_activity(&self, eutra_rnti: Rnti) {
        debug!("EUTRA: activity of rnti={}", eutra_rnti);
    }
}

/// Build and initialize the RRC on top of the logging collaborators
pub fn build_rrc(cfg: RrcNrConfig, ngap: Arc<NgapLayer>) -> Result<RrcNr, LayerError> {
    let ifaces = RrcCollaborators {
        mac: Arc::new(LoggingMac::new()),
        rlc: Arc::new(LoggingRlc),
        pdcp: Arc::new(LoggingPdcp),
        ngap,
        eutra: Arc::new(LoggingEutra),
    };
    let mut rrc = RrcNr::new(cfg, ifaces);
    rrc.init()?;
    Ok(rrc)
}

/// Advance the RRC timers every millisecond until `running` is cleared
pub async fn run_timers(rrc: Arc<Mutex<RrcNr>>, running: Arc<AtomicBool>) {
    let mut interval = tokio::time::interval(Duration::from_millis(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

    while running.load(Ordering::SeqCst) {
        interval.tick().await;
        rrc.lock().await.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layers::ngap::NgapConfig;
    use layers::rrc::RrcMacInterface;

    fn ngap() -> Arc<NgapLayer> {
        Arc::new(NgapLayer::new(NgapConfig {
            amf_address: "127.0.0.1:38412".parse().unwrap(),
            gnb_id: 411,
        }))
    }

    #[test]
    fn test_rnti_allocation() {
        let mac = LoggingMac::new();
        let cfg = SchedUeCfg::default();
        assert_eq!(mac.reserve_identifier(0, &cfg), Rnti(FIRST_RNTI));
        assert_eq!(mac.reserve_identifier(0, &cfg), Rnti(FIRST_RNTI + 1));

        mac.next_rnti.store(LAST_RNTI, Ordering::SeqCst);
        assert_eq!(mac.reserve_identifier(0, &cfg), Rnti(LAST_RNTI));
        assert_eq!(mac.reserve_identifier(0, &cfg), Rnti::INVALID);
    }

    #[tokio::test]
    async fn test_timer_task_expires_sessions() {
        let rrc = build_rrc(RrcNrConfig::default(), ngap()).unwrap();
        let rrc = Arc::new(Mutex::new(rrc));
        rrc.lock().await.create_session(Rnti(FIRST_RNTI), &SchedUeCfg::default()).unwrap();

        let running = Arc::new(AtomicBool::new(true));
        let handle = tokio::spawn(run_timers(rrc.clone(), running.clone()));

        tokio::time::sleep(Duration::from_millis(500)).await;
        running.store(false, Ordering::SeqCst);
        handle.await.unwrap();

        // The Msg3 deadline (100 ms) passed without an RRCSetupRequest
        assert_eq!(rrc.lock().await.nof_users(), 0);
    }
}
