//! Recording collaborators for the RRC integration tests
//!
//! Every mock appends to one shared call log so tests can check the order in
//! which the RRC drove the different layers.

#![allow(dead_code)]

use bytes::Bytes;
use common::types::Rnti;
use layers::eutra::{EutraInterface, SgnbAdditionAckParams};
use layers::mac::{MacInterface, SchedCellCfg, SchedUeCfg};
use layers::ngap::NgapInterface;
use layers::pdcp::{PdcpConfig, PdcpInterface};
use layers::rlc::{RlcConfig, RlcInterface};
use layers::rrc::{RrcCollaborators, RrcNr, RrcNrConfig};
use layers::LayerError;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

/// First RNTI handed out by the mock scheduler
pub const FIRST_RNTI: u16 = 0x4601;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    MacReserve(Rnti),
    MacApplyConfig(Rnti, SchedUeCfg),
    MacRemove(Rnti),
    MacCellConfig(Vec<SchedCellCfg>),
    RlcAddSession(Rnti),
    RlcRemoveSession(Rnti),
    RlcAddBearer(Rnti, u32, RlcConfig),
    RlcWriteSdu(Rnti, u32, Bytes),
    PdcpAddSession(Rnti),
    PdcpRemoveSession(Rnti),
    PdcpAddBearer(Rnti, u32, PdcpConfig),
    PdcpWriteSdu(Rnti, u32, Bytes),
    EutraAdditionAck(Rnti, SgnbAdditionAckParams),
    EutraAdditionReject(Rnti),
    EutraReleaseAck(Rnti),
    EutraInactivityNotice(Rnti),
    EutraAdditionComplete(Rnti, Rnti),
    EutraSetActivity(Rnti),
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

fn record(log: &CallLog, call: Call) {
    log.lock().unwrap().push(call);
}

pub struct MockMac {
    log: CallLog,
    next_rnti: AtomicU16,
    pub fail_reserve: AtomicBool,
}

impl MacInterface for MockMac {
    fn reserve_identifier(&self, _cc: u32, _cfg: &SchedUeCfg) -> Rnti {
        if self.fail_reserve.load(Ordering::SeqCst) {
            return Rnti::INVALID;
        }
        let rnti = Rnti(self.next_rnti.fetch_add(1, Ordering::SeqCst));
        record(&self.log, Call::MacReserve(rnti));
        rnti
    }

    fn apply_config(&self, rnti: Rnti, cfg: &SchedUeCfg) -> Result<(), LayerError> {
        record(&self.log, Call::MacApplyConfig(rnti, cfg.clone()));
        Ok(())
    }

    fn remove_session(&self, rnti: Rnti) {
        record(&self.log, Call::MacRemove(rnti));
    }

    fn cell_config(&self, cells: &[SchedCellCfg]) -> Result<(), LayerError> {
        record(&self.log, Call::MacCellConfig(cells.to_vec()));
        Ok(())
    }
}

pub struct MockRlc {
    log: CallLog,
}

impl RlcInterface for MockRlc {
    fn add_session(&self, rnti: Rnti) {
        record(&self.log, Call::RlcAddSession(rnti));
    }

    fn remove_session(&self, rnti: Rnti) {
        record(&self.log, Call::RlcRemoveSession(rnti));
    }

    fn add_bearer(&self, rnti: Rnti, lcid: u32, cfg: &RlcConfig) -> Result<(), LayerError> {
        cfg.validate()?;
        record(&self.log, Call::RlcAddBearer(rnti, lcid, cfg.clone()));
        Ok(())
    }

    fn write_sdu(&self, rnti: Rnti, lcid: u32, sdu: Bytes) {
        record(&self.log, Call::RlcWriteSdu(rnti, lcid, sdu));
    }
}

pub struct MockPdcp {
    log: CallLog,
}

impl PdcpInterface for MockPdcp {
    fn add_session(&self, rnti: Rnti) {
        record(&self.log, Call::PdcpAddSession(rnti));
    }

    fn remove_session(&self, rnti: Rnti) {
        record(&self.log, Call::PdcpRemoveSession(rnti));
    }

    fn add_bearer(&self, rnti: Rnti, lcid: u32, cfg: &PdcpConfig) -> Result<(), LayerError> {
        cfg.validate()?;
        record(&self.log, Call::PdcpAddBearer(rnti, lcid, cfg.clone()));
        Ok(())
    }

    fn write_sdu(&self, rnti: Rnti, lcid: u32, sdu: Bytes) {
        record(&self.log, Call::PdcpWriteSdu(rnti, lcid, sdu));
    }
}

pub struct MockNgap {
    pub link_up: AtomicBool,
}

impl NgapInterface for MockNgap {
    fn is_link_up(&self) -> bool {
        self.link_up.load(Ordering::SeqCst)
    }
}

pub struct MockEutra {
    log: CallLog,
}

impl EutraInterface for MockEutra {
    fn addition_ack(&self, eutra_rnti: Rnti, params: SgnbAdditionAckParams) {
        record(&self.log, Call::EutraAdditionAck(eutra_rnti, params));
    }

    fn addition_reject(&self, eutra_rnti: Rnti) {
        record(&self.log, Call::EutraAdditionReject(eutra_rnti));
    }

    fn release_ack(&self, eutra_rnti: Rnti) {
        record(&self.log, Call::EutraReleaseAck(eutra_rnti));
    }

    fn inactivity_notice(&self, eutra_rnti: Rnti) {
        record(&self.log, Call::EutraInactivityNotice(eutra_rnti));
    }

    fn addition_complete(&self, eutra_rnti: Rnti, nr_rnti: Rnti) {
        record(&self.log, Call::EutraAdditionComplete(eutra_rnti, nr_rnti));
    }

    fn set_activity(&self, eutra_rnti: Rnti) {
        record(&self.log, Call::EutraSetActivity(eutra_rnti));
    }
}

/// An RRC wired to recording collaborators
pub struct TestStack {
    pub rrc: RrcNr,
    pub log: CallLog,
    pub mac: Arc<MockMac>,
    pub ngap: Arc<MockNgap>,
}

impl TestStack {
    /// Build and initialize an RRC. The NG link starts up.
    pub fn new(cfg: RrcNrConfig) -> Self {
        let mut stack = Self::uninitialized(cfg);
        stack.rrc.init().expect("RRC init");
        stack
    }

    /// Build an RRC without setting up the cell
    pub fn uninitialized(cfg: RrcNrConfig) -> Self {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let mac = Arc::new(MockMac {
            log: log.clone(),
            next_rnti: AtomicU16::new(FIRST_RNTI),
            fail_reserve: AtomicBool::new(false),
        });
        let ngap = Arc::new(MockNgap { link_up: AtomicBool::new(true) });
        let ifaces = RrcCollaborators {
            mac: mac.clone(),
            rlc: Arc::new(MockRlc { log: log.clone() }),
            pdcp: Arc::new(MockPdcp { log: log.clone() }),
            ngap: ngap.clone(),
            eutra: Arc::new(MockEutra { log: log.clone() }),
        };

        Self { rrc: RrcNr::new(cfg, ifaces), log, mac, ngap }
    }

    pub fn nsa() -> Self {
        Self::new(RrcNrConfig::default())
    }

    pub fn sa() -> Self {
        Self::new(RrcNrConfig { is_standalone: true, ..Default::default() })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn set_link_up(&self, up: bool) {
        self.ngap.link_up.store(up, Ordering::SeqCst);
    }

    pub fn set_reserve_failure(&self, fail: bool) {
        self.mac.fail_reserve.store(fail, Ordering::SeqCst);
    }

    pub fn tick_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.rrc.tick();
        }
    }

    /// Position of the first call matching `pred`
    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(pred)
    }
}

/// Teardown calls issued for `rnti`, in order
pub fn teardown_calls(calls: &[Call], rnti: Rnti) -> Vec<&'static str> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::MacRemove(r) if *r == rnti => Some("mac"),
            Call::RlcRemoveSession(r) if *r == rnti => Some("rlc"),
            Call::PdcpRemoveSession(r) if *r == rnti => Some("pdcp"),
            _ => None,
        })
        .collect()
}

/// Enable log output for a test run with RUST_LOG set
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
