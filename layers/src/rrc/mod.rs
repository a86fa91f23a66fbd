//! NR Radio Resource Control (RRC)
//!
//! Control plane of the NR cell (3GPP TS 38.331): broadcast of MIB/SIBs, SA
//! connection establishment, EN-DC secondary node addition and the lifecycle
//! of the per-UE contexts.
//!
//! The engine is single threaded. Every entry point runs to completion and
//! anything that would destroy the context currently being handled is queued
//! as a [`RrcTask`] and only executed by [`RrcNr::run_deferred_tasks`].

pub mod cell;
pub mod cell_group;
pub mod config;
pub mod interfaces;
pub mod phy_cfg;
pub mod ue;

pub use cell::CellContext;
pub use config::{RrcCellConfig, RrcNrConfig, RrcTimersConfig, SibSchedInfo};
pub use interfaces::{RrcEndcInterface, RrcMacInterface, RrcPdcpInterface};
pub use ue::{ActivityTimeout, RrcState, UeContext, UeServices};

use crate::eutra::{EutraInterface, SgnbAdditionReqParams};
use crate::mac::{LcChCfg, LcChDirection, MacInterface, PhyCfgNr, SchedUeCfg, UeCarrierCfg};
use crate::ngap::NgapInterface;
use crate::pdcp::PdcpInterface;
use crate::rlc::RlcInterface;
use crate::LayerError;
use bytes::Bytes;
use common::task_sched::TaskScheduler;
use common::types::{NrSrb, Rnti};
use common::utils::{bytes_to_hex, rb_name};
use nr_asn1 as asn1;
use nr_asn1::MessageName;
use num_traits::FromPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn, Level};

/// Work queued on the RRC task scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RrcTask {
    /// Activity timer of `rnti` expired. `kind` is an [`ActivityTimeout`] discriminant.
    ActivityTimeout { rnti: Rnti, kind: u8 },
    /// Tear down the session of the given RNTI
    RemoveUser(Rnti),
}

/// Layers the RRC drives
#[derive(Clone)]
pub struct RrcCollaborators {
    pub mac: Arc<dyn MacInterface>,
    pub rlc: Arc<dyn RlcInterface>,
    pub pdcp: Arc<dyn PdcpInterface>,
    pub ngap: Arc<dyn NgapInterface>,
    pub eutra: Arc<dyn EutraInterface>,
}

impl fmt::Debug for RrcCollaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RrcCollaborators").finish_non_exhaustive()
    }
}

/// Per-UE metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RrcUeMetrics {
    pub rnti: Rnti,
    pub state: RrcState,
    pub endc: bool,
}

/// Direction of a logged RRC message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rx,
    Tx,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Rx => write!(f, "Rx"),
            Direction::Tx => write!(f, "Tx"),
        }
    }
}

/// Log an RRC message or container. The content is dumped as JSON at debug level.
pub(crate) fn log_rrc_message<T: Serialize>(source: &str, dir: Direction, name: &str, len: usize, msg: &T) {
    info!("{} - {} {} ({} B)", source, dir, name, len);
    if tracing::enabled!(Level::DEBUG) {
        match serde_json::to_string(msg) {
            Ok(json) => debug!("Content:\n{}", json),
            Err(e) => debug!("Content could not be rendered: {}", e),
        }
    }
}

fn log_rx_pdu_fail(rnti: Rnti, lcid: u32, pdu: &[u8], cause: &str, log_hex: bool) {
    if log_hex {
        error!(
            "Rx {} PDU, rnti={} - Discarding. Cause: {}\n{}",
            rb_name(lcid),
            rnti,
            cause,
            bytes_to_hex(pdu)
        );
    } else {
        error!("Rx {} PDU, rnti={} - Discarding. Cause: {}", rb_name(lcid), rnti, cause);
    }
}

/// NR RRC
pub struct RrcNr {
    cfg: RrcNrConfig,
    ifaces: RrcCollaborators,
    task_sched: TaskScheduler<RrcTask>,
    cell: Option<CellContext>,
    users: BTreeMap<Rnti, UeContext>,
    running: bool,
}

impl RrcNr {
    pub fn new(cfg: RrcNrConfig, ifaces: RrcCollaborators) -> Self {
        Self {
            cfg,
            ifaces,
            task_sched: TaskScheduler::new(),
            cell: None,
            users: BTreeMap::new(),
            running: false,
        }
    }

    /// Build the cell context, pack the broadcast messages and configure the MAC
    pub fn init(&mut self) -> Result<(), LayerError> {
        self.cfg.validate()?;

        let cell = CellContext::new(&self.cfg)?;
        let sched_cell = cell.sched_cell_cfg(&self.cfg)?;
        self.ifaces.mac.cell_config(&[sched_cell])?;

        info!(
            "NR RRC initialized: pci={} mode={} SI messages={}",
            self.cfg.pscell()?.pci,
            if self.cfg.is_standalone { "SA" } else { "NSA" },
            cell.sib_buffer.len().saturating_sub(1)
        );
        self.cell = Some(cell);
        self.running = true;
        Ok(())
    }

    /// Remove every session
    pub fn stop(&mut self) {
        let rntis: Vec<Rnti> = self.users.keys().copied().collect();
        for rnti in rntis {
            let _ = self.rem_user(rnti);
        }
        self.running = false;
        info!("NR RRC stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &RrcNrConfig {
        &self.cfg
    }

    pub fn cell(&self) -> Option<&CellContext> {
        self.cell.as_ref()
    }

    pub fn user(&self, rnti: Rnti) -> Option<&UeContext> {
        self.users.get(&rnti)
    }

    pub fn nof_users(&self) -> usize {
        self.users.len()
    }

    pub fn task_sched(&self) -> &TaskScheduler<RrcTask> {
        &self.task_sched
    }

    pub fn get_metrics(&self) -> Vec<RrcUeMetrics> {
        if !self.running {
            return Vec::new();
        }
        self.users
            .values()
            .map(|ue| RrcUeMetrics { rnti: ue.rnti(), state: ue.state(), endc: ue.is_endc() })
            .collect()
    }

    /// Advance the timers by one millisecond and run whatever they and the
    /// handlers they invoked queued
    pub fn tick(&mut self) {
        for task in self.task_sched.tick() {
            self.run_task(task);
        }
        self.run_deferred_tasks();
    }

    pub fn run_deferred_tasks(&mut self) {
        while let Some(task) = self.task_sched.pop_deferred() {
            self.run_task(task);
        }
    }

    fn run_task(&mut self, task: RrcTask) {
        match task {
            RrcTask::ActivityTimeout { rnti, kind } => {
                if let Err(e) = self.activity_timer_expired(rnti, kind) {
                    warn!("Activity timeout for rnti={} not handled: {}", rnti, e);
                }
            }
            RrcTask::RemoveUser(rnti) => {
                let _ = self.rem_user(rnti);
            }
        }
    }

    /// Handle expiry of the activity timer of `rnti`
    pub fn activity_timer_expired(&mut self, rnti: Rnti, kind: u8) -> Result<(), LayerError> {
        let (mut svc, users) = self.services()?;
        let Some(ue) = users.get_mut(&rnti) else {
            debug!("Activity timeout for rnti={} which no longer exists", rnti);
            return Ok(());
        };

        match ActivityTimeout::from_u8(kind) {
            Some(timeout) => {
                ue.activity_timer_expired(timeout, &mut svc);
                Ok(())
            }
            None => {
                error!("Unhandled activity timeout kind {} for rnti={}", kind, rnti);
                svc.task_sched.defer_task(RrcTask::RemoveUser(rnti));
                Err(LayerError::UnhandledTimeoutKind(kind))
            }
        }
    }

    /// Split the engine into the services handed to UE procedures and the registry
    fn services(&mut self) -> Result<(UeServices<'_>, &mut BTreeMap<Rnti, UeContext>), LayerError> {
        let cell = self.cell.as_ref().ok_or(LayerError::NotInitialized)?;
        Ok((
            UeServices { cfg: &self.cfg, cell, ifaces: &self.ifaces, task_sched: &mut self.task_sched },
            &mut self.users,
        ))
    }

    /// Register a session and create its RLC and PDCP state
    fn add_user(&mut self, rnti: Rnti, uecfg: &SchedUeCfg, start_msg3_timer: bool) -> Result<(), LayerError> {
        let (mut svc, users) = self.services()?;
        if users.contains_key(&rnti) {
            error!("Adding user rnti={} (already exists)", rnti);
            return Err(LayerError::DuplicateSession(rnti));
        }

        let ue = UeContext::new(rnti, uecfg, start_msg3_timer, &mut svc);
        users.insert(rnti, ue);
        svc.ifaces.rlc.add_session(rnti);
        svc.ifaces.pdcp.add_session(rnti);
        info!("Added new user rnti={}", rnti);
        Ok(())
    }

    /// Tear down a session, stopping the scheduler before RLC and PDCP
    fn rem_user(&mut self, rnti: Rnti) -> Result<(), LayerError> {
        if !self.users.contains_key(&rnti) {
            error!("Removing user rnti={} (does not exist)", rnti);
            return Err(LayerError::UnknownSession(rnti));
        }

        self.ifaces.mac.remove_session(rnti);
        self.ifaces.rlc.remove_session(rnti);
        self.ifaces.pdcp.remove_session(rnti);
        if let Some(ue) = self.users.remove(&rnti) {
            self.task_sched.release(ue.activity_timer());
        }
        info!("Removed user rnti={}", rnti);
        Ok(())
    }

    /// Scheduler configuration of a session created by the RRC itself
    fn default_ue_cfg(&self) -> Result<SchedUeCfg, LayerError> {
        let duplex = self.cfg.pscell()?.duplex_mode;
        let mut uecfg = SchedUeCfg {
            carriers: vec![UeCarrierCfg { active: true, cc: 0 }],
            phy_cfg: PhyCfgNr::reference(duplex),
            ..Default::default()
        };
        // CSI reporting starts once the UE completed RA
        uecfg.phy_cfg.csi = Default::default();
        uecfg.ue_bearers[0] = LcChCfg { direction: LcChDirection::Both, group: 0 };
        Ok(uecfg)
    }

    // -----------------------------------------------------------------------
    // UL message handling
    // -----------------------------------------------------------------------

    fn handle_ul_ccch(&mut self, rnti: Rnti, pdu: &[u8]) -> Result<(), LayerError> {
        let lcid = NrSrb::Srb0.lcid();
        let msg: asn1::UlCcchMsg = match asn1::unpack(pdu) {
            Ok(msg) => msg,
            Err(e) => {
                log_rx_pdu_fail(rnti, lcid, pdu, &e.to_string(), true);
                return Err(e.into());
            }
        };
        let asn1::UlCcchMsg::C1(c1) = &msg else {
            log_rx_pdu_fail(rnti, lcid, pdu, "Unsupported UL-CCCH message type", true);
            return Err(LayerError::InvalidPdu);
        };
        log_rrc_message(
            &format!("rnti={}, {}", rnti, NrSrb::Srb0.name()),
            Direction::Rx,
            msg.message_name(),
            pdu.len(),
            &msg,
        );

        match c1 {
            asn1::UlCcchC1::RrcSetupRequest(req) => self.handle_rrc_setup_request(rnti, req, pdu),
            _ => {
                warn!("Unsupported UL-CCCH message {} from rnti={}", msg.message_name(), rnti);
                Err(LayerError::UnsupportedMessage(msg.message_name().to_string()))
            }
        }
    }

    fn handle_rrc_setup_request(
        &mut self,
        rnti: Rnti,
        req: &asn1::RrcSetupRequest,
        pdu: &[u8],
    ) -> Result<(), LayerError> {
        if !self.ifaces.ngap.is_link_up() {
            warn!("NG link is down, rejecting RRC connection of rnti={}", rnti);
            return self.send_rrc_reject(rnti);
        }

        let lcid = NrSrb::Srb0.lcid();
        let (mut svc, users) = self.services()?;
        let Some(ue) = users.get_mut(&rnti) else {
            log_rx_pdu_fail(rnti, lcid, pdu, "RRCSetupRequest for non-existent rnti", false);
            return Err(LayerError::UnknownSession(rnti));
        };
        // The dedicated configuration of a session is only offered once
        if ue.is_endc() || ue.state() == RrcState::Connected {
            log_rx_pdu_fail(rnti, lcid, pdu, "RRCSetupRequest for an established session", false);
            return Err(LayerError::InvalidState(format!(
                "rnti={} is {}{}",
                rnti,
                ue.state(),
                if ue.is_endc() { " (EN-DC)" } else { "" }
            )));
        }
        ue.handle_rrc_setup_request(req, &mut svc)
    }

    fn send_rrc_reject(&mut self, rnti: Rnti) -> Result<(), LayerError> {
        let msg = asn1::DlCcchMsg::C1(asn1::DlCcchC1::RrcReject(asn1::RrcReject {
            wait_time: Some(self.cfg.reject_wait_time_s),
        }));
        let pdu = asn1::pack(&msg, asn1::MAX_PDU_LEN)?;
        log_rrc_message(
            &format!("rnti={}, {}", rnti, NrSrb::Srb0.name()),
            Direction::Tx,
            msg.message_name(),
            pdu.len(),
            &msg,
        );
        self.ifaces.rlc.write_sdu(rnti, NrSrb::Srb0.lcid(), pdu);
        Ok(())
    }

    fn handle_ul_dcch(&mut self, rnti: Rnti, srb: NrSrb, pdu: &[u8]) -> Result<(), LayerError> {
        let lcid = srb.lcid();
        let (mut svc, users) = self.services()?;
        let Some(ue) = users.get_mut(&rnti) else {
            log_rx_pdu_fail(rnti, lcid, pdu, "non-existent rnti", false);
            return Err(LayerError::UnknownSession(rnti));
        };

        let msg: asn1::UlDcchMsg = match asn1::unpack(pdu) {
            Ok(msg) => msg,
            Err(e) => {
                log_rx_pdu_fail(rnti, lcid, pdu, &e.to_string(), false);
                return Err(e.into());
            }
        };
        let asn1::UlDcchMsg::C1(c1) = &msg else {
            log_rx_pdu_fail(rnti, lcid, pdu, "Unsupported UL-DCCH message type", false);
            return Err(LayerError::InvalidPdu);
        };
        log_rrc_message(
            &format!("rnti={}, {}", rnti, srb.name()),
            Direction::Rx,
            msg.message_name(),
            pdu.len(),
            &msg,
        );

        ue.handle_ul_dcch(c1, &mut svc)
    }
}

impl RrcMacInterface for RrcNr {
    fn read_master_info(&self, _slot: u32) -> Result<Bytes, LayerError> {
        self.cell.as_ref().ok_or(LayerError::NotInitialized)?.mib_pdu()
    }

    fn read_system_info(&self, sib_idx: usize) -> Result<Bytes, LayerError> {
        let cell = self.cell.as_ref().ok_or(LayerError::NotInitialized)?;
        cell.si_pdu(sib_idx).map_err(|e| {
            error!(
                "SI{}{} is not a configured SIB.",
                if sib_idx == 0 { "B" } else { "" },
                sib_idx + 1
            );
            e
        })
    }

    fn create_session(&mut self, rnti: Rnti, uecfg: &SchedUeCfg) -> Result<(), LayerError> {
        self.add_user(rnti, uecfg, true)
    }

    fn destroy_session(&mut self, rnti: Rnti) {
        let _ = self.rem_user(rnti);
    }

    fn rename_session(&mut self, new_rnti: Rnti, old_rnti: Rnti) -> Result<(), LayerError> {
        if new_rnti == old_rnti {
            warn!("rnti={} received MAC CRNTI CE with same rnti", new_rnti);
            return Err(LayerError::InvalidState(format!("rnti={} renamed to itself", new_rnti)));
        }

        let (mut svc, users) = self.services()?;

        // The new context was created for the RA that carried the C-RNTI CE
        // and is still referenced by the caller, so it is removed later
        if let Some(new_ue) = users.get_mut(&new_rnti) {
            if let Err(e) = new_ue.deactivate_bearers(&mut svc) {
                warn!("Failed to deactivate bearers of rnti={}: {}", new_rnti, e);
            }
            svc.task_sched.defer_task(RrcTask::RemoveUser(new_rnti));
        }

        let Some(old_ue) = users.get_mut(&old_rnti) else {
            info!("rnti={} received MAC CRNTI CE: {}, but old context is unavailable", new_rnti, old_rnti);
            return Err(LayerError::UnknownSession(old_rnti));
        };
        info!("Resuming rnti={} RRC connection due to received C-RNTI CE from rnti={}", old_rnti, new_rnti);
        old_ue.crnti_ce_received(&mut svc)
    }

    fn mark_active(&mut self, rnti: Rnti) {
        let Ok((mut svc, users)) = self.services() else {
            return;
        };
        match users.get_mut(&rnti) {
            Some(ue) => ue.set_activity(&mut svc),
            None => debug!("Activity for unknown rnti={}", rnti),
        }
    }
}

impl RrcPdcpInterface for RrcNr {
    fn deliver_pdu(&mut self, rnti: Rnti, lcid: u32, pdu: &[u8]) -> Result<(), LayerError> {
        if pdu.is_empty() {
            log_rx_pdu_fail(rnti, lcid, pdu, "PDU is empty", false);
            return Err(LayerError::InvalidPdu);
        }

        match NrSrb::from_u32(lcid) {
            Some(NrSrb::Srb0) => self.handle_ul_ccch(rnti, pdu),
            Some(srb) => self.handle_ul_dcch(rnti, srb, pdu),
            None => {
                error!("Invalid LCID={}", lcid);
                Err(LayerError::InvalidPdu)
            }
        }
    }
}

impl RrcEndcInterface for RrcNr {
    fn request_addition(&mut self, eutra_rnti: Rnti, params: SgnbAdditionReqParams) -> Result<Rnti, LayerError> {
        if self.cell.is_none() {
            self.ifaces.eutra.addition_reject(eutra_rnti);
            return Err(LayerError::NotInitialized);
        }

        let uecfg = match self.default_ue_cfg() {
            Ok(uecfg) => uecfg,
            Err(e) => {
                self.ifaces.eutra.addition_reject(eutra_rnti);
                return Err(e);
            }
        };
        let nr_rnti = self.ifaces.mac.reserve_identifier(0, &uecfg);
        if !nr_rnti.is_valid() {
            error!("Failed to allocate RNTI at MAC");
            self.ifaces.eutra.addition_reject(eutra_rnti);
            return Err(LayerError::ResourceReservationFailure);
        }

        if let Err(e) = self.add_user(nr_rnti, &uecfg, false) {
            self.ifaces.eutra.addition_reject(eutra_rnti);
            return Err(e);
        }

        let result = self.services().and_then(|(mut svc, users)| match users.get_mut(&nr_rnti) {
            Some(ue) => ue.handle_sgnb_addition_request(eutra_rnti, params, &mut svc),
            None => Err(LayerError::UnknownSession(nr_rnti)),
        });
        if let Err(e) = result {
            error!("Failed to handle SgNB Addition Request for rnti={}: {}", nr_rnti, e);
            self.ifaces.eutra.addition_reject(eutra_rnti);
            let _ = self.rem_user(nr_rnti);
            return Err(e);
        }

        info!("SgNB addition for eutra rnti={} accepted, nr rnti={}", eutra_rnti, nr_rnti);
        Ok(nr_rnti)
    }

    fn confirm_reconfiguration(&mut self, eutra_rnti: Rnti, response: &[u8]) {
        // The addition completes once the UE performed RA on the NR cell
        info!(
            "UE with eutra rnti={} confirmed the NR reconfiguration ({} B)",
            eutra_rnti,
            response.len()
        );
    }

    fn request_release(&mut self, nr_rnti: Rnti) {
        let eutra_rnti = match self.users.get(&nr_rnti) {
            Some(ue) if ue.is_endc() => Some(ue.eutra_rnti()),
            Some(_) => None,
            None => {
                warn!("SgNB release requested for rnti={} which does not exist", nr_rnti);
                return;
            }
        };

        let _ = self.rem_user(nr_rnti);
        if let Some(eutra_rnti) = eutra_rnti {
            self.ifaces.eutra.release_ack(eutra_rnti);
        }
    }
}
