//! Per-UE RRC context
//!
//! A [`UeContext`] owns the dedicated configuration of one session and runs its
//! procedures. It never holds a reference to the engine: every handler receives
//! the engine services it may use through [`UeServices`], borrowed for the
//! duration of the call only.

use super::cell::CellContext;
use super::cell_group::{
    fill_secondary_cell_group, make_drb1_rlc_bearer, make_drb1_to_add_mod, make_master_cell_group,
    make_security_config, make_srb1_rlc_bearer, make_srb1_to_add_mod, DRB1_ID, DRB1_LCG, DRB1_LCID,
    DRB1_SCG_LCG,
};
use super::config::RrcNrConfig;
use super::phy_cfg::{make_csi_cfg, make_drb_pdcp_config, make_duplex_cfg, make_pdsch_cfg, make_rlc_config, make_ssb_cfg};
use super::{log_rrc_message, Direction, RrcCollaborators, RrcTask};
use crate::eutra::{SgnbAdditionAckParams, SgnbAdditionReqParams};
use crate::mac::ue_cfg::{LcChCfg, LcChDirection, MAX_NOF_LCIDS};
use crate::mac::SchedUeCfg;
use crate::pdcp::PdcpConfig;
use crate::LayerError;
use common::task_sched::{TaskScheduler, TimerId};
use common::types::{NrSrb, Rnti};
use nr_asn1 as asn1;
use nr_asn1::MessageName;
use num_derive::{FromPrimitive, ToPrimitive};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Buffer sizes of the containers handed to the LTE RRC
const SCG_BUF_LEN: usize = 1024;
const RECFG_BUF_LEN: usize = 2048;
const RADIO_BEARER_BUF_LEN: usize = 256;
/// Packed CellGroupConfig carried in RRCSetup or RRCReconfiguration
const CELL_GROUP_BUF_LEN: usize = 1024;

/// RRC state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RrcState {
    Idle,
    Inactive,
    Connected,
}

impl fmt::Display for RrcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RrcState::Idle => write!(f, "IDLE"),
            RrcState::Inactive => write!(f, "INACTIVE"),
            RrcState::Connected => write!(f, "CONNECTED"),
        }
    }
}

/// What the activity timer of a session is guarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, ToPrimitive)]
pub enum ActivityTimeout {
    /// RRCSetupRequest after a PRACH
    Msg3Rx = 0,
    UeInactivity = 1,
    /// RRCSetupComplete, or the RA of an EN-DC addition
    Msg5Rx = 2,
}

impl ActivityTimeout {
    pub fn name(&self) -> &'static str {
        match self {
            ActivityTimeout::Msg3Rx => "Msg3 reception",
            ActivityTimeout::UeInactivity => "UE inactivity",
            ActivityTimeout::Msg5Rx => "Msg5 reception",
        }
    }

    pub fn duration_ms(&self, cfg: &RrcNrConfig) -> u32 {
        match self {
            ActivityTimeout::Msg3Rx => cfg.timers.msg3_rx_timeout_ms,
            ActivityTimeout::UeInactivity => cfg.timers.ue_inactivity_timeout_ms,
            ActivityTimeout::Msg5Rx => cfg.timers.msg5_rx_timeout_ms,
        }
    }
}

/// Engine state a UE procedure may use
pub struct UeServices<'a> {
    pub cfg: &'a RrcNrConfig,
    pub cell: &'a CellContext,
    pub ifaces: &'a RrcCollaborators,
    pub task_sched: &'a mut TaskScheduler<RrcTask>,
}

/// RRC context of one UE
#[derive(Debug)]
pub struct UeContext {
    rnti: Rnti,
    state: RrcState,
    /// RRC-TransactionIdentifier of the next DL message, mod 4
    transaction_id: u8,
    activity_timer: TimerId,
    endc: bool,
    /// LTE C-RNTI of the master node session, only valid with `endc`
    eutra_rnti: Rnti,
    cell_group_cfg: asn1::CellGroupConfig,
    radio_bearer_cfg: asn1::RadioBearerConfig,
    uecfg: SchedUeCfg,
}

impl UeContext {
    pub fn new(rnti: Rnti, uecfg: &SchedUeCfg, start_msg3_timer: bool, svc: &mut UeServices<'_>) -> Self {
        let mut uecfg = uecfg.clone();
        uecfg.phy_cfg.pdcch = svc.cell.pdcch.clone();

        let mut ue = Self {
            rnti,
            state: RrcState::Idle,
            transaction_id: 0,
            activity_timer: svc.task_sched.create_timer(),
            endc: false,
            eutra_rnti: Rnti::INVALID,
            cell_group_cfg: asn1::CellGroupConfig::default(),
            radio_bearer_cfg: asn1::RadioBearerConfig::default(),
            uecfg,
        };
        let timeout = if start_msg3_timer { ActivityTimeout::Msg3Rx } else { ActivityTimeout::Msg5Rx };
        ue.set_activity_timeout(timeout, svc);
        ue
    }

    pub fn rnti(&self) -> Rnti {
        self.rnti
    }

    pub fn state(&self) -> RrcState {
        self.state
    }

    pub fn is_endc(&self) -> bool {
        self.endc
    }

    pub fn eutra_rnti(&self) -> Rnti {
        self.eutra_rnti
    }

    pub fn activity_timer(&self) -> TimerId {
        self.activity_timer
    }

    pub fn cell_group_cfg(&self) -> &asn1::CellGroupConfig {
        &self.cell_group_cfg
    }

    pub fn radio_bearer_cfg(&self) -> &asn1::RadioBearerConfig {
        &self.radio_bearer_cfg
    }

    pub fn uecfg(&self) -> &SchedUeCfg {
        &self.uecfg
    }

    fn next_transaction_id(&mut self) -> u8 {
        let tid = self.transaction_id;
        self.transaction_id = (tid + 1) % 4;
        tid
    }

    fn source(&self, srb: NrSrb) -> String {
        format!("rnti={}, {}", self.rnti, srb.name())
    }

    /// Re-arm the activity timer for `timeout` and start it from zero
    pub fn set_activity_timeout(&mut self, timeout: ActivityTimeout, svc: &mut UeServices<'_>) {
        let duration_ms = timeout.duration_ms(svc.cfg);
        let event = RrcTask::ActivityTimeout { rnti: self.rnti, kind: timeout as u8 };
        svc.task_sched.set(self.activity_timer, duration_ms, event);
        svc.task_sched.run(self.activity_timer);
        debug!(
            "Setting timer for {} for rnti={} to {}ms",
            timeout.name(),
            self.rnti,
            duration_ms
        );
    }

    /// Traffic or signalling was seen for the UE
    pub fn set_activity(&mut self, svc: &mut UeServices<'_>) {
        svc.task_sched.run(self.activity_timer);
        debug!(
            "Activity registered for rnti={} (timeout value {}ms)",
            self.rnti,
            svc.task_sched.duration(self.activity_timer)
        );
        if self.endc {
            svc.ifaces.eutra.set_activity(self.eutra_rnti);
        }
    }

    /// Handle expiry of the activity timer. Removal of the session on a Msg3
    /// timeout is deferred since the caller still holds this context.
    pub fn activity_timer_expired(&mut self, timeout: ActivityTimeout, svc: &mut UeServices<'_>) {
        info!("Activity timeout for rnti={} ({} expired)", self.rnti, timeout.name());

        match timeout {
            ActivityTimeout::Msg5Rx | ActivityTimeout::UeInactivity => {
                if self.endc {
                    svc.ifaces.eutra.inactivity_notice(self.eutra_rnti);
                }
                self.state = RrcState::Inactive;
            }
            ActivityTimeout::Msg3Rx => {
                self.state = RrcState::Idle;
                svc.task_sched.defer_task(RrcTask::RemoveUser(self.rnti));
            }
        }
    }

    /// Create the RLC and PDCP entities of DRB1 and return its bearer configuration
    fn add_drb(
        &self,
        lc_group: u8,
        svc: &mut UeServices<'_>,
    ) -> Result<(asn1::RlcBearerConfig, asn1::DrbToAddMod), LayerError> {
        let rlc_bearer = make_drb1_rlc_bearer(lc_group);
        let rlc_cfg = rlc_bearer
            .rlc_config
            .as_ref()
            .ok_or_else(|| LayerError::BearerConfig("DRB1 has no RLC configuration".to_string()))
            .and_then(|rlc| make_rlc_config(rlc, DRB1_ID))?;
        svc.ifaces.rlc.add_bearer(self.rnti, DRB1_LCID, &rlc_cfg)?;

        let drb = make_drb1_to_add_mod();
        let pdcp_cfg = drb
            .pdcp_config
            .as_ref()
            .ok_or_else(|| LayerError::BearerConfig("DRB1 has no PDCP configuration".to_string()))
            .and_then(|pdcp| make_drb_pdcp_config(DRB1_ID, pdcp))?;
        svc.ifaces.pdcp.add_bearer(self.rnti, DRB1_LCID, &pdcp_cfg)?;

        Ok((rlc_bearer, drb))
    }

    /// Mirror the RLC bearers of `cell_group` into the scheduler bearer table
    fn activate_bearers(uecfg: &mut SchedUeCfg, cell_group: &asn1::CellGroupConfig) -> Result<(), LayerError> {
        for bearer in &cell_group.rlc_bearer_to_add_mod_list {
            let lcid = usize::from(bearer.logical_channel_identity);
            if lcid >= MAX_NOF_LCIDS {
                return Err(LayerError::BearerConfig(format!("Invalid LCID {}", lcid)));
            }
            let group = bearer
                .mac_logical_channel_config
                .as_ref()
                .and_then(|lc| lc.ul_specific_parameters.as_ref())
                .and_then(|ul| ul.logical_channel_group)
                .unwrap_or(0);
            uecfg.ue_bearers[lcid] = LcChCfg { direction: LcChDirection::Both, group };
        }
        Ok(())
    }

    /// Stop scheduling every logical channel of the UE
    pub fn deactivate_bearers(&mut self, svc: &mut UeServices<'_>) -> Result<(), LayerError> {
        self.uecfg.ue_bearers = [LcChCfg::default(); MAX_NOF_LCIDS];
        svc.ifaces.mac.apply_config(self.rnti, &self.uecfg)
    }

    // -----------------------------------------------------------------------
    // EN-DC
    // -----------------------------------------------------------------------

    /// Build the SCG configuration for the LTE RRC and acknowledge the addition.
    ///
    /// The configuration is built on a copy that replaces the stored trees only
    /// once the acknowledgment was sent.
    pub fn handle_sgnb_addition_request(
        &mut self,
        eutra_rnti: Rnti,
        params: SgnbAdditionReqParams,
        svc: &mut UeServices<'_>,
    ) -> Result<(), LayerError> {
        let mut cell_group = self.cell_group_cfg.clone();
        let mut radio_bearer = self.radio_bearer_cfg.clone();

        // DRB1 is the only RLC bearer of the SCG, the fill below provides it
        let (_, drb) = self.add_drb(DRB1_SCG_LCG, svc)?;
        upsert_drb(&mut radio_bearer, drb);

        let cell = svc.cfg.pscell()?;
        fill_secondary_cell_group(&mut cell_group, &svc.cell.base_sp_cell_cfg, cell, self.rnti)?;
        let scg = asn1::pack(&cell_group, SCG_BUF_LEN)?;
        self.log_container("nr-SecondaryCellGroupConfig-r15", scg.len(), &cell_group);

        let recfg = asn1::RrcReconfiguration {
            rrc_transaction_id: self.next_transaction_id(),
            secondary_cell_group: Some(scg.to_vec()),
            ..Default::default()
        };
        let recfg_pdu = asn1::pack(&recfg, RECFG_BUF_LEN)?;

        radio_bearer.security_config = Some(make_security_config());
        let rb_pdu = asn1::pack(&radio_bearer, RADIO_BEARER_BUF_LEN)?;
        self.log_container("nr-RadioBearerConfig1-r15", rb_pdu.len(), &radio_bearer);

        svc.ifaces.eutra.addition_ack(
            eutra_rnti,
            SgnbAdditionAckParams {
                nr_rnti: self.rnti,
                eps_bearer_id: params.eps_bearer_id,
                nr_secondary_cell_group_cfg: recfg_pdu,
                nr_radio_bearer_cfg: rb_pdu,
            },
        );

        self.endc = true;
        self.eutra_rnti = eutra_rnti;
        self.cell_group_cfg = cell_group;
        self.radio_bearer_cfg = radio_bearer;
        Ok(())
    }

    /// The UE completed RA on the NR cell. For EN-DC sessions this completes
    /// the SgNB addition and activates the bearers at the scheduler.
    pub fn crnti_ce_received(&mut self, svc: &mut UeServices<'_>) -> Result<(), LayerError> {
        if !self.endc {
            return Ok(());
        }

        let mut uecfg = self.uecfg.clone();
        Self::activate_bearers(&mut uecfg, &self.cell_group_cfg)?;
        let sp_cell = self
            .cell_group_cfg
            .sp_cell_config
            .as_ref()
            .ok_or_else(|| LayerError::InvalidState(format!("rnti={} has no SpCellConfig", self.rnti)))?;
        let serv_cell = sp_cell.sp_cell_config_dedicated.as_ref().ok_or_else(|| {
            LayerError::InvalidState(format!("rnti={} has no SpCellConfigDedicated", self.rnti))
        })?;
        let common = sp_cell
            .reconfiguration_with_sync
            .as_ref()
            .and_then(|sync| sync.sp_cell_config_common.as_ref())
            .ok_or_else(|| LayerError::InvalidState(format!("rnti={} has no ReconfigurationWithSync", self.rnti)))?;
        uecfg.phy_cfg.pdsch = make_pdsch_cfg(serv_cell)?;
        uecfg.phy_cfg.csi = make_csi_cfg(serv_cell);
        uecfg.phy_cfg.ssb = make_ssb_cfg(common)?;
        uecfg.phy_cfg.duplex = make_duplex_cfg(common);

        svc.ifaces.eutra.addition_complete(self.eutra_rnti, self.rnti);
        self.set_activity_timeout(ActivityTimeout::UeInactivity, svc);

        self.uecfg = uecfg;
        svc.ifaces.mac.apply_config(self.rnti, &self.uecfg)
    }

    // -----------------------------------------------------------------------
    // SA connection establishment
    // -----------------------------------------------------------------------

    /// RRCSetupRequest on SRB0. Both identity kinds are answered with RRCSetup.
    pub fn handle_rrc_setup_request(
        &mut self,
        req: &asn1::RrcSetupRequest,
        svc: &mut UeServices<'_>,
    ) -> Result<(), LayerError> {
        match req.ue_identity {
            asn1::InitialUeIdentity::Ng5gSTmsiPart1(part1) => {
                debug!("rnti={} identified by 5G-S-TMSI part 1 {:#x}", self.rnti, part1);
            }
            asn1::InitialUeIdentity::RandomValue(value) => {
                debug!("rnti={} identified by random value {:#x}", self.rnti, value);
            }
        }
        info!(
            "rnti={} requests an RRC connection ({:?})",
            self.rnti, req.establishment_cause
        );
        self.send_rrc_setup(svc)
    }

    /// Send RRCSetup with SRB1 and wait for RRCSetupComplete
    fn send_rrc_setup(&mut self, svc: &mut UeServices<'_>) -> Result<(), LayerError> {
        let srb1_bearer = make_srb1_rlc_bearer();
        let srb1_rlc = srb1_bearer
            .rlc_config
            .as_ref()
            .ok_or_else(|| LayerError::BearerConfig("SRB1 has no RLC configuration".to_string()))
            .and_then(|rlc| make_rlc_config(rlc, NrSrb::Srb1 as u8))?;

        let cell_group = make_master_cell_group(&svc.cell.base_sp_cell_cfg, vec![srb1_bearer]);
        let radio_bearer = asn1::RadioBearerConfig {
            srb_to_add_mod_list: vec![make_srb1_to_add_mod()],
            ..Default::default()
        };
        let mcg = asn1::pack(&cell_group, CELL_GROUP_BUF_LEN)?;

        let msg = asn1::DlCcchMsg::C1(asn1::DlCcchC1::RrcSetup(asn1::RrcSetup {
            rrc_transaction_id: self.next_transaction_id(),
            radio_bearer_config: radio_bearer.clone(),
            master_cell_group: mcg.to_vec(),
        }));
        let pdu = asn1::pack(&msg, asn1::MAX_PDU_LEN)?;

        // SRB1 has to exist before the UE answers on it
        svc.ifaces.rlc.add_bearer(self.rnti, NrSrb::Srb1.lcid(), &srb1_rlc)?;
        svc.ifaces.pdcp.add_bearer(self.rnti, NrSrb::Srb1.lcid(), &PdcpConfig::srb(NrSrb::Srb1 as u8))?;
        let mut uecfg = self.uecfg.clone();
        Self::activate_bearers(&mut uecfg, &cell_group)?;
        svc.ifaces.mac.apply_config(self.rnti, &uecfg)?;

        log_rrc_message(&self.source(NrSrb::Srb0), Direction::Tx, msg.message_name(), pdu.len(), &msg);
        svc.ifaces.rlc.write_sdu(self.rnti, NrSrb::Srb0.lcid(), pdu);

        self.uecfg = uecfg;
        self.cell_group_cfg = cell_group;
        self.radio_bearer_cfg = radio_bearer;
        self.set_activity_timeout(ActivityTimeout::Msg5Rx, svc);
        Ok(())
    }

    /// RRCSetupComplete: the session is connected. DRB1 is set up right away.
    pub fn handle_rrc_setup_complete(
        &mut self,
        _msg: &asn1::RrcSetupComplete,
        svc: &mut UeServices<'_>,
    ) -> Result<(), LayerError> {
        if self.state == RrcState::Connected {
            warn!("Received RRCSetupComplete for rnti={} which is already {}", self.rnti, self.state);
            return Ok(());
        }
        self.state = RrcState::Connected;
        info!("rnti={} is now {}", self.rnti, self.state);
        self.set_activity_timeout(ActivityTimeout::UeInactivity, svc);

        self.send_drb1_reconfiguration(svc)
    }

    /// Add DRB1 with an RRCReconfiguration on SRB1
    fn send_drb1_reconfiguration(&mut self, svc: &mut UeServices<'_>) -> Result<(), LayerError> {
        let (rlc_bearer, drb) = self.add_drb(DRB1_LCG, svc)?;

        let delta_cell_group = make_master_cell_group(&svc.cell.base_sp_cell_cfg, vec![rlc_bearer.clone()]);
        let mcg = asn1::pack(&delta_cell_group, CELL_GROUP_BUF_LEN)?;
        let delta_radio_bearer = asn1::RadioBearerConfig {
            drb_to_add_mod_list: vec![drb.clone()],
            ..Default::default()
        };

        let msg = asn1::DlDcchMsg::C1(asn1::DlDcchC1::RrcReconfiguration(asn1::RrcReconfiguration {
            rrc_transaction_id: self.next_transaction_id(),
            radio_bearer_config: Some(delta_radio_bearer),
            master_cell_group: Some(mcg.to_vec()),
            ..Default::default()
        }));
        let pdu = asn1::pack(&msg, asn1::MAX_PDU_LEN)?;

        let mut cell_group = self.cell_group_cfg.clone();
        let mut radio_bearer = self.radio_bearer_cfg.clone();
        upsert_rlc_bearer(&mut cell_group, rlc_bearer);
        upsert_drb(&mut radio_bearer, drb);

        let mut uecfg = self.uecfg.clone();
        Self::activate_bearers(&mut uecfg, &cell_group)?;
        if let Some(serv_cell) = svc.cell.base_sp_cell_cfg.sp_cell_config_dedicated.as_ref() {
            uecfg.phy_cfg.pdsch = make_pdsch_cfg(serv_cell)?;
        }

        log_rrc_message(&self.source(NrSrb::Srb1), Direction::Tx, msg.message_name(), pdu.len(), &msg);
        svc.ifaces.pdcp.write_sdu(self.rnti, NrSrb::Srb1.lcid(), pdu);

        self.cell_group_cfg = cell_group;
        self.radio_bearer_cfg = radio_bearer;
        self.uecfg = uecfg;
        svc.ifaces.mac.apply_config(self.rnti, &self.uecfg)
    }

    pub fn handle_rrc_reconfiguration_complete(
        &mut self,
        msg: &asn1::RrcReconfigurationComplete,
        svc: &mut UeServices<'_>,
    ) {
        info!(
            "rnti={} completed RRC reconfiguration (transaction id {})",
            self.rnti, msg.rrc_transaction_id
        );
        self.set_activity(svc);
    }

    /// Route a decoded UL-DCCH message
    pub fn handle_ul_dcch(&mut self, msg: &asn1::UlDcchC1, svc: &mut UeServices<'_>) -> Result<(), LayerError> {
        match msg {
            asn1::UlDcchC1::RrcSetupComplete(complete) => self.handle_rrc_setup_complete(complete, svc),
            asn1::UlDcchC1::RrcReconfigurationComplete(complete) => {
                self.handle_rrc_reconfiguration_complete(complete, svc);
                Ok(())
            }
            other => {
                let name = asn1::UlDcchMsg::C1(other.clone()).message_name();
                warn!("Unsupported UL-DCCH message {} from rnti={}", name, self.rnti);
                Err(LayerError::UnsupportedMessage(name.to_string()))
            }
        }
    }

    fn log_container<T: Serialize>(&self, name: &str, len: usize, content: &T) {
        log_rrc_message(&format!("rnti={}", self.rnti), Direction::Tx, name, len, content);
    }
}

/// Add `bearer` to the cell group, replacing an entry with the same LCID
fn upsert_rlc_bearer(cell_group: &mut asn1::CellGroupConfig, bearer: asn1::RlcBearerConfig) {
    let list = &mut cell_group.rlc_bearer_to_add_mod_list;
    list.retain(|b| b.logical_channel_identity != bearer.logical_channel_identity);
    list.push(bearer);
}

fn upsert_drb(radio_bearer: &mut asn1::RadioBearerConfig, drb: asn1::DrbToAddMod) {
    let list = &mut radio_bearer.drb_to_add_mod_list;
    list.retain(|d| d.drb_identity != drb.drb_identity);
    list.push(drb);
}
