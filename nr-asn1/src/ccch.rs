//! UL-CCCH and DL-CCCH messages (SRB0)

use crate::radio_bearer::RadioBearerConfig;
use crate::MessageName;
use serde::{Deserialize, Serialize};

/// UL-CCCH-Message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UlCcchMsg {
    C1(UlCcchC1),
    MessageClassExtension,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UlCcchC1 {
    RrcSetupRequest(RrcSetupRequest),
    RrcResumeRequest(RrcResumeRequest),
    RrcReestablishmentRequest(RrcReestablishmentRequest),
    RrcSystemInfoRequest,
}

/// RRCSetupRequest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcSetupRequest {
    pub ue_identity: InitialUeIdentity,
    pub establishment_cause: EstablishmentCause,
}

/// InitialUE-Identity (39-bit values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialUeIdentity {
    Ng5gSTmsiPart1(u64),
    RandomValue(u64),
}

/// EstablishmentCause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstablishmentCause {
    Emergency,
    HighPriorityAccess,
    MtAccess,
    MoSignalling,
    MoData,
    MoVoiceCall,
    MoVideoCall,
    MoSms,
    MpsPriorityAccess,
    McsPriorityAccess,
}

/// RRCResumeRequest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcResumeRequest {
    pub resume_identity: u32,
    pub resume_mac_i: u16,
}

/// RRCReestablishmentRequest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcReestablishmentRequest {
    pub c_rnti: u16,
    pub phys_cell_id: u16,
    pub short_mac_i: u16,
}

/// DL-CCCH-Message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DlCcchMsg {
    C1(DlCcchC1),
    MessageClassExtension,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DlCcchC1 {
    RrcReject(RrcReject),
    RrcSetup(RrcSetup),
}

/// RRCReject
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcReject {
    /// RejectWaitTime in seconds (1..16)
    pub wait_time: Option<u8>,
}

/// RRCSetup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcSetup {
    pub rrc_transaction_id: u8,
    pub radio_bearer_config: RadioBearerConfig,
    /// Packed CellGroupConfig
    pub master_cell_group: Vec<u8>,
}

impl MessageName for UlCcchMsg {
    fn message_name(&self) -> &'static str {
        match self {
            UlCcchMsg::C1(UlCcchC1::RrcSetupRequest(_)) => "rrcSetupRequest",
            UlCcchMsg::C1(UlCcchC1::RrcResumeRequest(_)) => "rrcResumeRequest",
            UlCcchMsg::C1(UlCcchC1::RrcReestablishmentRequest(_)) => "rrcReestablishmentRequest",
            UlCcchMsg::C1(UlCcchC1::RrcSystemInfoRequest) => "rrcSystemInfoRequest",
            UlCcchMsg::MessageClassExtension => "messageClassExtension",
        }
    }
}

impl MessageName for DlCcchMsg {
    fn message_name(&self) -> &'static str {
        match self {
            DlCcchMsg::C1(DlCcchC1::RrcReject(_)) => "rrcReject",
            DlCcchMsg::C1(DlCcchC1::RrcSetup(_)) => "rrcSetup",
            DlCcchMsg::MessageClassExtension => "messageClassExtension",
        }
    }
}
