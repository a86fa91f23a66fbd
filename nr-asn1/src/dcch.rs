//! UL-DCCH and DL-DCCH messages (SRB1..SRB3)

use crate::radio_bearer::RadioBearerConfig;
use crate::MessageName;
use serde::{Deserialize, Serialize};

/// UL-DCCH-Message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UlDcchMsg {
    C1(UlDcchC1),
    MessageClassExtension,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UlDcchC1 {
    MeasurementReport,
    RrcReconfigurationComplete(RrcReconfigurationComplete),
    RrcSetupComplete(RrcSetupComplete),
    RrcReestablishmentComplete,
    SecurityModeComplete,
    UlInformationTransfer(UlInformationTransfer),
}

/// RRCSetupComplete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcSetupComplete {
    pub rrc_transaction_id: u8,
    pub selected_plmn_identity: u8,
    pub dedicated_nas_message: Vec<u8>,
}

/// RRCReconfigurationComplete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcReconfigurationComplete {
    pub rrc_transaction_id: u8,
}

/// ULInformationTransfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UlInformationTransfer {
    pub dedicated_nas_message: Option<Vec<u8>>,
}

/// DL-DCCH-Message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DlDcchMsg {
    C1(DlDcchC1),
    MessageClassExtension,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DlDcchC1 {
    RrcReconfiguration(RrcReconfiguration),
    RrcRelease,
}

/// RRCReconfiguration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrcReconfiguration {
    pub rrc_transaction_id: u8,
    pub radio_bearer_config: Option<RadioBearerConfig>,
    /// Packed CellGroupConfig of the secondary cell group
    pub secondary_cell_group: Option<Vec<u8>>,
    /// Packed CellGroupConfig of the master cell group
    pub master_cell_group: Option<Vec<u8>>,
    pub dedicated_nas_message_list: Vec<Vec<u8>>,
}

impl MessageName for UlDcchMsg {
    fn message_name(&self) -> &'static str {
        match self {
            UlDcchMsg::C1(c1) => match c1 {
                UlDcchC1::MeasurementReport => "measurementReport",
                UlDcchC1::RrcReconfigurationComplete(_) => "rrcReconfigurationComplete",
                UlDcchC1::RrcSetupComplete(_) => "rrcSetupComplete",
                UlDcchC1::RrcReestablishmentComplete => "rrcReestablishmentComplete",
                UlDcchC1::SecurityModeComplete => "securityModeComplete",
                UlDcchC1::UlInformationTransfer(_) => "ulInformationTransfer",
            },
            UlDcchMsg::MessageClassExtension => "messageClassExtension",
        }
    }
}

impl MessageName for DlDcchMsg {
    fn message_name(&self) -> &'static str {
        match self {
            DlDcchMsg::C1(DlDcchC1::RrcReconfiguration(_)) => "rrcReconfiguration",
            DlDcchMsg::C1(DlDcchC1::RrcRelease) => "rrcRelease",
            DlDcchMsg::MessageClassExtension => "messageClassExtension",
        }
    }
}
