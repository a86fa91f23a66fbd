//! Medium Access Control (MAC) Layer Interface
//!
//! Contract between RRC and the NR MAC scheduler (3GPP TS 38.321): RNTI
//! reservation, per-UE configuration, UE removal and cell configuration.

pub mod scheduler;
pub mod ue_cfg;

use crate::LayerError;
use common::types::Rnti;

pub use scheduler::{Coreset0Config, SchedBwpCfg, SchedCellCfg, SibCfg};
pub use ue_cfg::{LcChCfg, LcChDirection, PhyCfgNr, SchedUeCfg, UeCarrierCfg};

/// Scheduler services used by RRC
pub trait MacInterface: Send + Sync {
    /// Reserve a C-RNTI on carrier `cc` for a UE with configuration `cfg`.
    /// Returns [`Rnti::INVALID`] when no identifier is available.
    fn reserve_identifier(&self, cc: u32, cfg: &SchedUeCfg) -> Rnti;

    /// Apply a new UE configuration
    fn apply_config(&self, rnti: Rnti, cfg: &SchedUeCfg) -> Result<(), LayerError>;

    /// Stop scheduling and forget the UE
    fn remove_session(&self, rnti: Rnti);

    /// Configure the cells served by the scheduler
    fn cell_config(&self, cells: &[SchedCellCfg]) -> Result<(), LayerError>;
}
