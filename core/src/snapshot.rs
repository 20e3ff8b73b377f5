//! The persisted subset of engine state.
//!
//! An export captures the config name, the global params and the queue.
//! The active pet and the total damage are session-local and are never
//! written; a restore always clears them.

use crate::{
    model::{CalculationParams, EngineState, PetQueue},
    types::EXPORT_FORMAT_VERSION,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedConfig {
    /// Absent in legacy blobs, which are read as version 1.
    #[serde(default = "legacy_version")]
    pub version: u32,
    #[serde(default)]
    pub config_name: String,
    pub calculation_params: CalculationParams,
    pub pet_queue: PetQueue,
}

fn legacy_version() -> u32 {
    1
}

impl ExportedConfig {
    pub fn capture(state: &EngineState) -> Self {
        Self {
            version:            EXPORT_FORMAT_VERSION,
            config_name:        state.config_name.clone(),
            calculation_params: state.calculation_params.clone(),
            pet_queue:          state.pet_queue.clone(),
        }
    }

    /// Build a fresh session state from this export.
    pub fn into_state(self) -> EngineState {
        EngineState {
            config_name:        self.config_name,
            pet_queue:          self.pet_queue,
            active_pet_id:      None,
            calculation_params: self.calculation_params,
            total_damage:       0.0,
        }
    }
}
