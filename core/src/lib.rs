//! Pet queue and damage calculation engine.
//!
//! Three parts, leaf-first:
//!   - serializer: export blobs, base64(zlib(JSON)), and their validation
//!   - store:      the session's EngineState and every mutation on it
//!   - damage:     the pure damage formula over a state snapshot

pub mod command;
pub mod config;
pub mod damage;
pub mod error;
pub mod ids;
pub mod model;
pub mod serializer;
pub mod snapshot;
pub mod store;
pub mod types;

pub use command::{CommandOutcome, StoreCommand};
pub use config::CalcConfig;
pub use damage::{DamageEngine, DamageOutcome};
pub use error::{CalcError, CalcResult, DecodeStage};
pub use model::{
    CalculationParams, CalculationParamsPatch, EngineState, PetConfig, PetConfigPatch, PetQueue,
    SkillEntry, SubConfigEntry, SubConfigPatch,
};
pub use serializer::ConfigSerializer;
pub use snapshot::ExportedConfig;
pub use store::PetQueueStore;
