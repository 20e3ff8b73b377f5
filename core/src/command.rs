use crate::{
    damage::DamageOutcome,
    model::{CalculationParamsPatch, PetConfig, PetConfigPatch, SubConfigPatch},
    types::{EntryId, PetId},
};
use serde::{Deserialize, Serialize};

/// Every store mutation as data, so a driver can replay or forward them.
/// Variants are append-only; the tag names are part of the runner protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum StoreCommand {
    // ── Queue ─────────────────────────────────────
    AddPet     { race_id: String },
    RemovePet  { pet_id: PetId },
    ReplacePet { pet_id: PetId, race_id: String },
    UpdatePet  { pet_id: PetId, patch: PetConfigPatch },
    ClearQueue,

    // ── Skills ────────────────────────────────────
    AddSkill    { pet_id: PetId },
    RemoveSkill { pet_id: PetId, entry_id: EntryId },
    UpdateSkill { pet_id: PetId, entry_id: EntryId, skill_id: String },

    // ── Sub-configs ───────────────────────────────
    AddSubConfig    { pet_id: PetId, name: String },
    RemoveSubConfig { pet_id: PetId, entry_id: EntryId },
    UpdateSubConfig { pet_id: PetId, entry_id: EntryId, patch: SubConfigPatch },

    // ── Globals ───────────────────────────────────
    UpdateCalculationParams { patch: CalculationParamsPatch },
    SetActivePet   { pet_id: Option<PetId> },
    SetConfigName  { name: String },
    SetTotalDamage { total_damage: f64 },
    Calculate,
}

/// What a command produced beyond the state change itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Done,
    /// `pet` is `None` when the queue was full.
    PetAdded { pet: Option<PetConfig> },
    /// `entry_id` is `None` when the add was absorbed as a no-op.
    EntryAdded { entry_id: Option<EntryId> },
    Calculated { damage: DamageOutcome },
}
