//! PetQueueStore — sole owner and mutator of one session's EngineState.
//!
//! RULES:
//!   - Every mutation is synchronous and runs to completion.
//!   - Misuse (unknown id, full queue, sub-config cap, duplicate name) is
//!     absorbed as a no-op and logged at debug level, never an error.
//!   - Only import/export return errors, and a failed import leaves the
//!     state untouched.
//!   - The active pet id, when set, always names a pet in the queue.
//!
//! Each session owns its own store. There is no shared global store.

use crate::{
    command::{CommandOutcome, StoreCommand},
    config::CalcConfig,
    damage::{DamageEngine, DamageOutcome},
    error::CalcResult,
    ids::IdSource,
    model::{
        CalculationParamsPatch, EngineState, PetConfig, PetConfigPatch, SkillEntry,
        SubConfigEntry, SubConfigPatch,
    },
    serializer::ConfigSerializer,
    types::{EntryId, PetId, MAX_SUB_CONFIGS},
};
use std::collections::HashSet;

pub struct PetQueueStore {
    state:   EngineState,
    ids:     IdSource,
    presets: Vec<String>,
}

impl PetQueueStore {
    /// A fresh session: empty queue, the configured default params.
    pub fn new(config: &CalcConfig) -> Self {
        Self::with_state(EngineState::new(config.default_params.clone()), config)
    }

    pub fn with_state(state: EngineState, config: &CalcConfig) -> Self {
        Self {
            state,
            ids:     config.id_source(),
            presets: config.sub_config_presets.clone(),
        }
    }

    // ── Reads ──────────────────────────────────────────────────

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn pet(&self, id: &str) -> Option<&PetConfig> {
        self.state.pet_queue.find(id)
    }

    pub fn active_pet(&self) -> Option<&PetConfig> {
        self.state.active_pet_id.as_deref().and_then(|id| self.pet(id))
    }

    pub fn occupied_count(&self) -> usize {
        self.state.pet_queue.occupied_count()
    }

    pub fn is_full(&self) -> bool {
        self.state.pet_queue.is_full()
    }

    pub fn presets(&self) -> &[String] {
        &self.presets
    }

    /// Preset names the pet could still add. Empty for an unknown pet or
    /// one already at the sub-config cap.
    pub fn available_sub_config_names(&self, pet_id: &str) -> Vec<String> {
        let Some(pet) = self.pet(pet_id) else {
            return Vec::new();
        };
        if pet.sub_configs.len() >= MAX_SUB_CONFIGS {
            return Vec::new();
        }
        self.presets
            .iter()
            .filter(|name| !pet.has_sub_config_named(name))
            .cloned()
            .collect()
    }

    // ── Pets ───────────────────────────────────────────────────

    /// Place a new pet in the lowest empty slot and make it active.
    /// Returns `None` (and changes nothing) when the queue is full.
    pub fn add_pet(&mut self, race_id: &str) -> Option<PetConfig> {
        let Some(slot) = self.state.pet_queue.first_empty() else {
            log::debug!("add_pet({race_id}) ignored: queue is full");
            return None;
        };
        let pet = PetConfig::new(self.fresh_id(), race_id);
        self.state.pet_queue.place(slot, pet.clone());
        self.state.active_pet_id = Some(pet.id.clone());
        log::debug!("Pet {} ({race_id}) added to slot {slot}", pet.id);
        Some(pet)
    }

    pub fn remove_pet(&mut self, id: &str) {
        let Some(slot) = self.state.pet_queue.position(id) else {
            log::debug!("remove_pet({id}) ignored: not in queue");
            return;
        };
        self.state.pet_queue.take(slot);
        if self.state.active_pet_id.as_deref() == Some(id) {
            self.state.active_pet_id = None;
        }
        log::debug!("Pet {id} removed from slot {slot}");
    }

    /// Swap the race of a pet in place. Keeps the id and the slot; every
    /// other field starts over.
    pub fn replace_pet(&mut self, id: &str, new_race_id: &str) {
        let Some(slot) = self.state.pet_queue.position(id) else {
            log::debug!("replace_pet({id}) ignored: not in queue");
            return;
        };
        self.state.pet_queue.place(slot, PetConfig::new(id.to_string(), new_race_id));
        log::debug!("Pet {id} in slot {slot} replaced with race {new_race_id}");
    }

    /// Shallow-merge `patch` into the pet. A `sub_configs` value that would
    /// break the cap or name uniqueness is dropped; other fields still apply.
    pub fn update_pet(&mut self, id: &str, patch: PetConfigPatch) {
        let Some(pet) = self.state.pet_queue.find_mut(id) else {
            log::debug!("update_pet({id}) ignored: not in queue");
            return;
        };
        if let Some(race_id) = patch.race_id {
            pet.race_id = race_id;
        }
        if let Some(skills) = patch.skills {
            pet.skills = skills;
        }
        if let Some(set_id) = patch.sub_config_set_id {
            pet.sub_config_set_id = set_id;
        }
        if let Some(sub_configs) = patch.sub_configs {
            if sub_configs_are_valid(&sub_configs) {
                pet.sub_configs = sub_configs;
            } else {
                log::debug!("update_pet({id}): sub_configs dropped, cap or name uniqueness violated");
            }
        }
        match patch.final_damage {
            Some(Some(damage)) if !damage.is_finite() => {
                log::debug!("update_pet({id}): final_damage {damage} dropped, not finite");
            }
            Some(final_damage) => pet.final_damage = final_damage,
            None => {}
        }
    }

    // ── Skills ─────────────────────────────────────────────────

    /// Append an empty skill entry. Returns its entry id.
    pub fn add_skill(&mut self, pet_id: &str) -> Option<EntryId> {
        self.pet(pet_id)?;
        let entry_id = self.fresh_id();
        let pet = self.state.pet_queue.find_mut(pet_id)?;
        pet.skills.push(SkillEntry { entry_id: entry_id.clone(), skill_id: String::new() });
        Some(entry_id)
    }

    pub fn remove_skill(&mut self, pet_id: &str, entry_id: &str) {
        if let Some(pet) = self.state.pet_queue.find_mut(pet_id) {
            pet.skills.retain(|s| s.entry_id != entry_id);
        }
    }

    pub fn update_skill(&mut self, pet_id: &str, entry_id: &str, skill_id: &str) {
        let entry = self
            .state
            .pet_queue
            .find_mut(pet_id)
            .and_then(|pet| pet.skills.iter_mut().find(|s| s.entry_id == entry_id));
        match entry {
            Some(entry) => entry.skill_id = skill_id.to_string(),
            None => log::debug!("update_skill({pet_id}, {entry_id}) ignored: no such entry"),
        }
    }

    // ── Sub-configs ────────────────────────────────────────────

    /// Append a sub-config with an empty value. No-op at the cap or when
    /// the pet already has an entry with this name.
    pub fn add_sub_config(&mut self, pet_id: &str, name: &str) -> Option<EntryId> {
        let pet = self.pet(pet_id)?;
        if pet.sub_configs.len() >= MAX_SUB_CONFIGS {
            log::debug!("add_sub_config({pet_id}, {name}) ignored: {MAX_SUB_CONFIGS} already attached");
            return None;
        }
        if pet.has_sub_config_named(name) {
            log::debug!("add_sub_config({pet_id}, {name}) ignored: name already used");
            return None;
        }
        let entry_id = self.fresh_id();
        let pet = self.state.pet_queue.find_mut(pet_id)?;
        pet.sub_configs.push(SubConfigEntry {
            entry_id: entry_id.clone(),
            name:     name.to_string(),
            value:    String::new(),
        });
        Some(entry_id)
    }

    pub fn remove_sub_config(&mut self, pet_id: &str, entry_id: &str) {
        if let Some(pet) = self.state.pet_queue.find_mut(pet_id) {
            pet.sub_configs.retain(|s| s.entry_id != entry_id);
        }
    }

    /// A rename that collides with another entry on the same pet is
    /// dropped, but the value in the same patch still applies.
    pub fn update_sub_config(&mut self, pet_id: &str, entry_id: &str, patch: SubConfigPatch) {
        let Some(pet) = self.state.pet_queue.find_mut(pet_id) else {
            log::debug!("update_sub_config({pet_id}) ignored: pet not in queue");
            return;
        };
        let rename_collides = patch.name.as_deref().is_some_and(|name| {
            pet.sub_configs
                .iter()
                .any(|s| s.entry_id != entry_id && s.name == name)
        });
        let Some(entry) = pet.sub_configs.iter_mut().find(|s| s.entry_id == entry_id) else {
            log::debug!("update_sub_config({pet_id}, {entry_id}) ignored: no such entry");
            return;
        };
        match patch.name {
            Some(_) if rename_collides => {
                log::debug!("update_sub_config({pet_id}, {entry_id}): rename dropped, name in use");
            }
            Some(name) => entry.name = name,
            None => {}
        }
        if let Some(value) = patch.value {
            entry.value = value;
        }
    }

    // ── Globals ────────────────────────────────────────────────

    pub fn update_calculation_params(&mut self, patch: &CalculationParamsPatch) {
        patch.apply_to(&mut self.state.calculation_params);
    }

    /// Ids that are not in the queue are ignored, so the active pet always exists.
    pub fn set_active_pet(&mut self, id: Option<&str>) {
        match id {
            Some(id) if self.pet(id).is_none() => {
                log::debug!("set_active_pet({id}) ignored: not in queue");
            }
            _ => self.state.active_pet_id = id.map(str::to_string),
        }
    }

    pub fn set_config_name(&mut self, name: &str) {
        self.state.config_name = name.to_string();
    }

    pub fn set_total_damage(&mut self, total_damage: f64) {
        self.state.total_damage = total_damage;
    }

    /// Empty every slot and reset the active pet and total.
    /// Params and config name are kept.
    pub fn clear_queue(&mut self) {
        self.state.pet_queue.clear();
        self.state.active_pet_id = None;
        self.state.total_damage = 0.0;
        log::info!("Pet queue cleared");
    }

    // ── Calculation ────────────────────────────────────────────

    /// Run the damage formula on a snapshot and write the results back.
    pub fn calculate(&mut self) -> DamageOutcome {
        let outcome =
            DamageEngine::compute_damage(&self.state.calculation_params, &self.state.pet_queue);

        let pet_ids: Vec<PetId> = self.state.pet_queue.pets().map(|p| p.id.clone()).collect();
        if !outcome.valid {
            for id in &pet_ids {
                if self.pet(id).and_then(|p| p.final_damage) != Some(0.0) {
                    self.update_pet(id, final_damage_patch(0.0));
                }
            }
            self.set_total_damage(0.0);
            return outcome;
        }

        for id in &pet_ids {
            self.update_pet(id, final_damage_patch(outcome.per_pet_damage));
        }
        self.set_total_damage(outcome.total_damage);
        outcome
    }

    // ── Import / export ────────────────────────────────────────

    pub fn export_config(&self) -> CalcResult<String> {
        ConfigSerializer::export(&self.state)
    }

    /// Replace the whole state from an export blob. All-or-nothing: on
    /// error the current state is untouched.
    pub fn import_config(&mut self, text: &str) -> CalcResult<()> {
        let exported = ConfigSerializer::import(text)?;
        self.state = exported.into_state();
        Ok(())
    }

    // ── Command dispatch ───────────────────────────────────────

    pub fn apply(&mut self, command: StoreCommand) -> CommandOutcome {
        match command {
            StoreCommand::AddPet { race_id } => CommandOutcome::PetAdded {
                pet: self.add_pet(&race_id),
            },
            StoreCommand::RemovePet { pet_id } => {
                self.remove_pet(&pet_id);
                CommandOutcome::Done
            }
            StoreCommand::ReplacePet { pet_id, race_id } => {
                self.replace_pet(&pet_id, &race_id);
                CommandOutcome::Done
            }
            StoreCommand::UpdatePet { pet_id, patch } => {
                self.update_pet(&pet_id, patch);
                CommandOutcome::Done
            }
            StoreCommand::ClearQueue => {
                self.clear_queue();
                CommandOutcome::Done
            }
            StoreCommand::AddSkill { pet_id } => CommandOutcome::EntryAdded {
                entry_id: self.add_skill(&pet_id),
            },
            StoreCommand::RemoveSkill { pet_id, entry_id } => {
                self.remove_skill(&pet_id, &entry_id);
                CommandOutcome::Done
            }
            StoreCommand::UpdateSkill { pet_id, entry_id, skill_id } => {
                self.update_skill(&pet_id, &entry_id, &skill_id);
                CommandOutcome::Done
            }
            StoreCommand::AddSubConfig { pet_id, name } => CommandOutcome::EntryAdded {
                entry_id: self.add_sub_config(&pet_id, &name),
            },
            StoreCommand::RemoveSubConfig { pet_id, entry_id } => {
                self.remove_sub_config(&pet_id, &entry_id);
                CommandOutcome::Done
            }
            StoreCommand::UpdateSubConfig { pet_id, entry_id, patch } => {
                self.update_sub_config(&pet_id, &entry_id, patch);
                CommandOutcome::Done
            }
            StoreCommand::UpdateCalculationParams { patch } => {
                self.update_calculation_params(&patch);
                CommandOutcome::Done
            }
            StoreCommand::SetActivePet { pet_id } => {
                self.set_active_pet(pet_id.as_deref());
                CommandOutcome::Done
            }
            StoreCommand::SetConfigName { name } => {
                self.set_config_name(&name);
                CommandOutcome::Done
            }
            StoreCommand::SetTotalDamage { total_damage } => {
                self.set_total_damage(total_damage);
                CommandOutcome::Done
            }
            StoreCommand::Calculate => CommandOutcome::Calculated {
                damage: self.calculate(),
            },
        }
    }

    /// Draw an id not used by any pet or entry in the current state.
    /// Imported states may carry ids from another session's generator.
    fn fresh_id(&mut self) -> String {
        let state = &self.state;
        self.ids.next_unused(|candidate| id_in_use(state, candidate))
    }
}

fn final_damage_patch(damage: f64) -> PetConfigPatch {
    PetConfigPatch { final_damage: Some(Some(damage)), ..Default::default() }
}

fn sub_configs_are_valid(sub_configs: &[SubConfigEntry]) -> bool {
    let mut names = HashSet::new();
    sub_configs.len() <= MAX_SUB_CONFIGS && sub_configs.iter().all(|s| names.insert(s.name.as_str()))
}

fn id_in_use(state: &EngineState, id: &str) -> bool {
    state.pet_queue.pets().any(|pet| {
        pet.id == id
            || pet.skills.iter().any(|s| s.entry_id == id)
            || pet.sub_configs.iter().any(|s| s.entry_id == id)
    })
}
