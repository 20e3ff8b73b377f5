//! The engine's data model: pets, their entries, the queue and global params.
//!
//! Field names serialize in camelCase. The export blob and the runner's
//! state view both use these exact shapes, so renaming a field here is a
//! format change.

use crate::types::{EntryId, PetId, QUEUE_SLOTS};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEntry {
    pub entry_id: EntryId,
    /// Empty while the user is still choosing.
    #[serde(default)]
    pub skill_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubConfigEntry {
    pub entry_id: EntryId,
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetConfig {
    pub id: PetId,
    #[serde(default)]
    pub race_id: String,
    #[serde(default)]
    pub skills: Vec<SkillEntry>,
    #[serde(default)]
    pub sub_config_set_id: String,
    #[serde(default)]
    pub sub_configs: Vec<SubConfigEntry>,
    /// Written only by a damage calculation; `None` until then.
    #[serde(default)]
    pub final_damage: Option<f64>,
}

impl PetConfig {
    pub fn new(id: PetId, race_id: impl Into<String>) -> Self {
        Self {
            id,
            race_id: race_id.into(),
            skills: Vec::new(),
            sub_config_set_id: String::new(),
            sub_configs: Vec::new(),
            final_damage: None,
        }
    }

    pub fn has_sub_config_named(&self, name: &str) -> bool {
        self.sub_configs.iter().any(|s| s.name == name)
    }
}

/// Shallow patch for `update_pet`. Absent fields are left untouched.
/// The id is not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PetConfigPatch {
    pub race_id: Option<String>,
    pub skills: Option<Vec<SkillEntry>>,
    pub sub_config_set_id: Option<String>,
    pub sub_configs: Option<Vec<SubConfigEntry>>,
    /// `Some(None)` clears a computed damage; in JSON that is an explicit `null`.
    #[serde(deserialize_with = "present_or_null")]
    pub final_damage: Option<Option<f64>>,
}

/// A present field, `null` included, is `Some`. Only an absent field stays `None`.
fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubConfigPatch {
    pub name: Option<String>,
    pub value: Option<String>,
}

/// The twelve global multipliers and divisors feeding the damage formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculationParams {
    pub power_buff:           f64,
    pub damage_buff:          f64,
    pub crit_damage_buff:     f64,
    pub numeric_buff:         f64,
    pub panel_attack:         f64,
    pub skill_power:          f64,
    pub attribute_level:      f64,
    pub penetration:          f64,
    pub restraint_factor:     f64,
    pub restraint_multiplier: f64,
    pub boss_defense:         f64,
    pub skill_segments:       f64,
}

impl Default for CalculationParams {
    fn default() -> Self {
        Self {
            power_buff:           0.0,
            damage_buff:          0.0,
            crit_damage_buff:     0.0,
            numeric_buff:         0.0,
            panel_attack:         0.0,
            skill_power:          0.0,
            attribute_level:      6.25,
            penetration:          0.0,
            restraint_factor:     1.0,
            restraint_multiplier: 1.0,
            boss_defense:         0.0,
            skill_segments:       1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculationParamsPatch {
    pub power_buff:           Option<f64>,
    pub damage_buff:          Option<f64>,
    pub crit_damage_buff:     Option<f64>,
    pub numeric_buff:         Option<f64>,
    pub panel_attack:         Option<f64>,
    pub skill_power:          Option<f64>,
    pub attribute_level:      Option<f64>,
    pub penetration:          Option<f64>,
    pub restraint_factor:     Option<f64>,
    pub restraint_multiplier: Option<f64>,
    pub boss_defense:         Option<f64>,
    pub skill_segments:       Option<f64>,
}

impl CalculationParamsPatch {
    pub fn apply_to(&self, params: &mut CalculationParams) {
        // Non-finite values cannot be exported as JSON numbers.
        fn merge(slot: &mut f64, value: Option<f64>) {
            match value {
                Some(v) if v.is_finite() => *slot = v,
                Some(v) => log::debug!("Calculation param value {v} ignored: not finite"),
                None => {}
            }
        }
        merge(&mut params.power_buff,           self.power_buff);
        merge(&mut params.damage_buff,          self.damage_buff);
        merge(&mut params.crit_damage_buff,     self.crit_damage_buff);
        merge(&mut params.numeric_buff,         self.numeric_buff);
        merge(&mut params.panel_attack,         self.panel_attack);
        merge(&mut params.skill_power,          self.skill_power);
        merge(&mut params.attribute_level,      self.attribute_level);
        merge(&mut params.penetration,          self.penetration);
        merge(&mut params.restraint_factor,     self.restraint_factor);
        merge(&mut params.restraint_multiplier, self.restraint_multiplier);
        merge(&mut params.boss_defense,         self.boss_defense);
        merge(&mut params.skill_segments,       self.skill_segments);
    }
}

/// Exactly QUEUE_SLOTS slots, each empty or holding a pet.
/// Slots are never added or removed, only filled and emptied.
///
/// Deserializing accepts any length: short queues are padded with empty
/// slots and long ones are truncated, so foreign exports load instead of
/// failing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Vec<Option<PetConfig>>")]
pub struct PetQueue {
    slots: [Option<PetConfig>; QUEUE_SLOTS],
}

impl PetQueue {
    pub fn new() -> Self {
        Self { slots: std::array::from_fn(|_| None) }
    }

    pub fn slots(&self) -> &[Option<PetConfig>] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&PetConfig> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn pets(&self) -> impl Iterator<Item = &PetConfig> {
        self.slots.iter().flatten()
    }

    pub fn pets_mut(&mut self) -> impl Iterator<Item = &mut PetConfig> {
        self.slots.iter_mut().flatten()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|p| p.id == id))
    }

    pub fn find(&self, id: &str) -> Option<&PetConfig> {
        self.pets().find(|p| p.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut PetConfig> {
        self.pets_mut().find(|p| p.id == id)
    }

    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn occupied_count(&self) -> usize {
        self.pets().count()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied_count() == 0
    }

    pub fn is_full(&self) -> bool {
        self.first_empty().is_none()
    }

    /// Put `pet` into slot `index`, returning whatever was there.
    pub(crate) fn place(&mut self, index: usize, pet: PetConfig) -> Option<PetConfig> {
        self.slots[index].replace(pet)
    }

    pub(crate) fn take(&mut self, index: usize) -> Option<PetConfig> {
        self.slots[index].take()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }
}

impl Default for PetQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Option<PetConfig>>> for PetQueue {
    fn from(mut slots: Vec<Option<PetConfig>>) -> Self {
        if slots.len() != QUEUE_SLOTS {
            log::warn!(
                "Pet queue has {} slots, coercing to {QUEUE_SLOTS}",
                slots.len()
            );
            slots.resize(QUEUE_SLOTS, None);
        }
        let mut queue = PetQueue::new();
        for (index, slot) in slots.into_iter().enumerate() {
            queue.slots[index] = slot;
        }
        queue
    }
}

impl Serialize for PetQueue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.slots.iter())
    }
}

/// The whole session state. One instance per session, owned by PetQueueStore.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineState {
    pub config_name: String,
    pub pet_queue: PetQueue,
    /// If set, names a pet currently in `pet_queue`.
    pub active_pet_id: Option<PetId>,
    pub calculation_params: CalculationParams,
    pub total_damage: f64,
}

impl EngineState {
    pub fn new(calculation_params: CalculationParams) -> Self {
        Self {
            config_name: String::new(),
            pet_queue: PetQueue::new(),
            active_pet_id: None,
            calculation_params,
            total_damage: 0.0,
        }
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new(CalculationParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_queue_is_padded_to_six_slots() {
        let queue: PetQueue = serde_json::from_str(r#"[{"id":"a","raceId":"1001"}, null]"#)
            .expect("short queue deserializes");
        assert_eq!(queue.slots().len(), QUEUE_SLOTS);
        assert_eq!(queue.occupied_count(), 1);
        assert_eq!(queue.get(0).map(|p| p.race_id.as_str()), Some("1001"));
    }

    #[test]
    fn long_queue_is_truncated_to_six_slots() {
        let json = serde_json::to_string(&vec![None::<PetConfig>; 9]).unwrap();
        let queue: PetQueue = serde_json::from_str(&json).unwrap();
        assert_eq!(queue.slots().len(), QUEUE_SLOTS);
    }

    #[test]
    fn missing_params_fall_back_to_defaults() {
        let params: CalculationParams =
            serde_json::from_str(r#"{"panelAttack": 100}"#).unwrap();
        assert_eq!(params.panel_attack, 100.0);
        assert_eq!(params.attribute_level, 6.25);
        assert_eq!(params.skill_segments, 1.0);
        assert_eq!(params.restraint_factor, 1.0);
        assert_eq!(params.boss_defense, 0.0);
    }

    #[test]
    fn params_patch_merges_only_present_fields() {
        let mut params = CalculationParams::default();
        let patch = CalculationParamsPatch {
            panel_attack: Some(300.0),
            skill_segments: Some(3.0),
            ..Default::default()
        };
        patch.apply_to(&mut params);
        assert_eq!(params.panel_attack, 300.0);
        assert_eq!(params.skill_segments, 3.0);
        assert_eq!(params.attribute_level, 6.25, "untouched field changed");
    }

    #[test]
    fn params_patch_skips_non_finite_values() {
        let mut params = CalculationParams::default();
        let patch = CalculationParamsPatch {
            boss_defense: Some(f64::INFINITY),
            skill_power: Some(f64::NAN),
            panel_attack: Some(10.0),
            ..Default::default()
        };
        patch.apply_to(&mut params);
        assert_eq!(params.boss_defense, 0.0);
        assert_eq!(params.skill_power, 0.0);
        assert_eq!(params.panel_attack, 10.0);
    }

    #[test]
    fn explicit_null_final_damage_is_a_clear() {
        let clear: PetConfigPatch = serde_json::from_str(r#"{"finalDamage": null}"#).unwrap();
        assert_eq!(clear.final_damage, Some(None));

        let absent: PetConfigPatch = serde_json::from_str(r#"{"raceId": "x"}"#).unwrap();
        assert_eq!(absent.final_damage, None);
    }
}
