//! Damage calculation — a pure function of params and a queue snapshot.
//!
//! RULES:
//!   - Never mutates state. Callers apply a DamageOutcome through the
//!     store (see PetQueueStore::calculate).
//!   - Never fails. Missing panel attack or skill power yields an
//!     invalid, all-zero outcome instead of an error.
//!
//! Formula:
//!   single_hit = power_buff * damage_buff * crit_damage_buff * numeric_buff
//!              * panel_attack * skill_power * attribute_level * penetration
//!              * restraint_factor * restraint_multiplier / boss_defense
//!   per_pet    = floor(single_hit * skill_segments), or 0 if not positive
//!                or not finite
//!
//! Every occupied slot receives the same per-pet value. With an empty
//! queue the per-pet value is reported as the total (a preview).

use crate::model::{CalculationParams, PetQueue};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageOutcome {
    pub valid: bool,
    pub per_pet_damage: f64,
    pub total_damage: f64,
    /// Occupied slots in the snapshot the outcome was computed from.
    pub occupied: usize,
}

impl DamageOutcome {
    fn invalid(occupied: usize) -> Self {
        Self { valid: false, per_pet_damage: 0.0, total_damage: 0.0, occupied }
    }
}

pub struct DamageEngine;

impl DamageEngine {
    pub fn compute_damage(params: &CalculationParams, queue: &PetQueue) -> DamageOutcome {
        let occupied = queue.occupied_count();

        // NaN counts as absent, matching a falsy check.
        if !is_set(params.panel_attack) || !is_set(params.skill_power) {
            log::debug!("Damage calculation skipped: panel attack or skill power missing");
            return DamageOutcome::invalid(occupied);
        }

        let per_pet_damage = Self::per_pet_damage(params);
        let total_damage = if occupied == 0 {
            per_pet_damage
        } else {
            per_pet_damage * occupied as f64
        };
        let total_damage = if total_damage.is_finite() { total_damage } else { 0.0 };

        log::debug!(
            "Damage calculated: {per_pet_damage} per pet, {total_damage} total over {occupied} pets"
        );
        DamageOutcome { valid: true, per_pet_damage, total_damage, occupied }
    }

    /// The floored single-pet value, without the validity gate.
    pub fn per_pet_damage(params: &CalculationParams) -> f64 {
        let boss_defense = if params.boss_defense == 0.0 { 1.0 } else { params.boss_defense };

        let single_hit = params.power_buff
            * params.damage_buff
            * params.crit_damage_buff
            * params.numeric_buff
            * params.panel_attack
            * params.skill_power
            * params.attribute_level
            * params.penetration
            * params.restraint_factor
            * params.restraint_multiplier
            / boss_defense;

        // Overflow to infinity (or inf/inf = NaN) counts as no damage.
        let raw_total = single_hit * params.skill_segments;
        if raw_total.is_finite() && raw_total > 0.0 { raw_total.floor() } else { 0.0 }
    }
}

fn is_set(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}
