//! Export blob encoding: base64(zlib(JSON(ExportedConfig))).
//!
//! Export refuses states holding NaN or infinite numbers, which JSON would
//! write as `null` and import could not restore.
//!
//! Import decodes layer by layer and reports the first failing stage:
//!   1. base64 (standard alphabet, padded)
//!   2. zlib inflate, including the adler32 checksum
//!   3. JSON text
//!   4. shape: top-level object, `calculationParams` object, `petQueue` array
//!   5. typed decode and pet invariants
//! Nothing is applied to any state here; the store swaps state only
//! after a fully successful import.

use crate::{
    error::{CalcError, CalcResult, DecodeStage},
    model::{EngineState, PetConfig},
    snapshot::ExportedConfig,
    types::{EXPORT_FORMAT_VERSION, MAX_SUB_CONFIGS},
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use serde_json::Value;
use std::collections::HashSet;
use std::io::{Read, Write};

pub struct ConfigSerializer;

impl ConfigSerializer {
    pub fn export(state: &EngineState) -> CalcResult<String> {
        check_finite(state)?;
        let exported = ExportedConfig::capture(state);
        let json = serde_json::to_vec(&exported)
            .map_err(|e| CalcError::Other(anyhow::anyhow!("Cannot serialize export: {e}")))?;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        let compressed = encoder.finish()?;

        let text = STANDARD.encode(compressed);
        log::info!(
            "Exported config '{}' ({} json bytes, {} chars)",
            exported.config_name,
            json.len(),
            text.len()
        );
        Ok(text)
    }

    pub fn import(text: &str) -> CalcResult<ExportedConfig> {
        let compressed = STANDARD
            .decode(text.trim())
            .map_err(|e| CalcError::decode(DecodeStage::Base64, e))?;

        let mut json = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut json)
            .map_err(|e| CalcError::decode(DecodeStage::Inflate, e))?;

        let value: Value = serde_json::from_slice(&json)
            .map_err(|e| CalcError::decode(DecodeStage::Json, e))?;

        check_shape(&value)?;
        check_version(&value)?;

        let exported: ExportedConfig = serde_json::from_value(value)
            .map_err(|e| CalcError::validation(format!("Malformed export: {e}")))?;

        check_pets(exported.pet_queue.pets())?;

        log::info!(
            "Imported config '{}' with {} pets",
            exported.config_name,
            exported.pet_queue.occupied_count()
        );
        Ok(exported)
    }
}

fn check_finite(state: &EngineState) -> CalcResult<()> {
    let p = &state.calculation_params;
    let params = [
        ("powerBuff", p.power_buff),
        ("damageBuff", p.damage_buff),
        ("critDamageBuff", p.crit_damage_buff),
        ("numericBuff", p.numeric_buff),
        ("panelAttack", p.panel_attack),
        ("skillPower", p.skill_power),
        ("attributeLevel", p.attribute_level),
        ("penetration", p.penetration),
        ("restraintFactor", p.restraint_factor),
        ("restraintMultiplier", p.restraint_multiplier),
        ("bossDefense", p.boss_defense),
        ("skillSegments", p.skill_segments),
    ];
    if let Some((name, value)) = params.iter().find(|(_, v)| !v.is_finite()) {
        return Err(CalcError::validation(format!(
            "calculationParams.{name} is {value}, not a finite number"
        )));
    }
    for pet in state.pet_queue.pets() {
        if let Some(damage) = pet.final_damage.filter(|d| !d.is_finite()) {
            return Err(CalcError::validation(format!(
                "Pet {} finalDamage is {damage}, not a finite number",
                pet.id
            )));
        }
    }
    Ok(())
}

fn check_shape(value: &Value) -> CalcResult<()> {
    let object = value
        .as_object()
        .ok_or_else(|| CalcError::validation("Export is not a JSON object"))?;

    match object.get("calculationParams") {
        Some(Value::Object(_)) => {}
        Some(_) => return Err(CalcError::validation("calculationParams is not an object")),
        None => return Err(CalcError::validation("calculationParams is missing")),
    }

    match object.get("petQueue") {
        Some(Value::Array(_)) => {}
        Some(_) => return Err(CalcError::validation("petQueue is not an array")),
        None => return Err(CalcError::validation("petQueue is missing")),
    }

    Ok(())
}

fn check_version(value: &Value) -> CalcResult<()> {
    let found = match value.get("version") {
        None => return Ok(()),
        Some(v) => v
            .as_u64()
            .ok_or_else(|| CalcError::validation("version is not an unsigned integer"))?,
    };
    if found > u64::from(EXPORT_FORMAT_VERSION) {
        return Err(CalcError::UnsupportedVersion {
            found:     u32::try_from(found).unwrap_or(u32::MAX),
            supported: EXPORT_FORMAT_VERSION,
        });
    }
    Ok(())
}

fn check_pets<'a>(pets: impl Iterator<Item = &'a PetConfig>) -> CalcResult<()> {
    let mut pet_ids = HashSet::new();
    for pet in pets {
        if !pet_ids.insert(pet.id.as_str()) {
            return Err(CalcError::validation(format!("Duplicate pet id {}", pet.id)));
        }
        if pet.sub_configs.len() > MAX_SUB_CONFIGS {
            return Err(CalcError::validation(format!(
                "Pet {} has {} sub-configs (max {MAX_SUB_CONFIGS})",
                pet.id,
                pet.sub_configs.len()
            )));
        }
        let mut names = HashSet::new();
        for entry in &pet.sub_configs {
            if !names.insert(entry.name.as_str()) {
                return Err(CalcError::validation(format!(
                    "Pet {} has duplicate sub-config name '{}'",
                    pet.id, entry.name
                )));
            }
        }
    }
    Ok(())
}
