use crate::{ids::IdSource, model::CalculationParams};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Sub-config names offered by "add sub-config", in display order.
pub const DEFAULT_SUB_CONFIG_PRESETS: [&str; 6] = ["星灵", "魂卡", "血脉", "神器", "徽章", "天赋"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcConfig {
    pub sub_config_presets: Vec<String>,
    /// Params every new session starts from.
    pub default_params: CalculationParams,
    /// Reproducible "pet-1", "pet-2", … ids instead of uuids.
    pub sequential_ids: bool,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            sub_config_presets: DEFAULT_SUB_CONFIG_PRESETS.iter().map(|s| s.to_string()).collect(),
            default_params:     CalculationParams::default(),
            sequential_ids:     false,
        }
    }
}

impl CalcConfig {
    /// Load from a JSON file. Omitted fields keep their defaults.
    /// In tests, use CalcConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: CalcConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with sequential ids, so test assertions can name pets.
    pub fn default_test() -> Self {
        Self { sequential_ids: true, ..Self::default() }
    }

    pub fn id_source(&self) -> IdSource {
        if self.sequential_ids {
            IdSource::sequential("id")
        } else {
            IdSource::Random
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.sub_config_presets.is_empty() {
            anyhow::bail!("sub_config_presets must not be empty");
        }
        let mut seen = HashSet::new();
        for name in &self.sub_config_presets {
            if !seen.insert(name.as_str()) {
                anyhow::bail!("Duplicate sub-config preset '{name}'");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = CalcConfig::from_json(r#"{"sequential_ids": true}"#).unwrap();
        assert!(config.sequential_ids);
        assert_eq!(config.sub_config_presets.len(), DEFAULT_SUB_CONFIG_PRESETS.len());
        assert_eq!(config.default_params, CalculationParams::default());
    }

    #[test]
    fn duplicate_presets_are_rejected() {
        let err = CalcConfig::from_json(r#"{"sub_config_presets": ["a", "a"]}"#).unwrap_err();
        assert!(err.to_string().contains("Duplicate"), "unexpected error: {err}");
    }

    #[test]
    fn empty_presets_are_rejected() {
        assert!(CalcConfig::from_json(r#"{"sub_config_presets": []}"#).is_err());
    }

    #[test]
    fn default_params_can_be_overridden() {
        let config =
            CalcConfig::from_json(r#"{"default_params": {"attributeLevel": 7.5}}"#).unwrap();
        assert_eq!(config.default_params.attribute_level, 7.5);
        assert_eq!(config.default_params.skill_segments, 1.0);
    }
}
