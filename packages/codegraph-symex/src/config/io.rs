//! Configuration I/O schema (YAML)
//!
//! Defines the versioned YAML document. Loading lives in `engine_config.rs`.

use serde::{Deserialize, Serialize};

use super::engine_config::{EngineConfig, WorklistOrder};

/// Schema versions this crate can read
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    /// Base preset
    pub preset: String,

    /// Fine-grained overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<EngineConfigPatch>,
}

/// Partial engine configuration; every present field replaces the preset value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_exec_program_point: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_starting_states: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_nested_boolean_states: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_deduced_relations: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_relation_iterations: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_too_big_constraints: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub worklist_order: Option<WorklistOrder>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavior_cache_capacity: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardcoded_behaviors: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub blacklist: Option<Vec<String>>,
}

impl EngineConfigPatch {
    /// Apply every present field onto `config`
    pub fn apply(self, config: &mut EngineConfig) {
        if let Some(v) = self.max_steps {
            config.max_steps = v;
        }
        if let Some(v) = self.max_exec_program_point {
            config.max_exec_program_point = v;
        }
        if let Some(v) = self.max_starting_states {
            config.max_starting_states = v;
        }
        if let Some(v) = self.max_nested_boolean_states {
            config.max_nested_boolean_states = v;
        }
        if let Some(v) = self.max_deduced_relations {
            config.max_deduced_relations = v;
        }
        if let Some(v) = self.max_relation_iterations {
            config.max_relation_iterations = v;
        }
        if let Some(v) = self.graph_too_big_constraints {
            config.graph_too_big_constraints = v;
        }
        if let Some(v) = self.worklist_order {
            config.worklist_order = v;
        }
        if let Some(v) = self.behavior_cache_capacity {
            config.behavior_cache_capacity = v;
        }
        if let Some(v) = self.hardcoded_behaviors {
            config.hardcoded_behaviors = v;
        }
        if let Some(v) = self.blacklist {
            config.blacklist = v;
        }
    }
}

impl From<&EngineConfig> for EngineConfigPatch {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_steps: Some(config.max_steps),
            max_exec_program_point: Some(config.max_exec_program_point),
            max_starting_states: Some(config.max_starting_states),
            max_nested_boolean_states: Some(config.max_nested_boolean_states),
            max_deduced_relations: Some(config.max_deduced_relations),
            max_relation_iterations: Some(config.max_relation_iterations),
            graph_too_big_constraints: Some(config.graph_too_big_constraints),
            worklist_order: Some(config.worklist_order),
            behavior_cache_capacity: Some(config.behavior_cache_capacity),
            hardcoded_behaviors: Some(config.hardcoded_behaviors),
            blacklist: Some(config.blacklist.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_patch_is_noop() {
        let mut config = EngineConfig::default();
        EngineConfigPatch::default().apply(&mut config);
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_unknown_override_field_rejected() {
        let yaml = "version: 1\npreset: fast\noverrides:\n  max_stepz: 3\n";
        let parsed: Result<ConfigExportV1, _> = serde_yaml::from_str(yaml);
        assert!(parsed.is_err());
    }
}
