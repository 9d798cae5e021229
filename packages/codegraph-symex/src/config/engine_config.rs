//! Symbolic execution engine configuration
//!
//! RFC-001: Externalized Settings. Every exploration bound that used to be a hard-coded
//! constant lives here, with a preset-driven default and range validation.

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::io::{ConfigExportV1, EngineConfigPatch, SUPPORTED_VERSIONS};
use super::preset::Preset;
use super::validation::Validatable;

/// Order in which pending exploded-graph nodes are taken from the worklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorklistOrder {
    /// Breadth-first: oldest pending node first
    Fifo,
    /// Depth-first: newest pending node first
    Lifo,
}

impl Default for WorklistOrder {
    fn default() -> Self {
        Self::Fifo
    }
}

/// Exploration bounds and cache settings for one analysis session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worklist steps allowed for one method (1..=10_000_000)
    pub max_steps: usize,

    /// Visits of one program point allowed along one path (1..=100)
    pub max_exec_program_point: usize,

    /// Starting states produced by parameter splits (1..=1_000_000)
    pub max_starting_states: usize,

    /// States produced by one nested boolean constraint (1..=10_000_000)
    pub max_nested_boolean_states: usize,

    /// Relations accumulated by one `resolve_state` query (1..=1_000_000)
    pub max_deduced_relations: usize,

    /// Worklist pops of one `resolve_state` query (1..=10_000_000)
    pub max_relation_iterations: usize,

    /// Constraint count that, past half the step budget, marks the graph as too big
    pub graph_too_big_constraints: usize,

    /// Worklist discipline
    pub worklist_order: WorklistOrder,

    /// Room reserved up front for file-scoped behaviors (1..=1_000_000)
    ///
    /// The cache grows past it: file-scoped entries are only dropped by `cleanup()`.
    pub behavior_cache_capacity: usize,

    /// Preload behaviors for well-known library idioms
    pub hardcoded_behaviors: bool,

    /// Extra signatures (or `Owner#name` prefixes) that are never modeled
    pub blacklist: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: 16_000,
            max_exec_program_point: 2,
            max_starting_states: 1_024,
            max_nested_boolean_states: 10_000,
            max_deduced_relations: 1_000,
            max_relation_iterations: 10_000,
            graph_too_big_constraints: 75,
            worklist_order: WorklistOrder::Fifo,
            behavior_cache_capacity: 10_000,
            hardcoded_behaviors: true,
            blacklist: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Complete configuration for a preset
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                max_steps: 4_000,
                max_exec_program_point: 1,
                max_starting_states: 256,
                max_nested_boolean_states: 2_500,
                max_deduced_relations: 250,
                max_relation_iterations: 2_500,
                behavior_cache_capacity: 2_000,
                ..Self::default()
            },
            Preset::Balanced | Preset::Custom => Self::default(),
            Preset::Thorough => Self {
                max_steps: 64_000,
                max_exec_program_point: 3,
                max_starting_states: 4_096,
                max_nested_boolean_states: 40_000,
                max_deduced_relations: 4_000,
                max_relation_iterations: 40_000,
                graph_too_big_constraints: 150,
                behavior_cache_capacity: 50_000,
                ..Self::default()
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        ConfigError::check_range(
            "max_steps",
            self.max_steps,
            1,
            10_000_000,
            "Exploration needs at least one step",
        )?;
        ConfigError::check_range(
            "max_exec_program_point",
            self.max_exec_program_point,
            1,
            100,
            "Each program point must be executable at least once",
        )?;
        ConfigError::check_range(
            "max_starting_states",
            self.max_starting_states,
            1,
            1_000_000,
            "A method always has one starting state",
        )?;
        ConfigError::check_range(
            "max_nested_boolean_states",
            self.max_nested_boolean_states,
            1,
            10_000_000,
            "Nested boolean splits must be finite",
        )?;
        ConfigError::check_range(
            "max_deduced_relations",
            self.max_deduced_relations,
            1,
            1_000_000,
            "Relation deduction must be bounded",
        )?;
        ConfigError::check_range(
            "max_relation_iterations",
            self.max_relation_iterations,
            1,
            10_000_000,
            "Relation deduction must be bounded",
        )?;
        ConfigError::check_range(
            "graph_too_big_constraints",
            self.graph_too_big_constraints,
            1,
            100_000,
            "Constraint threshold must be positive",
        )?;
        ConfigError::check_range(
            "behavior_cache_capacity",
            self.behavior_cache_capacity,
            1,
            1_000_000,
            "Behavior cache must reserve room for at least one entry",
        )?;

        if let Some(empty) = self.blacklist.iter().find(|s| s.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "blacklist entries must not be blank, got {:?}",
                empty
            )));
        }

        Ok(())
    }

    // ========================================
    // Builder setters
    // ========================================

    /// Builder: Set max_steps
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Builder: Set max_exec_program_point
    pub fn max_exec_program_point(mut self, v: usize) -> Self {
        self.max_exec_program_point = v;
        self
    }

    /// Builder: Set max_starting_states
    pub fn max_starting_states(mut self, v: usize) -> Self {
        self.max_starting_states = v;
        self
    }

    /// Builder: Set max_nested_boolean_states
    pub fn max_nested_boolean_states(mut self, v: usize) -> Self {
        self.max_nested_boolean_states = v;
        self
    }

    /// Builder: Set max_deduced_relations
    pub fn max_deduced_relations(mut self, v: usize) -> Self {
        self.max_deduced_relations = v;
        self
    }

    /// Builder: Set max_relation_iterations
    pub fn max_relation_iterations(mut self, v: usize) -> Self {
        self.max_relation_iterations = v;
        self
    }

    /// Builder: Set worklist_order
    pub fn worklist_order(mut self, v: WorklistOrder) -> Self {
        self.worklist_order = v;
        self
    }

    /// Builder: Set behavior_cache_capacity
    pub fn behavior_cache_capacity(mut self, v: usize) -> Self {
        self.behavior_cache_capacity = v;
        self
    }

    /// Builder: Enable or disable hardcoded behaviors
    pub fn hardcoded_behaviors(mut self, v: bool) -> Self {
        self.hardcoded_behaviors = v;
        self
    }

    /// Builder: Add a blacklist entry
    pub fn blacklist_entry(mut self, signature: impl Into<String>) -> Self {
        self.blacklist.push(signature.into());
        self
    }

    // ========================================
    // YAML I/O
    // ========================================

    /// Load and validate a configuration from a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        if raw.get("version").is_none() {
            return Err(ConfigError::MissingVersion);
        }

        let export: ConfigExportV1 = serde_yaml::from_value(raw)?;
        if !SUPPORTED_VERSIONS.contains(&export.version) {
            return Err(ConfigError::UnsupportedVersion {
                found: export.version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset: Preset = export.preset.parse()?;
        let mut config = Self::preset(preset);
        if let Some(overrides) = export.overrides {
            overrides.apply(&mut config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Export as a versioned YAML document (custom preset + full overrides)
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: 1,
            preset: Preset::Custom.as_str().to_string(),
            overrides: Some(EngineConfigPatch::from(self)),
        };
        Ok(serde_yaml::to_string(&export)?)
    }
}

impl Validatable for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        EngineConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "EngineConfig"
    }
}
