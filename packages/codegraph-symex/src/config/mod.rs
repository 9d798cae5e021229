//! Engine configuration
//!
//! RFC-001: Externalized Settings for the symbolic execution engine.
//!
//! - Level 1: Preset - one-liner
//! - Level 2: Builder setters - partial adjustment
//! - Level 3: YAML - complete control
//!
//! # Examples
//!
//! ```rust,ignore
//! use codegraph_symex::config::{EngineConfig, Preset};
//!
//! let config = EngineConfig::preset(Preset::Fast);
//! let config = EngineConfig::default().max_steps(50_000).max_exec_program_point(3);
//! let config = EngineConfig::from_yaml_file("symex.yaml")?;
//! ```

pub mod engine_config;
pub mod error;
pub mod io;
pub mod preset;
pub mod validation;

// Re-exports
pub use engine_config::{EngineConfig, WorklistOrder};
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, EngineConfigPatch};
pub use preset::Preset;
pub use validation::{Validatable, ValidatableCollection};
