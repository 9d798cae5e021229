//! Configuration validation
//!
//! Provides the `Validatable` trait implemented by every engine config.

use super::error::ConfigResult;

// ═══════════════════════════════════════════════════════════════════════════
// Validatable Trait
// ═══════════════════════════════════════════════════════════════════════════

/// Trait for validatable configuration objects
///
/// # Example
/// ```rust,ignore
/// use codegraph_symex::config::Validatable;
///
/// fn start<C: Validatable>(config: C) -> Result<(), ConfigError> {
///     config.validate()?;
///     // ... run with config
/// }
/// ```
pub trait Validatable {
    /// Validate the configuration
    ///
    /// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid.
    fn validate(&self) -> ConfigResult<()>;

    /// Get the configuration name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}

/// Extension trait for validating collections of configs
pub trait ValidatableCollection {
    /// Validate all configs in collection
    fn validate_all(&self) -> ConfigResult<()>;
}

impl<T: Validatable> ValidatableCollection for Vec<T> {
    fn validate_all(&self) -> ConfigResult<()> {
        for config in self {
            config.validate()?;
        }
        Ok(())
    }
}

impl<T: Validatable> ValidatableCollection for Option<T> {
    fn validate_all(&self) -> ConfigResult<()> {
        if let Some(config) = self {
            config.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{EngineConfig, Preset};
    use super::*;

    #[test]
    fn test_all_presets_validate() {
        let configs = vec![
            EngineConfig::preset(Preset::Fast),
            EngineConfig::preset(Preset::Balanced),
            EngineConfig::preset(Preset::Thorough),
            EngineConfig::preset(Preset::Custom),
        ];
        assert!(configs.validate_all().is_ok());
    }

    #[test]
    fn test_optional_config_validation() {
        let none: Option<EngineConfig> = None;
        assert!(none.validate_all().is_ok());

        let broken = Some(EngineConfig::default().max_steps(0));
        assert!(broken.validate_all().is_err());
    }

    #[test]
    fn test_config_name() {
        assert_eq!(EngineConfig::default().config_name(), "EngineConfig");
    }
}
