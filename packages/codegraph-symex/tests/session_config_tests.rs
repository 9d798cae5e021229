//! Sessions configured from YAML files

mod common;

use codegraph_symex::config::ConfigError;
use codegraph_symex::shared::models::SemanticModel;
use codegraph_symex::{AnalysisSession, EngineConfig, Interruption, Preset, SymexError};
use common::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn yaml_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn test_session_from_yaml_file() {
    let file = yaml_file(
        "version: 1\npreset: balanced\noverrides:\n  max_steps: 3\n  blacklist:\n    - \"com.acme.Cycle#pong\"\n",
    );
    let config = EngineConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.max_steps, 3);

    let mut model = SemanticModel::new();
    fixture_null_or_flag(&mut model);
    fixture_ping_pong(&mut model);

    let mut session = AnalysisSession::new(config).unwrap();
    assert!(session.behavior_cache().is_blacklisted(PONG));
    let report = session.analyze(&model);

    assert_eq!(
        report.exploration(NULL_OR_FLAG).unwrap().interruption,
        Some(Interruption::MaxSteps)
    );
    assert!(report.exploration(PONG).is_none());
}

#[test]
fn test_preset_round_trip_through_file() {
    let config = EngineConfig::preset(Preset::Fast).max_exec_program_point(3);
    let file = yaml_file(&config.to_yaml().unwrap());
    assert_eq!(EngineConfig::from_yaml_file(file.path()).unwrap(), config);
}

#[test]
fn test_invalid_file_is_rejected() {
    let file = yaml_file("version: 1\npreset: balanced\noverrides:\n  max_steps: 0\n");
    let err = EngineConfig::from_yaml_file(file.path()).unwrap_err();
    assert!(!matches!(err, ConfigError::Io(_)));

    let invalid = EngineConfig::default().behavior_cache_capacity(0);
    assert!(matches!(
        AnalysisSession::new(invalid),
        Err(SymexError::Config(_))
    ));
}
