//! Analysis session
//!
//! Explicit context for analyzing one source file after another. The session owns the
//! behavior cache and the checker dispatcher; nothing in the engine is process-wide.
//!
//! ```text
//! AnalysisSession::new(config)        validate, preload hardcoded behaviors
//!   └── analyze(model)                one file
//!         ├── explore each method with a body (callees on demand through the cache)
//!         ├── collect behaviors + findings
//!         └── cleanup()               drop file-scoped behaviors
//! ```

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::features::checks::{CheckerDispatcher, Finding};
use crate::features::exploded_graph::{ExplodedGraphWalker, ExplorationOutcome};
use crate::features::xproc::{BehaviorCache, MethodBehavior};
use crate::shared::models::SemanticModel;

/// Result of analyzing one file
#[derive(Debug, Default)]
pub struct AnalysisReport {
    /// Behaviors computed for the file, most recently used first
    pub behaviors: Vec<Arc<MethodBehavior>>,
    pub findings: Vec<Finding>,
    /// Explorations started by the session itself, in model order
    pub explorations: Vec<(String, ExplorationOutcome)>,
}

impl AnalysisReport {
    pub fn behavior(&self, signature: &str) -> Option<&Arc<MethodBehavior>> {
        self.behaviors
            .iter()
            .find(|b| b.signature().as_str() == signature)
    }

    pub fn exploration(&self, signature: &str) -> Option<&ExplorationOutcome> {
        self.explorations
            .iter()
            .find(|(s, _)| s == signature)
            .map(|(_, outcome)| outcome)
    }
}

pub struct AnalysisSession {
    config: Arc<EngineConfig>,
    cache: BehaviorCache,
    dispatcher: CheckerDispatcher,
}

impl AnalysisSession {
    /// Session running the default checks
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_dispatcher(config, CheckerDispatcher::with_default_checks())
    }

    pub fn with_dispatcher(config: EngineConfig, dispatcher: CheckerDispatcher) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        Ok(Self {
            cache: BehaviorCache::with_shared_config(Arc::clone(&config)),
            config,
            dispatcher,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze every method body of `model`, then drop file-scoped behaviors
    pub fn analyze(&mut self, model: &SemanticModel) -> AnalysisReport {
        let mut explorations = Vec::new();
        for (method_id, method) in model.methods() {
            if method.body.is_none() {
                continue;
            }
            let signature = method.signature.as_str();
            if self.cache.is_blacklisted(signature) {
                continue;
            }
            // Already explored on demand from a call site
            if self.cache.peek(signature).is_some_and(|b| b.is_visited()) {
                continue;
            }
            let walker = ExplodedGraphWalker::new(&mut self.cache, &mut self.dispatcher, model);
            match walker.explore(method_id) {
                Ok(outcome) => explorations.push((signature.to_string(), outcome)),
                Err(error) => warn!("Skipping {}: {}", signature, error),
            }
        }

        let report = AnalysisReport {
            behaviors: self.cache.behaviors(),
            findings: self.dispatcher.take_findings(),
            explorations,
        };
        info!(
            "Analyzed {} method(s): {} behavior(s), {} finding(s)",
            report.explorations.len(),
            report.behaviors.len(),
            report.findings.len()
        );
        debug!("{}", self.cache.stats());
        self.cache.cleanup();
        report
    }

    pub fn behavior_cache(&self) -> &BehaviorCache {
        &self.cache
    }

    pub fn behavior_cache_mut(&mut self) -> &mut BehaviorCache {
        &mut self.cache
    }

    pub fn dispatcher(&self) -> &CheckerDispatcher {
        &self.dispatcher
    }

    pub fn peek_method_behavior(&self, signature: &str) -> Option<Arc<MethodBehavior>> {
        self.cache.peek(signature)
    }

    /// Drop file-scoped behaviors without analyzing
    pub fn cleanup(&mut self) {
        self.cache.cleanup();
    }
}

impl std::fmt::Debug for AnalysisSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisSession")
            .field("cache", &self.cache)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = AnalysisSession::new(EngineConfig::default().max_steps(0));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_model() {
        let mut session = AnalysisSession::new(EngineConfig::default()).unwrap();
        let report = session.analyze(&SemanticModel::new());
        assert!(report.behaviors.is_empty());
        assert!(report.findings.is_empty());
        assert!(report.explorations.is_empty());
        assert!(session.behavior_cache().is_empty());
    }
}
