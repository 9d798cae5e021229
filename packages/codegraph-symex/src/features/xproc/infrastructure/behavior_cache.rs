//! Behavior cache
//!
//! Memoizes method behaviors by signature for one analysis session.
//!
//! # Features
//!
//! - **File-scoped entries**: created while exploring a file, kept until `cleanup()`.
//!   Entries are never evicted mid-file: an in-progress entry is what stops recursion
//! - **Hardcoded entries**: library idioms, persistent across files
//! - **Precomputed entries**: loaded from the JSON wire format, persistent across files
//! - **Blacklist**: built-in and configured signatures are never modeled nor cached
//! - **In-progress entries**: an empty, incomplete behavior is stored before a method is
//!   explored, so recursive calls see it instead of exploring again
//!
//! ## Lookup order
//!
//! ```text
//! get(signature)
//!   ├── blacklisted         -> None
//!   ├── hardcoded           -> persistent entry
//!   ├── precomputed         -> persistent entry
//!   ├── cached / in progress -> file-scoped entry (hit)
//!   └── modelable in model  -> explore, store, return (miss)
//! ```

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

use super::behavior_json;
use super::hardcoded::{hardcoded_behavior, PRELOADED_SIGNATURES};
use crate::config::EngineConfig;
use crate::errors::Result;
use crate::features::checks::CheckerDispatcher;
use crate::features::exploded_graph::ExplodedGraphWalker;
use crate::features::xproc::domain::MethodBehavior;
use crate::shared::models::{MethodSignature, MethodSymbol, SemanticModel};

/// Methods whose exploration says nothing useful to callers
static BUILTIN_BLACKLIST: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "java.lang.Object#wait",
        "java.lang.Object#notify",
        "java.lang.Object#notifyAll",
        "java.lang.Thread#sleep",
        "java.lang.System#exit",
    ]
});

/// Whether `signature` matches a blacklist entry, exactly or by its `Owner#name` prefix
fn matches_entry(signature: &str, entry: &str) -> bool {
    signature == entry || signature.split('(').next() == Some(entry)
}

pub struct BehaviorCache {
    config: Arc<EngineConfig>,
    behaviors: FxHashMap<String, Arc<MethodBehavior>>,
    hardcoded: FxHashMap<String, Arc<MethodBehavior>>,
    precomputed: FxHashMap<String, Arc<MethodBehavior>>,
    hits: usize,
    misses: usize,
}

impl BehaviorCache {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_shared_config(Arc::new(config))
    }

    pub fn with_shared_config(config: Arc<EngineConfig>) -> Self {
        let behaviors = FxHashMap::with_capacity_and_hasher(
            config.behavior_cache_capacity,
            Default::default(),
        );
        let mut cache = Self {
            config,
            behaviors,
            hardcoded: FxHashMap::default(),
            precomputed: FxHashMap::default(),
            hits: 0,
            misses: 0,
        };
        if cache.config.hardcoded_behaviors {
            cache.preload_hardcoded();
        }
        cache
    }

    fn preload_hardcoded(&mut self) {
        for raw in PRELOADED_SIGNATURES {
            let Ok(signature) = MethodSignature::parse(raw) else {
                continue;
            };
            if let Some(behavior) = hardcoded_behavior(&signature) {
                self.hardcoded.insert(raw.to_string(), Arc::new(behavior));
            }
        }
        debug!("Preloaded {} hardcoded behaviors", self.hardcoded.len());
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn shared_config(&self) -> Arc<EngineConfig> {
        Arc::clone(&self.config)
    }

    pub fn is_blacklisted(&self, signature: &str) -> bool {
        BUILTIN_BLACKLIST
            .iter()
            .copied()
            .chain(self.config.blacklist.iter().map(String::as_str))
            .any(|entry| matches_entry(signature, entry))
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Behavior of `signature`, exploring the method when the model allows it
    pub fn get(
        &mut self,
        signature: &str,
        model: &SemanticModel,
        dispatcher: &mut CheckerDispatcher,
    ) -> Option<Arc<MethodBehavior>> {
        if self.is_blacklisted(signature) {
            return None;
        }
        if let Some(persistent) = self.persistent(signature) {
            return Some(persistent);
        }
        // Dynamic dispatch: the explored body may not be the one invoked
        let unmodelable = model
            .method_by_signature(signature)
            .and_then(|id| model.method(id))
            .is_some_and(|m| !m.can_be_modeled());
        if unmodelable {
            return None;
        }
        if let Some(cached) = self.behaviors.get(signature) {
            self.hits += 1;
            return Some(Arc::clone(cached));
        }
        self.misses += 1;
        self.compute(signature, model, dispatcher)
    }

    /// Known behavior of `signature`; never explores
    pub fn peek(&self, signature: &str) -> Option<Arc<MethodBehavior>> {
        if self.is_blacklisted(signature) {
            return None;
        }
        self.hardcoded
            .get(signature)
            .or_else(|| self.precomputed.get(signature))
            .or_else(|| self.behaviors.get(signature))
            .cloned()
            .or_else(|| self.match_hardcoded(signature).map(Arc::new))
    }

    fn persistent(&mut self, signature: &str) -> Option<Arc<MethodBehavior>> {
        if let Some(found) = self
            .hardcoded
            .get(signature)
            .or_else(|| self.precomputed.get(signature))
        {
            return Some(Arc::clone(found));
        }
        // Overloads of hardcoded families are materialized on first use
        let behavior = Arc::new(self.match_hardcoded(signature)?);
        self.hardcoded
            .insert(signature.to_string(), Arc::clone(&behavior));
        Some(behavior)
    }

    fn match_hardcoded(&self, signature: &str) -> Option<MethodBehavior> {
        if !self.config.hardcoded_behaviors {
            return None;
        }
        hardcoded_behavior(&MethodSignature::parse(signature).ok()?)
    }

    fn compute(
        &mut self,
        signature: &str,
        model: &SemanticModel,
        dispatcher: &mut CheckerDispatcher,
    ) -> Option<Arc<MethodBehavior>> {
        let method_id = model.method_by_signature(signature)?;
        if !model.method(method_id)?.can_be_modeled() {
            return None;
        }
        debug!("Computing behavior of {}", signature);
        // The caller's checks are mid-exploration
        let mut nested = dispatcher.nested();
        let outcome = ExplodedGraphWalker::new(self, &mut nested, model).explore(method_id);
        dispatcher.absorb(nested);
        if let Err(error) = outcome {
            debug!("Exploration of {} failed: {}", signature, error);
        }
        self.behaviors.get(signature).cloned()
    }

    // ========================================================================
    // File-scoped entries
    // ========================================================================

    /// Entry for `method`, inserting an empty in-progress behavior when absent
    pub fn method_behavior_for_symbol(&mut self, method: &MethodSymbol) -> Arc<MethodBehavior> {
        let key = method.signature.as_str();
        if let Some(existing) = self.behaviors.get(key) {
            return Arc::clone(existing);
        }
        let behavior = Arc::new(MethodBehavior::for_method(method));
        self.behaviors.insert(key.to_string(), Arc::clone(&behavior));
        behavior
    }

    /// Replace the entry of an explored method
    pub(crate) fn store(&mut self, behavior: MethodBehavior) {
        let key = behavior.signature().as_str().to_string();
        self.behaviors.insert(key, Arc::new(behavior));
    }

    /// Drop every file-scoped entry; hardcoded and precomputed entries stay
    pub fn cleanup(&mut self) {
        debug!("Discarding {} file-scoped behaviors", self.behaviors.len());
        self.behaviors.clear();
    }

    /// Signatures of the file-scoped entries, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.behaviors.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// File-scoped behaviors, sorted by signature
    pub fn behaviors(&self) -> Vec<Arc<MethodBehavior>> {
        let mut behaviors: Vec<Arc<MethodBehavior>> = self.behaviors.values().cloned().collect();
        behaviors.sort_by(|a, b| a.signature().as_str().cmp(b.signature().as_str()));
        behaviors
    }

    pub fn hardcoded_behaviors(&self) -> impl Iterator<Item = &MethodBehavior> {
        self.hardcoded.values().map(|b| b.as_ref())
    }

    // ========================================================================
    // Precomputed entries
    // ========================================================================

    /// Load behaviors from the JSON wire format; returns how many were added
    pub fn load_precomputed(&mut self, json: &str) -> Result<usize> {
        let behaviors = behavior_json::from_json(json)?;
        let count = behaviors.len();
        for behavior in behaviors {
            self.precomputed.insert(
                behavior.signature().as_str().to_string(),
                Arc::new(behavior),
            );
        }
        debug!("Loaded {} precomputed behaviors", count);
        Ok(count)
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Hit rate of file-scoped lookups (0.0-1.0)
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }

    pub fn stats(&self) -> String {
        format!(
            "Behaviors: {} entries, {} hardcoded, {} precomputed, {} hits, {} misses, {:.2}% hit rate",
            self.len(),
            self.hardcoded.len(),
            self.precomputed.len(),
            self.hits,
            self.misses,
            self.hit_rate() * 100.0
        )
    }
}

impl std::fmt::Debug for BehaviorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IS_NULL: &str = "java.util.Objects#isNull(Ljava/lang/Object;)Z";

    #[test]
    fn test_blacklist() {
        let cache = BehaviorCache::new(EngineConfig::default().blacklist_entry("com.acme.Lock#acquire"));
        assert!(cache.is_blacklisted("java.lang.Object#wait(J)V"));
        assert!(cache.is_blacklisted("java.lang.System#exit(I)V"));
        assert!(cache.is_blacklisted("com.acme.Lock#acquire()V"));
        assert!(!cache.is_blacklisted("com.acme.Lock#acquireAll()V"));
        assert!(!cache.is_blacklisted("java.lang.Object#toString()Ljava/lang/String;"));
    }

    #[test]
    fn test_hardcoded_survive_cleanup() {
        let mut cache = BehaviorCache::new(EngineConfig::default());
        let model = SemanticModel::new();
        let mut dispatcher = CheckerDispatcher::empty();

        let behavior = cache.get(IS_NULL, &model, &mut dispatcher).unwrap();
        assert!(behavior.is_complete());
        assert_eq!(cache.misses(), 0);

        // Overload outside the preloaded list
        let overload = "java.util.Objects#requireNonNull(Ljava/lang/Object;Ljava/util/function/Supplier;)Ljava/lang/Object;";
        assert!(cache.peek(overload).is_some());
        assert!(cache.get(overload, &model, &mut dispatcher).is_some());

        cache.cleanup();
        assert!(cache.peek(IS_NULL).is_some());
        assert!(cache.peek(overload).is_some());
    }

    #[test]
    fn test_hardcoded_can_be_disabled() {
        let cache = BehaviorCache::new(EngineConfig::default().hardcoded_behaviors(false));
        assert!(cache.peek(IS_NULL).is_none());
        assert_eq!(cache.hardcoded_behaviors().count(), 0);
    }

    #[test]
    fn test_unknown_methods_are_not_cached() {
        let mut cache = BehaviorCache::new(EngineConfig::default());
        let model = SemanticModel::new();
        let mut dispatcher = CheckerDispatcher::empty();

        assert!(cache.get("A#unknown()V", &model, &mut dispatcher).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hit_rate(), 0.0);
    }

    #[test]
    fn test_in_progress_entry() {
        let mut cache = BehaviorCache::new(EngineConfig::default());
        let method = MethodSymbol::new("A#m(Ljava/lang/Object;)V").unwrap();

        let in_progress = cache.method_behavior_for_symbol(&method);
        assert!(!in_progress.is_complete());
        assert!(in_progress.yields().is_empty());
        assert_eq!(cache.keys(), vec!["A#m(Ljava/lang/Object;)V".to_string()]);

        let again = cache.method_behavior_for_symbol(&method);
        assert!(Arc::ptr_eq(&in_progress, &again));
    }

    #[test]
    fn test_entries_outlive_initial_capacity() {
        let mut cache = BehaviorCache::new(EngineConfig::default().behavior_cache_capacity(1));
        let first = cache.method_behavior_for_symbol(&MethodSymbol::new("A#c()V").unwrap());
        for raw in ["A#a()V", "A#b()V"] {
            cache.method_behavior_for_symbol(&MethodSymbol::new(raw).unwrap());
        }
        assert_eq!(cache.keys(), vec!["A#a()V", "A#b()V", "A#c()V"]);
        assert!(Arc::ptr_eq(&first, &cache.peek("A#c()V").unwrap()));

        cache.cleanup();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_precomputed() {
        let mut cache = BehaviorCache::new(EngineConfig::default());
        let json = r#"[{"signature": "org.lib.Util#check(Ljava/lang/Object;)V", "varArgs": false,
            "yields": [{"parametersConstraints": [["NOT_NULL"]], "resultIndex": -1}]}]"#;
        assert_eq!(cache.load_precomputed(json).unwrap(), 1);

        cache.cleanup();
        let behavior = cache.peek("org.lib.Util#check(Ljava/lang/Object;)V").unwrap();
        assert!(behavior.is_complete());
        assert_eq!(behavior.yields().len(), 1);
        assert!(cache.stats().contains("1 precomputed"));
    }
}
