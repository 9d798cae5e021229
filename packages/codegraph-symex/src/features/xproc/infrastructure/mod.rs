//! Behavior storage: cache, hardcoded idioms, JSON wire format

pub mod behavior_cache;
pub mod behavior_json;
pub mod hardcoded;

pub use behavior_cache::BehaviorCache;
pub use behavior_json::{from_json, to_json, MethodBehaviorJson, MethodYieldJson};
pub use hardcoded::{
    hardcoded_behavior, is_hardcoded, ILLEGAL_ARGUMENT_EXCEPTION, ILLEGAL_STATE_EXCEPTION,
    PRELOADED_SIGNATURES,
};
