//! Cross-procedural domain models

pub mod method_behavior;
pub mod method_yield;

pub use method_behavior::MethodBehavior;
pub use method_yield::{MethodYield, YieldKind, FRESH_RESULT};
