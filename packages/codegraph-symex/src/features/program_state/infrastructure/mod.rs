//! Constraint bookkeeping over program states

pub mod constraint_manager;

pub use constraint_manager::{ConstraintManager, DualStates};
