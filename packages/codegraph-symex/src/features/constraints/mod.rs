//! Constraint domains
//!
//! Independent axes of knowledge about a symbolic value (nullness, boolean truth, zeroness,
//! check-defined domains) and the immutable per-value set holding one constraint per axis.

pub mod domain;

pub use domain::*;
