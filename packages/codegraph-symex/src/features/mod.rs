//! Feature modules
//!
//! Each feature contains:
//! - domain/         - Values and states (no exploration logic)
//! - ports/          - Extension traits
//! - infrastructure/ - Engines built on the domain

pub mod symbolic_values;

pub mod constraints;

pub mod program_state;

// Path-sensitive driver
pub mod exploded_graph;

// Method behaviors and the cache shared by call sites
pub mod xproc;

pub mod checks;
