//! Symbolic value infrastructure
//!
//! Static tables backing relation resolution.

pub mod relation_table;
