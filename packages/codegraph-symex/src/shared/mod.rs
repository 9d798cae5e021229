//! Shared module - Common types and utilities
//!
//! Types shared across all features.

pub mod models;

// Re-exports for convenience
pub use models::*;
