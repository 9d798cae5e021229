//! Error types for codegraph-symex
//!
//! Provides unified error handling across the crate.
//!
//! Bound conditions (`TransitiveRelationExceeded`, `MaxStepsReached`, ...) abort one unit of
//! work and are absorbed inside the engine. Only configuration, serialization and IO errors
//! are expected to reach callers of the public API.

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for codegraph-symex operations
#[derive(Debug, Error)]
pub enum SymexError {
    /// Relation deduction grew past its configured bound
    #[error("Transitive relation limit exceeded: {relations} relations after {iterations} iterations")]
    TransitiveRelationExceeded { relations: usize, iterations: usize },

    /// Method exploration used its whole step budget
    #[error("Reached limit of {steps} steps for method {method}")]
    MaxStepsReached { method: String, steps: usize },

    /// Exploded graph is too big to finish within the step budget
    #[error("Exploded graph too big for method {method} after {steps} steps")]
    ExplodedGraphTooBig { method: String, steps: usize },

    /// Too many states produced by one nested boolean constraint
    #[error("Too many nested boolean states (limit {limit})")]
    TooManyNestedBooleanStates { limit: usize },

    /// Too many starting states for a method
    #[error("Too many starting states for method {method}: {count} > {limit}")]
    MaxStartingStates {
        method: String,
        count: usize,
        limit: usize,
    },

    /// Signature string not in `Owner#name(Descriptors)Return` form
    #[error("Invalid method signature: {0}")]
    InvalidSignature(String),

    /// Method body inconsistent with the instruction semantics
    #[error("Malformed body for method {method}: {reason}")]
    MalformedBody { method: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SymexError {
    /// Create a malformed-body error
    pub fn malformed(method: impl Into<String>, reason: impl Into<String>) -> Self {
        SymexError::MalformedBody {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-signature error
    pub fn invalid_signature(signature: impl Into<String>) -> Self {
        SymexError::InvalidSignature(signature.into())
    }

    /// True for the conditions that abandon a unit of work instead of failing it
    pub fn is_exploration_bound(&self) -> bool {
        matches!(
            self,
            SymexError::TransitiveRelationExceeded { .. }
                | SymexError::MaxStepsReached { .. }
                | SymexError::ExplodedGraphTooBig { .. }
                | SymexError::TooManyNestedBooleanStates { .. }
                | SymexError::MaxStartingStates { .. }
        )
    }
}

/// Result type alias for symbolic execution operations
pub type Result<T> = std::result::Result<T, SymexError>;
