/*
 * Codegraph SymEx - Path-Sensitive Symbolic Execution Engine
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Semantic model slice (arena handles, signatures, CFG IR, liveness)
 * - features/    : Vertical slices (symbolic values → constraints → program state
 *                  → exploded graph → xproc behaviors → checks)
 * - session      : Explicit analysis context owning the behavior cache
 *
 * Engine:
 * - Relation algebra with bounded transitive deduction
 * - Persistent (copy-on-write) program states
 * - Cross-procedural method behaviors cached per file
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Call application threads the whole exploration context
#![allow(clippy::type_complexity)] // Operand zeroness pairs
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::len_without_is_empty)] // Collections expose len only where meaningful

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Semantic model slice consumed by the engine
pub mod shared;

/// Feature modules (relation algebra up to checks)
pub mod features;

/// Configuration system (RFC-001)
pub mod config;

/// Error types
pub mod errors;

/// Analysis session (explicit context, no global state)
pub mod session;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{EngineConfig, Preset, WorklistOrder};
pub use errors::{Result, SymexError};
pub use session::{AnalysisReport, AnalysisSession};

pub use features::checks::{
    CheckerContext, CheckerDispatcher, DivisionByZeroCheck, Finding, NullDereferenceCheck,
    SeCheck,
};
pub use features::constraints::{Constraint, ConstraintDomain, ConstraintsByDomain};
pub use features::exploded_graph::{
    ExplodedGraphWalker, ExplorationOutcome, Interruption, ProgramPoint,
};
pub use features::program_state::{ConstraintManager, ProgramState};
pub use features::symbolic_values::{
    BinaryRelation, RelationKind, RelationLimits, RelationState, SymbolicValue,
};
pub use features::xproc::{BehaviorCache, MethodBehavior, MethodYield, YieldKind};
