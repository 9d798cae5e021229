//! Shared models
//!
//! The slice of the semantic model the engine consumes: arena handles, signatures,
//! method bodies as control flow graphs, and the analyses derived from them.

pub mod cfg;
pub mod fold;
pub mod ids;
pub mod liveness;
pub mod semantic_model;
pub mod signature;

pub use cfg::{
    ArithmeticOp, Block, CatchHandler, CfgBuilder, ControlFlowGraph, Instruction, Invocation,
    Literal, LogicalOp, Terminator,
};
pub use fold::{CfgFolder, SymbolSubstitution};
pub use ids::{BlockId, MethodId, SymbolId};
pub use liveness::LiveVariables;
pub use semantic_model::{
    MethodFlags, MethodSymbol, Nullability, SemanticModel, Symbol, SymbolKind, Usage,
};
pub use signature::{MethodSignature, TypeDescriptor};
