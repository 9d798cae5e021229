//! Symbolic value domain models

pub mod binary_relation;
pub mod relation_kind;
pub mod symbolic_value;

pub use binary_relation::{BinaryRelation, RelationLimits};
pub use relation_kind::{RelationKind, RelationState};
pub use symbolic_value::{
    SymbolicValue, SymbolicValueId, SymbolicValueKind, FALSE_LITERAL_ID, FIRST_FREE_ID,
    NULL_LITERAL_ID, TRUE_LITERAL_ID,
};
