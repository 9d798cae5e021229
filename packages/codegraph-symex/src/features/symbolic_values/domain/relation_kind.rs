//! Relation kinds and resolution outcomes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison between two symbolic values
///
/// `GreaterThan` and `LessThanOrEqual` never survive construction of a relation: they are
/// rewritten to `LessThan` / `GreaterThanOrEqual` with swapped operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    MethodEquals,
    NotMethodEquals,
}

impl RelationKind {
    pub const ALL: [RelationKind; 8] = [
        RelationKind::Equal,
        RelationKind::NotEqual,
        RelationKind::LessThan,
        RelationKind::GreaterThan,
        RelationKind::LessThanOrEqual,
        RelationKind::GreaterThanOrEqual,
        RelationKind::MethodEquals,
        RelationKind::NotMethodEquals,
    ];

    /// Logical negation
    pub fn inverse(self) -> Self {
        match self {
            RelationKind::Equal => RelationKind::NotEqual,
            RelationKind::NotEqual => RelationKind::Equal,
            RelationKind::LessThan => RelationKind::GreaterThanOrEqual,
            RelationKind::GreaterThanOrEqual => RelationKind::LessThan,
            RelationKind::GreaterThan => RelationKind::LessThanOrEqual,
            RelationKind::LessThanOrEqual => RelationKind::GreaterThan,
            RelationKind::MethodEquals => RelationKind::NotMethodEquals,
            RelationKind::NotMethodEquals => RelationKind::MethodEquals,
        }
    }

    /// Kind that holds for swapped operands
    pub fn symmetric(self) -> Self {
        match self {
            RelationKind::LessThan => RelationKind::GreaterThan,
            RelationKind::GreaterThan => RelationKind::LessThan,
            RelationKind::LessThanOrEqual => RelationKind::GreaterThanOrEqual,
            RelationKind::GreaterThanOrEqual => RelationKind::LessThanOrEqual,
            other => other,
        }
    }

    /// Canonical kind and whether operands must be swapped to reach it
    pub fn normalize(self) -> (Self, bool) {
        match self {
            RelationKind::GreaterThan | RelationKind::LessThanOrEqual => (self.symmetric(), true),
            other => (other, false),
        }
    }

    pub fn is_canonical(self) -> bool {
        !matches!(self, RelationKind::GreaterThan | RelationKind::LessThanOrEqual)
    }

    /// `==` and `.equals()`: constraints flow unchanged between operands
    pub fn is_equality(self) -> bool {
        matches!(self, RelationKind::Equal | RelationKind::MethodEquals)
    }

    /// Operand order carries no meaning
    pub fn is_unordered(self) -> bool {
        matches!(
            self,
            RelationKind::Equal
                | RelationKind::NotEqual
                | RelationKind::MethodEquals
                | RelationKind::NotMethodEquals
        )
    }

    pub fn operator(self) -> &'static str {
        match self {
            RelationKind::Equal => "==",
            RelationKind::NotEqual => "!=",
            RelationKind::LessThan => "<",
            RelationKind::GreaterThan => ">",
            RelationKind::LessThanOrEqual => "<=",
            RelationKind::GreaterThanOrEqual => ">=",
            RelationKind::MethodEquals => ".EQ.",
            RelationKind::NotMethodEquals => ".NE.",
        }
    }

    /// Name used in diagnostics and serialized data
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Equal => "EQUAL",
            RelationKind::NotEqual => "NOT_EQUAL",
            RelationKind::LessThan => "LESS_THAN",
            RelationKind::GreaterThan => "GREATER_THAN",
            RelationKind::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            RelationKind::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            RelationKind::MethodEquals => "METHOD_EQUALS",
            RelationKind::NotMethodEquals => "NOT_METHOD_EQUALS",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking a relation against known facts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationState {
    Fulfilled,
    Unfulfilled,
    Undetermined,
}

impl RelationState {
    pub fn is_determined(self) -> bool {
        self != RelationState::Undetermined
    }

    /// Whether forcing the relation to `value` contradicts this state
    pub fn rejects(self, value: bool) -> bool {
        match self {
            RelationState::Fulfilled => !value,
            RelationState::Unfulfilled => value,
            RelationState::Undetermined => false,
        }
    }

    pub fn invert(self) -> Self {
        match self {
            RelationState::Fulfilled => RelationState::Unfulfilled,
            RelationState::Unfulfilled => RelationState::Fulfilled,
            RelationState::Undetermined => RelationState::Undetermined,
        }
    }
}
