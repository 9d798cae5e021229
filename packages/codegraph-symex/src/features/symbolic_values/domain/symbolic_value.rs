//! Symbolic values
//!
//! A symbolic value is an identity: two values are the same iff they carry the same id.
//! Values are cheap `Arc` handles, freely shared between program states.
//!
//! Ids 0, 1 and 2 are reserved for the protected `null`, `true` and `false` literals, which
//! every state knows about. All other ids come from a `ConstraintManager`.

use once_cell::sync::Lazy;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::binary_relation::BinaryRelation;
use crate::shared::models::LogicalOp;

pub type SymbolicValueId = u32;

pub const NULL_LITERAL_ID: SymbolicValueId = 0;
pub const TRUE_LITERAL_ID: SymbolicValueId = 1;
pub const FALSE_LITERAL_ID: SymbolicValueId = 2;
/// First id handed out for non-literal values
pub const FIRST_FREE_ID: SymbolicValueId = 3;

static NULL_LITERAL: Lazy<SymbolicValue> =
    Lazy::new(|| SymbolicValue::new(NULL_LITERAL_ID, SymbolicValueKind::NullLiteral));
static TRUE_LITERAL: Lazy<SymbolicValue> =
    Lazy::new(|| SymbolicValue::new(TRUE_LITERAL_ID, SymbolicValueKind::TrueLiteral));
static FALSE_LITERAL: Lazy<SymbolicValue> =
    Lazy::new(|| SymbolicValue::new(FALSE_LITERAL_ID, SymbolicValueKind::FalseLiteral));

#[derive(Debug)]
pub enum SymbolicValueKind {
    /// Unknown value with no structure (parameters, call results, loads)
    Plain,
    NullLiteral,
    TrueLiteral,
    FalseLiteral,
    /// Outcome of comparing two values; always canonical
    Relational(BinaryRelation),
    Not(SymbolicValue),
    Logical {
        op: LogicalOp,
        left: SymbolicValue,
        right: SymbolicValue,
    },
    InstanceOf {
        operand: SymbolicValue,
        type_name: String,
    },
    /// Exception in flight; `None` when its type is unknown
    Exceptional { exception_type: Option<String> },
}

#[derive(Debug)]
struct SymbolicValueData {
    id: SymbolicValueId,
    kind: SymbolicValueKind,
}

#[derive(Clone)]
pub struct SymbolicValue(Arc<SymbolicValueData>);

impl SymbolicValue {
    pub(crate) fn new(id: SymbolicValueId, kind: SymbolicValueKind) -> Self {
        Self(Arc::new(SymbolicValueData { id, kind }))
    }

    pub fn null_literal() -> Self {
        NULL_LITERAL.clone()
    }

    pub fn true_literal() -> Self {
        TRUE_LITERAL.clone()
    }

    pub fn false_literal() -> Self {
        FALSE_LITERAL.clone()
    }

    pub fn id(&self) -> SymbolicValueId {
        self.0.id
    }

    pub fn kind(&self) -> &SymbolicValueKind {
        &self.0.kind
    }

    /// One of the three literals every state carries
    pub fn is_protected(&self) -> bool {
        self.0.id < FIRST_FREE_ID
    }

    pub fn relation(&self) -> Option<&BinaryRelation> {
        match &self.0.kind {
            SymbolicValueKind::Relational(relation) => Some(relation),
            _ => None,
        }
    }

    pub fn is_relational(&self) -> bool {
        self.relation().is_some()
    }

    pub fn is_exceptional(&self) -> bool {
        matches!(self.0.kind, SymbolicValueKind::Exceptional { .. })
    }

    /// Exception type of an exceptional value (`None` for unknown types and other values)
    pub fn exception_type(&self) -> Option<&str> {
        match &self.0.kind {
            SymbolicValueKind::Exceptional { exception_type } => exception_type.as_deref(),
            _ => None,
        }
    }

    /// Operands this value was computed from, leaves have none
    pub fn computed_from(&self) -> Vec<SymbolicValue> {
        match &self.0.kind {
            SymbolicValueKind::Relational(relation) => {
                vec![relation.left().clone(), relation.right().clone()]
            }
            SymbolicValueKind::Not(operand) => vec![operand.clone()],
            SymbolicValueKind::Logical { left, right, .. } => vec![left.clone(), right.clone()],
            SymbolicValueKind::InstanceOf { operand, .. } => vec![operand.clone()],
            SymbolicValueKind::Plain
            | SymbolicValueKind::NullLiteral
            | SymbolicValueKind::TrueLiteral
            | SymbolicValueKind::FalseLiteral
            | SymbolicValueKind::Exceptional { .. } => Vec::new(),
        }
    }

    /// Whether `other` is this value or one it was (transitively) computed from
    pub fn references(&self, other: &SymbolicValue) -> bool {
        self == other || self.computed_from().iter().any(|v| v.references(other))
    }
}

impl PartialEq for SymbolicValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for SymbolicValue {}

impl Hash for SymbolicValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl PartialOrd for SymbolicValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SymbolicValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl fmt::Display for SymbolicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            SymbolicValueKind::NullLiteral => f.write_str("SV_NULL"),
            SymbolicValueKind::TrueLiteral => f.write_str("SV_TRUE"),
            SymbolicValueKind::FalseLiteral => f.write_str("SV_FALSE"),
            SymbolicValueKind::Relational(relation) => write!(f, "{}", relation),
            SymbolicValueKind::Not(operand) => write!(f, "!{}", operand),
            SymbolicValueKind::Logical { op, left, right } => {
                let symbol = match op {
                    LogicalOp::And => "&",
                    LogicalOp::Or => "|",
                    LogicalOp::Xor => "^",
                };
                write!(f, "{}{}{}", left, symbol, right)
            }
            SymbolicValueKind::InstanceOf { operand, type_name } => {
                write!(f, "{} instanceof {}", operand, type_name)
            }
            SymbolicValueKind::Plain | SymbolicValueKind::Exceptional { .. } => {
                write!(f, "SV_{}", self.0.id)
            }
        }
    }
}

impl fmt::Debug for SymbolicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self, self.0.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_literals() {
        assert_eq!(SymbolicValue::null_literal().id(), NULL_LITERAL_ID);
        assert_eq!(SymbolicValue::true_literal().id(), TRUE_LITERAL_ID);
        assert_eq!(SymbolicValue::false_literal().id(), FALSE_LITERAL_ID);
        assert!(SymbolicValue::true_literal().is_protected());
        assert!(!SymbolicValue::new(FIRST_FREE_ID, SymbolicValueKind::Plain).is_protected());
    }

    #[test]
    fn test_identity_equality() {
        let a = SymbolicValue::new(7, SymbolicValueKind::Plain);
        let b = SymbolicValue::new(7, SymbolicValueKind::Plain);
        let c = SymbolicValue::new(8, SymbolicValueKind::Plain);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "SV_7");
    }

    #[test]
    fn test_computed_from_and_references() {
        let a = SymbolicValue::new(5, SymbolicValueKind::Plain);
        let not_a = SymbolicValue::new(6, SymbolicValueKind::Not(a.clone()));
        let not_not_a = SymbolicValue::new(7, SymbolicValueKind::Not(not_a.clone()));

        assert_eq!(not_a.computed_from(), vec![a.clone()]);
        assert!(a.computed_from().is_empty());
        assert!(not_not_a.references(&a));
        assert!(!a.references(&not_a));
        assert_eq!(not_a.to_string(), "!SV_5");
    }

    #[test]
    fn test_exception_type() {
        let known = SymbolicValue::new(
            9,
            SymbolicValueKind::Exceptional {
                exception_type: Some("java.io.IOException".to_string()),
            },
        );
        let unknown = SymbolicValue::new(
            10,
            SymbolicValueKind::Exceptional {
                exception_type: None,
            },
        );
        assert!(known.is_exceptional());
        assert_eq!(known.exception_type(), Some("java.io.IOException"));
        assert!(unknown.is_exceptional());
        assert_eq!(unknown.exception_type(), None);
    }
}
