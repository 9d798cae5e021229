//! Constraint domains
//!
//! Each domain is an independent axis of knowledge about one symbolic value:
//! - Nullness: `NULL` / `NOT_NULL`
//! - Boolean: `TRUE` / `FALSE`
//! - Zero: `ZERO` / `NON_ZERO`
//! - Custom: open domains contributed by checks (e.g. resource `OPEN` / `CLOSED`)

use std::fmt;

use crate::features::symbolic_values::RelationKind;

/// Domain tag of a constraint
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConstraintDomain {
    Nullness,
    Boolean,
    Zero,
    Custom(String),
}

impl fmt::Display for ConstraintDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintDomain::Nullness => f.write_str("nullness"),
            ConstraintDomain::Boolean => f.write_str("boolean"),
            ConstraintDomain::Zero => f.write_str("zero"),
            ConstraintDomain::Custom(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Constraint {
    Null,
    NotNull,
    True,
    False,
    Zero,
    NonZero,
    Custom { domain: String, name: String },
}

impl Constraint {
    pub fn custom(domain: impl Into<String>, name: impl Into<String>) -> Self {
        Constraint::Custom {
            domain: domain.into(),
            name: name.into(),
        }
    }

    pub fn boolean(value: bool) -> Self {
        if value {
            Constraint::True
        } else {
            Constraint::False
        }
    }

    pub fn domain(&self) -> ConstraintDomain {
        match self {
            Constraint::Null | Constraint::NotNull => ConstraintDomain::Nullness,
            Constraint::True | Constraint::False => ConstraintDomain::Boolean,
            Constraint::Zero | Constraint::NonZero => ConstraintDomain::Zero,
            Constraint::Custom { domain, .. } => ConstraintDomain::Custom(domain.clone()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Constraint::Null => "NULL",
            Constraint::NotNull => "NOT_NULL",
            Constraint::True => "TRUE",
            Constraint::False => "FALSE",
            Constraint::Zero => "ZERO",
            Constraint::NonZero => "NON_ZERO",
            Constraint::Custom { name, .. } => name,
        }
    }

    /// Built-in constraint by its serialized name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NULL" => Some(Constraint::Null),
            "NOT_NULL" => Some(Constraint::NotNull),
            "TRUE" => Some(Constraint::True),
            "FALSE" => Some(Constraint::False),
            "ZERO" => Some(Constraint::Zero),
            "NON_ZERO" => Some(Constraint::NonZero),
            _ => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Constraint::Custom { .. })
    }

    /// The other value of a two-valued domain
    ///
    /// `NON_ZERO` has no inverse: a value different from a non-zero value may be anything.
    pub fn inverse(&self) -> Option<Self> {
        match self {
            Constraint::Null => Some(Constraint::NotNull),
            Constraint::NotNull => Some(Constraint::Null),
            Constraint::True => Some(Constraint::False),
            Constraint::False => Some(Constraint::True),
            Constraint::Zero => Some(Constraint::NonZero),
            Constraint::NonZero | Constraint::Custom { .. } => None,
        }
    }

    /// Whether `self` and `other` cover the whole domain between them
    pub fn is_complement_of(&self, other: &Constraint) -> bool {
        match (self, other) {
            (Constraint::Zero, Constraint::NonZero) | (Constraint::NonZero, Constraint::Zero) => {
                true
            }
            _ => self.inverse().as_ref() == Some(other),
        }
    }

    /// Constraint implied on the other operand of `a kind b` when `a` carries `self`
    pub fn copy_over(&self, kind: RelationKind) -> Option<Self> {
        use RelationKind::*;

        match (self, kind) {
            (_, Equal) => Some(self.clone()),

            (Constraint::Null, MethodEquals) => Some(Constraint::Null),
            (Constraint::Null, NotEqual) => Some(Constraint::NotNull),
            (Constraint::NotNull, MethodEquals) => Some(Constraint::NotNull),

            (Constraint::True | Constraint::False, MethodEquals) => Some(self.clone()),
            (Constraint::True | Constraint::False, NotEqual | NotMethodEquals) => self.inverse(),

            (Constraint::Zero | Constraint::NonZero, MethodEquals) => Some(self.clone()),
            (Constraint::Zero, NotEqual | NotMethodEquals | LessThan) => Some(Constraint::NonZero),

            (Constraint::Custom { .. }, MethodEquals) => Some(self.clone()),

            _ => None,
        }
    }

    /// Whether `self` can be added to a value whose constraint in the same domain is
    /// `existing`
    pub fn is_valid_with(&self, existing: Option<&Constraint>) -> bool {
        existing.map_or(true, |c| c == self)
    }

    /// Null values carry no boolean or numeric knowledge
    pub fn conflicts_with_null(&self) -> bool {
        matches!(
            self,
            Constraint::True | Constraint::False | Constraint::Zero | Constraint::NonZero
        )
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
