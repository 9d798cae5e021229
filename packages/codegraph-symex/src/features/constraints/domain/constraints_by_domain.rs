//! Per-value constraint set, one constraint per domain

use im::OrdMap;
use std::fmt;

use super::constraint::{Constraint, ConstraintDomain};

/// Immutable map `domain -> constraint` for one symbolic value
///
/// Updates return a new set and share structure with the original.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintsByDomain {
    entries: OrdMap<ConstraintDomain, Constraint>,
}

impl ConstraintsByDomain {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(constraints: impl IntoIterator<Item = Constraint>) -> Self {
        constraints
            .into_iter()
            .fold(Self::empty(), |set, c| set.put(c))
    }

    pub fn get(&self, domain: &ConstraintDomain) -> Option<&Constraint> {
        self.entries.get(domain)
    }

    /// Set with `constraint` replacing whatever its domain held
    pub fn put(&self, constraint: Constraint) -> Self {
        Self {
            entries: self.entries.update(constraint.domain(), constraint),
        }
    }

    pub fn remove(&self, domain: &ConstraintDomain) -> Self {
        Self {
            entries: self.entries.without(domain),
        }
    }

    pub fn contains(&self, constraint: &Constraint) -> bool {
        self.entries.get(&constraint.domain()) == Some(constraint)
    }

    pub fn has_domain(&self, domain: &ConstraintDomain) -> bool {
        self.entries.contains_key(domain)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Constraints in domain order
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.entries.values()
    }

    pub fn domains(&self) -> impl Iterator<Item = &ConstraintDomain> {
        self.entries.keys()
    }

    /// Sets carrying `NULL` or `ZERO` describe one concrete value and never merge away
    pub fn is_irreducible(&self) -> bool {
        self.contains(&Constraint::Null) || self.contains(&Constraint::Zero)
    }

    /// Single domain on which `self` and `other` hold complementary constraints while
    /// agreeing everywhere else
    pub fn complementary_domain(&self, other: &ConstraintsByDomain) -> Option<ConstraintDomain> {
        if self.len() != other.len() {
            return None;
        }
        let mut found = None;
        for (domain, constraint) in self.entries.iter() {
            let theirs = other.get(domain)?;
            if theirs == constraint {
                continue;
            }
            if found.is_some() || !constraint.is_complement_of(theirs) {
                return None;
            }
            found = Some(domain.clone());
        }
        found
    }
}

impl FromIterator<Constraint> for ConstraintsByDomain {
    fn from_iter<T: IntoIterator<Item = Constraint>>(iter: T) -> Self {
        Self::of(iter)
    }
}

impl fmt::Display for ConstraintsByDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, constraint) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", constraint)?;
        }
        f.write_str("]")
    }
}
