//! Binary relations between symbolic values
//!
//! # Features
//!
//! - **Canonical form**: `a > b` is stored as `b < a`, `a <= b` as `b >= a`
//! - **Resolution**: decide a relation from known facts (reflexivity, direct implication,
//!   transitive closure, conjunction of facts on one pair)
//! - **Bounded deduction**: the closure stops with `TransitiveRelationExceeded` once it
//!   grows past `RelationLimits`
//!
//! # Examples
//!
//! ```text
//! known = [a == b, b != c]
//! (a != c).resolve_state(known)  => Fulfilled
//! (a <  a).resolve_state([])     => Unfulfilled
//! ```

use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::relation_kind::{RelationKind, RelationState};
use super::symbolic_value::SymbolicValue;
use crate::errors::{Result, SymexError};
use crate::features::symbolic_values::infrastructure::relation_table;

/// Bounds of one `resolve_state` query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationLimits {
    pub max_deduced_relations: usize,
    pub max_iterations: usize,
}

impl Default for RelationLimits {
    fn default() -> Self {
        Self {
            max_deduced_relations: 1_000,
            max_iterations: 10_000,
        }
    }
}

impl From<&crate::config::EngineConfig> for RelationLimits {
    fn from(config: &crate::config::EngineConfig) -> Self {
        Self {
            max_deduced_relations: config.max_deduced_relations,
            max_iterations: config.max_relation_iterations,
        }
    }
}

/// `left kind right`, always in canonical form
#[derive(Clone)]
pub struct BinaryRelation {
    kind: RelationKind,
    left: SymbolicValue,
    right: SymbolicValue,
}

impl BinaryRelation {
    /// Build a relation, rewriting `>` and `<=` to their canonical forms
    pub fn new(kind: RelationKind, left: SymbolicValue, right: SymbolicValue) -> Self {
        let (kind, swap) = kind.normalize();
        if swap {
            Self {
                kind,
                left: right,
                right: left,
            }
        } else {
            Self { kind, left, right }
        }
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    pub fn left(&self) -> &SymbolicValue {
        &self.left
    }

    pub fn right(&self) -> &SymbolicValue {
        &self.right
    }

    /// Logical negation, canonical
    pub fn inverse(&self) -> Self {
        Self::new(self.kind.inverse(), self.left.clone(), self.right.clone())
    }

    /// Same fact stated with swapped operands
    pub fn symmetric(&self) -> Self {
        Self::new(self.kind.symmetric(), self.right.clone(), self.left.clone())
    }

    pub fn has_operand(&self, value: &SymbolicValue) -> bool {
        &self.left == value || &self.right == value
    }

    fn has_same_operand(&self) -> bool {
        self.left == self.right
    }

    /// Same unordered operand pair
    pub fn has_same_operands_as(&self, other: &BinaryRelation) -> bool {
        (self.left == other.left && self.right == other.right)
            || (self.left == other.right && self.right == other.left)
    }

    /// Two relations that share exactly one operand and are not reflexive
    pub fn potentially_transitive_with(&self, other: &BinaryRelation) -> bool {
        if self.has_same_operands_as(other) || self.has_same_operand() || other.has_same_operand()
        {
            return false;
        }
        other.has_operand(&self.left) || other.has_operand(&self.right)
    }

    /// Operand of `self` that `other` does not mention
    fn different_operand(&self, other: &BinaryRelation) -> &SymbolicValue {
        if other.has_operand(&self.left) {
            &self.right
        } else {
            &self.left
        }
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Decide this relation given the relations known to hold
    ///
    /// Returns `TransitiveRelationExceeded` when the deduction closure outgrows `limits`.
    pub fn resolve_state(
        &self,
        known: &[BinaryRelation],
        limits: RelationLimits,
    ) -> Result<RelationState> {
        if self.has_same_operand() {
            return Ok(relation_table::same_operand_state(self.kind));
        }

        let mut all: FxHashSet<BinaryRelation> = FxHashSet::default();
        let mut worklist: VecDeque<BinaryRelation> = VecDeque::with_capacity(known.len());
        for relation in known {
            if all.insert(relation.clone()) {
                worklist.push_back(relation.clone());
            }
        }
        let mut iterations = 0usize;

        while let Some(relation) = worklist.pop_front() {
            if all.len() > limits.max_deduced_relations || iterations > limits.max_iterations {
                return Err(SymexError::TransitiveRelationExceeded {
                    relations: all.len(),
                    iterations,
                });
            }
            iterations += 1;

            let state = relation.implies(self);
            if state.is_determined() {
                return Ok(state);
            }

            let deduced: Vec<BinaryRelation> = all
                .iter()
                .filter_map(|other| relation.deduce_transitive_or_simplified(other))
                .filter(|r| !all.contains(r))
                .collect();
            for relation in deduced {
                if all.insert(relation.clone()) {
                    worklist.push_back(relation);
                }
            }
        }

        Ok(RelationState::Undetermined)
    }

    /// State of `tested` when `self` holds
    pub fn implies(&self, tested: &BinaryRelation) -> RelationState {
        if self == tested {
            return RelationState::Fulfilled;
        }
        if &self.inverse() == tested {
            return RelationState::Unfulfilled;
        }
        if self.has_same_operands_as(tested) {
            let same_orientation = self.left == tested.left;
            return relation_table::direct_implication(self.kind, tested.kind, same_orientation);
        }
        RelationState::Undetermined
    }

    /// Relation following from `self` and `other`, if any
    ///
    /// Relations on two different pairs sharing one operand combine transitively, relations
    /// on one pair may simplify to a stronger relation.
    pub fn deduce_transitive_or_simplified(&self, other: &BinaryRelation) -> Option<BinaryRelation> {
        if self.potentially_transitive_with(other) {
            self.combine_transitively(other)
        } else {
            self.simplify(other)
        }
    }

    fn simplify(&self, other: &BinaryRelation) -> Option<BinaryRelation> {
        // a >= b && b >= a  =>  a == b
        if self.kind == RelationKind::GreaterThanOrEqual
            && other.kind == RelationKind::GreaterThanOrEqual
            && self.left == other.right
            && self.right == other.left
            && !self.has_same_operand()
        {
            return Some(Self::new(
                RelationKind::Equal,
                self.left.clone(),
                self.right.clone(),
            ));
        }
        None
    }

    fn combine_transitively(&self, other: &BinaryRelation) -> Option<BinaryRelation> {
        self.combine_one_way(other)
            .or_else(|| other.combine_one_way(self))
    }

    fn combine_one_way(&self, other: &BinaryRelation) -> Option<BinaryRelation> {
        match self.kind {
            RelationKind::Equal => Some(self.substitute_into(other)),
            // `equals` says nothing about identity, nor about strict order
            RelationKind::MethodEquals
                if matches!(
                    other.kind,
                    RelationKind::MethodEquals
                        | RelationKind::NotMethodEquals
                        | RelationKind::GreaterThanOrEqual
                ) =>
            {
                Some(self.substitute_into(other))
            }
            RelationKind::LessThan => self.combine_less_than(other),
            RelationKind::GreaterThanOrEqual => self.combine_greater_or_equal(other),
            _ => None,
        }
    }

    /// `self` is an equality `a ~ b`; rewrite `other` with `b` replaced by `a`
    fn substitute_into(&self, other: &BinaryRelation) -> BinaryRelation {
        let replacement = self.different_operand(other).clone();
        if self.has_operand(&other.left) {
            Self::new(other.kind, replacement, other.right.clone())
        } else {
            Self::new(other.kind, other.left.clone(), replacement)
        }
    }

    /// `self` is `l < r`
    fn combine_less_than(&self, other: &BinaryRelation) -> Option<BinaryRelation> {
        match other.kind {
            // a < x && x < b  =>  a < b
            RelationKind::LessThan if self.right == other.left => Some(Self::new(
                RelationKind::LessThan,
                self.left.clone(),
                other.right.clone(),
            )),
            // x < a && b < x  =>  b < a
            RelationKind::LessThan if self.left == other.right => Some(Self::new(
                RelationKind::LessThan,
                other.left.clone(),
                self.right.clone(),
            )),
            // a < x && b >= x  =>  a < b
            RelationKind::GreaterThanOrEqual if self.right == other.right => Some(Self::new(
                RelationKind::LessThan,
                self.left.clone(),
                other.left.clone(),
            )),
            // x < a && x >= b  =>  b < a
            RelationKind::GreaterThanOrEqual if self.left == other.left => Some(Self::new(
                RelationKind::LessThan,
                other.right.clone(),
                self.right.clone(),
            )),
            _ => None,
        }
    }

    /// `self` is `l >= r`
    fn combine_greater_or_equal(&self, other: &BinaryRelation) -> Option<BinaryRelation> {
        // a >= x && x >= b  =>  a >= b
        if other.kind == RelationKind::GreaterThanOrEqual && self.right == other.left {
            return Some(Self::new(
                RelationKind::GreaterThanOrEqual,
                self.left.clone(),
                other.right.clone(),
            ));
        }
        None
    }
}

impl PartialEq for BinaryRelation {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        if self.kind.is_unordered() {
            self.has_same_operands_as(other)
        } else {
            self.left == other.left && self.right == other.right
        }
    }
}

impl Eq for BinaryRelation {}

impl Hash for BinaryRelation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        let (l, r) = (self.left.id(), self.right.id());
        if self.kind.is_unordered() && l > r {
            (r, l).hash(state);
        } else {
            (l, r).hash(state);
        }
    }
}

impl fmt::Display for BinaryRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.left, self.kind.operator(), self.right)
    }
}

impl fmt::Debug for BinaryRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
