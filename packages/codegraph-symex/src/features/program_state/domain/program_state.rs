//! Program states
//!
//! # Features
//!
//! - **Persistent**: every update returns a new state sharing structure with the old one
//!   (`im` vectors and ordered maps), so forks are O(log n)
//! - **Structural equality**: two states are equal when their stacks, bindings, constraints
//!   and exit values are; visit counters are ignored
//! - **Protected literals**: `null`, `true` and `false` are constrained in every state
//!
//! # Examples
//!
//! ```text
//! empty_state()
//!   .stack_value(SV_3)          stack  [SV_3]
//!   .put(sym#0, SV_3)           values {sym#0 -> SV_3}
//!   .add_constraint(SV_3, NULL) constraints {SV_3 -> [NULL], ...literals}
//! ```

use im::{OrdMap, Vector};
use rustc_hash::FxHashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::features::constraints::{Constraint, ConstraintDomain, ConstraintsByDomain};
use crate::features::exploded_graph::ProgramPoint;
use crate::features::symbolic_values::{BinaryRelation, SymbolicValue};
use crate::shared::models::SymbolId;

#[derive(Clone, Default)]
pub struct ProgramState {
    /// Operand stack, top last
    stack: Vector<SymbolicValue>,
    values: OrdMap<SymbolId, SymbolicValue>,
    constraints: OrdMap<SymbolicValue, ConstraintsByDomain>,
    visited_points: OrdMap<ProgramPoint, u32>,
    exit_value: Option<SymbolicValue>,
}

impl ProgramState {
    /// Canonical starting state: only the protected literals are constrained
    pub fn empty_state() -> Self {
        let constraints = OrdMap::new()
            .update(
                SymbolicValue::null_literal(),
                ConstraintsByDomain::of([Constraint::Null]),
            )
            .update(
                SymbolicValue::true_literal(),
                ConstraintsByDomain::of([Constraint::NotNull, Constraint::True]),
            )
            .update(
                SymbolicValue::false_literal(),
                ConstraintsByDomain::of([Constraint::NotNull, Constraint::False]),
            );
        Self {
            constraints,
            ..Self::default()
        }
    }

    // ========================================================================
    // Stack
    // ========================================================================

    pub fn stack_value(&self, value: SymbolicValue) -> Self {
        let mut next = self.clone();
        next.stack.push_back(value);
        next
    }

    /// Pop `n` values, returned top first; `None` on underflow
    pub fn unstack_value(&self, n: usize) -> Option<(Self, Vec<SymbolicValue>)> {
        if n > self.stack.len() {
            return None;
        }
        let mut next = self.clone();
        let popped = next.stack.split_off(self.stack.len() - n);
        Some((next, popped.into_iter().rev().collect()))
    }

    pub fn peek_value(&self) -> Option<&SymbolicValue> {
        self.stack.back()
    }

    /// Top `n` values, top first
    pub fn peek_values(&self, n: usize) -> Option<Vec<SymbolicValue>> {
        if n > self.stack.len() {
            return None;
        }
        Some(self.stack.iter().rev().take(n).cloned().collect())
    }

    pub fn stack_size(&self) -> usize {
        self.stack.len()
    }

    pub fn clear_stack(&self) -> Self {
        Self {
            stack: Vector::new(),
            ..self.clone()
        }
    }

    // ========================================================================
    // Bindings
    // ========================================================================

    pub fn put(&self, symbol: SymbolId, value: SymbolicValue) -> Self {
        Self {
            values: self.values.update(symbol, value),
            ..self.clone()
        }
    }

    pub fn get_value(&self, symbol: SymbolId) -> Option<&SymbolicValue> {
        self.values.get(&symbol)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&SymbolId, &SymbolicValue)> {
        self.values.iter()
    }

    /// Drop bindings of symbols not in `keep`
    pub fn cleanup_dead_symbols(&self, keep: impl Fn(SymbolId) -> bool) -> Self {
        let values: OrdMap<SymbolId, SymbolicValue> = self
            .values
            .iter()
            .filter(|(symbol, _)| keep(**symbol))
            .map(|(symbol, value)| (*symbol, value.clone()))
            .collect();
        if values.len() == self.values.len() {
            return self.clone();
        }
        Self {
            values,
            ..self.clone()
        }
    }

    // ========================================================================
    // Constraints
    // ========================================================================

    /// Record `constraint` without any feasibility check
    pub fn add_constraint(&self, value: &SymbolicValue, constraint: Constraint) -> Self {
        let current = self.constraints.get(value).cloned().unwrap_or_default();
        self.add_constraints(value, current.put(constraint))
    }

    /// Replace every constraint of `value`
    pub fn add_constraints(&self, value: &SymbolicValue, constraints: ConstraintsByDomain) -> Self {
        let constraints_map = if constraints.is_empty() {
            self.constraints.without(value)
        } else {
            self.constraints.update(value.clone(), constraints)
        };
        Self {
            constraints: constraints_map,
            ..self.clone()
        }
    }

    pub fn remove_constraints_on_domain(
        &self,
        value: &SymbolicValue,
        domain: &ConstraintDomain,
    ) -> Self {
        match self.constraints.get(value) {
            Some(current) if current.has_domain(domain) => {
                self.add_constraints(value, current.remove(domain))
            }
            _ => self.clone(),
        }
    }

    pub fn constraint(&self, value: &SymbolicValue, domain: &ConstraintDomain) -> Option<&Constraint> {
        self.constraints.get(value).and_then(|c| c.get(domain))
    }

    pub fn constraints(&self, value: &SymbolicValue) -> Option<&ConstraintsByDomain> {
        self.constraints.get(value)
    }

    /// Values currently carrying `constraint`
    pub fn values_with_constraint<'a>(
        &'a self,
        constraint: &'a Constraint,
    ) -> impl Iterator<Item = &'a SymbolicValue> + 'a {
        self.constraints
            .iter()
            .filter(move |(_, c)| c.contains(constraint))
            .map(|(value, _)| value)
    }

    pub fn constraints_size(&self) -> usize {
        self.constraints.len()
    }

    /// Relations known to hold: relational values constrained `TRUE`, plus the inverse of
    /// those constrained `FALSE`
    pub fn known_relations(&self) -> Vec<BinaryRelation> {
        self.constraints
            .iter()
            .filter_map(|(value, constraints)| {
                let relation = value.relation()?;
                match constraints.get(&ConstraintDomain::Boolean)? {
                    Constraint::True => Some(relation.clone()),
                    Constraint::False => Some(relation.inverse()),
                    _ => None,
                }
            })
            .collect()
    }

    /// Whether `value` is referenced from the stack, a binding or the exit value
    pub fn can_reach(&self, value: &SymbolicValue) -> bool {
        self.stack.iter().any(|v| v.references(value))
            || self.values.values().any(|v| v.references(value))
            || self.exit_value.as_ref().is_some_and(|v| v.references(value))
    }

    /// Drop constraints of values no longer reachable
    ///
    /// Literals and `protected` values keep their constraints. A relational value is kept
    /// while both its operands are.
    pub fn cleanup_constraints(&self, protected: &[SymbolicValue]) -> Self {
        let protected: FxHashSet<&SymbolicValue> = protected.iter().collect();
        let kept = |value: &SymbolicValue| {
            value.is_protected() || protected.contains(value) || self.can_reach(value)
        };

        let constraints: OrdMap<SymbolicValue, ConstraintsByDomain> = self
            .constraints
            .iter()
            .filter(|(value, _)| match value.relation() {
                Some(relation) => {
                    kept(value) || (kept(relation.left()) && kept(relation.right()))
                }
                None => kept(value),
            })
            .map(|(value, constraints)| (value.clone(), constraints.clone()))
            .collect();

        if constraints.len() == self.constraints.len() {
            return self.clone();
        }
        Self {
            constraints,
            ..self.clone()
        }
    }

    // ========================================================================
    // Visits and exit
    // ========================================================================

    pub fn visited_point(&self, point: ProgramPoint) -> Self {
        let count = self.number_of_time_visited(point);
        Self {
            visited_points: self.visited_points.update(point, count + 1),
            ..self.clone()
        }
    }

    pub fn number_of_time_visited(&self, point: ProgramPoint) -> u32 {
        self.visited_points.get(&point).copied().unwrap_or(0)
    }

    /// Value leaving the method: the returned value or the exception in flight
    pub fn store_exit_value(&self, value: SymbolicValue) -> Self {
        Self {
            exit_value: Some(value),
            ..self.clone()
        }
    }

    pub fn exit_value(&self) -> Option<&SymbolicValue> {
        self.exit_value.as_ref()
    }
}

impl PartialEq for ProgramState {
    fn eq(&self, other: &Self) -> bool {
        self.stack == other.stack
            && self.values == other.values
            && self.constraints == other.constraints
            && self.exit_value == other.exit_value
    }
}

impl Eq for ProgramState {}

impl Hash for ProgramState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.stack.hash(state);
        self.values.hash(state);
        self.constraints.hash(state);
        self.exit_value.hash(state);
    }
}

impl fmt::Display for ProgramState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ stack: [")?;
        for (i, value) in self.stack.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("], values: {")?;
        for (i, (symbol, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", symbol, value)?;
        }
        f.write_str("}, constraints: {")?;
        for (i, (value, constraints)) in self.constraints.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", value, constraints)?;
        }
        f.write_str("} }")
    }
}

impl fmt::Debug for ProgramState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
