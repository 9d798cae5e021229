//! Constraint manager
//!
//! Hands out symbolic values for one method exploration and is the only place where
//! constraints are added with feasibility checking.
//!
//! # Features
//!
//! - **Value factory**: plain, exceptional, relational, negation, logical and instanceof values
//! - **Relation interning**: `a == b` and `b == a` built twice yield the same value
//! - **Propagation**: forcing a relation `TRUE`/`FALSE` copies constraints between its
//!   operands, through every relation deducible from the known ones
//! - **Case splits**: `&`, `|`, `^` and `!` values push their truth down to operands,
//!   bounded by `max_nested_boolean_states`
//!
//! ## Architecture
//!
//! ```text
//! set_constraint(state, value, c)
//!   ├── literal?        -> consistent ? [state] : []
//!   ├── existing in domain -> equal ? [state] : []
//!   ├── relational T/F  -> resolve_state(known) ─┐
//!   │                      copy_all_constraints ◄┘ for effective + deduced relations
//!   ├── !x / x&y / x|y / x^y -> split over operand truth values
//!   └── plain           -> add (NULL replaces every other domain)
//! ```

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::errors::{Result, SymexError};
use crate::features::constraints::{Constraint, ConstraintDomain, ConstraintsByDomain};
use crate::features::program_state::domain::ProgramState;
use crate::features::symbolic_values::{
    BinaryRelation, RelationKind, RelationLimits, RelationState, SymbolicValue, SymbolicValueId,
    SymbolicValueKind, FIRST_FREE_ID,
};
use crate::shared::models::LogicalOp;

/// Relations already being propagated on the current path
type PropagationGuard = FxHashSet<BinaryRelation>;

/// States on each side of a branch
#[derive(Debug, Clone, Default)]
pub struct DualStates {
    pub when_false: Vec<ProgramState>,
    pub when_true: Vec<ProgramState>,
}

#[derive(Debug)]
pub struct ConstraintManager {
    next_id: SymbolicValueId,
    relations: FxHashMap<BinaryRelation, SymbolicValue>,
    limits: RelationLimits,
    max_nested_boolean_states: usize,
}

impl Default for ConstraintManager {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ConstraintManager {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            next_id: FIRST_FREE_ID,
            relations: FxHashMap::default(),
            limits: RelationLimits::from(config),
            max_nested_boolean_states: config.max_nested_boolean_states,
        }
    }

    pub fn limits(&self) -> RelationLimits {
        self.limits
    }

    /// Number of values created so far, literals excluded
    pub fn values_created(&self) -> usize {
        (self.next_id - FIRST_FREE_ID) as usize
    }

    // ========================================================================
    // Factory
    // ========================================================================

    fn fresh(&mut self, kind: SymbolicValueKind) -> SymbolicValue {
        let id = self.next_id;
        self.next_id += 1;
        SymbolicValue::new(id, kind)
    }

    pub fn create_symbolic_value(&mut self) -> SymbolicValue {
        self.fresh(SymbolicValueKind::Plain)
    }

    pub fn create_exceptional_value(&mut self, exception_type: Option<String>) -> SymbolicValue {
        self.fresh(SymbolicValueKind::Exceptional { exception_type })
    }

    /// Relational value for `left kind right`, shared with every equal relation
    pub fn create_relational_value(
        &mut self,
        kind: RelationKind,
        left: SymbolicValue,
        right: SymbolicValue,
    ) -> SymbolicValue {
        self.intern(BinaryRelation::new(kind, left, right))
    }

    fn intern(&mut self, relation: BinaryRelation) -> SymbolicValue {
        if let Some(existing) = self.relations.get(&relation) {
            return existing.clone();
        }
        let value = self.fresh(SymbolicValueKind::Relational(relation.clone()));
        self.relations.insert(relation, value.clone());
        value
    }

    pub fn create_not_value(&mut self, operand: SymbolicValue) -> SymbolicValue {
        self.fresh(SymbolicValueKind::Not(operand))
    }

    pub fn create_logical_value(
        &mut self,
        op: LogicalOp,
        left: SymbolicValue,
        right: SymbolicValue,
    ) -> SymbolicValue {
        self.fresh(SymbolicValueKind::Logical { op, left, right })
    }

    pub fn create_instance_of_value(
        &mut self,
        operand: SymbolicValue,
        type_name: impl Into<String>,
    ) -> SymbolicValue {
        self.fresh(SymbolicValueKind::InstanceOf {
            operand,
            type_name: type_name.into(),
        })
    }

    // ========================================================================
    // Constraints
    // ========================================================================

    /// States in which `value` carries `constraint`
    ///
    /// An empty result means the constraint contradicts `state`. Only
    /// `TooManyNestedBooleanStates` is returned as an error.
    pub fn set_constraint(
        &mut self,
        state: &ProgramState,
        value: &SymbolicValue,
        constraint: Constraint,
    ) -> Result<Vec<ProgramState>> {
        let states = self.set_guarded(state, value, constraint, &PropagationGuard::default())?;
        Ok(dedup_states(states))
    }

    /// Split `state` on the truth of `condition`
    pub fn assume_dual(
        &mut self,
        state: &ProgramState,
        condition: &SymbolicValue,
    ) -> Result<DualStates> {
        Ok(DualStates {
            when_false: self.set_constraint(state, condition, Constraint::False)?,
            when_true: self.set_constraint(state, condition, Constraint::True)?,
        })
    }

    fn set_guarded(
        &mut self,
        state: &ProgramState,
        value: &SymbolicValue,
        constraint: Constraint,
        guard: &PropagationGuard,
    ) -> Result<Vec<ProgramState>> {
        let domain = constraint.domain();

        if value.is_protected() {
            let consistent = match state.constraint(value, &domain) {
                Some(existing) => existing == &constraint,
                None => !(value == &SymbolicValue::null_literal() && constraint.conflicts_with_null()),
            };
            return Ok(if consistent { vec![state.clone()] } else { Vec::new() });
        }

        if let Some(existing) = state.constraint(value, &domain) {
            return Ok(if existing == &constraint {
                vec![state.clone()]
            } else {
                Vec::new()
            });
        }

        let is_null = state.constraint(value, &ConstraintDomain::Nullness) == Some(&Constraint::Null);
        if is_null && constraint.conflicts_with_null() {
            return Ok(Vec::new());
        }
        if constraint == Constraint::Null
            && state
                .constraints(value)
                .is_some_and(|c| c.iter().any(Constraint::conflicts_with_null))
        {
            return Ok(Vec::new());
        }

        match (value.kind(), &constraint) {
            (SymbolicValueKind::Relational(relation), Constraint::True | Constraint::False) => {
                let relation = relation.clone();
                self.set_relation(state, value, &relation, constraint, guard)
            }
            (SymbolicValueKind::Not(operand), Constraint::True | Constraint::False) => {
                let inverse = constraint.inverse().unwrap_or(Constraint::False);
                let states = self.set_guarded(state, operand, inverse, guard)?;
                Ok(states
                    .into_iter()
                    .map(|s| s.add_constraint(value, constraint.clone()))
                    .collect())
            }
            (SymbolicValueKind::Logical { op, left, right }, Constraint::True | Constraint::False) => {
                self.set_logical(state, value, *op, left, right, constraint, guard)
            }
            (SymbolicValueKind::InstanceOf { operand, .. }, Constraint::True) => {
                let states = self.set_guarded(state, operand, Constraint::NotNull, guard)?;
                Ok(states
                    .into_iter()
                    .map(|s| s.add_constraint(value, Constraint::True))
                    .collect())
            }
            (_, Constraint::Null) => Ok(vec![
                state.add_constraints(value, ConstraintsByDomain::of([Constraint::Null]))
            ]),
            _ => Ok(vec![state.add_constraint(value, constraint)]),
        }
    }

    fn set_relation(
        &mut self,
        state: &ProgramState,
        value: &SymbolicValue,
        relation: &BinaryRelation,
        constraint: Constraint,
        guard: &PropagationGuard,
    ) -> Result<Vec<ProgramState>> {
        let truth = constraint == Constraint::True;
        let known = state.known_relations();

        let resolved = match relation.resolve_state(&known, self.limits) {
            Ok(resolved) => resolved,
            Err(e) => {
                debug!("Relation {} left undetermined: {}", relation, e);
                RelationState::Undetermined
            }
        };
        if resolved.rejects(truth) {
            return Ok(Vec::new());
        }

        let effective = if truth {
            relation.clone()
        } else {
            relation.inverse()
        };
        let mut relations: Vec<BinaryRelation> = known
            .iter()
            .filter_map(|k| effective.deduce_transitive_or_simplified(k))
            .collect();
        relations.push(effective);
        relations.retain(|r| !guard.contains(r));

        let mut inner = guard.clone();
        inner.extend(relations.iter().cloned());

        let mut states = vec![state.add_constraint(value, constraint)];
        for relation in relations {
            let mut next = Vec::new();
            for s in &states {
                next.extend(self.copy_all_constraints(s, &relation, &inner)?);
            }
            states = next;
            if states.is_empty() {
                break;
            }
        }
        Ok(states)
    }

    /// Record `relation` as holding and copy constraints across it in both directions
    fn copy_all_constraints(
        &mut self,
        state: &ProgramState,
        relation: &BinaryRelation,
        guard: &PropagationGuard,
    ) -> Result<Vec<ProgramState>> {
        let relation_value = self.intern(relation.clone());
        if state.constraint(&relation_value, &ConstraintDomain::Boolean) == Some(&Constraint::False) {
            return Ok(Vec::new());
        }
        let state = state.add_constraint(&relation_value, Constraint::True);

        let kind = relation.kind();
        let mut states = Vec::new();
        for s in self.copy_constraints(&state, relation.left(), relation.right(), kind, guard)? {
            states.extend(self.copy_constraints(
                &s,
                relation.right(),
                relation.left(),
                kind.symmetric(),
                guard,
            )?);
        }
        Ok(states)
    }

    /// Apply to `to` what `from`'s constraints say across `from kind to`
    fn copy_constraints(
        &mut self,
        state: &ProgramState,
        from: &SymbolicValue,
        to: &SymbolicValue,
        kind: RelationKind,
        guard: &PropagationGuard,
    ) -> Result<Vec<ProgramState>> {
        let Some(from_constraints) = state.constraints(from).cloned() else {
            return Ok(vec![state.clone()]);
        };

        let mut states = vec![state.clone()];
        for constraint in from_constraints.iter() {
            let Some(copied) = constraint.copy_over(kind) else {
                continue;
            };
            // a value unequal to a non-null value may still be null, never the reverse
            if copied == Constraint::Null && !kind.is_equality() {
                continue;
            }
            let mut next = Vec::new();
            for s in &states {
                next.extend(self.set_guarded(s, to, copied.clone(), guard)?);
                self.check_nested_bound(next.len())?;
            }
            states = next;
        }
        Ok(states)
    }

    #[allow(clippy::too_many_arguments)]
    fn set_logical(
        &mut self,
        state: &ProgramState,
        value: &SymbolicValue,
        op: LogicalOp,
        left: &SymbolicValue,
        right: &SymbolicValue,
        constraint: Constraint,
        guard: &PropagationGuard,
    ) -> Result<Vec<ProgramState>> {
        use Constraint::{False as F, True as T};

        let truth = constraint == Constraint::True;
        let cases: Vec<(Constraint, Constraint)> = match (op, truth) {
            (LogicalOp::And, true) => vec![(T, T)],
            (LogicalOp::And, false) => vec![(F, T), (F, F), (T, F)],
            (LogicalOp::Or, true) => vec![(T, T), (T, F), (F, T)],
            (LogicalOp::Or, false) => vec![(F, F)],
            (LogicalOp::Xor, true) => vec![(T, F), (F, T)],
            (LogicalOp::Xor, false) => vec![(T, T), (F, F)],
        };

        let mut states = Vec::new();
        for (left_constraint, right_constraint) in cases {
            for s in self.set_guarded(state, left, left_constraint, guard)? {
                states.extend(self.set_guarded(&s, right, right_constraint.clone(), guard)?);
                self.check_nested_bound(states.len())?;
            }
        }
        Ok(states
            .into_iter()
            .map(|s| s.add_constraint(value, constraint.clone()))
            .collect())
    }

    fn check_nested_bound(&self, count: usize) -> Result<()> {
        if count > self.max_nested_boolean_states {
            warn!(
                "Too many nested boolean states: {} > {}",
                count, self.max_nested_boolean_states
            );
            return Err(SymexError::TooManyNestedBooleanStates {
                limit: self.max_nested_boolean_states,
            });
        }
        Ok(())
    }
}

/// Drop structurally equal states, keeping first occurrences
fn dedup_states(states: Vec<ProgramState>) -> Vec<ProgramState> {
    if states.len() < 2 {
        return states;
    }
    let mut seen = FxHashSet::default();
    states
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
