//! Method behaviors
//!
//! # Features
//!
//! - **Yield creation**: one yield per end-of-path state of the exploration
//! - **Parameter cleanup**: boolean parameters drop the zero domain, other parameters drop
//!   the boolean domain
//! - **Reduction**: `completed()` merges fresh-result happy yields that differ in a single
//!   slot where the two sides cover a whole domain
//!
//! # Examples
//!
//! ```text
//! {params: [[NOT_NULL]], result: -1 [TRUE]}
//! {params: [[NOT_NULL]], result: -1 [FALSE]}
//!   completed() => {params: [[NOT_NULL]], result: -1}
//! ```

use std::fmt;
use tracing::debug;

use super::method_yield::{MethodYield, YieldKind, FRESH_RESULT};
use crate::features::constraints::{ConstraintDomain, ConstraintsByDomain};
use crate::features::program_state::ProgramState;
use crate::features::symbolic_values::SymbolicValue;
use crate::shared::models::{MethodSignature, MethodSymbol};

#[derive(Debug, Clone)]
pub struct MethodBehavior {
    signature: MethodSignature,
    varargs: bool,
    declared_exceptions: Vec<String>,
    yields: Vec<MethodYield>,
    /// Parameter values of the exploration that produced the yields
    parameters: Vec<SymbolicValue>,
    complete: bool,
    visited: bool,
}

impl MethodBehavior {
    pub fn new(signature: MethodSignature) -> Self {
        Self {
            signature,
            varargs: false,
            declared_exceptions: Vec::new(),
            yields: Vec::new(),
            parameters: Vec::new(),
            complete: false,
            visited: false,
        }
    }

    /// Empty behavior carrying a method's signature, varargs flag and declared exceptions
    pub fn for_method(method: &MethodSymbol) -> Self {
        Self::new(method.signature.clone())
            .with_varargs(method.flags.varargs)
            .with_declared_exceptions(method.declared_exceptions.clone())
    }

    pub fn with_varargs(mut self, varargs: bool) -> Self {
        self.varargs = varargs;
        self
    }

    pub fn with_declared_exceptions(mut self, exceptions: Vec<String>) -> Self {
        self.declared_exceptions = exceptions;
        self
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub fn arity(&self) -> usize {
        self.signature.arity()
    }

    pub fn is_varargs(&self) -> bool {
        self.varargs
    }

    pub fn declared_exceptions(&self) -> &[String] {
        &self.declared_exceptions
    }

    pub fn yields(&self) -> &[MethodYield] {
        &self.yields
    }

    pub fn happy_path_yields(&self) -> impl Iterator<Item = &MethodYield> {
        self.yields.iter().filter(|y| !y.is_exceptional())
    }

    pub fn exceptional_path_yields(&self) -> impl Iterator<Item = &MethodYield> {
        self.yields.iter().filter(|y| y.is_exceptional())
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn visited(&mut self) {
        self.visited = true;
    }

    pub fn parameters(&self) -> &[SymbolicValue] {
        &self.parameters
    }

    pub fn add_parameter(&mut self, value: SymbolicValue) {
        self.parameters.push(value);
    }

    /// Append a yield unless an equal one is already known
    pub fn add_yield(&mut self, method_yield: MethodYield) {
        if !self.yields.contains(&method_yield) {
            self.yields.push(method_yield);
        }
    }

    // ========================================================================
    // Yield creation
    // ========================================================================

    /// Record the yield of an end-of-path state
    pub fn create_yield(&mut self, state: &ProgramState) {
        let parameters = self.parameter_constraints(state);
        let exit = state.exit_value();

        let method_yield = match exit {
            Some(value) if value.is_exceptional() => {
                MethodYield::exceptional(parameters, value.exception_type().map(str::to_string))
            }
            None if self.signature.expects_return_value() => {
                MethodYield::exceptional(parameters, None)
            }
            _ => {
                let (result_index, result_constraint) = match exit {
                    Some(value) if self.signature.expects_return_value() => {
                        let index = self
                            .parameters
                            .iter()
                            .position(|p| p == value)
                            .map_or(FRESH_RESULT, |i| i as i32);
                        let constraints = state
                            .constraints(value)
                            .map(|c| self.cleanup(c, None))
                            .filter(|c| !c.is_empty());
                        (index, constraints)
                    }
                    _ => (FRESH_RESULT, None),
                };
                MethodYield::happy(parameters, result_index, result_constraint)
            }
        };
        self.add_yield(method_yield);
    }

    /// Exceptional yield synthesized by a check, e.g. a parameter dereferenced while null
    pub fn create_check_based_yield(
        &mut self,
        state: &ProgramState,
        exception_type: &str,
        check: &str,
    ) -> MethodYield {
        let method_yield =
            MethodYield::check_based(self.parameter_constraints(state), exception_type, check);
        self.add_yield(method_yield.clone());
        method_yield
    }

    fn parameter_constraints(&self, state: &ProgramState) -> Vec<ConstraintsByDomain> {
        self.parameters
            .iter()
            .enumerate()
            .map(|(index, value)| {
                state
                    .constraints(value)
                    .map(|c| self.cleanup(c, Some(index)))
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Drop the domain that does not apply to the slot type; `None` is the result slot
    fn cleanup(&self, constraints: &ConstraintsByDomain, slot: Option<usize>) -> ConstraintsByDomain {
        let is_boolean = match slot {
            Some(index) => self.signature.parameter_is_boolean(index),
            None => self.signature.return_type().is_boolean(),
        };
        if is_boolean {
            constraints.remove(&ConstraintDomain::Zero)
        } else {
            constraints.remove(&ConstraintDomain::Boolean)
        }
    }

    // ========================================================================
    // Completion
    // ========================================================================

    /// Freeze the behavior and reduce its yields
    pub fn completed(&mut self) {
        self.complete = true;
        self.visited = true;
        self.reduce_yields();
    }

    /// Mark complete as-is; behaviors loaded from outside the analysis are already reduced
    pub(crate) fn frozen(mut self) -> Self {
        self.complete = true;
        self.visited = true;
        self
    }

    fn reduce_yields(&mut self) {
        let before = self.yields.len();
        let (mut reducible, kept): (Vec<MethodYield>, Vec<MethodYield>) = self
            .yields
            .drain(..)
            .partition(|y| y.result_index() == Some(FRESH_RESULT));

        loop {
            let size = reducible.len();
            reducible = reduce_pass(reducible);
            if reducible.len() >= size {
                break;
            }
        }

        self.yields = kept;
        for y in reducible {
            self.add_yield(y);
        }
        if self.yields.len() < before {
            debug!(
                "Reduced yields of {} from {} to {}",
                self.signature,
                before,
                self.yields.len()
            );
        }
    }
}

/// One pass: every yield merges with at most one later partner
fn reduce_pass(yields: Vec<MethodYield>) -> Vec<MethodYield> {
    let mut pending: std::collections::VecDeque<MethodYield> = yields.into();
    let mut reduced = Vec::new();
    while let Some(first) = pending.pop_front() {
        let merged = pending
            .iter()
            .enumerate()
            .find_map(|(i, other)| merge(&first, other).map(|m| (i, m)));
        match merged {
            Some((i, m)) => {
                pending.remove(i);
                if !reduced.contains(&m) {
                    reduced.push(m);
                }
            }
            None => {
                if !reduced.contains(&first) {
                    reduced.push(first);
                }
            }
        }
    }
    reduced
}

/// Merge two fresh-result happy yields differing in exactly one complementary slot
fn merge(a: &MethodYield, b: &MethodYield) -> Option<MethodYield> {
    let (
        YieldKind::Happy {
            result_constraint: result_a,
            ..
        },
        YieldKind::Happy {
            result_constraint: result_b,
            ..
        },
    ) = (&a.kind, &b.kind)
    else {
        return None;
    };
    if a.parameters_constraints.len() != b.parameters_constraints.len() {
        return None;
    }

    let empty = ConstraintsByDomain::empty();
    let result_a = result_a.as_ref().unwrap_or(&empty);
    let result_b = result_b.as_ref().unwrap_or(&empty);

    let slots_a = a.parameters_constraints.iter().chain(std::iter::once(result_a));
    let slots_b = b.parameters_constraints.iter().chain(std::iter::once(result_b));
    let differences: Vec<usize> = slots_a
        .zip(slots_b)
        .enumerate()
        .filter(|(_, (x, y))| x != y)
        .map(|(i, _)| i)
        .collect();
    let [slot] = differences[..] else {
        return None;
    };

    let result_slot = a.parameters_constraints.len();
    let (left, right) = if slot == result_slot {
        if result_a.is_irreducible() || result_b.is_irreducible() {
            return None;
        }
        (result_a, result_b)
    } else {
        (&a.parameters_constraints[slot], &b.parameters_constraints[slot])
    };
    let domain = left.complementary_domain(right)?;
    let merged = left.remove(&domain);

    let mut parameters = a.parameters_constraints.clone();
    let result_constraint = if slot == result_slot {
        Some(merged).filter(|c| !c.is_empty())
    } else {
        parameters[slot] = merged;
        a.result_constraint().cloned()
    };
    Some(MethodYield::happy(parameters, FRESH_RESULT, result_constraint))
}

impl fmt::Display for MethodBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} yield(s)]", self.signature, self.yields.len())
    }
}
