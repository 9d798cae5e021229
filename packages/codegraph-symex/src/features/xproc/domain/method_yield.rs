//! Method yields
//!
//! One yield summarizes one feasible exit of a method: the constraints its parameters had
//! on that path, plus either the returned value (happy path) or the exception raised.

use std::fmt;

use crate::errors::Result;
use crate::features::constraints::ConstraintsByDomain;
use crate::features::program_state::{ConstraintManager, ProgramState};
use crate::features::symbolic_values::SymbolicValue;

/// `result_index` of a yield returning a value that is not one of the arguments
pub const FRESH_RESULT: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum YieldKind {
    Happy {
        /// Argument returned as-is, or `FRESH_RESULT`
        result_index: i32,
        result_constraint: Option<ConstraintsByDomain>,
    },
    Exceptional {
        /// `None` for unknown runtime exceptions
        exception_type: Option<String>,
        /// Check that synthesized the yield
        check: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodYield {
    /// One set per declared parameter; empty when unconstrained
    pub parameters_constraints: Vec<ConstraintsByDomain>,
    pub kind: YieldKind,
}

impl MethodYield {
    pub fn happy(
        parameters_constraints: Vec<ConstraintsByDomain>,
        result_index: i32,
        result_constraint: Option<ConstraintsByDomain>,
    ) -> Self {
        Self {
            parameters_constraints,
            kind: YieldKind::Happy {
                result_index,
                result_constraint,
            },
        }
    }

    pub fn exceptional(
        parameters_constraints: Vec<ConstraintsByDomain>,
        exception_type: Option<String>,
    ) -> Self {
        Self {
            parameters_constraints,
            kind: YieldKind::Exceptional {
                exception_type,
                check: None,
            },
        }
    }

    pub fn check_based(
        parameters_constraints: Vec<ConstraintsByDomain>,
        exception_type: impl Into<String>,
        check: impl Into<String>,
    ) -> Self {
        Self {
            parameters_constraints,
            kind: YieldKind::Exceptional {
                exception_type: Some(exception_type.into()),
                check: Some(check.into()),
            },
        }
    }

    pub fn is_exceptional(&self) -> bool {
        matches!(self.kind, YieldKind::Exceptional { .. })
    }

    pub fn result_index(&self) -> Option<i32> {
        match &self.kind {
            YieldKind::Happy { result_index, .. } => Some(*result_index),
            YieldKind::Exceptional { .. } => None,
        }
    }

    pub fn result_constraint(&self) -> Option<&ConstraintsByDomain> {
        match &self.kind {
            YieldKind::Happy {
                result_constraint, ..
            } => result_constraint.as_ref(),
            YieldKind::Exceptional { .. } => None,
        }
    }

    pub fn exception_type(&self) -> Option<&str> {
        match &self.kind {
            YieldKind::Exceptional { exception_type, .. } => exception_type.as_deref(),
            YieldKind::Happy { .. } => None,
        }
    }

    /// Name of the check behind a check-based exceptional yield
    pub fn check(&self) -> Option<&str> {
        match &self.kind {
            YieldKind::Exceptional { check, .. } => check.as_deref(),
            YieldKind::Happy { .. } => None,
        }
    }

    /// Parameter slots that map onto call-site arguments
    ///
    /// For a varargs call whose argument count does not match the declared arity, the varargs
    /// slot is left out.
    fn applicable_slots(&self, argument_count: usize, varargs: bool) -> usize {
        let arity = self.parameters_constraints.len();
        if varargs && argument_count != arity {
            arity.saturating_sub(1)
        } else {
            arity.min(argument_count)
        }
    }

    /// Parameter constraints applied to the arguments of a call site
    ///
    /// `arguments` are in declaration order.
    pub fn parameters_applied(
        &self,
        manager: &mut ConstraintManager,
        state: &ProgramState,
        arguments: &[SymbolicValue],
        varargs: bool,
    ) -> Result<Vec<ProgramState>> {
        let usable = self.applicable_slots(arguments.len(), varargs);
        let mut states = vec![state.clone()];
        for (argument, constraints) in arguments
            .iter()
            .zip(&self.parameters_constraints)
            .take(usable)
        {
            for constraint in constraints.iter() {
                let mut next = Vec::new();
                for s in &states {
                    next.extend(manager.set_constraint(s, argument, constraint.clone())?);
                }
                states = next;
                if states.is_empty() {
                    return Ok(states);
                }
            }
        }
        Ok(states)
    }

    /// Whether `state` already holds every parameter constraint on its argument
    ///
    /// False when applying the yield would have to refine an argument first.
    pub fn parameters_known(
        &self,
        state: &ProgramState,
        arguments: &[SymbolicValue],
        varargs: bool,
    ) -> bool {
        let usable = self.applicable_slots(arguments.len(), varargs);
        arguments
            .iter()
            .zip(&self.parameters_constraints)
            .take(usable)
            .all(|(argument, constraints)| {
                constraints
                    .iter()
                    .all(|c| state.constraint(argument, &c.domain()) == Some(c))
            })
    }

    /// Value returned at a call site: the referenced argument, or `fresh`
    pub fn result_value(&self, arguments: &[SymbolicValue], fresh: SymbolicValue) -> SymbolicValue {
        match self.result_index() {
            Some(index) if index >= 0 && (index as usize) < arguments.len() => {
                arguments[index as usize].clone()
            }
            _ => fresh,
        }
    }
}

fn write_constraints(f: &mut fmt::Formatter<'_>, constraints: &[ConstraintsByDomain]) -> fmt::Result {
    f.write_str("[")?;
    for (i, c) in constraints.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", c)?;
    }
    f.write_str("]")
}

impl fmt::Display for MethodYield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{params: ")?;
        write_constraints(f, &self.parameters_constraints)?;
        match &self.kind {
            YieldKind::Happy {
                result_index,
                result_constraint,
            } => {
                write!(f, ", result: {}", result_index)?;
                if let Some(c) = result_constraint {
                    write!(f, " {}", c)?;
                }
            }
            YieldKind::Exceptional {
                exception_type,
                check,
            } => {
                write!(
                    f,
                    ", exception: {}",
                    exception_type.as_deref().unwrap_or("runtime exception")
                )?;
                if let Some(check) = check {
                    write!(f, " (from {})", check)?;
                }
            }
        }
        f.write_str("}")
    }
}
