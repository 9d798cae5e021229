//! Check ports
//!
//! Checks observe the exploration through `SeCheck` callbacks. Every callback receives a
//! `CheckerContext` scoped to one state at one program point.
//!
//! ```text
//!   walker ──► dispatcher ──► check_pre_statement(ctx, instruction) ─► [states]
//!                         ──► check_post_statement(ctx, instruction) ─► [states]
//!                         ──► check_end_of_execution_path(ctx)
//!                         ──► on_exceptional_yield(ctx, yield, callee)
//!                         ──► check_end_of_execution(method, findings)
//! ```

use std::sync::Arc;

use crate::errors::Result;
use crate::features::checks::domain::{Finding, Findings};
use crate::features::constraints::Constraint;
use crate::features::exploded_graph::ProgramPoint;
use crate::features::program_state::{ConstraintManager, ProgramState};
use crate::features::symbolic_values::SymbolicValue;
use crate::features::xproc::{BehaviorCache, MethodBehavior, MethodYield};
use crate::shared::models::{Instruction, MethodSignature};

// ============================================================================
// Context
// ============================================================================

/// What the walker lends to checks while exploring one method
pub struct CheckScope<'a> {
    pub method: &'a MethodSignature,
    pub manager: &'a mut ConstraintManager,
    pub behavior: &'a mut MethodBehavior,
    pub cache: &'a BehaviorCache,
}

pub struct CheckerContext<'a> {
    check: &'static str,
    point: ProgramPoint,
    state: ProgramState,
    method: &'a MethodSignature,
    manager: &'a mut ConstraintManager,
    behavior: &'a mut MethodBehavior,
    cache: &'a BehaviorCache,
    findings: &'a mut Findings,
}

impl<'a> CheckerContext<'a> {
    pub(crate) fn new(
        scope: &'a mut CheckScope<'_>,
        findings: &'a mut Findings,
        check: &'static str,
        point: ProgramPoint,
        state: ProgramState,
    ) -> Self {
        Self {
            check,
            point,
            state,
            method: scope.method,
            manager: &mut *scope.manager,
            behavior: &mut *scope.behavior,
            cache: scope.cache,
            findings,
        }
    }

    pub fn state(&self) -> &ProgramState {
        &self.state
    }

    pub fn point(&self) -> ProgramPoint {
        self.point
    }

    /// Method being explored
    pub fn method(&self) -> &MethodSignature {
        self.method
    }

    pub fn constraint_manager(&mut self) -> &mut ConstraintManager {
        self.manager
    }

    /// Current state with `constraint` set on `value`
    pub fn set_constraint(
        &mut self,
        value: &SymbolicValue,
        constraint: Constraint,
    ) -> Result<Vec<ProgramState>> {
        self.manager.set_constraint(&self.state, value, constraint)
    }

    pub fn report_issue(&mut self, message: impl Into<String>) {
        self.findings.report(Finding {
            check: self.check.to_string(),
            method: self.method.as_str().to_string(),
            point: Some(self.point),
            message: message.into(),
        });
    }

    /// Record that the method throws when `value` is in its current state
    ///
    /// Only parameters yield: constraints on locals say nothing to callers.
    pub fn add_exceptional_yield(
        &mut self,
        value: &SymbolicValue,
        exception_type: &str,
    ) -> Option<MethodYield> {
        if !self.behavior.parameters().contains(value) {
            return None;
        }
        Some(
            self.behavior
                .create_check_based_yield(&self.state, exception_type, self.check),
        )
    }

    /// Known behavior of a method, without triggering its exploration
    pub fn peek_method_behavior(&self, signature: &str) -> Option<Arc<MethodBehavior>> {
        self.cache.peek(signature)
    }
}

// ============================================================================
// Check trait
// ============================================================================

/// Symbolic execution check
///
/// Pre/post statement callbacks return the states exploration continues with: the
/// unchanged state, refined states, or nothing to cut the path.
pub trait SeCheck {
    /// Stable identifier, used to tag check-based yields
    fn name(&self) -> &'static str;

    /// Blank instance for a callee explored from a call site
    ///
    /// The caller's exploration is suspended meanwhile and keeps its own check state.
    fn fresh(&self) -> Box<dyn SeCheck>;

    /// Called before each method exploration
    fn init(&mut self, _method: &MethodSignature) {}

    fn check_pre_statement(
        &mut self,
        ctx: &mut CheckerContext<'_>,
        _instruction: &Instruction,
    ) -> Result<Vec<ProgramState>> {
        Ok(vec![ctx.state().clone()])
    }

    fn check_post_statement(
        &mut self,
        ctx: &mut CheckerContext<'_>,
        _instruction: &Instruction,
    ) -> Result<Vec<ProgramState>> {
        Ok(vec![ctx.state().clone()])
    }

    /// A state reached the exit block
    fn check_end_of_execution_path(&mut self, _ctx: &mut CheckerContext<'_>) {}

    /// The method exploration finished
    fn check_end_of_execution(&mut self, _method: &MethodSignature, _findings: &mut Findings) {}

    /// A callee yield created by this check applies at the current call site
    fn on_exceptional_yield(
        &mut self,
        _ctx: &mut CheckerContext<'_>,
        _method_yield: &MethodYield,
        _callee: &MethodSignature,
    ) {
    }
}
