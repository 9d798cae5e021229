//! Division by zero check
//!
//! Tracks the Zero domain on integer values and reports divisions whose divisor is known
//! to be zero.
//!
//! # Features
//!
//! - Integer literals are `ZERO` or `NON_ZERO`
//! - `0 * x`, `0 / x`, `0 % x` are `ZERO`; the product of two non-zero values is `NON_ZERO`
//! - `x + 0` and `x - 0` keep the zeroness of `x`
//! - A division that does not fault leaves its divisor `NON_ZERO`

use crate::errors::Result;
use crate::features::checks::ports::{CheckerContext, SeCheck};
use crate::features::constraints::{Constraint, ConstraintDomain};
use crate::features::program_state::ProgramState;
use crate::features::symbolic_values::SymbolicValue;
use crate::shared::models::{ArithmeticOp, Instruction, Literal};

pub const ARITHMETIC_EXCEPTION: &str = "java.lang.ArithmeticException";

#[derive(Debug, Default)]
pub struct DivisionByZeroCheck {
    /// Zeroness of the operands of the arithmetic instruction being executed, shared by
    /// every state the instruction produces
    operands: Option<(Option<Constraint>, Option<Constraint>)>,
}

impl DivisionByZeroCheck {
    pub fn new() -> Self {
        Self::default()
    }
}

fn zeroness(state: &ProgramState, value: &SymbolicValue) -> Option<Constraint> {
    state.constraint(value, &ConstraintDomain::Zero).cloned()
}

/// Zeroness of `left op right`
fn result_zeroness(
    op: ArithmeticOp,
    left: Option<&Constraint>,
    right: Option<&Constraint>,
) -> Option<Constraint> {
    let zero = Some(&Constraint::Zero);
    let non_zero = Some(&Constraint::NonZero);
    match op {
        ArithmeticOp::Mul if left == zero || right == zero => Some(Constraint::Zero),
        ArithmeticOp::Mul if left == non_zero && right == non_zero => Some(Constraint::NonZero),
        ArithmeticOp::Div | ArithmeticOp::Rem if left == zero => Some(Constraint::Zero),
        ArithmeticOp::Add | ArithmeticOp::Sub if right == zero => left.cloned(),
        ArithmeticOp::Add if left == zero => right.cloned(),
        _ => None,
    }
}

impl SeCheck for DivisionByZeroCheck {
    fn name(&self) -> &'static str {
        "DivisionByZeroCheck"
    }

    fn fresh(&self) -> Box<dyn SeCheck> {
        Box::new(Self::new())
    }

    fn check_pre_statement(
        &mut self,
        ctx: &mut CheckerContext<'_>,
        instruction: &Instruction,
    ) -> Result<Vec<ProgramState>> {
        self.operands = None;
        let Instruction::Arithmetic(op) = instruction else {
            return Ok(vec![ctx.state().clone()]);
        };
        let Some(values) = ctx.state().peek_values(2) else {
            return Ok(vec![ctx.state().clone()]);
        };
        let (right, left) = (&values[0], &values[1]);
        self.operands = Some((zeroness(ctx.state(), left), zeroness(ctx.state(), right)));

        if !op.is_division() {
            return Ok(vec![ctx.state().clone()]);
        }
        if zeroness(ctx.state(), right) == Some(Constraint::Zero) {
            ctx.report_issue("Make sure this divisor can't be zero before doing this division.");
            ctx.add_exceptional_yield(right, ARITHMETIC_EXCEPTION);
            return Ok(Vec::new());
        }
        ctx.set_constraint(right, Constraint::NonZero)
    }

    fn check_post_statement(
        &mut self,
        ctx: &mut CheckerContext<'_>,
        instruction: &Instruction,
    ) -> Result<Vec<ProgramState>> {
        let Some(top) = ctx.state().peek_value().cloned() else {
            return Ok(vec![ctx.state().clone()]);
        };
        let constraint = match instruction {
            Instruction::Literal(Literal::Int(0)) => Some(Constraint::Zero),
            Instruction::Literal(Literal::Int(_)) => Some(Constraint::NonZero),
            Instruction::Arithmetic(op) => self
                .operands
                .as_ref()
                .and_then(|(left, right)| result_zeroness(*op, left.as_ref(), right.as_ref())),
            _ => None,
        };
        match constraint {
            Some(constraint) => ctx.set_constraint(&top, constraint),
            None => Ok(vec![ctx.state().clone()]),
        }
    }
}
