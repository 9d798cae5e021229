//! Null dereference check
//!
//! An instance call dereferences its receiver. A receiver known to be null raises an issue
//! and ends the path; otherwise the path continues with the receiver `NOT_NULL`. When the
//! receiver is a parameter, the method gets a check-based `NullPointerException` yield so
//! that callers passing `null` are reported at their call site.

use tracing::debug;

use crate::errors::Result;
use crate::features::checks::ports::{CheckerContext, SeCheck};
use crate::features::constraints::{Constraint, ConstraintDomain};
use crate::features::program_state::ProgramState;
use crate::features::xproc::MethodYield;
use crate::shared::models::{Instruction, MethodSignature};

pub const NULL_POINTER_EXCEPTION: &str = "java.lang.NullPointerException";

#[derive(Debug, Default)]
pub struct NullDereferenceCheck;

impl NullDereferenceCheck {
    pub fn new() -> Self {
        Self
    }
}

impl SeCheck for NullDereferenceCheck {
    fn name(&self) -> &'static str {
        "NullDereferenceCheck"
    }

    fn fresh(&self) -> Box<dyn SeCheck> {
        Box::new(Self::new())
    }

    fn check_pre_statement(
        &mut self,
        ctx: &mut CheckerContext<'_>,
        instruction: &Instruction,
    ) -> Result<Vec<ProgramState>> {
        let Instruction::Invoke(invocation) = instruction else {
            return Ok(vec![ctx.state().clone()]);
        };
        if !invocation.receiver {
            return Ok(vec![ctx.state().clone()]);
        }
        // Receiver sits right below the arguments
        let Some(receiver) = ctx
            .state()
            .peek_values(invocation.arguments + 1)
            .and_then(|values| values.last().cloned())
        else {
            return Ok(vec![ctx.state().clone()]);
        };

        let is_null =
            ctx.state().constraint(&receiver, &ConstraintDomain::Nullness) == Some(&Constraint::Null);
        if is_null {
            let name = MethodSignature::parse(&invocation.signature)
                .map(|s| s.name().to_string())
                .unwrap_or_else(|_| invocation.signature.clone());
            ctx.report_issue(format!(
                "A \"NullPointerException\" could be thrown; the receiver of \"{}\" is null here.",
                name
            ));
            if ctx.add_exceptional_yield(&receiver, NULL_POINTER_EXCEPTION).is_some() {
                debug!("Null dereference of a parameter in {}", ctx.method());
            }
            return Ok(Vec::new());
        }
        ctx.set_constraint(&receiver, Constraint::NotNull)
    }

    fn on_exceptional_yield(
        &mut self,
        ctx: &mut CheckerContext<'_>,
        _method_yield: &MethodYield,
        callee: &MethodSignature,
    ) {
        ctx.report_issue(format!(
            "A \"NullPointerException\" will be thrown when invoking method \"{}()\".",
            callee.name()
        ));
    }
}
