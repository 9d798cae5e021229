//! Checker dispatcher
//!
//! Runs every registered check at each callback point. Statement callbacks are chained:
//! the states returned by one check are the input of the next, and an empty set stops the
//! chain.

use crate::errors::Result;
use crate::features::checks::domain::{Finding, Findings};
use crate::features::checks::ports::{CheckScope, CheckerContext, SeCheck};
use crate::features::exploded_graph::ProgramPoint;
use crate::features::program_state::ProgramState;
use crate::features::xproc::MethodYield;
use crate::shared::models::{Instruction, MethodSignature};

use super::division_by_zero::DivisionByZeroCheck;
use super::null_dereference::NullDereferenceCheck;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pre,
    Post,
}

pub struct CheckerDispatcher {
    checks: Vec<Box<dyn SeCheck>>,
    findings: Findings,
}

impl CheckerDispatcher {
    pub fn new(checks: Vec<Box<dyn SeCheck>>) -> Self {
        Self {
            checks,
            findings: Findings::new(),
        }
    }

    /// Dispatcher running no check
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Null dereference and division by zero
    pub fn with_default_checks() -> Self {
        Self::new(vec![
            Box::new(NullDereferenceCheck::new()),
            Box::new(DivisionByZeroCheck::new()),
        ])
    }

    pub fn register(&mut self, check: Box<dyn SeCheck>) {
        self.checks.push(check);
    }

    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub fn findings(&self) -> &Findings {
        &self.findings
    }

    pub fn take_findings(&mut self) -> Vec<Finding> {
        self.findings.drain()
    }

    /// Dispatcher with blank instances of the same checks, for a callee explored on demand
    pub fn nested(&self) -> Self {
        Self::new(self.checks.iter().map(|c| c.fresh()).collect())
    }

    /// Take over the findings of a nested dispatcher
    pub fn absorb(&mut self, mut nested: CheckerDispatcher) {
        for finding in nested.take_findings() {
            self.findings.report(finding);
        }
    }

    pub fn init(&mut self, method: &MethodSignature) {
        for check in &mut self.checks {
            check.init(method);
        }
    }

    pub fn execute_check_pre_statement(
        &mut self,
        scope: &mut CheckScope<'_>,
        point: ProgramPoint,
        state: ProgramState,
        instruction: &Instruction,
    ) -> Result<Vec<ProgramState>> {
        self.chain(Phase::Pre, scope, point, state, instruction)
    }

    pub fn execute_check_post_statement(
        &mut self,
        scope: &mut CheckScope<'_>,
        point: ProgramPoint,
        state: ProgramState,
        instruction: &Instruction,
    ) -> Result<Vec<ProgramState>> {
        self.chain(Phase::Post, scope, point, state, instruction)
    }

    fn chain(
        &mut self,
        phase: Phase,
        scope: &mut CheckScope<'_>,
        point: ProgramPoint,
        state: ProgramState,
        instruction: &Instruction,
    ) -> Result<Vec<ProgramState>> {
        let mut states = vec![state];
        for check in &mut self.checks {
            let mut next = Vec::new();
            for state in states {
                let name = check.name();
                let mut ctx = CheckerContext::new(scope, &mut self.findings, name, point, state);
                let produced = match phase {
                    Phase::Pre => check.check_pre_statement(&mut ctx, instruction)?,
                    Phase::Post => check.check_post_statement(&mut ctx, instruction)?,
                };
                next.extend(produced);
            }
            states = next;
            if states.is_empty() {
                break;
            }
        }
        Ok(states)
    }

    pub fn execute_check_end_of_execution_path(
        &mut self,
        scope: &mut CheckScope<'_>,
        point: ProgramPoint,
        state: &ProgramState,
    ) {
        for check in &mut self.checks {
            let name = check.name();
            let mut ctx =
                CheckerContext::new(scope, &mut self.findings, name, point, state.clone());
            check.check_end_of_execution_path(&mut ctx);
        }
    }

    pub fn execute_check_end_of_execution(&mut self, method: &MethodSignature) {
        for check in &mut self.checks {
            check.check_end_of_execution(method, &mut self.findings);
        }
    }

    /// Hand a check-based callee yield back to the check that created it
    pub fn execute_on_exceptional_yield(
        &mut self,
        scope: &mut CheckScope<'_>,
        point: ProgramPoint,
        state: &ProgramState,
        method_yield: &MethodYield,
        callee: &MethodSignature,
    ) {
        let Some(origin) = method_yield.check() else {
            return;
        };
        for check in self.checks.iter_mut().filter(|c| c.name() == origin) {
            let name = check.name();
            let mut ctx =
                CheckerContext::new(scope, &mut self.findings, name, point, state.clone());
            check.on_exceptional_yield(&mut ctx, method_yield, callee);
        }
    }
}

impl Default for CheckerDispatcher {
    fn default() -> Self {
        Self::with_default_checks()
    }
}

impl std::fmt::Debug for CheckerDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckerDispatcher")
            .field("checks", &self.check_names())
            .field("findings", &self.findings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::features::program_state::ConstraintManager;
    use crate::features::xproc::{BehaviorCache, MethodBehavior};
    use crate::shared::models::{BlockId, Literal};

    /// Cuts every path and reports once per callback
    struct Cutter;

    impl SeCheck for Cutter {
        fn name(&self) -> &'static str {
            "Cutter"
        }

        fn fresh(&self) -> Box<dyn SeCheck> {
            Box::new(Cutter)
        }

        fn check_pre_statement(
            &mut self,
            ctx: &mut CheckerContext<'_>,
            _instruction: &Instruction,
        ) -> Result<Vec<ProgramState>> {
            ctx.report_issue("cut");
            Ok(Vec::new())
        }
    }

    /// Fails the test if called after a cut
    struct Unreachable;

    impl SeCheck for Unreachable {
        fn name(&self) -> &'static str {
            "Unreachable"
        }

        fn fresh(&self) -> Box<dyn SeCheck> {
            Box::new(Unreachable)
        }

        fn check_pre_statement(
            &mut self,
            _ctx: &mut CheckerContext<'_>,
            _instruction: &Instruction,
        ) -> Result<Vec<ProgramState>> {
            panic!("chain should have stopped");
        }
    }

    #[test]
    fn test_empty_result_stops_the_chain() {
        let signature = MethodSignature::parse("A#m()V").unwrap();
        let mut manager = ConstraintManager::default();
        let mut behavior = MethodBehavior::new(signature.clone());
        let cache = BehaviorCache::new(EngineConfig::default());
        let mut scope = CheckScope {
            method: &signature,
            manager: &mut manager,
            behavior: &mut behavior,
            cache: &cache,
        };

        let mut dispatcher = CheckerDispatcher::new(vec![Box::new(Cutter), Box::new(Unreachable)]);
        let point = ProgramPoint::block_entry(BlockId(1));
        let states = dispatcher
            .execute_check_pre_statement(
                &mut scope,
                point,
                ProgramState::empty_state(),
                &Instruction::Literal(Literal::Null),
            )
            .unwrap();

        assert!(states.is_empty());
        assert_eq!(dispatcher.findings().len(), 1);
        let findings = dispatcher.take_findings();
        assert_eq!(findings[0].check, "Cutter");
        assert_eq!(findings[0].point, Some(point));
    }

    #[test]
    fn test_nested_dispatcher_hands_findings_back() {
        let signature = MethodSignature::parse("A#m()V").unwrap();
        let mut manager = ConstraintManager::default();
        let mut behavior = MethodBehavior::new(signature.clone());
        let cache = BehaviorCache::new(EngineConfig::default());
        let mut scope = CheckScope {
            method: &signature,
            manager: &mut manager,
            behavior: &mut behavior,
            cache: &cache,
        };

        let mut dispatcher = CheckerDispatcher::new(vec![Box::new(Cutter)]);
        let mut nested = dispatcher.nested();
        assert_eq!(nested.check_names(), vec!["Cutter"]);
        nested
            .execute_check_pre_statement(
                &mut scope,
                ProgramPoint::block_entry(BlockId(1)),
                ProgramState::empty_state(),
                &Instruction::Literal(Literal::Null),
            )
            .unwrap();
        assert!(dispatcher.findings().is_empty());

        dispatcher.absorb(nested);
        assert_eq!(dispatcher.findings().len(), 1);
    }

    #[test]
    fn test_default_checks() {
        assert_eq!(
            CheckerDispatcher::default().check_names(),
            vec!["NullDereferenceCheck", "DivisionByZeroCheck"]
        );
        assert!(CheckerDispatcher::empty().check_names().is_empty());
    }
}
