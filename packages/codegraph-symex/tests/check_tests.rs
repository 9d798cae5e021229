//! Checks driven by the walker: built-in checks and a custom one

mod common;

use codegraph_symex::features::checks::{Findings, NULL_POINTER_EXCEPTION};
use codegraph_symex::shared::models::{ArithmeticOp, Instruction, MethodSignature, SemanticModel, Terminator};
use codegraph_symex::{
    AnalysisReport, AnalysisSession, CheckerContext, CheckerDispatcher, Constraint, EngineConfig,
    Finding, SeCheck,
};
use common::*;
use pretty_assertions::assert_eq;

fn analyze(model: &SemanticModel) -> AnalysisReport {
    AnalysisSession::new(EngineConfig::default())
        .unwrap()
        .analyze(model)
}

#[test]
fn test_nullable_receiver_is_reported() {
    let mut model = SemanticModel::new();
    fixture_dereference(&mut model);

    let report = analyze(&model);
    assert_eq!(report.findings.len(), 1);
    assert_finding(&report, "NullDereferenceCheck", DEREFERENCE);
    assert!(report.findings[0].message.contains("\"toString\""));

    let behavior = report.behavior(DEREFERENCE).unwrap();
    assert_yield_counts(behavior, 1, 1);
    let happy = behavior.happy_path_yields().next().unwrap();
    assert_eq!(happy.parameters_constraints, vec![constraints(&[Constraint::NotNull])]);
    let exceptional = behavior.exceptional_path_yields().next().unwrap();
    assert_eq!(exceptional.check(), Some("NullDereferenceCheck"));
    assert_eq!(exceptional.exception_type(), Some(NULL_POINTER_EXCEPTION));
    assert_eq!(exceptional.parameters_constraints, vec![constraints(&[Constraint::Null])]);
}

#[test]
fn test_null_argument_is_reported_at_call_site() {
    let mut model = SemanticModel::new();
    fixture_pass_null(&mut model);
    fixture_dereference(&mut model);

    let report = analyze(&model);
    assert_eq!(report.findings.len(), 2);
    assert_finding(&report, "NullDereferenceCheck", DEREFERENCE);
    assert_finding(&report, "NullDereferenceCheck", PASS_NULL);
    let at_call_site = report
        .findings
        .iter()
        .find(|f| f.method == PASS_NULL)
        .unwrap();
    assert_eq!(
        at_call_site.message,
        "A \"NullPointerException\" will be thrown when invoking method \"dereference()\"."
    );

    // Passing null always ends in the exception
    let caller = report.behavior(PASS_NULL).unwrap();
    assert_yield_counts(caller, 0, 1);
    assert_eq!(
        caller.yields()[0].exception_type(),
        Some(NULL_POINTER_EXCEPTION)
    );
}

#[test]
fn test_argument_of_unknown_nullness_is_not_reported() {
    let mut model = SemanticModel::new();
    fixture_forward(&mut model);
    fixture_dereference(&mut model);

    let report = analyze(&model);
    assert_eq!(report.findings.len(), 1);
    assert_finding(&report, "NullDereferenceCheck", DEREFERENCE);
    assert!(report.findings.iter().all(|f| f.method != FORWARD));

    // The null path still ends in the exception
    let forward = report.behavior(FORWARD).unwrap();
    assert_yield_counts(forward, 1, 1);
    let exceptional = forward.exceptional_path_yields().next().unwrap();
    assert_eq!(exceptional.exception_type(), Some(NULL_POINTER_EXCEPTION));
    assert_eq!(exceptional.parameters_constraints, vec![constraints(&[Constraint::Null])]);
}

#[test]
fn test_findings_across_merged_files() {
    let mut callers = SemanticModel::new();
    fixture_forward(&mut callers);
    fixture_pass_null(&mut callers);
    let mut callees = SemanticModel::new();
    fixture_dereference(&mut callees);

    let added = callers.merge(callees);
    assert_eq!(added.len(), 1);
    let report = analyze(&callers);

    assert_eq!(report.findings.len(), 2, "{:?}", report.findings);
    assert_finding(&report, "NullDereferenceCheck", DEREFERENCE);
    assert_finding(&report, "NullDereferenceCheck", PASS_NULL);
}

#[test]
fn test_require_non_null_guards_the_dereference() {
    let mut model = SemanticModel::new();
    fixture_guarded(&mut model);

    let report = analyze(&model);
    assert!(report.findings.is_empty(), "{:?}", report.findings);

    let behavior = report.behavior(GUARDED).unwrap();
    assert_yield_counts(behavior, 1, 1);
    let exceptional = behavior.exceptional_path_yields().next().unwrap();
    assert_eq!(exceptional.exception_type(), None);
    assert_eq!(exceptional.parameters_constraints, vec![constraints(&[Constraint::Null])]);
}

#[test]
fn test_division_by_zero_literal() {
    let mut model = SemanticModel::new();
    fixture_divide_by_zero(&mut model);

    let report = analyze(&model);
    assert_finding(&report, "DivisionByZeroCheck", DIVIDE_BY_ZERO);
    assert_eq!(
        report.findings[0].message,
        "Make sure this divisor can't be zero before doing this division."
    );
    // Every path divides by zero
    let behavior = report.behavior(DIVIDE_BY_ZERO).unwrap();
    assert!(behavior.is_complete());
    assert!(behavior.yields().is_empty());
}

#[test]
fn test_divisor_is_non_zero_after_division() {
    let signature = "com.acme.Math#divide(II)I";
    let mut model = SemanticModel::new();
    let mut m = MethodBuilder::new(&mut model, signature);
    let x = m.param("x", "int");
    let y = m.param("y", "int");
    m.block_with(
        vec![
            Instruction::Load(x),
            Instruction::Load(y),
            Instruction::Arithmetic(ArithmeticOp::Div),
        ],
        Terminator::Return,
    );
    m.build();

    let report = analyze(&model);
    assert!(report.findings.is_empty());
    let behavior = report.behavior(signature).unwrap();
    assert_yield_counts(behavior, 1, 0);
    assert_eq!(
        behavior.yields()[0].parameters_constraints,
        vec![constraints(&[]), constraints(&[Constraint::NonZero])]
    );
}

/// Reports the number of paths of each explored method
#[derive(Default)]
struct PathCounter {
    paths: usize,
}

impl SeCheck for PathCounter {
    fn name(&self) -> &'static str {
        "PathCounter"
    }

    fn fresh(&self) -> Box<dyn SeCheck> {
        Box::new(PathCounter::default())
    }

    fn init(&mut self, _method: &MethodSignature) {
        self.paths = 0;
    }

    fn check_end_of_execution_path(&mut self, _ctx: &mut CheckerContext<'_>) {
        self.paths += 1;
    }

    fn check_end_of_execution(&mut self, method: &MethodSignature, findings: &mut Findings) {
        findings.report(Finding {
            check: self.name().to_string(),
            method: method.to_string(),
            point: None,
            message: format!("{} path(s)", self.paths),
        });
    }
}

#[test]
fn test_custom_check_sees_every_path() {
    let mut model = SemanticModel::new();
    fixture_null_or_flag(&mut model);

    let mut dispatcher = CheckerDispatcher::empty();
    dispatcher.register(Box::new(PathCounter::default()));
    let mut session = AnalysisSession::with_dispatcher(EngineConfig::default(), dispatcher).unwrap();
    let report = session.analyze(&model);

    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].method, NULL_OR_FLAG);
    assert_eq!(report.findings[0].message, "3 path(s)");
    // Findings are handed over once
    assert!(session.dispatcher().findings().is_empty());
}

#[test]
fn test_callee_explored_on_demand_keeps_caller_counts() {
    let caller = "com.acme.Chain#caller(Ljava/lang/Object;)V";
    let callee = "com.acme.Chain#callee(Ljava/lang/Object;)V";
    let mut model = SemanticModel::new();
    // The caller comes first, so the callee is explored from its call site
    calling(&mut model, caller, callee);
    calling(&mut model, callee, "com.acme.Lib#sink(Ljava/lang/Object;)V");

    let mut dispatcher = CheckerDispatcher::empty();
    dispatcher.register(Box::new(PathCounter::default()));
    let report = AnalysisSession::with_dispatcher(EngineConfig::default(), dispatcher)
        .unwrap()
        .analyze(&model);

    assert_eq!(report.explorations.len(), 1);
    assert_eq!(report.findings.len(), 2);
    for method in [caller, callee] {
        let finding = report.findings.iter().find(|f| f.method == method).unwrap();
        assert_eq!(finding.message, "1 path(s)");
    }
}
