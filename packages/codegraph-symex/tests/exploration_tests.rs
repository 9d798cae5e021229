//! Method exploration end to end
//!
//! Each test builds a small model, analyzes it in a session without checks, and inspects
//! the behaviors the walker produced.

mod common;

use codegraph_symex::shared::models::{Instruction, Literal, SemanticModel, Terminator};
use codegraph_symex::{
    AnalysisReport, AnalysisSession, CheckerDispatcher, Constraint, ConstraintDomain,
    EngineConfig, Interruption, WorklistOrder,
};
use codegraph_symex::features::xproc::{FRESH_RESULT, ILLEGAL_ARGUMENT_EXCEPTION};
use common::*;
use pretty_assertions::assert_eq;

fn analyze_with(config: EngineConfig, model: &SemanticModel) -> AnalysisReport {
    let mut session = AnalysisSession::with_dispatcher(config, CheckerDispatcher::empty()).unwrap();
    session.analyze(model)
}

fn analyze(model: &SemanticModel) -> AnalysisReport {
    analyze_with(EngineConfig::default(), model)
}

#[test]
fn test_null_or_flag_yields() {
    let mut model = SemanticModel::new();
    fixture_null_or_flag(&mut model);

    let report = analyze(&model);
    let behavior = report.behavior(NULL_OR_FLAG).unwrap();
    assert!(behavior.is_complete());
    assert_yield_counts(behavior, 3, 0);

    let returning_b: Vec<_> = behavior
        .happy_path_yields()
        .filter(|y| y.result_index() == Some(1))
        .collect();
    assert_eq!(returning_b.len(), 1);
    assert_eq!(
        returning_b[0].parameters_constraints,
        vec![constraints(&[Constraint::NotNull]), constraints(&[Constraint::False])]
    );

    let returning_true = behavior
        .happy_path_yields()
        .find(|y| y.result_constraint().is_some_and(|c| c.contains(&Constraint::True)))
        .unwrap();
    assert_eq!(returning_true.result_index(), Some(FRESH_RESULT));
    assert_eq!(
        returning_true.parameters_constraints,
        vec![constraints(&[Constraint::Null]), constraints(&[])]
    );

    let returning_false = behavior
        .happy_path_yields()
        .find(|y| {
            y.result_index() == Some(FRESH_RESULT)
                && y.result_constraint().is_some_and(|c| c.contains(&Constraint::False))
        })
        .unwrap();
    assert_eq!(
        returning_false.parameters_constraints,
        vec![constraints(&[Constraint::NotNull]), constraints(&[Constraint::True])]
    );

    let outcome = report.exploration(NULL_OR_FLAG).unwrap();
    assert!(outcome.completed);
    assert_eq!(outcome.end_of_paths, 3);
}

#[test]
fn test_depth_first_order_finds_the_same_yields() {
    let mut model = SemanticModel::new();
    fixture_null_or_flag(&mut model);

    let report = analyze_with(EngineConfig::default().worklist_order(WorklistOrder::Lifo), &model);
    let behavior = report.behavior(NULL_OR_FLAG).unwrap();
    assert_yield_counts(behavior, 3, 0);
}

#[test]
fn test_complementary_results_are_reduced() {
    let mut model = SemanticModel::new();
    fixture_flag_to_boolean(&mut model);

    let report = analyze(&model);
    let behavior = report.behavior(FLAG_TO_BOOLEAN).unwrap();
    assert_eq!(report.exploration(FLAG_TO_BOOLEAN).unwrap().end_of_paths, 2);
    assert_yield_counts(behavior, 1, 0);

    let reduced = &behavior.yields()[0];
    assert_eq!(reduced.result_index(), Some(FRESH_RESULT));
    assert!(reduced
        .result_constraint()
        .map_or(true, |c| !c.has_domain(&ConstraintDomain::Boolean)));
    assert_eq!(reduced.parameters_constraints, vec![constraints(&[])]);
}

#[test]
fn test_step_limit_leaves_behavior_incomplete() {
    let mut model = SemanticModel::new();
    fixture_null_or_flag(&mut model);

    let report = analyze_with(EngineConfig::default().max_steps(3), &model);
    let outcome = report.exploration(NULL_OR_FLAG).unwrap();
    assert!(!outcome.completed);
    assert_eq!(outcome.interruption, Some(Interruption::MaxSteps));

    let behavior = report.behavior(NULL_OR_FLAG).unwrap();
    assert!(behavior.is_visited());
    assert!(!behavior.is_complete());
}

#[test]
fn test_loops_terminate() {
    let mut model = SemanticModel::new();
    let mut m = MethodBuilder::new(&mut model, "com.acme.Loop#spin()V");
    let head = m.block();
    let after = m.block_with(vec![], Terminator::ReturnVoid);
    m.fill(
        head,
        vec![call(UNKNOWN_FLAG, 0)],
        Terminator::Branch {
            when_true: head,
            when_false: after,
        },
    );
    m.build();

    let report = analyze(&model);
    let outcome = report.exploration("com.acme.Loop#spin()V").unwrap();
    assert!(outcome.completed);
    assert!(outcome.end_of_paths >= 1);
    assert_yield_counts(report.behavior("com.acme.Loop#spin()V").unwrap(), 1, 0);
}

#[test]
fn test_caught_declared_exception() {
    let mut model = SemanticModel::new();
    fixture_read(&mut model);

    let report = analyze(&model);
    let behavior = report.behavior(READ_OR_NULL).unwrap();
    assert_yield_counts(behavior, 2, 0);
    let results: Vec<_> = behavior
        .happy_path_yields()
        .map(|y| y.result_constraint().cloned())
        .collect();
    assert!(results.contains(&Some(constraints(&[Constraint::Null]))));
    assert!(results.contains(&Some(constraints(&[Constraint::NotNull]))));
}

#[test]
fn test_uncaught_declared_exception() {
    let mut model = SemanticModel::new();
    fixture_read(&mut model);

    let report = analyze(&model);
    let behavior = report.behavior(READ_UNGUARDED).unwrap();
    assert_yield_counts(behavior, 1, 1);
    let exceptional = behavior.exceptional_path_yields().next().unwrap();
    assert_eq!(exceptional.exception_type(), Some("java.io.IOException"));
    // Methods without a body are not explored
    assert!(report.exploration(READ).is_none());
}

#[test]
fn test_callee_behavior_is_applied() {
    let mut model = SemanticModel::new();

    // boolean caller() { return method(null, false); }
    let mut m = MethodBuilder::new(&mut model, "com.acme.Caller#caller()Z");
    m.block_with(
        vec![
            Instruction::Literal(Literal::Null),
            Instruction::Literal(Literal::Bool(false)),
            call(NULL_OR_FLAG, 2),
        ],
        Terminator::Return,
    );
    m.build();
    fixture_null_or_flag(&mut model);

    let report = analyze(&model);
    // Only the yield with `a` null applies: the caller always returns true
    let caller = report.behavior("com.acme.Caller#caller()Z").unwrap();
    assert_yield_counts(caller, 1, 0);
    assert!(caller.yields()[0]
        .result_constraint()
        .is_some_and(|c| c.contains(&Constraint::True)));
    // The callee was explored on demand, before the session reached it
    assert!(report.exploration(NULL_OR_FLAG).is_none());
    assert!(report.behavior(NULL_OR_FLAG).unwrap().is_complete());
}

#[test]
fn test_check_argument_splits_on_its_condition() {
    let signature = "com.acme.Guard#validate(Z)V";
    let mut model = SemanticModel::new();

    // void validate(boolean b) { Preconditions.checkArgument(b); }
    let mut m = MethodBuilder::new(&mut model, signature);
    let b = m.param("b", "boolean");
    m.block_with(
        vec![
            Instruction::Load(b),
            call("com.google.common.base.Preconditions#checkArgument(Z)V", 1),
        ],
        Terminator::ReturnVoid,
    );
    m.build();

    let report = analyze(&model);
    let behavior = report.behavior(signature).unwrap();
    assert_yield_counts(behavior, 1, 1);
    let happy = behavior.happy_path_yields().next().unwrap();
    assert!(happy.parameters_constraints[0].contains(&Constraint::True));
    let exceptional = behavior.exceptional_path_yields().next().unwrap();
    assert!(exceptional.parameters_constraints[0].contains(&Constraint::False));
    assert_eq!(exceptional.exception_type(), Some(ILLEGAL_ARGUMENT_EXCEPTION));
}
