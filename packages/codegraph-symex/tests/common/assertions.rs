//! Custom assertions for test verification

use codegraph_symex::{AnalysisReport, Constraint, ConstraintsByDomain, MethodBehavior};

/// Assert the number of happy and exceptional yields of a behavior
pub fn assert_yield_counts(behavior: &MethodBehavior, happy: usize, exceptional: usize) {
    assert_eq!(
        (
            behavior.happy_path_yields().count(),
            behavior.exceptional_path_yields().count()
        ),
        (happy, exceptional),
        "Unexpected yields for {}: {:?}",
        behavior.signature(),
        behavior.yields().iter().map(|y| y.to_string()).collect::<Vec<_>>()
    );
}

/// Assert that a finding of `check` was reported for `method`
pub fn assert_finding(report: &AnalysisReport, check: &str, method: &str) {
    assert!(
        report
            .findings
            .iter()
            .any(|f| f.check == check && f.method == method),
        "Expected a {check} finding in {method}, got: {:?}",
        report.findings
    );
}

pub fn constraints(items: &[Constraint]) -> ConstraintsByDomain {
    ConstraintsByDomain::of(items.iter().cloned())
}
