//! Fixed implication tables of the relation algebra
//!
//! Derived from the semantics of each kind over a total order, with `==` (reference
//! equality) implying `.equals()`, and `!.equals()` implying `!=`.

use crate::features::symbolic_values::domain::{RelationKind, RelationState};

use RelationKind::*;
use RelationState::{Fulfilled as F, Undetermined as D, Unfulfilled as U};

/// State of `v kind v` for any value `v`
pub fn same_operand_state(kind: RelationKind) -> RelationState {
    match kind {
        Equal | GreaterThanOrEqual | LessThanOrEqual | MethodEquals => F,
        NotEqual | LessThan | GreaterThan | NotMethodEquals => U,
    }
}

/// State of `tested(a, b)` knowing `hypothesis` on the same pair
///
/// `same_orientation` is true when the hypothesis is stated as `(a, b)`, false for `(b, a)`.
/// Accepts non-canonical kinds on both sides.
pub fn direct_implication(
    hypothesis: RelationKind,
    tested: RelationKind,
    same_orientation: bool,
) -> RelationState {
    let (hypothesis, h_swapped) = hypothesis.normalize();
    let (tested, t_swapped) = tested.normalize();
    let same_orientation = same_orientation ^ h_swapped ^ t_swapped;

    if same_orientation || hypothesis.is_unordered() {
        forward(hypothesis, tested)
    } else {
        reversed(hypothesis, tested)
    }
}

/// `hypothesis(a, b)` => `tested(a, b)`, canonical kinds
fn forward(hypothesis: RelationKind, tested: RelationKind) -> RelationState {
    match (hypothesis, tested) {
        (Equal, Equal | GreaterThanOrEqual | MethodEquals) => F,
        (Equal, NotEqual | LessThan | NotMethodEquals) => U,

        (NotEqual, Equal) => U,
        (NotEqual, NotEqual) => F,

        (LessThan, Equal | GreaterThanOrEqual) => U,
        (LessThan, NotEqual | LessThan) => F,

        (GreaterThanOrEqual, LessThan) => U,
        (GreaterThanOrEqual, GreaterThanOrEqual) => F,

        (MethodEquals, MethodEquals) => F,
        (MethodEquals, NotMethodEquals) => U,

        (NotMethodEquals, Equal | MethodEquals) => U,
        (NotMethodEquals, NotEqual | NotMethodEquals) => F,

        _ => D,
    }
}

/// `hypothesis(b, a)` => `tested(a, b)`, canonical ordered hypothesis
fn reversed(hypothesis: RelationKind, tested: RelationKind) -> RelationState {
    match (hypothesis, tested) {
        // b < a
        (LessThan, Equal | LessThan) => U,
        (LessThan, NotEqual | GreaterThanOrEqual) => F,
        // b >= a says nothing definite about (a, b) beyond what (b, a) says
        _ => D,
    }
}
