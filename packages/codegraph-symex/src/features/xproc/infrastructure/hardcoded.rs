//! Hardcoded behaviors of well-known library idioms
//!
//! Precondition helpers, null tests and emptiness tests from the JDK, Guava, Apache Commons,
//! Spring and Log4j are never explored: their behaviors are built here from the owner and
//! method name, for any overload.
//!
//! | family | yields |
//! |---|---|
//! | require non-null | `[NOT_NULL] -> arg 0`, `[NULL] -> exception` |
//! | require null | `[NULL] -> arg 0`, `[NOT_NULL] -> exception` |
//! | null test | `[NULL] -> TRUE`, `[NOT_NULL] -> FALSE` (inverted for `nonNull`) |
//! | emptiness test | `[NULL] -> TRUE`, `[NOT_NULL] -> fresh` (inverted for `isNot*` / `has*`) |
//! | boolean precondition | `[TRUE] -> fresh`, `[FALSE] -> IllegalArgumentException` or `IllegalStateException` |

use crate::features::constraints::{Constraint, ConstraintsByDomain};
use crate::features::xproc::domain::{MethodBehavior, MethodYield, FRESH_RESULT};
use crate::shared::models::MethodSignature;

const VALIDATE: &[&str] = &["org.apache.commons.lang3.Validate", "org.apache.commons.lang.Validate"];
const STRING_UTILS: &[&str] = &[
    "org.apache.commons.lang3.StringUtils",
    "org.apache.commons.lang.StringUtils",
];
const COLLECTION_UTILS: &[&str] = &[
    "org.apache.commons.collections4.CollectionUtils",
    "org.apache.commons.collections.CollectionUtils",
    "org.springframework.util.CollectionUtils",
];
const SPRING_ASSERT: &str = "org.springframework.util.Assert";
const SPRING_STRING_UTILS: &str = "org.springframework.util.StringUtils";
const GUAVA_PRECONDITIONS: &str = "com.google.common.base.Preconditions";

pub const ILLEGAL_ARGUMENT_EXCEPTION: &str = "java.lang.IllegalArgumentException";
pub const ILLEGAL_STATE_EXCEPTION: &str = "java.lang.IllegalStateException";

/// Signatures materialized when a session starts
pub const PRELOADED_SIGNATURES: &[&str] = &[
    "java.util.Objects#requireNonNull(Ljava/lang/Object;)Ljava/lang/Object;",
    "java.util.Objects#requireNonNull(Ljava/lang/Object;Ljava/lang/String;)Ljava/lang/Object;",
    "java.util.Objects#isNull(Ljava/lang/Object;)Z",
    "java.util.Objects#nonNull(Ljava/lang/Object;)Z",
    "com.google.common.base.Preconditions#checkNotNull(Ljava/lang/Object;)Ljava/lang/Object;",
    "com.google.common.base.Preconditions#checkArgument(Z)V",
    "com.google.common.base.Preconditions#checkArgument(ZLjava/lang/Object;)V",
    "com.google.common.base.Preconditions#checkState(Z)V",
    "com.google.common.base.Preconditions#checkState(ZLjava/lang/Object;)V",
    "com.google.common.base.Strings#isNullOrEmpty(Ljava/lang/String;)Z",
    "org.apache.commons.lang3.Validate#notNull(Ljava/lang/Object;)Ljava/lang/Object;",
    "org.apache.commons.lang3.StringUtils#isEmpty(Ljava/lang/CharSequence;)Z",
    "org.apache.commons.lang3.StringUtils#isNotEmpty(Ljava/lang/CharSequence;)Z",
    "org.apache.commons.lang3.StringUtils#isBlank(Ljava/lang/CharSequence;)Z",
    "org.apache.commons.lang3.StringUtils#isNotBlank(Ljava/lang/CharSequence;)Z",
    "org.apache.commons.collections4.CollectionUtils#isEmpty(Ljava/util/Collection;)Z",
    "org.apache.commons.collections4.CollectionUtils#isNotEmpty(Ljava/util/Collection;)Z",
    "org.springframework.util.Assert#notNull(Ljava/lang/Object;Ljava/lang/String;)V",
    "org.springframework.util.Assert#isNull(Ljava/lang/Object;Ljava/lang/String;)V",
    "org.springframework.util.StringUtils#hasText(Ljava/lang/String;)Z",
    "org.springframework.util.StringUtils#hasLength(Ljava/lang/String;)Z",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    RequireNonNull,
    RequireNull,
    /// Result is `TRUE` when the argument is null
    NullTest { when_null: bool },
    /// Result is `when_null` for a null argument, unknown otherwise
    EmptinessTest { when_null: bool },
    /// Throws `exception` when the boolean argument is false
    BooleanPrecondition { exception: &'static str },
}

fn family(signature: &MethodSignature) -> Option<Family> {
    let owner = signature.owner();
    let name = signature.name();
    if signature.arity() == 0 {
        return None;
    }

    let family = match (owner, name) {
        ("java.util.Objects", "requireNonNull")
        | (GUAVA_PRECONDITIONS, "checkNotNull")
        | ("org.apache.logging.log4j.core.util.Assert", "requireNonNull")
        | (SPRING_ASSERT, "notNull" | "notEmpty") => Family::RequireNonNull,
        (o, "notNull" | "notEmpty") if VALIDATE.contains(&o) => Family::RequireNonNull,
        (SPRING_ASSERT, "isNull") => Family::RequireNull,
        (GUAVA_PRECONDITIONS, "checkArgument") | (SPRING_ASSERT, "isTrue") => {
            Family::BooleanPrecondition {
                exception: ILLEGAL_ARGUMENT_EXCEPTION,
            }
        }
        (o, "isTrue") if VALIDATE.contains(&o) => Family::BooleanPrecondition {
            exception: ILLEGAL_ARGUMENT_EXCEPTION,
        },
        (GUAVA_PRECONDITIONS, "checkState") | (SPRING_ASSERT, "state") => {
            Family::BooleanPrecondition {
                exception: ILLEGAL_STATE_EXCEPTION,
            }
        }
        ("java.util.Objects", "isNull") => Family::NullTest { when_null: true },
        ("java.util.Objects", "nonNull") => Family::NullTest { when_null: false },
        ("com.google.common.base.Strings", "isNullOrEmpty") => {
            Family::EmptinessTest { when_null: true }
        }
        (o, "isEmpty" | "isBlank") if STRING_UTILS.contains(&o) => {
            Family::EmptinessTest { when_null: true }
        }
        (o, "isNotEmpty" | "isNotBlank") if STRING_UTILS.contains(&o) => {
            Family::EmptinessTest { when_null: false }
        }
        (o, "isEmpty") if COLLECTION_UTILS.contains(&o) => Family::EmptinessTest { when_null: true },
        (o, "isNotEmpty") if COLLECTION_UTILS.contains(&o) => {
            Family::EmptinessTest { when_null: false }
        }
        (SPRING_STRING_UTILS, "isEmpty") => Family::EmptinessTest { when_null: true },
        (SPRING_STRING_UTILS, "hasText" | "hasLength") => Family::EmptinessTest { when_null: false },
        _ => return None,
    };
    Some(family)
}

/// Whether `signature` belongs to a hardcoded family
pub fn is_hardcoded(signature: &MethodSignature) -> bool {
    family(signature).is_some()
}

/// Complete behavior for a hardcoded signature
pub fn hardcoded_behavior(signature: &MethodSignature) -> Option<MethodBehavior> {
    let family = family(signature)?;
    let arity = signature.arity();
    let slots = |first: Constraint| {
        let mut constraints = vec![ConstraintsByDomain::empty(); arity];
        constraints[0] = ConstraintsByDomain::of([first]);
        constraints
    };
    let boolean = |value: bool| Some(ConstraintsByDomain::of([Constraint::boolean(value)]));

    let mut behavior = MethodBehavior::new(signature.clone());
    match family {
        Family::RequireNonNull | Family::RequireNull => {
            let (accepted, rejected) = if family == Family::RequireNonNull {
                (Constraint::NotNull, Constraint::Null)
            } else {
                (Constraint::Null, Constraint::NotNull)
            };
            let (result_index, result_constraint) = if signature.expects_return_value() {
                (0, Some(ConstraintsByDomain::of([accepted.clone()])))
            } else {
                (FRESH_RESULT, None)
            };
            behavior.add_yield(MethodYield::happy(slots(accepted), result_index, result_constraint));
            behavior.add_yield(MethodYield::exceptional(slots(rejected), None));
        }
        Family::NullTest { when_null } => {
            behavior.add_yield(MethodYield::happy(
                slots(Constraint::Null),
                FRESH_RESULT,
                boolean(when_null),
            ));
            behavior.add_yield(MethodYield::happy(
                slots(Constraint::NotNull),
                FRESH_RESULT,
                boolean(!when_null),
            ));
        }
        Family::EmptinessTest { when_null } => {
            behavior.add_yield(MethodYield::happy(
                slots(Constraint::Null),
                FRESH_RESULT,
                boolean(when_null),
            ));
            behavior.add_yield(MethodYield::happy(slots(Constraint::NotNull), FRESH_RESULT, None));
        }
        Family::BooleanPrecondition { exception } => {
            behavior.add_yield(MethodYield::happy(slots(Constraint::True), FRESH_RESULT, None));
            behavior.add_yield(MethodYield::exceptional(
                slots(Constraint::False),
                Some(exception.to_string()),
            ));
        }
    }
    Some(behavior.frozen())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(raw: &str) -> MethodSignature {
        MethodSignature::parse(raw).unwrap()
    }

    #[test]
    fn test_preloaded_signatures_are_hardcoded() {
        for raw in PRELOADED_SIGNATURES {
            let behavior = hardcoded_behavior(&sig(raw)).unwrap();
            assert!(behavior.is_complete(), "{}", raw);
            assert_eq!(behavior.yields().len(), 2, "{}", raw);
            for y in behavior.yields() {
                assert_eq!(y.parameters_constraints.len(), behavior.arity());
            }
        }
    }

    #[test]
    fn test_require_non_null() {
        let behavior = hardcoded_behavior(&sig(
            "java.util.Objects#requireNonNull(Ljava/lang/Object;Ljava/lang/String;)Ljava/lang/Object;",
        ))
        .unwrap();
        let happy = behavior.happy_path_yields().next().unwrap();
        assert_eq!(happy.result_index(), Some(0));
        assert_eq!(
            happy.parameters_constraints,
            vec![ConstraintsByDomain::of([Constraint::NotNull]), ConstraintsByDomain::empty()]
        );
        let exceptional = behavior.exceptional_path_yields().next().unwrap();
        assert_eq!(
            exceptional.parameters_constraints[0],
            ConstraintsByDomain::of([Constraint::Null])
        );
    }

    #[test]
    fn test_void_assert_has_fresh_result() {
        let behavior = hardcoded_behavior(&sig(
            "org.springframework.util.Assert#isNull(Ljava/lang/Object;)V",
        ))
        .unwrap();
        let happy = behavior.happy_path_yields().next().unwrap();
        assert_eq!(happy.result_index(), Some(FRESH_RESULT));
        assert_eq!(happy.parameters_constraints[0], ConstraintsByDomain::of([Constraint::Null]));
    }

    #[test]
    fn test_emptiness_test_polarity() {
        let not_empty = hardcoded_behavior(&sig(
            "org.apache.commons.lang.StringUtils#isNotBlank(Ljava/lang/CharSequence;)Z",
        ))
        .unwrap();
        let on_null = not_empty.yields().iter().find(|y| {
            y.parameters_constraints[0].contains(&Constraint::Null)
        });
        assert_eq!(
            on_null.and_then(|y| y.result_constraint()),
            Some(&ConstraintsByDomain::of([Constraint::False]))
        );
    }

    #[test]
    fn test_boolean_preconditions() {
        for (raw, exception) in [
            ("com.google.common.base.Preconditions#checkArgument(ZLjava/lang/Object;)V", ILLEGAL_ARGUMENT_EXCEPTION),
            ("com.google.common.base.Preconditions#checkState(Z)V", ILLEGAL_STATE_EXCEPTION),
            ("org.apache.commons.lang3.Validate#isTrue(Z)V", ILLEGAL_ARGUMENT_EXCEPTION),
            ("org.springframework.util.Assert#state(ZLjava/lang/String;)V", ILLEGAL_STATE_EXCEPTION),
        ] {
            let behavior = hardcoded_behavior(&sig(raw)).unwrap();
            let happy = behavior.happy_path_yields().next().unwrap();
            assert_eq!(happy.parameters_constraints[0], ConstraintsByDomain::of([Constraint::True]));
            assert_eq!(happy.result_index(), Some(FRESH_RESULT));
            assert_eq!(happy.result_constraint(), None);

            let exceptional = behavior.exceptional_path_yields().next().unwrap();
            assert_eq!(
                exceptional.parameters_constraints[0],
                ConstraintsByDomain::of([Constraint::False])
            );
            assert_eq!(exceptional.exception_type(), Some(exception), "{}", raw);
        }
    }

    #[test]
    fn test_unrelated_methods() {
        assert!(!is_hardcoded(&sig("com.google.common.base.Preconditions#checkElementIndex(II)I")));
        assert!(!is_hardcoded(&sig("java.util.Objects#hash([Ljava/lang/Object;)I")));
        assert!(!is_hardcoded(&sig("org.foo.StringUtils#isEmpty(Ljava/lang/String;)Z")));
        assert!(!is_hardcoded(&sig("java.util.Objects#requireNonNull()V")));
    }
}
