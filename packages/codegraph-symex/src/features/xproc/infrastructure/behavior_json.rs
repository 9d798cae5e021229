//! JSON wire format of method behaviors
//!
//! Precomputed behaviors are shipped as a JSON array of records:
//!
//! ```text
//! [
//!   {
//!     "signature": "java.util.Objects#isNull(Ljava/lang/Object;)Z",
//!     "arity": 1,
//!     "varArgs": false,
//!     "declaredExceptions": [],
//!     "yields": [
//!       { "parametersConstraints": [["NULL"]], "resultIndex": -1,
//!         "resultConstraint": ["TRUE"], "isExceptional": false },
//!       { "parametersConstraints": [["NOT_NULL"]], "resultIndex": -1,
//!         "resultConstraint": null, "isExceptional": false },
//!       { "parametersConstraints": [["NOT_NULL"]], "exception": "java.lang.Error",
//!         "isExceptional": true }
//!     ]
//!   }
//! ]
//! ```
//!
//! Happy yields always carry `resultConstraint`, `null` when the result is unconstrained;
//! exceptional yields omit it. `arity`, `isExceptional` and `resultConstraint` may be absent
//! when reading. Check-defined constraints are not part of the format and are dropped on write.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::Result;
use crate::features::constraints::{Constraint, ConstraintsByDomain};
use crate::features::xproc::domain::{MethodBehavior, MethodYield, YieldKind, FRESH_RESULT};
use crate::shared::models::MethodSignature;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodBehaviorJson {
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arity: Option<usize>,
    #[serde(default)]
    pub var_args: bool,
    #[serde(default)]
    pub declared_exceptions: Vec<String>,
    #[serde(default)]
    pub yields: Vec<MethodYieldJson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodYieldJson {
    #[serde(default)]
    pub parameters_constraints: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_index: Option<i32>,
    /// `Some(None)` is written as `null`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_constraint: Option<Option<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    #[serde(default)]
    pub is_exceptional: bool,
}

fn constraint_names(constraints: &ConstraintsByDomain) -> Vec<String> {
    constraints
        .iter()
        .filter(|c| c.is_builtin())
        .map(|c| c.name().to_string())
        .collect()
}

fn parse_constraints(names: &[String]) -> ConstraintsByDomain {
    names
        .iter()
        .filter_map(|name| {
            let constraint = Constraint::from_name(name);
            if constraint.is_none() {
                debug!("Ignoring unknown constraint {}", name);
            }
            constraint
        })
        .collect()
}

impl From<&MethodYield> for MethodYieldJson {
    fn from(method_yield: &MethodYield) -> Self {
        let parameters_constraints = method_yield
            .parameters_constraints
            .iter()
            .map(constraint_names)
            .collect();
        match &method_yield.kind {
            YieldKind::Happy {
                result_index,
                result_constraint,
            } => Self {
                parameters_constraints,
                result_index: Some(*result_index),
                result_constraint: Some(result_constraint.as_ref().map(constraint_names)),
                exception: None,
                is_exceptional: false,
            },
            YieldKind::Exceptional { exception_type, .. } => Self {
                parameters_constraints,
                result_index: None,
                result_constraint: None,
                exception: exception_type.clone(),
                is_exceptional: true,
            },
        }
    }
}

impl From<&MethodYieldJson> for MethodYield {
    fn from(json: &MethodYieldJson) -> Self {
        let parameters = json
            .parameters_constraints
            .iter()
            .map(|names| parse_constraints(names))
            .collect();
        let exceptional = json.is_exceptional || (json.exception.is_some() && json.result_index.is_none());
        if exceptional {
            MethodYield::exceptional(parameters, json.exception.clone())
        } else {
            MethodYield::happy(
                parameters,
                json.result_index.unwrap_or(FRESH_RESULT),
                json.result_constraint
                    .as_ref()
                    .and_then(Option::as_deref)
                    .map(parse_constraints)
                    .filter(|c| !c.is_empty()),
            )
        }
    }
}

impl From<&MethodBehavior> for MethodBehaviorJson {
    fn from(behavior: &MethodBehavior) -> Self {
        Self {
            signature: behavior.signature().as_str().to_string(),
            arity: Some(behavior.arity()),
            var_args: behavior.is_varargs(),
            declared_exceptions: behavior.declared_exceptions().to_vec(),
            yields: behavior.yields().iter().map(MethodYieldJson::from).collect(),
        }
    }
}

impl TryFrom<&MethodBehaviorJson> for MethodBehavior {
    type Error = crate::errors::SymexError;

    fn try_from(json: &MethodBehaviorJson) -> Result<Self> {
        let signature = MethodSignature::parse(&json.signature)?;
        let mut behavior = MethodBehavior::new(signature)
            .with_varargs(json.var_args)
            .with_declared_exceptions(json.declared_exceptions.clone());
        for y in &json.yields {
            behavior.add_yield(MethodYield::from(y));
        }
        Ok(behavior.frozen())
    }
}

/// Serialize behaviors as a pretty-printed JSON array
pub fn to_json<'a>(behaviors: impl IntoIterator<Item = &'a MethodBehavior>) -> Result<String> {
    let records: Vec<MethodBehaviorJson> =
        behaviors.into_iter().map(MethodBehaviorJson::from).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Parse a JSON array of behaviors; every loaded behavior is complete
pub fn from_json(json: &str) -> Result<Vec<MethodBehavior>> {
    let records: Vec<MethodBehaviorJson> = serde_json::from_str(json)?;
    records.iter().map(MethodBehavior::try_from).collect()
}
