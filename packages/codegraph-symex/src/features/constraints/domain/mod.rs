//! Constraint domain models

pub mod constraint;
pub mod constraints_by_domain;

pub use constraint::{Constraint, ConstraintDomain};
pub use constraints_by_domain::ConstraintsByDomain;
