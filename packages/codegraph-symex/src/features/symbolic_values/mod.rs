//! Symbolic values and the relation algebra
//!
//! ## Architecture
//!
//! ```text
//! symbolic_values
//! ├── domain/
//! │   ├── symbolic_value     # identity-compared value handles
//! │   ├── relation_kind      # 8 kinds, inverse/symmetric/normalize
//! │   └── binary_relation    # canonical relations, resolve_state, deduction
//! └── infrastructure/
//!     └── relation_table     # reflexive + direct implication tables
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::*;
