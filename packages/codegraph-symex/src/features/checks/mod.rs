//! Symbolic execution checks
//!
//! ## Architecture
//!
//! ```text
//! checks
//! ├── domain/
//! │   └── finding            # Finding, deduplicated Findings
//! ├── ports/                 # SeCheck trait, CheckerContext, CheckScope
//! └── infrastructure/
//!     ├── dispatcher         # chained pre/post statement callbacks
//!     ├── null_dereference   # null receiver of an instance call
//!     └── division_by_zero   # Zero domain tracking, zero divisor
//! ```

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::*;
pub use infrastructure::*;
pub use ports::{CheckScope, CheckerContext, SeCheck};
