//! Program states and constraint propagation
//!
//! ## Architecture
//!
//! ```text
//! program_state
//! ├── domain/
//! │   └── program_state        # persistent stack / bindings / constraints snapshot
//! └── infrastructure/
//!     └── constraint_manager   # value factory, set_constraint, assume_dual
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::*;
pub use infrastructure::*;
