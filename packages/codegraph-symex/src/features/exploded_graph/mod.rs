//! Exploded graph exploration
//!
//! Path-sensitive exploration of one method body. Every node pairs a program point with
//! the program state reached there; two paths reaching an equal state share a node.
//!
//! ## Architecture
//!
//! ```text
//! exploded_graph
//! ├── domain/
//! │   ├── program_point     # (block, instruction index)
//! │   ├── exploded_graph    # node arena, deduplicated edges
//! │   └── outcome           # steps, interruption, end-of-path count
//! └── infrastructure/
//!     └── walker            # worklist driver, call application, exception routing
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::*;
pub use infrastructure::*;
