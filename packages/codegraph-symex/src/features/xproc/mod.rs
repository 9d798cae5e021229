//! Cross-procedural summaries
//!
//! A method behavior summarizes every feasible exit of a method as yields, so call sites
//! apply the summary instead of exploring the callee again.
//!
//! ## Architecture
//!
//! ```text
//! xproc
//! ├── domain/
//! │   ├── method_yield       # happy / exceptional yields, application at call sites
//! │   └── method_behavior    # yield creation, cleanup, reduction
//! └── infrastructure/
//!     ├── behavior_cache     # file-scoped store, blacklist, in-progress entries
//!     ├── hardcoded          # library idioms (requireNonNull, isEmpty, ...)
//!     └── behavior_json      # precomputed behavior wire format
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::*;
pub use infrastructure::*;
