//! Check domain models

pub mod finding;

pub use finding::{Finding, Findings};
