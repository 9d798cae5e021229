//! Checker infrastructure: dispatcher and built-in checks

pub mod dispatcher;
pub mod division_by_zero;
pub mod null_dereference;

pub use dispatcher::CheckerDispatcher;
pub use division_by_zero::{DivisionByZeroCheck, ARITHMETIC_EXCEPTION};
pub use null_dereference::{NullDereferenceCheck, NULL_POINTER_EXCEPTION};
