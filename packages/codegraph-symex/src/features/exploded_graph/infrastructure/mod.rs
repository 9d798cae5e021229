//! Exploded graph infrastructure

pub mod walker;

pub use walker::ExplodedGraphWalker;
