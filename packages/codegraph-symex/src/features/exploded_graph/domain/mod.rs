//! Exploded graph domain models

pub mod exploded_graph;
pub mod outcome;
pub mod program_point;

pub use exploded_graph::{ExplodedGraph, Node};
pub use outcome::{ExplorationOutcome, Interruption};
pub use program_point::ProgramPoint;
