//! Exploration results

use std::fmt;

use crate::errors::SymexError;

/// Bound that stopped an exploration before the worklist drained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interruption {
    MaxSteps,
    GraphTooBig,
    TooManyNestedBooleanStates,
    MaxStartingStates,
    MalformedBody(String),
}

impl Interruption {
    /// Interruption matching an error raised during exploration
    pub fn from_error(error: &SymexError) -> Option<Self> {
        match error {
            SymexError::MaxStepsReached { .. } => Some(Interruption::MaxSteps),
            SymexError::ExplodedGraphTooBig { .. } => Some(Interruption::GraphTooBig),
            SymexError::TooManyNestedBooleanStates { .. } => {
                Some(Interruption::TooManyNestedBooleanStates)
            }
            SymexError::MaxStartingStates { .. } => Some(Interruption::MaxStartingStates),
            SymexError::MalformedBody { reason, .. } => {
                Some(Interruption::MalformedBody(reason.clone()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Interruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interruption::MaxSteps => f.write_str("max steps"),
            Interruption::GraphTooBig => f.write_str("exploded graph too big"),
            Interruption::TooManyNestedBooleanStates => f.write_str("too many nested boolean states"),
            Interruption::MaxStartingStates => f.write_str("too many starting states"),
            Interruption::MalformedBody(reason) => write!(f, "malformed body: {}", reason),
        }
    }
}

/// Summary of one method exploration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorationOutcome {
    /// Worklist steps taken
    pub steps: usize,
    /// The worklist drained; the behavior is complete
    pub completed: bool,
    pub interruption: Option<Interruption>,
    /// States that reached the exit block
    pub end_of_paths: usize,
    /// Nodes of the exploded graph
    pub nodes: usize,
}

impl ExplorationOutcome {
    pub fn is_interrupted(&self) -> bool {
        self.interruption.is_some()
    }
}
