//! Issues raised by checks

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::exploded_graph::ProgramPoint;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    /// Name of the reporting check
    pub check: String,
    /// Signature of the method being explored
    pub method: String,
    #[serde(skip)]
    pub point: Option<ProgramPoint>,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.point {
            Some(point) => write!(f, "[{}] {} at {}: {}", self.check, self.method, point, self.message),
            None => write!(f, "[{}] {}: {}", self.check, self.method, self.message),
        }
    }
}

/// Findings in report order, without duplicates
///
/// Several paths reaching the same faulty instruction report it once.
#[derive(Debug, Clone, Default)]
pub struct Findings {
    items: Vec<Finding>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding; returns false when it was already known
    pub fn report(&mut self, finding: Finding) -> bool {
        if self.items.contains(&finding) {
            return false;
        }
        self.items.push(finding);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take every finding, leaving the collection empty
    pub fn drain(&mut self) -> Vec<Finding> {
        std::mem::take(&mut self.items)
    }
}
