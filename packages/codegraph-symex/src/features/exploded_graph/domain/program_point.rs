//! Program points

use std::fmt;

use crate::shared::models::BlockId;

/// Position inside a method body
///
/// `index` addresses an instruction of `block`; an index equal to the instruction count
/// addresses the block terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgramPoint {
    pub block: BlockId,
    pub index: usize,
}

impl ProgramPoint {
    pub fn new(block: BlockId, index: usize) -> Self {
        Self { block, index }
    }

    /// First instruction of `block`
    pub fn block_entry(block: BlockId) -> Self {
        Self { block, index: 0 }
    }

    pub fn next(self) -> Self {
        Self {
            block: self.block,
            index: self.index + 1,
        }
    }
}

impl fmt::Display for ProgramPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.block, self.index)
    }
}
