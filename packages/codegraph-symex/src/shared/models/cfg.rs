//! Control flow graph of a method body
//!
//! Blocks hold a linear list of stack-machine instructions and end with a terminator.
//! Instructions and terminators are closed sums: the explorer matches them exhaustively,
//! so an unsupported node kind is a compile error rather than a runtime failure.
//!
//! ```text
//! B0: load a; lit null; cmp ==; branch B1 / B2
//! B1: lit true; return         --> exit
//! B2: load b; return           --> exit
//! exit: (no successors)
//! ```

use serde::{Deserialize, Serialize};

use super::ids::{BlockId, SymbolId};
use crate::features::symbolic_values::RelationKind;

/// Constant pushed by `Instruction::Literal`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

/// Non short-circuit boolean operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl ArithmeticOp {
    /// Division-like operators fault on a zero divisor
    pub fn is_division(self) -> bool {
        matches!(self, ArithmeticOp::Div | ArithmeticOp::Rem)
    }
}

/// Call site
///
/// Stack layout before the call, top last: `[receiver?, arg0, .., argN-1]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Invocation {
    /// Erasure-level signature of the invoked method
    pub signature: String,
    /// Number of arguments on the stack
    pub arguments: usize,
    /// Instance call: a receiver sits below the arguments and is dereferenced
    pub receiver: bool,
}

/// One stack-machine instruction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    /// Push a constant
    Literal(Literal),
    /// Push the value bound to a symbol
    Load(SymbolId),
    /// Pop a value and bind it to a symbol
    Store(SymbolId),
    /// Pop right then left, push the relation `left kind right`
    Compare(RelationKind),
    /// Pop a boolean, push its negation
    Not,
    /// Pop two booleans, push their combination
    Logical(LogicalOp),
    /// Pop two operands, push the result
    Arithmetic(ArithmeticOp),
    /// Push a fresh non-null instance
    New { type_name: String },
    /// Pop a value, push the boolean `value instanceof type_name`
    InstanceOf { type_name: String },
    /// Call a method
    Invoke(Invocation),
    /// Discard the top of the stack
    Pop,
}

impl Instruction {
    /// Symbol read by this instruction
    pub fn used_symbol(&self) -> Option<SymbolId> {
        match self {
            Instruction::Load(symbol) => Some(*symbol),
            _ => None,
        }
    }

    /// Symbol written by this instruction
    pub fn defined_symbol(&self) -> Option<SymbolId> {
        match self {
            Instruction::Store(symbol) => Some(*symbol),
            _ => None,
        }
    }
}

/// Block terminator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terminator {
    Goto(BlockId),
    /// Pop a condition and follow the matching edge
    Branch {
        when_true: BlockId,
        when_false: BlockId,
    },
    /// Pop the result and leave the method
    Return,
    ReturnVoid,
    /// Pop an exception instance; `None` when its type is not resolved
    Throw { exception_type: Option<String> },
    /// End of the method; only the exit block carries it
    Exit,
}

/// Catch clause protecting a block
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatchHandler {
    /// Fully qualified caught type
    pub exception_type: String,
    pub target: BlockId,
    /// Catch parameter bound on entry
    pub parameter: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub instructions: Vec<Instruction>,
    pub terminator: Terminator,
    /// Innermost handler first
    pub handlers: Vec<CatchHandler>,
}

impl Block {
    /// Normal successors, in terminator order
    pub fn successors(&self, exit: BlockId) -> Vec<BlockId> {
        match &self.terminator {
            Terminator::Goto(target) => vec![*target],
            Terminator::Branch {
                when_true,
                when_false,
            } => vec![*when_true, *when_false],
            Terminator::Return | Terminator::ReturnVoid | Terminator::Throw { .. } => vec![exit],
            Terminator::Exit => Vec::new(),
        }
    }

    /// Normal successors plus handler targets
    pub fn all_successors(&self, exit: BlockId) -> Vec<BlockId> {
        let mut successors = self.successors(exit);
        successors.extend(self.handlers.iter().map(|h| h.target));
        successors
    }

    pub fn is_exit(&self) -> bool {
        matches!(self.terminator, Terminator::Exit)
    }
}

/// Control flow graph: block arena plus entry and exit handles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlFlowGraph {
    blocks: Vec<Block>,
    entry: BlockId,
    exit: BlockId,
}

impl ControlFlowGraph {
    pub fn entry(&self) -> BlockId {
        self.entry
    }

    pub fn exit(&self) -> BlockId {
        self.exit
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.index())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Rebuild a graph from folded blocks; handles are kept
    pub(crate) fn from_parts(blocks: Vec<Block>, entry: BlockId, exit: BlockId) -> Self {
        Self {
            blocks,
            entry,
            exit,
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Incremental CFG construction
///
/// The exit block is allocated up front; blocks default to `Goto(exit)`.
#[derive(Debug)]
pub struct CfgBuilder {
    blocks: Vec<Block>,
    exit: BlockId,
}

impl CfgBuilder {
    pub fn new() -> Self {
        let exit = BlockId(0);
        Self {
            blocks: vec![Block {
                id: exit,
                instructions: Vec::new(),
                terminator: Terminator::Exit,
                handlers: Vec::new(),
            }],
            exit,
        }
    }

    pub fn exit(&self) -> BlockId {
        self.exit
    }

    /// Allocate a new block
    pub fn block(&mut self) -> BlockId {
        let id = BlockId::from_index(self.blocks.len());
        self.blocks.push(Block {
            id,
            instructions: Vec::new(),
            terminator: Terminator::Goto(self.exit),
            handlers: Vec::new(),
        });
        id
    }

    /// Append an instruction
    pub fn push(&mut self, block: BlockId, instruction: Instruction) -> &mut Self {
        if let Some(b) = self.blocks.get_mut(block.index()) {
            b.instructions.push(instruction);
        }
        self
    }

    pub fn terminate(&mut self, block: BlockId, terminator: Terminator) -> &mut Self {
        if let Some(b) = self.blocks.get_mut(block.index()) {
            b.terminator = terminator;
        }
        self
    }

    pub fn handler(&mut self, block: BlockId, handler: CatchHandler) -> &mut Self {
        if let Some(b) = self.blocks.get_mut(block.index()) {
            b.handlers.push(handler);
        }
        self
    }

    /// Finish with `entry` as the first executed block
    pub fn build(self, entry: BlockId) -> ControlFlowGraph {
        ControlFlowGraph {
            blocks: self.blocks,
            entry,
            exit: self.exit,
        }
    }
}

impl Default for CfgBuilder {
    fn default() -> Self {
        Self::new()
    }
}
