//! Structural fold over method bodies
//!
//! A folder maps each node to exactly one new node, bottom-up: instructions first, then
//! the block that owns them, then the graph. Callers override the hooks they care about
//! and inherit the identity for the rest.

use super::cfg::{Block, CatchHandler, ControlFlowGraph, Instruction, Terminator};
use super::ids::SymbolId;

pub trait CfgFolder {
    fn fold_symbol(&mut self, symbol: SymbolId) -> SymbolId {
        symbol
    }

    fn fold_instruction(&mut self, instruction: Instruction) -> Instruction {
        match instruction {
            Instruction::Load(s) => Instruction::Load(self.fold_symbol(s)),
            Instruction::Store(s) => Instruction::Store(self.fold_symbol(s)),
            other => other,
        }
    }

    fn fold_terminator(&mut self, terminator: Terminator) -> Terminator {
        terminator
    }

    fn fold_handler(&mut self, handler: CatchHandler) -> CatchHandler {
        CatchHandler {
            parameter: handler.parameter.map(|p| self.fold_symbol(p)),
            ..handler
        }
    }

    fn fold_block(&mut self, block: Block) -> Block {
        Block {
            id: block.id,
            instructions: block
                .instructions
                .into_iter()
                .map(|i| self.fold_instruction(i))
                .collect(),
            terminator: self.fold_terminator(block.terminator),
            handlers: block
                .handlers
                .into_iter()
                .map(|h| self.fold_handler(h))
                .collect(),
        }
    }

    fn fold_cfg(&mut self, cfg: ControlFlowGraph) -> ControlFlowGraph {
        let (entry, exit) = (cfg.entry(), cfg.exit());
        let blocks = cfg
            .blocks()
            .iter()
            .cloned()
            .map(|b| self.fold_block(b))
            .collect();
        ControlFlowGraph::from_parts(blocks, entry, exit)
    }
}

/// Replaces symbol handles, e.g. to inline a body under fresh locals
#[derive(Debug, Default)]
pub struct SymbolSubstitution {
    mapping: rustc_hash::FxHashMap<SymbolId, SymbolId>,
}

impl SymbolSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(mut self, from: SymbolId, to: SymbolId) -> Self {
        self.mapping.insert(from, to);
        self
    }
}

impl CfgFolder for SymbolSubstitution {
    fn fold_symbol(&mut self, symbol: SymbolId) -> SymbolId {
        self.mapping.get(&symbol).copied().unwrap_or(symbol)
    }
}
