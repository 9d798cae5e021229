//! Live variable analysis
//!
//! Backward may-analysis over the block graph. The explorer drops bindings of symbols that
//! are dead at the end of a block so that states differing only in dead locals merge.

use rustc_hash::{FxHashMap, FxHashSet};

use super::cfg::ControlFlowGraph;
use super::ids::{BlockId, SymbolId};

#[derive(Debug, Clone, Default)]
pub struct LiveVariables {
    live_out: FxHashMap<BlockId, FxHashSet<SymbolId>>,
}

impl LiveVariables {
    pub fn analyze(cfg: &ControlFlowGraph) -> Self {
        let mut gen: FxHashMap<BlockId, FxHashSet<SymbolId>> = FxHashMap::default();
        let mut kill: FxHashMap<BlockId, FxHashSet<SymbolId>> = FxHashMap::default();

        for block in cfg.blocks() {
            let (mut used, mut defined) = (FxHashSet::default(), FxHashSet::default());
            for instruction in &block.instructions {
                if let Some(s) = instruction.used_symbol() {
                    if !defined.contains(&s) {
                        used.insert(s);
                    }
                }
                if let Some(s) = instruction.defined_symbol() {
                    defined.insert(s);
                }
            }
            gen.insert(block.id, used);
            kill.insert(block.id, defined);
        }

        let mut live_in: FxHashMap<BlockId, FxHashSet<SymbolId>> = FxHashMap::default();
        let mut live_out: FxHashMap<BlockId, FxHashSet<SymbolId>> = FxHashMap::default();
        let mut changed = true;
        while changed {
            changed = false;
            for block in cfg.blocks().iter().rev() {
                let mut out = FxHashSet::default();
                for successor in block.all_successors(cfg.exit()) {
                    if let Some(live) = live_in.get(&successor) {
                        out.extend(live.iter().copied());
                    }
                }

                let mut inn: FxHashSet<SymbolId> = gen.get(&block.id).cloned().unwrap_or_default();
                let killed = kill.get(&block.id);
                inn.extend(
                    out.iter()
                        .copied()
                        .filter(|s| killed.map_or(true, |k| !k.contains(s))),
                );

                if live_in.get(&block.id) != Some(&inn) {
                    live_in.insert(block.id, inn);
                    changed = true;
                }
                live_out.insert(block.id, out);
            }
        }

        Self { live_out }
    }

    /// Symbols read on some path after `block`
    pub fn live_out(&self, block: BlockId) -> Option<&FxHashSet<SymbolId>> {
        self.live_out.get(&block)
    }

    pub fn is_live_out(&self, block: BlockId, symbol: SymbolId) -> bool {
        self.live_out
            .get(&block)
            .is_some_and(|live| live.contains(&symbol))
    }
}
