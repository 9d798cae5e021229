//! Exploded graph
//!
//! Nodes are `(program point, program state)` pairs kept in a petgraph arena and
//! deduplicated by structural equality. Successor edges are explicit, so the graph is a
//! plain DAG of indices with no owning back references.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rustc_hash::FxHashMap;

use super::program_point::ProgramPoint;
use crate::features::program_state::ProgramState;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    pub point: ProgramPoint,
    pub state: ProgramState,
}

impl Node {
    pub fn new(point: ProgramPoint, state: ProgramState) -> Self {
        Self { point, state }
    }
}

#[derive(Debug, Default)]
pub struct ExplodedGraph {
    graph: DiGraph<Node, ()>,
    index: FxHashMap<Node, NodeIndex>,
}

impl ExplodedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the node for `(point, state)`, and whether it was just created
    pub fn node(&mut self, point: ProgramPoint, state: ProgramState) -> (NodeIndex, bool) {
        let node = Node::new(point, state);
        if let Some(existing) = self.index.get(&node) {
            return (*existing, false);
        }
        let idx = self.graph.add_node(node.clone());
        self.index.insert(node, idx);
        (idx, true)
    }

    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        self.graph.node_weight(idx)
    }

    pub fn successors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Direction::Outgoing)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::constraints::Constraint;
    use crate::features::symbolic_values::SymbolicValue;
    use crate::shared::models::BlockId;

    #[test]
    fn test_equal_nodes_are_shared() {
        let mut graph = ExplodedGraph::new();
        let point = ProgramPoint::block_entry(BlockId(1));
        let state = ProgramState::empty_state();

        let (first, created) = graph.node(point, state.clone());
        assert!(created);
        // Visit counters do not distinguish nodes
        let (again, created) = graph.node(point, state.visited_point(point));
        assert!(!created);
        assert_eq!(first, again);

        let other = state.stack_value(SymbolicValue::null_literal());
        let (second, created) = graph.node(point.next(), other);
        assert!(created);
        graph.add_edge(first, second);
        graph.add_edge(first, second);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.successors(first).collect::<Vec<_>>(), vec![second]);
    }

    #[test]
    fn test_constraints_distinguish_nodes() {
        let mut graph = ExplodedGraph::new();
        let point = ProgramPoint::block_entry(BlockId(1));
        let value = SymbolicValue::true_literal();
        let state = ProgramState::empty_state();

        graph.node(point, state.clone());
        let (_, created) = graph.node(point, state.add_constraint(&value, Constraint::Zero));
        assert!(created);
        assert_eq!(graph.get(NodeIndex::new(0)).map(|n| n.point), Some(point));
    }
}
