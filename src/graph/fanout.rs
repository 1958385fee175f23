// src/graph/fanout.rs

//! Transitive fan-out pre-computation.

use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Dfs;

use crate::graph::action::BuildAction;

/// Fill in `total_dependants` for every action: the number of distinct
/// actions transitively reachable over `dependants` edges.
///
/// One DFS per action, each with its own visited set, so diamonds in the
/// graph count every descendant exactly once per root.
pub(crate) fn compute_total_dependants(actions: &mut [BuildAction]) {
    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();

    for idx in 0..actions.len() {
        graph.add_node(idx);
    }
    for (idx, action) in actions.iter().enumerate() {
        for dependant in &action.dependants {
            graph.add_edge(idx, dependant.0, ());
        }
    }

    for idx in 0..actions.len() {
        let mut dfs = Dfs::new(&graph, idx);
        let mut reached = 0usize;
        while let Some(node) = dfs.next(&graph) {
            if node != idx {
                reached += 1;
            }
        }
        actions[idx].total_dependants = reached;
    }
}
