//! Part Reference Resolution
//!
//! Items form a directed composition graph through their `parts` lists.
//! Each item's `referenced_by_count` is its number of incoming part
//! entries. Every entry counts once no matter its `qty`, so a tray holding
//! three of the same bin adds one to the bin, not three.
//!
//! References to unknown ids ("ghosts") are allowed: they usually point at
//! items nobody has catalogued yet, and contribute nothing.

use std::collections::HashMap;

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, warn};

use crate::units::EnrichedItem;

/// A part entry whose target is not in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhostRef {
    /// Item holding the part entry
    pub from: String,
    /// The unresolved target id
    pub target: String,
}

/// Reference counts for one catalog, aligned with the input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceReport {
    /// `counts[i]` is the `referenced_by_count` of the i-th item
    pub counts: Vec<u32>,
    pub ghosts: Vec<GhostRef>,
    /// Groups of item ids that contain each other, directly or transitively
    pub cycles: Vec<Vec<String>>,
}

impl ReferenceReport {
    pub fn count_for(&self, index: usize) -> u32 {
        self.counts.get(index).copied().unwrap_or(0)
    }
}

/// Compute `referenced_by_count` for every item
pub fn resolve(items: &[EnrichedItem]) -> ReferenceReport {
    let mut graph: DiGraph<&str, ()> = DiGraph::with_capacity(items.len(), items.len() * 2);
    let nodes: Vec<NodeIndex> = items.iter().map(|item| graph.add_node(item.id())).collect();

    // Ids are checked for uniqueness at load time; on a collision the first
    // item keeps the id.
    let mut by_id: HashMap<&str, NodeIndex> = HashMap::with_capacity(items.len());
    for (item, &node) in items.iter().zip(&nodes) {
        by_id.entry(item.id()).or_insert(node);
    }

    let mut counts = vec![0u32; items.len()];
    let mut ghosts = Vec::new();

    for (item, &from) in items.iter().zip(&nodes) {
        for part in item.source.parts() {
            match by_id.get(part.target) {
                Some(&to) => {
                    counts[to.index()] += 1;
                    graph.add_edge(from, to, ());
                }
                None => {
                    debug!(from = %item.id(), target = %part.target, "ghost part reference");
                    ghosts.push(GhostRef {
                        from: item.id().to_string(),
                        target: part.target.to_string(),
                    });
                }
            }
        }
    }

    let cycles: Vec<Vec<String>> = kosaraju_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut ids: Vec<String> = scc.into_iter().map(|idx| graph[idx].to_string()).collect();
            ids.sort();
            ids
        })
        .collect();

    for cycle in &cycles {
        warn!(items = %cycle.join(" -> "), "composition cycle between items");
    }

    ReferenceReport {
        counts,
        ghosts,
        cycles,
    }
}
