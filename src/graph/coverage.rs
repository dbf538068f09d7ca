//! Actual vs greedy MIDDLE introduction order
//!
//! The greedy reference repeatedly introduces the MIDDLE that completes the
//! most legal pairs with the MIDDLEs already introduced. Ties go to the higher
//! degree, then to the earlier position in the actual order, so the replay is
//! fully deterministic. Both orderings are then scored by how many top-K hubs
//! they introduce in their first `window` steps.

use super::csr::CompatibilityGraph;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Result of comparing an introduction order against the greedy replay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageComparison {
    /// Prefix length the hub rates are measured over
    pub window: usize,
    /// The top-K hub MIDDLEs
    pub hubs: Vec<String>,
    /// The target order after unknown and repeated MIDDLEs are dropped
    pub actual_order: Vec<String>,
    pub greedy_order: Vec<String>,
    pub actual_hub_rate: f64,
    pub greedy_hub_rate: f64,
    /// `(greedy - actual) * 100`, in percentage points
    pub difference_pp: f64,
    /// Legal pairs covered after each introduction
    pub actual_coverage: Vec<usize>,
    pub greedy_coverage: Vec<usize>,
    /// Target entries dropped as unknown or repeated
    pub skipped: usize,
}

/// Compare `target_order` with the greedy coverage order over the same MIDDLEs
///
/// `window` defaults to `top_k` and is capped at the number of usable
/// MIDDLEs. An empty window scores 0 for both orderings.
pub fn compare_coverage<S: AsRef<str>>(
    graph: &CompatibilityGraph,
    target_order: &[S],
    top_k: usize,
    window: Option<usize>,
) -> CoverageComparison {
    let mut seen = FxHashSet::default();
    let mut actual: Vec<u32> = Vec::with_capacity(target_order.len());
    let mut skipped = 0;
    for middle in target_order {
        match graph.node_id(middle.as_ref()) {
            Some(id) if seen.insert(id) => actual.push(id),
            _ => skipped += 1,
        }
    }

    let hubs: Vec<u32> = graph.hubs(top_k).into_iter().map(|h| h.node).collect();
    let hub_set: FxHashSet<u32> = hubs.iter().copied().collect();

    let greedy = greedy_order(graph, &actual);
    let window = window.unwrap_or(hubs.len()).min(actual.len());

    let actual_hub_rate = hub_rate(&actual, &hub_set, window);
    let greedy_hub_rate = hub_rate(&greedy, &hub_set, window);

    if skipped > 0 {
        tracing::debug!(skipped, "target order entries dropped");
    }

    let names = |ids: &[u32]| -> Vec<String> {
        ids.iter().map(|&n| graph.middle(n).to_string()).collect()
    };

    CoverageComparison {
        window,
        hubs: names(&hubs),
        actual_coverage: coverage_curve(graph, &actual),
        greedy_coverage: coverage_curve(graph, &greedy),
        actual_order: names(&actual),
        greedy_order: names(&greedy),
        actual_hub_rate,
        greedy_hub_rate,
        difference_pp: (greedy_hub_rate - actual_hub_rate) * 100.0,
        skipped,
    }
}

/// Replay the greedy heuristic over `candidates`, which are in target order
fn greedy_order(graph: &CompatibilityGraph, candidates: &[u32]) -> Vec<u32> {
    let n = candidates.len();
    // Position in `candidates` of each node, for gain updates
    let mut slot = vec![usize::MAX; graph.node_count()];
    for (i, &node) in candidates.iter().enumerate() {
        slot[node as usize] = i;
    }

    let mut gain = vec![0usize; n];
    let mut taken = vec![false; n];
    let mut order = Vec::with_capacity(n);

    for _ in 0..n {
        let mut best: Option<usize> = None;
        for i in 0..n {
            if taken[i] {
                continue;
            }
            best = match best {
                None => Some(i),
                Some(b) => {
                    let better = (gain[i], graph.degree(candidates[i]))
                        > (gain[b], graph.degree(candidates[b]));
                    Some(if better { i } else { b })
                }
            };
        }

        let Some(pick) = best else { break };
        taken[pick] = true;
        let node = candidates[pick];
        order.push(node);

        for &neighbor in graph.neighbors(node) {
            let j = slot[neighbor as usize];
            if j != usize::MAX && !taken[j] {
                gain[j] += 1;
            }
        }
    }

    order
}

fn hub_rate(order: &[u32], hubs: &FxHashSet<u32>, window: usize) -> f64 {
    if window == 0 {
        return 0.0;
    }
    let hits = order[..window].iter().filter(|n| hubs.contains(*n)).count();
    hits as f64 / window as f64
}

/// Cumulative legal pairs among the introduced MIDDLEs after each step
fn coverage_curve(graph: &CompatibilityGraph, order: &[u32]) -> Vec<usize> {
    let mut introduced = FxHashSet::default();
    let mut covered = 0;
    order
        .iter()
        .map(|&node| {
            covered += graph
                .neighbors(node)
                .iter()
                .filter(|n| introduced.contains(*n))
                .count();
            introduced.insert(node);
            covered
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;

    /// Star around "hub" plus a separate "x"-"y" edge and an isolate "z"
    fn star_graph() -> CompatibilityGraph {
        let mut builder = GraphBuilder::new();
        let names = ["z", "x", "y", "a", "b", "c", "hub"];
        let ids: Vec<u32> = names
            .iter()
            .map(|m| builder.get_or_create_node(m))
            .collect();
        for &leaf in &ids[3..6] {
            builder.add_edge(ids[6], leaf);
        }
        builder.add_edge(ids[1], ids[2]);
        CompatibilityGraph::from_builder(&builder)
    }

    #[test]
    fn test_greedy_starts_from_hub() {
        let graph = star_graph();
        let target = ["z", "x", "y", "a", "b", "c", "hub"];
        let cmp = compare_coverage(&graph, &target, 1, None);

        assert_eq!(cmp.hubs, vec!["hub"]);
        assert_eq!(cmp.window, 1);
        assert_eq!(cmp.greedy_order[0], "hub");
        assert_eq!(cmp.actual_hub_rate, 0.0);
        assert_eq!(cmp.greedy_hub_rate, 1.0);
        assert!((cmp.difference_pp - 100.0).abs() < 1e-10);
        assert_eq!(cmp.skipped, 0);
    }

    #[test]
    fn test_greedy_order_is_deterministic() {
        let graph = star_graph();
        let target = ["z", "x", "y", "a", "b", "c", "hub"];
        let cmp = compare_coverage(&graph, &target, 1, None);

        // hub, then its leaves by gain, then x/y by degree, z last
        assert_eq!(
            cmp.greedy_order,
            vec!["hub", "a", "b", "c", "x", "y", "z"]
        );
        assert_eq!(cmp, compare_coverage(&graph, &target, 1, None));
    }

    #[test]
    fn test_coverage_curves_end_at_same_total() {
        let graph = star_graph();
        let target = ["z", "x", "y", "a", "b", "c", "hub"];
        let cmp = compare_coverage(&graph, &target, 2, Some(3));

        assert_eq!(cmp.actual_coverage, vec![0, 0, 1, 1, 1, 1, 4]);
        assert_eq!(cmp.greedy_coverage, vec![0, 1, 2, 3, 3, 4, 4]);
        assert_eq!(cmp.actual_coverage.last(), Some(&graph.edge_count()));
        assert_eq!(cmp.window, 3);
    }

    #[test]
    fn test_unknown_and_repeated_are_skipped() {
        let graph = star_graph();
        let cmp = compare_coverage(&graph, &["a", "nope", "a", "hub"], 1, Some(10));

        assert_eq!(cmp.actual_order, vec!["a", "hub"]);
        assert_eq!(cmp.skipped, 2);
        assert_eq!(cmp.window, 2);
        assert!((cmp.actual_hub_rate - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_empty_inputs() {
        let empty: [&str; 0] = [];
        let cmp = compare_coverage(&CompatibilityGraph::default(), &empty, 5, None);

        assert_eq!(cmp.window, 0);
        assert_eq!(cmp.actual_hub_rate, 0.0);
        assert_eq!(cmp.difference_pp, 0.0);
        assert!(cmp.greedy_order.is_empty());
    }
}
