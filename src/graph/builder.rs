//! Graph builder with O(1) node and edge lookups
//!
//! The builder is the only mutable form of a compatibility graph. It is
//! filled once from a scan of parsed records and then frozen into a
//! [`CompatibilityGraph`](super::csr::CompatibilityGraph).

use super::legality::{LegalityRule, PairContext};
use crate::error::UndefinedLegality;
use crate::segment::ParsedRecords;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Node counts below this evaluate pairs sequentially
const PARALLEL_THRESHOLD: usize = 64;

/// Undefined pairs kept verbatim in the build report
const MAX_UNDEFINED_EXAMPLES: usize = 10;

/// A node in the graph builder
#[derive(Debug, Clone)]
pub(crate) struct BuilderNode {
    /// The MIDDLE for this node
    pub middle: String,
    /// Adjacent node IDs
    pub edges: FxHashSet<u32>,
}

impl BuilderNode {
    pub fn new(middle: impl Into<String>) -> Self {
        Self {
            middle: middle.into(),
            edges: FxHashSet::default(),
        }
    }
}

/// Outcome of building a graph from records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphBuildReport {
    pub nodes: usize,
    pub pairs_evaluated: usize,
    pub edges: usize,
    /// Pairs the legality rule could not decide
    pub undefined: usize,
    pub undefined_examples: Vec<UndefinedLegality>,
}

/// Record-level co-occurrence counts keyed by node ID
#[derive(Debug, Default)]
struct CooccurrenceCounts {
    per_node: Vec<usize>,
    per_pair: FxHashMap<(u32, u32), usize>,
    total_records: usize,
}

impl CooccurrenceCounts {
    fn context(&self, a: u32, b: u32) -> PairContext {
        let key = if a < b { (a, b) } else { (b, a) };
        PairContext {
            cooccurrence: self.per_pair.get(&key).copied().unwrap_or(0),
            count_a: self.per_node[a as usize],
            count_b: self.per_node[b as usize],
            total_records: self.total_records,
        }
    }
}

/// Edges and undefined verdicts from one row of the pair matrix
#[derive(Default)]
struct RowVerdicts {
    edges: Vec<(u32, u32)>,
    undefined: Vec<UndefinedLegality>,
}

/// A mutable graph builder
#[derive(Debug)]
pub struct GraphBuilder {
    /// Maps MIDDLE -> node ID
    middle_to_id: FxHashMap<String, u32>,
    /// Node storage, in insertion order
    nodes: Vec<BuilderNode>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Create a new empty graph builder
    pub fn new() -> Self {
        Self {
            middle_to_id: FxHashMap::default(),
            nodes: Vec::new(),
        }
    }

    /// Get or create a node for the given MIDDLE, returning its ID
    pub fn get_or_create_node(&mut self, middle: &str) -> u32 {
        if let Some(&id) = self.middle_to_id.get(middle) {
            return id;
        }

        let id = self.nodes.len() as u32;
        self.middle_to_id.insert(middle.to_string(), id);
        self.nodes.push(BuilderNode::new(middle));
        id
    }

    /// Add an undirected edge; returns false for self-loops, unknown IDs and
    /// edges that already exist
    pub fn add_edge(&mut self, from: u32, to: u32) -> bool {
        if from == to {
            return false; // No self-loops
        }
        let n = self.nodes.len() as u32;
        if from >= n || to >= n {
            return false;
        }

        let inserted = self.nodes[from as usize].edges.insert(to);
        self.nodes[to as usize].edges.insert(from);
        inserted
    }

    /// Build a compatibility graph from parsed records
    ///
    /// Every MIDDLE observed becomes a node exactly once, in first-seen order.
    /// Every unordered pair is evaluated once; an edge is added iff the rule
    /// returns `Ok(true)`. Undefined verdicts are logged and skipped.
    /// Malformed tokens contribute nothing.
    pub fn from_records<R: LegalityRule>(
        parsed: &ParsedRecords<'_>,
        rule: &R,
    ) -> (Self, GraphBuildReport) {
        let mut builder = Self::new();
        let mut report = GraphBuildReport::default();
        let mut counts = CooccurrenceCounts {
            total_records: parsed.len(),
            ..Default::default()
        };

        // Nodes and record-level co-occurrence
        for (_, analyses) in parsed.iter() {
            let mut ids: Vec<u32> = analyses
                .iter()
                .filter_map(|r| r.as_ref().ok())
                .map(|analysis| builder.get_or_create_node(&analysis.middle))
                .collect();
            ids.sort_unstable();
            ids.dedup();

            counts.per_node.resize(builder.node_count(), 0);
            for (i, &a) in ids.iter().enumerate() {
                counts.per_node[a as usize] += 1;
                for &b in &ids[i + 1..] {
                    *counts.per_pair.entry((a, b)).or_insert(0) += 1;
                }
            }
        }

        let n = builder.node_count();
        let rows: Vec<RowVerdicts> = if n < PARALLEL_THRESHOLD {
            (0..n as u32)
                .map(|a| builder.evaluate_row(a, &counts, rule))
                .collect()
        } else {
            (0..n as u32)
                .into_par_iter()
                .map(|a| builder.evaluate_row(a, &counts, rule))
                .collect()
        };

        // Edges are inserted from a single thread
        for row in rows {
            for (a, b) in row.edges {
                if builder.add_edge(a, b) {
                    report.edges += 1;
                }
            }
            for undefined in row.undefined {
                tracing::debug!(a = %undefined.a, b = %undefined.b, reason = %undefined.reason, "undefined legality, pair skipped");
                report.undefined += 1;
                if report.undefined_examples.len() < MAX_UNDEFINED_EXAMPLES {
                    report.undefined_examples.push(undefined);
                }
            }
        }

        report.nodes = n;
        report.pairs_evaluated = n * n.saturating_sub(1) / 2;

        if report.undefined > 0 {
            tracing::warn!(
                undefined = report.undefined,
                pairs = report.pairs_evaluated,
                "legality rule left pairs undefined"
            );
        }

        (builder, report)
    }

    fn evaluate_row<R: LegalityRule>(
        &self,
        a: u32,
        counts: &CooccurrenceCounts,
        rule: &R,
    ) -> RowVerdicts {
        let mut row = RowVerdicts::default();
        let middle_a = &self.nodes[a as usize].middle;
        for b in (a + 1)..self.nodes.len() as u32 {
            let middle_b = &self.nodes[b as usize].middle;
            match rule.verdict(middle_a, middle_b, &counts.context(a, b)) {
                Ok(true) => row.edges.push((a, b)),
                Ok(false) => {}
                Err(undefined) => row.undefined.push(undefined),
            }
        }
        row
    }

    /// Get the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the total number of edges (counting each undirected edge once)
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum::<usize>() / 2
    }

    /// Get a node by ID
    pub(crate) fn get_node(&self, id: u32) -> Option<&BuilderNode> {
        self.nodes.get(id as usize)
    }

    /// Get a node ID by MIDDLE
    pub fn get_node_id(&self, middle: &str) -> Option<u32> {
        self.middle_to_id.get(middle).copied()
    }

    /// Get the MIDDLE for a node ID
    pub fn get_middle(&self, id: u32) -> Option<&str> {
        self.nodes.get(id as usize).map(|n| n.middle.as_str())
    }

    /// Iterate over all nodes in insertion order
    pub(crate) fn nodes(&self) -> impl Iterator<Item = (u32, &BuilderNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as u32, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::legality::{MinCooccurrence, ObservedOverExpected};
    use crate::morphology::{CandidateSet, MorphologyParser};
    use crate::segment::{segment, Record};
    use crate::types::{Language, Token};

    fn plain_parser() -> MorphologyParser {
        MorphologyParser::new(CandidateSet::empty(), CandidateSet::empty())
    }

    fn records(lines: &[&[&str]]) -> Vec<Record> {
        let tokens: Vec<Token> = lines
            .iter()
            .enumerate()
            .flat_map(|(i, words)| {
                words
                    .iter()
                    .map(move |w| Token::paragraph(*w, "f1r", i.to_string(), Language::B))
            })
            .collect();
        segment(&tokens, |_| false)
    }

    #[test]
    fn test_graph_builder_basic() {
        let mut builder = GraphBuilder::new();

        let id_a = builder.get_or_create_node("ol");
        let id_b = builder.get_or_create_node("kee");
        let id_c = builder.get_or_create_node("ol"); // duplicate

        assert_eq!(id_a, id_c);
        assert_ne!(id_a, id_b);
        assert_eq!(builder.node_count(), 2);
    }

    #[test]
    fn test_duplicate_edges_ignored() {
        let mut builder = GraphBuilder::new();
        let a = builder.get_or_create_node("ol");
        let b = builder.get_or_create_node("kee");

        assert!(builder.add_edge(a, b));
        assert!(!builder.add_edge(b, a));
        assert_eq!(builder.edge_count(), 1);
    }

    #[test]
    fn test_self_loops_prevented() {
        let mut builder = GraphBuilder::new();
        let a = builder.get_or_create_node("ol");

        assert!(!builder.add_edge(a, a));
        assert!(builder.get_node(a).unwrap().edges.is_empty());
    }

    #[test]
    fn test_unknown_ids_rejected() {
        let mut builder = GraphBuilder::new();
        let a = builder.get_or_create_node("ol");
        assert!(!builder.add_edge(a, 7));
    }

    #[test]
    fn test_from_records_cooccurrence() {
        let recs = records(&[&["ol", "kee", "ol"], &["kee", "ar"], &["dy"]]);
        let (builder, report) = GraphBuilder::from_records(
            &ParsedRecords::parse(&recs, &plain_parser()),
            &MinCooccurrence { min: 1 },
        );

        assert_eq!(builder.node_count(), 4);
        assert_eq!(builder.get_middle(0), Some("ol"));
        assert_eq!(builder.get_middle(3), Some("dy"));
        assert_eq!(builder.edge_count(), 2);
        assert_eq!(report.edges, 2);
        assert_eq!(report.pairs_evaluated, 6);
        assert_eq!(report.undefined, 0);

        let ol = builder.get_node_id("ol").unwrap();
        let kee = builder.get_node_id("kee").unwrap();
        assert!(builder.get_node(ol).unwrap().edges.contains(&kee));
        let dy = builder.get_node_id("dy").unwrap();
        assert!(builder.get_node(dy).unwrap().edges.is_empty());
    }

    #[test]
    fn test_undefined_pairs_are_skipped() {
        let recs = records(&[&["ol", "kee"], &["ar"]]);
        let rule = |a: &str, b: &str, _ctx: &PairContext| -> Result<bool, UndefinedLegality> {
            if a == "ar" || b == "ar" {
                Err(UndefinedLegality::new(a, b, "no data"))
            } else {
                Ok(true)
            }
        };
        let parsed = ParsedRecords::parse(&recs, &plain_parser());
        let (builder, report) = GraphBuilder::from_records(&parsed, &rule);

        assert_eq!(builder.node_count(), 3);
        assert_eq!(builder.edge_count(), 1);
        assert_eq!(report.undefined, 2);
        assert_eq!(report.undefined_examples.len(), 2);
    }

    #[test]
    fn test_rule_sees_counts() {
        let recs = records(&[&["ol", "kee"], &["ol", "kee"], &["ol"], &["ar"]]);
        let rule = ObservedOverExpected { min_ratio: 1.0 };
        let parsed = ParsedRecords::parse(&recs, &plain_parser());
        let (builder, report) = GraphBuilder::from_records(&parsed, &rule);

        // ol/kee: observed 2, expected 3 * 2 / 4 = 1.5
        assert_eq!(builder.edge_count(), 1);
        assert_eq!(report.undefined, 0);
    }

    #[test]
    fn test_parallel_evaluation_matches_sequential_shape() {
        let words: Vec<String> = (0..100).map(|i| format!("m{i}")).collect();
        let line: Vec<&str> = words.iter().map(|w| w.as_str()).collect();
        let recs = records(&[&line]);
        let (builder, report) = GraphBuilder::from_records(
            &ParsedRecords::parse(&recs, &plain_parser()),
            &MinCooccurrence { min: 1 },
        );

        assert_eq!(builder.node_count(), 100);
        assert_eq!(builder.edge_count(), 100 * 99 / 2);
        assert_eq!(report.edges, builder.edge_count());
    }

    #[test]
    fn test_malformed_tokens_add_no_node() {
        let parser = MorphologyParser::new(
            CandidateSet::from_list(&["ch"]),
            CandidateSet::from_list(&["y"]),
        );
        let recs = records(&[&["chy", "chol"], &["chol", "kee"]]);
        let (builder, report) = GraphBuilder::from_records(
            &ParsedRecords::parse(&recs, &parser),
            &MinCooccurrence::default(),
        );

        // "chy" leaves an empty MIDDLE and adds no node
        assert_eq!(builder.node_count(), 2);
        assert_eq!(builder.get_middle(0), Some("ol"));
        assert_eq!(report.edges, 1);
    }

    #[test]
    fn test_nodes_in_insertion_order() {
        let recs = records(&[&["kee", "ol"], &["ar", "kee"]]);
        let (builder, _) = GraphBuilder::from_records(
            &ParsedRecords::parse(&recs, &plain_parser()),
            &MinCooccurrence::default(),
        );

        let middles: Vec<(u32, &str)> = builder
            .nodes()
            .map(|(id, node)| (id, node.middle.as_str()))
            .collect();
        assert_eq!(middles, vec![(0, "kee"), (1, "ol"), (2, "ar")]);
        for (id, node) in builder.nodes() {
            assert_eq!(builder.get_node_id(&node.middle), Some(id));
        }
    }
}
