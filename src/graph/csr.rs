//! Immutable compatibility graph in Compressed Sparse Row (CSR) form
//!
//! Neighbor lists are stored contiguously and sorted by node ID, so edge
//! membership is a binary search and neighbor iteration is a slice walk.
//! Once built the graph is never modified; a different corpus subset gets a
//! new graph.

use super::builder::{GraphBuildReport, GraphBuilder};
use super::legality::LegalityRule;
use crate::morphology::MorphologyParser;
use crate::segment::{ParsedRecords, Record};
use crate::vocab::VocabularyRegistry;
use rustc_hash::FxHashMap;

/// An undirected, simple graph over MIDDLE types
#[derive(Debug, Clone)]
pub struct CompatibilityGraph {
    /// Number of nodes
    num_nodes: usize,
    /// Row pointers: node i's neighbors are at indices row_ptr[i]..row_ptr[i+1]
    row_ptr: Vec<usize>,
    /// Neighbor IDs, sorted within each row
    col_idx: Vec<u32>,
    /// MIDDLE for each node, in insertion order
    middles: Vec<String>,
    /// MIDDLE -> node ID
    index: FxHashMap<String, u32>,
}

impl CompatibilityGraph {
    /// Freeze a builder into CSR form
    pub fn from_builder(builder: &GraphBuilder) -> Self {
        let num_nodes = builder.node_count();
        let mut row_ptr = Vec::with_capacity(num_nodes + 1);
        let mut col_idx = Vec::with_capacity(builder.edge_count() * 2);
        let mut middles = Vec::with_capacity(num_nodes);
        let mut index = FxHashMap::with_capacity_and_hasher(num_nodes, Default::default());

        row_ptr.push(0);

        for (id, node) in builder.nodes() {
            middles.push(node.middle.clone());
            index.insert(node.middle.clone(), id);

            // Sorted for deterministic iteration and binary search
            let mut edges: Vec<u32> = node.edges.iter().copied().collect();
            edges.sort_unstable();
            col_idx.extend(edges);

            row_ptr.push(col_idx.len());
        }

        Self {
            num_nodes,
            row_ptr,
            col_idx,
            middles,
            index,
        }
    }

    /// Parse records and build with the given legality rule
    pub fn build<R: LegalityRule>(
        records: &[Record],
        parser: &MorphologyParser,
        rule: &R,
    ) -> (Self, GraphBuildReport) {
        Self::from_parsed(&ParsedRecords::parse(records, parser), rule)
    }

    /// Build from already parsed records with the given legality rule
    pub fn from_parsed<R: LegalityRule>(
        parsed: &ParsedRecords<'_>,
        rule: &R,
    ) -> (Self, GraphBuildReport) {
        let (builder, report) = GraphBuilder::from_records(parsed, rule);
        tracing::debug!(
            nodes = report.nodes,
            edges = report.edges,
            undefined = report.undefined,
            "compatibility graph built"
        );
        (Self::from_builder(&builder), report)
    }

    pub fn node_count(&self) -> usize {
        self.num_nodes
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.col_idx.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.num_nodes == 0
    }

    /// Node ID of a MIDDLE
    pub fn node_id(&self, middle: &str) -> Option<u32> {
        self.index.get(middle).copied()
    }

    /// MIDDLE of a node
    pub fn middle(&self, node: u32) -> &str {
        &self.middles[node as usize]
    }

    /// All MIDDLEs in node order
    pub fn middles(&self) -> &[String] {
        &self.middles
    }

    /// Sorted neighbor IDs of a node
    pub fn neighbors(&self, node: u32) -> &[u32] {
        let start = self.row_ptr[node as usize];
        let end = self.row_ptr[node as usize + 1];
        &self.col_idx[start..end]
    }

    pub fn degree(&self, node: u32) -> u32 {
        self.neighbors(node).len() as u32
    }

    pub fn has_edge(&self, a: u32, b: u32) -> bool {
        a != b
            && (a as usize) < self.num_nodes
            && (b as usize) < self.num_nodes
            && self.neighbors(a).binary_search(&b).is_ok()
    }

    /// Whether two MIDDLEs are connected
    pub fn is_legal(&self, a: &str, b: &str) -> bool {
        match (self.node_id(a), self.node_id(b)) {
            (Some(x), Some(y)) => self.has_edge(x, y),
            _ => false,
        }
    }

    /// Each undirected edge once, as `(low, high)` node IDs
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.num_nodes as u32).flat_map(move |a| {
            self.neighbors(a)
                .iter()
                .copied()
                .filter(move |&b| b > a)
                .map(move |b| (a, b))
        })
    }

    /// Nodes with no edges
    pub fn isolated_nodes(&self) -> Vec<u32> {
        (0..self.num_nodes as u32)
            .filter(|&n| self.degree(n) == 0)
            .collect()
    }

    /// Whether every MIDDLE of the registry is a node
    pub fn covers_registry(&self, registry: &VocabularyRegistry) -> bool {
        registry.middles().iter().all(|m| self.index.contains_key(*m))
    }
}

impl Default for CompatibilityGraph {
    fn default() -> Self {
        Self {
            num_nodes: 0,
            row_ptr: vec![0],
            col_idx: Vec::new(),
            middles: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::graph::legality::MinCooccurrence;
    use crate::morphology::CandidateSet;
    use crate::segment::segment;
    use crate::types::{Language, Token};
    use crate::vocab::{RegistryConfig, RoleSets};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn graph_is_simple_and_covers_registry(
            lines in prop::collection::vec(prop::collection::vec("[a-e]{1,3}", 1..6), 0..12),
        ) {
            let tokens: Vec<Token> = lines
                .iter()
                .enumerate()
                .flat_map(|(i, words)| {
                    words.iter().map(move |w| {
                        Token::paragraph(w.clone(), format!("f{}", i % 3), i.to_string(), Language::B)
                    })
                })
                .collect();
            let records = segment(&tokens, |_| false);
            let parser = MorphologyParser::new(CandidateSet::empty(), CandidateSet::empty())
                .with_articulators(CandidateSet::empty());
            let registry = VocabularyRegistry::build(
                &records,
                &parser,
                RegistryConfig::default(),
                RoleSets::default(),
            );
            let (graph, _) = CompatibilityGraph::build(&records, &parser, &MinCooccurrence::default());

            prop_assert!(graph.covers_registry(&registry));
            let mut seen = rustc_hash::FxHashSet::default();
            for (a, b) in graph.edges() {
                prop_assert!(a < b);
                prop_assert!(seen.insert((a, b)));
                prop_assert!(graph.has_edge(b, a));
            }
            for n in 0..graph.node_count() as u32 {
                prop_assert!(!graph.has_edge(n, n));
                prop_assert_eq!(graph.neighbors(n).len(), graph.degree(n) as usize);
            }
        }
    }
}
