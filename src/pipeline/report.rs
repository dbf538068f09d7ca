//! Serializable output of an analysis run
//!
//! Plain value objects only; downstream tooling picks the serialization.

use crate::error::BatchSummary;
use crate::graph::{
    CompatibilityGraph, Components, CoverageComparison, FolioDensity, GraphBuildReport, HubEntry,
};
use crate::vocab::{ClassCounts, ClassifiedToken, CompoundProfile, RegistrySnapshot};
use serde::Serialize;

/// Graph-level results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphSummary {
    pub build: GraphBuildReport,
    pub nodes: usize,
    pub edges: usize,
    /// Incompatibility density of the whole graph
    pub density: f64,
    pub components: Components,
    pub largest_component: usize,
    /// MIDDLEs with no legal partner
    pub isolates: Vec<String>,
    /// Top-K hubs
    pub hubs: Vec<HubEntry>,
    pub folio_density: Vec<FolioDensity>,
}

impl GraphSummary {
    pub fn new(
        graph: &CompatibilityGraph,
        build: GraphBuildReport,
        hub_top_k: usize,
        folio_density: Vec<FolioDensity>,
    ) -> Self {
        let components = graph.components();
        Self {
            build,
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            density: graph.density(),
            largest_component: components.largest(),
            isolates: components
                .isolates()
                .into_iter()
                .map(|n| graph.middle(n).to_string())
                .collect(),
            components,
            hubs: graph.hubs(hub_top_k),
            folio_density,
        }
    }
}

/// Everything one run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub records: usize,
    pub registry: RegistrySnapshot,
    /// Per-token analysis and class
    pub tokens: Vec<ClassifiedToken>,
    pub class_counts: ClassCounts,
    /// Parse outcomes over every record token
    pub parse_summary: BatchSummary,
    pub compounds: CompoundProfile,
    pub graph: GraphSummary,
    pub coverage: CoverageComparison,
}

impl AnalysisReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Whether any token failed to parse or any pair was undecidable
    pub fn has_issues(&self) -> bool {
        self.parse_summary.has_failures() || self.graph.build.undefined > 0
    }
}
