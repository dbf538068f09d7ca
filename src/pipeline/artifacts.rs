//! Intermediate results of an analysis run.
//!
//! The report is a flattened, serializable view; the artifacts keep the
//! queryable structures (registry, graph) for callers that need more than the
//! report carries.

use super::report::AnalysisReport;
use crate::graph::CompatibilityGraph;
use crate::segment::Record;
use crate::vocab::{ClassificationBatch, VocabularyRegistry};

/// Owned stage outputs of one run
#[derive(Debug, Clone)]
pub struct AnalysisArtifacts {
    pub records: Vec<Record>,
    pub registry: VocabularyRegistry,
    pub classification: ClassificationBatch,
    pub graph: CompatibilityGraph,
    pub report: AnalysisReport,
}

impl AnalysisArtifacts {
    /// Drop everything but the report
    pub fn into_report(self) -> AnalysisReport {
        self.report
    }
}
