//! Analysis runner: orchestrates stage execution and artifact flow.
//!
//! [`Analysis::run`] executes every stage in order:
//! 1. Segment folios into records
//! 2. Parse every record token once
//! 3. Build the vocabulary registry
//! 4. Classify every token
//! 5. Profile compound MIDDLEs against the core band
//! 6. Build the compatibility graph
//! 7. Graph analytics (components, hubs, densities)
//! 8. Coverage comparison of the corpus introduction order against greedy
//!
//! Stages after the parse read the same [`ParsedRecords`], so a malformed
//! token is counted once.
//! Each stage runs inside an `analysis_stage` tracing span and is reported to
//! an optional [`AnalysisObserver`].

use super::artifacts::AnalysisArtifacts;
use super::observer::{
    AnalysisObserver, NoopObserver, StageClock, StageReport, STAGE_ANALYTICS, STAGE_CLASSIFY,
    STAGE_COMPOUND, STAGE_COVERAGE, STAGE_GRAPH, STAGE_PARSE, STAGE_REGISTRY, STAGE_SEGMENT,
};
use super::report::{AnalysisReport, GraphSummary};
use crate::config::AnalysisConfig;
use crate::error::ConfigError;
use crate::graph::{compare_coverage, CompatibilityGraph, LegalityRule};
use crate::morphology::MorphologyParser;
use crate::segment::{ParsedRecords, Record};
use crate::types::Token;
use crate::vocab::{CompoundDetector, RoleSets, TokenClassifier, VocabularyRegistry};

/// Enter a tracing span for one stage; it closes at the end of the scope.
macro_rules! trace_stage {
    ($name:expr) => {
        let _span = tracing::info_span!("analysis_stage", stage = $name).entered();
    };
}

/// A configured analysis over folio token sequences
#[derive(Debug, Clone)]
pub struct Analysis {
    config: AnalysisConfig,
    parser: MorphologyParser,
    classifier: TokenClassifier,
}

impl Default for Analysis {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl Analysis {
    pub fn new(config: AnalysisConfig) -> Self {
        let parser = MorphologyParser::from_config(&config.morphology);
        let classifier = TokenClassifier::new(config.infra.clone());
        Self {
            config,
            parser,
            classifier,
        }
    }

    /// Parse, validate and build from a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        AnalysisConfig::from_json(json).map(Self::new)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn parser(&self) -> &MorphologyParser {
        &self.parser
    }

    /// Segment folios with the configured scope and boundary words
    pub fn segment(&self, folios: &[Vec<Token>]) -> Vec<Record> {
        self.config
            .segment
            .segmenter()
            .segment_folios(folios, self.config.segment.boundary())
    }

    /// Run every stage with the given legality rule
    pub fn run<R: LegalityRule>(
        &self,
        folios: &[Vec<Token>],
        roles: RoleSets,
        rule: &R,
    ) -> AnalysisReport {
        self.run_observed(folios, roles, rule, &mut NoopObserver)
            .into_report()
    }

    /// Run every stage with the legality rule from the configuration
    pub fn run_configured(&self, folios: &[Vec<Token>], roles: RoleSets) -> AnalysisReport {
        let rule = self.config.graph.legality;
        self.run(folios, roles, &rule)
    }

    /// Run every stage, notifying `observer`, and keep all artifacts
    pub fn run_observed<R: LegalityRule>(
        &self,
        folios: &[Vec<Token>],
        roles: RoleSets,
        rule: &R,
        observer: &mut impl AnalysisObserver,
    ) -> AnalysisArtifacts {
        let records = {
            trace_stage!(STAGE_SEGMENT);
            observer.on_stage_start(STAGE_SEGMENT);
            let clock = StageClock::start();
            let records = self.segment(folios);
            observer.on_stage_end(STAGE_SEGMENT, &StageReport::new(clock.elapsed(), records.len()));
            tracing::info!(folios = folios.len(), records = records.len(), "segmented");
            records
        };

        let parsed = {
            trace_stage!(STAGE_PARSE);
            observer.on_stage_start(STAGE_PARSE);
            let clock = StageClock::start();
            let parsed = ParsedRecords::parse(&records, &self.parser);
            let summary = parsed.summary();
            observer.on_stage_end(STAGE_PARSE, &StageReport::new(clock.elapsed(), summary.total));
            tracing::info!(tokens = summary.total, malformed = summary.failed, "parsed");
            parsed
        };

        let registry = {
            trace_stage!(STAGE_REGISTRY);
            observer.on_stage_start(STAGE_REGISTRY);
            let clock = StageClock::start();
            let registry =
                VocabularyRegistry::from_parsed_parallel(&parsed, self.config.registry, roles);
            observer.on_stage_end(STAGE_REGISTRY, &StageReport::new(clock.elapsed(), registry.len()));
            registry
        };

        let classification = {
            trace_stage!(STAGE_CLASSIFY);
            observer.on_stage_start(STAGE_CLASSIFY);
            let clock = StageClock::start();
            let batch = self.classifier.classify_records(&parsed, &registry);
            observer.on_stage_end(STAGE_CLASSIFY, &StageReport::new(clock.elapsed(), batch.items.len()));
            batch
        };

        let compounds = {
            trace_stage!(STAGE_COMPOUND);
            observer.on_stage_start(STAGE_COMPOUND);
            let clock = StageClock::start();
            let profile = CompoundDetector::from_registry(&registry).profile(&registry);
            observer.on_stage_end(
                STAGE_COMPOUND,
                &StageReport::new(clock.elapsed(), profile.compound_middles),
            );
            profile
        };

        let (graph, build) = {
            trace_stage!(STAGE_GRAPH);
            observer.on_stage_start(STAGE_GRAPH);
            let clock = StageClock::start();
            let (graph, build) = CompatibilityGraph::from_parsed(&parsed, rule);
            observer.on_stage_end(STAGE_GRAPH, &StageReport::new(clock.elapsed(), graph.edge_count()));
            tracing::info!(nodes = graph.node_count(), edges = graph.edge_count(), "graph built");
            (graph, build)
        };

        let graph_summary = {
            trace_stage!(STAGE_ANALYTICS);
            observer.on_stage_start(STAGE_ANALYTICS);
            let clock = StageClock::start();
            let folio_density = graph.density_by_folio(&parsed);
            let summary =
                GraphSummary::new(&graph, build, self.config.graph.hub_top_k, folio_density);
            observer.on_stage_end(
                STAGE_ANALYTICS,
                &StageReport::new(clock.elapsed(), summary.components.count()),
            );
            summary
        };

        let coverage = {
            trace_stage!(STAGE_COVERAGE);
            observer.on_stage_start(STAGE_COVERAGE);
            let clock = StageClock::start();
            let order = graph.introduction_order(&parsed);
            let comparison = compare_coverage(
                &graph,
                &order,
                self.config.graph.hub_top_k,
                self.config.graph.coverage_window,
            );
            observer.on_stage_end(STAGE_COVERAGE, &StageReport::new(clock.elapsed(), comparison.window));
            tracing::info!(
                actual = comparison.actual_hub_rate,
                greedy = comparison.greedy_hub_rate,
                difference_pp = comparison.difference_pp,
                "coverage compared"
            );
            comparison
        };

        let report = AnalysisReport {
            records: records.len(),
            registry: registry.snapshot(),
            tokens: classification.items.clone(),
            class_counts: classification.counts,
            parse_summary: parsed.summary().clone(),
            compounds,
            graph: graph_summary,
            coverage,
        };

        AnalysisArtifacts {
            records,
            registry,
            classification,
            graph,
            report,
        }
    }
}
