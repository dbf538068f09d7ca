//! Analysis configuration and its validation
//!
//! Every threshold the analyses depend on lives here rather than in code:
//! candidate sets, band cut-offs, the infrastructure pattern, the legality rule
//! and the hub/coverage parameters. All sections default, so partial JSON is
//! accepted.
//!
//! Validation never short-circuits; [`AnalysisConfig::validate`] collects every
//! finding into a [`ValidationReport`] so all problems are visible at once.

use crate::error::ConfigError;
use crate::graph::LegalityConfig;
use crate::morphology::MorphologyConfig;
use crate::segment::{boundary_words, EntryScope, RecordSegmenter};
use crate::types::Token;
use crate::vocab::{InfraPattern, RegistryConfig};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Segmentation settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    pub scope: EntryScope,
    /// Words that act as record delimiters
    pub boundary_words: Vec<String>,
}

impl SegmentConfig {
    pub fn segmenter(&self) -> RecordSegmenter {
        RecordSegmenter::new().with_scope(self.scope)
    }

    /// Delimiter predicate over the configured boundary words
    pub fn boundary(&self) -> impl Fn(&Token) -> bool {
        let words: Vec<&str> = self.boundary_words.iter().map(String::as_str).collect();
        boundary_words(&words)
    }
}

/// Graph construction and analytics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub legality: LegalityConfig,
    /// Size of the hub set used by the coverage comparison
    pub hub_top_k: usize,
    /// Prefix length for hub usage rates; `None` uses `hub_top_k`
    pub coverage_window: Option<usize>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            legality: LegalityConfig::default(),
            hub_top_k: 10,
            coverage_window: None,
        }
    }
}

/// Complete configuration of an analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub morphology: MorphologyConfig,
    pub segment: SegmentConfig,
    pub registry: RegistryConfig,
    pub infra: InfraPattern,
    pub graph: GraphConfig,
}

impl AnalysisConfig {
    pub fn with_morphology(mut self, morphology: MorphologyConfig) -> Self {
        self.morphology = morphology;
        self
    }

    pub fn with_segment(mut self, segment: SegmentConfig) -> Self {
        self.segment = segment;
        self
    }

    pub fn with_registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_infra(mut self, infra: InfraPattern) -> Self {
        self.infra = infra;
        self
    }

    pub fn with_graph(mut self, graph: GraphConfig) -> Self {
        self.graph = graph;
        self
    }

    /// Parse and validate a JSON configuration
    ///
    /// Warnings are logged; any error-severity finding rejects the config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        let report = config.validate();
        for warning in report.warnings() {
            tracing::warn!(path = %warning.path, "{}", warning.message);
        }
        if report.has_errors() {
            return Err(ConfigError::Invalid(
                report.errors().map(|d| d.to_string()).collect(),
            ));
        }
        Ok(config)
    }

    /// Check every section and collect all findings
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        check_candidates(&mut report, "morphology.prefixes", &self.morphology.prefixes);
        check_candidates(&mut report, "morphology.suffixes", &self.morphology.suffixes);
        check_candidates(
            &mut report,
            "morphology.articulators",
            &self.morphology.articulators,
        );
        check_candidates(
            &mut report,
            "morphology.gallows_initial",
            &self.morphology.gallows_initial,
        );
        if self.morphology.suffixes.is_empty() {
            report.warning("morphology.suffixes", "no suffix candidates, every suffix stays in the MIDDLE");
        }

        check_candidates(&mut report, "segment.boundary_words", &self.segment.boundary_words);

        match self.registry.core_min_folios {
            0 => report.error("registry.core_min_folios", "must be at least 1"),
            1 => report.warning(
                "registry.core_min_folios",
                "every MIDDLE seen in two or more folios is core",
            ),
            _ => {}
        }
        if self.registry.common_min_frequency == 0 {
            report.warning("registry.common_min_frequency", "rare band is unreachable");
        }

        check_candidates(&mut report, "infra.families", &self.infra.families);
        if self.infra.max_middle_len == 0 && !self.infra.families.is_empty() {
            report.warning("infra.max_middle_len", "0 means the pattern never matches");
        }

        match self.graph.legality {
            LegalityConfig::MinCooccurrence { min: 0 } => report.warning(
                "graph.legality.min",
                "0 makes every pair of observed MIDDLEs legal",
            ),
            LegalityConfig::ObservedOverExpected { min_ratio }
                if !min_ratio.is_finite() || min_ratio < 0.0 =>
            {
                report.error(
                    "graph.legality.min_ratio",
                    format!("must be a finite non-negative number, got {min_ratio}"),
                )
            }
            _ => {}
        }
        if self.graph.hub_top_k == 0 {
            report.warning("graph.hub_top_k", "hub usage rates will always be 0");
        }
        if self.graph.coverage_window == Some(0) {
            report.error("graph.coverage_window", "must be at least 1 when set");
        }

        report
    }
}

fn check_candidates(report: &mut ValidationReport, path: &str, items: &[String]) {
    if items.iter().any(|s| s.is_empty()) {
        report.error(path, "contains an empty string");
    }
    let mut seen = FxHashSet::default();
    let duplicates: Vec<&str> = items
        .iter()
        .filter(|s| !seen.insert(s.as_str()))
        .map(String::as_str)
        .collect();
    if !duplicates.is_empty() {
        report.warning(path, format!("duplicate entries: {}", duplicates.join(", ")));
    }
}

/// Whether a finding rejects the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigDiagnostic {
    pub severity: Severity,
    /// Dotted path of the offending field
    pub path: String,
    pub message: String,
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Collected diagnostics
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ConfigDiagnostic>,
}

impl ValidationReport {
    fn push(&mut self, severity: Severity, path: &str, message: impl Into<String>) {
        self.diagnostics.push(ConfigDiagnostic {
            severity,
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn error(&mut self, path: &str, message: impl Into<String>) {
        self.push(Severity::Error, path, message);
    }

    fn warning(&mut self, path: &str, message: impl Into<String>) {
        self.push(Severity::Warning, path, message);
    }

    pub fn errors(&self) -> impl Iterator<Item = &ConfigDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConfigDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// No errors; warnings are acceptable
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Language;

    #[test]
    fn test_default_config_is_clean() {
        let report = AnalysisConfig::default().validate();
        assert!(report.is_empty(), "{:?}", report.diagnostics);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AnalysisConfig::from_json(
            r#"{
                "registry": { "core_min_folios": 3 },
                "graph": { "legality": { "rule": "observed_over_expected", "min_ratio": 1.5 } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.registry.core_min_folios, 3);
        assert_eq!(config.registry.common_min_frequency, 5);
        assert_eq!(
            config.graph.legality,
            LegalityConfig::ObservedOverExpected { min_ratio: 1.5 }
        );
        assert_eq!(config.graph.hub_top_k, 10);
        assert_eq!(config.morphology, MorphologyConfig::default());
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = AnalysisConfig::default();
        config.morphology.prefixes.push(String::new());
        config.registry.core_min_folios = 0;
        config.graph.coverage_window = Some(0);

        let report = config.validate();
        let paths: Vec<&str> = report.errors().map(|d| d.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "morphology.prefixes",
                "registry.core_min_folios",
                "graph.coverage_window"
            ]
        );
        assert!(!report.is_valid());
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let mut config = AnalysisConfig::default();
        config.morphology.suffixes.push("y".to_string());
        config.graph.hub_top_k = 0;

        let report = config.validate();
        assert!(report.is_valid());
        assert_eq!(report.warnings().count(), 2);
        let first = report.warnings().next().unwrap();
        assert_eq!(first.to_string(), "morphology.suffixes: duplicate entries: y");
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let err = AnalysisConfig::from_json(
            r#"{ "graph": { "legality": { "rule": "observed_over_expected", "min_ratio": -1.0 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msgs) if msgs.len() == 1));

        let err = AnalysisConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_segment_config_boundary() {
        let segment = SegmentConfig {
            scope: EntryScope::Folio,
            boundary_words: vec!["=".to_string()],
        };
        let boundary = segment.boundary();
        assert!(boundary(&Token::paragraph("=", "f1r", "1", Language::A)));
        assert!(!boundary(&Token::paragraph("daiin", "f1r", "1", Language::A)));
    }
}
