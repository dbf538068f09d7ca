//! # folio-morph
//!
//! Token analysis for transcribed manuscript corpora: slot morphology,
//! record segmentation, per-subset vocabulary registries, token
//! classification, compound detection and a MIDDLE compatibility graph.
//!
//! ## Flow
//!
//! folio token sequences → [`segment`] records → one parse per token
//! ([`ParsedRecords`]) → [`vocab`] registry → classifier, compound detector
//! and [`graph`] engine, each reading the registry and the same analyses.
//!
//! ## Quick Start
//!
//! ```rust
//! use folio_morph::prelude::*;
//!
//! let folio: Vec<Token> = ["chodaiin", "qokeedy", "daiin"]
//!     .iter()
//!     .map(|w| Token::paragraph(*w, "f1r", "1", Language::A))
//!     .collect();
//!
//! let report = Analysis::default().run(&[folio], RoleSets::default(), &MinCooccurrence::default());
//! assert_eq!(report.records, 1);
//! assert_eq!(report.graph.nodes, 3);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod morphology;
pub mod pipeline;
pub mod segment;
pub mod types;
pub mod vocab;

pub use config::AnalysisConfig;
pub use error::{BatchSummary, ConfigError, MalformedToken, UndefinedLegality};
pub use graph::CompatibilityGraph;
pub use morphology::{parse, MorphAnalysis, MorphologyParser};
pub use pipeline::{Analysis, AnalysisReport};
pub use segment::{segment, ParsedRecords, Record};
pub use types::{Language, Placement, Section, Token};
pub use vocab::{classify, get_contained_atoms, is_compound, TokenClass, VocabularyRegistry};

/// Commonly used items
pub mod prelude {
    pub use crate::config::AnalysisConfig;
    pub use crate::graph::{
        compare_coverage, CompatibilityGraph, LegalityRule, MinCooccurrence,
        ObservedOverExpected, PairContext,
    };
    pub use crate::morphology::{CandidateSet, MorphAnalysis, MorphologyParser};
    pub use crate::pipeline::{Analysis, AnalysisReport};
    pub use crate::segment::{segment, ParsedRecords, Record, RecordSegmenter};
    pub use crate::types::{Language, Token};
    pub use crate::vocab::{
        Band, CompoundDetector, InfraPattern, RegistryConfig, RoleSets, TokenClass,
        TokenClassifier, VocabularyRegistry,
    };
}
