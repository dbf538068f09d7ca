//! Token classification
//!
//! Precedence is fixed and evaluated top to bottom:
//! 1. INFRA, when the MIDDLE matches the infrastructure pattern
//! 2. RI, when the MIDDLE is in the registry-internal set
//! 3. PP, when the MIDDLE is in the pipeline-participant set
//! 4. UNKNOWN
//!
//! Some infrastructure MIDDLEs are also members of the RI or PP sets; they
//! must still classify as INFRA.

use super::registry::VocabularyRegistry;
use crate::morphology::MorphAnalysis;
use crate::segment::{ParsedRecords, PositionInBlock};
use serde::{Deserialize, Serialize};

/// Categorical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenClass {
    Ri,
    Pp,
    Infra,
    Unknown,
}

/// Infrastructure pattern: a short MIDDLE opening with one of a family of
/// leading sequences
///
/// Only the MIDDLE slot is inspected. A stripped PREFIX never makes a token
/// INFRA, whatever it starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfraPattern {
    /// Leading sequences of the MIDDLE that mark the family
    pub families: Vec<String>,
    /// Inclusive maximum MIDDLE length in characters
    pub max_middle_len: usize,
}

impl Default for InfraPattern {
    fn default() -> Self {
        Self {
            families: vec!["d".to_string(), "s".to_string()],
            max_middle_len: 2,
        }
    }
}

impl InfraPattern {
    pub fn new(families: &[&str], max_middle_len: usize) -> Self {
        Self {
            families: families.iter().map(|f| f.to_string()).collect(),
            max_middle_len,
        }
    }

    /// A pattern that never matches
    pub fn none() -> Self {
        Self {
            families: Vec::new(),
            max_middle_len: 0,
        }
    }

    /// Whether the MIDDLE starts with a family sequence and is at most
    /// `max_middle_len` characters long
    pub fn matches(&self, analysis: &MorphAnalysis) -> bool {
        analysis.middle_len() <= self.max_middle_len
            && self
                .families
                .iter()
                .any(|f| !f.is_empty() && analysis.middle.starts_with(f.as_str()))
    }
}

/// Classify one analysis against a registry's role sets
pub fn classify(
    analysis: &MorphAnalysis,
    registry: &VocabularyRegistry,
    infra: &InfraPattern,
) -> TokenClass {
    let roles = registry.roles();
    if infra.matches(analysis) {
        TokenClass::Infra
    } else if roles.is_ri(&analysis.middle) {
        TokenClass::Ri
    } else if roles.is_pp(&analysis.middle) {
        TokenClass::Pp
    } else {
        TokenClass::Unknown
    }
}

/// A token with its analysis and class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedToken {
    pub word: String,
    pub folio: String,
    pub line: String,
    pub position: PositionInBlock,
    pub analysis: MorphAnalysis,
    pub class: TokenClass,
}

/// Tokens per class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub ri: usize,
    pub pp: usize,
    pub infra: usize,
    pub unknown: usize,
}

impl ClassCounts {
    pub fn add(&mut self, class: TokenClass) {
        match class {
            TokenClass::Ri => self.ri += 1,
            TokenClass::Pp => self.pp += 1,
            TokenClass::Infra => self.infra += 1,
            TokenClass::Unknown => self.unknown += 1,
        }
    }

    pub fn get(&self, class: TokenClass) -> usize {
        match class {
            TokenClass::Ri => self.ri,
            TokenClass::Pp => self.pp,
            TokenClass::Infra => self.infra,
            TokenClass::Unknown => self.unknown,
        }
    }

    pub fn total(&self) -> usize {
        self.ri + self.pp + self.infra + self.unknown
    }
}

/// Classification of every well-formed token in a set of records
///
/// Malformed tokens are left out of `items`; they are counted once, in the
/// summary of the [`ParsedRecords`] the batch was built from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationBatch {
    pub items: Vec<ClassifiedToken>,
    pub counts: ClassCounts,
}

/// Classifier holding an infrastructure pattern
#[derive(Debug, Clone, Default)]
pub struct TokenClassifier {
    infra: InfraPattern,
}

impl TokenClassifier {
    pub fn new(infra: InfraPattern) -> Self {
        Self { infra }
    }

    pub fn infra(&self) -> &InfraPattern {
        &self.infra
    }

    pub fn classify(&self, analysis: &MorphAnalysis, registry: &VocabularyRegistry) -> TokenClass {
        classify(analysis, registry, &self.infra)
    }

    /// Classify every well-formed token of parsed records
    pub fn classify_records(
        &self,
        parsed: &ParsedRecords<'_>,
        registry: &VocabularyRegistry,
    ) -> ClassificationBatch {
        let mut batch = ClassificationBatch::default();

        for index in 0..parsed.len() {
            for (positioned, analysis) in parsed.analysed(index) {
                let token = &positioned.token;
                let class = self.classify(analysis, registry);
                batch.counts.add(class);
                batch.items.push(ClassifiedToken {
                    word: token.word.clone(),
                    folio: token.folio.clone(),
                    line: token.line.clone(),
                    position: positioned.position,
                    analysis: analysis.clone(),
                    class,
                });
            }
        }

        tracing::debug!(
            ri = batch.counts.ri,
            pp = batch.counts.pp,
            infra = batch.counts.infra,
            unknown = batch.counts.unknown,
            "classified tokens"
        );
        batch
    }
}
