//! Error types and batch summaries
//!
//! Failures in this library are per-item values. A malformed token or an
//! undefined legality verdict is collected into a [`BatchSummary`] and the
//! surrounding batch keeps going.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a word could not be decomposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedReason {
    /// The word itself was empty
    Empty,
    /// Prefix and suffix stripping consumed the whole word
    EmptyMiddle,
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::Empty => f.write_str("empty word"),
            MalformedReason::EmptyMiddle => {
                f.write_str("no MIDDLE remains after prefix/suffix removal")
            }
        }
    }
}

/// A word could not be decomposed into a non-empty MIDDLE
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("malformed token {word:?}: {reason}")]
pub struct MalformedToken {
    pub word: String,
    pub reason: MalformedReason,
}

impl MalformedToken {
    pub fn new(word: impl Into<String>, reason: MalformedReason) -> Self {
        Self {
            word: word.into(),
            reason,
        }
    }
}

/// A legality rule could not produce a verdict for a pair
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("undefined legality for ({a}, {b}): {reason}")]
pub struct UndefinedLegality {
    pub a: String,
    pub b: String,
    pub reason: String,
}

impl UndefinedLegality {
    pub fn new(a: impl Into<String>, b: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            reason: reason.into(),
        }
    }
}

/// Configuration could not be loaded or failed validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Aggregate count of per-item failures, with a few examples kept for reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Items processed
    pub total: usize,
    /// Items that failed
    pub failed: usize,
    /// The first few failure messages
    pub examples: Vec<String>,
}

impl BatchSummary {
    /// Maximum number of example messages retained
    pub const MAX_EXAMPLES: usize = 10;

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful item
    pub fn record_ok(&mut self) {
        self.total += 1;
    }

    /// Record a failed item
    pub fn record_failure(&mut self, err: &impl std::fmt::Display) {
        self.total += 1;
        self.failed += 1;
        if self.examples.len() < Self::MAX_EXAMPLES {
            self.examples.push(err.to_string());
        }
    }

    /// Record the outcome of a fallible item
    pub fn record<T, E: std::fmt::Display>(&mut self, result: &Result<T, E>) {
        match result {
            Ok(_) => self.record_ok(),
            Err(e) => self.record_failure(e),
        }
    }

    /// Combine two summaries; example order follows `self` then `other`
    pub fn merge(mut self, other: BatchSummary) -> Self {
        self.total += other.total;
        self.failed += other.failed;
        let room = Self::MAX_EXAMPLES.saturating_sub(self.examples.len());
        self.examples.extend(other.examples.into_iter().take(room));
        self
    }

    /// Items that succeeded
    pub fn succeeded(&self) -> usize {
        self.total - self.failed
    }

    /// Whether any item failed
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
