//! Legality predicates for MIDDLE pairs
//!
//! The graph engine only assembles edges; deciding whether a pair is legal is
//! the job of a [`LegalityRule`]. A rule may decline to decide by returning
//! [`UndefinedLegality`], in which case the pair is skipped.

use crate::error::UndefinedLegality;
use serde::{Deserialize, Serialize};

/// Record-level co-occurrence statistics for one pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairContext {
    /// Records containing both MIDDLEs
    pub cooccurrence: usize,
    /// Records containing the first MIDDLE
    pub count_a: usize,
    /// Records containing the second MIDDLE
    pub count_b: usize,
    /// Records scanned
    pub total_records: usize,
}

impl PairContext {
    /// Co-occurrence expected if the two MIDDLEs were placed independently
    pub fn expected(&self) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        self.count_a as f64 * self.count_b as f64 / self.total_records as f64
    }
}

/// Decides whether two MIDDLEs may legally co-occur
///
/// Rules are evaluated from multiple threads and must not have side effects.
pub trait LegalityRule: Sync {
    fn verdict(&self, a: &str, b: &str, ctx: &PairContext) -> Result<bool, UndefinedLegality>;
}

impl<F> LegalityRule for F
where
    F: Fn(&str, &str, &PairContext) -> Result<bool, UndefinedLegality> + Sync,
{
    fn verdict(&self, a: &str, b: &str, ctx: &PairContext) -> Result<bool, UndefinedLegality> {
        self(a, b, ctx)
    }
}

/// Legal when the pair co-occurs in at least `min` records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinCooccurrence {
    pub min: usize,
}

impl Default for MinCooccurrence {
    fn default() -> Self {
        Self { min: 1 }
    }
}

impl LegalityRule for MinCooccurrence {
    fn verdict(&self, _a: &str, _b: &str, ctx: &PairContext) -> Result<bool, UndefinedLegality> {
        Ok(ctx.cooccurrence >= self.min)
    }
}

/// Legal when observed co-occurrence is at least `min_ratio` times the
/// independence expectation; undefined when nothing is expected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedOverExpected {
    pub min_ratio: f64,
}

impl Default for ObservedOverExpected {
    fn default() -> Self {
        Self { min_ratio: 0.5 }
    }
}

impl LegalityRule for ObservedOverExpected {
    fn verdict(&self, a: &str, b: &str, ctx: &PairContext) -> Result<bool, UndefinedLegality> {
        let expected = ctx.expected();
        if expected <= 0.0 {
            return Err(UndefinedLegality::new(a, b, "zero expected co-occurrence"));
        }
        Ok(ctx.cooccurrence as f64 / expected >= self.min_ratio)
    }
}

/// Serializable choice of built-in rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum LegalityConfig {
    MinCooccurrence { min: usize },
    ObservedOverExpected { min_ratio: f64 },
}

impl Default for LegalityConfig {
    fn default() -> Self {
        LegalityConfig::MinCooccurrence { min: 1 }
    }
}

impl LegalityRule for LegalityConfig {
    fn verdict(&self, a: &str, b: &str, ctx: &PairContext) -> Result<bool, UndefinedLegality> {
        match *self {
            LegalityConfig::MinCooccurrence { min } => MinCooccurrence { min }.verdict(a, b, ctx),
            LegalityConfig::ObservedOverExpected { min_ratio } => {
                ObservedOverExpected { min_ratio }.verdict(a, b, ctx)
            }
        }
    }
}
