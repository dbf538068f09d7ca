//! Records paired with the analyses of their tokens
//!
//! Every token is parsed once. The registry, the classifier, the graph
//! builder and the graph analytics all read the same analyses, and the one
//! parse summary is the only place malformed tokens are counted.

use super::records::{PositionedToken, Record};
use crate::error::{BatchSummary, MalformedToken};
use crate::morphology::{MorphAnalysis, MorphologyParser};
use rayon::prelude::*;

/// Record counts below this are parsed sequentially
const PARALLEL_THRESHOLD: usize = 256;

/// Outcome of parsing one token
pub type TokenParse = Result<MorphAnalysis, MalformedToken>;

/// Records with one parse result per token, in token order
#[derive(Debug, Clone)]
pub struct ParsedRecords<'r> {
    records: &'r [Record],
    analyses: Vec<Vec<TokenParse>>,
    summary: BatchSummary,
}

impl<'r> ParsedRecords<'r> {
    /// Parse every token of `records`
    ///
    /// Large inputs are split across the rayon pool by record; result order
    /// always matches record and token order.
    pub fn parse(records: &'r [Record], parser: &MorphologyParser) -> Self {
        let analyses: Vec<Vec<TokenParse>> = if records.len() < PARALLEL_THRESHOLD {
            records.iter().map(|r| r.analyses(parser).collect()).collect()
        } else {
            records
                .par_iter()
                .map(|r| r.analyses(parser).collect())
                .collect()
        };

        let mut summary = BatchSummary::new();
        for result in analyses.iter().flatten() {
            summary.record(result);
        }
        if summary.has_failures() {
            tracing::warn!(
                failed = summary.failed,
                total = summary.total,
                "malformed tokens skipped"
            );
        }

        Self {
            records,
            analyses,
            summary,
        }
    }

    pub fn records(&self) -> &'r [Record] {
        self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parse outcomes over every record token
    pub fn summary(&self) -> &BatchSummary {
        &self.summary
    }

    /// Each record with its per-token results
    pub fn iter(&self) -> impl Iterator<Item = (&'r Record, &[TokenParse])> + '_ {
        self.records
            .iter()
            .zip(self.analyses.iter().map(|a| a.as_slice()))
    }

    /// Parallel form of [`iter`](Self::iter)
    pub fn par_iter(
        &self,
    ) -> impl IndexedParallelIterator<Item = (&'r Record, &[TokenParse])> + '_ {
        self.records
            .par_iter()
            .zip(self.analyses.par_iter().map(|a| a.as_slice()))
    }

    /// Well-formed tokens of record `index` with their analyses
    pub fn analysed(
        &self,
        index: usize,
    ) -> impl Iterator<Item = (&'r PositionedToken, &MorphAnalysis)> + '_ {
        let tokens: &'r [PositionedToken] = self
            .records
            .get(index)
            .map_or(&[][..], |r| r.tokens.as_slice());
        let results = self.analyses.get(index).map_or(&[][..], |a| a.as_slice());
        tokens
            .iter()
            .zip(results)
            .filter_map(|(token, result)| result.as_ref().ok().map(|a| (token, a)))
    }

    /// Every successful analysis in record and token order
    pub fn successes(&self) -> impl Iterator<Item = &MorphAnalysis> {
        self.analyses
            .iter()
            .flatten()
            .filter_map(|r| r.as_ref().ok())
    }
}
