//! Slot parser
//!
//! Decomposition order is fixed:
//! 1. ARTICULATOR, only when a recognised PREFIX follows it
//! 2. PREFIX, longest match, unless the remainder is gallows-initial
//! 3. SUFFIX, longest match against what is left after the prefix
//! 4. MIDDLE is whatever remains and must be non-empty
//!
//! Parsing is a pure function of the word and the candidate sets.

use super::candidates::CandidateSet;
use crate::error::{BatchSummary, MalformedReason, MalformedToken};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Batches smaller than this are parsed sequentially
const PARALLEL_THRESHOLD: usize = 1000;

/// Result of decomposing one word into morphological slots
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MorphAnalysis {
    pub articulator: Option<String>,
    pub prefix: Option<String>,
    /// Never empty
    pub middle: String,
    pub suffix: Option<String>,
}

impl MorphAnalysis {
    /// Concatenate the slots back into a word
    pub fn reconstruct(&self) -> String {
        let mut word = String::with_capacity(
            self.articulator.as_deref().map_or(0, str::len)
                + self.prefix.as_deref().map_or(0, str::len)
                + self.middle.len()
                + self.suffix.as_deref().map_or(0, str::len),
        );
        for part in [&self.articulator, &self.prefix] {
            if let Some(p) = part {
                word.push_str(p);
            }
        }
        word.push_str(&self.middle);
        if let Some(s) = &self.suffix {
            word.push_str(s);
        }
        word
    }

    /// Length of the MIDDLE in characters
    pub fn middle_len(&self) -> usize {
        self.middle.chars().count()
    }
}

/// Candidate lists used to build a [`MorphologyParser`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphologyConfig {
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
    /// Leading sequences stripped only when a prefix follows
    pub articulators: Vec<String>,
    /// Leading digraphs that make a token prefixless by rule
    pub gallows_initial: Vec<String>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for MorphologyConfig {
    fn default() -> Self {
        Self {
            prefixes: owned(&["qo", "ch", "sh", "ok", "ot", "ol", "ct", "so"]),
            suffixes: owned(&[
                "aiin", "ain", "iin", "eedy", "edy", "dy", "ey", "y", "ar", "or", "al", "am",
            ]),
            articulators: owned(&["y", "l"]),
            gallows_initial: owned(&["ck", "ct", "cp", "cf"]),
        }
    }
}

/// Longest-match slot parser
#[derive(Debug, Clone)]
pub struct MorphologyParser {
    prefixes: CandidateSet,
    suffixes: CandidateSet,
    articulators: CandidateSet,
    gallows_initial: CandidateSet,
}

impl Default for MorphologyParser {
    fn default() -> Self {
        Self::from_config(&MorphologyConfig::default())
    }
}

impl MorphologyParser {
    /// Create a parser with the given prefix and suffix candidates and the
    /// default articulator and gallows-initial sets
    pub fn new(prefixes: CandidateSet, suffixes: CandidateSet) -> Self {
        let defaults = MorphologyConfig::default();
        Self {
            prefixes,
            suffixes,
            articulators: CandidateSet::from_list(&defaults.articulators),
            gallows_initial: CandidateSet::from_list(&defaults.gallows_initial),
        }
    }

    pub fn from_config(config: &MorphologyConfig) -> Self {
        Self {
            prefixes: CandidateSet::from_list(&config.prefixes),
            suffixes: CandidateSet::from_list(&config.suffixes),
            articulators: CandidateSet::from_list(&config.articulators),
            gallows_initial: CandidateSet::from_list(&config.gallows_initial),
        }
    }

    /// Replace the articulator set
    pub fn with_articulators(mut self, articulators: CandidateSet) -> Self {
        self.articulators = articulators;
        self
    }

    /// Replace the gallows-initial digraph set
    pub fn with_gallows_initial(mut self, gallows: CandidateSet) -> Self {
        self.gallows_initial = gallows;
        self
    }

    pub fn prefixes(&self) -> &CandidateSet {
        &self.prefixes
    }

    pub fn suffixes(&self) -> &CandidateSet {
        &self.suffixes
    }

    /// Whether `text` begins with a gallows digraph
    pub fn is_gallows_initial(&self, text: &str) -> bool {
        self.gallows_initial.longest_prefix_of(text).is_some()
    }

    /// The prefix stripped from `text`, honouring the gallows override
    fn match_prefix<'a>(&'a self, text: &str) -> Option<&'a str> {
        if self.is_gallows_initial(text) {
            return None;
        }
        self.prefixes.longest_prefix_of(text)
    }

    /// Decompose a word into slots
    pub fn parse(&self, word: &str) -> Result<MorphAnalysis, MalformedToken> {
        if word.is_empty() {
            return Err(MalformedToken::new(word, MalformedReason::Empty));
        }

        let mut rest = word;

        let articulator = self
            .articulators
            .prefixes_of(rest)
            .find(|art| self.match_prefix(&rest[art.len()..]).is_some());
        if let Some(art) = articulator {
            rest = &rest[art.len()..];
        }

        let prefix = self.match_prefix(rest);
        if let Some(p) = prefix {
            rest = &rest[p.len()..];
        }

        let suffix = self.suffixes.longest_suffix_of(rest);
        if let Some(s) = suffix {
            rest = &rest[..rest.len() - s.len()];
        }

        if rest.is_empty() {
            return Err(MalformedToken::new(word, MalformedReason::EmptyMiddle));
        }

        Ok(MorphAnalysis {
            articulator: articulator.map(str::to_string),
            prefix: prefix.map(str::to_string),
            middle: rest.to_string(),
            suffix: suffix.map(str::to_string),
        })
    }

    /// Parse many words, keeping every per-word result
    ///
    /// Large batches are split across the rayon pool; result order always
    /// matches input order.
    pub fn parse_batch<S: AsRef<str> + Sync>(&self, words: &[S]) -> BatchParse {
        let analyses: Vec<Result<MorphAnalysis, MalformedToken>> =
            if words.len() < PARALLEL_THRESHOLD {
                words.iter().map(|w| self.parse(w.as_ref())).collect()
            } else {
                words.par_iter().map(|w| self.parse(w.as_ref())).collect()
            };

        let mut summary = BatchSummary::new();
        for result in &analyses {
            summary.record(result);
        }
        if summary.has_failures() {
            tracing::warn!(
                failed = summary.failed,
                total = summary.total,
                "malformed tokens in batch parse"
            );
        }

        BatchParse { analyses, summary }
    }
}

/// Per-word results of [`MorphologyParser::parse_batch`]
#[derive(Debug, Clone)]
pub struct BatchParse {
    pub analyses: Vec<Result<MorphAnalysis, MalformedToken>>,
    pub summary: BatchSummary,
}

impl BatchParse {
    /// Successful analyses in input order
    pub fn successes(&self) -> impl Iterator<Item = &MorphAnalysis> {
        self.analyses.iter().filter_map(|r| r.as_ref().ok())
    }

    /// Failures in input order
    pub fn failures(&self) -> impl Iterator<Item = &MalformedToken> {
        self.analyses.iter().filter_map(|r| r.as_ref().err())
    }
}

/// Parse a single word against explicit prefix and suffix candidates
pub fn parse(
    word: &str,
    prefix_candidates: &CandidateSet,
    suffix_candidates: &CandidateSet,
) -> Result<MorphAnalysis, MalformedToken> {
    MorphologyParser::new(prefix_candidates.clone(), suffix_candidates.clone()).parse(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_sets() -> (CandidateSet, CandidateSet) {
        (
            CandidateSet::from_list(&["ch", "qo", "sh"]),
            CandidateSet::from_list(&["aiin", "y", "dy"]),
        )
    }

    #[test]
    fn test_chodaiin_decomposes() {
        let (prefixes, suffixes) = small_sets();
        let m = parse("chodaiin", &prefixes, &suffixes).unwrap();
        assert_eq!(m.prefix.as_deref(), Some("ch"));
        assert_eq!(m.middle, "od");
        assert_eq!(m.suffix.as_deref(), Some("aiin"));
        assert_eq!(m.articulator, None);
    }

    #[test]
    fn test_no_affixes_is_all_middle() {
        let (prefixes, suffixes) = small_sets();
        let m = parse("okal", &prefixes, &suffixes).unwrap();
        assert_eq!(m.prefix, None);
        assert_eq!(m.suffix, None);
        assert_eq!(m.middle, "okal");
    }

    #[test]
    fn test_empty_middle_is_malformed() {
        let (prefixes, suffixes) = small_sets();
        let err = parse("chy", &prefixes, &suffixes).unwrap_err();
        assert_eq!(err.reason, MalformedReason::EmptyMiddle);
        assert_eq!(err.word, "chy");
    }

    #[test]
    fn test_empty_word_is_malformed() {
        let (prefixes, suffixes) = small_sets();
        let err = parse("", &prefixes, &suffixes).unwrap_err();
        assert_eq!(err.reason, MalformedReason::Empty);
    }

    #[test]
    fn test_gallows_initial_is_prefixless() {
        // "ct" is a prefix candidate but "cth..." is prefixless by rule
        let parser = MorphologyParser::new(
            CandidateSet::from_list(&["ct", "ch"]),
            CandidateSet::from_list(&["y"]),
        );
        let m = parser.parse("cthey").unwrap();
        assert_eq!(m.prefix, None);
        assert_eq!(m.middle, "cthe");
        assert_eq!(m.suffix.as_deref(), Some("y"));
    }

    #[test]
    fn test_articulator_requires_following_prefix() {
        let parser = MorphologyParser::new(
            CandidateSet::from_list(&["ch"]),
            CandidateSet::from_list(&["dy"]),
        );

        let m = parser.parse("ychedy").unwrap();
        assert_eq!(m.articulator.as_deref(), Some("y"));
        assert_eq!(m.prefix.as_deref(), Some("ch"));
        assert_eq!(m.middle, "e");

        // No prefix after "y": it stays in the MIDDLE
        let m = parser.parse("ykedy").unwrap();
        assert_eq!(m.articulator, None);
        assert_eq!(m.middle, "yke");
    }

    #[test]
    fn test_articulator_before_gallows_is_kept() {
        let parser = MorphologyParser::new(
            CandidateSet::from_list(&["ck", "ch"]),
            CandidateSet::from_list(&["y"]),
        );
        let m = parser.parse("yckhy").unwrap();
        assert_eq!(m.articulator, None);
        assert_eq!(m.prefix, None);
        assert_eq!(m.middle, "yckh");
    }

    #[test]
    fn test_reconstruct_matches_word() {
        let parser = MorphologyParser::default();
        for word in ["chodaiin", "qokeedy", "daiin", "shol", "cthol", "qokal"] {
            let m = parser.parse(word).unwrap();
            assert_eq!(m.reconstruct(), word);
            assert!(!m.middle.is_empty());
        }
    }

    #[test]
    fn test_default_parser_examples() {
        let parser = MorphologyParser::default();

        let m = parser.parse("qokeedy").unwrap();
        assert_eq!(m.prefix.as_deref(), Some("qo"));
        assert_eq!(m.suffix.as_deref(), Some("eedy"));
        assert_eq!(m.middle, "k");

        let m = parser.parse("daiin").unwrap();
        assert_eq!(m.prefix, None);
        assert_eq!(m.suffix.as_deref(), Some("aiin"));
        assert_eq!(m.middle, "d");

        let m = parser.parse("shol").unwrap();
        assert_eq!(m.prefix.as_deref(), Some("sh"));
        assert_eq!(m.middle, "ol");
    }

    #[test]
    fn test_batch_parse_collects_failures() {
        let (prefixes, suffixes) = small_sets();
        let parser = MorphologyParser::new(prefixes, suffixes);
        let batch = parser.parse_batch(&["chodaiin", "chy", "okal", ""]);

        assert_eq!(batch.analyses.len(), 4);
        assert_eq!(batch.summary.total, 4);
        assert_eq!(batch.summary.failed, 2);
        assert_eq!(batch.successes().count(), 2);
        assert_eq!(batch.failures().next().unwrap().word, "chy");
    }

    #[test]
    fn test_large_batch_keeps_order() {
        let parser = MorphologyParser::default();
        let words: Vec<String> = (0..2500)
            .map(|i| if i % 2 == 0 { "chodaiin".to_string() } else { "shol".to_string() })
            .collect();
        let batch = parser.parse_batch(&words);

        assert_eq!(batch.summary.failed, 0);
        for (word, result) in words.iter().zip(&batch.analyses) {
            assert_eq!(&result.as_ref().unwrap().reconstruct(), word);
        }
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let json = r#"{ "prefixes": ["qo"], "suffixes": ["y"] }"#;
        let config: MorphologyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.prefixes, vec!["qo"]);
        assert_eq!(config.articulators, MorphologyConfig::default().articulators);

        let parser = MorphologyParser::from_config(&config);
        let m = parser.parse("qoky").unwrap();
        assert_eq!(m.middle, "k");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn slots_partition_the_word(word in "[acdehiklnopqrsty]{0,12}") {
            let parser = MorphologyParser::default();
            match parser.parse(&word) {
                Ok(m) => {
                    prop_assert!(!m.middle.is_empty());
                    prop_assert_eq!(m.reconstruct(), word);
                }
                Err(e) => prop_assert_eq!(e.word, word),
            }
        }
    }
}
