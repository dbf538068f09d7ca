//! Morphological slot decomposition
//!
//! Every token is split into an optional ARTICULATOR, optional PREFIX, a
//! mandatory MIDDLE and an optional SUFFIX. Prefixes and suffixes are matched
//! longest-first against caller-supplied candidate sets.

pub mod candidates;
pub mod parser;

pub use candidates::CandidateSet;
pub use parser::{parse, BatchParse, MorphAnalysis, MorphologyConfig, MorphologyParser};
