//! Record segmentation
//!
//! Splits a folio's token sequence into delimiter-bounded records and tags
//! each record with its block position inside its entry. [`ParsedRecords`]
//! pairs the records with one morphological parse per token.

pub mod parsed;
pub mod records;

pub use parsed::{ParsedRecords, TokenParse};
pub use records::{
    boundary_words, segment, segment_folios, BlockIndex, EntryScope, PositionInBlock,
    PositionedToken, Record, RecordSegmenter,
};
