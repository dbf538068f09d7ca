//! Delimiter-bounded records
//!
//! A boundary token closes the current block and is masked: it never appears
//! in any record body. Blocks that end up empty (two adjacent delimiters, a
//! delimiter at the start of an entry) are dropped before block positions are
//! assigned, so `FIRST`/`LAST` always refer to real content.

use crate::error::MalformedToken;
use crate::morphology::{MorphAnalysis, MorphologyParser};
use crate::types::Token;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Position of a record among the blocks of its entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockIndex {
    First,
    Middle,
    Last,
    Only,
}

impl BlockIndex {
    fn for_block(index: usize, count: usize) -> Self {
        match (index, count) {
            (_, 1) => BlockIndex::Only,
            (0, _) => BlockIndex::First,
            (i, n) if i + 1 == n => BlockIndex::Last,
            _ => BlockIndex::Middle,
        }
    }
}

/// Position of a token inside its record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionInBlock {
    Initial,
    Internal,
    Final,
    Only,
}

impl PositionInBlock {
    fn for_token(index: usize, len: usize) -> Self {
        match (index, len) {
            (_, 1) => PositionInBlock::Only,
            (0, _) => PositionInBlock::Initial,
            (i, n) if i + 1 == n => PositionInBlock::Final,
            _ => PositionInBlock::Internal,
        }
    }
}

/// A token together with its position in the record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionedToken {
    pub token: Token,
    pub position: PositionInBlock,
}

/// A non-empty, delimiter-bounded run of tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub folio: String,
    /// Line of the first token in the record
    pub line: String,
    /// Ordinal of the entry within the segmented sequence
    pub entry: usize,
    /// Ordinal of this block within its entry
    pub block: usize,
    pub block_index: BlockIndex,
    pub tokens: Vec<PositionedToken>,
}

impl Record {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Words in record order
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|t| t.token.word.as_str())
    }

    /// Parse every token of the record
    pub fn analyses<'a>(
        &'a self,
        parser: &'a MorphologyParser,
    ) -> impl Iterator<Item = Result<MorphAnalysis, MalformedToken>> + 'a {
        self.words().map(move |w| parser.parse(w))
    }
}

/// Which tokens belong to the same entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryScope {
    /// Consecutive tokens sharing folio and line
    #[default]
    Line,
    /// Consecutive tokens sharing a folio
    Folio,
}

/// Groups a token sequence into records
#[derive(Debug, Clone, Default)]
pub struct RecordSegmenter {
    scope: EntryScope,
}

impl RecordSegmenter {
    /// Create a segmenter with line-scoped entries
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry scope
    pub fn with_scope(mut self, scope: EntryScope) -> Self {
        self.scope = scope;
        self
    }

    fn same_entry(&self, a: &Token, b: &Token) -> bool {
        match self.scope {
            EntryScope::Line => a.same_line(b),
            EntryScope::Folio => a.folio == b.folio,
        }
    }

    /// Segment `tokens` into records, masking every token for which
    /// `boundary_class` returns true
    pub fn segment<F>(&self, tokens: &[Token], boundary_class: F) -> Vec<Record>
    where
        F: Fn(&Token) -> bool,
    {
        let mut state = SegmentState::default();
        let mut previous: Option<&Token> = None;

        for token in tokens {
            if let Some(prev) = previous {
                if !self.same_entry(prev, token) {
                    state.close_entry();
                }
            }
            previous = Some(token);

            if boundary_class(token) {
                state.close_block();
            } else {
                state.block.push(token.clone());
            }
        }
        state.close_entry();

        state.records
    }

    /// Segment several folio sequences; entry ordinals continue across folios
    pub fn segment_folios<F>(&self, folios: &[Vec<Token>], boundary_class: F) -> Vec<Record>
    where
        F: Fn(&Token) -> bool,
    {
        let mut records: Vec<Record> = Vec::new();
        for folio in folios {
            let offset = records.last().map(|r| r.entry + 1).unwrap_or(0);
            records.extend(self.segment(folio, &boundary_class).into_iter().map(|mut r| {
                r.entry += offset;
                r
            }));
        }
        records
    }
}

#[derive(Default)]
struct SegmentState {
    block: Vec<Token>,
    entry_blocks: Vec<Vec<Token>>,
    next_entry: usize,
    records: Vec<Record>,
}

impl SegmentState {
    fn close_block(&mut self) {
        if !self.block.is_empty() {
            self.entry_blocks.push(std::mem::take(&mut self.block));
        }
    }

    fn close_entry(&mut self) {
        self.close_block();
        if self.entry_blocks.is_empty() {
            return;
        }

        let blocks = std::mem::take(&mut self.entry_blocks);
        let count = blocks.len();
        for (i, block) in blocks.into_iter().enumerate() {
            let len = block.len();
            let folio = block[0].folio.clone();
            let line = block[0].line.clone();
            let tokens = block
                .into_iter()
                .enumerate()
                .map(|(j, token)| PositionedToken {
                    token,
                    position: PositionInBlock::for_token(j, len),
                })
                .collect();
            self.records.push(Record {
                folio,
                line,
                entry: self.next_entry,
                block: i,
                block_index: BlockIndex::for_block(i, count),
                tokens,
            });
        }
        self.next_entry += 1;
    }
}

/// Segment with the default line-scoped segmenter
pub fn segment<F>(tokens: &[Token], boundary_class: F) -> Vec<Record>
where
    F: Fn(&Token) -> bool,
{
    RecordSegmenter::new().segment(tokens, boundary_class)
}

/// Segment several folio sequences with the default segmenter
pub fn segment_folios<F>(folios: &[Vec<Token>], boundary_class: F) -> Vec<Record>
where
    F: Fn(&Token) -> bool,
{
    RecordSegmenter::new().segment_folios(folios, boundary_class)
}

/// Boundary predicate matching any of the given words exactly
pub fn boundary_words(words: &[&str]) -> impl Fn(&Token) -> bool {
    let set: FxHashSet<String> = words.iter().map(|w| w.to_string()).collect();
    move |token: &Token| set.contains(&token.word)
}
