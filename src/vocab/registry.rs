//! Vocabulary registry
//!
//! Built in two phases: an accumulation pass that counts every MIDDLE and the
//! folios it appears on, then a single classification pass over the finished
//! counts. Bands are never assigned from partial counts.
//!
//! A registry is an immutable snapshot of one corpus subset. Building for a
//! different subset means building a new registry.

use crate::error::BatchSummary;
use crate::morphology::{MorphAnalysis, MorphologyParser};
use crate::segment::{ParsedRecords, Record, TokenParse};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Record counts below this are accumulated sequentially
const PARALLEL_THRESHOLD: usize = 256;

/// Classification band of a MIDDLE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// Seen on exactly one folio
    FolioUnique,
    /// Spread across at least `core_min_folios` folios
    Core,
    Common,
    Rare,
}

impl Band {
    pub const ALL: [Band; 4] = [Band::FolioUnique, Band::Core, Band::Common, Band::Rare];
}

/// Thresholds for band assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Inclusive folio-spread threshold for `Core`
    pub core_min_folios: usize,
    /// Inclusive frequency threshold separating `Common` from `Rare`
    pub common_min_frequency: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            core_min_folios: 20,
            common_min_frequency: 5,
        }
    }
}

impl RegistryConfig {
    pub fn with_core_min_folios(mut self, folios: usize) -> Self {
        self.core_min_folios = folios;
        self
    }

    pub fn with_common_min_frequency(mut self, frequency: usize) -> Self {
        self.common_min_frequency = frequency;
        self
    }

    /// Band for a MIDDLE with the given counts; first match wins in the order
    /// folio-unique, core, common, rare
    pub fn band_for(&self, frequency: usize, folio_spread: usize) -> Band {
        if folio_spread == 1 {
            Band::FolioUnique
        } else if folio_spread >= self.core_min_folios {
            Band::Core
        } else if frequency >= self.common_min_frequency {
            Band::Common
        } else {
            Band::Rare
        }
    }
}

/// Caller-supplied role sets of MIDDLEs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleSets {
    /// Registry-internal MIDDLEs
    pub ri: FxHashSet<String>,
    /// Pipeline-participant MIDDLEs
    pub pp: FxHashSet<String>,
}

impl RoleSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lists(ri: &[&str], pp: &[&str]) -> Self {
        Self {
            ri: ri.iter().map(|m| m.to_string()).collect(),
            pp: pp.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn is_ri(&self, middle: &str) -> bool {
        self.ri.contains(middle)
    }

    pub fn is_pp(&self, middle: &str) -> bool {
        self.pp.contains(middle)
    }
}

/// Mutable counts for one corpus subset (or one worker's share of it)
#[derive(Debug, Clone, Default)]
pub struct RegistryAccumulator {
    frequency: FxHashMap<String, usize>,
    folio_spread: FxHashMap<String, FxHashSet<String>>,
}

impl RegistryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one analysed token seen on `folio`
    pub fn add_analysis(&mut self, analysis: &MorphAnalysis, folio: &str) {
        *self.frequency.entry(analysis.middle.clone()).or_insert(0) += 1;
        let folios = self.folio_spread.entry(analysis.middle.clone()).or_default();
        if !folios.contains(folio) {
            folios.insert(folio.to_string());
        }
    }

    /// Count the well-formed tokens of a parsed record; malformed ones are
    /// skipped
    pub fn add_record(&mut self, record: &Record, analyses: &[TokenParse]) {
        for (positioned, result) in record.tokens.iter().zip(analyses) {
            if let Ok(analysis) = result {
                self.add_analysis(analysis, &positioned.token.folio);
            }
        }
    }

    /// Combine two partial accumulators: frequencies are summed and folio
    /// sets unioned, so the result does not depend on merge order
    pub fn merge(mut self, other: RegistryAccumulator) -> Self {
        for (middle, count) in other.frequency {
            *self.frequency.entry(middle).or_insert(0) += count;
        }
        for (middle, folios) in other.folio_spread {
            self.folio_spread.entry(middle).or_default().extend(folios);
        }
        self
    }

    /// Number of distinct MIDDLEs seen so far
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// Assign bands and freeze into a registry
    pub fn finish(self, config: RegistryConfig, roles: RoleSets) -> VocabularyRegistry {
        let bands = self
            .frequency
            .iter()
            .map(|(middle, &count)| {
                let spread = self.folio_spread.get(middle).map_or(0, |f| f.len());
                (middle.clone(), config.band_for(count, spread))
            })
            .collect();

        VocabularyRegistry {
            frequency: self.frequency,
            folio_spread: self.folio_spread,
            bands,
            config,
            roles,
            parse_summary: BatchSummary::new(),
        }
    }
}

/// Count of MIDDLEs per band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandCounts {
    pub folio_unique: usize,
    pub core: usize,
    pub common: usize,
    pub rare: usize,
}

impl BandCounts {
    fn add(&mut self, band: Band) {
        match band {
            Band::FolioUnique => self.folio_unique += 1,
            Band::Core => self.core += 1,
            Band::Common => self.common += 1,
            Band::Rare => self.rare += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.folio_unique + self.core + self.common + self.rare
    }
}

/// One row of a [`RegistrySnapshot`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub middle: String,
    pub frequency: usize,
    pub folio_spread: usize,
    pub band: Band,
}

/// Serializable, sorted view of a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub config: RegistryConfig,
    pub entries: Vec<RegistryEntry>,
    pub band_counts: BandCounts,
    pub parse_summary: BatchSummary,
}

/// Frequency, spread and band tables for one corpus subset
#[derive(Debug, Clone)]
pub struct VocabularyRegistry {
    frequency: FxHashMap<String, usize>,
    folio_spread: FxHashMap<String, FxHashSet<String>>,
    bands: FxHashMap<String, Band>,
    config: RegistryConfig,
    roles: RoleSets,
    parse_summary: BatchSummary,
}

impl Default for VocabularyRegistry {
    fn default() -> Self {
        RegistryAccumulator::new().finish(RegistryConfig::default(), RoleSets::default())
    }
}

impl VocabularyRegistry {
    /// Parse and build from records in a single sequential pass
    ///
    /// An empty record list yields a valid, empty registry.
    pub fn build(
        records: &[Record],
        parser: &MorphologyParser,
        config: RegistryConfig,
        roles: RoleSets,
    ) -> Self {
        Self::from_parsed(&ParsedRecords::parse(records, parser), config, roles)
    }

    /// Parse and build with per-worker partial accumulators
    pub fn build_parallel(
        records: &[Record],
        parser: &MorphologyParser,
        config: RegistryConfig,
        roles: RoleSets,
    ) -> Self {
        Self::from_parsed_parallel(&ParsedRecords::parse(records, parser), config, roles)
    }

    /// Build from already parsed records in a single sequential pass
    pub fn from_parsed(
        parsed: &ParsedRecords<'_>,
        config: RegistryConfig,
        roles: RoleSets,
    ) -> Self {
        let mut acc = RegistryAccumulator::new();
        for (record, analyses) in parsed.iter() {
            acc.add_record(record, analyses);
        }
        Self::log_finish(acc, parsed.summary(), config, roles)
    }

    /// Build from already parsed records with per-worker partial
    /// accumulators merged before classification
    pub fn from_parsed_parallel(
        parsed: &ParsedRecords<'_>,
        config: RegistryConfig,
        roles: RoleSets,
    ) -> Self {
        if parsed.len() < PARALLEL_THRESHOLD {
            return Self::from_parsed(parsed, config, roles);
        }

        let acc = parsed
            .par_iter()
            .fold(RegistryAccumulator::new, |mut acc, (record, analyses)| {
                acc.add_record(record, analyses);
                acc
            })
            .reduce(RegistryAccumulator::new, RegistryAccumulator::merge);
        Self::log_finish(acc, parsed.summary(), config, roles)
    }

    fn log_finish(
        acc: RegistryAccumulator,
        summary: &BatchSummary,
        config: RegistryConfig,
        roles: RoleSets,
    ) -> Self {
        let mut registry = acc.finish(config, roles);
        registry.parse_summary = summary.clone();
        tracing::debug!(
            middles = registry.len(),
            core = registry.band_counts().core,
            "vocabulary registry built"
        );
        registry
    }

    /// Replace the role sets, producing a new registry
    pub fn with_roles(mut self, roles: RoleSets) -> Self {
        self.roles = roles;
        self
    }

    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    pub fn contains(&self, middle: &str) -> bool {
        self.frequency.contains_key(middle)
    }

    /// Token count of a MIDDLE (0 when unseen)
    pub fn frequency(&self, middle: &str) -> usize {
        self.frequency.get(middle).copied().unwrap_or(0)
    }

    /// Number of distinct folios a MIDDLE appears on (0 when unseen)
    pub fn folio_spread(&self, middle: &str) -> usize {
        self.folio_spread.get(middle).map_or(0, |f| f.len())
    }

    /// Folios a MIDDLE appears on, sorted
    pub fn folios_of(&self, middle: &str) -> Vec<&str> {
        let mut folios: Vec<&str> = self
            .folio_spread
            .get(middle)
            .map(|f| f.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default();
        folios.sort_unstable();
        folios
    }

    pub fn band(&self, middle: &str) -> Option<Band> {
        self.bands.get(middle).copied()
    }

    /// All observed MIDDLEs, sorted
    pub fn middles(&self) -> Vec<&str> {
        let mut middles: Vec<&str> = self.frequency.keys().map(|m| m.as_str()).collect();
        middles.sort_unstable();
        middles
    }

    /// MIDDLEs in a band, sorted
    pub fn middles_in(&self, band: Band) -> Vec<&str> {
        let mut middles: Vec<&str> = self
            .bands
            .iter()
            .filter(|(_, &b)| b == band)
            .map(|(m, _)| m.as_str())
            .collect();
        middles.sort_unstable();
        middles
    }

    /// The core MIDDLE set
    pub fn core_set(&self) -> FxHashSet<String> {
        self.bands
            .iter()
            .filter(|(_, &b)| b == Band::Core)
            .map(|(m, _)| m.clone())
            .collect()
    }

    pub fn band_counts(&self) -> BandCounts {
        let mut counts = BandCounts::default();
        for &band in self.bands.values() {
            counts.add(band);
        }
        counts
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn roles(&self) -> &RoleSets {
        &self.roles
    }

    /// Parse outcomes of the tokens the registry was built from
    pub fn parse_summary(&self) -> &BatchSummary {
        &self.parse_summary
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let entries = self
            .middles()
            .into_iter()
            .map(|m| RegistryEntry {
                middle: m.to_string(),
                frequency: self.frequency(m),
                folio_spread: self.folio_spread(m),
                band: self.bands.get(m).copied().unwrap_or(Band::Rare),
            })
            .collect();
        RegistrySnapshot {
            config: self.config,
            entries,
            band_counts: self.band_counts(),
            parse_summary: self.parse_summary.clone(),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::morphology::CandidateSet;
    use crate::segment::segment;
    use crate::types::{Language, Token};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn bands_partition_observed_middles(
            tokens in prop::collection::vec(("[a-e]{1,3}", 0usize..30), 0..200),
            core in 1usize..10,
            common in 1usize..10,
        ) {
            let tokens: Vec<Token> = tokens
                .into_iter()
                .map(|(w, f)| Token::paragraph(w, format!("f{f}"), "1", Language::B))
                .collect();
            let records = segment(&tokens, |_| false);
            let parser = MorphologyParser::new(CandidateSet::empty(), CandidateSet::empty());
            let config = RegistryConfig::default()
                .with_core_min_folios(core)
                .with_common_min_frequency(common);
            let registry = VocabularyRegistry::build(&records, &parser, config, RoleSets::default());

            let mut seen = 0;
            for band in Band::ALL {
                seen += registry.middles_in(band).len();
            }
            prop_assert_eq!(seen, registry.len());
            prop_assert_eq!(registry.band_counts().total(), registry.len());
            for middle in registry.middles() {
                prop_assert!(registry.band(middle).is_some());
            }
        }
    }
}
