//! Compound MIDDLE detection
//!
//! A MIDDLE is compound when it contains at least one strictly shorter core
//! MIDDLE as a contiguous substring. Every occurrence is reported, including
//! overlapping and repeated ones, in order of starting offset.
//!
//! The scan is a plain substring search per core atom. Core sets are small
//! (tens of entries), so no automaton is built.

use super::registry::{Band, VocabularyRegistry};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One occurrence of a core atom inside a MIDDLE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomMatch {
    pub atom: String,
    /// Byte offset of the occurrence
    pub start: usize,
}

/// Substring detector over a fixed core set
#[derive(Debug, Clone, Default)]
pub struct CompoundDetector {
    /// Sorted shortest first (in characters), then lexicographically
    atoms: Vec<String>,
}

impl CompoundDetector {
    pub fn new<I, S>(core_set: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut atoms: Vec<String> = core_set
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        atoms.sort_by_cached_key(|a| (a.chars().count(), a.clone()));
        atoms.dedup();
        Self { atoms }
    }

    /// Detector over a registry's core band
    pub fn from_registry(registry: &VocabularyRegistry) -> Self {
        Self::new(registry.middles_in(Band::Core))
    }

    pub fn atoms(&self) -> &[String] {
        &self.atoms
    }

    fn candidates<'a>(&'a self, middle: &'a str) -> impl Iterator<Item = &'a String> + 'a {
        let len = middle.chars().count();
        self.atoms
            .iter()
            .filter(move |atom| atom.chars().count() < len)
    }

    pub fn is_compound(&self, middle: &str) -> bool {
        self.candidates(middle).any(|atom| middle.contains(atom.as_str()))
    }

    /// Every occurrence of every shorter core atom
    ///
    /// Ordered by start offset; at the same offset shorter atoms (in
    /// characters) come first, then lexicographic order.
    pub fn find_atoms(&self, middle: &str) -> Vec<AtomMatch> {
        let mut matches = Vec::new();
        for atom in self.candidates(middle) {
            for (start, _) in middle.char_indices() {
                if middle[start..].starts_with(atom.as_str()) {
                    matches.push(AtomMatch {
                        atom: atom.clone(),
                        start,
                    });
                }
            }
        }
        matches.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.atom.chars().count().cmp(&b.atom.chars().count()))
                .then_with(|| a.atom.cmp(&b.atom))
        });
        matches
    }

    /// The atoms of [`find_atoms`](Self::find_atoms), without offsets
    pub fn contained_atoms(&self, middle: &str) -> Vec<String> {
        self.find_atoms(middle).into_iter().map(|m| m.atom).collect()
    }

    /// Compound statistics over the non-core MIDDLEs of a registry
    pub fn profile(&self, registry: &VocabularyRegistry) -> CompoundProfile {
        let mut profile = CompoundProfile::default();
        for middle in registry.middles() {
            if registry.band(middle) == Some(Band::Core) {
                continue;
            }
            profile.non_core_middles += 1;
            let atoms = self.find_atoms(middle);
            if atoms.is_empty() {
                continue;
            }
            profile.compound_middles += 1;
            for m in atoms {
                *profile.atom_usage.entry(m.atom).or_insert(0) += 1;
            }
        }
        profile.compound_rate = if profile.non_core_middles == 0 {
            0.0
        } else {
            profile.compound_middles as f64 / profile.non_core_middles as f64
        };
        profile
    }
}

/// How much of the non-core vocabulary is built from core atoms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompoundProfile {
    pub non_core_middles: usize,
    pub compound_middles: usize,
    /// `compound_middles / non_core_middles`, 0 when there are none
    pub compound_rate: f64,
    /// Occurrences of each atom across compound MIDDLEs
    pub atom_usage: BTreeMap<String, usize>,
}

/// Whether `middle` contains a strictly shorter member of `core_set`
pub fn is_compound(middle: &str, core_set: &FxHashSet<String>) -> bool {
    CompoundDetector::new(core_set).is_compound(middle)
}

/// All strictly shorter members of `core_set` occurring in `middle`, by offset
pub fn get_contained_atoms(middle: &str, core_set: &FxHashSet<String>) -> Vec<String> {
    CompoundDetector::new(core_set).contained_atoms(middle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::{CandidateSet, MorphologyParser};
    use crate::segment::segment;
    use crate::types::{Language, Token};
    use crate::vocab::registry::{RegistryConfig, RoleSets};

    fn core(items: &[&str]) -> FxHashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_chod_contains_ch_and_od() {
        let core = core(&["ch", "od"]);
        assert!(is_compound("chod", &core));
        assert_eq!(get_contained_atoms("chod", &core), vec!["ch", "od"]);
    }

    #[test]
    fn test_self_match_excluded() {
        let core = core(&["chod", "ch"]);
        let atoms = get_contained_atoms("chod", &core);
        assert_eq!(atoms, vec!["ch"]);
        assert!(!is_compound("ch", &core));
    }

    #[test]
    fn test_overlapping_matches_reported() {
        let core = core(&["ke", "ee", "k"]);
        let detector = CompoundDetector::new(&core);
        let matches = detector.find_atoms("keee");
        let pairs: Vec<_> = matches.iter().map(|m| (m.atom.as_str(), m.start)).collect();
        assert_eq!(
            pairs,
            vec![("k", 0), ("ke", 0), ("ee", 1), ("ee", 2)]
        );
    }

    #[test]
    fn test_atom_length_counts_characters() {
        // "xé" and "xab" are both three bytes long
        let detector = CompoundDetector::new(["xab", "xé", "é"]);
        assert_eq!(detector.atoms(), &["é", "xé", "xab"]);

        let pairs: Vec<_> = detector
            .find_atoms("xéxab")
            .into_iter()
            .map(|m| (m.atom, m.start))
            .collect();
        assert_eq!(
            pairs,
            vec![("xé".to_string(), 0), ("é".to_string(), 1), ("xab".to_string(), 3)]
        );
        // same character count as the middle, so not a strictly shorter atom
        assert!(!detector.is_compound("xab"));
        assert!(detector.is_compound("xéa"));
    }

    #[test]
    fn test_no_atoms_not_compound() {
        let core = core(&["ch", "od"]);
        assert!(!is_compound("kee", &core));
        assert!(get_contained_atoms("kee", &core).is_empty());
        assert!(!is_compound("kee", &FxHashSet::default()));
    }

    #[test]
    fn test_profile_over_registry() {
        let mut tokens = Vec::new();
        for i in 0..3 {
            for w in ["k", "ee"] {
                tokens.push(Token::paragraph(w, format!("f{i}"), "1", Language::B));
            }
        }
        tokens.push(Token::paragraph("kee", "f0", "2", Language::B));
        tokens.push(Token::paragraph("ol", "f0", "2", Language::B));
        let records = segment(&tokens, |_| false);
        let parser = MorphologyParser::new(CandidateSet::empty(), CandidateSet::empty());
        let registry = VocabularyRegistry::build(
            &records,
            &parser,
            RegistryConfig::default().with_core_min_folios(3),
            RoleSets::default(),
        );

        let detector = CompoundDetector::from_registry(&registry);
        assert_eq!(detector.atoms(), &["k".to_string(), "ee".to_string()]);

        let profile = detector.profile(&registry);
        assert_eq!(profile.non_core_middles, 2);
        assert_eq!(profile.compound_middles, 1);
        assert!((profile.compound_rate - 0.5).abs() < 1e-10);
        assert_eq!(profile.atom_usage.get("ee"), Some(&1));
        assert_eq!(profile.atom_usage.get("k"), Some(&1));
    }

    #[test]
    fn test_empty_registry_profile() {
        let profile = CompoundDetector::default().profile(&VocabularyRegistry::default());
        assert_eq!(profile.compound_rate, 0.0);
        assert_eq!(profile.non_core_middles, 0);
    }
}
