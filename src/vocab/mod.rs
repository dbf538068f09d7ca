//! Vocabulary registry and the consumers built on it
//!
//! - [`registry`]: frequency and folio-spread tables with classification bands
//! - [`classifier`]: RI / PP / INFRA / UNKNOWN token classes
//! - [`compound`]: detection of MIDDLEs built from shorter core MIDDLEs

pub mod classifier;
pub mod compound;
pub mod registry;

pub use classifier::{
    classify, ClassCounts, ClassificationBatch, ClassifiedToken, InfraPattern, TokenClass,
    TokenClassifier,
};
pub use compound::{get_contained_atoms, is_compound, AtomMatch, CompoundDetector, CompoundProfile};
pub use registry::{
    Band, BandCounts, RegistryAccumulator, RegistryConfig, RegistryEntry, RegistrySnapshot,
    RoleSets, VocabularyRegistry,
};
