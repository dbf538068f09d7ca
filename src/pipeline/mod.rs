//! End-to-end analysis pipeline
//!
//! - [`runner`]: the [`Analysis`] runner wiring every stage
//! - [`report`]: serializable [`AnalysisReport`]
//! - [`artifacts`]: owned intermediate results kept alongside the report
//! - [`observer`]: stage boundary hooks and timings

pub mod artifacts;
pub mod observer;
pub mod report;
pub mod runner;

pub use artifacts::AnalysisArtifacts;
pub use observer::{AnalysisObserver, NoopObserver, StageReport, StageTimings};
pub use report::{AnalysisReport, GraphSummary};
pub use runner::Analysis;
