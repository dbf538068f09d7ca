//! Compatibility graph construction and analytics
//!
//! Nodes are MIDDLE types, edges are pairs a legality rule judges able to
//! co-occur. The graph is assembled in a mutable [`builder::GraphBuilder`] and
//! frozen into an immutable CSR [`csr::CompatibilityGraph`]; all analytics run
//! on the frozen form through `u32` node handles.

pub mod analytics;
pub mod builder;
pub mod coverage;
pub mod csr;
pub mod legality;

pub use analytics::{Components, FolioDensity, HubEntry};
pub use builder::{GraphBuildReport, GraphBuilder};
pub use coverage::{compare_coverage, CoverageComparison};
pub use csr::CompatibilityGraph;
pub use legality::{
    LegalityConfig, LegalityRule, MinCooccurrence, ObservedOverExpected, PairContext,
};
