//! Analysis observer: hooks for timing and debugging.
//!
//! Observers receive notifications at stage boundaries without coupling to
//! stage logic. [`NoopObserver`] costs nothing; [`StageTimings`] records how
//! long each stage took and how many items it produced.

use serde::Serialize;
use std::time::{Duration, Instant};

pub const STAGE_SEGMENT: &str = "segment";
pub const STAGE_PARSE: &str = "parse";
pub const STAGE_REGISTRY: &str = "registry";
pub const STAGE_CLASSIFY: &str = "classify";
pub const STAGE_COMPOUND: &str = "compound";
pub const STAGE_GRAPH: &str = "graph";
pub const STAGE_ANALYTICS: &str = "analytics";
pub const STAGE_COVERAGE: &str = "coverage";

/// Stage names in execution order
pub const STAGES: [&str; 8] = [
    STAGE_SEGMENT,
    STAGE_PARSE,
    STAGE_REGISTRY,
    STAGE_CLASSIFY,
    STAGE_COMPOUND,
    STAGE_GRAPH,
    STAGE_ANALYTICS,
    STAGE_COVERAGE,
];

/// Wall-clock timer for one stage
#[derive(Debug, Clone, Copy)]
pub struct StageClock(Instant);

impl StageClock {
    pub fn start() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

/// What a stage reports when it finishes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageReport {
    pub elapsed_ms: f64,
    /// Records, MIDDLEs, tokens or nodes, depending on the stage
    pub items: usize,
}

impl StageReport {
    pub fn new(elapsed: Duration, items: usize) -> Self {
        Self {
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            items,
        }
    }
}

/// Callbacks at stage boundaries
pub trait AnalysisObserver {
    fn on_stage_start(&mut self, _stage: &'static str) {}

    fn on_stage_end(&mut self, _stage: &'static str, _report: &StageReport) {}
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AnalysisObserver for NoopObserver {}

/// Observer that keeps every stage report in order
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageTimings {
    pub stages: Vec<(&'static str, StageReport)>,
}

impl StageTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stage: &str) -> Option<&StageReport> {
        self.stages
            .iter()
            .find(|(name, _)| *name == stage)
            .map(|(_, report)| report)
    }

    pub fn total_ms(&self) -> f64 {
        self.stages.iter().map(|(_, r)| r.elapsed_ms).sum()
    }
}

impl AnalysisObserver for StageTimings {
    fn on_stage_end(&mut self, stage: &'static str, report: &StageReport) {
        self.stages.push((stage, *report));
    }
}
