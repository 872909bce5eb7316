//! Benchmark parameter types, rendered as Criterion parameter labels.

use std::fmt;

use agglom_core::Heuristic;

/// One aggregation benchmark point.
#[derive(Clone, Debug)]
pub struct AggregationBenchParams {
    /// Vertices in the generated graph.
    pub vertex_count: usize,
    /// Heuristic under test.
    pub heuristic: Heuristic,
}

impl fmt::Display for AggregationBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},h={}", self.vertex_count, self.heuristic.label())
    }
}

/// One scoring or multi-level benchmark point.
#[derive(Clone, Debug)]
pub struct GraphBenchParams {
    /// Vertices in the generated graph.
    pub vertex_count: usize,
    /// Coarsening levels, or 1 for single-pass work.
    pub levels: usize,
}

impl fmt::Display for GraphBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},levels={}", self.vertex_count, self.levels)
    }
}
