//! Results produced by a [`crate::Pipeline`] run.

use crate::{
    aggregation::Heuristic,
    clusters::{Partition, SizeSummary},
    error::ScoringError,
    evaluation::PairwiseScores,
};

/// Everything measured at one coarsening level.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelReport {
    /// Zero-based coarsening level.
    pub level: usize,
    /// Vertices in the graph clustered at this level.
    pub vertices: usize,
    /// Edges in the graph clustered at this level.
    pub edges: usize,
    /// Recorded merges.
    pub merges: usize,
    /// Partition projected back onto the original vertex ids.
    pub partition: Partition,
    /// Cluster-size summary of [`Self::partition`].
    pub sizes: SizeSummary,
    /// Modularity of [`Self::partition`] over the original edge list.
    pub modularity: f64,
    /// Agreement with ground truth, when ground truth was supplied.
    ///
    /// A scoring mismatch is kept here rather than aborting the run.
    pub pairwise: Option<Result<PairwiseScores, ScoringError>>,
}

impl LevelReport {
    /// Number of clusters at this level.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.partition.cluster_count()
    }

    /// Pairwise scores when they could be computed.
    #[must_use]
    pub fn scores(&self) -> Option<&PairwiseScores> {
        self.pairwise.as_ref().and_then(|scores| scores.as_ref().ok())
    }
}

/// Report for a complete multi-level run.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineReport {
    /// Heuristic used at every level.
    pub heuristic: Heuristic,
    /// Seed the run drew its randomness from.
    pub seed: u64,
    /// Average local clustering coefficient of the input graph.
    pub clustering_coefficient: f64,
    /// Ground-truth vertices left out of pairwise scoring.
    pub excluded: usize,
    /// One entry per clustered level, in order.
    pub levels: Vec<LevelReport>,
}

impl PipelineReport {
    /// Report for the last level that was clustered.
    #[must_use]
    pub fn final_level(&self) -> Option<&LevelReport> {
        self.levels.last()
    }
}
