//! Multi-level clustering pipeline: aggregate, build clusters, score, coarsen.

use std::num::NonZeroUsize;

use tracing::{info, instrument, warn};

use crate::{
    Result,
    aggregation::{Heuristic, RunContext, aggregate},
    clusters::Partition,
    coarsen::{LevelMapping, coarsen},
    error::AgglomError,
    evaluation::{modularity, pairwise},
    graph::Graph,
    input::{EdgeList, GroundTruth},
    report::{LevelReport, PipelineReport},
};

/// Inputs shared by every level of one run.
struct RunInputs<'a> {
    original: &'a EdgeList,
    truth: Option<&'a GroundTruth>,
    excluded: &'a [usize],
}

/// Configured clustering pipeline.
///
/// Level 0 clusters the input graph. Each further level collapses the
/// previous partition into super-vertices and clusters again; every level's
/// partition is projected back onto the original vertex ids before scoring.
#[derive(Debug, Clone)]
pub struct Pipeline {
    heuristic: Heuristic,
    levels: NonZeroUsize,
    seed: Option<u64>,
    resolve_overlaps: bool,
}

impl Pipeline {
    pub(crate) const fn new(
        heuristic: Heuristic,
        levels: NonZeroUsize,
        seed: Option<u64>,
        resolve_overlaps: bool,
    ) -> Self {
        Self {
            heuristic,
            levels,
            seed,
            resolve_overlaps,
        }
    }

    /// Heuristic applied at every level.
    #[must_use]
    pub const fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Maximum number of levels to cluster.
    #[must_use]
    pub const fn levels(&self) -> NonZeroUsize {
        self.levels
    }

    /// Fixed seed, when one was configured.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Whether overlapping ground-truth communities are made disjoint.
    #[must_use]
    pub const fn resolve_overlaps(&self) -> bool {
        self.resolve_overlaps
    }

    /// Clusters `edges` and scores every level, optionally against `truth`.
    ///
    /// Coarsening stops early once a level leaves no edges between clusters.
    ///
    /// # Errors
    /// Returns [`AgglomError::TruthUniverseMismatch`] when `truth` was
    /// validated against another vertex count, and the wrapped layer error
    /// when graph construction, aggregation, cluster building or modularity
    /// fails. Pairwise mismatches are reported per level instead.
    ///
    /// # Examples
    /// ```
    /// use agglom_core::{EdgeList, GroundTruth, PipelineBuilder};
    ///
    /// let edges = EdgeList::new(4, vec![(0, 1), (2, 3)]).expect("valid edges");
    /// let truth = GroundTruth::new(4, vec![vec![0, 1], vec![2, 3]]).expect("valid truth");
    /// let report = PipelineBuilder::new()
    ///     .with_seed(3)
    ///     .build()
    ///     .expect("valid configuration")
    ///     .run(&edges, Some(&truth))
    ///     .expect("run succeeds");
    /// let level = report.final_level().expect("one level ran");
    /// assert_eq!(level.cluster_count(), 2);
    /// assert_eq!(level.scores().map(|scores| scores.ari), Some(1.0));
    /// ```
    pub fn run(&self, edges: &EdgeList, truth: Option<&GroundTruth>) -> Result<PipelineReport> {
        let mut context = self
            .seed
            .map_or_else(RunContext::from_time, RunContext::seeded);
        self.run_with_context(edges, truth, &mut context)
    }

    #[instrument(
        name = "pipeline.run",
        err,
        skip(self, edges, truth, context),
        fields(
            heuristic = %self.heuristic,
            levels = self.levels.get(),
            vertices = edges.vertex_count(),
            edges = edges.edge_count(),
            seed = context.seed(),
            truth = truth.is_some(),
        ),
    )]
    fn run_with_context(
        &self,
        edges: &EdgeList,
        truth: Option<&GroundTruth>,
        context: &mut RunContext,
    ) -> Result<PipelineReport> {
        if let Some(truth) = truth
            && truth.vertex_count() != edges.vertex_count()
        {
            return Err(AgglomError::TruthUniverseMismatch {
                truth: truth.vertex_count(),
                graph: edges.vertex_count(),
            });
        }
        let truth = truth.cloned().map(|truth| {
            if self.resolve_overlaps && truth.has_overlaps() {
                warn!("ground truth has overlapping communities; keeping each vertex once");
                truth.resolve_overlaps()
            } else {
                truth
            }
        });
        let excluded = truth.as_ref().map(GroundTruth::excluded).unwrap_or_default();
        let clustering_coefficient = Graph::from_edge_list(edges)?.average_clustering_coefficient();
        let inputs = RunInputs {
            original: edges,
            truth: truth.as_ref(),
            excluded: &excluded,
        };

        let mut levels = Vec::with_capacity(self.levels.get());
        let mut current = edges.clone();
        let mut mapping = LevelMapping::identity(edges.vertex_count());
        for level in 0..self.levels.get() {
            context.set_level(level);
            let (report, coarse_partition) = self.run_level(&inputs, &current, &mapping, context)?;
            levels.push(report);
            if level + 1 == self.levels.get() {
                break;
            }
            let coarse = coarsen(&current, &coarse_partition)
                .map_err(|error| AgglomError::Cluster { level, error })?;
            if coarse.edges.edge_count() == 0 {
                info!(level, "no edges left between clusters; stopping");
                break;
            }
            mapping = mapping
                .compose(&coarse.step, coarse.edges.vertex_count())
                .map_err(|error| AgglomError::Cluster { level, error })?;
            current = coarse.edges;
        }

        info!(
            levels = levels.len(),
            clustering_coefficient, "pipeline completed"
        );
        Ok(PipelineReport {
            heuristic: self.heuristic,
            seed: context.seed(),
            clustering_coefficient,
            excluded: excluded.len(),
            levels,
        })
    }

    /// Returns the level report and the unprojected partition used for the
    /// next coarsening step.
    #[instrument(
        name = "pipeline.level",
        err,
        skip(self, inputs, current, mapping, context),
        fields(
            level = context.level(),
            vertices = current.vertex_count(),
            edges = current.edge_count(),
        ),
    )]
    fn run_level(
        &self,
        inputs: &RunInputs<'_>,
        current: &EdgeList,
        mapping: &LevelMapping,
        context: &mut RunContext,
    ) -> Result<(LevelReport, Partition)> {
        let level = context.level();
        let mut graph = Graph::from_edge_list(current)?;
        if level == 0
            && let Some(truth) = inputs.truth
        {
            graph.assign_truth(truth);
        }

        let outcome = aggregate(graph, self.heuristic, context).map_err(|error| {
            AgglomError::Aggregation {
                heuristic: self.heuristic,
                level,
                error,
            }
        })?;
        let coarse_partition = Partition::from_outcome(&outcome)
            .map_err(|error| AgglomError::Cluster { level, error })?;
        let partition = coarse_partition
            .project(mapping)
            .map_err(|error| AgglomError::Cluster { level, error })?;
        let modularity = modularity(inputs.original, &partition)
            .map_err(|error| AgglomError::Scoring { level, error })?;
        let pairwise = inputs.truth.map(|truth| {
            let scores = pairwise(truth.communities(), &partition.scored(inputs.excluded));
            if let Err(error) = &scores {
                warn!(
                    level,
                    code = %error.code(),
                    %error,
                    "pairwise scoring skipped"
                );
            }
            scores
        });

        info!(
            clusters = partition.cluster_count(),
            merges = outcome.hierarchy().len(),
            modularity,
            "level completed"
        );
        let report = LevelReport {
            level,
            vertices: current.vertex_count(),
            edges: current.edge_count(),
            merges: outcome.hierarchy().len(),
            sizes: partition.size_summary(),
            partition,
            modularity,
            pairwise,
        };
        Ok((report, coarse_partition))
    }
}
