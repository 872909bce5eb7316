//! Randomized agglomerative clustering of undirected graphs.
//!
//! An [`EdgeList`] is loaded into a mutable [`Graph`], one of sixteen merge
//! [`Heuristic`]s collapses it into a [`Partition`], and the partition is
//! scored by [`modularity`] and, when ground truth is available, by
//! [`pairwise`] agreement. A [`Pipeline`] repeats this over several
//! coarsening levels.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod aggregation;
mod builder;
mod clusters;
mod coarsen;
mod error;
mod evaluation;
mod graph;
mod hierarchy;
mod input;
mod pipeline;
mod report;

#[cfg(test)]
mod test_utils;

pub use crate::{
    aggregation::{
        AggregationOutcome, CandidatePolicy, Heuristic, MergeMode, MergePlan, NeighbourPolicy,
        Resolution, RunContext, UnknownHeuristic, WeightInit, WeightUpdate, aggregate,
    },
    builder::PipelineBuilder,
    clusters::{Partition, SizeSummary},
    coarsen::{Coarsened, LevelMapping, coarsen},
    error::{
        AgglomError, AgglomErrorCode, AggregationError, AggregationErrorCode, ClusterError,
        ClusterErrorCode, GraphError, GraphErrorCode, InputError, InputErrorCode, Result,
        ScoringError, ScoringErrorCode,
    },
    evaluation::{PairwiseScores, modularity, pairwise},
    graph::{Adjacency, Edge, EdgeId, Graph, Vertex, VertexId, VertexState},
    hierarchy::{Merge, MergeHierarchy},
    input::{DeclaredCounts, EdgeList, GroundTruth},
    pipeline::Pipeline,
    report::{LevelReport, PipelineReport},
};
