//! Randomized agglomeration over a mutable graph.
//!
//! Sixteen heuristics share one driver loop. Each [`Heuristic`] resolves to a
//! [`MergePlan`] naming its candidate policy, neighbour policy, winner
//! resolution, merge mode and weight handling; [`aggregate`] executes the plan
//! with the randomness held in a [`RunContext`].

mod active;
mod context;
mod driver;
mod heuristic;
mod ranking;
mod select;

pub use context::RunContext;
pub use driver::{AggregationOutcome, aggregate};
pub use heuristic::{
    CandidatePolicy, Heuristic, MergeMode, MergePlan, NeighbourPolicy, Resolution,
    UnknownHeuristic, WeightInit, WeightUpdate,
};
