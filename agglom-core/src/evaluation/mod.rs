//! Partition quality: modularity against the edge list and pairwise
//! agreement against ground truth.

mod modularity;
mod pairwise;

pub use modularity::modularity;
pub use pairwise::{PairwiseScores, pairwise};
