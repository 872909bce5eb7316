//! Seeded planted-partition graphs.
//!
//! Vertices are split into equal communities. Pairs inside a community are
//! joined with a fixed probability, and a fixed number of distinct bridging
//! edges connect randomly chosen vertices of different communities.

use std::collections::BTreeSet;

use agglom_core::{EdgeList, GroundTruth, InputError};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Errors raised for unusable generator parameters.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PlantedError {
    /// No communities were requested.
    #[error("community count must be greater than zero")]
    ZeroCommunities,
    /// Communities were requested with no members.
    #[error("community size must be greater than zero")]
    ZeroCommunitySize,
    /// The intra-community probability was outside `[0, 1]`.
    #[error("intra-community probability {probability} must lie in [0, 1]")]
    InvalidProbability {
        /// Rejected probability.
        probability: f64,
    },
    /// `communities * community_size` overflowed `usize`.
    #[error("communities * community_size overflows usize")]
    Overflow,
    /// Generated edges failed validation.
    #[error(transparent)]
    Input(#[from] InputError),
}

/// Parameters for [`PlantedGraph::generate`].
#[derive(Clone, Debug)]
pub struct PlantedConfig {
    /// Number of communities.
    pub communities: usize,
    /// Vertices per community.
    pub community_size: usize,
    /// Probability that two members of one community are adjacent.
    pub intra_probability: f64,
    /// Distinct edges between communities. Fewer are produced when the
    /// graph runs out of candidate pairs.
    pub bridges: usize,
    /// Seed for the generator.
    pub seed: u64,
}

/// A generated graph and the communities it was planted with.
#[derive(Clone, Debug)]
pub struct PlantedGraph {
    edges: EdgeList,
    communities: Vec<Vec<usize>>,
}

impl PlantedGraph {
    /// Generates a graph for `config`.
    ///
    /// # Errors
    /// Returns [`PlantedError`] for zero sizes, an out-of-range probability
    /// or an overflowing vertex count.
    ///
    /// # Examples
    /// ```
    /// use agglom_benches::planted::{PlantedConfig, PlantedGraph};
    ///
    /// let graph = PlantedGraph::generate(&PlantedConfig {
    ///     communities: 3,
    ///     community_size: 4,
    ///     intra_probability: 1.0,
    ///     bridges: 0,
    ///     seed: 1,
    /// })
    /// .expect("valid parameters");
    /// assert_eq!(graph.edges().edge_count(), 3 * 6);
    /// ```
    pub fn generate(config: &PlantedConfig) -> Result<Self, PlantedError> {
        let vertex_count = validate(config)?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut edges = BTreeSet::new();

        let communities: Vec<Vec<usize>> = (0..config.communities)
            .map(|community| {
                let base = community * config.community_size;
                (base..base + config.community_size).collect()
            })
            .collect();
        for members in &communities {
            for (offset, &left) in members.iter().enumerate() {
                for &right in members.iter().skip(offset + 1) {
                    if rng.gen_bool(config.intra_probability) {
                        edges.insert((left, right));
                    }
                }
            }
        }

        if config.communities > 1 {
            let mut added = 0;
            let mut attempts = config.bridges.saturating_mul(8);
            while added < config.bridges && attempts > 0 {
                attempts -= 1;
                let left = rng.gen_range(0..vertex_count);
                let right = rng.gen_range(0..vertex_count);
                let same_community =
                    left / config.community_size == right / config.community_size;
                if !same_community && edges.insert((left.min(right), left.max(right))) {
                    added += 1;
                }
            }
        }

        let edges = EdgeList::new(vertex_count, edges.into_iter().collect())?;
        Ok(Self { edges, communities })
    }

    /// Generated edges.
    #[must_use]
    pub const fn edges(&self) -> &EdgeList {
        &self.edges
    }

    /// Planted communities, in vertex order.
    #[must_use]
    pub fn communities(&self) -> &[Vec<usize>] {
        &self.communities
    }

    /// Planted communities as validated ground truth.
    ///
    /// # Errors
    /// Never fails for a generated graph; the error type is that of
    /// [`GroundTruth::new`].
    pub fn truth(&self) -> Result<GroundTruth, InputError> {
        GroundTruth::new(self.edges.vertex_count(), self.communities.clone())
    }
}

fn validate(config: &PlantedConfig) -> Result<usize, PlantedError> {
    if config.communities == 0 {
        return Err(PlantedError::ZeroCommunities);
    }
    if config.community_size == 0 {
        return Err(PlantedError::ZeroCommunitySize);
    }
    if !(0.0..=1.0).contains(&config.intra_probability) {
        return Err(PlantedError::InvalidProbability {
            probability: config.intra_probability,
        });
    }
    config
        .communities
        .checked_mul(config.community_size)
        .ok_or(PlantedError::Overflow)
}
