//! Merge hierarchy (dendrogram edges) recorded during aggregation.

mod union_find;

use union_find::DisjointSet;

use crate::{
    error::{AggregationError, GraphError},
    graph::VertexId,
};

/// One recorded merge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Merge {
    /// Vertex that lost the merge.
    pub loser: VertexId,
    /// Vertex that survived it.
    pub winner: VertexId,
}

/// Ordered `(loser, winner)` pairs; every vertex loses at most once, so the
/// pairs form a forest.
#[derive(Clone, Debug, Default)]
pub struct MergeHierarchy {
    merges: Vec<Merge>,
    winner_of: Vec<Option<VertexId>>,
}

impl MergeHierarchy {
    /// Creates an empty hierarchy over `vertex_count` vertices.
    #[must_use]
    pub fn new(vertex_count: usize) -> Self {
        Self {
            merges: Vec::new(),
            winner_of: vec![None; vertex_count],
        }
    }

    /// Records that `loser` was merged into `winner`.
    ///
    /// # Errors
    /// Returns [`AggregationError::RepeatedLoser`] when `loser` already lost a
    /// merge, [`AggregationError::SelfMerge`] when both sides are the same
    /// vertex and [`AggregationError::Graph`] for handles outside the
    /// hierarchy.
    pub fn record(&mut self, loser: VertexId, winner: VertexId) -> Result<(), AggregationError> {
        if loser == winner {
            return Err(AggregationError::SelfMerge {
                vertex: loser.index(),
            });
        }
        let vertex_count = self.winner_of.len();
        if winner.index() >= vertex_count {
            return Err(GraphError::UnknownVertex {
                vertex: winner.index(),
                vertex_count,
            }
            .into());
        }
        let slot = self
            .winner_of
            .get_mut(loser.index())
            .ok_or(GraphError::UnknownVertex {
                vertex: loser.index(),
                vertex_count,
            })?;
        if let Some(previous) = *slot {
            return Err(AggregationError::RepeatedLoser {
                vertex: loser.index(),
                previous_winner: previous.index(),
            });
        }
        *slot = Some(winner);
        self.merges.push(Merge { loser, winner });
        Ok(())
    }

    /// Merges in the order they happened.
    #[must_use]
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Number of recorded merges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.merges.len()
    }

    /// Returns `true` when nothing was merged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    /// Size of the vertex universe.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.winner_of.len()
    }

    /// The vertex `vertex` lost to, if it lost at all.
    #[must_use]
    pub fn winner_of(&self, vertex: VertexId) -> Option<VertexId> {
        self.winner_of.get(vertex.index()).copied().flatten()
    }

    /// Connected components of the undirected graph formed by the merges,
    /// spanning every vertex. Components are ordered by smallest member.
    #[must_use]
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut set = DisjointSet::new(self.vertex_count());
        for merge in &self.merges {
            set.union(merge.loser.index(), merge.winner.index());
        }
        set.components()
    }
}
