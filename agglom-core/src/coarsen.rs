//! Multi-level coarsening: collapse each cluster into a super-vertex.

use std::collections::BTreeSet;

use tracing::{info, instrument};

use crate::{clusters::Partition, error::ClusterError, input::EdgeList};

/// Sends every original vertex to the vertex that represents it at the
/// current coarsening level.
///
/// # Examples
/// ```
/// use agglom_core::LevelMapping;
///
/// let mapping = LevelMapping::identity(4)
///     .compose(&[0, 0, 1, 1], 2)
///     .expect("step covers every vertex");
/// assert_eq!(mapping.images(), &[0, 0, 1, 1]);
/// assert_eq!(mapping.target_count(), 2);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LevelMapping {
    images: Vec<usize>,
    target_count: usize,
}

impl LevelMapping {
    /// Mapping of a level onto itself.
    #[must_use]
    pub fn identity(vertex_count: usize) -> Self {
        Self {
            images: (0..vertex_count).collect(),
            target_count: vertex_count,
        }
    }

    /// Follows this mapping with `step`, which sends each current-level
    /// vertex to one of `step_target` next-level vertices.
    ///
    /// # Errors
    /// Returns [`ClusterError::MappingMismatch`] when `step` does not cover
    /// every current-level vertex and [`ClusterError::VertexOutOfRange`] when
    /// it points past `step_target`.
    pub fn compose(&self, step: &[usize], step_target: usize) -> Result<Self, ClusterError> {
        if step.len() != self.target_count {
            return Err(ClusterError::MappingMismatch {
                mapped: step.len(),
                vertex_count: self.target_count,
            });
        }
        let images = self
            .images
            .iter()
            .map(|&image| match step.get(image) {
                Some(&next) if next < step_target => Ok(next),
                Some(&next) => Err(ClusterError::VertexOutOfRange {
                    vertex: next,
                    vertex_count: step_target,
                }),
                None => Err(ClusterError::VertexOutOfRange {
                    vertex: image,
                    vertex_count: step.len(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            images,
            target_count: step_target,
        })
    }

    /// Current-level vertex per original vertex.
    #[must_use]
    pub fn images(&self) -> &[usize] {
        &self.images
    }

    /// Number of original vertices.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.images.len()
    }

    /// Number of vertices at the current level.
    #[must_use]
    pub const fn target_count(&self) -> usize {
        self.target_count
    }
}

/// A coarsened graph and the step mapping that produced it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Coarsened {
    /// Edge list over super-vertices.
    pub edges: EdgeList,
    /// Super-vertex per vertex of the input level.
    pub step: Vec<usize>,
}

/// Collapses every cluster of `partition` into one super-vertex and rebuilds
/// the edges between super-vertices.
///
/// Super-vertex ids are cluster ids. Parallel edges collapse into one and
/// edges inside a cluster disappear.
///
/// # Errors
/// Returns [`ClusterError::MappingMismatch`] when the partition and edge list
/// cover different vertex counts.
///
/// # Examples
/// ```
/// use agglom_core::{EdgeList, Partition, coarsen};
///
/// let edges = EdgeList::new(4, vec![(0, 1), (1, 2), (0, 3), (2, 3)]).expect("valid");
/// let partition = Partition::new(4, vec![vec![0, 1], vec![2, 3]]).expect("valid");
/// let coarse = coarsen(&edges, &partition).expect("counts agree");
/// assert_eq!(coarse.edges.vertex_count(), 2);
/// assert_eq!(coarse.edges.edges(), &[(0, 1)]);
/// ```
#[instrument(
    name = "coarsen.collapse",
    err,
    skip(edges, partition),
    fields(
        vertices = edges.vertex_count(),
        edges = edges.edge_count(),
        clusters = partition.cluster_count(),
    ),
)]
pub fn coarsen(edges: &EdgeList, partition: &Partition) -> Result<Coarsened, ClusterError> {
    if partition.vertex_count() != edges.vertex_count() {
        return Err(ClusterError::MappingMismatch {
            mapped: partition.vertex_count(),
            vertex_count: edges.vertex_count(),
        });
    }
    let step = partition.labels();
    let mut pairs = BTreeSet::new();
    for &(from, to) in edges.edges() {
        let (Some(&left), Some(&right)) = (step.get(from), step.get(to)) else {
            continue;
        };
        if left != right {
            pairs.insert((left.min(right), left.max(right)));
        }
    }
    let coarse = EdgeList::from_validated(partition.cluster_count(), pairs.into_iter().collect());
    info!(
        super_vertices = coarse.vertex_count(),
        super_edges = coarse.edge_count(),
        "coarsening completed"
    );
    Ok(Coarsened {
        edges: coarse,
        step,
    })
}
