//! Validated input contracts consumed by the clustering pipeline.
//!
//! [`EdgeList`] is the immutable vertex-count/edge-list pair a graph is built
//! from; [`GroundTruth`] is the optional reference partition results are
//! scored against. Both validate on construction, so holding one means the
//! data is ready for clustering.

use std::collections::HashSet;

use crate::error::InputError;

/// Vertex and edge counts declared by an input header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DeclaredCounts {
    /// Number of vertices the input claims to contain.
    pub vertices: usize,
    /// Number of edges the input claims to contain.
    pub edges: usize,
}

/// An undirected simple graph given as a vertex count and an edge list.
///
/// # Examples
/// ```
/// use agglom_core::EdgeList;
///
/// let edges = EdgeList::new(3, vec![(0, 1), (1, 2)]).expect("edges are valid");
/// assert_eq!(edges.vertex_count(), 3);
/// assert_eq!(edges.edge_count(), 2);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EdgeList {
    vertex_count: usize,
    edges: Vec<(usize, usize)>,
}

impl EdgeList {
    /// Validates `edges` against `vertex_count`.
    ///
    /// # Errors
    /// Returns [`InputError::VertexOutOfRange`] when an endpoint is not below
    /// `vertex_count`, [`InputError::SelfLoop`] for edges joining a vertex to
    /// itself and [`InputError::DuplicateEdge`] when an unordered pair repeats.
    pub fn new(vertex_count: usize, edges: Vec<(usize, usize)>) -> Result<Self, InputError> {
        let mut seen = HashSet::with_capacity(edges.len());
        for (edge, &(from, to)) in edges.iter().enumerate() {
            for vertex in [from, to] {
                if vertex >= vertex_count {
                    return Err(InputError::VertexOutOfRange {
                        edge,
                        vertex,
                        vertex_count,
                    });
                }
            }
            if from == to {
                return Err(InputError::SelfLoop { edge, vertex: from });
            }
            if !seen.insert((from.min(to), from.max(to))) {
                return Err(InputError::DuplicateEdge { edge, from, to });
            }
        }
        Ok(Self {
            vertex_count,
            edges,
        })
    }

    /// Validates loaded records against the counts declared by a header.
    ///
    /// The loaded vertex count is the declared count, widened to cover the
    /// highest endpoint actually referenced.
    ///
    /// # Errors
    /// Returns [`InputError::ChecksumMismatch`] when either loaded count
    /// differs from its declaration, otherwise any error of [`Self::new`].
    ///
    /// # Examples
    /// ```
    /// use agglom_core::{DeclaredCounts, EdgeList, InputError};
    ///
    /// let declared = DeclaredCounts { vertices: 3, edges: 2 };
    /// let err = EdgeList::from_declared(declared, vec![(0, 1)]).unwrap_err();
    /// assert!(matches!(err, InputError::ChecksumMismatch { loaded_edges: 1, .. }));
    /// ```
    pub fn from_declared(
        declared: DeclaredCounts,
        edges: Vec<(usize, usize)>,
    ) -> Result<Self, InputError> {
        let referenced = edges
            .iter()
            .map(|&(from, to)| from.max(to).saturating_add(1))
            .max()
            .unwrap_or(0);
        let loaded_vertices = declared.vertices.max(referenced);
        if loaded_vertices != declared.vertices || edges.len() != declared.edges {
            return Err(InputError::ChecksumMismatch {
                declared_vertices: declared.vertices,
                loaded_vertices,
                declared_edges: declared.edges,
                loaded_edges: edges.len(),
            });
        }
        Self::new(declared.vertices, edges)
    }

    /// Wraps edges that are in range, loop-free and deduplicated by
    /// construction.
    pub(crate) const fn from_validated(vertex_count: usize, edges: Vec<(usize, usize)>) -> Self {
        Self {
            vertex_count,
            edges,
        }
    }

    /// Number of vertices, including isolated ones.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges in input order.
    #[must_use]
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Returns `true` when the graph has no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }
}

/// A reference partition of the vertex set into communities.
///
/// Communities may overlap and need not cover every vertex; vertices in no
/// community are *excluded* from pairwise scoring.
///
/// # Examples
/// ```
/// use agglom_core::GroundTruth;
///
/// let truth = GroundTruth::new(5, vec![vec![0, 1], vec![2, 3]]).expect("truth is valid");
/// assert_eq!(truth.excluded(), vec![4]);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroundTruth {
    vertex_count: usize,
    communities: Vec<Vec<usize>>,
}

impl GroundTruth {
    /// Validates `communities` against `vertex_count`.
    ///
    /// # Errors
    /// Returns [`InputError::TruthVertexOutOfRange`] when a community lists a
    /// vertex that is not below `vertex_count`.
    pub fn new(vertex_count: usize, communities: Vec<Vec<usize>>) -> Result<Self, InputError> {
        for (community, members) in communities.iter().enumerate() {
            if let Some(&vertex) = members.iter().find(|&&vertex| vertex >= vertex_count) {
                return Err(InputError::TruthVertexOutOfRange {
                    community,
                    vertex,
                    vertex_count,
                });
            }
        }
        Ok(Self {
            vertex_count,
            communities,
        })
    }

    /// Size of the vertex universe this partition was validated against.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Communities in input order.
    #[must_use]
    pub fn communities(&self) -> &[Vec<usize>] {
        &self.communities
    }

    /// Vertices that belong to no community, in ascending order.
    #[must_use]
    pub fn excluded(&self) -> Vec<usize> {
        let mut covered = vec![false; self.vertex_count];
        for &vertex in self.communities.iter().flatten() {
            if let Some(slot) = covered.get_mut(vertex) {
                *slot = true;
            }
        }
        covered
            .iter()
            .enumerate()
            .filter_map(|(vertex, &seen)| (!seen).then_some(vertex))
            .collect()
    }

    /// Returns `true` when some vertex is listed more than once.
    #[must_use]
    pub fn has_overlaps(&self) -> bool {
        let mut seen = vec![false; self.vertex_count];
        for &vertex in self.communities.iter().flatten() {
            match seen.get_mut(vertex) {
                Some(slot) if *slot => return true,
                Some(slot) => *slot = true,
                None => {}
            }
        }
        false
    }

    /// Keeps each overlapping vertex only in the largest community listing it.
    ///
    /// Ties go to the community listed first. Communities left empty are
    /// dropped and the remaining ones keep their relative order.
    #[must_use]
    pub fn resolve_overlaps(self) -> Self {
        let mut owner: Vec<Option<usize>> = vec![None; self.vertex_count];
        for (community, members) in self.communities.iter().enumerate() {
            for &vertex in members {
                let Some(slot) = owner.get_mut(vertex) else {
                    continue;
                };
                let current_len = slot
                    .and_then(|current| self.communities.get(current))
                    .map_or(0, Vec::len);
                if slot.is_none() || members.len() > current_len {
                    *slot = Some(community);
                }
            }
        }

        let communities = self
            .communities
            .iter()
            .enumerate()
            .map(|(community, members)| {
                let mut kept = Vec::with_capacity(members.len());
                for &vertex in members {
                    if owner.get(vertex).copied().flatten() == Some(community)
                        && !kept.contains(&vertex)
                    {
                        kept.push(vertex);
                    }
                }
                kept
            })
            .filter(|members| !members.is_empty())
            .collect();

        Self {
            vertex_count: self.vertex_count,
            communities,
        }
    }

    /// First community listing `vertex`, if any.
    #[must_use]
    pub fn label_of(&self, vertex: usize) -> Option<usize> {
        self.communities
            .iter()
            .position(|members| members.contains(&vertex))
    }

    /// Community index per vertex, taking the first listing for overlaps.
    #[must_use]
    pub fn labels(&self) -> Vec<Option<usize>> {
        let mut labels = vec![None; self.vertex_count];
        for (community, members) in self.communities.iter().enumerate() {
            for &vertex in members {
                if let Some(slot) = labels.get_mut(vertex) {
                    slot.get_or_insert(community);
                }
            }
        }
        labels
    }
}
