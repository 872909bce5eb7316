//! Arena-backed graph store mutated by the merge heuristics.
//!
//! Vertices live in a dense vector addressed by [`VertexId`]; edges live in a
//! slot vector addressed by [`EdgeId`] so handles stay stable while edges are
//! removed. Every live edge is registered in the adjacency of both endpoints
//! and removal detaches it from both in one step.

mod types;

use std::collections::HashSet;

use crate::{
    error::GraphError,
    input::{EdgeList, GroundTruth},
};

pub use types::{Adjacency, Edge, EdgeId, Vertex, VertexId, VertexState};

/// Mutable undirected graph with per-vertex aggregation metadata.
///
/// # Examples
/// ```
/// use agglom_core::{Graph, VertexId};
///
/// let mut graph = Graph::with_vertices(3);
/// let edge = graph.add_edge(VertexId::new(0), VertexId::new(1)).expect("edge is valid");
/// assert_eq!(graph.degree_of(VertexId::new(0)).expect("vertex exists"), 1);
/// graph.remove_edge(edge).expect("edge is live");
/// assert_eq!(graph.edge_count(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<Option<Edge>>,
    live_edges: usize,
}

impl Graph {
    /// Creates a graph with `count` isolated vertices.
    #[must_use]
    pub fn with_vertices(count: usize) -> Self {
        Self {
            vertices: (0..count).map(|index| Vertex::new(VertexId::new(index))).collect(),
            edges: Vec::new(),
            live_edges: 0,
        }
    }

    /// Builds a graph holding every vertex and edge of `edges`.
    ///
    /// # Errors
    /// Propagates [`GraphError`] from [`Self::add_edge`]; a validated
    /// [`EdgeList`] never triggers one.
    pub fn from_edge_list(edges: &EdgeList) -> Result<Self, GraphError> {
        let mut graph = Self::with_vertices(edges.vertex_count());
        graph.edges.reserve(edges.edge_count());
        for &(from, to) in edges.edges() {
            graph.add_edge(VertexId::new(from), VertexId::new(to))?;
        }
        Ok(graph)
    }

    /// Appends an isolated vertex.
    pub fn add_vertex(&mut self) -> VertexId {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(id));
        id
    }

    /// Connects `from` and `to`, registering the edge on both endpoints.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownVertex`] for foreign handles,
    /// [`GraphError::SelfLoop`] when `from == to` and
    /// [`GraphError::DuplicateEdge`] when the vertices are already adjacent.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId) -> Result<EdgeId, GraphError> {
        if from == to {
            return Err(GraphError::SelfLoop {
                vertex: from.index(),
            });
        }
        if self.are_adjacent(from, to)? {
            return Err(GraphError::DuplicateEdge {
                from: from.index(),
                to: to.index(),
            });
        }
        let id = EdgeId::new(self.edges.len());
        self.vertex_mut(from)?.adjacency.push(Adjacency {
            edge: id,
            neighbour: to,
        });
        self.vertex_mut(to)?.adjacency.push(Adjacency {
            edge: id,
            neighbour: from,
        });
        self.edges.push(Some(Edge { id, from, to }));
        self.live_edges += 1;
        Ok(id)
    }

    /// Detaches `edge` from both endpoints and frees its slot.
    ///
    /// Both adjacency positions are located before anything is mutated, so a
    /// failure leaves the graph untouched.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownEdge`] when the edge is not live and
    /// [`GraphError::DanglingAdjacency`] when an endpoint lacks its entry.
    pub fn remove_edge(&mut self, edge: EdgeId) -> Result<Edge, GraphError> {
        let record = self
            .edges
            .get(edge.index())
            .copied()
            .flatten()
            .ok_or(GraphError::UnknownEdge {
                edge: edge.index(),
            })?;
        let from_position = self.adjacency_position(record.from, edge)?;
        let to_position = self.adjacency_position(record.to, edge)?;

        self.vertex_mut(record.from)?.adjacency.swap_remove(from_position);
        self.vertex_mut(record.to)?.adjacency.swap_remove(to_position);
        if let Some(slot) = self.edges.get_mut(edge.index()) {
            *slot = None;
        }
        self.live_edges -= 1;
        Ok(record)
    }

    /// Removes every edge incident to `vertex`, returning how many were
    /// removed.
    ///
    /// # Errors
    /// Returns [`GraphError`] when `vertex` is unknown or an edge cannot be
    /// detached.
    pub fn remove_all_edges(&mut self, vertex: VertexId) -> Result<usize, GraphError> {
        let incident: Vec<EdgeId> = self
            .vertex(vertex)?
            .adjacency
            .iter()
            .map(|entry| entry.edge)
            .collect();
        for &edge in &incident {
            self.remove_edge(edge)?;
        }
        Ok(incident.len())
    }

    /// Looks up a vertex.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownVertex`] for foreign handles.
    pub fn vertex(&self, vertex: VertexId) -> Result<&Vertex, GraphError> {
        self.vertices
            .get(vertex.index())
            .ok_or(GraphError::UnknownVertex {
                vertex: vertex.index(),
                vertex_count: self.vertices.len(),
            })
    }

    /// Looks up a live edge.
    #[must_use]
    pub fn edge(&self, edge: EdgeId) -> Option<&Edge> {
        self.edges.get(edge.index()).and_then(Option::as_ref)
    }

    /// Iterates over the current neighbours of `vertex`.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownVertex`] for foreign handles.
    pub fn neighbours_of(
        &self,
        vertex: VertexId,
    ) -> Result<impl Iterator<Item = VertexId> + '_, GraphError> {
        Ok(self
            .vertex(vertex)?
            .adjacency
            .iter()
            .map(|entry| entry.neighbour))
    }

    /// Current degree of `vertex`.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownVertex`] for foreign handles.
    pub fn degree_of(&self, vertex: VertexId) -> Result<usize, GraphError> {
        Ok(self.vertex(vertex)?.degree())
    }

    /// Returns `true` when an edge joins `left` and `right`.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownVertex`] for foreign handles.
    pub fn are_adjacent(&self, left: VertexId, right: VertexId) -> Result<bool, GraphError> {
        let left_vertex = self.vertex(left)?;
        let right_vertex = self.vertex(right)?;
        let (scan, target) = if left_vertex.degree() <= right_vertex.degree() {
            (left_vertex, right)
        } else {
            (right_vertex, left)
        };
        Ok(scan.adjacency.iter().any(|entry| entry.neighbour == target))
    }

    /// Neighbour set of `vertex`.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownVertex`] for foreign handles.
    pub fn neighbour_set(&self, vertex: VertexId) -> Result<HashSet<VertexId>, GraphError> {
        Ok(self.neighbours_of(vertex)?.collect())
    }

    /// Number of triangles closed by the pair `(left, right)`: the size of the
    /// intersection of their neighbour sets.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownVertex`] for foreign handles.
    pub fn triangles_between(&self, left: VertexId, right: VertexId) -> Result<usize, GraphError> {
        let left_neighbours = self.neighbour_set(left)?;
        self.shared_neighbours(&left_neighbours, right)
    }

    /// Counts the neighbours of `vertex` that are contained in `neighbours`.
    pub(crate) fn shared_neighbours(
        &self,
        neighbours: &HashSet<VertexId>,
        vertex: VertexId,
    ) -> Result<usize, GraphError> {
        Ok(self
            .neighbours_of(vertex)?
            .filter(|candidate| neighbours.contains(candidate))
            .count())
    }

    /// Mean local clustering coefficient over all vertices.
    ///
    /// Vertices with fewer than two neighbours contribute zero. An empty
    /// graph yields zero.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "clustering coefficients are ratios of link counts"
    )]
    pub fn average_clustering_coefficient(&self) -> f64 {
        if self.vertices.is_empty() {
            return 0.0;
        }
        let mut total = 0.0_f64;
        for vertex in &self.vertices {
            let degree = vertex.degree();
            if degree < 2 {
                continue;
            }
            let neighbours: HashSet<VertexId> =
                vertex.adjacency.iter().map(|entry| entry.neighbour).collect();
            let mut endpoints = 0_usize;
            for entry in &vertex.adjacency {
                endpoints += self
                    .shared_neighbours(&neighbours, entry.neighbour)
                    .unwrap_or(0);
            }
            // Each link among neighbours was seen from both of its ends.
            let links = endpoints as f64 / 2.0;
            let possible = (degree * (degree - 1)) as f64 / 2.0;
            total += links / possible;
        }
        total / self.vertices.len() as f64
    }

    /// Copies ground-truth labels onto the vertices.
    pub fn assign_truth(&mut self, truth: &GroundTruth) {
        for (vertex, label) in self.vertices.iter_mut().zip(truth.labels()) {
            vertex.truth_community = label;
        }
    }

    /// Number of vertices, absorbed ones included.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live edges.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.live_edges
    }

    /// Iterates over every vertex in index order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    /// Iterates over every live edge in slot order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().flatten()
    }

    pub(crate) fn set_weight(&mut self, vertex: VertexId, weight: u64) -> Result<(), GraphError> {
        self.vertex_mut(vertex)?.weight = weight;
        Ok(())
    }

    /// Destructive merge: `winner` takes `loser` and everything `loser` had
    /// absorbed, and `loser` is detached from the graph.
    pub(crate) fn absorb(
        &mut self,
        winner: VertexId,
        loser: VertexId,
        accumulate_weight: bool,
    ) -> Result<usize, GraphError> {
        let removed = self.remove_all_edges(loser)?;
        let (winner_vertex, loser_vertex) = self.pair_mut(winner, loser)?;
        let mut inherited = std::mem::take(&mut loser_vertex.absorbed);
        winner_vertex.absorbed.push(loser);
        winner_vertex.absorbed.append(&mut inherited);
        if accumulate_weight {
            winner_vertex.weight = winner_vertex.weight.saturating_add(loser_vertex.weight);
        }
        loser_vertex.state = VertexState::Removed { parent: winner };
        Ok(removed)
    }

    /// Retentive merge: `loser` joins `winner`'s cluster but keeps its edges.
    pub(crate) fn retain(
        &mut self,
        winner: VertexId,
        loser: VertexId,
        accumulate_weight: bool,
    ) -> Result<(), GraphError> {
        let (winner_vertex, loser_vertex) = self.pair_mut(winner, loser)?;
        let inherited = std::mem::take(&mut loser_vertex.members);
        // A cluster never lists its own representative, even after a cycle of
        // retained merges hands the winner back through `inherited`.
        for member in std::iter::once(loser).chain(inherited) {
            if member != winner && !winner_vertex.members.contains(&member) {
                winner_vertex.members.push(member);
            }
        }
        winner_vertex.child_count += 1;
        let mass = loser_vertex
            .weight
            .saturating_add(loser_vertex.extra_weight);
        winner_vertex.extra_weight = winner_vertex.extra_weight.saturating_add(mass);
        if accumulate_weight {
            winner_vertex.weight = winner_vertex.weight.saturating_add(loser_vertex.weight);
        }
        loser_vertex.state = VertexState::Retained { parent: winner };
        Ok(())
    }

    fn vertex_mut(&mut self, vertex: VertexId) -> Result<&mut Vertex, GraphError> {
        let vertex_count = self.vertices.len();
        self.vertices
            .get_mut(vertex.index())
            .ok_or(GraphError::UnknownVertex {
                vertex: vertex.index(),
                vertex_count,
            })
    }

    fn pair_mut(
        &mut self,
        first: VertexId,
        second: VertexId,
    ) -> Result<(&mut Vertex, &mut Vertex), GraphError> {
        if first == second {
            return Err(GraphError::SelfLoop {
                vertex: first.index(),
            });
        }
        // Validate both handles before splitting.
        self.vertex(first)?;
        self.vertex(second)?;
        let (low, high) = if first < second {
            (first, second)
        } else {
            (second, first)
        };
        let vertex_count = self.vertices.len();
        let (head, tail) = self.vertices.split_at_mut(high.index());
        let (Some(low_vertex), Some(high_vertex)) = (head.get_mut(low.index()), tail.first_mut())
        else {
            return Err(GraphError::UnknownVertex {
                vertex: high.index(),
                vertex_count,
            });
        };
        if first < second {
            Ok((low_vertex, high_vertex))
        } else {
            Ok((high_vertex, low_vertex))
        }
    }

    fn adjacency_position(&self, vertex: VertexId, edge: EdgeId) -> Result<usize, GraphError> {
        self.vertex(vertex)?
            .adjacency
            .iter()
            .position(|entry| entry.edge == edge)
            .ok_or(GraphError::DanglingAdjacency {
                edge: edge.index(),
                vertex: vertex.index(),
            })
    }
}

#[cfg(test)]
mod tests;
