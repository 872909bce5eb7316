//! Handles and records stored in the graph arena.

use std::fmt;

/// Dense handle of a vertex inside one [`super::Graph`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VertexId(usize);

impl VertexId {
    /// Wraps a raw vertex index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Raw index of the vertex.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable handle of an edge inside one [`super::Graph`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EdgeId(usize);

impl EdgeId {
    /// Raw index of the edge slot.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    pub(super) const fn new(index: usize) -> Self {
        Self(index)
    }
}

/// One adjacency entry: the incident edge and the vertex at its far end.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Adjacency {
    /// Incident edge.
    pub edge: EdgeId,
    /// Vertex on the other side of `edge`.
    pub neighbour: VertexId,
}

/// Membership state of a vertex during aggregation.
///
/// A vertex is active until it loses a merge. Destructive merges remove the
/// loser and its edges; retentive merges keep both but link the loser to its
/// winner.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum VertexState {
    /// The vertex has not lost a merge.
    #[default]
    Active,
    /// Absorbed by `parent` and detached from the graph.
    Removed {
        /// Vertex that absorbed this one.
        parent: VertexId,
    },
    /// Absorbed by `parent` with its edges kept in place.
    Retained {
        /// Vertex whose cluster this one joined.
        parent: VertexId,
    },
}

/// A vertex and its aggregation bookkeeping.
#[derive(Clone, Debug)]
pub struct Vertex {
    pub(super) id: VertexId,
    pub(super) weight: u64,
    pub(super) extra_weight: u64,
    pub(super) adjacency: Vec<Adjacency>,
    pub(super) absorbed: Vec<VertexId>,
    pub(super) members: Vec<VertexId>,
    pub(super) child_count: usize,
    pub(super) state: VertexState,
    pub(super) truth_community: Option<usize>,
}

impl Vertex {
    pub(super) const fn new(id: VertexId) -> Self {
        Self {
            id,
            weight: 0,
            extra_weight: 0,
            adjacency: Vec::new(),
            absorbed: Vec::new(),
            members: Vec::new(),
            child_count: 0,
            state: VertexState::Active,
            truth_community: None,
        }
    }

    /// Handle of this vertex.
    #[must_use]
    pub const fn id(&self) -> VertexId {
        self.id
    }

    /// Application-defined weight (degree snapshot or accumulated mass).
    #[must_use]
    pub const fn weight(&self) -> u64 {
        self.weight
    }

    /// Mass gathered from retained absorptions.
    #[must_use]
    pub const fn extra_weight(&self) -> u64 {
        self.extra_weight
    }

    /// Live adjacency entries.
    #[must_use]
    pub fn adjacency(&self) -> &[Adjacency] {
        &self.adjacency
    }

    /// Current number of incident edges.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.adjacency.len()
    }

    /// Vertices consumed by destructive merges, directly or transitively.
    #[must_use]
    pub fn absorbed(&self) -> &[VertexId] {
        &self.absorbed
    }

    /// Vertices that joined this vertex's retained cluster.
    #[must_use]
    pub fn members(&self) -> &[VertexId] {
        &self.members
    }

    /// Number of direct retained absorptions.
    #[must_use]
    pub const fn child_count(&self) -> usize {
        self.child_count
    }

    /// Aggregation state.
    #[must_use]
    pub const fn state(&self) -> VertexState {
        self.state
    }

    /// Vertex that absorbed this one, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<VertexId> {
        match self.state {
            VertexState::Active => None,
            VertexState::Removed { parent } | VertexState::Retained { parent } => Some(parent),
        }
    }

    /// Returns `true` once the vertex has lost a merge.
    #[must_use]
    pub const fn is_absorbed(&self) -> bool {
        !matches!(self.state, VertexState::Active)
    }

    /// Ground-truth community label, when one was assigned.
    #[must_use]
    pub const fn truth_community(&self) -> Option<usize> {
        self.truth_community
    }
}

/// An undirected edge between two vertices.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Edge {
    /// Stable handle of this edge.
    pub id: EdgeId,
    /// First endpoint.
    pub from: VertexId,
    /// Second endpoint.
    pub to: VertexId,
}
