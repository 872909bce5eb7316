//! Error types for the agglom core library.
//!
//! Each layer of the pipeline owns an error enum with stable machine-readable
//! codes. [`AgglomError`] wraps them for callers of [`crate::Pipeline::run`].

use std::fmt;

use thiserror::Error;

use crate::aggregation::Heuristic;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Errors raised while validating edge lists and ground-truth partitions.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum InputError {
    /// Loaded vertex or edge counts disagree with the declared header.
    #[error(
        "checksum mismatch: declared {declared_vertices} vertices and {declared_edges} edges, \
         loaded {loaded_vertices} vertices and {loaded_edges} edges"
    )]
    ChecksumMismatch {
        /// Vertex count declared by the input header.
        declared_vertices: usize,
        /// Vertex count implied by the loaded records.
        loaded_vertices: usize,
        /// Edge count declared by the input header.
        declared_edges: usize,
        /// Number of edge records actually loaded.
        loaded_edges: usize,
    },
    /// An edge endpoint referenced a vertex outside `[0, vertex_count)`.
    #[error("edge {edge} references vertex {vertex} but only {vertex_count} vertices exist")]
    VertexOutOfRange {
        /// Position of the offending edge in the input.
        edge: usize,
        /// Out-of-range vertex index.
        vertex: usize,
        /// Number of vertices in the graph.
        vertex_count: usize,
    },
    /// An edge joined a vertex to itself.
    #[error("edge {edge} is a self-loop on vertex {vertex}")]
    SelfLoop {
        /// Position of the offending edge in the input.
        edge: usize,
        /// Vertex the loop is attached to.
        vertex: usize,
    },
    /// The same unordered pair appeared more than once.
    #[error("edge {edge} duplicates the pair ({from}, {to})")]
    DuplicateEdge {
        /// Position of the duplicate edge in the input.
        edge: usize,
        /// First endpoint of the duplicated pair.
        from: usize,
        /// Second endpoint of the duplicated pair.
        to: usize,
    },
    /// A ground-truth community referenced a vertex outside the graph.
    #[error("truth community {community} has vertex {vertex} outside {vertex_count} vertices")]
    TruthVertexOutOfRange {
        /// Index of the offending community.
        community: usize,
        /// Out-of-range vertex index.
        vertex: usize,
        /// Number of vertices in the graph.
        vertex_count: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`InputError`] variants.
    enum InputErrorCode for InputError {
        /// Loaded counts disagree with the declared header.
        ChecksumMismatch => ChecksumMismatch { .. } => "INPUT_CHECKSUM_MISMATCH",
        /// An edge endpoint was outside the vertex range.
        VertexOutOfRange => VertexOutOfRange { .. } => "INPUT_VERTEX_OUT_OF_RANGE",
        /// An edge joined a vertex to itself.
        SelfLoop => SelfLoop { .. } => "INPUT_SELF_LOOP",
        /// The same unordered pair appeared more than once.
        DuplicateEdge => DuplicateEdge { .. } => "INPUT_DUPLICATE_EDGE",
        /// A ground-truth community referenced an unknown vertex.
        TruthVertexOutOfRange => TruthVertexOutOfRange { .. } => "INPUT_TRUTH_VERTEX_OUT_OF_RANGE",
    }
}

/// Errors raised by the graph store when it is used inconsistently.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GraphError {
    /// The vertex handle does not belong to this graph.
    #[error("vertex {vertex} is not part of a graph with {vertex_count} vertices")]
    UnknownVertex {
        /// Offending vertex index.
        vertex: usize,
        /// Number of vertices in the graph.
        vertex_count: usize,
    },
    /// The edge handle does not refer to a live edge.
    #[error("edge {edge} does not exist or was already removed")]
    UnknownEdge {
        /// Offending edge index.
        edge: usize,
    },
    /// An edge was requested between a vertex and itself.
    #[error("cannot connect vertex {vertex} to itself")]
    SelfLoop {
        /// Vertex the loop would attach to.
        vertex: usize,
    },
    /// The two vertices are already adjacent.
    #[error("vertices {from} and {to} are already connected")]
    DuplicateEdge {
        /// First endpoint.
        from: usize,
        /// Second endpoint.
        to: usize,
    },
    /// A live edge was missing from one of its endpoints' adjacency lists.
    #[error("edge {edge} is not registered in the adjacency of vertex {vertex}")]
    DanglingAdjacency {
        /// Edge whose registration was missing.
        edge: usize,
        /// Endpoint lacking the adjacency entry.
        vertex: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// The vertex handle does not belong to this graph.
        UnknownVertex => UnknownVertex { .. } => "GRAPH_UNKNOWN_VERTEX",
        /// The edge handle does not refer to a live edge.
        UnknownEdge => UnknownEdge { .. } => "GRAPH_UNKNOWN_EDGE",
        /// An edge was requested between a vertex and itself.
        SelfLoop => SelfLoop { .. } => "GRAPH_SELF_LOOP",
        /// The two vertices are already adjacent.
        DuplicateEdge => DuplicateEdge { .. } => "GRAPH_DUPLICATE_EDGE",
        /// A live edge was missing from an endpoint's adjacency.
        DanglingAdjacency => DanglingAdjacency { .. } => "GRAPH_DANGLING_ADJACENCY",
    }
}

/// Invariant violations that abort an aggregation run.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum AggregationError {
    /// A candidate selected itself as its merge partner.
    #[error("vertex {vertex} was selected as its own merge partner")]
    SelfMerge {
        /// Vertex that attempted to merge with itself.
        vertex: usize,
    },
    /// A vertex was removed from the active set without being a member.
    #[error("vertex {vertex} is not in the active set")]
    ActiveSetUnderflow {
        /// Vertex whose removal was attempted.
        vertex: usize,
    },
    /// A vertex lost a merge for the second time.
    #[error("vertex {vertex} already lost a merge to {previous_winner}")]
    RepeatedLoser {
        /// Vertex recorded twice as loser.
        vertex: usize,
        /// Winner recorded for the first loss.
        previous_winner: usize,
    },
    /// The graph store rejected an operation issued by the driver.
    #[error("graph store failure: {source}")]
    Graph {
        /// Underlying graph error.
        #[from]
        source: GraphError,
    },
}

define_error_codes! {
    /// Stable codes describing [`AggregationError`] variants.
    enum AggregationErrorCode for AggregationError {
        /// A candidate selected itself as its merge partner.
        SelfMerge => SelfMerge { .. } => "AGGREGATION_SELF_MERGE",
        /// A vertex was removed from the active set twice.
        ActiveSetUnderflow => ActiveSetUnderflow { .. } => "AGGREGATION_ACTIVE_SET_UNDERFLOW",
        /// A vertex lost a merge for the second time.
        RepeatedLoser => RepeatedLoser { .. } => "AGGREGATION_REPEATED_LOSER",
        /// The graph store rejected an operation.
        Graph => Graph { .. } => "AGGREGATION_GRAPH_FAILURE",
    }
}

/// Errors raised while deriving a partition from a merge hierarchy.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ClusterError {
    /// A vertex was assigned to more than one cluster.
    #[error("vertex {vertex} appears in more than one cluster")]
    Overlap {
        /// Vertex assigned twice.
        vertex: usize,
    },
    /// A vertex was not assigned to any cluster.
    #[error("vertex {vertex} is not assigned to any cluster")]
    Unassigned {
        /// Vertex missing from every cluster.
        vertex: usize,
    },
    /// A cluster referenced a vertex outside the universe.
    #[error("cluster references vertex {vertex} but only {vertex_count} vertices exist")]
    VertexOutOfRange {
        /// Out-of-range vertex index.
        vertex: usize,
        /// Size of the vertex universe.
        vertex_count: usize,
    },
    /// A level mapping disagreed with the partition it was applied to.
    #[error("level mapping targets {mapped} vertices but the partition covers {vertex_count}")]
    MappingMismatch {
        /// Number of vertices addressed by the mapping.
        mapped: usize,
        /// Number of vertices covered by the partition.
        vertex_count: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`ClusterError`] variants.
    enum ClusterErrorCode for ClusterError {
        /// A vertex was assigned to more than one cluster.
        Overlap => Overlap { .. } => "CLUSTER_OVERLAP",
        /// A vertex was not assigned to any cluster.
        Unassigned => Unassigned { .. } => "CLUSTER_UNASSIGNED",
        /// A cluster referenced a vertex outside the universe.
        VertexOutOfRange => VertexOutOfRange { .. } => "CLUSTER_VERTEX_OUT_OF_RANGE",
        /// A level mapping disagreed with the partition.
        MappingMismatch => MappingMismatch { .. } => "CLUSTER_MAPPING_MISMATCH",
    }
}

/// Errors raised while scoring a partition.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ScoringError {
    /// The scored result and the ground truth cover different element sets.
    #[error(
        "result and ground truth cover different elements: {result_only} only in result, \
         {truth_only} only in ground truth"
    )]
    UniqueElementMismatch {
        /// Elements present in the result but absent from the ground truth.
        result_only: usize,
        /// Elements present in the ground truth but absent from the result.
        truth_only: usize,
    },
    /// The partition and edge list describe different vertex universes.
    #[error("partition covers {partition} vertices but the edge list has {edge_list}")]
    UniverseMismatch {
        /// Vertices covered by the partition.
        partition: usize,
        /// Vertices declared by the edge list.
        edge_list: usize,
    },
    /// Neither side had any element to compare.
    #[error("nothing to score: result and ground truth are both empty")]
    EmptyPartition,
}

define_error_codes! {
    /// Stable codes describing [`ScoringError`] variants.
    enum ScoringErrorCode for ScoringError {
        /// Result and ground truth cover different elements.
        UniqueElementMismatch => UniqueElementMismatch { .. } => "SCORING_UNIQUE_ELEMENT_MISMATCH",
        /// Partition and edge list describe different universes.
        UniverseMismatch => UniverseMismatch { .. } => "SCORING_UNIVERSE_MISMATCH",
        /// Nothing to compare.
        EmptyPartition => EmptyPartition => "SCORING_EMPTY_PARTITION",
    }
}

/// Error type produced when configuring or running a [`crate::Pipeline`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum AgglomError {
    /// The configured number of levels was zero.
    #[error("levels must be at least 1 (got {got})")]
    InvalidLevels {
        /// The invalid level count supplied by the caller.
        got: usize,
    },
    /// Ground truth and edge list were built for different vertex counts.
    #[error("ground truth covers {truth} vertices but the edge list has {graph}")]
    TruthUniverseMismatch {
        /// Vertex count the ground truth was validated against.
        truth: usize,
        /// Vertex count of the edge list.
        graph: usize,
    },
    /// Input validation failed.
    #[error("invalid input: {source}")]
    Input {
        /// Underlying input error.
        #[from]
        source: InputError,
    },
    /// The graph store could not be built from the edge list.
    #[error("graph construction failed: {source}")]
    Graph {
        /// Underlying graph error.
        #[from]
        source: GraphError,
    },
    /// A merge heuristic violated an invariant.
    #[error("heuristic `{heuristic}` failed at level {level}: {error}")]
    Aggregation {
        /// Heuristic that was running.
        heuristic: Heuristic,
        /// Coarsening level being clustered.
        level: usize,
        #[source]
        /// Underlying invariant violation.
        error: AggregationError,
    },
    /// The merge hierarchy did not yield a valid partition.
    #[error("cluster construction failed at level {level}: {error}")]
    Cluster {
        /// Coarsening level being clustered.
        level: usize,
        #[source]
        /// Underlying partition error.
        error: ClusterError,
    },
    /// Modularity could not be computed.
    #[error("scoring failed at level {level}: {error}")]
    Scoring {
        /// Coarsening level being scored.
        level: usize,
        #[source]
        /// Underlying scoring error.
        error: ScoringError,
    },
}

define_error_codes! {
    /// Stable codes describing [`AgglomError`] variants.
    enum AgglomErrorCode for AgglomError {
        /// The configured number of levels was zero.
        InvalidLevels => InvalidLevels { .. } => "AGGLOM_INVALID_LEVELS",
        /// Ground truth and edge list were built for different vertex counts.
        TruthUniverseMismatch => TruthUniverseMismatch { .. } => "AGGLOM_TRUTH_UNIVERSE_MISMATCH",
        /// Input validation failed.
        Input => Input { .. } => "AGGLOM_INPUT_FAILURE",
        /// The graph store could not be built.
        Graph => Graph { .. } => "AGGLOM_GRAPH_FAILURE",
        /// A merge heuristic violated an invariant.
        Aggregation => Aggregation { .. } => "AGGLOM_AGGREGATION_FAILURE",
        /// The merge hierarchy did not yield a valid partition.
        Cluster => Cluster { .. } => "AGGLOM_CLUSTER_FAILURE",
        /// Modularity could not be computed.
        Scoring => Scoring { .. } => "AGGLOM_SCORING_FAILURE",
    }
}

impl AgglomError {
    /// Retrieve the inner [`AggregationErrorCode`] when a heuristic aborted.
    #[must_use]
    pub const fn aggregation_code(&self) -> Option<AggregationErrorCode> {
        match self {
            Self::Aggregation { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Retrieve the inner [`InputErrorCode`] when input validation failed.
    #[must_use]
    pub const fn input_code(&self) -> Option<InputErrorCode> {
        match self {
            Self::Input { source } => Some(source.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, AgglomError>;
