use agglom_core::{
    AgglomError, AgglomErrorCode, AggregationError, AggregationErrorCode, ClusterError,
    ClusterErrorCode, GraphError, GraphErrorCode, Heuristic, InputError, InputErrorCode,
    ScoringError, ScoringErrorCode,
};
use rstest::rstest;

#[rstest]
#[case(
    InputError::ChecksumMismatch {
        declared_vertices: 4,
        loaded_vertices: 5,
        declared_edges: 2,
        loaded_edges: 2,
    },
    InputErrorCode::ChecksumMismatch,
)]
#[case(
    InputError::VertexOutOfRange { edge: 0, vertex: 9, vertex_count: 3 },
    InputErrorCode::VertexOutOfRange,
)]
#[case(InputError::SelfLoop { edge: 1, vertex: 2 }, InputErrorCode::SelfLoop)]
#[case(InputError::DuplicateEdge { edge: 3, from: 0, to: 1 }, InputErrorCode::DuplicateEdge)]
#[case(
    InputError::TruthVertexOutOfRange { community: 0, vertex: 7, vertex_count: 4 },
    InputErrorCode::TruthVertexOutOfRange,
)]
fn returns_expected_input_code(#[case] error: InputError, #[case] expected: InputErrorCode) {
    assert_eq!(error.code(), expected);
    assert!(error.code().as_str().starts_with("INPUT_"));
}

#[rstest]
#[case(GraphError::UnknownVertex { vertex: 4, vertex_count: 2 }, GraphErrorCode::UnknownVertex)]
#[case(GraphError::UnknownEdge { edge: 1 }, GraphErrorCode::UnknownEdge)]
#[case(GraphError::SelfLoop { vertex: 0 }, GraphErrorCode::SelfLoop)]
#[case(GraphError::DuplicateEdge { from: 0, to: 1 }, GraphErrorCode::DuplicateEdge)]
#[case(GraphError::DanglingAdjacency { edge: 2, vertex: 1 }, GraphErrorCode::DanglingAdjacency)]
fn returns_expected_graph_code(#[case] error: GraphError, #[case] expected: GraphErrorCode) {
    assert_eq!(error.code(), expected);
    assert!(error.code().as_str().starts_with("GRAPH_"));
}

#[rstest]
#[case(AggregationError::SelfMerge { vertex: 3 }, AggregationErrorCode::SelfMerge)]
#[case(
    AggregationError::ActiveSetUnderflow { vertex: 1 },
    AggregationErrorCode::ActiveSetUnderflow,
)]
#[case(
    AggregationError::RepeatedLoser { vertex: 1, previous_winner: 0 },
    AggregationErrorCode::RepeatedLoser,
)]
fn returns_expected_aggregation_code(
    #[case] error: AggregationError,
    #[case] expected: AggregationErrorCode,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().to_string(), expected.as_str());
}

#[rstest]
#[case(ClusterError::Overlap { vertex: 1 }, ClusterErrorCode::Overlap)]
#[case(ClusterError::Unassigned { vertex: 2 }, ClusterErrorCode::Unassigned)]
#[case(
    ClusterError::MappingMismatch { mapped: 3, vertex_count: 4 },
    ClusterErrorCode::MappingMismatch,
)]
fn returns_expected_cluster_code(#[case] error: ClusterError, #[case] expected: ClusterErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
#[case(
    ScoringError::UniqueElementMismatch { result_only: 1, truth_only: 0 },
    ScoringErrorCode::UniqueElementMismatch,
)]
#[case(ScoringError::EmptyPartition, ScoringErrorCode::EmptyPartition)]
fn returns_expected_scoring_code(#[case] error: ScoringError, #[case] expected: ScoringErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
#[case(AgglomError::InvalidLevels { got: 0 }, AgglomErrorCode::InvalidLevels, None, None)]
#[case(
    AgglomError::from(InputError::SelfLoop { edge: 0, vertex: 0 }),
    AgglomErrorCode::Input,
    None,
    Some(InputErrorCode::SelfLoop),
)]
#[case(
    AgglomError::Aggregation {
        heuristic: Heuristic::RetainTriangulation,
        level: 1,
        error: AggregationError::SelfMerge { vertex: 0 },
    },
    AgglomErrorCode::Aggregation,
    Some(AggregationErrorCode::SelfMerge),
    None,
)]
#[case(
    AgglomError::Scoring { level: 0, error: ScoringError::EmptyPartition },
    AgglomErrorCode::Scoring,
    None,
    None,
)]
fn returns_expected_agglom_code(
    #[case] error: AgglomError,
    #[case] expected: AgglomErrorCode,
    #[case] aggregation: Option<AggregationErrorCode>,
    #[case] input: Option<InputErrorCode>,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.aggregation_code(), aggregation);
    assert_eq!(error.input_code(), input);
}

#[rstest]
fn aggregation_errors_name_the_heuristic() {
    let error = AgglomError::Aggregation {
        heuristic: Heuristic::GreedyMaxWeight,
        level: 2,
        error: AggregationError::ActiveSetUnderflow { vertex: 5 },
    };
    let message = error.to_string();
    assert!(message.contains("greedy-max-weight"), "{message}");
    assert!(message.contains("level 2"), "{message}");
}
