//! Integration tests for reading edge lists and ground truth from text.
use std::io::Cursor;

use agglom_core::{InputError, InputErrorCode};
use agglom_providers_edgelist::{EdgeListProviderError, EdgeListSource, read_ground_truth};
use rstest::rstest;

#[rstest]
#[case::tabs("4\t3\n0\t1\n1\t2\n2\t3\n")]
#[case::comments_and_blanks("# generated\n4\t3\n\n0\t1\n# middle\n1\t2\n2\t3\n\n")]
#[case::crlf("4\t3\r\n0\t1\r\n1\t2\r\n2\t3\r\n")]
#[case::spaces("4 3\n0 1\n1 2\n2 3\n")]
fn reads_single_file_edge_lists(#[case] text: &str) {
    let source = EdgeListSource::try_from_reader("demo", Cursor::new(text))
        .expect("edge list must parse");
    assert_eq!(source.name(), "demo");
    assert_eq!(source.edges().vertex_count(), 4);
    assert_eq!(source.edges().edges(), &[(0, 1), (1, 2), (2, 3)]);
    assert_eq!(source.original_id(0), None);
}

#[rstest]
fn isolated_vertices_come_from_the_header() {
    let source = EdgeListSource::try_from_reader("demo", Cursor::new("5\t1\n0\t1\n"))
        .expect("edge list must parse");
    assert_eq!(source.into_edges().vertex_count(), 5);
}

#[rstest]
#[case::too_few_edges("3\t3\n0\t1\n1\t2\n")]
#[case::too_many_edges("3\t1\n0\t1\n1\t2\n")]
#[case::vertex_past_header("2\t1\n0\t5\n")]
fn checksum_mismatches_are_reported(#[case] text: &str) {
    let err = EdgeListSource::try_from_reader("demo", Cursor::new(text))
        .expect_err("checksum must fail");
    assert_eq!(err.input_code(), Some(InputErrorCode::ChecksumMismatch));
}

#[rstest]
fn self_loops_are_rejected() {
    let err = EdgeListSource::try_from_reader("demo", Cursor::new("3\t1\n2\t2\n"))
        .expect_err("self-loop must fail");
    assert!(matches!(
        err,
        EdgeListProviderError::Input(InputError::SelfLoop { vertex: 2, .. })
    ));
}

#[rstest]
fn duplicate_edges_are_rejected() {
    let err = EdgeListSource::try_from_reader("demo", Cursor::new("3\t2\n0\t1\n1\t0\n"))
        .expect_err("duplicate must fail");
    assert_eq!(err.input_code(), Some(InputErrorCode::DuplicateEdge));
}

#[rstest]
#[case::empty("")]
#[case::only_comments("# nothing here\n\n")]
fn missing_header_is_reported(#[case] text: &str) {
    let err = EdgeListSource::try_from_reader("demo", Cursor::new(text))
        .expect_err("header is required");
    assert!(matches!(err, EdgeListProviderError::MissingHeader));
}

#[rstest]
fn malformed_records_carry_line_numbers() {
    let err = EdgeListSource::try_from_reader("demo", Cursor::new("3\t2\n0\t1\n1\t2\t9\n"))
        .expect_err("three tokens must fail");
    match err {
        EdgeListProviderError::MalformedRecord { line, content } => {
            assert_eq!(line, 3);
            assert_eq!(content, "1\t2\t9");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn non_numeric_tokens_are_reported() {
    let err = EdgeListSource::try_from_reader("demo", Cursor::new("3\t1\n0\tx\n"))
        .expect_err("token must fail");
    assert!(matches!(
        err,
        EdgeListProviderError::InvalidIndex { line: 2, ref token, .. } if token == "x"
    ));
}

#[rstest]
fn split_files_map_original_ids() {
    let source = EdgeListSource::try_from_parts(
        "split",
        Cursor::new("3\t2\n0\t40\n2\t42\n"),
        Cursor::new("0\t1\n1\t2\n"),
    )
    .expect("edge list must parse");
    assert_eq!(source.original_id(0), Some(40));
    assert_eq!(source.original_id(1), None);
    assert_eq!(source.original_id(2), Some(42));
    assert_eq!(source.edges().edge_count(), 2);
}

#[rstest]
fn split_files_reject_repeated_mappings() {
    let err = EdgeListSource::try_from_parts(
        "split",
        Cursor::new("2\t1\n0\t7\n0\t8\n"),
        Cursor::new("0\t1\n"),
    )
    .expect_err("repeated mapping must fail");
    assert!(matches!(
        err,
        EdgeListProviderError::DuplicateMapping {
            line: 3,
            vertex: 0,
            original: 7,
        }
    ));
}

#[rstest]
fn split_files_reject_mappings_beyond_the_header() {
    let err = EdgeListSource::try_from_parts(
        "split",
        Cursor::new("2\t1\n5\t7\n"),
        Cursor::new("0\t1\n"),
    )
    .expect_err("mapping past the vertex count must fail");
    assert!(matches!(
        err,
        EdgeListProviderError::MalformedRecord { line: 2, .. }
    ));
}

#[rstest]
fn ground_truth_reads_one_community_per_line() {
    let truth = read_ground_truth(Cursor::new("0\t1\t2\t3\n\n4\t5\n"), 6)
        .expect("truth must parse");
    assert_eq!(truth.communities(), &[vec![0, 1, 2, 3], vec![4, 5]]);
    assert!(truth.excluded().is_empty());
}

#[rstest]
fn ground_truth_rejects_foreign_vertices() {
    let err = read_ground_truth(Cursor::new("0\t1\n2\t9\n"), 4).expect_err("9 is out of range");
    assert_eq!(err.input_code(), Some(InputErrorCode::TruthVertexOutOfRange));
}
