//! Unit tests for the graph store.

use super::*;
use crate::{
    error::GraphError,
    test_utils::{edge_lists, suite_proptest_config},
};
use proptest::prelude::*;
use rstest::{fixture, rstest};

fn v(index: usize) -> VertexId {
    VertexId::new(index)
}

/// Triangle 0-1-2 with a pendant vertex 3 hanging off 2.
#[fixture]
fn kite() -> Graph {
    let edges = EdgeList::new(4, vec![(0, 1), (0, 2), (1, 2), (2, 3)]).expect("edges are valid");
    Graph::from_edge_list(&edges).expect("graph must build")
}

fn assert_symmetric(graph: &Graph) {
    for vertex in graph.vertices() {
        for entry in vertex.adjacency() {
            let edge = graph.edge(entry.edge).expect("adjacency must reference a live edge");
            assert!(edge.from == vertex.id() || edge.to == vertex.id());
            let back = graph
                .vertex(entry.neighbour)
                .expect("neighbour must exist")
                .adjacency()
                .iter()
                .filter(|other| other.edge == entry.edge)
                .count();
            assert_eq!(back, 1, "edge {} must appear once on the far side", entry.edge.index());
        }
    }
}

#[rstest]
fn from_edge_list_registers_both_endpoints(kite: Graph) {
    assert_eq!(kite.vertex_count(), 4);
    assert_eq!(kite.edge_count(), 4);
    assert_eq!(kite.degree_of(v(2)).expect("vertex exists"), 3);
    assert_eq!(kite.degree_of(v(3)).expect("vertex exists"), 1);
    assert_symmetric(&kite);
}

#[rstest]
fn add_edge_rejects_self_loops_and_duplicates(mut kite: Graph) {
    assert_eq!(
        kite.add_edge(v(1), v(1)),
        Err(GraphError::SelfLoop { vertex: 1 })
    );
    assert_eq!(
        kite.add_edge(v(1), v(0)),
        Err(GraphError::DuplicateEdge { from: 1, to: 0 })
    );
    assert!(matches!(
        kite.add_edge(v(0), v(9)),
        Err(GraphError::UnknownVertex { vertex: 9, .. })
    ));
}

#[rstest]
fn remove_edge_leaves_no_dangling_entries(mut kite: Graph) {
    let edge = kite
        .vertex(v(2))
        .expect("vertex exists")
        .adjacency()
        .iter()
        .find(|entry| entry.neighbour == v(1))
        .map(|entry| entry.edge)
        .expect("edge 1-2 exists");
    let removed = kite.remove_edge(edge).expect("edge is live");
    assert_eq!((removed.from, removed.to), (v(1), v(2)));
    assert_eq!(kite.edge_count(), 3);
    assert!(!kite.are_adjacent(v(1), v(2)).expect("vertices exist"));
    assert!(kite.edge(edge).is_none());
    assert_symmetric(&kite);

    assert_eq!(
        kite.remove_edge(edge),
        Err(GraphError::UnknownEdge {
            edge: edge.index()
        })
    );
}

#[rstest]
fn remove_all_edges_isolates_vertex(mut kite: Graph) {
    let removed = kite.remove_all_edges(v(2)).expect("vertex exists");
    assert_eq!(removed, 3);
    assert_eq!(kite.degree_of(v(2)).expect("vertex exists"), 0);
    assert_eq!(kite.edge_count(), 1);
    assert_symmetric(&kite);
}

#[rstest]
#[case(0, 1, 1)]
#[case(0, 2, 1)]
#[case(2, 3, 0)]
#[case(0, 3, 1)]
fn triangles_between_counts_shared_neighbours(
    kite: Graph,
    #[case] left: usize,
    #[case] right: usize,
    #[case] expected: usize,
) {
    assert_eq!(
        kite.triangles_between(v(left), v(right)).expect("vertices exist"),
        expected
    );
    assert_eq!(
        kite.triangles_between(v(right), v(left)).expect("vertices exist"),
        expected
    );
}

#[rstest]
fn average_clustering_coefficient_matches_hand_count(kite: Graph) {
    // Local coefficients: 1, 1, 1/3, 0.
    let expected = (1.0 + 1.0 + 1.0 / 3.0) / 4.0;
    let actual = kite.average_clustering_coefficient();
    assert!((actual - expected).abs() < 1e-12, "got {actual}");
}

#[rstest]
fn average_clustering_coefficient_of_empty_graph_is_zero() {
    assert_eq!(Graph::default().average_clustering_coefficient(), 0.0);
}

#[rstest]
fn absorb_moves_absorbed_list_and_detaches_loser(mut kite: Graph) {
    kite.absorb(v(2), v(3), false).expect("merge must succeed");
    let removed = kite.absorb(v(0), v(2), true).expect("merge must succeed");
    assert_eq!(removed, 2);

    let winner = kite.vertex(v(0)).expect("vertex exists");
    assert_eq!(winner.absorbed(), &[v(2), v(3)]);
    assert!(!winner.is_absorbed());

    let loser = kite.vertex(v(2)).expect("vertex exists");
    assert_eq!(loser.state(), VertexState::Removed { parent: v(0) });
    assert_eq!(loser.parent(), Some(v(0)));
    assert!(loser.absorbed().is_empty());
    assert_eq!(loser.degree(), 0);
    assert_symmetric(&kite);
}

#[rstest]
fn retain_keeps_edges_and_extends_membership(mut kite: Graph) {
    kite.set_weight(v(0), 2).expect("vertex exists");
    kite.set_weight(v(1), 2).expect("vertex exists");
    kite.set_weight(v(2), 3).expect("vertex exists");
    kite.retain(v(1), v(0), false).expect("merge must succeed");
    kite.retain(v(2), v(1), false).expect("merge must succeed");

    assert_eq!(kite.edge_count(), 4);
    let winner = kite.vertex(v(2)).expect("vertex exists");
    assert_eq!(winner.members(), &[v(1), v(0)]);
    assert_eq!(winner.child_count(), 1);
    assert_eq!(winner.extra_weight(), 4);
    assert_eq!(
        kite.vertex(v(0)).expect("vertex exists").state(),
        VertexState::Retained { parent: v(1) }
    );
}

#[rstest]
fn retain_cycles_never_list_the_representative(mut kite: Graph) {
    kite.retain(v(1), v(0), false).expect("merge must succeed");
    kite.retain(v(0), v(1), false).expect("merge must succeed");
    assert_eq!(
        kite.vertex(v(0)).expect("vertex exists").members(),
        &[v(1)]
    );
    assert!(kite.vertex(v(1)).expect("vertex exists").members().is_empty());

    kite.retain(v(2), v(0), false).expect("merge must succeed");
    kite.retain(v(2), v(1), false).expect("merge must succeed");
    assert_eq!(
        kite.vertex(v(2)).expect("vertex exists").members(),
        &[v(0), v(1)]
    );
}

#[rstest]
fn merging_a_vertex_with_itself_is_rejected(mut kite: Graph) {
    assert_eq!(
        kite.absorb(v(1), v(1), false),
        Err(GraphError::SelfLoop { vertex: 1 })
    );
}

#[rstest]
fn assign_truth_labels_vertices(mut kite: Graph) {
    let truth = GroundTruth::new(4, vec![vec![0, 1], vec![2]]).expect("truth is valid");
    kite.assign_truth(&truth);
    let labels: Vec<Option<usize>> = kite.vertices().map(Vertex::truth_community).collect();
    assert_eq!(labels, vec![Some(0), Some(0), Some(1), None]);
}

proptest! {
    #![proptest_config(suite_proptest_config(64))]

    #[test]
    fn removing_edges_never_leaves_dangling_adjacency(
        (edges, order) in edge_lists(12).prop_flat_map(|edges| {
            let positions: Vec<usize> = (0..edges.edge_count()).collect();
            (Just(edges), Just(positions).prop_shuffle())
        }),
    ) {
        let mut graph = Graph::from_edge_list(&edges).expect("graph must build");
        prop_assert_eq!(graph.edge_count(), edges.edge_count());

        let live: Vec<EdgeId> = graph.edges().map(|edge| edge.id).collect();
        for (removed, position) in order.into_iter().enumerate() {
            graph.remove_edge(live[position]).expect("edge is live");
            prop_assert_eq!(graph.edge_count(), live.len() - removed - 1);
            assert_symmetric(&graph);
        }
        prop_assert!(graph.vertices().all(|vertex| vertex.degree() == 0));
    }
}
