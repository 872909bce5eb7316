//! Small graphs with known structure, as plain vertex counts and index pairs.

/// A graph together with its ground-truth communities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    /// Number of vertices.
    pub vertex_count: usize,
    /// Undirected edges, each listed once.
    pub edges: Vec<(usize, usize)>,
    /// Ground-truth communities.
    pub communities: Vec<Vec<usize>>,
}

/// Triangle 0-1-2 bridged through 2-3 to triangle 3-4-5, with ground truth
/// `{0, 1, 2, 3}` and `{4, 5}`.
///
/// # Examples
/// ```
/// use agglom_test_support::fixtures::six_vertex_scenario;
///
/// let scenario = six_vertex_scenario();
/// assert_eq!(scenario.vertex_count, 6);
/// assert_eq!(scenario.edges.len(), 7);
/// ```
#[must_use]
pub fn six_vertex_scenario() -> Scenario {
    Scenario {
        vertex_count: 6,
        edges: vec![(0, 1), (0, 2), (1, 2), (2, 3), (3, 4), (3, 5), (4, 5)],
        communities: vec![vec![0, 1, 2, 3], vec![4, 5]],
    }
}

/// `cliques` complete graphs of `size` vertices each, joined in a ring by a
/// single edge from the last vertex of one clique to the first of the next.
/// Each clique is one ground-truth community.
///
/// # Examples
/// ```
/// use agglom_test_support::fixtures::ring_of_cliques;
///
/// let ring = ring_of_cliques(3, 4);
/// assert_eq!(ring.vertex_count, 12);
/// assert_eq!(ring.edges.len(), 3 * 6 + 3);
/// ```
#[must_use]
pub fn ring_of_cliques(cliques: usize, size: usize) -> Scenario {
    let mut edges = Vec::new();
    let mut communities = Vec::with_capacity(cliques);
    for clique in 0..cliques {
        let base = clique * size;
        for left in base..base + size {
            for right in left + 1..base + size {
                edges.push((left, right));
            }
        }
        communities.push((base..base + size).collect());
    }
    if cliques > 1 && size > 0 {
        for clique in 0..cliques {
            let from = clique * size + size - 1;
            let to = ((clique + 1) % cliques) * size;
            let bridge = (from.min(to), from.max(to));
            // Single-vertex cliques in a pair would bridge twice.
            if !edges.contains(&bridge) {
                edges.push(bridge);
            }
        }
    }
    Scenario {
        vertex_count: cliques * size,
        edges,
        communities,
    }
}
