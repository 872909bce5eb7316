//! Newman modularity of a partition over an undirected edge list.

use crate::{clusters::Partition, error::ScoringError, input::EdgeList};

/// Per-cluster endpoint tallies.
#[derive(Clone, Copy, Debug, Default)]
struct Endpoints {
    intra: u64,
    inter: u64,
}

/// Computes the modularity `Q` of `partition` over `edges`.
///
/// Each edge inside a cluster contributes two internal endpoints; an edge
/// between clusters contributes one external endpoint to each side. An edge
/// list without edges scores `0.0`.
///
/// # Errors
/// Returns [`ScoringError::UniverseMismatch`] when the partition covers a
/// different number of vertices than the edge list.
///
/// # Examples
/// ```
/// use agglom_core::{EdgeList, Partition, modularity};
///
/// let edges = EdgeList::new(3, vec![(0, 1), (1, 2), (0, 2)]).expect("valid");
/// let whole = Partition::new(3, vec![vec![0, 1, 2]]).expect("valid");
/// assert_eq!(modularity(&edges, &whole).expect("same universe"), 0.0);
/// ```
#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "modularity is a ratio of endpoint counts"
)]
pub fn modularity(edges: &EdgeList, partition: &Partition) -> Result<f64, ScoringError> {
    if partition.vertex_count() != edges.vertex_count() {
        return Err(ScoringError::UniverseMismatch {
            partition: partition.vertex_count(),
            edge_list: edges.vertex_count(),
        });
    }
    if edges.edge_count() == 0 {
        return Ok(0.0);
    }

    let labels = partition.labels();
    let mut tallies = vec![Endpoints::default(); partition.cluster_count()];
    for &(from, to) in edges.edges() {
        let (Some(&left), Some(&right)) = (labels.get(from), labels.get(to)) else {
            continue;
        };
        if left == right {
            if let Some(tally) = tallies.get_mut(left) {
                tally.intra += 2;
            }
        } else {
            for cluster in [left, right] {
                if let Some(tally) = tallies.get_mut(cluster) {
                    tally.inter += 1;
                }
            }
        }
    }

    let total = 2.0 * edges.edge_count() as f64;
    Ok(tallies
        .iter()
        .map(|tally| {
            let internal = tally.intra as f64 / total;
            let degree = (tally.intra + tally.inter) as f64 / total;
            internal - degree * degree
        })
        .sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn two_triangles() -> EdgeList {
        EdgeList::new(
            6,
            vec![(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)],
        )
        .expect("valid edge list")
    }

    #[rstest]
    fn single_cluster_scores_zero() {
        let edges = two_triangles();
        let whole = Partition::new(6, vec![(0..6).collect()]).expect("valid partition");
        assert_eq!(modularity(&edges, &whole).expect("same universe"), 0.0);
    }

    #[rstest]
    fn natural_split_scores_closed_form() {
        let edges = two_triangles();
        let split = Partition::new(6, vec![vec![0, 1, 2], vec![3, 4, 5]]).expect("valid partition");
        // Each side: 6 internal endpoints and 1 external over 2m = 14.
        let side = 6.0 / 14.0 - (7.0_f64 / 14.0).powi(2);
        let score = modularity(&edges, &split).expect("same universe");
        assert!((score - 2.0 * side).abs() < 1e-12);
    }

    #[rstest]
    fn empty_edge_list_scores_zero() {
        let edges = EdgeList::new(3, Vec::new()).expect("valid edge list");
        let score = modularity(&edges, &Partition::singletons(3)).expect("same universe");
        assert_eq!(score, 0.0);
    }

    #[rstest]
    fn mismatched_universe_is_rejected() {
        assert_eq!(
            modularity(&two_triangles(), &Partition::singletons(4)),
            Err(ScoringError::UniverseMismatch {
                partition: 4,
                edge_list: 6,
            })
        );
    }
}
