//! Pair-counting agreement (RAND, Jaccard, adjusted RAND) between a result
//! partition and ground-truth communities.
//!
//! The contingency table is accumulated one ground-truth community at a time
//! and only its non-zero cells are held, so memory stays proportional to the
//! largest community rather than to the product of both partition sizes.

use std::collections::{HashMap, HashSet};

use tracing::{Span, field, info, instrument};

use crate::error::ScoringError;

/// Pair counts and the indices derived from them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairwiseScores {
    /// Number of scored element memberships.
    pub elements: usize,
    /// Pairs placed together by both sides.
    pub same_both: u128,
    /// Pairs together in ground truth but split by the result.
    pub same_truth_only: u128,
    /// Pairs together in the result but split by ground truth.
    pub same_result_only: u128,
    /// Pairs split by both sides.
    pub different_both: u128,
    /// RAND index in `[0.0, 1.0]`.
    pub rand: f64,
    /// Jaccard index in `[0.0, 1.0]`.
    pub jaccard: f64,
    /// Adjusted RAND index; `1.0` for identical partitions.
    pub ari: f64,
}

#[derive(Debug, Default)]
struct Marginals {
    elements: u128,
    cell_squares: u128,
    cell_pairs: u128,
    row_squares: u128,
    row_pairs: u128,
    columns: HashMap<usize, u128>,
}

const fn pairs(count: u128) -> u128 {
    count * count.saturating_sub(1) / 2
}

/// Scores `result` clusters against `truth` communities.
///
/// Both sides must mention the same set of elements; callers remove vertices
/// missing from ground truth with [`crate::Partition::scored`] first.
///
/// # Errors
/// Returns [`ScoringError::UniqueElementMismatch`] when the element sets
/// differ and [`ScoringError::EmptyPartition`] when both are empty.
///
/// # Examples
/// ```
/// use agglom_core::pairwise;
///
/// let truth = vec![vec![0, 1, 2], vec![3, 4]];
/// let scores = pairwise(&truth, &truth).expect("same elements");
/// assert_eq!(scores.rand, 1.0);
/// assert_eq!(scores.jaccard, 1.0);
/// assert_eq!(scores.ari, 1.0);
/// ```
#[instrument(
    name = "evaluation.pairwise",
    err,
    skip(truth, result),
    fields(
        communities = truth.len(),
        clusters = result.len(),
        elements = field::Empty,
    ),
)]
pub fn pairwise(
    truth: &[Vec<usize>],
    result: &[Vec<usize>],
) -> Result<PairwiseScores, ScoringError> {
    let cluster_of = check_elements(truth, result)?;
    let marginals = accumulate(truth, &cluster_of);
    let scores = derive_scores(&marginals);
    Span::current().record("elements", scores.elements);
    info!(
        rand = scores.rand,
        jaccard = scores.jaccard,
        ari = scores.ari,
        "pairwise scoring completed"
    );
    Ok(scores)
}

fn check_elements(
    truth: &[Vec<usize>],
    result: &[Vec<usize>],
) -> Result<HashMap<usize, usize>, ScoringError> {
    let mut cluster_of = HashMap::new();
    for (cluster, members) in result.iter().enumerate() {
        for &element in members {
            cluster_of.entry(element).or_insert(cluster);
        }
    }
    let truth_elements: HashSet<usize> = truth.iter().flatten().copied().collect();
    if truth_elements.is_empty() && cluster_of.is_empty() {
        return Err(ScoringError::EmptyPartition);
    }
    let truth_only = truth_elements
        .iter()
        .filter(|element| !cluster_of.contains_key(element))
        .count();
    let result_only = cluster_of
        .keys()
        .filter(|element| !truth_elements.contains(element))
        .count();
    if truth_only > 0 || result_only > 0 {
        return Err(ScoringError::UniqueElementMismatch {
            result_only,
            truth_only,
        });
    }
    Ok(cluster_of)
}

fn accumulate(truth: &[Vec<usize>], cluster_of: &HashMap<usize, usize>) -> Marginals {
    let mut marginals = Marginals::default();
    let mut row: HashMap<usize, u128> = HashMap::new();
    for community in truth {
        row.clear();
        for element in community {
            if let Some(&cluster) = cluster_of.get(element) {
                *row.entry(cluster).or_insert(0) += 1;
            }
        }
        let mut row_sum = 0_u128;
        for (&cluster, &cell) in &row {
            row_sum += cell;
            marginals.cell_squares += cell * cell;
            marginals.cell_pairs += pairs(cell);
            *marginals.columns.entry(cluster).or_insert(0) += cell;
        }
        marginals.elements += row_sum;
        marginals.row_squares += row_sum * row_sum;
        marginals.row_pairs += pairs(row_sum);
    }
    marginals
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "pair-counting indices are ratios of large integer sums"
)]
fn derive_scores(marginals: &Marginals) -> PairwiseScores {
    let column_squares: u128 = marginals.columns.values().map(|&sum| sum * sum).sum();
    let column_pairs: u128 = marginals.columns.values().copied().map(pairs).sum();
    let n = marginals.elements;

    let same_both = marginals.cell_pairs;
    let same_truth_only = marginals.row_squares.saturating_sub(marginals.cell_squares) / 2;
    let same_result_only = column_squares.saturating_sub(marginals.cell_squares) / 2;
    let different_both = (n * n + marginals.cell_squares)
        .saturating_sub(marginals.row_squares + column_squares)
        / 2;

    let agreeing = same_both + different_both;
    let all = agreeing + same_truth_only + same_result_only;
    let rand = ratio_or_one(agreeing, all);
    let jaccard = ratio_or_one(same_both, all - different_both);

    let total = pairs(n) as f64;
    let ari = if total == 0.0 {
        1.0
    } else {
        let rows = marginals.row_pairs as f64;
        let columns = column_pairs as f64;
        let expected = rows * columns / total;
        let denominator = 0.5 * (rows + columns) - expected;
        if denominator == 0.0 {
            1.0
        } else {
            (same_both as f64 - expected) / denominator
        }
    };

    PairwiseScores {
        elements: usize::try_from(n).unwrap_or(usize::MAX),
        same_both,
        same_truth_only,
        same_result_only,
        different_both,
        rand,
        jaccard,
        ari,
    }
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "indices are reported as floating-point ratios"
)]
fn ratio_or_one(numerator: u128, denominator: u128) -> f64 {
    if denominator == 0 {
        1.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const EPSILON: f64 = 1e-12;

    #[rstest]
    #[case::two_communities(vec![vec![0, 1, 2, 3], vec![4, 5]])]
    #[case::singletons(vec![vec![0], vec![1], vec![2]])]
    #[case::single_community(vec![vec![0, 1, 2, 3, 4]])]
    fn identical_partitions_score_one(#[case] truth: Vec<Vec<usize>>) {
        let scores = pairwise(&truth, &truth).expect("same elements");
        assert_eq!(scores.rand, 1.0);
        assert_eq!(scores.jaccard, 1.0);
        assert_eq!(scores.ari, 1.0);
    }

    #[rstest]
    fn pair_counts_cover_every_pair() {
        let truth = vec![vec![0, 1, 2, 3], vec![4, 5]];
        let result = vec![vec![0, 1], vec![2, 3, 4], vec![5]];
        let scores = pairwise(&truth, &result).expect("same elements");
        let total = scores.same_both
            + scores.same_truth_only
            + scores.same_result_only
            + scores.different_both;
        assert_eq!(total, 15);
        assert_eq!(scores.same_both, 2);
        assert_eq!(scores.same_truth_only, 5);
        assert_eq!(scores.same_result_only, 2);
        assert_eq!(scores.different_both, 6);
        assert!((scores.rand - 8.0 / 15.0).abs() < EPSILON);
        assert!((scores.jaccard - 2.0 / 9.0).abs() < EPSILON);
    }

    #[rstest]
    fn singletons_against_communities_have_zero_ari() {
        let truth = vec![vec![0, 1, 2], vec![3, 4, 5]];
        let result: Vec<Vec<usize>> = (0..6).map(|element| vec![element]).collect();
        let scores = pairwise(&truth, &result).expect("same elements");
        assert_eq!(scores.ari, 0.0);
        assert_eq!(scores.same_both, 0);
        assert!((scores.rand - 9.0 / 15.0).abs() < EPSILON);
    }

    #[rstest]
    fn ari_matches_reference_value() {
        // Labels [0,0,0,1,1,1] against [0,0,1,1,2,2].
        let truth = vec![vec![0, 1, 2], vec![3, 4, 5]];
        let result = vec![vec![0, 1], vec![2, 3], vec![4, 5]];
        let scores = pairwise(&truth, &result).expect("same elements");
        assert!((scores.ari - 0.242_424_242_424_242_4).abs() < 1e-9);
    }

    #[rstest]
    fn mismatched_elements_are_reported() {
        let truth = vec![vec![0, 1], vec![2]];
        let result = vec![vec![0, 1, 7]];
        assert_eq!(
            pairwise(&truth, &result),
            Err(ScoringError::UniqueElementMismatch {
                result_only: 1,
                truth_only: 1,
            })
        );
    }

    #[rstest]
    fn empty_inputs_are_rejected() {
        assert_eq!(pairwise(&[], &[]), Err(ScoringError::EmptyPartition));
    }
}
