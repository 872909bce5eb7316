//! Sampling and extremum helpers shared by the selection policies.

use rand::{
    Rng,
    distributions::{Distribution, WeightedIndex},
};
use tracing::debug;

/// Draws an index with probability proportional to `weights`.
///
/// Falls back to a uniform draw when the weights do not form a distribution
/// (all zero, or not finite). Returns `None` only for an empty slice.
pub(crate) fn proportional<R: Rng>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    match WeightedIndex::new(weights) {
        Ok(distribution) => Some(distribution.sample(rng)),
        Err(error) => {
            debug!(
                items = weights.len(),
                %error,
                "degenerate distribution, falling back to uniform selection"
            );
            Some(rng.gen_range(0..weights.len()))
        }
    }
}

/// Position of the first largest score.
pub(crate) fn first_max<T: PartialOrd + Copy>(scores: &[T]) -> Option<usize> {
    first_extreme(scores, |score, best| score > best)
}

/// Position of the first smallest score.
pub(crate) fn first_min<T: PartialOrd + Copy>(scores: &[T]) -> Option<usize> {
    first_extreme(scores, |score, best| score < best)
}

fn first_extreme<T: PartialOrd + Copy>(
    scores: &[T],
    better: impl Fn(T, T) -> bool,
) -> Option<usize> {
    let mut iter = scores.iter().copied().enumerate();
    let (mut best_position, mut best) = iter.next()?;
    for (position, score) in iter {
        if better(score, best) {
            best_position = position;
            best = score;
        }
    }
    Some(best_position)
}
