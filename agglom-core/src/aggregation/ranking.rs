//! Candidate scores maintained across merges.
//!
//! Score-driven candidate policies keep the score of every active vertex in a
//! [`Ranking`]. Proportional draws walk a Fenwick tree and maximum draws read
//! the top score bucket, so each draw costs `O(log V)`. After a merge the
//! driver refreshes only the vertices whose degree or weight moved.

use std::collections::BTreeMap;

use rand::Rng;

use super::heuristic::CandidatePolicy;
use crate::graph::VertexId;

/// Active candidate scores for a non-uniform candidate policy.
#[derive(Clone, Debug)]
pub(crate) enum Ranking {
    /// Draws with probability proportional to score.
    Proportional(WeightTree),
    /// Draws uniformly among the highest scores.
    Max(ScoreBuckets),
}

impl Ranking {
    /// Ranks `scores`, indexed by vertex. Uniform policies need no ranking.
    pub(crate) fn for_policy(policy: CandidatePolicy, scores: Vec<u64>) -> Option<Self> {
        match policy {
            CandidatePolicy::Uniform => None,
            CandidatePolicy::ProportionalToDegree | CandidatePolicy::ProportionalToWeight => {
                Some(Self::Proportional(WeightTree::new(scores)))
            }
            CandidatePolicy::MaxDegree | CandidatePolicy::MaxWeight => {
                Some(Self::Max(ScoreBuckets::new(scores)))
            }
        }
    }

    /// Replaces the score of an active `vertex`.
    pub(crate) fn set(&mut self, vertex: VertexId, score: u64) {
        match self {
            Self::Proportional(tree) => tree.set(vertex.index(), score),
            Self::Max(buckets) => buckets.set(vertex, score),
        }
    }

    /// Drops `vertex` from every future draw.
    pub(crate) fn remove(&mut self, vertex: VertexId) {
        match self {
            Self::Proportional(tree) => tree.set(vertex.index(), 0),
            Self::Max(buckets) => buckets.remove(vertex),
        }
    }

    /// Draws a vertex; `None` when no ranked vertex has a positive share.
    pub(crate) fn pick<R: Rng>(&self, rng: &mut R) -> Option<VertexId> {
        match self {
            Self::Proportional(tree) => tree.sample(rng).map(VertexId::new),
            Self::Max(buckets) => buckets.pick_max(rng),
        }
    }

    #[cfg(test)]
    pub(crate) fn score(&self, vertex: VertexId) -> Option<u64> {
        match self {
            Self::Proportional(tree) => tree.value(vertex.index()),
            Self::Max(buckets) => buckets.score(vertex),
        }
    }
}

/// Fenwick tree of non-negative integer weights.
#[derive(Clone, Debug)]
pub(crate) struct WeightTree {
    values: Vec<u64>,
    // One-based partial sums; slot zero is unused.
    nodes: Vec<u64>,
    total: u64,
}

impl WeightTree {
    pub(crate) fn new(values: Vec<u64>) -> Self {
        let mut tree = Self {
            values: vec![0; values.len()],
            nodes: vec![0; values.len() + 1],
            total: 0,
        };
        for (index, value) in values.into_iter().enumerate() {
            tree.set(index, value);
        }
        tree
    }

    pub(crate) fn set(&mut self, index: usize, value: u64) {
        let Some(slot) = self.values.get_mut(index) else {
            return;
        };
        let previous = std::mem::replace(slot, value);
        if value >= previous {
            let delta = value - previous;
            self.total = self.total.saturating_add(delta);
            self.walk(index, |node| node.saturating_add(delta));
        } else {
            let delta = previous - value;
            self.total = self.total.saturating_sub(delta);
            self.walk(index, |node| node.saturating_sub(delta));
        }
    }

    #[cfg(test)]
    pub(crate) fn value(&self, index: usize) -> Option<u64> {
        self.values.get(index).copied()
    }

    #[cfg(test)]
    pub(crate) const fn total(&self) -> u64 {
        self.total
    }

    /// Index drawn with probability `value / total`; `None` for a zero total.
    pub(crate) fn sample<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        if self.total == 0 || self.values.is_empty() {
            return None;
        }
        let mut remaining = rng.gen_range(0..self.total);
        let mut position = 0_usize;
        let mut step = 1_usize << (usize::BITS - 1 - self.values.len().leading_zeros());
        while step > 0 {
            let next = position + step;
            if let Some(&node) = self.nodes.get(next)
                && node <= remaining
            {
                position = next;
                remaining -= node;
            }
            step >>= 1;
        }
        Some(position)
    }

    fn walk(&mut self, index: usize, update: impl Fn(u64) -> u64) {
        let mut node = index + 1;
        while let Some(slot) = self.nodes.get_mut(node) {
            *slot = update(*slot);
            node += node & node.wrapping_neg();
        }
    }
}

/// Active vertices grouped by score.
#[derive(Clone, Debug, Default)]
pub(crate) struct ScoreBuckets {
    buckets: BTreeMap<u64, Vec<VertexId>>,
    // Score and bucket position of each ranked vertex.
    slots: Vec<Option<(u64, usize)>>,
}

impl ScoreBuckets {
    pub(crate) fn new(scores: Vec<u64>) -> Self {
        let mut buckets = Self {
            buckets: BTreeMap::new(),
            slots: vec![None; scores.len()],
        };
        for (index, score) in scores.into_iter().enumerate() {
            buckets.insert(VertexId::new(index), score);
        }
        buckets
    }

    pub(crate) fn set(&mut self, vertex: VertexId, score: u64) {
        if self.score(vertex) == Some(score) {
            return;
        }
        self.remove(vertex);
        self.insert(vertex, score);
    }

    pub(crate) fn remove(&mut self, vertex: VertexId) {
        let Some((score, position)) = self
            .slots
            .get_mut(vertex.index())
            .and_then(Option::take)
        else {
            return;
        };
        let Some(bucket) = self.buckets.get_mut(&score) else {
            return;
        };
        if position < bucket.len() {
            bucket.swap_remove(position);
        }
        if let Some(&moved) = bucket.get(position)
            && let Some(slot) = self.slots.get_mut(moved.index())
        {
            *slot = Some((score, position));
        }
        if bucket.is_empty() {
            self.buckets.remove(&score);
        }
    }

    /// Uniform draw among the vertices holding the highest score.
    pub(crate) fn pick_max<R: Rng>(&self, rng: &mut R) -> Option<VertexId> {
        let (_, bucket) = self.buckets.last_key_value()?;
        if bucket.is_empty() {
            return None;
        }
        bucket.get(rng.gen_range(0..bucket.len())).copied()
    }

    pub(crate) fn score(&self, vertex: VertexId) -> Option<u64> {
        self.slots
            .get(vertex.index())
            .copied()
            .flatten()
            .map(|(score, _)| score)
    }

    fn insert(&mut self, vertex: VertexId, score: u64) {
        let Some(slot) = self.slots.get_mut(vertex.index()) else {
            return;
        };
        let bucket = self.buckets.entry(score).or_default();
        *slot = Some((score, bucket.len()));
        bucket.push(vertex);
    }
}
