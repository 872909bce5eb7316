//! Cluster builder: turns an aggregation outcome into a disjoint partition.
//!
//! Destructive heuristics yield one cluster per winner made of the winner and
//! everything it absorbed. Retentive heuristics yield the connected components
//! of the merge hierarchy.

use std::collections::HashSet;

use crate::{
    aggregation::{AggregationOutcome, MergeMode},
    coarsen::LevelMapping,
    error::ClusterError,
};

/// Disjoint clusters covering every vertex in `[0, vertex_count)`.
///
/// # Examples
/// ```
/// use agglom_core::Partition;
///
/// let partition = Partition::new(4, vec![vec![0, 1], vec![2], vec![3]]).expect("valid");
/// assert_eq!(partition.cluster_count(), 3);
/// assert_eq!(partition.labels(), vec![0, 0, 1, 2]);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Partition {
    vertex_count: usize,
    clusters: Vec<Vec<usize>>,
}

impl Partition {
    /// Validates that `clusters` partition `[0, vertex_count)`.
    ///
    /// Empty clusters are discarded.
    ///
    /// # Errors
    /// Returns [`ClusterError::VertexOutOfRange`], [`ClusterError::Overlap`]
    /// or [`ClusterError::Unassigned`] when the clusters are not a partition.
    pub fn new(vertex_count: usize, clusters: Vec<Vec<usize>>) -> Result<Self, ClusterError> {
        let mut assigned = vec![false; vertex_count];
        for &vertex in clusters.iter().flatten() {
            let slot = assigned
                .get_mut(vertex)
                .ok_or(ClusterError::VertexOutOfRange {
                    vertex,
                    vertex_count,
                })?;
            if *slot {
                return Err(ClusterError::Overlap { vertex });
            }
            *slot = true;
        }
        if let Some(vertex) = assigned.iter().position(|&seen| !seen) {
            return Err(ClusterError::Unassigned { vertex });
        }
        Ok(Self {
            vertex_count,
            clusters: clusters
                .into_iter()
                .filter(|cluster| !cluster.is_empty())
                .collect(),
        })
    }

    /// One cluster per vertex.
    #[must_use]
    pub fn singletons(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            clusters: (0..vertex_count).map(|vertex| vec![vertex]).collect(),
        }
    }

    /// Derives the partition implied by a finished aggregation run.
    ///
    /// # Errors
    /// Returns [`ClusterError`] when the outcome does not cover every vertex
    /// exactly once.
    pub fn from_outcome(outcome: &AggregationOutcome) -> Result<Self, ClusterError> {
        let vertex_count = outcome.graph().vertex_count();
        let clusters = match outcome.mode() {
            MergeMode::Destructive => outcome
                .winners()
                .iter()
                .map(|&winner| {
                    let mut cluster = vec![winner.index()];
                    if let Ok(record) = outcome.graph().vertex(winner) {
                        cluster.extend(record.absorbed().iter().map(|vertex| vertex.index()));
                    }
                    cluster
                })
                .collect(),
            MergeMode::Retentive => outcome.hierarchy().components(),
        };
        Self::new(vertex_count, clusters)
    }

    /// Size of the vertex universe.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Non-empty clusters; the position of a cluster is its id.
    #[must_use]
    pub fn clusters(&self) -> &[Vec<usize>] {
        &self.clusters
    }

    /// Number of clusters.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Cluster id per vertex.
    #[must_use]
    pub fn labels(&self) -> Vec<usize> {
        let mut labels = vec![0; self.vertex_count];
        for (cluster, members) in self.clusters.iter().enumerate() {
            for &vertex in members {
                if let Some(slot) = labels.get_mut(vertex) {
                    *slot = cluster;
                }
            }
        }
        labels
    }

    /// Clusters with `excluded` vertices removed and emptied clusters dropped,
    /// ready for pairwise comparison against ground truth.
    #[must_use]
    pub fn scored(&self, excluded: &[usize]) -> Vec<Vec<usize>> {
        let excluded: HashSet<usize> = excluded.iter().copied().collect();
        self.clusters
            .iter()
            .map(|cluster| {
                cluster
                    .iter()
                    .copied()
                    .filter(|vertex| !excluded.contains(vertex))
                    .collect::<Vec<_>>()
            })
            .filter(|cluster| !cluster.is_empty())
            .collect()
    }

    /// Expands a partition of coarsened vertices back onto original vertices.
    ///
    /// `mapping` sends each original vertex to the coarsened vertex it was
    /// collapsed into; every original vertex joins the cluster of its image.
    ///
    /// # Errors
    /// Returns [`ClusterError::MappingMismatch`] when the mapping targets a
    /// different number of vertices than this partition covers.
    pub fn project(&self, mapping: &LevelMapping) -> Result<Self, ClusterError> {
        if mapping.target_count() != self.vertex_count {
            return Err(ClusterError::MappingMismatch {
                mapped: mapping.target_count(),
                vertex_count: self.vertex_count,
            });
        }
        let labels = self.labels();
        let mut clusters = vec![Vec::new(); self.clusters.len()];
        for (original, &image) in mapping.images().iter().enumerate() {
            let cluster = labels
                .get(image)
                .and_then(|&label| clusters.get_mut(label))
                .ok_or(ClusterError::VertexOutOfRange {
                    vertex: image,
                    vertex_count: self.vertex_count,
                })?;
            cluster.push(original);
        }
        Self::new(mapping.source_count(), clusters)
    }

    /// Summarises cluster sizes: clusters above three members are listed,
    /// smaller ones only counted.
    #[must_use]
    pub fn size_summary(&self) -> SizeSummary {
        let mut summary = SizeSummary::default();
        for (cluster, members) in self.clusters.iter().enumerate() {
            match members.len() {
                0 => {}
                1 => summary.singletons += 1,
                2 | 3 => summary.small += 1,
                size => summary.large.push((cluster, size)),
            }
        }
        summary
    }
}

/// Cluster-size report for one partition.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SizeSummary {
    /// `(cluster id, size)` for every cluster with more than three members.
    pub large: Vec<(usize, usize)>,
    /// Number of clusters with two or three members.
    pub small: usize,
    /// Number of single-vertex clusters.
    pub singletons: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::overlap(vec![vec![0, 1], vec![1, 2]], ClusterError::Overlap { vertex: 1 })]
    #[case::missing(vec![vec![0], vec![2]], ClusterError::Unassigned { vertex: 1 })]
    #[case::out_of_range(
        vec![vec![0, 1, 2, 3]],
        ClusterError::VertexOutOfRange { vertex: 3, vertex_count: 3 }
    )]
    fn new_rejects_non_partitions(
        #[case] clusters: Vec<Vec<usize>>,
        #[case] expected: ClusterError,
    ) {
        assert_eq!(Partition::new(3, clusters), Err(expected));
    }

    #[rstest]
    fn scored_drops_excluded_vertices_and_empty_clusters() {
        let partition =
            Partition::new(5, vec![vec![0, 1], vec![2], vec![3, 4]]).expect("valid partition");
        assert_eq!(partition.scored(&[2, 4]), vec![vec![0, 1], vec![3]]);
    }

    #[rstest]
    fn size_summary_buckets_clusters() {
        let partition = Partition::new(
            10,
            vec![vec![0, 1, 2, 3, 4], vec![5, 6], vec![7, 8], vec![9]],
        )
        .expect("valid partition");
        assert_eq!(
            partition.size_summary(),
            SizeSummary {
                large: vec![(0, 5)],
                small: 2,
                singletons: 1,
            }
        );
    }

    #[rstest]
    fn project_expands_coarse_clusters() {
        // Originals 0..6 collapsed onto three super-vertices.
        let mapping = LevelMapping::identity(6)
            .compose(&[0, 0, 1, 1, 2, 2], 3)
            .expect("mapping is consistent");
        let coarse = Partition::new(3, vec![vec![0, 2], vec![1]]).expect("valid partition");
        let projected = coarse.project(&mapping).expect("projection succeeds");
        assert_eq!(projected.vertex_count(), 6);
        assert_eq!(projected.clusters(), &[vec![0, 1, 4, 5], vec![2, 3]]);
    }

    #[rstest]
    fn project_rejects_mismatched_mapping() {
        let coarse = Partition::singletons(2);
        assert_eq!(
            coarse.project(&LevelMapping::identity(3)),
            Err(ClusterError::MappingMismatch {
                mapped: 3,
                vertex_count: 2,
            })
        );
    }
}
