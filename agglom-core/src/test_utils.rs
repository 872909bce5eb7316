//! Shared test utilities for `agglom-core`.

use agglom_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::{collection::vec, prelude::*, test_runner::Config as ProptestConfig};

use crate::input::EdgeList;

/// Builds a standard proptest configuration from the shared CI profile.
///
/// Keeps property suites aligned on the same `AGGLOM_PBT_CASES` and
/// `AGGLOM_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Simple graphs with up to `max_vertices` vertices.
///
/// Candidate pairs are normalised and deduplicated so every generated list
/// passes [`EdgeList::new`].
pub(crate) fn edge_lists(max_vertices: usize) -> impl Strategy<Value = EdgeList> {
    (1..=max_vertices).prop_flat_map(|vertex_count| {
        vec((0..vertex_count, 0..vertex_count), 0..vertex_count * 3).prop_map(move |pairs| {
            let mut edges: Vec<(usize, usize)> = pairs
                .into_iter()
                .filter(|(from, to)| from != to)
                .map(|(from, to)| (from.min(to), from.max(to)))
                .collect();
            edges.sort_unstable();
            edges.dedup();
            EdgeList::new(vertex_count, edges).unwrap_or_else(|err| {
                panic!("normalised edges must be valid: {err}");
            })
        })
    })
}
