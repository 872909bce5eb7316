//! The six-vertex reference scenario run through every heuristic.

use agglom_core::{EdgeList, GroundTruth, Heuristic, PipelineBuilder};
use agglom_test_support::fixtures::{Scenario, six_vertex_scenario};
use rstest::{fixture, rstest};

#[fixture]
fn scenario() -> Scenario {
    six_vertex_scenario()
}

fn inputs(scenario: &Scenario) -> (EdgeList, GroundTruth) {
    let edges = EdgeList::new(scenario.vertex_count, scenario.edges.clone())
        .expect("scenario edges are valid");
    let truth = GroundTruth::new(scenario.vertex_count, scenario.communities.clone())
        .expect("scenario truth is valid");
    (edges, truth)
}

#[rstest]
fn every_heuristic_scores_the_scenario(
    scenario: Scenario,
    #[values(
        Heuristic::Uniform,
        Heuristic::DegreeComparison,
        Heuristic::WeightComparison,
        Heuristic::NeighbourInitialDegreeBias,
        Heuristic::NeighbourCurrentDegreeBias,
        Heuristic::HighestDegreeNeighbour,
        Heuristic::MinimumDegreeNeighbour,
        Heuristic::DegreeBiasedCandidate,
        Heuristic::WeightBiasedCandidate,
        Heuristic::GreedyMaxDegree,
        Heuristic::GreedyMaxWeight,
        Heuristic::RetainTriangulation,
        Heuristic::RetainProbabilisticTriangulation,
        Heuristic::HighestTriangulated,
        Heuristic::RetainTriangulationTimesWeight,
        Heuristic::RetainClusterTriangulation
    )]
    heuristic: Heuristic,
    #[values(1, 2023)] seed: u64,
) {
    let (edges, truth) = inputs(&scenario);
    let report = PipelineBuilder::new()
        .with_heuristic(heuristic)
        .with_seed(seed)
        .build()
        .expect("valid configuration")
        .run(&edges, Some(&truth))
        .expect("scenario run succeeds");

    assert_eq!(report.heuristic, heuristic);
    assert_eq!(report.seed, seed);
    assert_eq!(report.excluded, 0);
    let level = report.final_level().expect("one level ran");
    let covered: usize = level.partition.clusters().iter().map(Vec::len).sum();
    assert_eq!(covered, 6);
    assert!(level.modularity.is_finite());
    assert!((-0.5..=1.0).contains(&level.modularity));

    let scores = level.scores().expect("ground truth covers every vertex");
    assert_eq!(scores.elements, 6);
    for index in [scores.rand, scores.jaccard] {
        assert!((0.0..=1.0).contains(&index), "{heuristic}: {index}");
    }
    assert!(scores.ari.is_finite());
}

#[rstest]
fn clustering_coefficient_is_reported(scenario: Scenario) {
    let (edges, _) = inputs(&scenario);
    let report = PipelineBuilder::new()
        .with_seed(0)
        .build()
        .expect("valid configuration")
        .run(&edges, None)
        .expect("run succeeds");
    // Local coefficients: 1, 1, 1/3, 1/3, 1, 1.
    let expected = (4.0 + 2.0 / 3.0) / 6.0;
    assert!((report.clustering_coefficient - expected).abs() < 1e-12);
    assert!(report.levels.iter().all(|level| level.pairwise.is_none()));
}

#[rstest]
fn perfect_partition_scores_known_modularity(scenario: Scenario) {
    let (edges, truth) = inputs(&scenario);
    let partition = agglom_core::Partition::new(6, truth.communities().to_vec())
        .expect("truth is a partition");
    // {0,1,2,3}: 8 internal endpoints, 2 external; {4,5}: 2 internal, 2 external.
    let expected =
        (8.0 / 14.0 - (10.0_f64 / 14.0).powi(2)) + (2.0 / 14.0 - (4.0_f64 / 14.0).powi(2));
    let score = agglom_core::modularity(&edges, &partition).expect("same universe");
    assert!((score - expected).abs() < 1e-12);
}
