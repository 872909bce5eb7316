//! The agglomeration loop shared by every heuristic.
//!
//! Each iteration draws a candidate from the active set, selects a partner
//! among its neighbours, decides the winner and merges. A candidate without
//! neighbours becomes a terminal winner. The loop ends when the active set is
//! empty, which takes at most one iteration per vertex.

use rand::{Rng, rngs::SmallRng};
use tracing::{debug, info, instrument};

use super::{
    active::ActiveSet,
    context::RunContext,
    heuristic::{
        CandidatePolicy, Heuristic, MergeMode, MergePlan, NeighbourPolicy, Resolution, WeightInit,
        WeightUpdate,
    },
    ranking::Ranking,
    select::{first_max, first_min, proportional},
};
use crate::{
    error::{AggregationError, GraphError},
    graph::{Graph, VertexId},
    hierarchy::MergeHierarchy,
};

/// Everything a finished aggregation run produced.
#[derive(Clone, Debug)]
pub struct AggregationOutcome {
    heuristic: Heuristic,
    graph: Graph,
    hierarchy: MergeHierarchy,
    winners: Vec<VertexId>,
    iterations: usize,
}

impl AggregationOutcome {
    /// Heuristic that produced this outcome.
    #[must_use]
    pub const fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Merge mode of the heuristic.
    #[must_use]
    pub const fn mode(&self) -> MergeMode {
        self.heuristic.plan().mode
    }

    /// The consumed graph, carrying absorbed lists and retained memberships.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Recorded `(loser, winner)` merges.
    #[must_use]
    pub const fn hierarchy(&self) -> &MergeHierarchy {
        &self.hierarchy
    }

    /// Vertices that ran out of neighbours, in the order they did so.
    #[must_use]
    pub fn winners(&self) -> &[VertexId] {
        &self.winners
    }

    /// Number of loop iterations executed.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }
}

/// Runs `heuristic` over `graph` until every vertex is a winner or has lost a
/// merge.
///
/// # Errors
/// Returns [`AggregationError`] when a selection yields the candidate itself,
/// a vertex leaves the active set twice, a vertex loses twice, or the graph
/// store rejects a mutation.
///
/// # Examples
/// ```
/// use agglom_core::{EdgeList, Graph, Heuristic, RunContext, aggregate};
///
/// let edges = EdgeList::new(4, vec![(0, 1), (2, 3)]).expect("edges are valid");
/// let graph = Graph::from_edge_list(&edges).expect("graph must build");
/// let mut context = RunContext::seeded(1);
/// let outcome = aggregate(graph, Heuristic::Uniform, &mut context).expect("run succeeds");
/// assert_eq!(outcome.hierarchy().len(), 2);
/// assert_eq!(outcome.winners().len(), 2);
/// ```
#[instrument(
    name = "aggregation.run",
    err,
    skip(graph, context),
    fields(
        heuristic = %heuristic,
        label = heuristic.label(),
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        seed = context.seed(),
        level = context.level(),
    ),
)]
pub fn aggregate(
    graph: Graph,
    heuristic: Heuristic,
    context: &mut RunContext,
) -> Result<AggregationOutcome, AggregationError> {
    let mut driver = Driver::new(graph, heuristic.plan())?;
    let rng = context.rng();
    let mut iterations = 0_usize;
    while let Some(candidate) = driver.select_candidate(rng) {
        driver.step(candidate, rng)?;
        iterations += 1;
    }
    info!(
        merges = driver.hierarchy.len(),
        winners = driver.winners.len(),
        iterations,
        "aggregation completed"
    );
    Ok(AggregationOutcome {
        heuristic,
        graph: driver.graph,
        hierarchy: driver.hierarchy,
        winners: driver.winners,
        iterations,
    })
}

struct Driver {
    graph: Graph,
    plan: MergePlan,
    active: ActiveSet,
    // Present for score-driven candidate policies.
    ranking: Option<Ranking>,
    hierarchy: MergeHierarchy,
    winners: Vec<VertexId>,
}

impl Driver {
    fn new(mut graph: Graph, plan: MergePlan) -> Result<Self, GraphError> {
        let vertex_count = graph.vertex_count();
        for index in 0..vertex_count {
            let vertex = VertexId::new(index);
            let weight = match plan.weights {
                WeightInit::DegreeSnapshot => to_u64(graph.degree_of(vertex)?),
                WeightInit::Unit => 1,
            };
            graph.set_weight(vertex, weight)?;
        }
        let scores = (0..vertex_count)
            .map(|index| candidate_score(&graph, plan.candidate, VertexId::new(index)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            ranking: Ranking::for_policy(plan.candidate, scores),
            graph,
            plan,
            active: ActiveSet::full(vertex_count),
            hierarchy: MergeHierarchy::new(vertex_count),
            winners: Vec::new(),
        })
    }

    fn select_candidate(&self, rng: &mut SmallRng) -> Option<VertexId> {
        let Some(ranking) = &self.ranking else {
            return self.active.pick_uniform(rng);
        };
        ranking.pick(rng).or_else(|| {
            debug!(
                active = self.active.len(),
                "no candidate has a positive score, falling back to uniform selection"
            );
            self.active.pick_uniform(rng)
        })
    }

    fn step(&mut self, candidate: VertexId, rng: &mut SmallRng) -> Result<(), AggregationError> {
        let Some(neighbour) = self.select_neighbour(candidate, rng)? else {
            self.deactivate(candidate)?;
            self.winners.push(candidate);
            return Ok(());
        };
        if neighbour == candidate {
            return Err(AggregationError::SelfMerge {
                vertex: candidate.index(),
            });
        }
        let (winner, loser) = self.resolve(candidate, neighbour)?;
        self.hierarchy.record(loser, winner)?;
        // Only the winner and the loser's neighbours can change degree or weight.
        let mut touched = Vec::new();
        if self.ranking.is_some() {
            touched.extend(self.graph.neighbours_of(loser)?);
            touched.push(winner);
        }
        let accumulate = self.plan.update == WeightUpdate::Accumulate;
        match self.plan.mode {
            MergeMode::Destructive => {
                self.graph.absorb(winner, loser, accumulate)?;
            }
            MergeMode::Retentive => self.graph.retain(winner, loser, accumulate)?,
        }
        self.deactivate(loser)?;
        self.refresh(&touched)?;
        Ok(())
    }

    fn deactivate(&mut self, vertex: VertexId) -> Result<(), AggregationError> {
        self.active.remove(vertex)?;
        if let Some(ranking) = self.ranking.as_mut() {
            ranking.remove(vertex);
        }
        Ok(())
    }

    /// Re-scores the still-active vertices among `touched`.
    fn refresh(&mut self, touched: &[VertexId]) -> Result<(), GraphError> {
        let mut updates = Vec::with_capacity(touched.len());
        for &vertex in touched {
            if self.active.contains(vertex) {
                updates.push((
                    vertex,
                    candidate_score(&self.graph, self.plan.candidate, vertex)?,
                ));
            }
        }
        if let Some(ranking) = self.ranking.as_mut() {
            for (vertex, score) in updates {
                ranking.set(vertex, score);
            }
        }
        Ok(())
    }

    fn select_neighbour(
        &self,
        candidate: VertexId,
        rng: &mut SmallRng,
    ) -> Result<Option<VertexId>, GraphError> {
        let neighbours: Vec<VertexId> = self.graph.neighbours_of(candidate)?.collect();
        if neighbours.is_empty() {
            return Ok(None);
        }
        let position = match self.plan.neighbour {
            NeighbourPolicy::UniformEdge => Some(rng.gen_range(0..neighbours.len())),
            NeighbourPolicy::ProportionalToWeight => {
                let weights = self.scores(&neighbours, |vertex| self.weight(vertex))?;
                proportional(&as_weights(&weights), rng)
            }
            NeighbourPolicy::ProportionalToDegree => {
                let degrees = self.scores(&neighbours, |vertex| self.degree(vertex))?;
                proportional(&as_weights(&degrees), rng)
            }
            NeighbourPolicy::MaxDegree => {
                first_max(&self.scores(&neighbours, |vertex| self.degree(vertex))?)
            }
            NeighbourPolicy::MinDegree => {
                first_min(&self.scores(&neighbours, |vertex| self.degree(vertex))?)
            }
            NeighbourPolicy::MinWeight => {
                first_min(&self.scores(&neighbours, |vertex| self.weight(vertex))?)
            }
            NeighbourPolicy::MaxTriangles => first_max(&self.triangles(candidate, &neighbours)?),
            NeighbourPolicy::ProportionalToTriangles => {
                proportional(&as_weights(&self.triangles(candidate, &neighbours)?), rng)
            }
            NeighbourPolicy::ProportionalToTriangleMass => {
                proportional(&self.triangle_mass(candidate, &neighbours)?, rng)
            }
            NeighbourPolicy::MaxClusterTriangles => {
                first_max(&self.cluster_triangles(candidate, &neighbours)?)
            }
        };
        Ok(position.and_then(|at| neighbours.get(at).copied()))
    }

    /// Returns `(winner, loser)`.
    fn resolve(
        &self,
        candidate: VertexId,
        neighbour: VertexId,
    ) -> Result<(VertexId, VertexId), GraphError> {
        let candidate_wins = match self.plan.resolution {
            Resolution::CandidateWins => true,
            Resolution::NeighbourWins => false,
            Resolution::HigherDegree => self.degree(candidate)? >= self.degree(neighbour)?,
            Resolution::HigherWeight => self.weight(candidate)? >= self.weight(neighbour)?,
        };
        Ok(if candidate_wins {
            (candidate, neighbour)
        } else {
            (neighbour, candidate)
        })
    }

    fn degree(&self, vertex: VertexId) -> Result<u64, GraphError> {
        self.graph.degree_of(vertex).map(to_u64)
    }

    fn weight(&self, vertex: VertexId) -> Result<u64, GraphError> {
        Ok(self.graph.vertex(vertex)?.weight())
    }

    fn scores(
        &self,
        vertices: &[VertexId],
        score: impl Fn(VertexId) -> Result<u64, GraphError>,
    ) -> Result<Vec<u64>, GraphError> {
        vertices.iter().copied().map(score).collect()
    }

    fn triangles(
        &self,
        candidate: VertexId,
        neighbours: &[VertexId],
    ) -> Result<Vec<u64>, GraphError> {
        let own = self.graph.neighbour_set(candidate)?;
        self.scores(neighbours, |vertex| {
            self.graph.shared_neighbours(&own, vertex).map(to_u64)
        })
    }

    /// Triangles shared with each neighbour and with every member of that
    /// neighbour's retained cluster.
    fn cluster_triangles(
        &self,
        candidate: VertexId,
        neighbours: &[VertexId],
    ) -> Result<Vec<u64>, GraphError> {
        let own = self.graph.neighbour_set(candidate)?;
        self.scores(neighbours, |vertex| {
            let mut total = to_u64(self.graph.shared_neighbours(&own, vertex)?);
            for &member in self.graph.vertex(vertex)?.members() {
                total += to_u64(self.graph.shared_neighbours(&own, member)?);
            }
            Ok(total)
        })
    }

    /// `2 * triangles * mass / members` per neighbour, where mass is the
    /// neighbour's weight plus retained mass and members counts the neighbour
    /// and its direct retained children.
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "sampling weights are real-valued"
    )]
    fn triangle_mass(
        &self,
        candidate: VertexId,
        neighbours: &[VertexId],
    ) -> Result<Vec<f64>, GraphError> {
        let triangles = self.triangles(candidate, neighbours)?;
        neighbours
            .iter()
            .zip(triangles)
            .map(|(&vertex, shared)| -> Result<f64, GraphError> {
                let record = self.graph.vertex(vertex)?;
                let mass = record.weight().saturating_add(record.extra_weight()) as f64;
                let members = (record.child_count() + 1) as f64;
                Ok(2.0 * shared as f64 * mass / members)
            })
            .collect()
    }
}

/// Score a candidate policy ranks `vertex` by. Uniform policies score zero.
fn candidate_score(
    graph: &Graph,
    policy: CandidatePolicy,
    vertex: VertexId,
) -> Result<u64, GraphError> {
    match policy {
        CandidatePolicy::Uniform => Ok(0),
        CandidatePolicy::ProportionalToDegree | CandidatePolicy::MaxDegree => {
            graph.degree_of(vertex).map(to_u64)
        }
        CandidatePolicy::ProportionalToWeight | CandidatePolicy::MaxWeight => {
            Ok(graph.vertex(vertex)?.weight())
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "degree and weight counts fit comfortably in an f64 mantissa"
)]
fn as_weights(values: &[u64]) -> Vec<f64> {
    values.iter().map(|&value| value as f64).collect()
}

fn to_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::EdgeList;
    use rand::SeedableRng;
    use rstest::rstest;

    fn v(index: usize) -> VertexId {
        VertexId::new(index)
    }

    fn driver(vertex_count: usize, edges: &[(usize, usize)], heuristic: Heuristic) -> Driver {
        let edges = EdgeList::new(vertex_count, edges.to_vec()).expect("edges are valid");
        let graph = Graph::from_edge_list(&edges).expect("graph must build");
        Driver::new(graph, heuristic.plan()).expect("driver must build")
    }

    /// Hub 0 with leaves 1, 2, 3; the edge 2-3 closes one triangle.
    const FAN: [(usize, usize); 4] = [(0, 1), (0, 2), (0, 3), (2, 3)];

    #[rstest]
    #[case::retentive(Heuristic::RetainTriangulation)]
    #[case::destructive(Heuristic::HighestTriangulated)]
    fn max_triangles_skips_neighbours_outside_every_triangle(#[case] heuristic: Heuristic) {
        let driver = driver(4, &FAN, heuristic);
        for seed in 0..32 {
            let mut rng = SmallRng::seed_from_u64(seed);
            assert_eq!(
                driver.select_neighbour(v(0), &mut rng).expect("vertex exists"),
                Some(v(2))
            );
        }
    }

    #[rstest]
    fn triangle_mass_never_draws_a_neighbour_without_triangles() {
        let driver = driver(4, &FAN, Heuristic::RetainTriangulationTimesWeight);
        let neighbours = [v(1), v(2), v(3)];
        assert_eq!(
            driver.triangle_mass(v(0), &neighbours).expect("vertices exist"),
            vec![0.0, 2.0, 2.0]
        );
        for seed in 0..200 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let picked = driver.select_neighbour(v(0), &mut rng).expect("vertex exists");
            assert!(matches!(picked, Some(vertex) if vertex == v(2) || vertex == v(3)));
        }
    }

    #[rstest]
    fn triangle_mass_scales_with_retained_mass() {
        let mut driver = driver(4, &FAN, Heuristic::RetainTriangulationTimesWeight);
        driver.graph.retain(v(3), v(1), false).expect("merge must succeed");
        // Vertex 3 now carries mass 2 over two members.
        assert_eq!(
            driver.triangle_mass(v(0), &[v(2), v(3)]).expect("vertices exist"),
            vec![2.0, 2.0]
        );
    }

    /// Hub 0 with neighbours 1..=4; the edge 3-4 closes the only triangles.
    const STAR_WITH_CHORD: [(usize, usize); 5] = [(0, 1), (0, 2), (0, 3), (0, 4), (3, 4)];

    #[rstest]
    fn cluster_triangles_count_retained_members() {
        let mut driver = driver(5, &STAR_WITH_CHORD, Heuristic::RetainClusterTriangulation);
        driver.graph.retain(v(1), v(3), false).expect("merge must succeed");
        driver.graph.retain(v(1), v(4), false).expect("merge must succeed");
        let neighbours = [v(1), v(2), v(3), v(4)];
        assert_eq!(
            driver.cluster_triangles(v(0), &neighbours).expect("vertices exist"),
            vec![2, 0, 1, 1]
        );
        assert_eq!(
            driver.triangles(v(0), &neighbours).expect("vertices exist"),
            vec![0, 0, 1, 1]
        );
        let mut rng = SmallRng::seed_from_u64(4);
        assert_eq!(
            driver.select_neighbour(v(0), &mut rng).expect("vertex exists"),
            Some(v(1))
        );
    }

    #[rstest]
    fn cluster_triangles_ignore_the_representative_after_a_retain_cycle() {
        let mut driver = driver(5, &STAR_WITH_CHORD, Heuristic::RetainClusterTriangulation);
        driver.graph.retain(v(4), v(3), false).expect("merge must succeed");
        driver.graph.retain(v(3), v(4), false).expect("merge must succeed");
        let representative = driver.graph.vertex(v(3)).expect("vertex exists");
        assert_eq!(representative.members(), &[v(4)]);
        assert_eq!(
            driver.cluster_triangles(v(0), &[v(3)]).expect("vertices exist"),
            vec![2]
        );
    }

    #[rstest]
    fn min_degree_picks_the_first_least_connected_neighbour() {
        let edges = [(0, 1), (0, 2), (0, 3), (1, 4), (1, 5)];
        let driver = driver(6, &edges, Heuristic::MinimumDegreeNeighbour);
        for seed in 0..16 {
            let mut rng = SmallRng::seed_from_u64(seed);
            assert_eq!(
                driver.select_neighbour(v(0), &mut rng).expect("vertex exists"),
                Some(v(2))
            );
        }
    }

    #[rstest]
    fn min_weight_follows_weight_rather_than_degree() {
        let edges = [(0, 1), (0, 2), (0, 3), (1, 4), (1, 5)];
        let mut driver = driver(6, &edges, Heuristic::GreedyMaxWeight);
        driver.graph.set_weight(v(2), 9).expect("vertex exists");
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            driver.select_neighbour(v(0), &mut rng).expect("vertex exists"),
            Some(v(3))
        );
    }

    #[rstest]
    #[case::degree(Heuristic::DegreeComparison)]
    #[case::weight(Heuristic::WeightComparison)]
    #[case::highest_degree_neighbour(Heuristic::HighestDegreeNeighbour)]
    #[case::highest_triangulated(Heuristic::HighestTriangulated)]
    fn comparison_ties_keep_the_candidate(#[case] heuristic: Heuristic) {
        let driver = driver(2, &[(0, 1)], heuristic);
        assert_eq!(driver.resolve(v(0), v(1)).expect("vertices exist"), (v(0), v(1)));
        assert_eq!(driver.resolve(v(1), v(0)).expect("vertices exist"), (v(1), v(0)));
    }

    #[rstest]
    #[case::degree(Heuristic::DegreeComparison)]
    #[case::weight(Heuristic::WeightComparison)]
    fn comparison_prefers_the_larger_vertex(#[case] heuristic: Heuristic) {
        let driver = driver(4, &FAN, heuristic);
        assert_eq!(driver.resolve(v(1), v(0)).expect("vertices exist"), (v(0), v(1)));
        assert_eq!(driver.resolve(v(0), v(1)).expect("vertices exist"), (v(0), v(1)));
    }

    #[rstest]
    fn greedy_candidates_follow_the_shrinking_hub() {
        // Hub 0 holds three leaves; the 4-5 pair sits apart.
        let mut driver = driver(6, &[(0, 1), (0, 2), (0, 3), (4, 5)], Heuristic::GreedyMaxDegree);
        let mut rng = SmallRng::seed_from_u64(6);
        assert_eq!(driver.select_candidate(&mut rng), Some(v(0)));
        driver.step(v(0), &mut rng).expect("step succeeds");
        assert_eq!(driver.select_candidate(&mut rng), Some(v(0)));
        driver.step(v(0), &mut rng).expect("step succeeds");
        // The hub is down to one edge and ties with every other vertex left.
        let picks: Vec<VertexId> = (0..32)
            .map(|_| driver.select_candidate(&mut rng).expect("vertices remain"))
            .collect();
        for &picked in &picks {
            assert!(driver.active.contains(picked));
            assert_eq!(driver.graph.degree_of(picked).expect("vertex exists"), 1);
        }
        assert!(picks.iter().any(|&picked| picked != v(0)));
    }

    #[rstest]
    #[case::degree_biased(Heuristic::DegreeBiasedCandidate)]
    #[case::weight_biased(Heuristic::WeightBiasedCandidate)]
    #[case::greedy_degree(Heuristic::GreedyMaxDegree)]
    #[case::greedy_weight(Heuristic::GreedyMaxWeight)]
    fn ranking_matches_a_full_rescan_after_every_step(
        #[case] heuristic: Heuristic,
        #[values(0, 3, 99)] seed: u64,
    ) {
        let edges = [
            (0, 1),
            (0, 2),
            (1, 2),
            (2, 3),
            (3, 4),
            (3, 5),
            (4, 5),
            (5, 6),
            (6, 7),
            (1, 7),
        ];
        let mut driver = driver(8, &edges, heuristic);
        let mut rng = SmallRng::seed_from_u64(seed);
        while let Some(candidate) = driver.select_candidate(&mut rng) {
            assert!(driver.active.contains(candidate));
            driver.step(candidate, &mut rng).expect("step succeeds");
            let ranking = driver.ranking.as_ref().expect("policy is score-driven");
            for vertex in driver.active.iter() {
                let expected = candidate_score(&driver.graph, driver.plan.candidate, vertex)
                    .expect("vertex exists");
                assert_eq!(ranking.score(vertex), Some(expected), "{heuristic} {vertex:?}");
            }
        }
        assert!(driver.active.is_empty());
    }
}
