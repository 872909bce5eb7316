//! The sixteen merge heuristics and the policies each one is built from.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// How the next candidate is drawn from the active set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CandidatePolicy {
    /// Uniformly at random.
    Uniform,
    /// With probability proportional to current degree.
    ProportionalToDegree,
    /// With probability proportional to vertex weight.
    ProportionalToWeight,
    /// Highest current degree, ties broken uniformly.
    MaxDegree,
    /// Highest weight, ties broken uniformly.
    MaxWeight,
}

/// How the merge partner is chosen among the candidate's neighbours.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NeighbourPolicy {
    /// A uniformly random incident edge.
    UniformEdge,
    /// With probability proportional to neighbour weight.
    ProportionalToWeight,
    /// With probability proportional to neighbour current degree.
    ProportionalToDegree,
    /// Neighbour with the highest current degree.
    MaxDegree,
    /// Neighbour with the lowest current degree.
    MinDegree,
    /// Neighbour with the lowest weight.
    MinWeight,
    /// Neighbour closing the most triangles with the candidate.
    MaxTriangles,
    /// With probability proportional to shared triangles.
    ProportionalToTriangles,
    /// With probability proportional to `2 * triangles * mass / members`.
    ProportionalToTriangleMass,
    /// Neighbour whose retained cluster closes the most triangles with the
    /// candidate.
    MaxClusterTriangles,
}

/// Which side of a selected pair survives the merge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resolution {
    /// The candidate always wins.
    CandidateWins,
    /// The neighbour always wins.
    NeighbourWins,
    /// Higher current degree wins; ties favour the candidate.
    HigherDegree,
    /// Higher weight wins; ties favour the candidate.
    HigherWeight,
}

/// What happens to the loser of a merge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MergeMode {
    /// The loser and its edges are removed from the graph.
    Destructive,
    /// The loser keeps its edges and joins the winner's cluster.
    Retentive,
}

/// How vertex weights are initialised before the first merge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WeightInit {
    /// Each vertex starts with its initial degree.
    DegreeSnapshot,
    /// Each vertex starts with weight one.
    Unit,
}

/// How vertex weights evolve as merges happen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WeightUpdate {
    /// Weights never change after initialisation.
    Fixed,
    /// The winner's weight grows by the loser's weight.
    Accumulate,
}

/// The full policy set driving one heuristic.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MergePlan {
    /// Candidate selection.
    pub candidate: CandidatePolicy,
    /// Neighbour selection.
    pub neighbour: NeighbourPolicy,
    /// Winner/loser decision.
    pub resolution: Resolution,
    /// Fate of the loser.
    pub mode: MergeMode,
    /// Initial weights.
    pub weights: WeightInit,
    /// Weight evolution.
    pub update: WeightUpdate,
}

/// One of the sixteen randomized agglomeration strategies.
///
/// Families follow their run labels: `I.*` pick uniform pairs, `II.*` bias
/// the candidate or the neighbour by degree or weight, and `III.*` steer merges
/// with triangle counts.
///
/// # Examples
/// ```
/// use agglom_core::{Heuristic, MergeMode};
///
/// let heuristic: Heuristic = "retain-triangulation".parse().expect("known heuristic");
/// assert_eq!(heuristic.label(), "III.a");
/// assert_eq!(heuristic.plan().mode, MergeMode::Retentive);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Heuristic {
    /// I.a: uniform candidate absorbs a uniform neighbour.
    #[default]
    Uniform,
    /// I.b: uniform pair, higher current degree wins.
    DegreeComparison,
    /// I.c: uniform pair, higher degree-snapshot weight wins.
    WeightComparison,
    /// II.a: neighbour drawn by initial degree, candidate absorbs.
    NeighbourInitialDegreeBias,
    /// II.b: neighbour drawn by current degree, candidate absorbs.
    NeighbourCurrentDegreeBias,
    /// II.c: highest-degree neighbour, higher current degree wins.
    HighestDegreeNeighbour,
    /// II.d: lowest-degree neighbour, candidate absorbs.
    MinimumDegreeNeighbour,
    /// II.e: candidate drawn by current degree absorbs its lowest-degree
    /// neighbour.
    DegreeBiasedCandidate,
    /// II.f: candidate drawn by accumulated weight absorbs its lowest-degree
    /// neighbour.
    WeightBiasedCandidate,
    /// II.g: highest-degree vertex absorbs its lowest-degree neighbour.
    GreedyMaxDegree,
    /// II.h: heaviest vertex absorbs its lightest neighbour, weights
    /// accumulate.
    GreedyMaxWeight,
    /// III.a: candidate retained under the neighbour sharing most triangles.
    RetainTriangulation,
    /// III.b: candidate retained under a neighbour drawn by shared triangles.
    RetainProbabilisticTriangulation,
    /// III.c: most-triangulated neighbour, higher weight absorbs the other.
    HighestTriangulated,
    /// III.d: candidate retained under a neighbour drawn by triangles times
    /// mean absorbed mass.
    RetainTriangulationTimesWeight,
    /// III.e: candidate retained under the neighbour whose cluster shares
    /// most triangles.
    RetainClusterTriangulation,
}

impl Heuristic {
    /// Every heuristic in label order.
    pub const ALL: [Self; 16] = [
        Self::Uniform,
        Self::DegreeComparison,
        Self::WeightComparison,
        Self::NeighbourInitialDegreeBias,
        Self::NeighbourCurrentDegreeBias,
        Self::HighestDegreeNeighbour,
        Self::MinimumDegreeNeighbour,
        Self::DegreeBiasedCandidate,
        Self::WeightBiasedCandidate,
        Self::GreedyMaxDegree,
        Self::GreedyMaxWeight,
        Self::RetainTriangulation,
        Self::RetainProbabilisticTriangulation,
        Self::HighestTriangulated,
        Self::RetainTriangulationTimesWeight,
        Self::RetainClusterTriangulation,
    ];

    /// Stable kebab-case name accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::DegreeComparison => "degree-comparison",
            Self::WeightComparison => "weight-comparison",
            Self::NeighbourInitialDegreeBias => "neighbour-initial-degree-bias",
            Self::NeighbourCurrentDegreeBias => "neighbour-current-degree-bias",
            Self::HighestDegreeNeighbour => "highest-degree-neighbour",
            Self::MinimumDegreeNeighbour => "minimum-degree-neighbour",
            Self::DegreeBiasedCandidate => "degree-biased-candidate",
            Self::WeightBiasedCandidate => "weight-biased-candidate",
            Self::GreedyMaxDegree => "greedy-max-degree",
            Self::GreedyMaxWeight => "greedy-max-weight",
            Self::RetainTriangulation => "retain-triangulation",
            Self::RetainProbabilisticTriangulation => "retain-probabilistic-triangulation",
            Self::HighestTriangulated => "highest-triangulated",
            Self::RetainTriangulationTimesWeight => "retain-triangulation-times-weight",
            Self::RetainClusterTriangulation => "retain-cluster-triangulation",
        }
    }

    /// Short family label such as `II.c`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Uniform => "I.a",
            Self::DegreeComparison => "I.b",
            Self::WeightComparison => "I.c",
            Self::NeighbourInitialDegreeBias => "II.a",
            Self::NeighbourCurrentDegreeBias => "II.b",
            Self::HighestDegreeNeighbour => "II.c",
            Self::MinimumDegreeNeighbour => "II.d",
            Self::DegreeBiasedCandidate => "II.e",
            Self::WeightBiasedCandidate => "II.f",
            Self::GreedyMaxDegree => "II.g",
            Self::GreedyMaxWeight => "II.h",
            Self::RetainTriangulation => "III.a",
            Self::RetainProbabilisticTriangulation => "III.b",
            Self::HighestTriangulated => "III.c",
            Self::RetainTriangulationTimesWeight => "III.d",
            Self::RetainClusterTriangulation => "III.e",
        }
    }

    /// Policy set implementing this heuristic.
    #[must_use]
    pub const fn plan(self) -> MergePlan {
        use CandidatePolicy as C;
        use MergeMode::{Destructive, Retentive};
        use NeighbourPolicy as N;
        use Resolution as R;
        use WeightUpdate::{Accumulate, Fixed};

        let (candidate, neighbour, resolution, mode, update) = match self {
            Self::Uniform => (C::Uniform, N::UniformEdge, R::CandidateWins, Destructive, Fixed),
            Self::DegreeComparison => {
                (C::Uniform, N::UniformEdge, R::HigherDegree, Destructive, Fixed)
            }
            Self::WeightComparison => {
                (C::Uniform, N::UniformEdge, R::HigherWeight, Destructive, Fixed)
            }
            Self::NeighbourInitialDegreeBias => {
                (C::Uniform, N::ProportionalToWeight, R::CandidateWins, Destructive, Fixed)
            }
            Self::NeighbourCurrentDegreeBias => {
                (C::Uniform, N::ProportionalToDegree, R::CandidateWins, Destructive, Fixed)
            }
            Self::HighestDegreeNeighbour => {
                (C::Uniform, N::MaxDegree, R::HigherDegree, Destructive, Fixed)
            }
            Self::MinimumDegreeNeighbour => {
                (C::Uniform, N::MinDegree, R::CandidateWins, Destructive, Fixed)
            }
            Self::DegreeBiasedCandidate => {
                (C::ProportionalToDegree, N::MinDegree, R::CandidateWins, Destructive, Fixed)
            }
            Self::WeightBiasedCandidate => {
                (C::ProportionalToWeight, N::MinDegree, R::CandidateWins, Destructive, Accumulate)
            }
            Self::GreedyMaxDegree => {
                (C::MaxDegree, N::MinDegree, R::CandidateWins, Destructive, Fixed)
            }
            Self::GreedyMaxWeight => {
                (C::MaxWeight, N::MinWeight, R::CandidateWins, Destructive, Accumulate)
            }
            Self::RetainTriangulation => {
                (C::Uniform, N::MaxTriangles, R::NeighbourWins, Retentive, Fixed)
            }
            Self::RetainProbabilisticTriangulation => {
                (C::Uniform, N::ProportionalToTriangles, R::NeighbourWins, Retentive, Fixed)
            }
            Self::HighestTriangulated => {
                (C::Uniform, N::MaxTriangles, R::HigherWeight, Destructive, Fixed)
            }
            Self::RetainTriangulationTimesWeight => {
                (C::Uniform, N::ProportionalToTriangleMass, R::NeighbourWins, Retentive, Fixed)
            }
            Self::RetainClusterTriangulation => {
                (C::Uniform, N::MaxClusterTriangles, R::NeighbourWins, Retentive, Fixed)
            }
        };
        let weights = match self {
            Self::RetainTriangulationTimesWeight => WeightInit::Unit,
            _ => WeightInit::DegreeSnapshot,
        };
        MergePlan {
            candidate,
            neighbour,
            resolution,
            mode,
            weights,
            update,
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a heuristic name is not recognised.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown heuristic `{name}`; run labels such as `II.c` are accepted too")]
pub struct UnknownHeuristic {
    /// The rejected name.
    pub name: String,
}

impl FromStr for Heuristic {
    type Err = UnknownHeuristic;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|heuristic| {
                heuristic.as_str().eq_ignore_ascii_case(trimmed)
                    || heuristic.label().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| UnknownHeuristic {
                name: trimmed.to_owned(),
            })
    }
}
