pub mod branch_bound;
pub mod pool;

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::scoring::ScoreMatrix;

pub use branch_bound::search_team;
pub use pool::{enumerate_teams, SolutionSequence};

/// Objective contribution for an opponent no team member has a valid matchup
/// against. Only reachable for an opponent that is the team's sole member,
/// since self-matchups never count; large enough to dominate any real score.
pub const NO_COVERAGE_SENTINEL: i64 = -1000;

/// How a search round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// The search space was exhausted; the returned team is optimal.
    ProvenOptimal,
    /// The time budget expired; the returned team is the best incumbent.
    TimeLimitedBest,
    /// No feasible team exists under the active constraints.
    Infeasible,
}

/// A selected team with its coverage objective, or the infeasible marker
/// (empty member list, no objective).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamSolution {
    pub members: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<i64>,
    pub status: SolveStatus,
}

impl TeamSolution {
    pub fn infeasible() -> Self {
        Self {
            members: Vec::new(),
            objective: None,
            status: SolveStatus::Infeasible,
        }
    }

    pub fn is_team(&self) -> bool {
        !self.members.is_empty()
    }
}

/// A team-selection request as handed in by the CLI or the API.
#[derive(Debug, Clone)]
pub struct TeamRequest {
    pub team_size: usize,
    pub forced_include: Vec<String>,
    pub forced_exclude: Vec<String>,
    pub solution_count: usize,
    /// Independent wall-clock budget per search round.
    pub round_budget: Duration,
}

impl Default for TeamRequest {
    fn default() -> Self {
        Self {
            team_size: 3,
            forced_include: Vec::new(),
            forced_exclude: Vec::new(),
            solution_count: 1,
            round_budget: Duration::from_secs(30),
        }
    }
}

/// Why a request was rejected before any search ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    TeamSizeOutOfRange { team_size: usize, roster: usize },
    UnknownCandidate(String),
    ForcedSetsOverlap(String),
    TooManyIncludes { includes: usize, team_size: usize },
    Infeasible { team_size: usize, selectable: usize },
}

impl SolveError {
    /// Distinguishes broken invariants from a domain that is simply too
    /// small after exclusions.
    pub fn is_constraint_violation(&self) -> bool {
        !matches!(self, Self::Infeasible { .. })
    }
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TeamSizeOutOfRange { team_size, roster } => {
                write!(f, "team size {team_size} is outside 1..={roster}")
            }
            Self::UnknownCandidate(name) => {
                write!(f, "constraint names unknown candidate '{name}'")
            }
            Self::ForcedSetsOverlap(name) => {
                write!(f, "candidate '{name}' is both forced in and forced out")
            }
            Self::TooManyIncludes { includes, team_size } => {
                write!(f, "{includes} forced includes exceed team size {team_size}")
            }
            Self::Infeasible { team_size, selectable } => write!(
                f,
                "only {selectable} selectable candidates for a team of {team_size}"
            ),
        }
    }
}

impl std::error::Error for SolveError {}

/// Resolved constraints for one search round: indices into the score matrix,
/// plus the accumulated no-repeat cuts. Rounds never mutate this in place;
/// the enumerator derives each round's constraints with [with_cut].
///
/// [with_cut]: SearchConstraints::with_cut
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConstraints {
    pub team_size: usize,
    pub forced_include: Vec<usize>,
    pub forced_exclude: Vec<usize>,
    /// Previously returned teams; at most `team_size - 1` members of each may
    /// appear in a later team.
    pub cuts: Vec<Vec<usize>>,
}

impl SearchConstraints {
    /// Validate a request against a matrix and resolve names to indices.
    pub fn resolve(
        matrix: &ScoreMatrix,
        team_size: usize,
        forced_include: &[String],
        forced_exclude: &[String],
    ) -> Result<Self, SolveError> {
        let roster = matrix.len();
        if team_size == 0 || team_size > roster {
            return Err(SolveError::TeamSizeOutOfRange { team_size, roster });
        }

        let resolve_names = |names: &[String]| -> Result<Vec<usize>, SolveError> {
            let mut indices: Vec<usize> = names
                .iter()
                .map(|name| {
                    matrix
                        .index_of(name)
                        .ok_or_else(|| SolveError::UnknownCandidate(name.clone()))
                })
                .collect::<Result<_, _>>()?;
            indices.sort_unstable();
            indices.dedup();
            Ok(indices)
        };

        let include = resolve_names(forced_include)?;
        let exclude = resolve_names(forced_exclude)?;

        if let Some(shared) = include
            .iter()
            .copied()
            .find(|index| exclude.binary_search(index).is_ok())
        {
            return Err(SolveError::ForcedSetsOverlap(matrix.name(shared).to_string()));
        }
        if include.len() > team_size {
            return Err(SolveError::TooManyIncludes {
                includes: include.len(),
                team_size,
            });
        }
        let selectable = roster - exclude.len();
        if selectable < team_size {
            return Err(SolveError::Infeasible { team_size, selectable });
        }

        Ok(Self {
            team_size,
            forced_include: include,
            forced_exclude: exclude,
            cuts: Vec::new(),
        })
    }

    /// A new constraint set extending this one with a cut that forbids the
    /// exact `team` from being selected again.
    pub fn with_cut(&self, team: &[usize]) -> Self {
        let mut next = self.clone();
        let mut cut = team.to_vec();
        cut.sort_unstable();
        next.cuts.push(cut);
        next
    }
}

/// Validate and run a single search round. The round never errors after
/// validation; timeouts and proven infeasibility are reported in the
/// solution's status.
pub fn optimize(matrix: &ScoreMatrix, request: &TeamRequest) -> Result<TeamSolution, SolveError> {
    let constraints = SearchConstraints::resolve(
        matrix,
        request.team_size,
        &request.forced_include,
        &request.forced_exclude,
    )?;
    Ok(search_team(matrix, &constraints, request.round_budget))
}
