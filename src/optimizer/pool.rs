//! Diversified team enumeration.
//!
//! Each round searches under the constraints of the previous round plus one
//! cut forbidding the team just found, so the sequence walks down through
//! distinct near-optimal teams. Rounds are strictly sequential: a round's
//! constraints depend on the previous round's result.

use serde::Serialize;

use crate::optimizer::{
    search_team, SearchConstraints, SolveError, SolveStatus, TeamRequest, TeamSolution,
};
use crate::scoring::ScoreMatrix;

/// Ordered teams from successive rounds, best first. Never contains the
/// infeasible marker; an infeasible round ends the sequence instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolutionSequence {
    pub teams: Vec<TeamSolution>,
}

impl SolutionSequence {
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

/// One round's inputs and outcome: the active constraints and the incumbent
/// that produced them. Rounds compose purely; nothing is mutated in place.
#[derive(Debug, Clone)]
struct SearchState {
    constraints: SearchConstraints,
    incumbent: Option<TeamSolution>,
}

impl SearchState {
    fn advance(&self, matrix: &ScoreMatrix, solution: TeamSolution) -> Self {
        let members: Vec<usize> = solution
            .members
            .iter()
            .filter_map(|name| matrix.index_of(name))
            .collect();
        Self {
            constraints: self.constraints.with_cut(&members),
            incumbent: Some(solution),
        }
    }
}

/// Collect up to `request.solution_count` pairwise-distinct teams. Stops
/// early when a round proves infeasible; that is normal termination, not an
/// error. Every round gets `request.round_budget` of wall-clock to itself.
pub fn enumerate_teams(
    matrix: &ScoreMatrix,
    request: &TeamRequest,
) -> Result<SolutionSequence, SolveError> {
    let constraints = SearchConstraints::resolve(
        matrix,
        request.team_size,
        &request.forced_include,
        &request.forced_exclude,
    )?;

    let mut state = SearchState {
        constraints,
        incumbent: None,
    };
    let mut teams = Vec::new();

    for _round in 0..request.solution_count {
        let solution = search_team(matrix, &state.constraints, request.round_budget);
        if solution.status == SolveStatus::Infeasible || !solution.is_team() {
            break;
        }
        if let Some(previous) = &state.incumbent {
            // Adding a cut can only shrink the feasible set, so proven
            // optima never improve across rounds.
            debug_assert!(
                previous.status != SolveStatus::ProvenOptimal
                    || solution.objective <= previous.objective
            );
        }
        state = state.advance(matrix, solution.clone());
        teams.push(solution);
    }

    Ok(SolutionSequence { teams })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use super::enumerate_teams;
    use crate::optimizer::{SolveError, SolveStatus, TeamRequest};
    use crate::scoring::ScoreMatrix;

    fn triangle_matrix() -> ScoreMatrix {
        let names = vec!["A".into(), "B".into(), "C".into(), "D".into()];
        #[rustfmt::skip]
        let scores = vec![
             0, -1,  1, -1,
             1,  0, -1,  1,
            -1,  1,  0,  0,
             1, -1,  0,  0,
        ];
        ScoreMatrix::from_parts(names, scores).expect("matrix")
    }

    fn request(count: usize) -> TeamRequest {
        TeamRequest {
            team_size: 2,
            solution_count: count,
            round_budget: Duration::from_secs(10),
            ..TeamRequest::default()
        }
    }

    #[test]
    fn sequence_walks_distinct_teams_best_first() {
        let matrix = triangle_matrix();
        let sequence = enumerate_teams(&matrix, &request(3)).expect("valid request");

        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence.teams[0].members, vec!["A", "B"]);
        assert_eq!(sequence.teams[1].members, vec!["B", "C"]);
        assert_eq!(sequence.teams[2].members, vec!["B", "D"]);
        for team in &sequence.teams {
            assert_eq!(team.status, SolveStatus::ProvenOptimal);
            assert_eq!(team.objective, Some(2));
        }

        let distinct: BTreeSet<Vec<String>> = sequence
            .teams
            .iter()
            .map(|team| team.members.clone())
            .collect();
        assert_eq!(distinct.len(), sequence.len());
    }

    #[test]
    fn objectives_never_improve_across_rounds() {
        let matrix = triangle_matrix();
        let sequence = enumerate_teams(&matrix, &request(6)).expect("valid request");

        let objectives: Vec<i64> = sequence
            .teams
            .iter()
            .map(|team| team.objective.expect("every team carries an objective"))
            .collect();
        for window in objectives.windows(2) {
            assert!(window[0] >= window[1], "objectives: {objectives:?}");
        }
    }

    #[test]
    fn sequence_stops_early_when_the_space_is_exhausted() {
        let matrix = triangle_matrix();
        // Only six pairs exist; asking for ten ends after six.
        let sequence = enumerate_teams(&matrix, &request(10)).expect("valid request");
        assert_eq!(sequence.len(), 6);
    }

    #[test]
    fn invalid_requests_fail_before_any_round() {
        let matrix = triangle_matrix();
        let mut bad = request(2);
        bad.forced_include = vec!["Z".to_string()];
        assert_eq!(
            enumerate_teams(&matrix, &bad).unwrap_err(),
            SolveError::UnknownCandidate("Z".to_string())
        );
    }
}
