use serde::Serialize;

use crate::scoring::matrix::ScoreMatrix;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCandidate {
    pub name: String,
    pub aggregate_score: i64,
}

/// Rank every candidate by the sum of its matchup scores against all
/// opponents, best first. Ties fall back to lexicographic name order so the
/// ranking is reproducible across runs.
pub fn rank_candidates(matrix: &ScoreMatrix) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = (0..matrix.len())
        .map(|index| RankedCandidate {
            name: matrix.name(index).to_string(),
            aggregate_score: matrix.row_total(index),
        })
        .collect();

    ranked.sort_by(|left, right| {
        right
            .aggregate_score
            .cmp(&left.aggregate_score)
            .then_with(|| left.name.cmp(&right.name))
    });

    ranked
}

#[cfg(test)]
mod tests {
    use super::rank_candidates;
    use crate::data::{Attribute, Candidate, ATTRIBUTE_COUNT};
    use crate::scoring::matrix::ScoreMatrix;

    fn candidate(name: &str, primary: Attribute, weak_to: &[Attribute]) -> Candidate {
        let mut profile = [1.0; ATTRIBUTE_COUNT];
        for attribute in weak_to {
            profile[attribute.index()] = 2.0;
        }
        Candidate::new(name, primary, None, profile)
    }

    #[test]
    fn ranking_orders_by_aggregate_then_name() {
        // Water beats fire twice over, fire candidates only trade with each
        // other's shared weakness, so water tops the board.
        let roster = vec![
            candidate("Ember", Attribute::Fire, &[Attribute::Water]),
            candidate("Cinder", Attribute::Fire, &[Attribute::Water]),
            candidate("Tide", Attribute::Water, &[]),
        ];
        let matrix = ScoreMatrix::build(&roster).expect("matrix should build");
        let ranked = rank_candidates(&matrix);

        assert_eq!(ranked[0].name, "Tide");
        assert_eq!(ranked[0].aggregate_score, 2);
        // Ember and Cinder tie; lexicographic order breaks it.
        assert_eq!(ranked[1].name, "Cinder");
        assert_eq!(ranked[2].name, "Ember");
        assert_eq!(ranked[1].aggregate_score, ranked[2].aggregate_score);
    }
}
