//! The full directed score matrix over a roster.
//!
//! Built once per run and read-only afterwards; ranking, team search and
//! export all borrow it. Row construction is independent per attacker, so
//! rows are computed in parallel.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::data::{Candidate, InvalidInput};
use crate::scoring::scorer::matchup_score;

/// Immutable n×n matchup matrix. Self-cells exist for addressing but hold 0
/// and are never consulted by consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    names: Vec<String>,
    scores: Vec<i32>,
}

impl ScoreMatrix {
    /// Score every ordered pair of distinct candidates. Fails on an empty
    /// roster or duplicate names; an all-neutral profile is allowed (it only
    /// produces neutral matchups).
    pub fn build(candidates: &[Candidate]) -> Result<Self, InvalidInput> {
        if candidates.is_empty() {
            return Err(InvalidInput::EmptyRoster);
        }
        let mut seen: HashSet<&str> = HashSet::with_capacity(candidates.len());
        for candidate in candidates {
            if !seen.insert(candidate.name.as_str()) {
                return Err(InvalidInput::DuplicateName(candidate.name.clone()));
            }
        }

        let n = candidates.len();
        let scores: Vec<i32> = candidates
            .par_iter()
            .enumerate()
            .flat_map_iter(|(row, attacker)| {
                candidates.iter().enumerate().map(move |(column, defender)| {
                    if row == column {
                        0
                    } else {
                        matchup_score(attacker, defender)
                    }
                })
            })
            .collect();
        debug_assert_eq!(scores.len(), n * n);

        Ok(Self {
            names: candidates.iter().map(|c| c.name.clone()).collect(),
            scores,
        })
    }

    /// Assemble a matrix from externally supplied parts (matchup import).
    /// `scores` is row-major with `names.len()²` entries.
    pub(crate) fn from_parts(names: Vec<String>, scores: Vec<i32>) -> Result<Self, InvalidInput> {
        if names.is_empty() {
            return Err(InvalidInput::EmptyRoster);
        }
        let mut seen: HashSet<&str> = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(InvalidInput::DuplicateName(name.clone()));
            }
        }
        assert_eq!(scores.len(), names.len() * names.len());
        Ok(Self { names, scores })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }

    /// Directed score, attacker row vs defender column. Self-cells return 0
    /// by construction; consumers treat them as "no matchup".
    pub fn score(&self, attacker: usize, defender: usize) -> i32 {
        self.scores[attacker * self.names.len() + defender]
    }

    /// Sum of the attacker's scores against every other candidate.
    pub fn row_total(&self, attacker: usize) -> i64 {
        let n = self.names.len();
        (0..n)
            .filter(|defender| *defender != attacker)
            .map(|defender| i64::from(self.score(attacker, defender)))
            .sum()
    }
}
