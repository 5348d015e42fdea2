//! Exact maximin team search.
//!
//! The objective is maximize-sum-of-maxima: for every opponent in the full
//! roster, the team scores the best matchup any member has against it, and
//! the team's value is the sum over opponents. Scores can be negative, so
//! greedy selection carries no guarantee; the search is a depth-first
//! branch-and-bound over size-k subsets in candidate-name order.
//!
//! The bound is the admissible suffix-best relaxation: for each opponent,
//! assume the best score any still-available candidate could contribute.
//! Branches are pruned only when the bound is strictly below the incumbent,
//! so every equal-objective optimum is visited and the lexicographic
//! tie-break does not depend on worker scheduling.
//!
//! Root branches (the first free pick) fan out across Rayon workers sharing
//! a monotonically-improving incumbent through an atomic; the wall-clock
//! budget is a cooperative cancellation flag polled at bounded intervals.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::optimizer::{SearchConstraints, SolveStatus, TeamSolution, NO_COVERAGE_SENTINEL};
use crate::parallel::split_even;
use crate::scoring::ScoreMatrix;

/// Nodes between deadline polls; a power of two minus one, used as a mask.
const DEADLINE_POLL_MASK: u64 = 0x3F;

/// Immutable per-round search data shared by all workers.
struct Problem {
    n: usize,
    /// Free slots left after forced includes.
    slots: usize,
    /// Row-major effective scores with self-cells pinned to the sentinel, so
    /// taking a row max never lets a candidate cover itself.
    effective: Vec<i64>,
    /// Selectable candidates (not forced either way) in name order.
    free: Vec<usize>,
    /// `suffix_best[p * n + j]`: best score any candidate in `free[p..]` has
    /// against opponent `j`; the final row holds the sentinel.
    suffix_best: Vec<i64>,
    forced: Vec<usize>,
    /// Per matrix index, the cuts that contain it.
    member_cuts: Vec<Vec<usize>>,
    /// Cut counters after applying forced members alone.
    base_cut_counts: Vec<usize>,
    /// Coverage after applying forced members alone.
    base_cover: Vec<i64>,
    /// At most this many members of any one cut may be selected.
    cut_limit: usize,
    /// Matrix index → rank in lexicographic name order.
    name_rank: Vec<usize>,
}

impl Problem {
    fn build(matrix: &ScoreMatrix, constraints: &SearchConstraints) -> Self {
        let n = matrix.len();

        let mut by_name: Vec<usize> = (0..n).collect();
        by_name.sort_by(|a, b| matrix.name(*a).cmp(matrix.name(*b)));
        let mut name_rank = vec![0usize; n];
        for (rank, index) in by_name.iter().enumerate() {
            name_rank[*index] = rank;
        }

        let mut effective = vec![NO_COVERAGE_SENTINEL; n * n];
        for attacker in 0..n {
            for defender in 0..n {
                if attacker != defender {
                    effective[attacker * n + defender] =
                        i64::from(matrix.score(attacker, defender));
                }
            }
        }

        let excluded = |index: usize| constraints.forced_exclude.binary_search(&index).is_ok();
        let included = |index: usize| constraints.forced_include.binary_search(&index).is_ok();
        let free: Vec<usize> = by_name
            .iter()
            .copied()
            .filter(|index| !excluded(*index) && !included(*index))
            .collect();

        let m = free.len();
        let mut suffix_best = vec![NO_COVERAGE_SENTINEL; (m + 1) * n];
        for position in (0..m).rev() {
            let candidate = free[position];
            for j in 0..n {
                let below = suffix_best[(position + 1) * n + j];
                suffix_best[position * n + j] = below.max(effective[candidate * n + j]);
            }
        }

        let mut member_cuts = vec![Vec::new(); n];
        for (cut_id, cut) in constraints.cuts.iter().enumerate() {
            for member in cut {
                member_cuts[*member].push(cut_id);
            }
        }
        let mut base_cut_counts = vec![0usize; constraints.cuts.len()];
        let mut base_cover = vec![NO_COVERAGE_SENTINEL; n];
        for member in &constraints.forced_include {
            for cut_id in &member_cuts[*member] {
                base_cut_counts[*cut_id] += 1;
            }
            let row = &effective[member * n..(member + 1) * n];
            for j in 0..n {
                base_cover[j] = base_cover[j].max(row[j]);
            }
        }

        Self {
            n,
            slots: constraints.team_size - constraints.forced_include.len(),
            effective,
            free,
            suffix_best,
            forced: constraints.forced_include.clone(),
            member_cuts,
            base_cut_counts,
            base_cover,
            cut_limit: constraints.team_size.saturating_sub(1),
            name_rank,
        }
    }

    fn base_violates_cuts(&self) -> bool {
        self.base_cut_counts
            .iter()
            .any(|count| *count > self.cut_limit)
    }
}

/// A worker's best complete team: objective plus members sorted by name rank.
type Incumbent = (i64, Vec<usize>);

struct Worker<'a> {
    problem: &'a Problem,
    shared_best: &'a AtomicI64,
    timed_out: &'a AtomicBool,
    deadline: Instant,
    nodes: u64,
    cover: Vec<i64>,
    cut_counts: Vec<usize>,
    chosen: Vec<usize>,
    best: Option<Incumbent>,
}

impl<'a> Worker<'a> {
    fn new(
        problem: &'a Problem,
        shared_best: &'a AtomicI64,
        timed_out: &'a AtomicBool,
        deadline: Instant,
    ) -> Self {
        Self {
            problem,
            shared_best,
            timed_out,
            deadline,
            nodes: 0,
            cover: problem.base_cover.clone(),
            cut_counts: problem.base_cut_counts.clone(),
            chosen: Vec::with_capacity(problem.slots),
            best: None,
        }
    }

    /// Counts a node and polls the deadline at bounded intervals. Once any
    /// worker trips the flag, every worker unwinds promptly.
    fn expired(&mut self) -> bool {
        self.nodes = self.nodes.wrapping_add(1);
        if self.nodes & DEADLINE_POLL_MASK == 0 && Instant::now() >= self.deadline {
            self.timed_out.store(true, Ordering::Relaxed);
        }
        self.timed_out.load(Ordering::Relaxed)
    }

    fn bound(&self, position: usize) -> i64 {
        let n = self.problem.n;
        let suffix = &self.problem.suffix_best[position * n..(position + 1) * n];
        self.cover
            .iter()
            .zip(suffix)
            .map(|(covered, available)| (*covered).max(*available))
            .sum()
    }

    fn try_include(&mut self, position: usize) -> Option<Vec<i64>> {
        let candidate = self.problem.free[position];
        for cut_id in &self.problem.member_cuts[candidate] {
            if self.cut_counts[*cut_id] + 1 > self.problem.cut_limit {
                return None;
            }
        }
        for cut_id in &self.problem.member_cuts[candidate] {
            self.cut_counts[*cut_id] += 1;
        }
        let saved = self.cover.clone();
        let n = self.problem.n;
        let row = &self.problem.effective[candidate * n..(candidate + 1) * n];
        for j in 0..n {
            if row[j] > self.cover[j] {
                self.cover[j] = row[j];
            }
        }
        self.chosen.push(candidate);
        Some(saved)
    }

    fn undo_include(&mut self, position: usize, saved_cover: Vec<i64>) {
        let candidate = self.problem.free[position];
        self.chosen.pop();
        self.cover = saved_cover;
        for cut_id in &self.problem.member_cuts[candidate] {
            self.cut_counts[*cut_id] -= 1;
        }
    }

    fn complete(&mut self) {
        let objective: i64 = self.cover.iter().sum();
        self.shared_best.fetch_max(objective, Ordering::Relaxed);

        let mut team: Vec<usize> = self
            .problem
            .forced
            .iter()
            .chain(self.chosen.iter())
            .copied()
            .collect();
        team.sort_by_key(|index| self.problem.name_rank[*index]);

        let replace = match &self.best {
            None => true,
            Some((best_objective, best_team)) => {
                objective > *best_objective
                    || (objective == *best_objective
                        && ranks(self.problem, &team) < ranks(self.problem, best_team))
            }
        };
        if replace {
            self.best = Some((objective, team));
        }
    }

    fn descend(&mut self, position: usize, slots_left: usize) {
        if self.expired() {
            return;
        }
        if slots_left == 0 {
            self.complete();
            return;
        }
        if self.problem.free.len() - position < slots_left {
            return;
        }
        if self.bound(position) < self.shared_best.load(Ordering::Relaxed) {
            return;
        }
        if let Some(saved_cover) = self.try_include(position) {
            self.descend(position + 1, slots_left - 1);
            self.undo_include(position, saved_cover);
        }
        self.descend(position + 1, slots_left);
    }

    /// Explore the subtree where `free[root]` is the first selected free
    /// member; roots partition the search space disjointly.
    fn descend_root(mut self, root: usize) -> Option<Incumbent> {
        if self.expired() {
            return None;
        }
        if let Some(_saved) = self.try_include(root) {
            self.descend(root + 1, self.problem.slots - 1);
        }
        self.best
    }
}

fn ranks(problem: &Problem, team: &[usize]) -> Vec<usize> {
    team.iter().map(|index| problem.name_rank[*index]).collect()
}

fn better(problem: &Problem, candidate: &Incumbent, current: &Option<Incumbent>) -> bool {
    match current {
        None => true,
        Some((best_objective, best_team)) => {
            candidate.0 > *best_objective
                || (candidate.0 == *best_objective
                    && ranks(problem, &candidate.1) < ranks(problem, best_team))
        }
    }
}

/// Run one search round against already-validated constraints. Never fails:
/// timeouts and proven infeasibility are reported through the status.
pub fn search_team(
    matrix: &ScoreMatrix,
    constraints: &SearchConstraints,
    budget: Duration,
) -> TeamSolution {
    let deadline = Instant::now() + budget;
    let problem = Problem::build(matrix, constraints);

    if problem.slots == 0 {
        // Forced members already form the full team.
        if problem.base_violates_cuts() {
            return TeamSolution::infeasible();
        }
        let mut team = problem.forced.clone();
        team.sort_by_key(|index| problem.name_rank[*index]);
        return TeamSolution {
            members: team.iter().map(|i| matrix.name(*i).to_string()).collect(),
            objective: Some(problem.base_cover.iter().sum()),
            status: SolveStatus::ProvenOptimal,
        };
    }

    let shared_best = AtomicI64::new(i64::MIN);
    let timed_out = AtomicBool::new(false);
    let root_count = problem.free.len() - problem.slots + 1;

    // Contiguous root ranges per task keep scheduling overhead low while the
    // shared incumbent still flows between tasks as they run.
    let ranges = split_even(root_count, rayon::current_num_threads().max(1) * 4);
    let local_bests: Vec<Option<Incumbent>> = ranges
        .into_par_iter()
        .map(|(start, end)| {
            let mut range_best: Option<Incumbent> = None;
            for root in start..end {
                let local =
                    Worker::new(&problem, &shared_best, &timed_out, deadline).descend_root(root);
                if let Some(local) = local {
                    if better(&problem, &local, &range_best) {
                        range_best = Some(local);
                    }
                }
            }
            range_best
        })
        .collect();

    let mut best: Option<Incumbent> = None;
    for local in local_bests.into_iter().flatten() {
        if better(&problem, &local, &best) {
            best = Some(local);
        }
    }

    let timed_out = timed_out.load(Ordering::Relaxed);
    match best {
        Some((objective, team)) => TeamSolution {
            members: team.iter().map(|i| matrix.name(*i).to_string()).collect(),
            objective: Some(objective),
            status: if timed_out {
                SolveStatus::TimeLimitedBest
            } else {
                SolveStatus::ProvenOptimal
            },
        },
        None if timed_out => TeamSolution {
            members: Vec::new(),
            objective: None,
            status: SolveStatus::TimeLimitedBest,
        },
        None => TeamSolution::infeasible(),
    }
}
