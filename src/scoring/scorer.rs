//! Pairwise matchup scoring.
//!
//! A matchup score condenses one directed pairing into an integer in
//! [-2, 2]: one point for the attacker's best offensive multiplier, one for
//! the worst multiplier the attacker takes in return. Multiplier ≥ 1 means
//! the defender is weak to the attack, so both terms take the maximum across
//! the relevant attribute pair.

use crate::data::{Attribute, Candidate};
use crate::scoring::resolver::NEUTRAL_MULTIPLIER;

/// A multiplier at or above this counts as super-effective.
pub const SUPER_EFFECTIVE_THRESHOLD: f64 = 2.0;
/// A multiplier at or below this counts as resisted.
pub const RESISTED_THRESHOLD: f64 = 0.5;

/// Best multiplier the `target` profile yields across one or two attacking
/// attributes. An absent secondary contributes neutral, not nothing.
fn best_multiplier(target: &Candidate, primary: Attribute, secondary: Option<Attribute>) -> f64 {
    let first = target.multiplier_against(primary);
    let second = secondary
        .map(|attribute| target.multiplier_against(attribute))
        .unwrap_or(NEUTRAL_MULTIPLIER);
    first.max(second)
}

/// +1 when the attacker hits the defender super-effectively, -1 when every
/// attacking attribute is resisted, 0 otherwise.
fn offensive_term(attacker: &Candidate, defender: &Candidate) -> i32 {
    let best_offense = best_multiplier(defender, attacker.primary, attacker.secondary);
    if best_offense >= SUPER_EFFECTIVE_THRESHOLD {
        1
    } else if best_offense <= RESISTED_THRESHOLD {
        -1
    } else {
        0
    }
}

/// -1 when the defender threatens the attacker super-effectively, +1 when the
/// attacker resists even the defender's best attribute, 0 otherwise.
fn defensive_term(attacker: &Candidate, defender: &Candidate) -> i32 {
    let worst_threat = best_multiplier(attacker, defender.primary, defender.secondary);
    if worst_threat >= SUPER_EFFECTIVE_THRESHOLD {
        -1
    } else if worst_threat <= RESISTED_THRESHOLD {
        1
    } else {
        0
    }
}

/// Directed matchup score for attacker vs defender, in {-2, -1, 0, 1, 2}.
/// Pure in the resolved profiles; callers must not pass the same candidate on
/// both sides.
pub fn matchup_score(attacker: &Candidate, defender: &Candidate) -> i32 {
    offensive_term(attacker, defender) + defensive_term(attacker, defender)
}
