//! Normalize raw effectiveness cells to a usable multiplier.
//!
//! Source spreadsheets mix dot and comma decimal separators and leave cells
//! blank; anything that does not resolve to a finite non-negative number is
//! treated as neutral so a single bad cell never fails a whole run.

/// Multiplier assumed when a profile entry is absent or unparseable.
pub const NEUTRAL_MULTIPLIER: f64 = 1.0;

/// Total resolver: missing, empty, non-numeric, negative or non-finite input
/// all resolve to [NEUTRAL_MULTIPLIER]. Never fails.
pub fn resolve_multiplier(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return NEUTRAL_MULTIPLIER;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return NEUTRAL_MULTIPLIER;
    }
    let normalized = trimmed.replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => NEUTRAL_MULTIPLIER,
    }
}
