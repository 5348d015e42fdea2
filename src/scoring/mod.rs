pub mod export;
pub mod matrix;
pub mod ranking;
pub mod resolver;
pub mod scorer;

pub use matrix::ScoreMatrix;
pub use ranking::{rank_candidates, RankedCandidate};
pub use scorer::matchup_score;
