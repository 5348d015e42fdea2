//! Matchup CSV export and re-import.
//!
//! The export holds one row per ordered pair
//! (`candidate_a,candidate_b,matchup_score`), which is the interchange format
//! between the scoring stage and a later team search: a previously exported
//! file loads straight back into a [ScoreMatrix] without the roster.

use std::fmt;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::data::InvalidInput;
use crate::scoring::matrix::ScoreMatrix;

const COLUMN_ATTACKER: &str = "candidate_a";
const COLUMN_DEFENDER: &str = "candidate_b";
const COLUMN_SCORE: &str = "matchup_score";

#[derive(Debug)]
pub enum MatchupFileError {
    Csv(csv::Error),
    Invalid(InvalidInput),
    MissingColumn(&'static str),
    ScoreOutOfRange { attacker: String, defender: String, raw: String },
}

impl fmt::Display for MatchupFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "failed to read matchup csv: {err}"),
            Self::Invalid(err) => write!(f, "invalid matchup data: {err}"),
            Self::MissingColumn(column) => {
                write!(f, "matchup csv is missing column '{column}'")
            }
            Self::ScoreOutOfRange { attacker, defender, raw } => write!(
                f,
                "matchup score '{raw}' for {attacker} vs {defender} is outside -2..=2"
            ),
        }
    }
}

impl std::error::Error for MatchupFileError {}

/// Summary of a completed export, printed as JSON by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub path: String,
    pub candidates: usize,
    pub pairs: usize,
    pub exported_at: String,
}

/// Write every ordered distinct pair to `writer` in row-major order.
pub fn write_matchups<W: io::Write>(matrix: &ScoreMatrix, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([COLUMN_ATTACKER, COLUMN_DEFENDER, COLUMN_SCORE])?;
    for attacker in 0..matrix.len() {
        for defender in 0..matrix.len() {
            if attacker == defender {
                continue;
            }
            let score = matrix.score(attacker, defender).to_string();
            csv_writer.write_record([
                matrix.name(attacker),
                matrix.name(defender),
                score.as_str(),
            ])?;
        }
    }
    csv_writer.flush().map_err(csv::Error::from)
}

/// Write the matrix to `path` and return an export summary.
pub fn export_matchups(
    matrix: &ScoreMatrix,
    path: impl AsRef<Path>,
) -> Result<ExportSummary, MatchupFileError> {
    let path = path.as_ref();
    let handle = std::fs::File::create(path)
        .map_err(|err| MatchupFileError::Csv(csv::Error::from(err)))?;
    write_matchups(matrix, handle).map_err(MatchupFileError::Csv)?;

    let n = matrix.len();
    Ok(ExportSummary {
        path: path.display().to_string(),
        candidates: n,
        pairs: n * (n - 1),
        exported_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Load an exported matchup file back into a matrix. Candidate order follows
/// first appearance in the file; pairs the file does not mention default to
/// the neutral score 0.
pub fn read_matchups<R: io::Read>(reader: R) -> Result<ScoreMatrix, MatchupFileError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let header = csv_reader.headers().map_err(MatchupFileError::Csv)?.clone();

    let find = |name: &'static str| -> Result<usize, MatchupFileError> {
        header
            .iter()
            .position(|column| column.trim().eq_ignore_ascii_case(name))
            .ok_or(MatchupFileError::MissingColumn(name))
    };
    let attacker_column = find(COLUMN_ATTACKER)?;
    let defender_column = find(COLUMN_DEFENDER)?;
    let score_column = find(COLUMN_SCORE)?;

    fn intern(names: &mut Vec<String>, name: &str) -> usize {
        match names.iter().position(|existing| existing == name) {
            Some(index) => index,
            None => {
                names.push(name.to_string());
                names.len() - 1
            }
        }
    }

    let mut names: Vec<String> = Vec::new();
    let mut pairs: Vec<(usize, usize, i32)> = Vec::new();

    for record in csv_reader.records() {
        let record = record.map_err(MatchupFileError::Csv)?;
        let attacker_name = record.get(attacker_column).unwrap_or_default().trim();
        let defender_name = record.get(defender_column).unwrap_or_default().trim();
        if attacker_name.is_empty() || defender_name.is_empty() {
            continue;
        }
        let raw_score = record.get(score_column).unwrap_or_default().trim();
        let score = raw_score.parse::<i32>().ok().filter(|value| (-2..=2).contains(value));
        let Some(score) = score else {
            return Err(MatchupFileError::ScoreOutOfRange {
                attacker: attacker_name.to_string(),
                defender: defender_name.to_string(),
                raw: raw_score.to_string(),
            });
        };

        let attacker = intern(&mut names, attacker_name);
        let defender = intern(&mut names, defender_name);
        pairs.push((attacker, defender, score));
    }

    let n = names.len();
    if n == 0 {
        return Err(MatchupFileError::Invalid(InvalidInput::EmptyRoster));
    }
    let mut scores = vec![0; n * n];
    for (attacker, defender, score) in pairs {
        scores[attacker * n + defender] = score;
    }
    ScoreMatrix::from_parts(names, scores).map_err(MatchupFileError::Invalid)
}

/// Load an exported matchup file from disk. See [read_matchups].
pub fn load_matchups(path: impl AsRef<Path>) -> Result<ScoreMatrix, MatchupFileError> {
    let file = std::fs::File::open(path)
        .map_err(|err| MatchupFileError::Csv(csv::Error::from(err)))?;
    read_matchups(file)
}
