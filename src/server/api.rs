use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::data::roster::{load_roster, RosterError};
use crate::data::InvalidInput;
use crate::optimizer::{enumerate_teams, SolveError, TeamRequest, TeamSolution};
use crate::scoring::{rank_candidates, ScoreMatrix};

const DEFAULT_TEAM_SIZE: usize = 3;
const DEFAULT_SOLUTION_COUNT: usize = 1;
const DEFAULT_BUDGET_MS: u64 = 30_000;
const MAX_SOLUTION_COUNT: usize = 20;
const MAX_BUDGET_MS: u64 = 600_000;

#[derive(Debug)]
pub enum ApiError {
    Roster(RosterError),
    Matrix(InvalidInput),
    Json(serde_json::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Roster(err) => write!(f, "{err}"),
            Self::Matrix(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ApiError {}

fn scored_matrix(roster_path: &str) -> Result<ScoreMatrix, ApiError> {
    let roster = load_roster(roster_path).map_err(ApiError::Roster)?;
    ScoreMatrix::build(&roster).map_err(ApiError::Matrix)
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "metadex-api",
        "version": env!("CARGO_PKG_VERSION"),
        "generated_at": chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateListItem {
    pub name: String,
    pub primary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
}

pub fn candidates_payload(roster_path: &str) -> Result<String, ApiError> {
    let roster = load_roster(roster_path).map_err(ApiError::Roster)?;
    let list: Vec<CandidateListItem> = roster
        .iter()
        .map(|candidate| CandidateListItem {
            name: candidate.name.clone(),
            primary: candidate.primary.to_string(),
            secondary: candidate.secondary.map(|attribute| attribute.to_string()),
        })
        .collect();
    serde_json::to_string_pretty(&serde_json::json!({ "candidates": list })).map_err(ApiError::Json)
}

pub fn ranking_payload(roster_path: &str) -> Result<String, ApiError> {
    let matrix = scored_matrix(roster_path)?;
    let ranking = rank_candidates(&matrix);
    serde_json::to_string_pretty(&serde_json::json!({ "ranking": ranking })).map_err(ApiError::Json)
}

pub fn matrix_payload(roster_path: &str) -> Result<String, ApiError> {
    let matrix = scored_matrix(roster_path)?;
    let n = matrix.len();
    let rows: Vec<Vec<i32>> = (0..n)
        .map(|attacker| (0..n).map(|defender| matrix.score(attacker, defender)).collect())
        .collect();
    serde_json::to_string_pretty(&serde_json::json!({
        "candidates": matrix.names(),
        "scores": rows,
    }))
    .map_err(ApiError::Json)
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamApiRequest {
    pub team_size: Option<usize>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub count: Option<usize>,
    pub budget_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestSummary {
    pub roster: String,
    pub team_size: usize,
    pub solution_count: usize,
    pub budget_ms: u64,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamResponse {
    pub status: &'static str,
    pub engine: &'static str,
    pub request: RequestSummary,
    pub teams: Vec<TeamSolution>,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

#[derive(Debug)]
pub enum TeamPayloadError {
    Parse(serde_json::Error),
    Validation(ValidationErrorResponse),
    Data(ApiError),
}

impl fmt::Display for TeamPayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Validation(_) => write!(f, "invalid team request"),
            Self::Data(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for TeamPayloadError {}

fn validation_issue(field: &'static str, message: String) -> ValidationErrorResponse {
    ValidationErrorResponse {
        status: "error",
        message: "Validation failed",
        errors: vec![ValidationIssue {
            field,
            messages: vec![message],
        }],
    }
}

fn solve_error_field(err: &SolveError) -> &'static str {
    match err {
        SolveError::TeamSizeOutOfRange { .. } => "team_size",
        SolveError::UnknownCandidate(_) | SolveError::ForcedSetsOverlap(_) => "include",
        SolveError::TooManyIncludes { .. } => "include",
        SolveError::Infeasible { .. } => "exclude",
    }
}

pub fn team_payload(roster_path: &str, body: &str) -> Result<String, TeamPayloadError> {
    let parsed: TeamApiRequest = serde_json::from_str(body).map_err(TeamPayloadError::Parse)?;

    let solution_count = parsed.count.unwrap_or(DEFAULT_SOLUTION_COUNT);
    if solution_count == 0 || solution_count > MAX_SOLUTION_COUNT {
        return Err(TeamPayloadError::Validation(validation_issue(
            "count",
            format!("count must be within 1..={MAX_SOLUTION_COUNT}"),
        )));
    }
    let budget_ms = parsed.budget_ms.unwrap_or(DEFAULT_BUDGET_MS);
    if budget_ms == 0 || budget_ms > MAX_BUDGET_MS {
        return Err(TeamPayloadError::Validation(validation_issue(
            "budget_ms",
            format!("budget_ms must be within 1..={MAX_BUDGET_MS}"),
        )));
    }

    let matrix = scored_matrix(roster_path).map_err(TeamPayloadError::Data)?;
    let request = TeamRequest {
        team_size: parsed.team_size.unwrap_or(DEFAULT_TEAM_SIZE),
        forced_include: parsed.include.clone(),
        forced_exclude: parsed.exclude.clone(),
        solution_count,
        round_budget: Duration::from_millis(budget_ms),
    };

    let started = Instant::now();
    let sequence = enumerate_teams(&matrix, &request).map_err(|err| {
        TeamPayloadError::Validation(validation_issue(solve_error_field(&err), err.to_string()))
    })?;
    let duration_ms = started.elapsed().as_millis();

    let response = TeamResponse {
        status: "ok",
        engine: "branch_bound_v1",
        request: RequestSummary {
            roster: roster_path.to_string(),
            team_size: request.team_size,
            solution_count,
            budget_ms,
            include: request.forced_include.clone(),
            exclude: request.forced_exclude.clone(),
        },
        teams: sequence.teams,
        duration_ms,
    };
    serde_json::to_string_pretty(&response)
        .map_err(|err| TeamPayloadError::Data(ApiError::Json(err)))
}
