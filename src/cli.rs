use std::env;
use std::time::Duration;

use crate::data::roster::{load_roster, DEFAULT_ROSTER_PATH};
use crate::data::validate::validate_roster_file;
use crate::optimizer::{enumerate_teams, TeamRequest};
use crate::parallel::WorkerPool;
use crate::scoring::export::{export_matchups, load_matchups};
use crate::scoring::{rank_candidates, ScoreMatrix};
use crate::server;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Rank,
    Matrix,
    Team,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("rank") => Some(Command::Rank),
        Some("matrix") => Some(Command::Matrix),
        Some("team") => Some(Command::Team),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Rank) => handle_rank(args),
        Some(Command::Matrix) => handle_matrix(args),
        Some(Command::Team) => handle_team(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("usage: metadex <serve|rank|matrix|team|validate>");
            2
        }
    }
}

fn handle_serve() -> i32 {
    let bind_addr = env::var("METADEX_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    match server::run_server(&bind_addr) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_rank(args: &[String]) -> i32 {
    let path = positional(args, 2).map(String::as_str).unwrap_or(DEFAULT_ROSTER_PATH);
    let as_table = args.iter().any(|arg| arg == "--table");

    let roster = match load_roster(path) {
        Ok(roster) => roster,
        Err(err) => {
            eprintln!("failed to load roster '{path}': {err}");
            return 1;
        }
    };
    let matrix = match ScoreMatrix::build(&roster) {
        Ok(matrix) => matrix,
        Err(err) => {
            eprintln!("failed to score roster: {err}");
            return 1;
        }
    };
    let ranked = rank_candidates(&matrix);

    if as_table {
        println!("rank\tname\taggregate_score");
        for (position, entry) in ranked.iter().enumerate() {
            println!("{}\t{}\t{}", position + 1, entry.name, entry.aggregate_score);
        }
        return 0;
    }
    match serde_json::to_string_pretty(&ranked) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize ranking: {err}");
            1
        }
    }
}

fn handle_matrix(args: &[String]) -> i32 {
    let path = positional(args, 2).map(String::as_str).unwrap_or(DEFAULT_ROSTER_PATH);
    let out = flag_value(args, "--out").unwrap_or("all_matchups.csv");

    let roster = match load_roster(path) {
        Ok(roster) => roster,
        Err(err) => {
            eprintln!("failed to load roster '{path}': {err}");
            return 1;
        }
    };
    let matrix = match ScoreMatrix::build(&roster) {
        Ok(matrix) => matrix,
        Err(err) => {
            eprintln!("failed to score roster: {err}");
            return 1;
        }
    };
    match export_matchups(&matrix, out) {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(payload) => {
                println!("{payload}");
                0
            }
            Err(err) => {
                eprintln!("failed to serialize export summary: {err}");
                1
            }
        },
        Err(err) => {
            eprintln!("failed to export matchups to '{out}': {err}");
            1
        }
    }
}

fn handle_team(args: &[String]) -> i32 {
    let Some(path) = positional(args, 2) else {
        eprintln!(
            "usage: metadex team <roster.csv> [size] [count] [budget_ms] \
             [--include NAME]... [--exclude NAME]... [--from-matchups] [--workers N]"
        );
        return 2;
    };

    let team_size = parse_usize_arg(positional(args, 3), "size", 3);
    let solution_count = parse_usize_arg(positional(args, 4), "count", 1);
    let budget_ms = parse_u64_arg(positional(args, 5), "budget_ms", 30_000);
    let from_matchups = args.iter().any(|arg| arg == "--from-matchups");

    let matrix = if from_matchups {
        match load_matchups(path) {
            Ok(matrix) => matrix,
            Err(err) => {
                eprintln!("failed to load matchup file '{path}': {err}");
                return 1;
            }
        }
    } else {
        let roster = match load_roster(path) {
            Ok(roster) => roster,
            Err(err) => {
                eprintln!("failed to load roster '{path}': {err}");
                return 1;
            }
        };
        match ScoreMatrix::build(&roster) {
            Ok(matrix) => matrix,
            Err(err) => {
                eprintln!("failed to score roster: {err}");
                return 1;
            }
        }
    };

    let request = TeamRequest {
        team_size,
        forced_include: flag_values(args, "--include"),
        forced_exclude: flag_values(args, "--exclude"),
        solution_count,
        round_budget: Duration::from_millis(budget_ms),
    };
    let pool = match flag_value(args, "--workers").and_then(|raw| raw.parse::<usize>().ok()) {
        Some(workers) => WorkerPool::fixed(workers),
        None => WorkerPool::global(),
    };

    match pool.run(|| enumerate_teams(&matrix, &request)) {
        Ok(sequence) => match serde_json::to_string_pretty(&sequence) {
            Ok(payload) => {
                println!("{payload}");
                0
            }
            Err(err) => {
                eprintln!("failed to serialize teams: {err}");
                1
            }
        },
        Err(err) => {
            eprintln!("team search rejected: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let path = positional(args, 2).map(String::as_str).unwrap_or(DEFAULT_ROSTER_PATH);

    match validate_roster_file(path) {
        Ok(report) if !report.has_errors() => {
            println!("validation passed: {path}");
            for diagnostic in &report.diagnostics {
                println!("- {diagnostic}");
            }
            0
        }
        Ok(report) => {
            eprintln!("validation failed: {} issue(s)", report.diagnostics.len());
            for diagnostic in &report.diagnostics {
                eprintln!("- {diagnostic}");
            }
            1
        }
        Err(message) => {
            eprintln!("validation failed: {message}");
            1
        }
    }
}

/// Positional argument at `index`, skipping flag tokens and flag values.
fn positional(args: &[String], index: usize) -> Option<&String> {
    let mut position = 0;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            if takes_value(arg) {
                iter.next();
            }
            continue;
        }
        if position == index {
            return Some(arg);
        }
        position += 1;
    }
    None
}

fn takes_value(flag: &str) -> bool {
    matches!(flag, "--include" | "--exclude" | "--out" | "--workers")
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|at| args.get(at + 1))
        .map(String::as_str)
}

fn flag_values(args: &[String], flag: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        if arg == flag {
            if let Some(value) = iter.next() {
                values.push(value.clone());
            }
        }
    }
    values
}

fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
