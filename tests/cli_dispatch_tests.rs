use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_metadex")
}

fn unique_temp_path(name: &str, extension: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("metadex-{name}-{stamp}.{extension}"))
}

fn write_triangle_roster(name: &str) -> PathBuf {
    let path = unique_temp_path(name, "csv");
    fs::write(
        &path,
        "name,type1,type2,fire,water,grass\n\
         A,fire,,1,2,1\n\
         B,water,,1,1,2\n\
         C,grass,,2,1,1\n\
         D,fire,water,1,2,2\n",
    )
    .expect("roster fixture should be writable");
    path
}

#[test]
fn rank_command_emits_ordered_json() {
    let roster = write_triangle_roster("rank");
    let output = Command::new(bin())
        .args(["rank", roster.to_str().unwrap()])
        .output()
        .expect("rank should run");
    fs::remove_file(&roster).ok();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("rank should emit json");
    let entries = payload.as_array().expect("ranking should be an array");
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["name"], "B", "water tops the triangle meta");

    let mut prior: Option<i64> = None;
    for entry in entries {
        let score = entry["aggregate_score"].as_i64().expect("score");
        if let Some(previous) = prior {
            assert!(previous >= score, "ranking should be descending");
        }
        prior = Some(score);
    }
}

#[test]
fn rank_command_supports_table_output() {
    let roster = write_triangle_roster("rank-table");
    let output = Command::new(bin())
        .args(["rank", roster.to_str().unwrap(), "--table"])
        .output()
        .expect("rank should run");
    fs::remove_file(&roster).ok();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("rank\tname\taggregate_score"));
    assert_eq!(stdout.lines().count(), 5);
}

#[test]
fn team_command_returns_full_teams() {
    let roster = write_triangle_roster("team");
    let output = Command::new(bin())
        .args(["team", roster.to_str().unwrap(), "2", "3", "5000"])
        .output()
        .expect("team should run");
    fs::remove_file(&roster).ok();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("team should emit json");
    let teams = payload["teams"].as_array().expect("teams array");
    assert_eq!(teams.len(), 3);
    for team in teams {
        assert_eq!(team["members"].as_array().map(Vec::len), Some(2));
        assert_eq!(team["status"], "proven_optimal");
    }
    assert_eq!(teams[0]["members"][0], "A");
    assert_eq!(teams[0]["members"][1], "B");
}

#[test]
fn team_command_honors_constraint_flags() {
    let roster = write_triangle_roster("team-flags");
    let output = Command::new(bin())
        .args([
            "team",
            roster.to_str().unwrap(),
            "2",
            "--include",
            "C",
            "--exclude",
            "B",
        ])
        .output()
        .expect("team should run");
    fs::remove_file(&roster).ok();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("team should emit json");
    let members = payload["teams"][0]["members"]
        .as_array()
        .expect("members array");
    assert!(members.iter().any(|member| member == "C"));
    assert!(members.iter().all(|member| member != "B"));
}

#[test]
fn matrix_export_feeds_team_search() {
    let roster = write_triangle_roster("matrix");
    let matchups = unique_temp_path("matchups", "csv");

    let export = Command::new(bin())
        .args([
            "matrix",
            roster.to_str().unwrap(),
            "--out",
            matchups.to_str().unwrap(),
        ])
        .output()
        .expect("matrix should run");
    assert_eq!(export.status.code(), Some(0));
    let summary: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&export.stdout))
            .expect("matrix should emit a summary");
    assert_eq!(summary["candidates"], 4);
    assert_eq!(summary["pairs"], 12);

    let team = Command::new(bin())
        .args([
            "team",
            matchups.to_str().unwrap(),
            "2",
            "--from-matchups",
        ])
        .output()
        .expect("team should run");
    fs::remove_file(&roster).ok();
    fs::remove_file(&matchups).ok();

    assert_eq!(team.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&team.stdout))
            .expect("team should emit json");
    assert_eq!(payload["teams"][0]["objective"], 2);
}

#[test]
fn validate_command_reports_duplicate_names() {
    let path = unique_temp_path("validate", "csv");
    fs::write(&path, "name,type1\nMew,psychic\nMew,psychic\n").expect("fixture");

    let output = Command::new(bin())
        .args(["validate", path.to_str().unwrap()])
        .output()
        .expect("validate should run");
    fs::remove_file(&path).ok();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate name"));
}

#[test]
fn unknown_command_prints_usage() {
    let output = Command::new(bin())
        .arg("shuffle")
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: metadex"));
}
