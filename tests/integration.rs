//! Integration tests for the cascade engine binary.
//!
//! Tests the full protocol session flow by spawning the engine process,
//! sending commands via stdin, and verifying stdout responses.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

/// Sends a sequence of commands to the engine and collects stdout lines.
fn run_engine(commands: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_cascade");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start cascade");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

/// Returns the JSON object of the last `bestmove` line.
fn bestmove(lines: &[String]) -> serde_json::Value {
    let line = lines
        .iter()
        .rev()
        .find(|l| l.starts_with("bestmove "))
        .expect("no bestmove line");
    serde_json::from_str(line.strip_prefix("bestmove ").unwrap()).expect("bestmove is not JSON")
}

/// A 3x3 turn where (0,0) sweeps the whole top row and then the right column.
const POSITION: &str = r#"position {"board": [[{"points": 1, "direction": "right"}, {"points": 1, "direction": "right"}, {"points": 1, "direction": "down"}], [{"points": 1, "direction": "left"}, {"points": 1, "direction": "left"}, {"points": 1, "direction": "down"}], [{"points": 1, "direction": "up"}, {"points": 1, "direction": "up"}, {"points": 1, "direction": "down"}]], "score": 0, "moves": 5}"#;

/// Single-cell board from the scoring examples.
const SINGLE_CELL: &str = r#"position {"board": [[{"points": 5, "direction": "left"}]], "score": 0}"#;

#[test]
fn handshake_lists_options() {
    let lines = run_engine(&["cascade", "quit"]);

    assert!(lines.iter().any(|l| l == "id name cascade"));
    let option_lines: Vec<&String> = lines.iter().filter(|l| l.starts_with("option ")).collect();
    assert!(!option_lines.is_empty(), "handshake should include option declarations");
    for opt in &option_lines {
        assert!(opt.contains("type "), "option line missing type: {}", opt);
    }
    assert_eq!(lines.last().map(String::as_str), Some("cascadeok"));
}

#[test]
fn isready_response() {
    let lines = run_engine(&["isready", "quit"]);
    assert!(lines.contains(&"readyok".to_string()));
}

#[test]
fn unknown_commands_are_ignored() {
    let lines = run_engine(&["foobar", "position", "isready", "quit"]);
    assert_eq!(lines, vec!["readyok".to_string()]);
}

#[test]
fn go_returns_move_json() {
    let lines = run_engine(&[POSITION, "go", "quit"]);
    let mv = bestmove(&lines);
    // (0,0) consumes the top row and right column: 5 cells plus both bonuses.
    assert_eq!(mv["x"], 0);
    assert_eq!(mv["y"], 0);
    assert!(lines.iter().any(|l| l == "info moves 5"));
    assert!(lines.iter().any(|l| l.starts_with("info strategy normalized cursor 0 0")));
}

#[test]
fn every_strategy_answers() {
    for strategy in [
        "max_points",
        "max_moves",
        "max_points_max_moves",
        "max_points_max_extra_moves",
        "normalized",
    ] {
        let setopt = format!("setoption name Strategy value {}", strategy);
        let lines = run_engine(&[&setopt, POSITION, "go", "quit"]);
        let mv = bestmove(&lines);
        assert!(mv["x"].is_i64() && mv["y"].is_i64(), "{}: {:?}", strategy, lines);
        let expected = format!("info strategy {} cursor", strategy);
        assert!(lines.iter().any(|l| l.starts_with(&expected)), "{:?}", lines);
    }
}

#[test]
fn single_cell_board_scores_bonus() {
    let lines = run_engine(&[SINGLE_CELL, "go strategy max_points", "quit"]);
    assert!(
        lines
            .iter()
            .any(|l| l == "info strategy max_points cursor 0 0 points 25 moves 1 extra 0"),
        "{:?}",
        lines
    );
    let mv = bestmove(&lines);
    assert_eq!(mv, serde_json::json!({"x": 0, "y": 0}));
}

#[test]
fn go_without_position_reports_error() {
    let lines = run_engine(&["go", "quit"]);
    assert!(lines.iter().any(|l| l == "info error no position set"));
    assert_eq!(lines.last().map(String::as_str), Some("bestmove none"));
}

#[test]
fn malformed_position_is_rejected() {
    let ragged = r#"position {"board": [[{"points": 1, "direction": "up"}, {"points": 1, "direction": "up"}], [{"points": 1, "direction": "up"}]]}"#;
    let lines = run_engine(&[ragged, "go", "quit"]);
    assert!(lines.iter().any(|l| l == "info error no position set"));
}

#[test]
fn unknown_strategy_aborts_turn() {
    let lines = run_engine(&[POSITION, "go strategy greedy", "go", "quit"]);
    assert!(lines.iter().any(|l| l == "info error unknown strategy 'greedy'"));
    assert!(lines.iter().any(|l| l == "bestmove none"));
    // The position survives and the next turn still answers.
    assert_eq!(lines.last().map(String::as_str), Some(r#"bestmove {"x":0,"y":0}"#));
}

#[test]
fn step_cap_reports_loops() {
    let cycle = r#"position {"board": [[{"points": 1, "direction": "right"}, {"points": 2, "direction": "down"}], [{"points": 4, "direction": "up"}, {"points": 3, "direction": "left"}]]}"#;
    let lines = run_engine(&["setoption name MaxSteps value 3", cycle, "go", "quit"]);
    assert!(
        lines
            .iter()
            .any(|l| l == "info error every one of 4 starting cells hit the step cap"),
        "{:?}",
        lines
    );
    assert_eq!(lines.last().map(String::as_str), Some("bestmove none"));
}

#[test]
fn sequential_and_parallel_sessions_agree() {
    let seq = run_engine(&["setoption name Threads value 1", POSITION, "go", "quit"]);
    let par = run_engine(&["setoption name Threads value 4", POSITION, "go", "quit"]);
    assert_eq!(bestmove(&seq), bestmove(&par));
}
