//! Self-play CLI.
//!
//! Plays games against random boards and outputs turn records as JSONL.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N       Number of games to play (default: 10)
//!   --rounds N      Boards per game (default: 20)
//!   --size WxH      Board size (default: 8x8)
//!   --max-points N  Highest cell value (default: 9)
//!   --strategy S    Move selection strategy (default: normalized)
//!   --movetime MS   Time budget per decision in ms (default: 2000)
//!   --threads N     Number of parallel threads (default: 4)
//!   --seed N        Random seed, 0 for entropy (default: 0)
//!   --output FILE   Output file path (default: stdout)
//!   --quiet         Suppress summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use cascade::selfplay::{self, SelfPlayConfig};

/// Parses the value following a flag, exiting with usage on failure.
fn parse_arg<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|v| v.parse::<T>()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid {} value", flag);
            print_usage();
            process::exit(1);
        }
    }
}

/// Parses `WxH` into (width, height).
fn parse_size(s: &str) -> Option<(usize, usize)> {
    let (w, h) = s.split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                i += 1;
                config.num_games = parse_arg(&args, i, "--games");
            }
            "--rounds" => {
                i += 1;
                config.rounds = parse_arg(&args, i, "--rounds");
            }
            "--size" => {
                i += 1;
                match args.get(i).and_then(|s| parse_size(s)) {
                    Some((w, h)) => {
                        config.width = w;
                        config.height = h;
                    }
                    None => {
                        eprintln!("invalid --size value, expected WxH");
                        process::exit(1);
                    }
                }
            }
            "--max-points" => {
                i += 1;
                config.max_points = parse_arg(&args, i, "--max-points");
            }
            "--strategy" => {
                i += 1;
                config.strategy = parse_arg(&args, i, "--strategy");
            }
            "--movetime" => {
                i += 1;
                config.movetime_ms = parse_arg(&args, i, "--movetime");
            }
            "--threads" => {
                i += 1;
                config.threads = parse_arg(&args, i, "--threads");
            }
            "--seed" => {
                i += 1;
                config.seed = parse_arg(&args, i, "--seed");
            }
            "--output" => {
                i += 1;
                output_path = args.get(i).cloned();
            }
            "--quiet" => {
                config.quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    if !config.quiet {
        eprintln!(
            "Self-play: {} games, {} rounds, {}x{} boards, strategy {}, {}ms/move, {} threads",
            config.num_games,
            config.rounds,
            config.width,
            config.height,
            config.strategy,
            config.movetime_ms,
            config.threads
        );
    }

    let start = Instant::now();
    let games = match selfplay::run_self_play(&config) {
        Ok(games) => games,
        Err(e) => {
            eprintln!("self-play: {}", e);
            process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    if !config.quiet {
        eprintln!(
            "Completed {} games in {:.1}s",
            games.len(),
            elapsed.as_secs_f64()
        );
        selfplay::print_summary(&games);
    }

    let written = match &output_path {
        Some(path) => File::create(path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            selfplay::write_jsonl(&games, &mut writer)
        }),
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            selfplay::write_jsonl(&games, &mut writer)
        }
    };

    match (written, output_path) {
        (Err(e), _) => {
            eprintln!("failed to write output: {}", e);
            process::exit(1);
        }
        (Ok(()), Some(path)) if !config.quiet => {
            eprintln!("Wrote {} games to {}", games.len(), path);
        }
        _ => {}
    }
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --rounds N       Boards per game (default: 20)");
    eprintln!("  --size WxH       Board size (default: 8x8)");
    eprintln!("  --max-points N   Highest cell value (default: 9)");
    eprintln!("  --strategy S     max_points | max_moves | max_points_max_moves |");
    eprintln!("                   max_points_max_extra_moves | normalized (default)");
    eprintln!("  --movetime MS    Time budget per decision in ms (default: 2000)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress summary output");
    eprintln!("  --help           Show this help");
}
