//! cascade -- a chain-reaction board game engine.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! The game client relays each turn's board with `position`, asks for a
//! move with `go`, and submits the `bestmove` coordinates to the server.

use std::io::{self, BufRead};

use cascade::engine::Engine;
use cascade::protocol::parser::{parse_command, Command};

/// Runs the main protocol loop, reading commands from stdin
/// and writing responses to stdout.
fn main() {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        let written = match cmd {
            Command::Cascade => engine.handle_cascade(&mut out),
            Command::IsReady => engine.handle_isready(&mut out),
            Command::SetOption { name, value } => {
                if let Err(e) = engine.set_option(&name, value.as_deref()) {
                    eprintln!("setoption: {}", e);
                }
                Ok(())
            }
            Command::NewGame => {
                engine.new_game();
                Ok(())
            }
            Command::Position { json } => {
                if let Err(e) = engine.set_position(&json) {
                    eprintln!("position: {}", e);
                }
                Ok(())
            }
            Command::Go(params) => engine.handle_go(&params, &mut out),
            Command::Quit => break,
        };

        if let Err(e) = written {
            eprintln!("failed to write response: {}", e);
            break;
        }
    }
}
