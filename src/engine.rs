//! Engine state management.
//!
//! Holds the current position, the typed engine options, and the worker
//! pool, and runs the decision cycle for the `go` command.

use std::io::{self, Write};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::protocol::json::{format_move, parse_position, JsonError, Position};
use crate::protocol::parser::GoParams;
use crate::search::{decide, DecideError, DecideLimits, Decision, Strategy, StrategyError};

/// Default decision time budget in milliseconds.
const DEFAULT_MOVETIME_MS: u64 = 5000;

/// Default number of evaluation threads.
const DEFAULT_THREADS: usize = 4;

/// Engine configuration, set through `setoption`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub strategy: Strategy,
    /// Evaluation threads; 1 evaluates on the calling thread.
    pub threads: usize,
    pub movetime_ms: u64,
    /// Step cap per chain; None derives it from the board size.
    pub max_steps: Option<u32>,
    pub verbose: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            strategy: Strategy::Normalized,
            threads: DEFAULT_THREADS,
            movetime_ms: DEFAULT_MOVETIME_MS,
            max_steps: None,
            verbose: false,
        }
    }
}

/// Errors from `setoption`. The option keeps its previous value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    #[error("unknown option '{0}'")]
    Unknown(String),

    #[error("option '{0}' needs a value")]
    MissingValue(String),

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidValue { name: String, value: String },

    #[error(transparent)]
    Strategy(#[from] StrategyError),
}

/// Errors that prevent the engine from producing a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("no position set")]
    NoPosition,

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error(transparent)]
    Decide(#[from] DecideError),
}

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub position: Option<Position>,
    pub options: EngineOptions,
    pool: Option<ThreadPool>,
}

impl Engine {
    /// Creates a new engine with default options and no position.
    pub fn new() -> Self {
        Engine {
            position: None,
            options: EngineOptions::default(),
            pool: None,
        }
    }

    /// Resets the position for a new game. Options are kept.
    pub fn new_game(&mut self) {
        self.position = None;
    }

    /// Sets the current position from a JSON game-state object.
    /// The previous position is kept on failure.
    pub fn set_position(&mut self, json: &str) -> Result<(), JsonError> {
        self.position = Some(parse_position(json)?);
        Ok(())
    }

    /// Sets an engine option by name.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), OptionError> {
        let invalid = |v: &str| OptionError::InvalidValue {
            name: name.to_string(),
            value: v.to_string(),
        };

        match name {
            "Strategy" => {
                let v = value.ok_or_else(|| OptionError::MissingValue(name.to_string()))?;
                self.options.strategy = v.parse()?;
            }
            "Threads" => {
                let v = value.ok_or_else(|| OptionError::MissingValue(name.to_string()))?;
                let threads = v.parse::<usize>().map_err(|_| invalid(v))?;
                if threads == 0 {
                    return Err(invalid(v));
                }
                if threads != self.options.threads {
                    self.options.threads = threads;
                    self.pool = None;
                }
            }
            "MoveTime" => {
                let v = value.ok_or_else(|| OptionError::MissingValue(name.to_string()))?;
                self.options.movetime_ms = v.parse().map_err(|_| invalid(v))?;
            }
            "MaxSteps" => {
                let v = value.ok_or_else(|| OptionError::MissingValue(name.to_string()))?;
                let steps = v.parse::<u32>().map_err(|_| invalid(v))?;
                self.options.max_steps = if steps == 0 { None } else { Some(steps) };
            }
            "Verbose" => {
                // A bare `setoption name Verbose` switches it on.
                self.options.verbose = match value {
                    None | Some("true") => true,
                    Some("false") => false,
                    Some(v) => return Err(invalid(v)),
                };
            }
            other => return Err(OptionError::Unknown(other.to_string())),
        }
        Ok(())
    }

    /// Returns the worker pool, building it on first use. Falls back to
    /// sequential evaluation when one thread is configured or the pool
    /// cannot be built.
    fn pool(&mut self) -> Option<&ThreadPool> {
        if self.options.threads <= 1 {
            return None;
        }
        if self.pool.is_none() {
            match ThreadPoolBuilder::new()
                .num_threads(self.options.threads)
                .build()
            {
                Ok(pool) => self.pool = Some(pool),
                Err(e) => {
                    eprintln!("failed to build worker pool, evaluating sequentially: {}", e);
                    return None;
                }
            }
        }
        self.pool.as_ref()
    }

    /// Chooses a move for the current position.
    pub fn go<W: Write>(&mut self, params: &GoParams, out: &mut W) -> Result<Decision, EngineError> {
        let strategy = match &params.strategy {
            Some(name) => name.parse::<Strategy>()?,
            None => self.options.strategy,
        };
        let limits = DecideLimits {
            movetime: Duration::from_millis(params.movetime.unwrap_or(self.options.movetime_ms)),
            max_steps: self.options.max_steps,
            verbose: self.options.verbose,
        };

        // Take the position out so the pool can be borrowed mutably.
        let position = self.position.take().ok_or(EngineError::NoPosition)?;
        if let Some(moves) = position.moves {
            let _ = writeln!(out, "info moves {}", moves);
        }
        let stop = AtomicBool::new(false);
        let result = decide(
            &position.board,
            position.score,
            strategy,
            &limits,
            self.pool(),
            &stop,
            out,
        );
        self.position = Some(position);

        Ok(result?)
    }

    /// Handles the handshake: writes id, options, and `cascadeok`.
    pub fn handle_cascade<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name cascade")?;
        writeln!(out, "id author cascade")?;
        writeln!(
            out,
            "option name Strategy type combo default {} var max_points var max_moves var max_points_max_moves var max_points_max_extra_moves var normalized",
            EngineOptions::default().strategy
        )?;
        writeln!(
            out,
            "option name Threads type spin default {} min 1 max 64",
            DEFAULT_THREADS
        )?;
        writeln!(
            out,
            "option name MoveTime type spin default {} min 0 max 60000",
            DEFAULT_MOVETIME_MS
        )?;
        writeln!(out, "option name MaxSteps type spin default 0 min 0")?;
        writeln!(out, "option name Verbose type check default false")?;
        writeln!(out, "cascadeok")?;
        out.flush()
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Handles the `go` command: writes `bestmove {"x":..,"y":..}`, or an
    /// `info error` line followed by `bestmove none` when no move can be
    /// chosen.
    pub fn handle_go<W: Write>(&mut self, params: &GoParams, out: &mut W) -> io::Result<()> {
        match self.go(params, out) {
            Ok(decision) => writeln!(out, "bestmove {}", format_move(decision.cursor))?,
            Err(e) => {
                writeln!(out, "info error {}", e)?;
                writeln!(out, "bestmove none")?;
            }
        }
        out.flush()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
