//! Offline self-play for comparing strategies.
//!
//! Plays games against randomly generated boards: every round draws a fresh
//! board, runs the decision cycle, and adds the chosen move's points to the
//! running score. Records every turn so strategies can be compared on the
//! same seeds without a game server.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::board::{Board, BoardError, Cell, Cursor, ALL_DIRECTIONS, MAX_POINTS};
use crate::search::{decide, DecideLimits, Strategy};

/// Configuration for self-play.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Boards played per game.
    pub rounds: usize,
    pub width: usize,
    pub height: usize,
    /// Cell points are drawn from `1..=max_points`.
    pub max_points: i64,
    pub strategy: Strategy,
    /// Time budget per decision (milliseconds).
    pub movetime_ms: u64,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress output.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            rounds: 20,
            width: 8,
            height: 8,
            max_points: 9,
            strategy: Strategy::Normalized,
            movetime_ms: 2000,
            threads: 4,
            seed: 0,
            quiet: false,
        }
    }
}

impl SelfPlayConfig {
    /// Checks that the configured boards can be built.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.height == 0 {
            return Err(BoardError::Empty);
        }
        if self.width == 0 {
            return Err(BoardError::EmptyRow(0));
        }
        Ok(())
    }
}

/// One played round.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    pub round: usize,
    /// Score before this round.
    pub score: i64,
    pub board: Vec<Vec<Cell>>,
    /// Chosen move, or None when the decision failed.
    pub cursor: Option<Cursor>,
    pub points: i64,
    pub moves: u32,
    pub extra_moves: i64,
    pub looped: usize,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A complete self-play game record.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    /// Sequential game ID.
    pub game_id: usize,
    pub strategy: String,
    pub final_score: i64,
    pub turns: Vec<TurnRecord>,
}

/// Draws a board with random points and directions.
pub fn random_board<R: Rng>(
    width: usize,
    height: usize,
    max_points: i64,
    rng: &mut R,
) -> Result<Board, BoardError> {
    let top = max_points.max(1);
    let rows = (0..height)
        .map(|_| {
            (0..width)
                .map(|_| {
                    let points = rng.gen_range(1..=top);
                    let direction = ALL_DIRECTIONS[rng.gen_range(0..ALL_DIRECTIONS.len())];
                    Cell::new(points, direction)
                })
                .collect()
        })
        .collect();
    Board::from_rows(rows)
}

/// Plays a single game on the calling thread.
pub fn play_game<R: Rng>(
    config: &SelfPlayConfig,
    game_id: usize,
    rng: &mut R,
) -> Result<GameRecord, BoardError> {
    let limits = DecideLimits {
        movetime: Duration::from_millis(config.movetime_ms),
        ..DecideLimits::default()
    };
    let mut score: i64 = 0;
    let mut turns = Vec::with_capacity(config.rounds);

    for round in 0..config.rounds {
        let board = random_board(config.width, config.height, config.max_points, rng)?;
        let stop = AtomicBool::new(false);
        let mut sink = io::sink();

        let turn = match decide(&board, score, config.strategy, &limits, None, &stop, &mut sink) {
            Ok(decision) => TurnRecord {
                round,
                score,
                board: board.to_rows(),
                cursor: Some(decision.cursor),
                points: decision.result.points,
                moves: decision.result.moves,
                extra_moves: decision.result.extra_moves,
                looped: decision.looped,
                elapsed_ms: decision.elapsed_ms,
                error: None,
            },
            Err(e) => TurnRecord {
                round,
                score,
                board: board.to_rows(),
                cursor: None,
                points: 0,
                moves: 0,
                extra_moves: 0,
                looped: 0,
                elapsed_ms: 0,
                error: Some(e.to_string()),
            },
        };

        score = (score + turn.points).clamp(-MAX_POINTS, MAX_POINTS);
        turns.push(turn);
    }

    Ok(GameRecord {
        game_id,
        strategy: config.strategy.to_string(),
        final_score: score,
        turns,
    })
}

/// Returns the RNG for game `i`.
fn game_rng(seed: u64, i: usize) -> SmallRng {
    if seed != 0 {
        SmallRng::seed_from_u64(seed.wrapping_add(i as u64))
    } else {
        SmallRng::from_entropy()
    }
}

/// Runs self-play, producing one record per game in game-ID order.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
pub fn run_self_play(config: &SelfPlayConfig) -> Result<Vec<GameRecord>, BoardError> {
    config.validate()?;
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, |game| games.push(game));
    games.sort_by_key(|g| g.game_id);
    Ok(games)
}

/// Runs self-play, calling `on_game` with each completed game record.
///
/// Games arrive in completion order. Configurations that fail
/// `validate` produce no games.
pub fn run_self_play_with_callback<F>(config: &SelfPlayConfig, on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    if let Err(e) = config.validate() {
        eprintln!("self-play: {}", e);
        return;
    }
    if config.threads > 1 {
        run_self_play_parallel(config, on_game);
    } else {
        run_self_play_sequential(config, on_game);
    }
}

fn report_game(config: &SelfPlayConfig, n: usize, game: &GameRecord, elapsed: Duration) {
    if !config.quiet {
        eprintln!(
            "Game {}/{}: score {} over {} rounds ({:.2}s)",
            n,
            config.num_games,
            game.final_score,
            game.turns.len(),
            elapsed.as_secs_f64(),
        );
    }
}

/// Sequential self-play: plays games one at a time.
fn run_self_play_sequential<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord),
{
    for i in 0..config.num_games {
        let mut rng = game_rng(config.seed, i);
        let game_start = Instant::now();
        match play_game(config, i, &mut rng) {
            Ok(game) => {
                report_game(config, i + 1, &game, game_start.elapsed());
                on_game(game);
            }
            Err(e) => eprintln!("Game {}: {}", i + 1, e),
        }
    }
}

/// Parallel self-play: plays games concurrently using rayon.
/// Uses a channel to deliver completed games to the callback from worker threads.
fn run_self_play_parallel<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("failed to build thread pool, playing sequentially: {}", e);
            return run_self_play_sequential(config, on_game);
        }
    };

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<GameRecord>();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            pool.install(|| {
                (0..config.num_games)
                    .into_par_iter()
                    .for_each_with(tx, |tx, i| {
                        let mut rng = game_rng(config.seed, i);
                        let game_start = Instant::now();
                        match play_game(config, i, &mut rng) {
                            Ok(game) => {
                                let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                                report_game(config, n, &game, game_start.elapsed());
                                let _ = tx.send(game);
                            }
                            Err(e) => eprintln!("Game {}: {}", i + 1, e),
                        }
                    });
            });
        });

        // Receive completed games on this thread and pass to callback.
        for game in rx {
            on_game(game);
        }
    });
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Prints aggregate statistics over a batch of games to stderr.
pub fn print_summary(games: &[GameRecord]) {
    let total = games.len();
    let scores: Vec<i64> = games.iter().map(|g| g.final_score).collect();
    let turns: Vec<&TurnRecord> = games.iter().flat_map(|g| g.turns.iter()).collect();
    let failed = turns.iter().filter(|t| t.error.is_some()).count();
    let total_moves: u64 = turns.iter().map(|t| u64::from(t.moves)).sum();

    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {}", total);
    if let Some(strategy) = games.first().map(|g| g.strategy.as_str()) {
        eprintln!("Strategy: {}", strategy);
    }
    eprintln!(
        "Avg score/game: {:.1}",
        scores.iter().sum::<i64>() as f64 / total.max(1) as f64
    );
    eprintln!(
        "Min/max score: {} / {}",
        scores.iter().min().copied().unwrap_or(0),
        scores.iter().max().copied().unwrap_or(0)
    );
    eprintln!(
        "Avg chain length: {:.2}",
        total_moves as f64 / turns.len().max(1) as f64
    );
    eprintln!("Failed decisions: {}", failed);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SelfPlayConfig {
        SelfPlayConfig {
            num_games: 3,
            rounds: 4,
            width: 4,
            height: 4,
            movetime_ms: 2000,
            threads: 1,
            seed: 42,
            quiet: true,
            ..Default::default()
        }
    }

    #[test]
    fn random_board_has_requested_shape() {
        let mut rng = SmallRng::seed_from_u64(7);
        let board = random_board(5, 3, 9, &mut rng).unwrap();
        assert_eq!(board.width(), 5);
        assert_eq!(board.height(), 3);
        for row in board.rows() {
            for cell in row {
                assert!((1..=9).contains(&cell.points));
                assert!(!cell.consumed);
            }
        }
    }

    #[test]
    fn random_board_rejects_oversized_points() {
        let mut rng = SmallRng::seed_from_u64(7);
        let err = random_board(4, 4, i64::MAX, &mut rng).unwrap_err();
        assert_eq!(err, BoardError::PointsOutOfRange);
    }

    #[test]
    fn play_single_game_completes() {
        let config = small_config();
        let mut rng = SmallRng::seed_from_u64(42);
        let game = play_game(&config, 0, &mut rng).unwrap();
        assert_eq!(game.turns.len(), 4);
        assert!(game.turns.iter().all(|t| t.cursor.is_some()));
        let total: i64 = game.turns.iter().map(|t| t.points).sum();
        assert_eq!(game.final_score, total);
        // Each turn records the score it started from.
        assert_eq!(game.turns[0].score, 0);
        assert_eq!(game.turns[1].score, game.turns[0].points);
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let config = small_config();
        let a = run_self_play(&config).unwrap();
        let b = run_self_play(&config).unwrap();
        let scores_a: Vec<i64> = a.iter().map(|g| g.final_score).collect();
        let scores_b: Vec<i64> = b.iter().map(|g| g.final_score).collect();
        assert_eq!(scores_a, scores_b);
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let seq = run_self_play(&small_config()).unwrap();
        let par = run_self_play(&SelfPlayConfig {
            threads: 3,
            ..small_config()
        })
        .unwrap();
        assert_eq!(par.len(), 3);
        for (s, p) in seq.iter().zip(par.iter()) {
            assert_eq!(s.game_id, p.game_id);
            assert_eq!(s.final_score, p.final_score);
        }
    }

    #[test]
    fn zero_sized_boards_are_rejected() {
        let config = SelfPlayConfig {
            width: 0,
            ..small_config()
        };
        assert_eq!(run_self_play(&config).unwrap_err(), BoardError::EmptyRow(0));
    }

    #[test]
    fn write_jsonl_emits_one_line_per_game() {
        let games = run_self_play(&SelfPlayConfig {
            num_games: 2,
            rounds: 1,
            ..small_config()
        })
        .unwrap();
        let mut out = Vec::new();
        write_jsonl(&games, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["game_id"], 0);
        assert_eq!(first["strategy"], "normalized");
        assert!(first["turns"][0]["cursor"]["x"].is_i64());
    }
}
