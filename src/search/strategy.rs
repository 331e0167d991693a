//! Move selection strategies.
//!
//! Each strategy picks one result from the full list of evaluated starting
//! cells. Ties are broken by row-major position (top row first, then left
//! to right), so the choice never depends on the order results arrived in.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::eval::SimulationResult;

/// Weight of scaled points in the normalized score; moves get the rest.
pub const POINTS_WEIGHT: f64 = 0.55;

/// How many top-scoring results `max_points_max_moves` compares by length.
pub const TOP_POINTS_POOL: usize = 5;

/// Errors raised while choosing a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrategyError {
    #[error("unknown strategy '{0}'")]
    Unknown(String),

    #[error("no candidate moves to choose from")]
    NoCandidates,
}

/// A named rule for choosing a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Greatest points.
    MaxPoints,
    /// Longest chain.
    MaxMoves,
    /// Longest chain among the five highest-scoring.
    MaxPointsMaxMoves,
    /// Most extra moves, or greatest points when nothing earns extra moves.
    MaxPointsMaxExtraMoves,
    /// Weighted blend of points and extra moves, each scaled to the best.
    Normalized,
}

/// All strategies, in a fixed order.
pub const ALL_STRATEGIES: [Strategy; 5] = [
    Strategy::MaxPoints,
    Strategy::MaxMoves,
    Strategy::MaxPointsMaxMoves,
    Strategy::MaxPointsMaxExtraMoves,
    Strategy::Normalized,
];

impl Strategy {
    /// Returns the strategy's protocol name.
    pub const fn name(self) -> &'static str {
        match self {
            Strategy::MaxPoints => "max_points",
            Strategy::MaxMoves => "max_moves",
            Strategy::MaxPointsMaxMoves => "max_points_max_moves",
            Strategy::MaxPointsMaxExtraMoves => "max_points_max_extra_moves",
            Strategy::Normalized => "normalized",
        }
    }

    /// Picks one result. The input order does not affect the outcome.
    pub fn select<'a>(
        self,
        results: &'a [SimulationResult],
    ) -> Result<&'a SimulationResult, StrategyError> {
        if results.is_empty() {
            return Err(StrategyError::NoCandidates);
        }

        let chosen = match self {
            Strategy::MaxPoints => max_points(results),
            Strategy::MaxMoves => best_by(results, |r| r.moves),
            Strategy::MaxPointsMaxMoves => max_points_max_moves(results),
            Strategy::MaxPointsMaxExtraMoves => {
                match best_by(results, |r| r.extra_moves) {
                    Some(best) if best.extra_moves > 0 => Some(best),
                    _ => max_points(results),
                }
            }
            Strategy::Normalized => normalized(results),
        };

        chosen.ok_or(StrategyError::NoCandidates)
    }
}

impl FromStr for Strategy {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_STRATEGIES
            .iter()
            .copied()
            .find(|st| st.name() == s)
            .ok_or_else(|| StrategyError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Row-major sort key of a result's starting cell.
fn position(r: &SimulationResult) -> (i32, i32) {
    (r.cursor.y, r.cursor.x)
}

/// Total order used everywhere: key descending, then position ascending.
fn rank<K: PartialOrd>(a: (&SimulationResult, &K), b: (&SimulationResult, &K)) -> Ordering {
    match b.1.partial_cmp(a.1) {
        Some(Ordering::Equal) | None => position(a.0).cmp(&position(b.0)),
        Some(ord) => ord,
    }
}

/// Returns the result ranked first by `key`.
fn best_by<K, F>(results: &[SimulationResult], key: F) -> Option<&SimulationResult>
where
    K: PartialOrd,
    F: Fn(&SimulationResult) -> K,
{
    let mut best: Option<(&SimulationResult, K)> = None;
    for r in results {
        let k = key(r);
        let better = match &best {
            None => true,
            Some((b, bk)) => rank((r, &k), (*b, bk)) == Ordering::Less,
        };
        if better {
            best = Some((r, k));
        }
    }
    best.map(|(r, _)| r)
}

fn max_points(results: &[SimulationResult]) -> Option<&SimulationResult> {
    best_by(results, |r| r.points)
}

fn max_points_max_moves(results: &[SimulationResult]) -> Option<&SimulationResult> {
    let mut ranked: Vec<&SimulationResult> = results.iter().collect();
    ranked.sort_by(|a, b| rank((*a, &a.points), (*b, &b.points)));
    ranked.truncate(TOP_POINTS_POOL);
    // Stable: equal lengths keep their points ranking.
    ranked.sort_by(|a, b| b.moves.cmp(&a.moves));
    ranked.first().copied()
}

/// Scales `value` by `max`, or 0 when `max` is 0.
fn scaled(value: i64, max: i64) -> f64 {
    if max == 0 {
        0.0
    } else {
        value as f64 / max as f64
    }
}

/// Weighted score of one result against the best points and extra moves.
pub fn normalized_score(r: &SimulationResult, max_points: i64, max_extra: i64) -> f64 {
    scaled(r.points, max_points) * POINTS_WEIGHT
        + scaled(r.extra_moves, max_extra) * (1.0 - POINTS_WEIGHT)
}

fn normalized(results: &[SimulationResult]) -> Option<&SimulationResult> {
    let max_points = results.iter().map(|r| r.points).max()?;
    let max_extra = results.iter().map(|r| r.extra_moves).max()?;
    best_by(results, |r| normalized_score(r, max_points, max_extra))
}
