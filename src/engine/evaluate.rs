//! Prop evaluation.
//!
//! Joins each game record with a query: selects the target stat, decides
//! hit/miss against the line and records the signed margin.

use crate::types::{EvaluatedGame, GameRecord, PropError, PropQuery};

/// Evaluate every game against the query, preserving input order.
///
/// `hit` is a strict `target > line`: a game landing exactly on the line
/// is a miss. Empty input yields empty output.
pub fn evaluate(games: &[GameRecord], query: &PropQuery) -> Vec<EvaluatedGame> {
    games
        .iter()
        .map(|game| {
            let target = f64::from(game.stat(query.stat_selector));
            EvaluatedGame {
                game: game.clone(),
                target,
                hit: target > query.line,
                margin: target - query.line,
            }
        })
        .collect()
}

/// Re-run `evaluate` with a substituted line (e.g. the live sportsbook line).
///
/// Fails with `InvalidParameter` when the line is not finite.
pub fn evaluate_at_line(
    games: &[GameRecord],
    query: &PropQuery,
    line: f64,
) -> Result<Vec<EvaluatedGame>, PropError> {
    Ok(evaluate(games, &query.with_line(line)?))
}

/// Keep games whose matchup contains `needle`, ignoring case.
///
/// An empty (or whitespace-only) needle keeps everything.
pub fn filter_by_matchup(games: &[GameRecord], needle: &str) -> Vec<GameRecord> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return games.to_vec();
    }
    games
        .iter()
        .filter(|g| g.matchup.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
