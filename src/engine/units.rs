//! Flat-stake profit simulation.
//!
//! Models a one-unit wager on the over for every game: +1 on a hit,
//! -1 on a miss. No stake sizing, vig or payout odds.

use crate::types::EvaluatedGame;

/// Running unit total in input order. Same length as the input.
pub fn cumulative_units(evaluated: &[EvaluatedGame]) -> Vec<i64> {
    evaluated
        .iter()
        .scan(0i64, |total, e| {
            *total += if e.hit { 1 } else { -1 };
            Some(*total)
        })
        .collect()
}
