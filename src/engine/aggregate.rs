//! Aggregates over evaluated games: hit rate, average margin and the
//! per-opponent breakdown.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{
    EvaluatedGame, GameRecord, OpponentBreakdown, OpponentSplit, PropError, StatAverages,
};

/// Fraction of games that hit, in `[0, 1]`.
pub fn hit_rate(evaluated: &[EvaluatedGame]) -> Result<f64, PropError> {
    if evaluated.is_empty() {
        return Err(PropError::EmptyInput("hit rate over zero games".to_string()));
    }
    let hits = evaluated.iter().filter(|e| e.hit).count();
    Ok(hits as f64 / evaluated.len() as f64)
}

/// Arithmetic mean of the margins.
pub fn average_margin(evaluated: &[EvaluatedGame]) -> Result<f64, PropError> {
    if evaluated.is_empty() {
        return Err(PropError::EmptyInput(
            "average margin over zero games".to_string(),
        ));
    }
    Ok(evaluated.iter().map(|e| e.margin).sum::<f64>() / evaluated.len() as f64)
}

/// Partition by uppercase opponent code and aggregate each partition.
///
/// Games without a parseable opponent are excluded from every partition;
/// they are counted in `excluded` rather than given an "unknown" bucket.
pub fn group_by_opponent(evaluated: &[EvaluatedGame]) -> OpponentBreakdown {
    let mut tallies: HashMap<String, Tally> = HashMap::new();
    let mut excluded = 0;

    for e in evaluated {
        match e.game.require_opponent() {
            Ok(code) => tallies.entry(code.to_uppercase()).or_default().add(e),
            Err(err) => {
                debug!(date = %e.game.date, error = %err, "Excluding game from opponent breakdown");
                excluded += 1;
            }
        }
    }

    let by_opponent = tallies
        .into_iter()
        .map(|(code, tally)| (code, tally.split()))
        .collect();

    OpponentBreakdown {
        by_opponent,
        excluded,
    }
}

/// Running counts for one opponent. Only created on a first game, so
/// `games` is at least 1 when `split` runs.
#[derive(Default)]
struct Tally {
    games: usize,
    hits: usize,
    margin_sum: f64,
}

impl Tally {
    fn add(&mut self, e: &EvaluatedGame) {
        self.games += 1;
        self.hits += usize::from(e.hit);
        self.margin_sum += e.margin;
    }

    fn split(&self) -> OpponentSplit {
        let n = self.games as f64;
        OpponentSplit {
            games: self.games,
            hit_rate: self.hits as f64 / n,
            average_margin: self.margin_sum / n,
        }
    }
}

/// Mean box-score line against one opponent (matched case-insensitively).
pub fn opponent_profile(games: &[GameRecord], opponent: &str) -> Result<StatAverages, PropError> {
    let wanted = opponent.to_uppercase();
    let vs: Vec<&GameRecord> = games
        .iter()
        .filter(|g| {
            g.opponent
                .as_deref()
                .is_some_and(|o| o.to_uppercase() == wanted)
        })
        .collect();

    if vs.is_empty() {
        return Err(PropError::EmptyInput(format!("no games against {wanted}")));
    }

    let n = vs.len() as f64;
    let mean = |f: fn(&GameRecord) -> u32| vs.iter().map(|g| f64::from(f(g))).sum::<f64>() / n;

    Ok(StatAverages {
        games: vs.len(),
        points: mean(|g| g.points),
        rebounds: mean(|g| g.rebounds),
        assists: mean(|g| g.assists),
        three_made: mean(|g| g.three_made),
    })
}
