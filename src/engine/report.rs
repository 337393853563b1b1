//! Prop performance report.
//!
//! Runs every engine operation for one query and bundles the results with
//! the optional live-line and next-opponent views. The report is what the
//! CLI prints (as text or JSON); it carries no rendering logic beyond a
//! plain `Display`.

use serde::Serialize;
use std::fmt;

use super::aggregate::{average_margin, group_by_opponent, hit_rate, opponent_profile};
use super::evaluate::{evaluate, evaluate_at_line};
use super::rolling::{predictive_line, rolling_average};
use super::units::cumulative_units;
use crate::types::{
    EvaluatedGame, GameRecord, OpponentSplit, PropError, PropQuery, StatAverages, StatLine,
};

/// Hit rate against the live sportsbook line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LiveLineSummary {
    pub line: f64,
    pub hit_rate: f64,
}

/// One row of the opponent breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpponentRow {
    pub opponent: String,
    #[serde(flatten)]
    pub split: OpponentSplit,
}

/// History against the upcoming opponent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextOpponent {
    pub code: String,
    /// `None` when the player has never faced this opponent in the sample.
    pub averages: Option<StatAverages>,
}

/// Everything computed for one query over one player's games.
#[derive(Debug, Clone, Serialize)]
pub struct PropReport {
    pub query: PropQuery,
    pub games_played: usize,
    pub hit_rate: f64,
    pub average_margin: f64,
    pub evaluated: Vec<EvaluatedGame>,
    pub rolling_average: Vec<Option<f64>>,
    pub cumulative_units: Vec<i64>,
    pub live: Option<LiveLineSummary>,
    pub predictive_line: StatLine,
    /// Sorted by descending hit rate, then opponent code.
    pub opponents: Vec<OpponentRow>,
    pub excluded_from_opponents: usize,
    pub next_opponent: Option<NextOpponent>,
}

impl PropReport {
    /// Build the report. Fails with `EmptyInput` when there are no games
    /// and with `InvalidParameter` when the live line is not finite.
    pub fn build(
        games: &[GameRecord],
        query: &PropQuery,
        live_line: Option<f64>,
        next_opponent: Option<&str>,
    ) -> Result<Self, PropError> {
        if games.is_empty() {
            return Err(PropError::EmptyInput("no games found".to_string()));
        }

        let evaluated = evaluate(games, query);
        let targets: Vec<f64> = evaluated.iter().map(|e| e.target).collect();

        let live = live_line
            .map(|line| -> Result<LiveLineSummary, PropError> {
                let at_live = evaluate_at_line(games, query, line)?;
                Ok(LiveLineSummary {
                    line,
                    hit_rate: hit_rate(&at_live)?,
                })
            })
            .transpose()?;

        let breakdown = group_by_opponent(&evaluated);
        let mut opponents: Vec<OpponentRow> = breakdown
            .by_opponent
            .into_iter()
            .map(|(opponent, split)| OpponentRow { opponent, split })
            .collect();
        opponents.sort_by(|a, b| {
            b.split
                .hit_rate
                .total_cmp(&a.split.hit_rate)
                .then_with(|| a.opponent.cmp(&b.opponent))
        });

        let next_opponent = next_opponent.map(|code| NextOpponent {
            code: code.to_uppercase(),
            averages: opponent_profile(games, code).ok(),
        });

        Ok(Self {
            query: *query,
            games_played: games.len(),
            hit_rate: hit_rate(&evaluated)?,
            average_margin: average_margin(&evaluated)?,
            rolling_average: rolling_average(&targets, query.rolling_window)?,
            cumulative_units: cumulative_units(&evaluated),
            predictive_line: predictive_line(games, query.rolling_window)?,
            evaluated,
            live,
            opponents,
            excluded_from_opponents: breakdown.excluded,
            next_opponent,
        })
    }

    /// Final running unit total (0 for an empty simulation).
    pub fn net_units(&self) -> i64 {
        self.cumulative_units.last().copied().unwrap_or(0)
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}"))
}

impl fmt::Display for PropReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Prop: {}", self.query)?;
        writeln!(f, "Games: {}", self.games_played)?;
        writeln!(f, "Hit rate: {:.1}%", self.hit_rate * 100.0)?;
        writeln!(f, "Avg margin: {:.2}", self.average_margin)?;
        if let Some(live) = &self.live {
            writeln!(
                f,
                "Live line {}: hit rate {:.1}%",
                live.line,
                live.hit_rate * 100.0
            )?;
        }
        writeln!(f, "Net units (flat 1u): {:+}", self.net_units())?;

        let p = &self.predictive_line;
        writeln!(
            f,
            "Rolling {} avg: {} PTS / {} REB / {} AST / {} 3PM",
            self.query.rolling_window,
            fmt_opt(p.points),
            fmt_opt(p.rebounds),
            fmt_opt(p.assists),
            fmt_opt(p.three_made),
        )?;

        if let Some(next) = &self.next_opponent {
            match &next.averages {
                Some(avg) => writeln!(f, "Vs next opponent {}: {}", next.code, avg)?,
                None => writeln!(f, "Vs next opponent {}: no prior games", next.code)?,
            }
        }

        if !self.opponents.is_empty() {
            writeln!(f, "Opponent breakdown:")?;
            for row in &self.opponents {
                writeln!(
                    f,
                    "  {:<4} {:>3} games  hit {:>5.1}%  margin {:+.2}",
                    row.opponent,
                    row.split.games,
                    row.split.hit_rate * 100.0,
                    row.split.average_margin,
                )?;
            }
        }
        if self.excluded_from_opponents > 0 {
            writeln!(
                f,
                "  ({} games with an unparseable matchup left out)",
                self.excluded_from_opponents
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{game, points_games};
    use crate::types::StatSelector;

    fn query() -> PropQuery {
        PropQuery::new(StatSelector::Points, 25.5, 2).unwrap()
    }

    #[test]
    fn test_build_reference_scenario() {
        let r = PropReport::build(&points_games(&[20, 30, 25, 15]), &query(), None, None).unwrap();
        assert_eq!(r.games_played, 4);
        assert_eq!(r.hit_rate, 0.25);
        assert_eq!(r.average_margin, -3.0);
        assert_eq!(r.cumulative_units, vec![-1, 0, -1, -2]);
        assert_eq!(r.net_units(), -2);
        assert_eq!(
            r.rolling_average,
            vec![None, Some(25.0), Some(27.5), Some(20.0)]
        );
        assert_eq!(r.predictive_line.points, Some(20.0));
        assert!(r.live.is_none());
        assert!(r.next_opponent.is_none());
    }

    #[test]
    fn test_build_empty_games_is_error() {
        assert!(matches!(
            PropReport::build(&[], &query(), Some(20.5), Some("LAL")),
            Err(PropError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_build_with_live_line() {
        let r = PropReport::build(&points_games(&[20, 30, 25, 15]), &query(), Some(19.5), None)
            .unwrap();
        let live = r.live.unwrap();
        assert_eq!(live.line, 19.5);
        assert_eq!(live.hit_rate, 0.75);
        // The base query is untouched by the live pass.
        assert_eq!(r.hit_rate, 0.25);
    }

    #[test]
    fn test_build_rejects_non_finite_live_line() {
        let games = points_games(&[20, 30, 25, 15]);
        for bad in [f64::NAN, f64::INFINITY] {
            assert!(matches!(
                PropReport::build(&games, &query(), Some(bad), None),
                Err(PropError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_opponents_sorted_by_hit_rate() {
        let games = vec![
            game("BOS vs. LAL", 10, 0, 0, 0),
            game("BOS @ MIA", 40, 0, 0, 0),
            game("BOS @ NYK", 30, 0, 0, 0),
            game("BOS vs. NYK", 10, 0, 0, 0),
            game("TBD", 40, 0, 0, 0),
        ];
        let r = PropReport::build(&games, &query(), None, None).unwrap();
        let order: Vec<&str> = r.opponents.iter().map(|o| o.opponent.as_str()).collect();
        assert_eq!(order, vec!["MIA", "NYK", "LAL"]);
        assert_eq!(r.excluded_from_opponents, 1);
    }

    #[test]
    fn test_next_opponent_with_history() {
        let games = vec![
            game("BOS vs. LAL", 30, 8, 6, 2),
            game("BOS @ MIA", 20, 5, 5, 1),
        ];
        let r = PropReport::build(&games, &query(), None, Some("lal")).unwrap();
        let next = r.next_opponent.unwrap();
        assert_eq!(next.code, "LAL");
        assert_eq!(next.averages.unwrap().points, 30.0);
    }

    #[test]
    fn test_next_opponent_never_faced() {
        let r = PropReport::build(&points_games(&[20, 30]), &query(), None, Some("DEN")).unwrap();
        let next = r.next_opponent.unwrap();
        assert_eq!(next.code, "DEN");
        assert!(next.averages.is_none());
    }

    #[test]
    fn test_display_summary() {
        let r = PropReport::build(&points_games(&[20, 30, 25, 15]), &query(), Some(19.5), None)
            .unwrap();
        let text = r.to_string();
        assert!(text.contains("Hit rate: 25.0%"));
        assert!(text.contains("Avg margin: -3.00"));
        assert!(text.contains("Live line 19.5: hit rate 75.0%"));
        assert!(text.contains("Net units (flat 1u): -2"));
    }

    #[test]
    fn test_report_serialises() {
        let r = PropReport::build(&points_games(&[20, 30]), &query(), None, None).unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["games_played"], 2);
        assert_eq!(json["query"]["stat_selector"], "points");
        assert!(json["rolling_average"][0].is_null());
    }
}
