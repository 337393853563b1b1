//! Shared types for PROPSTATS.
//!
//! These types form the data model used across the engine, the ingestion
//! sources and the CLI. Game records are immutable once fetched; every
//! derived value (targets, hits, margins) is recomputed per query.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Game records
// ---------------------------------------------------------------------------

/// One played game for a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub date: NaiveDate,
    /// Free text such as `"BOS vs. LAL"` (home) or `"BOS @ LAL"` (away).
    pub matchup: String,
    /// Opponent team code parsed from `matchup`. `None` when unparseable.
    pub opponent: Option<String>,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub three_made: u32,
    /// Season identifier the record was fetched for, e.g. `"2023-24"`.
    pub season: String,
}

impl GameRecord {
    /// Build a record, deriving `opponent` from `matchup`.
    pub fn new(
        date: NaiveDate,
        matchup: impl Into<String>,
        points: u32,
        rebounds: u32,
        assists: u32,
        three_made: u32,
        season: impl Into<String>,
    ) -> Self {
        let matchup = matchup.into();
        let opponent = parse_opponent(&matchup);
        Self {
            date,
            matchup,
            opponent,
            points,
            rebounds,
            assists,
            three_made,
            season: season.into(),
        }
    }

    /// Points + rebounds + assists (PRA). Saturates at `u32::MAX`.
    pub fn combined(&self) -> u32 {
        self.points
            .saturating_add(self.rebounds)
            .saturating_add(self.assists)
    }

    /// Value of the selected stat for this game.
    pub fn stat(&self, selector: StatSelector) -> u32 {
        match selector {
            StatSelector::Points => self.points,
            StatSelector::Rebounds => self.rebounds,
            StatSelector::Assists => self.assists,
            StatSelector::Combined => self.combined(),
            StatSelector::ThreeMade => self.three_made,
        }
    }

    /// The opponent code, or `MissingOpponent` when the matchup did not parse.
    pub fn require_opponent(&self) -> Result<&str, PropError> {
        self.opponent
            .as_deref()
            .ok_or_else(|| PropError::MissingOpponent {
                matchup: self.matchup.clone(),
            })
    }
}

impl fmt::Display for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} PTS / {} REB / {} AST / {} 3PM",
            self.date, self.matchup, self.points, self.rebounds, self.assists, self.three_made,
        )
    }
}

/// Extract the opponent code from a matchup string.
///
/// Recognises `"@ XXX"` and `"vs. XXX"`, where `XXX` is a run of word
/// characters. Whichever pattern occurs first in the string wins.
pub fn parse_opponent(matchup: &str) -> Option<String> {
    static OPPONENT: OnceLock<Regex> = OnceLock::new();
    let re = OPPONENT.get_or_init(|| {
        Regex::new(r"@ (\w+)|vs\. (\w+)").expect("opponent pattern is valid")
    });

    let caps = re.captures(matchup)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Which stat a prop is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatSelector {
    Points,
    Rebounds,
    Assists,
    /// Points + rebounds + assists.
    #[serde(alias = "pra")]
    Combined,
    #[serde(alias = "3pm")]
    ThreeMade,
}

impl StatSelector {
    /// Substring matched against a sportsbook market name.
    pub fn market_key(&self) -> &'static str {
        match self {
            StatSelector::Points => "points",
            StatSelector::Rebounds => "rebounds",
            StatSelector::Assists => "assists",
            StatSelector::Combined => "pra",
            StatSelector::ThreeMade => "3pm",
        }
    }
}

impl fmt::Display for StatSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatSelector::Points => write!(f, "Points"),
            StatSelector::Rebounds => write!(f, "Rebounds"),
            StatSelector::Assists => write!(f, "Assists"),
            StatSelector::Combined => write!(f, "PRA"),
            StatSelector::ThreeMade => write!(f, "3PM"),
        }
    }
}

impl FromStr for StatSelector {
    type Err = PropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "points" | "pts" => Ok(StatSelector::Points),
            "rebounds" | "reb" => Ok(StatSelector::Rebounds),
            "assists" | "ast" => Ok(StatSelector::Assists),
            "combined" | "pra" => Ok(StatSelector::Combined),
            "three_made" | "3pm" | "fg3m" => Ok(StatSelector::ThreeMade),
            other => Err(PropError::InvalidParameter(format!(
                "unknown stat selector '{other}'"
            ))),
        }
    }
}

/// User-specified evaluation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropQuery {
    pub stat_selector: StatSelector,
    pub line: f64,
    pub rolling_window: usize,
}

impl PropQuery {
    /// Validate and build a query. The line must be finite and the
    /// rolling window at least 1.
    pub fn new(stat_selector: StatSelector, line: f64, rolling_window: usize) -> Result<Self, PropError> {
        if !line.is_finite() {
            return Err(PropError::InvalidParameter(format!(
                "line must be finite, got {line}"
            )));
        }
        if rolling_window < 1 {
            return Err(PropError::InvalidParameter(
                "rolling window must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            stat_selector,
            line,
            rolling_window,
        })
    }

    /// The same query evaluated against a different line. The new line
    /// goes through the same validation as `new`.
    pub fn with_line(&self, line: f64) -> Result<Self, PropError> {
        Self::new(self.stat_selector, line, self.rolling_window)
    }
}

impl fmt::Display for PropQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} over {} (rolling window {})",
            self.stat_selector, self.line, self.rolling_window
        )
    }
}

// ---------------------------------------------------------------------------
// Evaluation results
// ---------------------------------------------------------------------------

/// A game record joined with the outcome of a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedGame {
    pub game: GameRecord,
    pub target: f64,
    /// `target > line`; a tie is a miss.
    pub hit: bool,
    pub margin: f64,
}

/// Per-stat values, each optional (e.g. the latest rolling average).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StatLine {
    pub points: Option<f64>,
    pub rebounds: Option<f64>,
    pub assists: Option<f64>,
    pub three_made: Option<f64>,
}

/// Per-stat means over a set of games.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatAverages {
    pub games: usize,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub three_made: f64,
}

impl fmt::Display for StatAverages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1} PTS / {:.1} REB / {:.1} AST / {:.1} 3PM over {} games",
            self.points, self.rebounds, self.assists, self.three_made, self.games
        )
    }
}

/// Hit rate and average margin against a single opponent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OpponentSplit {
    pub games: usize,
    pub hit_rate: f64,
    pub average_margin: f64,
}

/// Result of partitioning evaluated games by opponent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpponentBreakdown {
    /// Keyed by uppercase opponent code. Iteration order is unspecified.
    pub by_opponent: HashMap<String, OpponentSplit>,
    /// Records left out because their opponent could not be parsed.
    pub excluded: usize,
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// An NBA franchise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: u32,
    pub abbreviation: &'static str,
    pub full_name: &'static str,
}

/// A player as known to the stats provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub full_name: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for PROPSTATS.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Missing opponent in matchup '{matchup}'")]
    MissingOpponent { matchup: String },

    #[error("{kind} not found: {name}")]
    NotFound { kind: String, name: String },
}

impl PropError {
    pub fn not_found(kind: &str, name: &str) -> Self {
        PropError::NotFound {
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
