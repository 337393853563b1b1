//! Data ingestion.
//!
//! Defines the source traits the CLI pulls data through, and provides
//! HTTP implementations for the NBA stats API, a sportsbook odds feed and
//! the ESPN team schedule. Caching lives in the `Ingestor`, never in the
//! engine.

pub mod cache;
pub mod ingestor;
pub mod nba_stats;
pub mod odds;
pub mod schedule;
pub mod teams;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{GameRecord, Player, StatSelector};

/// Player identity, rosters and game logs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Resolve a player by full name (case-insensitive).
    /// Unknown names fail with `PropError::NotFound`.
    async fn find_player(&self, full_name: &str) -> Result<Player>;

    /// Players on a team's roster for a season.
    async fn team_roster(&self, team_id: u32, season: &str) -> Result<Vec<Player>>;

    /// Regular-season games for a player, oldest first, tagged with `season`.
    async fn game_log(&self, player_id: u32, season: &str) -> Result<Vec<GameRecord>>;
}

/// Live sportsbook lines.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LineSource: Send + Sync {
    /// Current line for a player's prop, if the book is offering one.
    async fn live_line(&self, player_name: &str, stat: StatSelector) -> Result<Option<f64>>;
}

/// Team schedules.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Code of the team's first opponent after `now`, if any game is scheduled.
    async fn next_opponent(&self, team_code: &str, now: DateTime<Utc>) -> Result<Option<String>>;
}
