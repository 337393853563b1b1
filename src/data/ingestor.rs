//! Ingestion pipeline.
//!
//! Owns the data sources and the TTL caches in front of them. Game logs
//! are cached per `(player, season)` and the next opponent per team; live
//! lines are always fetched fresh.

use anyhow::{Context, Result};
use chrono::Duration;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info};

use super::cache::{Clock, TtlCache};
use super::{LineSource, ScheduleSource, StatsSource};
use crate::config::CacheConfig;
use crate::types::{GameRecord, Player, StatSelector};

/// Fetches through the sources, consulting the caches first.
pub struct Ingestor {
    stats: Box<dyn StatsSource>,
    lines: Box<dyn LineSource>,
    schedule: Box<dyn ScheduleSource>,
    clock: Arc<dyn Clock>,
    game_logs: TtlCache<(u32, String), Vec<GameRecord>>,
    opponents: TtlCache<String, Option<String>>,
    total_calls: u64,
    cache_hits: u64,
}

impl Ingestor {
    pub fn new(
        stats: Box<dyn StatsSource>,
        lines: Box<dyn LineSource>,
        schedule: Box<dyn ScheduleSource>,
        cache: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            stats,
            lines,
            schedule,
            game_logs: TtlCache::new(Duration::seconds(cache.game_log_ttl_secs), clock.clone()),
            opponents: TtlCache::new(Duration::seconds(cache.schedule_ttl_secs), clock.clone()),
            clock,
            total_calls: 0,
            cache_hits: 0,
        }
    }

    pub async fn find_player(&mut self, full_name: &str) -> Result<Player> {
        self.total_calls += 1;
        self.stats
            .find_player(full_name)
            .await
            .with_context(|| format!("Failed to resolve player {full_name}"))
    }

    pub async fn team_roster(&mut self, team_id: u32, season: &str) -> Result<Vec<Player>> {
        self.total_calls += 1;
        self.stats
            .team_roster(team_id, season)
            .await
            .with_context(|| format!("Failed to fetch roster for team {team_id} ({season})"))
    }

    /// Game logs for each season, concatenated in the order given.
    ///
    /// Seasons missing from the cache are fetched concurrently. Any failed
    /// season fails the whole call; successful ones are still cached.
    pub async fn game_logs(&mut self, player_id: u32, seasons: &[String]) -> Result<Vec<GameRecord>> {
        self.game_logs.evict_expired();

        let misses: Vec<&String> = seasons
            .iter()
            .filter(|s| self.game_logs.get(&(player_id, (*s).clone())).is_none())
            .collect();
        self.cache_hits += (seasons.len() - misses.len()) as u64;

        let stats = &self.stats;
        let fetched = join_all(misses.iter().map(|s| stats.game_log(player_id, s))).await;
        self.total_calls += fetched.len() as u64;

        let mut first_err = None;
        for (season, result) in misses.iter().zip(fetched) {
            match result {
                Ok(games) => self.game_logs.insert((player_id, (*season).clone()), games),
                Err(e) if first_err.is_none() => {
                    first_err = Some(e.context(format!("Failed to fetch {season} game log")));
                }
                Err(_) => {}
            }
        }
        if let Some(e) = first_err {
            return Err(e);
        }

        let mut all = Vec::new();
        for season in seasons {
            let games = self
                .game_logs
                .get(&(player_id, season.clone()))
                .with_context(|| format!("{season} game log missing after fetch"))?;
            all.extend(games);
        }

        info!(
            player_id,
            seasons = seasons.len(),
            games = all.len(),
            cache_hits = self.cache_hits,
            "Game logs ready"
        );
        Ok(all)
    }

    /// Current sportsbook line. Never cached.
    pub async fn live_line(&mut self, player_name: &str, stat: StatSelector) -> Result<Option<f64>> {
        self.total_calls += 1;
        self.lines.live_line(player_name, stat).await
    }

    /// The team's next opponent, cached per team code.
    pub async fn next_opponent(&mut self, team_code: &str) -> Result<Option<String>> {
        let key = team_code.to_uppercase();
        if let Some(cached) = self.opponents.get(&key) {
            debug!(team = %key, "Next opponent cache hit");
            self.cache_hits += 1;
            return Ok(cached);
        }

        self.total_calls += 1;
        let opponent = self.schedule.next_opponent(&key, self.clock.now()).await?;
        self.opponents.insert(key, opponent.clone());
        Ok(opponent)
    }

    pub fn total_calls(&self) -> u64 {
        self.total_calls
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
