//! Mock data sources for integration testing.
//!
//! Deterministic `StatsSource`, `LineSource` and `ScheduleSource`
//! implementations that serve canned data, count calls and can be told
//! to fail, all in-memory with no network access.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use propstats::data::cache::Clock;
use propstats::data::{LineSource, ScheduleSource, StatsSource};
use propstats::types::{GameRecord, Player, PropError, StatSelector};

pub const TATUM_ID: u32 = 1628369;

/// Clock that only moves when `advance` is called.
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
}

impl MockClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Canned stats provider keyed by player id and season.
#[derive(Clone)]
pub struct MockStats {
    players: Vec<Player>,
    logs: HashMap<(u32, String), Vec<GameRecord>>,
    pub game_log_calls: Arc<AtomicUsize>,
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockStats {
    pub fn new() -> Self {
        let mut logs = HashMap::new();
        logs.insert((TATUM_ID, "2022-23".to_string()), Self::season_2022());
        logs.insert((TATUM_ID, "2023-24".to_string()), Self::season_2023());

        Self {
            players: vec![
                Player { id: TATUM_ID, full_name: "Jayson Tatum".into() },
                Player { id: 1627759, full_name: "Jaylen Brown".into() },
            ],
            logs,
            game_log_calls: Arc::new(AtomicUsize::new(0)),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Force all subsequent game-log fetches to fail.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    fn game(y: i32, m: u32, d: u32, matchup: &str, line: [u32; 4], season: &str) -> GameRecord {
        GameRecord::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            matchup,
            line[0],
            line[1],
            line[2],
            line[3],
            season,
        )
    }

    fn season_2022() -> Vec<GameRecord> {
        let s = "2022-23";
        vec![
            Self::game(2023, 3, 1, "BOS vs. NYK", [20, 8, 4, 2], s),
            Self::game(2023, 3, 3, "BOS @ MIA", [30, 10, 5, 4], s),
        ]
    }

    /// Points: 20, 30, 25, 15, 28 against LAL, NYK, MIA, LAL and an unparseable matchup.
    fn season_2023() -> Vec<GameRecord> {
        let s = "2023-24";
        vec![
            Self::game(2024, 1, 2, "BOS vs. LAL", [20, 9, 3, 1], s),
            Self::game(2024, 1, 4, "BOS @ NYK", [30, 11, 6, 5], s),
            Self::game(2024, 1, 6, "BOS vs. MIA", [25, 7, 4, 3], s),
            Self::game(2024, 1, 8, "BOS @ LAL", [15, 6, 2, 1], s),
            Self::game(2024, 1, 10, "BOS (neutral site)", [28, 8, 5, 2], s),
        ]
    }
}

#[async_trait]
impl StatsSource for MockStats {
    async fn find_player(&self, full_name: &str) -> Result<Player> {
        self.players
            .iter()
            .find(|p| p.full_name.eq_ignore_ascii_case(full_name))
            .cloned()
            .ok_or_else(|| PropError::not_found("Player", full_name).into())
    }

    async fn team_roster(&self, _team_id: u32, _season: &str) -> Result<Vec<Player>> {
        Ok(self.players.clone())
    }

    async fn game_log(&self, player_id: u32, season: &str) -> Result<Vec<GameRecord>> {
        self.game_log_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{msg}"));
        }
        Ok(self
            .logs
            .get(&(player_id, season.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

/// Serves a fixed line, or fails when built with `failing()`.
pub struct MockLines {
    line: Option<f64>,
    fail: bool,
}

impl MockLines {
    pub fn with_line(line: Option<f64>) -> Self {
        Self { line, fail: false }
    }

    pub fn failing() -> Self {
        Self { line: None, fail: true }
    }
}

#[async_trait]
impl LineSource for MockLines {
    async fn live_line(&self, _player_name: &str, _stat: StatSelector) -> Result<Option<f64>> {
        if self.fail {
            return Err(anyhow!("odds feed unavailable"));
        }
        Ok(self.line)
    }
}

/// Always reports the same next opponent and counts lookups.
pub struct MockSchedule {
    opponent: Option<String>,
    pub calls: Arc<AtomicUsize>,
}

impl MockSchedule {
    pub fn new(opponent: Option<&str>) -> Self {
        Self {
            opponent: opponent.map(str::to_string),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ScheduleSource for MockSchedule {
    async fn next_opponent(&self, _team_code: &str, _now: DateTime<Utc>) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.opponent.clone())
    }
}
