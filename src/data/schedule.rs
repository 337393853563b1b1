//! Next-opponent lookup from the ESPN team schedule.
//!
//! API: `https://site.api.espn.com/apis/site/v2/sports/basketball/nba/teams/{code}/schedule`
//! Auth: None.
//! ESPN writes a few team codes differently from the NBA (`GS`, `NY`, ...);
//! codes are translated in both directions via `teams`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::teams;
use super::ScheduleSource;

pub const DEFAULT_BASE_URL: &str = "https://site.api.espn.com/apis/site/v2/sports/basketball/nba";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    events: Vec<ScheduleEvent>,
}

#[derive(Debug, Deserialize)]
struct ScheduleEvent {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    competitions: Vec<Competition>,
}

#[derive(Debug, Deserialize)]
struct Competition {
    #[serde(default)]
    competitors: Vec<Competitor>,
}

#[derive(Debug, Deserialize)]
struct Competitor {
    team: CompetitorTeam,
}

#[derive(Debug, Deserialize)]
struct CompetitorTeam {
    abbreviation: String,
}

/// ESPN timestamps, e.g. `"2024-10-22T23:30Z"` (no seconds) or full RFC 3339.
pub fn parse_event_time(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let trimmed = raw.trim_end_matches('Z');
    for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.and_utc());
        }
    }
    bail!("Unrecognised event time: {raw}")
}

/// First event strictly after `now` → the competitor that isn't `team_code`.
fn next_opponent_in(resp: &ScheduleResponse, team_code: &str, now: DateTime<Utc>) -> Option<String> {
    let own = team_code.to_uppercase();

    for event in &resp.events {
        let Some(raw) = event.date.as_deref() else {
            continue;
        };
        let when = match parse_event_time(raw) {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "Skipping schedule event with bad date");
                continue;
            }
        };
        if when <= now {
            continue;
        }

        let Some(competition) = event.competitions.first() else {
            continue;
        };
        return competition
            .competitors
            .iter()
            .map(|c| teams::from_espn_code(&c.team.abbreviation))
            .find(|code| *code != own);
    }
    None
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct EspnScheduleClient {
    http: Client,
    base_url: String,
}

impl EspnScheduleClient {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client for ESPN schedule")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ScheduleSource for EspnScheduleClient {
    async fn next_opponent(&self, team_code: &str, now: DateTime<Utc>) -> Result<Option<String>> {
        let espn_code = teams::to_espn_code(team_code).to_lowercase();
        let url = format!("{}/teams/{espn_code}/schedule", self.base_url);
        debug!(url = %url, "Fetching team schedule");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("ESPN schedule request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            bail!("ESPN schedule error {status} for {team_code}");
        }

        let schedule: ScheduleResponse = resp
            .json()
            .await
            .context("Failed to parse ESPN schedule response")?;

        let opponent = next_opponent_in(&schedule, team_code, now);
        debug!(team = team_code, opponent = ?opponent, "Next opponent resolved");
        Ok(opponent)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
