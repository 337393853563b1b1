//! NBA stats API client.
//!
//! Player index, team rosters and per-season game logs from the public
//! stats.nba.com JSON endpoints.
//!
//! API: `https://stats.nba.com/stats/`
//! Auth: None, but the API rejects requests without browser-like
//! `Referer`/`Origin` headers.
//! Every endpoint answers with `resultSets`: named tables of `headers`
//! plus positional `rowSet` rows. Columns are looked up by header name.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::StatsSource;
use crate::types::{GameRecord, Player, PropError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://stats.nba.com/stats";

const SEASON_TYPE: &str = "Regular Season";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    result_sets: Vec<ResultSet>,
}

/// One named table from a `resultSets` payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSet {
    name: String,
    headers: Vec<String>,
    row_set: Vec<Vec<Value>>,
}

impl StatsResponse {
    fn table(self, name: &str) -> Result<ResultSet> {
        self.result_sets
            .into_iter()
            .find(|rs| rs.name == name)
            .with_context(|| format!("resultSets has no '{name}' table"))
    }
}

impl ResultSet {
    fn column(&self, header: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == header)
            .with_context(|| format!("'{}' table has no {header} column", self.name))
    }
}

fn cell_str<'a>(row: &'a [Value], idx: usize, header: &str) -> Result<&'a str> {
    row.get(idx)
        .and_then(Value::as_str)
        .with_context(|| format!("{header} is not a string"))
}

/// Counting stat cell. Older seasons report untracked stats as null; those read as 0.
fn cell_count(row: &[Value], idx: usize, header: &str) -> Result<u32> {
    match row.get(idx) {
        Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => {
            let v = n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
                .with_context(|| format!("{header} is negative: {n}"))?;
            u32::try_from(v).with_context(|| format!("{header} out of range: {v}"))
        }
        other => bail!("{header} is not a number: {other:?}"),
    }
}

fn cell_id(row: &[Value], idx: usize, header: &str) -> Result<u32> {
    match row.get(idx) {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .with_context(|| format!("{header} is not an id: {n}")),
        Some(Value::String(s)) => s
            .parse()
            .with_context(|| format!("{header} is not an id: {s}")),
        other => bail!("{header} is not an id: {other:?}"),
    }
}

/// Parse `"APR 14, 2024"` (game logs) or an ISO `"2024-04-14..."` date.
pub fn parse_game_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Some(iso) = raw.get(..10) {
        if let Ok(d) = NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
            return Ok(d);
        }
    }

    let lower = raw.to_lowercase();
    let mut chars = lower.chars();
    let title: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => bail!("empty game date"),
    };
    NaiveDate::parse_from_str(&title, "%b %d, %Y")
        .with_context(|| format!("Unrecognised game date: {raw}"))
}

// ---------------------------------------------------------------------------
// Table → domain conversion
// ---------------------------------------------------------------------------

fn parse_game_log(resp: StatsResponse, season: &str) -> Result<Vec<GameRecord>> {
    let table = resp.table("PlayerGameLog")?;
    let date_i = table.column("GAME_DATE")?;
    let matchup_i = table.column("MATCHUP")?;
    let pts_i = table.column("PTS")?;
    let reb_i = table.column("REB")?;
    let ast_i = table.column("AST")?;
    let fg3m_i = table.column("FG3M")?;

    let mut games = table
        .row_set
        .iter()
        .map(|row| -> Result<GameRecord> {
            Ok(GameRecord::new(
                parse_game_date(cell_str(row, date_i, "GAME_DATE")?)?,
                cell_str(row, matchup_i, "MATCHUP")?,
                cell_count(row, pts_i, "PTS")?,
                cell_count(row, reb_i, "REB")?,
                cell_count(row, ast_i, "AST")?,
                cell_count(row, fg3m_i, "FG3M")?,
                season,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    // The API lists newest first; the engine expects chronological order.
    games.sort_by_key(|g| g.date);
    Ok(games)
}

fn parse_roster(resp: StatsResponse) -> Result<Vec<Player>> {
    let table = resp.table("CommonTeamRoster")?;
    let name_i = table.column("PLAYER")?;
    let id_i = table.column("PLAYER_ID")?;

    table
        .row_set
        .iter()
        .map(|row| -> Result<Player> {
            Ok(Player {
                id: cell_id(row, id_i, "PLAYER_ID")?,
                full_name: cell_str(row, name_i, "PLAYER")?.to_string(),
            })
        })
        .collect()
}

fn find_in_index(resp: StatsResponse, full_name: &str) -> Result<Player> {
    let table = resp.table("CommonAllPlayers")?;
    let name_i = table.column("DISPLAY_FIRST_LAST")?;
    let id_i = table.column("PERSON_ID")?;
    let wanted = full_name.trim();

    for row in &table.row_set {
        let name = cell_str(row, name_i, "DISPLAY_FIRST_LAST")?;
        if name.eq_ignore_ascii_case(wanted) {
            return Ok(Player {
                id: cell_id(row, id_i, "PERSON_ID")?,
                full_name: name.to_string(),
            });
        }
    }
    Err(PropError::not_found("Player", wanted).into())
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// stats.nba.com client.
pub struct NbaStatsClient {
    http: Client,
    base_url: String,
    /// Season passed to the player index endpoint.
    index_season: String,
}

impl NbaStatsClient {
    pub fn new(base_url: &str, index_season: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client for NBA stats")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            index_season: index_season.to_string(),
        })
    }

    async fn get(&self, endpoint: &str, query: &str) -> Result<StatsResponse> {
        let url = format!("{}/{endpoint}?{query}", self.base_url);
        debug!(url = %url, "Fetching NBA stats");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("NBA stats request failed: {endpoint}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("NBA stats API error {status} on {endpoint}: {body}");
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse NBA stats {endpoint} response"))
    }
}

#[async_trait]
impl StatsSource for NbaStatsClient {
    async fn find_player(&self, full_name: &str) -> Result<Player> {
        let query = format!(
            "LeagueID=00&Season={}&IsOnlyCurrentSeason=0",
            urlencoding::encode(&self.index_season)
        );
        let resp = self.get("commonallplayers", &query).await?;
        let player = find_in_index(resp, full_name)?;
        debug!(player = %player.full_name, id = player.id, "Player resolved");
        Ok(player)
    }

    async fn team_roster(&self, team_id: u32, season: &str) -> Result<Vec<Player>> {
        let query = format!("TeamID={team_id}&Season={}", urlencoding::encode(season));
        let resp = self.get("commonteamroster", &query).await?;
        let roster = parse_roster(resp)?;
        debug!(team_id, season, players = roster.len(), "Roster fetched");
        Ok(roster)
    }

    async fn game_log(&self, player_id: u32, season: &str) -> Result<Vec<GameRecord>> {
        let query = format!(
            "PlayerID={player_id}&Season={}&SeasonType={}",
            urlencoding::encode(season),
            urlencoding::encode(SEASON_TYPE),
        );
        let resp = self.get("playergamelog", &query).await?;
        let games = parse_game_log(resp, season)?;
        info!(player_id, season, games = games.len(), "Game log fetched");
        Ok(games)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
