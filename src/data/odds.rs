//! Live player-prop lines from the SportsGameOdds feed.
//!
//! API: `https://api.sportsgameodds.com/v2/events`
//! Auth: `X-API-Key` header. Without a key the client is disabled and
//! reports no line rather than failing.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::LineSource;
use crate::types::StatSelector;

pub const DEFAULT_BASE_URL: &str = "https://api.sportsgameodds.com/v2";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<OddsEvent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OddsEvent {
    #[serde(default)]
    player_props: Vec<PlayerProp>,
}

#[derive(Debug, Deserialize)]
struct PlayerProp {
    #[serde(default)]
    name: String,
    #[serde(default)]
    market: String,
    /// Books publish lines as numbers or numeric strings.
    #[serde(default)]
    line: Value,
}

fn line_value(v: &Value) -> Option<f64> {
    let line = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    line.filter(|l| l.is_finite())
}

/// First prop whose name contains the player and whose market contains the
/// stat's market key, both compared case-insensitively.
fn find_line(resp: &EventsResponse, player_name: &str, stat: StatSelector) -> Option<f64> {
    let player = player_name.to_lowercase();
    let market = stat.market_key();

    resp.events
        .iter()
        .flat_map(|e| e.player_props.iter())
        .find(|p| {
            p.name.to_lowercase().contains(&player) && p.market.to_lowercase().contains(market)
        })
        .and_then(|p| line_value(&p.line))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct OddsClient {
    http: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl OddsClient {
    pub fn new(
        base_url: &str,
        api_key: Option<SecretString>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client for odds feed")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl LineSource for OddsClient {
    async fn live_line(&self, player_name: &str, stat: StatSelector) -> Result<Option<f64>> {
        let Some(key) = &self.api_key else {
            debug!("No odds API key configured, skipping live line");
            return Ok(None);
        };

        let url = format!("{}/events", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("X-API-Key", key.expose_secret().as_str())
            .send()
            .await
            .context("Odds API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("Odds API error {status}: {body}");
        }

        let events: EventsResponse = resp
            .json()
            .await
            .context("Failed to parse odds events response")?;

        let line = find_line(&events, player_name, stat);
        info!(player = player_name, market = stat.market_key(), line = ?line, "Live line lookup");
        Ok(line)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
