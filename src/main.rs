//! PROPSTATS: NBA player prop analytics
//!
//! Entry point. Loads configuration, initialises structured logging,
//! resolves the team and player, pulls game logs plus the live line and
//! next opponent, and prints the prop report.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};

use propstats::config::AppConfig;
use propstats::data::cache::SystemClock;
use propstats::data::ingestor::Ingestor;
use propstats::data::nba_stats::NbaStatsClient;
use propstats::data::odds::OddsClient;
use propstats::data::schedule::EspnScheduleClient;
use propstats::data::teams;
use propstats::engine::{filter_by_matchup, PropReport};
use propstats::types::{PropQuery, StatSelector, Team};

const DEFAULT_CONFIG: &str = "config.toml";

#[derive(Parser)]
#[command(name = "propstats")]
#[command(author, version, about = "NBA player prop hit-rate analytics", long_about = None)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG)]
    config: String,

    /// Team full name ("Boston Celtics") or code ("BOS")
    #[arg(short, long)]
    team: String,

    /// Player full name
    #[arg(short, long)]
    player: String,

    /// Stat to evaluate: points, rebounds, assists, pra, 3pm
    #[arg(short, long)]
    stat: Option<StatSelector>,

    /// Prop line to evaluate against
    #[arg(short, long, allow_negative_numbers = true)]
    line: Option<f64>,

    /// Rolling average window (games)
    #[arg(short, long)]
    window: Option<usize>,

    /// Season to include, e.g. 2023-24 (repeatable)
    #[arg(long = "season")]
    seasons: Vec<String>,

    /// Only keep games whose matchup contains this text
    #[arg(short, long)]
    filter: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    let cfg = AppConfig::load(&cli.config)?;

    init_logging();

    let query = PropQuery::new(
        cli.stat.unwrap_or(cfg.query.stat),
        cli.line.unwrap_or(cfg.query.line),
        cli.window.unwrap_or(cfg.query.rolling_window),
    )?;
    let seasons = if cli.seasons.is_empty() {
        cfg.query.seasons.clone()
    } else {
        cli.seasons.clone()
    };
    let team = teams::resolve(&cli.team)?;

    info!(
        app = %cfg.app.name,
        team = team.abbreviation,
        player = %cli.player,
        query = %query,
        seasons = ?seasons,
        "PROPSTATS starting"
    );

    let mut ingestor = build_ingestor(&cfg)?;
    let report = run(&mut ingestor, &cli, team, &query, &seasons).await?;

    info!(
        calls = ingestor.total_calls(),
        cache_hits = ingestor.cache_hits(),
        "Report ready"
    );

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else {
        println!("{} ({})", cli.player, team.full_name);
        print!("{report}");
    }
    Ok(())
}

/// Wire the HTTP sources behind an `Ingestor`.
fn build_ingestor(cfg: &AppConfig) -> Result<Ingestor> {
    let timeout = cfg.request_timeout();
    let ua = cfg.app.user_agent.as_str();

    let stats = NbaStatsClient::new(
        &cfg.sources.stats_base_url,
        &cfg.sources.player_index_season,
        timeout,
        ua,
    )?;
    let odds = OddsClient::new(&cfg.sources.odds_base_url, cfg.odds_api_key(), timeout, ua)?;
    if !odds.is_enabled() {
        warn!("No odds API key configured, live lines disabled");
    }
    let schedule = EspnScheduleClient::new(&cfg.sources.schedule_base_url, timeout, ua)?;

    Ok(Ingestor::new(
        Box::new(stats),
        Box::new(odds),
        Box::new(schedule),
        &cfg.cache,
        Arc::new(SystemClock),
    ))
}

/// Fetch everything the report needs and build it.
///
/// Roster, live line and schedule failures degrade to warnings; player
/// resolution and game logs are required.
async fn run(
    ingestor: &mut Ingestor,
    cli: &Cli,
    team: &Team,
    query: &PropQuery,
    seasons: &[String],
) -> Result<PropReport> {
    if let Some(latest) = seasons.last() {
        match ingestor.team_roster(team.id, latest).await {
            Ok(roster) => {
                if !roster.iter().any(|p| p.full_name.eq_ignore_ascii_case(cli.player.trim())) {
                    warn!(
                        player = %cli.player,
                        team = team.abbreviation,
                        season = %latest,
                        "Player is not on this team's roster"
                    );
                }
            }
            Err(e) => warn!(error = %e, "Roster lookup failed"),
        }
    }

    let player = ingestor.find_player(&cli.player).await?;
    let mut games = ingestor.game_logs(player.id, seasons).await?;

    if let Some(needle) = cli.filter.as_deref() {
        let before = games.len();
        games = filter_by_matchup(&games, needle);
        info!(filter = needle, before, after = games.len(), "Matchup filter applied");
    }

    let live_line = match ingestor.live_line(&player.full_name, query.stat_selector).await {
        Ok(line) => line,
        Err(e) => {
            warn!(error = %e, "Live line lookup failed");
            None
        }
    };

    let next_opponent = match ingestor.next_opponent(team.abbreviation).await {
        Ok(code) => code,
        Err(e) => {
            warn!(error = %e, "Opponent detection failed");
            None
        }
    };

    PropReport::build(&games, query, live_line, next_opponent.as_deref()).with_context(|| {
        format!(
            "Cannot build report for {} ({})",
            player.full_name,
            seasons.join(", ")
        )
    })
}

/// Initialise the `tracing` subscriber. Logs go to stderr so `--json`
/// output on stdout stays machine-readable.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("propstats=info"));

    let json_logging = std::env::var("PROPSTATS_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
