//! End-to-end runs of the ingest → engine → report path.

use chrono::{TimeZone, Utc};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use propstats::config::CacheConfig;
use propstats::data::cache::SystemClock;
use propstats::data::ingestor::Ingestor;
use propstats::data::teams;
use propstats::engine::{self, PropReport};
use propstats::types::{PropError, PropQuery, StatSelector};

use crate::mock_sources::{MockClock, MockLines, MockSchedule, MockStats, TATUM_ID};

fn ingestor(stats: MockStats, lines: MockLines, schedule: MockSchedule) -> Ingestor {
    Ingestor::new(
        Box::new(stats),
        Box::new(lines),
        Box::new(schedule),
        &CacheConfig::default(),
        Arc::new(SystemClock),
    )
}

fn points_query(line: f64, window: usize) -> PropQuery {
    PropQuery::new(StatSelector::Points, line, window).unwrap()
}

#[tokio::test]
async fn test_full_report_single_season() {
    let mut ing = ingestor(
        MockStats::new(),
        MockLines::with_line(Some(19.5)),
        MockSchedule::new(Some("LAL")),
    );

    let player = ing.find_player("jayson tatum").await.unwrap();
    assert_eq!(player.id, TATUM_ID);

    let games = ing.game_logs(player.id, &["2023-24".to_string()]).await.unwrap();
    let live = ing.live_line(&player.full_name, StatSelector::Points).await.unwrap();
    let next = ing.next_opponent("BOS").await.unwrap();

    let report = PropReport::build(&games, &points_query(25.5, 2), live, next.as_deref()).unwrap();

    assert_eq!(report.games_played, 5);
    assert!((report.hit_rate - 0.4).abs() < 1e-12);
    assert!((report.average_margin - -1.9).abs() < 1e-12);
    assert_eq!(report.cumulative_units, vec![-1, 0, -1, -2, -1]);
    assert_eq!(report.predictive_line.points, Some(21.5));

    let live = report.live.unwrap();
    assert_eq!(live.line, 19.5);
    assert!((live.hit_rate - 0.8).abs() < 1e-12);

    let order: Vec<&str> = report.opponents.iter().map(|r| r.opponent.as_str()).collect();
    assert_eq!(order, vec!["NYK", "LAL", "MIA"]);
    assert_eq!(report.excluded_from_opponents, 1);
    let counted: usize = report.opponents.iter().map(|r| r.split.games).sum();
    assert_eq!(counted, 4);

    let next = report.next_opponent.unwrap();
    assert_eq!(next.code, "LAL");
    let avg = next.averages.unwrap();
    assert_eq!(avg.games, 2);
    assert_eq!(avg.points, 17.5);
    assert_eq!(avg.rebounds, 7.5);
}

#[tokio::test]
async fn test_multi_season_logs_are_concatenated() {
    let mut ing = ingestor(MockStats::new(), MockLines::with_line(None), MockSchedule::new(None));
    let seasons = vec!["2022-23".to_string(), "2023-24".to_string()];
    let games = ing.game_logs(TATUM_ID, &seasons).await.unwrap();

    assert_eq!(games.len(), 7);
    assert!(games.windows(2).all(|w| w[0].date <= w[1].date));
    assert_eq!(games[0].season, "2022-23");
}

#[tokio::test]
async fn test_game_logs_served_from_cache() {
    let stats = MockStats::new();
    let calls = stats.game_log_calls.clone();
    let clock = Arc::new(MockClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()));
    let mut ing = Ingestor::new(
        Box::new(stats),
        Box::new(MockLines::with_line(None)),
        Box::new(MockSchedule::new(None)),
        &CacheConfig::default(),
        clock.clone(),
    );
    let seasons = vec!["2023-24".to_string()];

    ing.game_logs(TATUM_ID, &seasons).await.unwrap();
    ing.game_logs(TATUM_ID, &seasons).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    clock.advance(chrono::Duration::seconds(CacheConfig::default().game_log_ttl_secs));
    ing.game_logs(TATUM_ID, &seasons).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_next_opponent_cached() {
    let schedule = MockSchedule::new(Some("MIA"));
    let calls = schedule.calls.clone();
    let mut ing = ingestor(MockStats::new(), MockLines::with_line(None), schedule);

    for _ in 0..3 {
        assert_eq!(ing.next_opponent("BOS").await.unwrap().as_deref(), Some("MIA"));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_matchup_filter_before_evaluation() {
    let mut ing = ingestor(MockStats::new(), MockLines::with_line(None), MockSchedule::new(None));
    let games = ing.game_logs(TATUM_ID, &["2023-24".to_string()]).await.unwrap();

    let vs_lal = engine::filter_by_matchup(&games, "lal");
    assert_eq!(vs_lal.len(), 2);

    let report = PropReport::build(&vs_lal, &points_query(17.5, 1), None, None).unwrap();
    assert_eq!(report.hit_rate, 0.5);
    assert_eq!(report.cumulative_units, vec![1, 0]);
}

#[tokio::test]
async fn test_unknown_player_is_not_found() {
    let mut ing = ingestor(MockStats::new(), MockLines::with_line(None), MockSchedule::new(None));
    let err = ing.find_player("Larry Legend").await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<PropError>(),
        Some(&PropError::not_found("Player", "Larry Legend"))
    );
}

#[tokio::test]
async fn test_no_games_is_explicit_empty_input() {
    let mut ing = ingestor(MockStats::new(), MockLines::with_line(None), MockSchedule::new(None));
    let brown = ing.find_player("Jaylen Brown").await.unwrap();
    let games = ing.game_logs(brown.id, &["2023-24".to_string()]).await.unwrap();

    assert!(games.is_empty());
    assert!(matches!(
        PropReport::build(&games, &points_query(20.5, 3), None, None),
        Err(PropError::EmptyInput(_))
    ));
}

#[tokio::test]
async fn test_source_failures() {
    let stats = MockStats::new();
    stats.set_error("stats.nba.com timed out");
    let mut ing = ingestor(stats, MockLines::failing(), MockSchedule::new(None));

    let err = ing.game_logs(TATUM_ID, &["2023-24".to_string()]).await.unwrap_err();
    assert!(format!("{err:#}").contains("timed out"));
    assert!(ing.live_line("Jayson Tatum", StatSelector::Points).await.is_err());
}

#[test]
fn test_unknown_team_has_no_fallback() {
    assert!(matches!(
        teams::resolve("Seattle SuperSonics"),
        Err(PropError::NotFound { .. })
    ));
    assert_eq!(teams::resolve("Boston Celtics").unwrap().abbreviation, "BOS");
}

#[test]
fn test_engine_is_callable_from_many_threads() {
    let games = tokio_test::block_on(async {
        let mut ing = ingestor(MockStats::new(), MockLines::with_line(None), MockSchedule::new(None));
        ing.game_logs(TATUM_ID, &["2023-24".to_string()]).await.unwrap()
    });

    let rates: Vec<f64> = std::thread::scope(|s| {
        let handles: Vec<_> = [14.5, 19.5, 24.5, 29.5]
            .into_iter()
            .map(|line| {
                let games = &games;
                s.spawn(move || {
                    let ev = engine::evaluate(games, &points_query(line, 1));
                    engine::hit_rate(&ev).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(rates, vec![1.0, 0.8, 0.6, 0.2]);
}
