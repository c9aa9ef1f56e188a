//! Integration tests for the countdown.
//!
//! Uses `start_paused = true` so Tokio auto-advances the clock and
//! `sleep_until` resolves instantly and deterministically.

use std::time::Duration;

use quizroom_countdown::{Countdown, CountdownConfig};
use tokio::time::Instant;

// =========================================================================
// Config
// =========================================================================

#[test]
fn test_default_period_is_one_second() {
    assert_eq!(CountdownConfig::default().period, Duration::from_secs(1));
}

#[test]
fn test_validated_clamps_zero_period() {
    let cfg = CountdownConfig {
        period: Duration::ZERO,
    }
    .validated();
    assert_eq!(cfg.period, CountdownConfig::MIN_PERIOD);
}

#[test]
fn test_new_countdown_is_idle() {
    let c = Countdown::default();
    assert!(!c.is_running());
    assert_eq!(c.remaining(), 0);
}

// =========================================================================
// Ticking
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_countdown_fires_exactly_n_ticks() {
    let mut c = Countdown::default();
    c.start(0, 3);

    let mut remaining = Vec::new();
    for _ in 0..3 {
        remaining.push(c.wait_for_tick().await.remaining);
    }

    assert_eq!(remaining, vec![2, 1, 0]);
    assert!(!c.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_ticks_are_one_period_apart() {
    let mut c = Countdown::with_period(Duration::from_millis(500));
    let start = Instant::now();
    c.start(0, 2);

    c.wait_for_tick().await;
    let first = start.elapsed();
    c.wait_for_tick().await;
    let second = start.elapsed();

    assert!(first >= Duration::from_millis(500) && first < Duration::from_millis(600));
    assert!(second >= Duration::from_millis(1000) && second < Duration::from_millis(1100));
}

#[tokio::test(start_paused = true)]
async fn test_last_tick_is_flagged() {
    let mut c = Countdown::default();
    c.start(4, 1);

    let tick = c.wait_for_tick().await;

    assert!(tick.is_last());
    assert_eq!(tick.generation, 4);
    assert_eq!(tick.tick, 1);
}

#[tokio::test(start_paused = true)]
async fn test_finished_countdown_pends() {
    let mut c = Countdown::default();
    c.start(0, 1);
    c.wait_for_tick().await;

    let result =
        tokio::time::timeout(Duration::from_secs(10), c.wait_for_tick()).await;
    assert!(result.is_err(), "no tick after the last one");
}

#[tokio::test(start_paused = true)]
async fn test_zero_ticks_leaves_countdown_idle() {
    let mut c = Countdown::default();
    c.start(0, 0);

    assert!(!c.is_running());
    let result =
        tokio::time::timeout(Duration::from_secs(5), c.wait_for_tick()).await;
    assert!(result.is_err());
}

// =========================================================================
// Restart / stop: one countdown at a time
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_restart_replaces_previous_countdown() {
    let mut c = Countdown::default();
    c.start(0, 30);
    c.wait_for_tick().await;

    c.start(1, 2);

    let first = c.wait_for_tick().await;
    let second = c.wait_for_tick().await;
    assert_eq!(first.generation, 1);
    assert_eq!(first.remaining, 1);
    assert_eq!(second.remaining, 0);
    assert!(!c.is_running(), "old countdown must not keep ticking");
}

#[tokio::test(start_paused = true)]
async fn test_stop_prevents_further_ticks() {
    let mut c = Countdown::default();
    c.start(0, 5);
    c.wait_for_tick().await;

    c.stop();

    assert!(!c.is_running());
    let result =
        tokio::time::timeout(Duration::from_secs(10), c.wait_for_tick()).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_tick_is_cancel_safe() {
    let mut c = Countdown::default();
    c.start(0, 2);

    // Abandon a wait halfway through the period.
    let _ = tokio::time::timeout(Duration::from_millis(400), c.wait_for_tick()).await;

    assert_eq!(c.remaining(), 2, "cancelled wait must not consume a tick");
    let tick = c.wait_for_tick().await;
    assert_eq!(tick.remaining, 1);
}
