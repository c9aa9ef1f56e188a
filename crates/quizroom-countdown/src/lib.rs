//! Per-question countdown for Quizroom.
//!
//! A [`Countdown`] fires one [`Tick`] per period (one second by default)
//! for a fixed number of ticks, then goes idle. Starting a new countdown
//! replaces the old one, so at most one is ever active and time can't be
//! decremented twice.
//!
//! # Idle mode
//!
//! When nothing is running (never started, stopped, or finished),
//! [`Countdown::wait_for_tick`] pends forever. That is what lets it sit
//! in a `tokio::select!` loop next to other branches:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = commands.recv() => { /* user input */ }
//!         tick = countdown.wait_for_tick() => {
//!             engine.handle(Input::Tick { question: tick.generation as usize });
//!         }
//!     }
//! }
//! ```
//!
//! Each countdown carries a caller-chosen `generation` (the question
//! index) that is echoed in every tick, so a consumer can discard a tick
//! belonging to a countdown it has already moved past.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Countdown settings.
#[derive(Debug, Clone)]
pub struct CountdownConfig {
    /// Time between ticks. Default: one second.
    pub period: Duration,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
        }
    }
}

impl CountdownConfig {
    /// Shortest period accepted; anything below is raised to this.
    pub const MIN_PERIOD: Duration = Duration::from_millis(1);

    /// Clamp out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        if self.period < Self::MIN_PERIOD {
            debug!(period = ?self.period, "countdown period too short, clamping");
            self.period = Self::MIN_PERIOD;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

/// One countdown step, returned by [`Countdown::wait_for_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// The generation passed to [`Countdown::start`].
    pub generation: u64,
    /// Ticks fired so far in this countdown (starts at 1).
    pub tick: u32,
    /// Ticks left after this one. `0` means this was the last.
    pub remaining: u32,
}

impl Tick {
    /// `true` for the final tick of a countdown.
    pub fn is_last(&self) -> bool {
        self.remaining == 0
    }
}

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// A restartable one-shot countdown.
#[derive(Debug)]
pub struct Countdown {
    config: CountdownConfig,
    generation: u64,
    fired: u32,
    remaining: u32,
    /// When the next tick is due. `None` while idle.
    next_tick: Option<Instant>,
}

impl Countdown {
    /// Creates an idle countdown.
    pub fn new(config: CountdownConfig) -> Self {
        Self {
            config: config.validated(),
            generation: 0,
            fired: 0,
            remaining: 0,
            next_tick: None,
        }
    }

    /// Creates an idle countdown with the given period.
    pub fn with_period(period: Duration) -> Self {
        Self::new(CountdownConfig { period })
    }

    /// Starts counting down `ticks` periods, replacing any countdown in
    /// progress. `ticks == 0` leaves the countdown idle.
    pub fn start(&mut self, generation: u64, ticks: u32) {
        self.generation = generation;
        self.fired = 0;
        self.remaining = ticks;
        self.next_tick = (ticks > 0).then(|| Instant::now() + self.config.period);
        debug!(generation, ticks, "countdown started");
    }

    /// Stops the countdown. No more ticks fire until the next `start`.
    pub fn stop(&mut self) {
        if self.next_tick.take().is_some() {
            debug!(
                generation = self.generation,
                remaining = self.remaining,
                "countdown stopped"
            );
        }
    }

    /// Waits until the next tick is due.
    ///
    /// Pends forever while idle; `tokio::select!` keeps
    /// servicing its other branches meanwhile.
    pub async fn wait_for_tick(&mut self) -> Tick {
        let Some(next) = self.next_tick else {
            return std::future::pending().await;
        };

        time::sleep_until(next).await;

        self.fired += 1;
        self.remaining = self.remaining.saturating_sub(1);
        // Keep the original cadence so late wake-ups don't drift the clock.
        self.next_tick = (self.remaining > 0).then(|| next + self.config.period);

        trace!(
            generation = self.generation,
            tick = self.fired,
            remaining = self.remaining,
            "countdown tick"
        );

        Tick {
            generation: self.generation,
            tick: self.fired,
            remaining: self.remaining,
        }
    }

    /// `true` while ticks are still scheduled.
    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Ticks left in the current countdown.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Generation of the current (or last) countdown.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn period(&self) -> Duration {
        self.config.period
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(CountdownConfig::default())
    }
}
