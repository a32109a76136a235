//! Per-session tick scheduler for Gridfire.
//!
//! Drives a game session's loop at a fixed cadence (1–128 Hz) while
//! reporting *measured* delta-time: the wall-clock elapsed since the
//! previous tick, clamped to [`TickConfig::max_delta`]. Simulation code
//! scales every displacement by this value, so the outcome is independent
//! of how late the runtime actually woke us.
//!
//! # Integration
//!
//! The scheduler sits inside a session actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         tick_info = scheduler.wait_for_tick() => {
//!             session.advance(tick_info.dt.as_secs_f32());
//!             scheduler.record_tick_end();
//!         }
//!     }
//! }
//! ```
//!
//! While paused (sessions that are created but not yet started),
//! `wait_for_tick` pends forever; `select!` keeps serving the command
//! branch.

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Full configuration for the tick scheduler.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Tick rate in Hz.
    pub tick_rate_hz: u32,
    /// Upper bound on the measured delta-time handed to the simulation.
    /// Caps the jump after a stall so entities never tunnel through walls.
    pub max_delta: Duration,
    /// Budget warning threshold (0.0–1.0). A tracing warning is emitted
    /// when tick execution exceeds this fraction of the tick budget.
    pub budget_warn_threshold: f64,
    /// Random jitter (0–max µs) added to the *first* tick to desynchronize
    /// sessions created at the same instant (thundering-herd mitigation).
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 16,
            max_delta: Duration::from_millis(250),
            budget_warn_threshold: 0.80,
            initial_jitter_us: 2_000, // 0–2 ms default jitter
        }
    }
}

impl TickConfig {
    /// Maximum supported tick rate.
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// Create a config for a specific tick rate with sensible defaults.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`TickScheduler::new`]. Rules:
    /// - `tick_rate_hz` forced into `1..=`[`Self::MAX_TICK_RATE_HZ`].
    /// - `max_delta` at least one tick period.
    /// - `budget_warn_threshold` clamped to `0.0..=1.0`.
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz == 0 || self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick_rate_hz out of range — clamping"
            );
            self.tick_rate_hz = self.tick_rate_hz.clamp(1, Self::MAX_TICK_RATE_HZ);
        }
        let period = self.tick_duration();
        if self.max_delta < period {
            self.max_delta = period;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }

    /// Duration of a single nominal tick.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

// ---------------------------------------------------------------------------
// Tick info (returned to caller each tick)
// ---------------------------------------------------------------------------

/// Information about a fired tick, returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// Measured elapsed time since the previous tick fired, clamped to
    /// `max_delta`. The first tick reports the nominal period.
    pub dt: Duration,
    /// `true` if this tick fired late (scheduler detected overrun).
    pub overrun: bool,
    /// How many nominal ticks were skipped due to overrun.
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Runtime metrics for the tick scheduler.
#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    /// Total ticks executed.
    pub total_ticks: u64,
    /// Total overruns detected.
    pub total_overruns: u64,
    /// Total ticks skipped by skip-ahead.
    pub total_skipped: u64,
    /// Maximum tick execution time observed
    /// (via [`TickScheduler::record_tick_end`]).
    pub max_tick_time: Duration,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-cadence tick scheduler with measured delta-time.
///
/// One `TickScheduler` per session actor.
pub struct TickScheduler {
    config: TickConfig,
    tick_duration: Duration,
    tick_count: u64,
    /// When the next tick should fire.
    next_tick: Instant,
    /// When the previous tick fired. Measured dt is derived from this.
    last_tick: Option<Instant>,
    /// When the current tick's game logic started.
    /// Set by `wait_for_tick`, consumed by `record_tick_end`.
    tick_start: Option<Instant>,
    paused: bool,
    metrics: TickMetrics,
}

impl TickScheduler {
    /// Create a new scheduler from config.
    ///
    /// The first tick is scheduled with optional jitter to prevent
    /// thundering-herd synchronization across sessions.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();

        let jitter = if config.initial_jitter_us > 0 {
            Duration::from_micros(rand::rng().random_range(0..config.initial_jitter_us))
        } else {
            Duration::ZERO
        };
        let next_tick = Instant::now() + tick_duration + jitter;

        debug!(
            rate_hz = config.tick_rate_hz,
            budget_ms = tick_duration.as_secs_f64() * 1000.0,
            max_delta_ms = config.max_delta.as_secs_f64() * 1000.0,
            "tick scheduler created"
        );

        Self {
            config,
            tick_duration,
            tick_count: 0,
            next_tick,
            last_tick: None,
            tick_start: None,
            paused: false,
            metrics: TickMetrics::default(),
        }
    }

    /// Create a scheduler for a specific tick rate with default settings.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Wait until the next tick is due. Returns [`TickInfo`] for the tick.
    ///
    /// While paused this future pends forever — it will never resolve on
    /// its own, but `tokio::select!` will still process other branches.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        if self.paused {
            // This future never completes — select! handles other branches.
            std::future::pending::<()>().await;
            unreachable!()
        }

        time::sleep_until(self.next_tick).await;

        let now = Instant::now();
        self.tick_count += 1;
        self.tick_start = Some(now);

        // Measured delta: elapsed since the previous tick actually fired.
        // saturating, so never negative; clamped so a stall can't produce
        // a teleporting simulation step.
        let dt = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).min(self.config.max_delta),
            None => self.tick_duration,
        };
        self.last_tick = Some(now);

        // Detect overrun: did we wake up significantly late?
        let late_by = now.saturating_duration_since(self.next_tick);
        let overrun = late_by > self.tick_duration / 10; // >10% late
        let mut ticks_skipped = 0u64;
        if overrun {
            ticks_skipped =
                late_by.as_nanos() as u64 / self.tick_duration.as_nanos().max(1) as u64;
            if ticks_skipped > 0 {
                warn!(
                    tick = self.tick_count,
                    skipped = ticks_skipped,
                    late_ms = late_by.as_secs_f64() * 1000.0,
                    "tick overrun — skipping ahead"
                );
            }
            self.metrics.total_overruns += 1;
        }
        // Always schedule from now, not from the missed deadline: the
        // measured dt already accounts for the lost time, so catch-up
        // bursts would double-apply it.
        self.next_tick = now + self.tick_duration;

        self.metrics.total_skipped += ticks_skipped;
        self.metrics.total_ticks += 1;

        trace!(tick = self.tick_count, dt_ms = dt.as_secs_f64() * 1000.0, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt,
            overrun,
            ticks_skipped,
        }
    }

    /// Record that the game logic for the current tick has finished.
    ///
    /// Call this after the simulation step returns to enable budget
    /// monitoring and metrics. If not called, budget warnings won't fire.
    pub fn record_tick_end(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        let elapsed = start.elapsed();

        let utilization = elapsed.as_secs_f64() / self.tick_duration.as_secs_f64();
        if utilization >= self.config.budget_warn_threshold {
            warn!(
                tick = self.tick_count,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = self.tick_duration.as_secs_f64() * 1000.0,
                utilization_pct = format!("{:.1}", utilization * 100.0),
                "tick approaching budget limit"
            );
        }
        if elapsed > self.metrics.max_tick_time {
            self.metrics.max_tick_time = elapsed;
        }
    }

    /// Pause the tick loop. `wait_for_tick` will pend until
    /// [`resume`](Self::resume) is called. Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "tick scheduler paused");
        }
    }

    /// Resume the tick loop after a pause.
    ///
    /// Resets both the next-tick deadline and the delta-time baseline to
    /// now, so time spent paused neither bursts ticks nor inflates the
    /// first post-resume dt.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            let now = Instant::now();
            self.next_tick = now + self.tick_duration;
            self.last_tick = Some(now);
            debug!(tick = self.tick_count, "tick scheduler resumed");
        }
    }

    /// Whether the scheduler is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current tick count.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Snapshot of current metrics.
    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    /// The configured tick rate in Hz.
    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    /// The nominal tick period.
    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }
}
