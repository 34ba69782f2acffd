//! Armable fixed-interval timer for Scribble rooms.
//!
//! A room has exactly one [`TickScheduler`]. It starts disarmed; the room
//! arms it when a countdown or a round begins and disarms it when that
//! phase ends. While disarmed, [`TickScheduler::wait_for_tick`] pends
//! forever, so the scheduler can sit in the room actor's `select!` loop
//! at all times:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         info = room.timer_mut().wait_for_tick() => { /* advance phase */ }
//!     }
//! }
//! ```
//!
//! Because the timer is a plain value owned by the room rather than a
//! spawned task, there is no second timer to forget about: re-arming
//! replaces the deadline, and a tick can only come from the current arm.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when a tick fires late.
///
/// Parses from and serializes as `"skip"` or `"drop"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TickPolicy {
    /// Schedule the next tick one interval from now. Missed ticks are
    /// reported in [`TickInfo::ticks_skipped`] and never replayed.
    #[default]
    Skip,
    /// Keep the original cadence; the next tick fires one interval after
    /// the missed deadline.
    Drop,
}

impl fmt::Display for TickPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Drop => write!(f, "drop"),
        }
    }
}

impl FromStr for TickPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "drop" => Ok(Self::Drop),
            other => Err(format!("unknown tick policy {other:?} (expected skip or drop)")),
        }
    }
}

/// Configuration for the phase timer.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between ticks. Default: one second.
    pub interval: Duration,
    /// Overrun handling policy.
    pub policy: TickPolicy,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            policy: TickPolicy::default(),
        }
    }
}

impl TickConfig {
    /// Shortest interval the scheduler accepts.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`TickScheduler::new`].
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_ms = self.interval.as_secs_f64() * 1000.0,
                "tick interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Information about a fired tick, returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickInfo {
    /// Tick number within the current arm (starts at 1).
    pub tick: u64,
    /// `true` if this tick fired noticeably late.
    pub overrun: bool,
    /// How many whole intervals were missed (0 in normal operation).
    pub ticks_skipped: u64,
}

/// Tick counters, either for the scheduler's whole life
/// ([`TickScheduler::metrics`]) or for the current arm
/// ([`TickScheduler::metrics_since_arm`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickMetrics {
    pub total_ticks: u64,
    pub total_overruns: u64,
    pub total_skipped: u64,
}

impl TickMetrics {
    fn since(&self, earlier: &TickMetrics) -> TickMetrics {
        TickMetrics {
            total_ticks: self.total_ticks - earlier.total_ticks,
            total_overruns: self.total_overruns - earlier.total_overruns,
            total_skipped: self.total_skipped - earlier.total_skipped,
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// One cancellable fixed-interval tick source.
pub struct TickScheduler {
    config: TickConfig,
    /// Deadline of the next tick; `None` while disarmed.
    next_tick: Option<Instant>,
    /// Ticks fired since the last [`arm`](Self::arm).
    tick_count: u64,
    /// How many times the scheduler has been armed.
    arms: u64,
    metrics: TickMetrics,
    /// `metrics` as they were at the last arm.
    metrics_at_arm: TickMetrics,
}

impl TickScheduler {
    /// Create a disarmed scheduler.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        debug!(
            interval_ms = config.interval.as_secs_f64() * 1000.0,
            policy = ?config.policy,
            "tick scheduler created"
        );
        Self {
            config,
            next_tick: None,
            tick_count: 0,
            arms: 0,
            metrics: TickMetrics::default(),
            metrics_at_arm: TickMetrics::default(),
        }
    }

    /// Start ticking. The first tick fires one interval from now.
    ///
    /// Arming an armed scheduler restarts it: the old deadline is
    /// forgotten and the tick count starts over.
    pub fn arm(&mut self) {
        if self.next_tick.is_some() {
            debug!(tick = self.tick_count, "re-arming an armed tick scheduler");
        }
        self.next_tick = Some(Instant::now() + self.config.interval);
        self.tick_count = 0;
        self.arms += 1;
        self.metrics_at_arm = self.metrics;
        trace!(arms = self.arms, "tick scheduler armed");
    }

    /// Stop ticking. Safe to call when already disarmed.
    pub fn disarm(&mut self) {
        if self.next_tick.take().is_some() {
            trace!(tick = self.tick_count, "tick scheduler disarmed");
        }
    }

    /// Wait until the next tick is due.
    ///
    /// Pends forever while disarmed. Cancel-safe: no state changes until
    /// the deadline has passed, so dropping the future inside `select!`
    /// loses nothing.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let Some(next) = self.next_tick else {
            return std::future::pending().await;
        };

        time::sleep_until(next).await;

        let interval = self.config.interval;
        let now = Instant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > interval / 10;
        let ticks_skipped = if overrun {
            (late_by.as_nanos() / interval.as_nanos()) as u64
        } else {
            0
        };

        self.next_tick = Some(match self.config.policy {
            TickPolicy::Skip => {
                if ticks_skipped > 0 {
                    warn!(
                        tick = self.tick_count,
                        skipped = ticks_skipped,
                        late_ms = late_by.as_secs_f64() * 1000.0,
                        "tick overrun, skipping ahead"
                    );
                }
                now + interval
            }
            TickPolicy::Drop => {
                if overrun {
                    warn!(
                        tick = self.tick_count,
                        late_ms = late_by.as_secs_f64() * 1000.0,
                        "tick overrun, keeping original schedule"
                    );
                }
                next + interval
            }
        });

        self.metrics.total_ticks += 1;
        self.metrics.total_skipped += ticks_skipped;
        if overrun {
            self.metrics.total_overruns += 1;
        }

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            overrun,
            ticks_skipped,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Ticks fired since the last arm.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Total number of times [`arm`](Self::arm) was called.
    pub fn arms(&self) -> u64 {
        self.arms
    }

    /// Counters since the scheduler was created.
    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    /// Counters since the last [`arm`](Self::arm). Still readable after
    /// [`disarm`](Self::disarm), until the next arm.
    pub fn metrics_since_arm(&self) -> TickMetrics {
        self.metrics.since(&self.metrics_at_arm)
    }
}
