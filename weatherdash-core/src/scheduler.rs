//! Auto-refresh countdown.
//!
//! The scheduler is a two-state machine. `Running` owns the only ticker task;
//! every transition aborts that task before anything else happens, and each
//! ticker stamps its ticks with a generation so ticks already queued from a
//! cancelled ticker are recognised and dropped.

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle, time::MissedTickBehavior};

use crate::error::SchedulerError;

/// Countdown length in seconds.
pub const DEFAULT_INTERVAL: u32 = 60;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub const PAUSED_TEXT: &str = "Auto-refresh paused";

/// One ticker callback, stamped with the generation of the ticker that sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick from a cancelled ticker, or received while idle.
    Stale,
    /// Countdown advanced; `shown` is the value to display for this tick.
    Counting { shown: u32 },
    /// Countdown hit zero and has been reset; the caller should refresh.
    RefreshDue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshState {
    seconds_remaining: u32,
    active: bool,
}

impl RefreshState {
    pub fn new(seconds_remaining: u32, active: bool) -> Result<Self, SchedulerError> {
        if seconds_remaining > DEFAULT_INTERVAL {
            return Err(SchedulerError::RemainingOutOfRange {
                remaining: seconds_remaining,
                interval: DEFAULT_INTERVAL,
            });
        }
        Ok(Self {
            seconds_remaining,
            active,
        })
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn text(&self) -> String {
        if self.active {
            countdown_text(self.seconds_remaining)
        } else {
            PAUSED_TEXT.to_string()
        }
    }
}

/// `"Next update in: mm:ss"`.
pub fn countdown_text(seconds: u32) -> String {
    format!("Next update in: {:02}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug)]
enum Phase {
    Idle,
    Running { generation: u64, ticker: JoinHandle<()> },
}

#[derive(Debug)]
pub struct RefreshScheduler {
    phase: Phase,
    seconds_remaining: u32,
    next_generation: u64,
    ticks: mpsc::UnboundedSender<Tick>,
}

impl RefreshScheduler {
    /// Ticks are delivered on `ticks`; feed each one back into [`Self::on_tick`].
    pub fn new(ticks: mpsc::UnboundedSender<Tick>) -> Self {
        Self {
            phase: Phase::Idle,
            seconds_remaining: DEFAULT_INTERVAL,
            next_generation: 0,
            ticks,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn state(&self) -> RefreshState {
        RefreshState {
            seconds_remaining: self.seconds_remaining,
            active: self.is_running(),
        }
    }

    /// Idle/Running → Running. Safe to call while running: the previous ticker
    /// is cancelled first, so there is never more than one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        self.cancel();

        let generation = self.next_generation;
        self.next_generation += 1;
        self.seconds_remaining = DEFAULT_INTERVAL;

        let ticks = self.ticks.clone();
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(Tick { generation }).is_err() {
                    break;
                }
            }
        });

        tracing::info!(generation, "auto-refresh started");
        self.phase = Phase::Running { generation, ticker };
    }

    /// Running → Idle.
    pub fn stop(&mut self) {
        if self.cancel() {
            tracing::info!("auto-refresh paused");
        }
    }

    pub fn on_tick(&mut self, tick: Tick) -> TickOutcome {
        match self.phase {
            Phase::Running { generation, .. } if generation == tick.generation => {}
            _ => {
                tracing::trace!(generation = tick.generation, "dropping stale tick");
                return TickOutcome::Stale;
            }
        }

        if self.seconds_remaining == 0 {
            self.seconds_remaining = DEFAULT_INTERVAL;
            return TickOutcome::RefreshDue;
        }

        let shown = self.seconds_remaining;
        self.seconds_remaining -= 1;
        TickOutcome::Counting { shown }
    }

    fn cancel(&mut self) -> bool {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Running { ticker, .. } => {
                ticker.abort();
                true
            }
            Phase::Idle => false,
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
