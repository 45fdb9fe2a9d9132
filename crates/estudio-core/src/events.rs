use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerConfig, TimerMode, TimerState};

/// Every state change in the timer produces an Event.
/// Observers registered on the engine receive each one synchronously.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    /// One second elapsed while running.
    Ticked {
        mode: TimerMode,
        seconds_remaining: u64,
    },
    /// A phase ended (naturally or skipped) and the engine moved on.
    /// The engine is always paused after this event.
    PhaseCompleted {
        from: TimerMode,
        to: TimerMode,
        seconds_remaining: u64,
        completed_work_sessions: u64,
        sessions_in_current_cycle: u32,
        skipped: bool,
        at: DateTime<Utc>,
    },
    PhaseReset {
        seconds_remaining: u64,
        at: DateTime<Utc>,
    },
    CycleReset {
        completed_work_sessions: u64,
        at: DateTime<Utc>,
    },
    ConfigUpdated {
        config: TimerConfig,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        config: TimerConfig,
        phase_total_secs: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine-readable name, matching the serde tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "TimerStarted",
            Event::TimerPaused { .. } => "TimerPaused",
            Event::Ticked { .. } => "Ticked",
            Event::PhaseCompleted { .. } => "PhaseCompleted",
            Event::PhaseReset { .. } => "PhaseReset",
            Event::CycleReset { .. } => "CycleReset",
            Event::ConfigUpdated { .. } => "ConfigUpdated",
            Event::StateSnapshot { .. } => "StateSnapshot",
        }
    }
}
