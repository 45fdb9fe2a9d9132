//! Timer engine implementation.
//!
//! The engine is a cyclic countdown automaton. It does not use internal
//! threads or read the clock: the caller is responsible for calling `tick()`
//! once per elapsed second while the timer runs (see
//! [`TimerHandle`](super::TimerHandle) for a driver that does this).
//!
//! ## Mode Transitions
//!
//! ```text
//! WORK --(cycle + 1 <  N)--> SHORT_BREAK --> WORK
//! WORK --(cycle + 1 >= N)--> LONG_BREAK  --> WORK
//! ```
//!
//! Every transition pauses the countdown; the learner resumes it explicitly.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerConfig::default())?;
//! engine.start();
//! // Once per second:
//! engine.tick(); // Returns Some(Event::PhaseCompleted { .. }) at a boundary
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::config::TimerConfig;
use super::cue::{Cue, CuePlayer, SilentCue};
use super::mode::TimerMode;
use crate::error::ValidationError;
use crate::events::Event;

/// Observable countdown state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: TimerMode,
    pub seconds_remaining: u64,
    pub is_running: bool,
    /// WORK phases finished since the engine was created.
    pub completed_work_sessions: u64,
    /// WORK phases finished since the last long break.
    pub sessions_in_current_cycle: u32,
}

impl TimerState {
    fn fresh(config: &TimerConfig) -> Self {
        Self {
            mode: TimerMode::Work,
            seconds_remaining: config.duration_secs(TimerMode::Work),
            is_running: false,
            completed_work_sessions: 0,
            sessions_in_current_cycle: 0,
        }
    }
}

/// Identifies a registered observer so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&Event, &TimerState) + Send>;

/// Core timer engine.
///
/// Single writer of [`TimerState`]. Observers are called synchronously after
/// every change and must not call back into the engine.
pub struct TimerEngine {
    config: TimerConfig,
    state: TimerState,
    cue: Arc<dyn CuePlayer>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer_id: u64,
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl TimerEngine {
    /// Create a silent engine, paused at the start of a WORK phase.
    ///
    /// # Errors
    ///
    /// Returns an error if any duration or the cycle length is zero.
    pub fn new(config: TimerConfig) -> Result<Self, ValidationError> {
        Self::with_cue(config, Arc::new(SilentCue))
    }

    /// Create an engine that plays cues through `cue`.
    ///
    /// # Errors
    ///
    /// Returns an error if any duration or the cycle length is zero.
    pub fn with_cue(config: TimerConfig, cue: Arc<dyn CuePlayer>) -> Result<Self, ValidationError> {
        config.validate()?;
        let state = TimerState::fresh(&config);
        Ok(Self {
            config,
            state,
            cue,
            observers: Vec::new(),
            next_observer_id: 0,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn mode(&self) -> TimerMode {
        self.state.mode
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    /// Full length of a fresh phase in the current mode, under the current config.
    pub fn phase_total_secs(&self) -> u64 {
        self.config.duration_secs(self.state.mode)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    ///
    /// Clamped, since a config change can make the remaining time exceed the
    /// configured total until the phase is reset.
    pub fn phase_progress(&self) -> f64 {
        let total = self.phase_total_secs();
        if total == 0 {
            return 0.0;
        }
        (1.0 - self.state.seconds_remaining as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state.clone(),
            config: self.config.clone(),
            phase_total_secs: self.phase_total_secs(),
            at: Utc::now(),
        }
    }

    // ── Observers ────────────────────────────────────────────────────

    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&Event, &TimerState) + Send + 'static,
    {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the countdown. No-op when already running.
    pub fn start(&mut self) -> Option<Event> {
        if self.state.is_running {
            return None;
        }
        self.state.is_running = true;
        self.play(Cue::Start);
        tracing::debug!(
            mode = %self.state.mode,
            seconds_remaining = self.state.seconds_remaining,
            "timer started"
        );
        Some(self.emit(Event::TimerStarted {
            mode: self.state.mode,
            seconds_remaining: self.state.seconds_remaining,
            at: Utc::now(),
        }))
    }

    /// Stop the countdown. No-op when already paused.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        self.state.is_running = false;
        tracing::debug!(seconds_remaining = self.state.seconds_remaining, "timer paused");
        Some(self.emit(Event::TimerPaused {
            mode: self.state.mode,
            seconds_remaining: self.state.seconds_remaining,
            at: Utc::now(),
        }))
    }

    /// Return to a paused, full-length WORK phase. Session counters are kept.
    pub fn reset_phase(&mut self) -> Event {
        self.state.is_running = false;
        self.state.mode = TimerMode::Work;
        self.state.seconds_remaining = self.config.duration_secs(TimerMode::Work);
        tracing::debug!(seconds_remaining = self.state.seconds_remaining, "phase reset");
        self.emit(Event::PhaseReset {
            seconds_remaining: self.state.seconds_remaining,
            at: Utc::now(),
        })
    }

    /// Clear the current cycle's progress without touching the countdown or
    /// the lifetime session total.
    pub fn reset_cycle(&mut self) -> Event {
        self.state.sessions_in_current_cycle = 0;
        tracing::debug!("cycle reset");
        self.emit(Event::CycleReset {
            completed_work_sessions: self.state.completed_work_sessions,
            at: Utc::now(),
        })
    }

    /// Replace the configuration.
    ///
    /// The phase in progress keeps its remaining time; call
    /// [`reset_phase`](Self::reset_phase) to apply new durations right away.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the engine untouched, if any duration or the
    /// cycle length is zero.
    pub fn update_config(&mut self, config: TimerConfig) -> Result<Event, ValidationError> {
        config.validate()?;
        if self.state.sessions_in_current_cycle > config.sessions_until_long_break {
            self.state.sessions_in_current_cycle = config.sessions_until_long_break;
        }
        self.config = config;
        tracing::debug!(config = ?self.config, "config updated");
        Ok(self.emit(Event::ConfigUpdated {
            config: self.config.clone(),
            at: Utc::now(),
        }))
    }

    /// End the current phase now, exactly as if its countdown had run out.
    pub fn skip_phase(&mut self) -> Event {
        self.complete_phase(true)
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `None` while paused. When the countdown reaches zero the
    /// transition happens within the same tick and `PhaseCompleted` is
    /// returned instead of `Ticked`.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        self.state.seconds_remaining = self.state.seconds_remaining.saturating_sub(1);
        if self.state.seconds_remaining == 0 {
            return Some(self.complete_phase(false));
        }
        tracing::trace!(seconds_remaining = self.state.seconds_remaining, "tick");
        Some(self.emit(Event::Ticked {
            mode: self.state.mode,
            seconds_remaining: self.state.seconds_remaining,
        }))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_phase(&mut self, skipped: bool) -> Event {
        let from = self.state.mode;
        let to = next_mode(from, self.state.sessions_in_current_cycle, &self.config);

        self.state.is_running = false;
        if from == TimerMode::Work {
            self.state.completed_work_sessions += 1;
            self.state.sessions_in_current_cycle = if to == TimerMode::LongBreak {
                0
            } else {
                self.state.sessions_in_current_cycle + 1
            };
        }
        self.state.mode = to;
        self.state.seconds_remaining = self.config.duration_secs(to);
        self.play(Cue::Transition);

        tracing::info!(
            %from,
            %to,
            skipped,
            completed_work_sessions = self.state.completed_work_sessions,
            sessions_in_current_cycle = self.state.sessions_in_current_cycle,
            "phase completed"
        );
        self.emit(Event::PhaseCompleted {
            from,
            to,
            seconds_remaining: self.state.seconds_remaining,
            completed_work_sessions: self.state.completed_work_sessions,
            sessions_in_current_cycle: self.state.sessions_in_current_cycle,
            skipped,
            at: Utc::now(),
        })
    }

    fn play(&self, cue: Cue) {
        if !self.config.sound_enabled {
            return;
        }
        if let Err(e) = self.cue.play(cue) {
            tracing::debug!(cue = cue.as_str(), error = %e, "cue playback failed");
        }
    }

    fn emit(&mut self, event: Event) -> Event {
        for (_, observer) in &mut self.observers {
            observer(&event, &self.state);
        }
        event
    }
}

/// The mode that follows `mode`, given how many WORK phases the current cycle
/// already holds.
pub fn next_mode(mode: TimerMode, sessions_in_cycle: u32, config: &TimerConfig) -> TimerMode {
    match mode {
        TimerMode::Work if sessions_in_cycle + 1 >= config.sessions_until_long_break => {
            TimerMode::LongBreak
        }
        TimerMode::Work => TimerMode::ShortBreak,
        TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Work,
    }
}
