//! Shared timer handle with a tokio-driven tick source.
//!
//! A [`TimerHandle`] is the one store every view reads from. Clones share the
//! same engine. While the countdown runs, exactly one background task wakes
//! once per period and calls [`TimerEngine::tick`]. The task is aborted
//! whenever the countdown stops, and when the last handle is dropped.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::config::TimerConfig;
use super::cue::CuePlayer;
use super::engine::{ObserverId, TimerEngine, TimerState};
use crate::error::ValidationError;
use crate::events::Event;

const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

struct Core {
    engine: TimerEngine,
    ticker: Option<JoinHandle<()>>,
}

impl Core {
    fn disarm(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

struct Shared {
    core: Mutex<Core>,
    state_tx: watch::Sender<TimerState>,
    tick_period: Duration,
}

impl Shared {
    fn publish(&self, engine: &TimerEngine) {
        self.state_tx.send_replace(engine.state().clone());
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.core.get_mut().disarm();
    }
}

/// Clonable handle to a running study timer.
///
/// Must be used from within a tokio runtime: starting the countdown spawns the
/// tick task.
#[derive(Clone)]
pub struct TimerHandle {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("state", &*self.state_tx().borrow())
            .field("tick_period", &self.shared.tick_period)
            .finish()
    }
}

impl TimerHandle {
    /// # Errors
    ///
    /// Returns an error if any duration or the cycle length is zero.
    pub fn new(config: TimerConfig, cue: Arc<dyn CuePlayer>) -> Result<Self, ValidationError> {
        Ok(Self::from_engine(TimerEngine::with_cue(config, cue)?))
    }

    pub fn from_engine(engine: TimerEngine) -> Self {
        Self::build(engine, DEFAULT_TICK_PERIOD)
    }

    /// Use a tick period other than one second.
    ///
    /// The engine still subtracts one second per tick, so this only makes
    /// sense for demos and embedding in an accelerated clock.
    pub fn with_tick_period(engine: TimerEngine, tick_period: Duration) -> Self {
        Self::build(engine, tick_period)
    }

    fn build(engine: TimerEngine, tick_period: Duration) -> Self {
        let (state_tx, _) = watch::channel(engine.state().clone());
        Self {
            shared: Arc::new(Shared {
                core: Mutex::new(Core {
                    engine,
                    ticker: None,
                }),
                state_tx,
                tick_period,
            }),
        }
    }

    fn state_tx(&self) -> &watch::Sender<TimerState> {
        &self.shared.state_tx
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Latest published state. Never waits on the engine lock.
    pub fn state(&self) -> TimerState {
        self.state_tx().borrow().clone()
    }

    /// Receiver that is updated after every state change.
    pub fn watch(&self) -> watch::Receiver<TimerState> {
        self.state_tx().subscribe()
    }

    pub async fn config(&self) -> TimerConfig {
        self.shared.core.lock().await.engine.config().clone()
    }

    pub async fn snapshot(&self) -> Event {
        self.shared.core.lock().await.engine.snapshot()
    }

    /// Whether a tick task is currently scheduled.
    pub async fn is_ticking(&self) -> bool {
        self.shared.core.lock().await.ticker.is_some()
    }

    // ── Observers ────────────────────────────────────────────────────

    /// Register a synchronous observer.
    ///
    /// It runs while the engine lock is held, so it must not call back into
    /// this handle.
    pub async fn subscribe<F>(&self, observer: F) -> ObserverId
    where
        F: FnMut(&Event, &TimerState) + Send + 'static,
    {
        self.shared.core.lock().await.engine.subscribe(observer)
    }

    pub async fn unsubscribe(&self, id: ObserverId) -> bool {
        self.shared.core.lock().await.engine.unsubscribe(id)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub async fn start(&self) -> Option<Event> {
        let mut core = self.shared.core.lock().await;
        let event = core.engine.start()?;
        core.disarm();
        core.ticker = Some(spawn_ticker(
            Arc::downgrade(&self.shared),
            self.shared.tick_period,
        ));
        self.shared.publish(&core.engine);
        Some(event)
    }

    pub async fn pause(&self) -> Option<Event> {
        let mut core = self.shared.core.lock().await;
        let event = core.engine.pause();
        core.disarm();
        self.shared.publish(&core.engine);
        event
    }

    pub async fn reset_phase(&self) -> Event {
        let mut core = self.shared.core.lock().await;
        let event = core.engine.reset_phase();
        core.disarm();
        self.shared.publish(&core.engine);
        event
    }

    pub async fn reset_cycle(&self) -> Event {
        let mut core = self.shared.core.lock().await;
        let event = core.engine.reset_cycle();
        self.shared.publish(&core.engine);
        event
    }

    /// # Errors
    ///
    /// Returns an error if any duration or the cycle length is zero.
    pub async fn update_config(&self, config: TimerConfig) -> Result<Event, ValidationError> {
        let mut core = self.shared.core.lock().await;
        let event = core.engine.update_config(config)?;
        self.shared.publish(&core.engine);
        Ok(event)
    }

    pub async fn skip_phase(&self) -> Event {
        let mut core = self.shared.core.lock().await;
        let event = core.engine.skip_phase();
        core.disarm();
        self.shared.publish(&core.engine);
        event
    }
}

fn spawn_ticker(shared: Weak<Shared>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let Some(shared) = shared.upgrade() else {
                break;
            };
            let mut core = shared.core.lock().await;
            core.engine.tick();
            shared.publish(&core.engine);
            if !core.engine.is_running() {
                // Phase boundary: the engine paused itself. Dropping our own
                // handle detaches this task, which then ends below.
                core.ticker = None;
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{SilentCue, TimerMode};
    use std::sync::Mutex as StdMutex;

    fn handle(config: TimerConfig) -> TimerHandle {
        TimerHandle::new(config, Arc::new(SilentCue)).unwrap()
    }

    fn short_config() -> TimerConfig {
        TimerConfig {
            work_minutes: 1,
            short_break_minutes: 1,
            long_break_minutes: 1,
            sessions_until_long_break: 4,
            sound_enabled: false,
        }
    }

    async fn advance_secs(secs: u64) {
        tokio::time::sleep(Duration::from_millis(secs * 1000 + 500)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second_while_running() {
        let timer = handle(TimerConfig::default());
        timer.start().await;
        advance_secs(3).await;
        assert_eq!(timer.state().seconds_remaining, 1500 - 3);
        assert!(timer.state().is_running);
        assert!(timer.is_ticking().await);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_cancels_ticker() {
        let timer = handle(TimerConfig::default());
        timer.start().await;
        advance_secs(2).await;
        let before = timer.state().seconds_remaining;

        assert!(timer.pause().await.is_some());
        assert!(!timer.is_ticking().await);
        advance_secs(10).await;
        assert_eq!(timer.state().seconds_remaining, before);

        timer.start().await;
        advance_secs(1).await;
        assert_eq!(timer.state().seconds_remaining, before - 1);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_keeps_single_ticker() {
        let timer = handle(TimerConfig::default());
        assert!(timer.start().await.is_some());
        assert!(timer.start().await.is_none());
        advance_secs(4).await;
        assert_eq!(timer.state().seconds_remaining, 1500 - 4);
    }

    #[tokio::test(start_paused = true)]
    async fn transition_stops_ticker() {
        let timer = handle(short_config());
        timer.start().await;
        advance_secs(60).await;

        let state = timer.state();
        assert_eq!(state.mode, TimerMode::ShortBreak);
        assert!(!state.is_running);
        assert_eq!(state.seconds_remaining, 60);
        assert_eq!(state.completed_work_sessions, 1);
        assert!(!timer.is_ticking().await);

        advance_secs(5).await;
        assert_eq!(timer.state().seconds_remaining, 60);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_phase_stops_ticker() {
        let timer = handle(TimerConfig::default());
        timer.start().await;
        advance_secs(5).await;
        timer.reset_phase().await;
        advance_secs(5).await;
        let state = timer.state();
        assert_eq!(state.seconds_remaining, 1500);
        assert!(!state.is_running);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_receivers_see_changes() {
        let timer = handle(TimerConfig::default());
        let mut rx = timer.watch();
        timer.start().await;
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_running);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().seconds_remaining, 1499);
    }

    #[tokio::test(start_paused = true)]
    async fn observers_registered_through_handle() {
        let kinds: Arc<StdMutex<Vec<&'static str>>> = Arc::default();
        let sink = Arc::clone(&kinds);
        let timer = handle(short_config());
        timer
            .subscribe(move |event, _| sink.lock().unwrap().push(event.kind()))
            .await;

        timer.start().await;
        advance_secs(2).await;
        timer.pause().await;

        assert_eq!(
            *kinds.lock().unwrap(),
            vec!["TimerStarted", "Ticked", "Ticked", "TimerPaused"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn clones_share_one_engine() {
        let timer = handle(TimerConfig::default());
        let indicator = timer.clone();
        timer.start().await;
        advance_secs(1).await;
        assert_eq!(indicator.state().seconds_remaining, 1499);
        indicator.pause().await;
        assert!(!timer.state().is_running);
    }

    #[tokio::test(start_paused = true)]
    async fn update_config_rejects_zero() {
        let timer = handle(TimerConfig::default());
        let bad = TimerConfig {
            work_minutes: 0,
            ..TimerConfig::default()
        };
        assert!(timer.update_config(bad).await.is_err());
        assert_eq!(timer.config().await.work_minutes, 25);
    }
}
