//! Integration tests for the shared timer handle under a paused tokio clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use estudio_core::{cue_fn, Cue, CueError, Event, TimerConfig, TimerHandle, TimerMode};

async fn wait_secs(secs: u64) {
    tokio::time::sleep(Duration::from_millis(secs * 1000 + 500)).await;
}

#[tokio::test(start_paused = true)]
async fn pause_at_two_minutes_holds_for_ten_seconds() {
    let timer = TimerHandle::new(TimerConfig::default(), Arc::new(estudio_core::SilentCue)).unwrap();
    let mut rx = timer.watch();
    timer.start().await;

    while rx.borrow_and_update().seconds_remaining > 120 {
        rx.changed().await.unwrap();
    }
    timer.pause().await;
    assert_eq!(timer.state().seconds_remaining, 120);

    wait_secs(10).await;
    assert_eq!(timer.state().seconds_remaining, 120);
    assert!(!timer.state().is_running);
}

#[tokio::test(start_paused = true)]
async fn floating_indicator_tracks_a_full_break_cycle() {
    let cues: Arc<Mutex<Vec<Cue>>> = Arc::default();
    let sink = Arc::clone(&cues);
    let player = move |cue: Cue| -> Result<(), CueError> {
        sink.lock().unwrap().push(cue);
        Ok(())
    };
    let cfg = TimerConfig {
        work_minutes: 1,
        short_break_minutes: 1,
        long_break_minutes: 2,
        sessions_until_long_break: 2,
        sound_enabled: true,
    };
    let timer = TimerHandle::new(cfg, Arc::new(cue_fn(player))).unwrap();
    let indicator = timer.clone();

    let transitions: Arc<Mutex<Vec<(TimerMode, TimerMode)>>> = Arc::default();
    let log = Arc::clone(&transitions);
    timer
        .subscribe(move |event, _| {
            if let Event::PhaseCompleted { from, to, .. } = event {
                log.lock().unwrap().push((*from, *to));
            }
        })
        .await;

    for _ in 0..3 {
        timer.start().await;
        wait_secs(60).await;
        assert!(!indicator.state().is_running);
    }

    assert_eq!(
        *transitions.lock().unwrap(),
        vec![
            (TimerMode::Work, TimerMode::ShortBreak),
            (TimerMode::ShortBreak, TimerMode::Work),
            (TimerMode::Work, TimerMode::LongBreak),
        ]
    );
    let state = indicator.state();
    assert_eq!(state.mode, TimerMode::LongBreak);
    assert_eq!(state.seconds_remaining, 120);
    assert_eq!(state.completed_work_sessions, 2);
    assert_eq!(state.sessions_in_current_cycle, 0);
    assert_eq!(
        *cues.lock().unwrap(),
        vec![
            Cue::Start,
            Cue::Transition,
            Cue::Start,
            Cue::Transition,
            Cue::Start,
            Cue::Transition,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn dropping_last_handle_stops_ticking() {
    let timer = TimerHandle::new(TimerConfig::default(), Arc::new(estudio_core::SilentCue)).unwrap();
    let rx = timer.watch();
    timer.start().await;
    wait_secs(2).await;
    drop(timer);

    wait_secs(5).await;
    assert_eq!(rx.borrow().seconds_remaining, 1500 - 2);
    assert!(rx.has_changed().is_err());
}
