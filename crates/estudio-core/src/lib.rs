//! # Estudio Core Library
//!
//! Core logic for the Estudio study timer: a Pomodoro countdown that cycles
//! through focus sessions, short breaks and a long break after a configurable
//! number of sessions.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a synchronous state machine; the caller invokes
//!   `tick()` once per elapsed second
//! - **Timer Handle**: the shared store every view reads from; owns the
//!   one-second tick task and publishes each state change
//! - **Storage**: TOML-based configuration
//! - **View**: clock formatting and cycle-progress helpers
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerHandle`]: Shared, tokio-driven timer
//! - [`Config`]: Application configuration management
//! - [`CuePlayer`]: Injected audio cue capability

pub mod error;
pub mod events;
pub mod storage;
pub mod timer;
pub mod view;

pub use error::{ConfigError, CoreError, CueError, ValidationError};
pub use events::Event;
pub use storage::Config;
pub use timer::{
    cue_fn, Cue, CuePlayer, SilentCue, TimerConfig, TimerEngine, TimerHandle, TimerMode, TimerState,
};
