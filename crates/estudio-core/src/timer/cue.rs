//! Audio cue capability.
//!
//! The engine never talks to an audio device directly. It is handed a
//! [`CuePlayer`] and fires cues through it, discarding any error.

use serde::{Deserialize, Serialize};

use crate::error::CueError;

/// Which cue to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    /// The countdown was started or resumed.
    Start,
    /// A phase ran out and the engine moved to the next mode.
    Transition,
}

impl Cue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Start => "start",
            Cue::Transition => "transition",
        }
    }
}

/// Fire-and-forget audio output.
///
/// Implementations must not block for the length of the sound.
pub trait CuePlayer: Send + Sync {
    fn play(&self, cue: Cue) -> Result<(), CueError>;
}

/// Player that does nothing. Used for headless runs and as the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCue;

impl CuePlayer for SilentCue {
    fn play(&self, _cue: Cue) -> Result<(), CueError> {
        Ok(())
    }
}

/// Adapts a closure into a [`CuePlayer`]. See [`cue_fn`].
#[derive(Debug, Clone, Copy)]
pub struct CueFn<F>(F);

/// Build a player from a closure.
pub fn cue_fn<F>(f: F) -> CueFn<F>
where
    F: Fn(Cue) -> Result<(), CueError> + Send + Sync,
{
    CueFn(f)
}

impl<F> CuePlayer for CueFn<F>
where
    F: Fn(Cue) -> Result<(), CueError> + Send + Sync,
{
    fn play(&self, cue: Cue) -> Result<(), CueError> {
        (self.0)(cue)
    }
}
