mod config;
mod cue;
mod driver;
mod engine;
mod mode;

pub use config::TimerConfig;
pub use cue::{cue_fn, Cue, CueFn, CuePlayer, SilentCue};
pub use driver::TimerHandle;
pub use engine::{next_mode, ObserverId, TimerEngine, TimerState};
pub use mode::TimerMode;
