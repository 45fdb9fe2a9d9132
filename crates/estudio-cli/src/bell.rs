use std::io::Write;

use estudio_core::{Cue, CueError, CuePlayer};

/// Rings the terminal bell. Both cues sound the same.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl CuePlayer for TerminalBell {
    fn play(&self, _cue: Cue) -> Result<(), CueError> {
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")
            .and_then(|_| err.flush())
            .map_err(|e| CueError::Playback(e.to_string()))
    }
}
