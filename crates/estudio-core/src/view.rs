//! Read-only presentation helpers shared by every timer view.
//!
//! The full timer shows `MM:SS` and one progress dot per session in the
//! cycle; the floating indicator shows `M:SS` and only tells focus from rest.

use serde::{Deserialize, Serialize};

use crate::timer::{TimerConfig, TimerState};

/// How the countdown is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockStyle {
    /// `M:SS`
    #[default]
    Compact,
    /// `MM:SS`
    Padded,
}

impl ClockStyle {
    pub fn format(&self, seconds: u64) -> String {
        match self {
            ClockStyle::Compact => format_compact(seconds),
            ClockStyle::Padded => format_padded(seconds),
        }
    }
}

pub fn format_compact(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn format_padded(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// One entry per session in a cycle, `true` where the session is done.
pub fn cycle_progress(state: &TimerState, config: &TimerConfig) -> Vec<bool> {
    (0..config.sessions_until_long_break)
        .map(|i| i < state.sessions_in_current_cycle)
        .collect()
}

/// Dots rendering of [`cycle_progress`], e.g. `●●○○`.
pub fn cycle_dots(state: &TimerState, config: &TimerConfig) -> String {
    cycle_progress(state, config)
        .into_iter()
        .map(|done| if done { '●' } else { '○' })
        .collect()
}

/// Single line for the floating indicator.
pub fn status_line(state: &TimerState, style: ClockStyle) -> String {
    let marker = if state.is_running { "▶" } else { "⏸" };
    format!(
        "{marker} {:<5} {}",
        state.mode.short_label(),
        style.format(state.seconds_remaining)
    )
}
