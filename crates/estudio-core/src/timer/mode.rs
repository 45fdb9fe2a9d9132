use serde::{Deserialize, Serialize};

/// The phase the countdown is currently in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimerMode {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn is_break(&self) -> bool {
        !matches!(self, TimerMode::Work)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Work => "WORK",
            TimerMode::ShortBreak => "SHORT_BREAK",
            TimerMode::LongBreak => "LONG_BREAK",
        }
    }

    /// Label shown by the full timer view.
    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Work => "Focus",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }

    /// Label shown by the floating indicator, which only tells focus from rest.
    pub fn short_label(&self) -> &'static str {
        if self.is_break() {
            "Break"
        } else {
            "Focus"
        }
    }
}

impl std::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_screaming_snake_case() {
        let json = serde_json::to_string(&TimerMode::ShortBreak).unwrap();
        assert_eq!(json, "\"SHORT_BREAK\"");
        let parsed: TimerMode = serde_json::from_str("\"LONG_BREAK\"").unwrap();
        assert_eq!(parsed, TimerMode::LongBreak);
    }

    #[test]
    fn breaks_share_short_label() {
        assert_eq!(TimerMode::Work.short_label(), "Focus");
        assert_eq!(TimerMode::ShortBreak.short_label(), "Break");
        assert_eq!(TimerMode::LongBreak.short_label(), "Break");
        assert_ne!(TimerMode::ShortBreak.label(), TimerMode::LongBreak.label());
    }

    #[test]
    fn default_is_work() {
        assert_eq!(TimerMode::default(), TimerMode::Work);
    }
}
