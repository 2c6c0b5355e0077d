//! Timer phase definitions

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three alternating modes of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Phase {
    /// Human-readable name shown to clients
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::ShortBreak => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }

    /// Stable identifier used in routes and serialized snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Focus => "focus",
            Phase::ShortBreak => "short-break",
            Phase::LongBreak => "long-break",
        }
    }

    /// Key under which this phase's duration is persisted
    pub fn settings_key(&self) -> &'static str {
        match self {
            Phase::Focus => "focusDuration",
            Phase::ShortBreak => "shortBreakDuration",
            Phase::LongBreak => "longBreakDuration",
        }
    }

    /// Built-in duration in seconds, used when nothing is persisted
    pub fn default_duration(&self) -> u64 {
        match self {
            Phase::Focus => 25 * 60,
            Phase::ShortBreak => 5 * 60,
            Phase::LongBreak => 15 * 60,
        }
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(Phase::Focus),
            "short-break" => Ok(Phase::ShortBreak),
            "long-break" => Ok(Phase::LongBreak),
            other => Err(format!("Unknown phase: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_display_names() {
        assert_eq!(Phase::Focus.label(), "Focus");
        assert_eq!(Phase::ShortBreak.label(), "Short Break");
        assert_eq!(Phase::LongBreak.label(), "Long Break");
    }

    #[test]
    fn slug_round_trips_through_from_str() {
        for phase in [Phase::Focus, Phase::ShortBreak, Phase::LongBreak] {
            assert_eq!(phase.as_str().parse::<Phase>(), Ok(phase));
        }
    }

    #[test]
    fn unknown_slug_is_rejected() {
        assert!("coffee".parse::<Phase>().is_err());
    }

    #[test]
    fn default_durations() {
        assert_eq!(Phase::Focus.default_duration(), 1500);
        assert_eq!(Phase::ShortBreak.default_duration(), 300);
        assert_eq!(Phase::LongBreak.default_duration(), 900);
    }
}
