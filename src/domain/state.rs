use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CupError, Result};

/// Temporal stage of the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventPhase {
    /// Before the start instant
    NotStarted,
    /// Between start (inclusive) and end (exclusive)
    InProgress,
    /// At or after the end instant; terminal
    Ended,
}

impl EventPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventPhase::NotStarted => "NOT_STARTED",
            EventPhase::InProgress => "IN_PROGRESS",
            EventPhase::Ended => "ENDED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EventPhase::Ended)
    }

    /// Text shown above the countdown clock
    pub fn headline(&self) -> &'static str {
        match self {
            EventPhase::NotStarted => "The Cup Starts In",
            EventPhase::InProgress => "The Cup Ends In",
            EventPhase::Ended => "",
        }
    }
}

impl fmt::Display for EventPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final result of the competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    LeftWins,
    RightWins,
    Tie,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::LeftWins => write!(f, "LEFT_WINS"),
            Outcome::RightWins => write!(f, "RIGHT_WINS"),
            Outcome::Tie => write!(f, "TIE"),
        }
    }
}

/// Remaining time until a target instant.
///
/// Fields are derived from `total_millis` with floor semantics, so once the
/// target has passed they go negative and carry no display meaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeRemaining {
    pub total_millis: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeRemaining {
    pub fn is_expired(&self) -> bool {
        self.total_millis <= 0
    }

    /// Clock display fields: days unpadded, the rest two digits
    pub fn clock_fields(&self) -> ClockFields {
        ClockFields {
            days: self.days.to_string(),
            hours: pad_two(self.hours),
            minutes: pad_two(self.minutes),
            seconds: pad_two(self.seconds),
        }
    }
}

/// Mirrors `('0' + n).slice(-2)`: keeps the last two characters.
fn pad_two(value: i64) -> String {
    let padded = format!("0{value}");
    let start = padded.len().saturating_sub(2);
    padded[start..].to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockFields {
    pub days: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

/// The configured event window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl EventWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(CupError::InvalidConfig(format!(
                "event start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }
}
