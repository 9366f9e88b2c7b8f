//! Event phase tracking
//!
//! NOT_STARTED → IN_PROGRESS → ENDED
//!
//! The phase is recomputed from the wall clock on every observation until
//! ENDED is reached; ENDED latches and resolves the outcome once.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::{AggregateTotals, EventPhase, EventWindow, Outcome, TimeRemaining};

use super::countdown::remaining;

/// Phase of the event at `now`
pub fn phase(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> EventPhase {
    if now < start {
        EventPhase::NotStarted
    } else if now >= end {
        EventPhase::Ended
    } else {
        EventPhase::InProgress
    }
}

/// Final result from the point totals
pub fn resolve_outcome(totals: AggregateTotals) -> Outcome {
    if totals.left > totals.right {
        Outcome::LeftWins
    } else if totals.right > totals.left {
        Outcome::RightWins
    } else {
        Outcome::Tie
    }
}

/// Result of one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: EventPhase,
    /// Instant the clock counts down to
    pub target: DateTime<Utc>,
    pub remaining: TimeRemaining,
    /// Set once the event has ended
    pub outcome: Option<Outcome>,
    /// True only on the observation that entered ENDED
    pub just_ended: bool,
}

/// Event state machine
pub struct EventStateMachine {
    window: EventWindow,
    last_phase: Option<EventPhase>,
    outcome: Option<Outcome>,
}

impl EventStateMachine {
    pub fn new(window: EventWindow) -> Self {
        Self {
            window,
            last_phase: None,
            outcome: None,
        }
    }

    /// The countdown target for a phase. Only `end` is ever terminal.
    pub fn active_target(&self, phase: EventPhase) -> DateTime<Utc> {
        match phase {
            EventPhase::NotStarted => self.window.start,
            EventPhase::InProgress | EventPhase::Ended => self.window.end,
        }
    }

    /// Observe the clock with the latest totals.
    ///
    /// `totals` is only read on the observation that enters ENDED.
    pub fn observe(&mut self, now: DateTime<Utc>, totals: AggregateTotals) -> PhaseReport {
        let end = self.window.end;

        if let Some(outcome) = self.outcome {
            return PhaseReport {
                phase: EventPhase::Ended,
                target: end,
                remaining: remaining(now, end),
                outcome: Some(outcome),
                just_ended: false,
            };
        }

        let current = phase(now, self.window.start, end);
        let target = self.active_target(current);
        let left = remaining(now, target);

        if self.last_phase != Some(current) {
            debug!("Event phase: {:?} -> {}", self.last_phase, current);
            self.last_phase = Some(current);
        }

        if current != EventPhase::NotStarted && left.is_expired() {
            let outcome = resolve_outcome(totals);
            info!(
                "Event ended: {} ({} - {})",
                outcome, totals.left, totals.right
            );
            self.outcome = Some(outcome);
            self.last_phase = Some(EventPhase::Ended);
            return PhaseReport {
                phase: EventPhase::Ended,
                target,
                remaining: left,
                outcome: Some(outcome),
                just_ended: true,
            };
        }

        PhaseReport {
            phase: current,
            target,
            remaining: left,
            outcome: None,
            just_ended: false,
        }
    }
}
