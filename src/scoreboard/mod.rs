//! Scoreboard core
//!
//! Pure computations behind the board:
//! - value normalization (`number`)
//! - category winners and point totals (`aggregate`)
//! - remaining-time breakdown (`countdown`)
//! - event phase and final outcome (`state_machine`)
//! - event-window date strings (`date_format`)

pub mod aggregate;
pub mod countdown;
pub mod date_format;
pub mod number;
pub mod state_machine;

pub use aggregate::{aggregate, decide_winner, evaluate, points_label};
pub use countdown::remaining;
pub use date_format::{format_event_date, format_event_time, ordinal_suffix};
pub use number::{format_display, group_digits, normalize, parse_number};
pub use state_machine::{phase, resolve_outcome, EventStateMachine, PhaseReport};
