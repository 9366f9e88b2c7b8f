//! Projects scoreboard outputs onto a display surface.

use chrono::FixedOffset;

use crate::adapters::DisplaySurface;
use crate::config::{AppConfig, PartiesConfig};
use crate::domain::{EventWindow, NumericCell, Outcome, Scoreboard, Side, TimeRemaining};
use crate::scoreboard::{format_event_date, format_event_time, points_label, PhaseReport};

/// Flag set on the winning side's cell
pub const WINNER_FLAG: &str = "winner";

pub const THANK_YOU: &str = "and a big THANK YOU to everyone who gave!";

/// Turns core results into surface updates
#[derive(Debug, Clone)]
pub struct Presenter {
    parties: PartiesConfig,
    title: String,
    year: i32,
}

impl Presenter {
    pub fn new(parties: PartiesConfig, title: &str, year: i32) -> Self {
        Self {
            parties,
            title: title.to_string(),
            year,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.parties.clone(), &config.event.title, config.event.year)
    }

    /// Cells, winner flags, point labels and totals for one snapshot
    pub fn show_scoreboard(&self, surface: &dyn DisplaySurface, board: &Scoreboard) {
        for (key, cell) in &board.extras {
            show_cell(surface, key, cell);
        }

        for category in &board.categories {
            for side in [Side::Left, Side::Right] {
                let field = match side {
                    Side::Left => &category.left_key,
                    Side::Right => &category.right_key,
                };
                show_cell(surface, field, category.cell(side));
                surface.set_flag(field, WINNER_FLAG, category.winner.is(side));
            }
            surface.set_text(&format!("{}.points", category.id), &points_label(category.points));
        }

        surface.set_text(&self.parties.left.total_field, &board.totals.left.to_string());
        surface.set_text(&self.parties.right.total_field, &board.totals.right.to_string());
    }

    /// Countdown fields, headline and, once ended, the announcement
    pub fn show_clock(&self, surface: &dyn DisplaySurface, report: &PhaseReport) {
        let remaining = if report.remaining.is_expired() {
            TimeRemaining::default()
        } else {
            report.remaining
        };
        let fields = remaining.clock_fields();
        surface.set_text("days", &fields.days);
        surface.set_text("hours", &fields.hours);
        surface.set_text("minutes", &fields.minutes);
        surface.set_text("seconds", &fields.seconds);

        surface.set_text("countdown-text", report.phase.headline());
        match report.outcome {
            Some(outcome) => surface.set_labels(
                "countdown",
                &[self.announcement(outcome), THANK_YOU.to_string()],
            ),
            None => surface.set_text("countdown", ""),
        }
    }

    /// Static event window and year
    pub fn show_event_window(
        &self,
        surface: &dyn DisplaySurface,
        window: &EventWindow,
        offset: FixedOffset,
    ) {
        surface.set_text("year", &self.year.to_string());
        surface.set_text("start-date", &format_event_date(window.start, offset));
        surface.set_text("start-time", &format_event_time(window.start, offset));
        surface.set_text("end-date", &format_event_date(window.end, offset));
        surface.set_text("end-time", &format_event_time(window.end, offset));
    }

    pub fn announcement(&self, outcome: Outcome) -> String {
        match outcome {
            Outcome::LeftWins => self.winner_line(Side::Left),
            Outcome::RightWins => self.winner_line(Side::Right),
            Outcome::Tie => format!(
                "It's a tie! The {} {} is shared by the {} and the {}!",
                self.year, self.title, self.parties.left.name, self.parties.right.name
            ),
        }
    }

    fn winner_line(&self, side: Side) -> String {
        format!(
            "{} win the {} {}!",
            self.parties.party(side).name,
            self.year,
            self.title
        )
    }
}

fn show_cell(surface: &dyn DisplaySurface, field: &str, cell: &NumericCell) {
    match cell {
        NumericCell::Numeric { display, .. } => surface.set_text(field, display),
        NumericCell::MultiLabel { parts } => surface.set_labels(field, parts),
    }
}
