use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::time::Duration;
use tabled::{Table, Tabled};

use crate::adapters::{fetch_record, source_from_location};
use crate::config::AppConfig;
use crate::domain::{AggregateTotals, EventPhase, Scoreboard, Winner};
use crate::error::Result;
use crate::scoreboard::{aggregate, EventStateMachine};

#[derive(Parser)]
#[command(name = "kiddush-cup")]
#[command(version = "0.1.0")]
#[command(
    about = "Countdown and live scoreboard for the Commonwealth Kiddush Cup",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding default.toml and environment overrides
    #[arg(short, long, default_value = "config")]
    pub config_dir: String,

    /// Override the feed location (URL or path)
    #[arg(short, long, env = "CUP_FEED_SOURCE")]
    pub feed: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the live board until the event ends (default)
    Run {
        /// Keep previous renders instead of clearing the terminal
        #[arg(long)]
        no_clear: bool,
    },
    /// Fetch the feed once and print the scoreboard
    Snapshot {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the current phase and time remaining
    Countdown,
}

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct CategoryRow {
    pub category: String,
    pub left: String,
    pub right: String,
    pub winner: String,
    pub points: u32,
}

/// Table rows for a scoreboard, plus a totals row
pub fn category_rows(board: &Scoreboard, left_name: &str, right_name: &str) -> Vec<CategoryRow> {
    let mut rows: Vec<CategoryRow> = board
        .categories
        .iter()
        .map(|c| CategoryRow {
            category: c.label.clone(),
            left: c.left.display_text(),
            right: c.right.display_text(),
            winner: match c.winner {
                Winner::Left => left_name.to_string(),
                Winner::Right => right_name.to_string(),
                Winner::Neither => "-".to_string(),
            },
            points: c.points,
        })
        .collect();
    rows.push(totals_row(board.totals));
    rows
}

fn totals_row(totals: AggregateTotals) -> CategoryRow {
    CategoryRow {
        category: "TOTAL".to_string(),
        left: totals.left.to_string(),
        right: totals.right.to_string(),
        winner: String::new(),
        points: totals.left + totals.right,
    }
}

/// Fetch one snapshot and print it
pub async fn show_snapshot(config: &AppConfig, mode: OutputMode) -> Result<()> {
    let source = source_from_location(
        &config.feed.source,
        Duration::from_millis(config.feed.timeout_ms),
    )?;
    let record = fetch_record(source.as_ref()).await?;
    let board = aggregate(&record, &config.categories);

    match mode {
        OutputMode::Table => {
            let rows = category_rows(&board, &config.parties.left.name, &config.parties.right.name);
            println!("{}", Table::new(rows));
        }
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(&board)?);
        }
    }
    Ok(())
}

/// One-line countdown summary at `now`
pub fn countdown_line(config: &AppConfig, now: DateTime<Utc>) -> Result<String> {
    let mut machine = EventStateMachine::new(config.window()?);
    let report = machine.observe(now, AggregateTotals::default());

    if report.phase == EventPhase::Ended {
        return Ok(format!("The {} {} has ended", config.event.year, config.event.title));
    }

    let fields = report.remaining.clock_fields();
    Ok(format!(
        "{} {} days {}:{}:{}",
        report.phase.headline(),
        fields.days,
        fields.hours,
        fields.minutes,
        fields.seconds
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::parse_record;
    use crate::domain::ScoreCategory;

    #[test]
    fn test_category_rows_include_totals() {
        let record = parse_record("l,r\n7,3\n").unwrap();
        let categories = [ScoreCategory::new("c", "l", "r", 2).with_label("Most gifts")];
        let board = aggregate(&record, &categories);

        let rows = category_rows(&board, "Hoos", "Hokies");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].winner, "Hoos");
        assert_eq!(rows[0].category, "Most gifts");
        assert_eq!(rows[1].category, "TOTAL");
        assert_eq!(rows[1].left, "2");
        assert_eq!(rows[1].right, "0");
    }

    #[test]
    fn test_countdown_line() {
        let config = AppConfig::shipped("results.csv");
        let window = config.window().unwrap();

        let line = countdown_line(&config, window.end - chrono::Duration::seconds(3_725)).unwrap();
        assert_eq!(line, "The Cup Ends In 0 days 01:02:05");

        let line = countdown_line(&config, window.start - chrono::Duration::days(3)).unwrap();
        assert!(line.starts_with("The Cup Starts In 3 days"));

        let line = countdown_line(&config, window.end).unwrap();
        assert_eq!(line, "The 2025 Commonwealth Kiddush Cup has ended");
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from(["kiddush-cup", "--config-dir", "deploy", "snapshot", "--json"]);
        assert_eq!(cli.config_dir, "deploy");
        assert!(matches!(cli.command, Some(Commands::Snapshot { json: true })));

        let cli = Cli::parse_from(["kiddush-cup"]);
        assert!(cli.command.is_none());
    }
}
