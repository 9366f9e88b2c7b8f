pub mod adapters;
pub mod cli;
pub mod config;
pub mod coordination;
pub mod domain;
pub mod error;
pub mod scoreboard;
pub mod services;

pub use adapters::{ConsoleSurface, DisplaySurface, FeedSource, FileFeed, HttpFeed, MemorySurface};
pub use config::AppConfig;
pub use coordination::{Scheduler, TaskHandle};
pub use domain::{
    AggregateTotals, Amount, CategoryResult, EventPhase, EventWindow, NumericCell, Outcome, RawRecord,
    ScoreCategory, Scoreboard, Side, TimeRemaining, Winner,
};
pub use error::{CupError, Result};
pub use scoreboard::{EventStateMachine, PhaseReport};
pub use services::{BoardState, Presenter, ScoreboardService};
