pub mod presenter;
pub mod scoreboard;

pub use presenter::Presenter;
pub use scoreboard::{BoardState, Clock, ScoreboardService};
