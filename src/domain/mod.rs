pub mod cell;
pub mod record;
pub mod score;
pub mod state;

pub use cell::*;
pub use record::*;
pub use score::*;
pub use state::*;
