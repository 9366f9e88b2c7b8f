pub mod display;
pub mod feed;

pub use display::{ConsoleSurface, DisplaySurface, FieldRow, MemorySurface};
pub use feed::{fetch_record, parse_record, source_from_location, FeedSource, FileFeed, HttpFeed};
