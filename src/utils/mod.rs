mod discord_timestamp;

pub mod formatting;
pub mod media;

pub use discord_timestamp::{timestamp, TimestampStyle};
