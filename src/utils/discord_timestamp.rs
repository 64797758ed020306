use std::fmt::Display;

use crate::models::types::UtcDateTime;

/// Discord renders `<t:unix:style>` in the reader's own time zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampStyle {
    /// e.g. `20:15:30`, used for hint reveals
    LongTime,
    /// e.g. `in 2 minutes`
    Relative,
}

impl Display for TimestampStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suffix = match self {
            TimestampStyle::LongTime => "T",
            TimestampStyle::Relative => "R",
        };
        f.write_str(suffix)
    }
}

pub fn timestamp(at: UtcDateTime, style: TimestampStyle) -> String {
    format!("<t:{}:{style}>", at.unix_timestamp())
}
