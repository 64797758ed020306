mod free_text;
mod round_action;

pub use free_text::FreeText;
pub use round_action::RoundAction;
