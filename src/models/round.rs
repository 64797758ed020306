use time::Duration;

use super::types::UtcDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoundId(pub i64);

/// Lifecycle of a round: `Pending -> Active -> Finished`, with a moderator
/// override back to `Pending` from any state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
pub enum RoundState {
    Pending,
    Active,
    Finished,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Round {
    pub id: RoundId,
    pub name: String,
    pub base_value: i64,
    /// Duration of one hint phase.
    pub length: Duration,
    pub state: RoundState,
    /// Set if and only if the round has left `Pending`.
    pub started_at: Option<UtcDateTime>,
}

impl Round {
    pub fn is_active(&self) -> bool {
        self.state == RoundState::Active
    }
}
