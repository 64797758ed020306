use super::{round::RoundId, team::TeamId};

#[derive(Clone, Debug, PartialEq)]
pub struct RoundResult {
    pub team_id: TeamId,
    pub round_id: RoundId,
    /// Added to the running total.
    pub contribution: i64,
    /// Only shown in views of this round.
    pub display_score: f64,
}
