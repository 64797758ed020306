use super::{question::QuestionLetter, round::RoundId, team::TeamId, types::UtcDateTime};

/// Points recorded for a submission that does not match the answer.
pub const NON_MATCH_POINTS: f64 = -1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub i64);

/// One row of the guess ledger.
#[derive(Clone, Debug, PartialEq)]
pub struct GuessAction {
    pub id: ActionId,
    pub team_id: TeamId,
    pub round_id: RoundId,
    pub letter: QuestionLetter,
    pub submitted_at: UtcDateTime,
    pub answered: String,
    pub points: f64,
}

/// Coarse result of a submission. Deliberately carries no score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum GuessOutcome {
    Submitted,
    NoLetter,
    /// No round is active, or the active round has no question with that letter.
    NoActiveRound,
}
