use std::str::FromStr;

use sqlx::FromRow;
use thiserror::Error;
use time::Duration;

use crate::models::{
    types::UtcDateTime, ActionId, AffinityGroup, Content, GuessAction, Person, PersonId,
    Preference, Question, QuestionLetter, Round, RoundId, RoundResult, RoundState, Team, TeamId,
};

pub trait DBConvertible: Sized {
    type DBType;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError>;

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError>;
}

#[derive(Debug, Error)]
pub enum DBFromConversionError {
    #[error("Failed to parse enum variant: {0}")]
    NoSuchVariant(String),
    #[error("Invalid number: {0}")]
    InvalidNumber(i64),
    #[error("Invalid question letter: {0}")]
    InvalidLetter(String),
}

#[derive(Debug, Error)]
pub enum DBToConversionError {
    #[error("Round length must be a whole number of seconds, got {0}")]
    FractionalLength(Duration),
}

impl DBConvertible for RoundState {
    type DBType = i64;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(match self {
            RoundState::Pending => 0,
            RoundState::Active => 1,
            RoundState::Finished => 2,
        })
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        match value {
            0 => Ok(RoundState::Pending),
            1 => Ok(RoundState::Active),
            2 => Ok(RoundState::Finished),

            unknown => Err(DBFromConversionError::InvalidNumber(*unknown)),
        }
    }
}

impl DBConvertible for Preference {
    type DBType = String;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(self.as_ref().to_string())
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Preference::from_str(value)
            .map_err(|_| DBFromConversionError::NoSuchVariant(value.to_string()))
    }
}

impl DBConvertible for QuestionLetter {
    type DBType = String;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(self.to_string())
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        QuestionLetter::parse(value).ok_or_else(|| DBFromConversionError::InvalidLetter(value.clone()))
    }
}

#[derive(Debug, FromRow)]
pub struct SqlRound {
    pub round_id: i64,
    pub name: String,
    pub base_value: i64,
    pub length_seconds: i64,
    pub state: i64,
    pub started_at: Option<UtcDateTime>,
}

impl DBConvertible for Round {
    type DBType = SqlRound;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        if self.length.subsec_nanoseconds() != 0 {
            return Err(DBToConversionError::FractionalLength(self.length));
        }

        Ok(SqlRound {
            round_id: self.id.0,
            name: self.name.clone(),
            base_value: self.base_value,
            length_seconds: self.length.whole_seconds(),
            state: self.state.to_db()?,
            started_at: self.started_at,
        })
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(Round {
            id: RoundId(value.round_id),
            name: value.name.clone(),
            base_value: value.base_value,
            length: Duration::seconds(value.length_seconds),
            state: RoundState::from_db(&value.state)?,
            started_at: value.started_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SqlQuestion {
    pub round_id: i64,
    pub letter: String,
    pub prompt: String,
    pub hint1: Option<String>,
    pub hint2: Option<String>,
    pub answer_pattern: String,
}

impl DBConvertible for Question {
    type DBType = SqlQuestion;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(SqlQuestion {
            round_id: self.round_id.0,
            letter: self.letter.to_db()?,
            prompt: store_content(&self.prompt),
            hint1: self.hint1.as_ref().map(store_content),
            hint2: self.hint2.as_ref().map(store_content),
            answer_pattern: self.answer_pattern.clone(),
        })
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(Question {
            round_id: RoundId(value.round_id),
            letter: QuestionLetter::from_db(&value.letter)?,
            prompt: Content::from_stored(&value.prompt),
            hint1: value.hint1.as_deref().map(Content::from_stored),
            hint2: value.hint2.as_deref().map(Content::from_stored),
            answer_pattern: value.answer_pattern.clone(),
        })
    }
}

fn store_content(content: &Content) -> String {
    match content {
        Content::Text(text) => text.clone(),
        Content::Image(reference) => format!("file://{reference}"),
    }
}

#[derive(Debug, FromRow)]
pub struct SqlGuessAction {
    pub action_id: i64,
    pub team_id: i64,
    pub round_id: i64,
    pub letter: String,
    pub submitted_at: UtcDateTime,
    pub answered: String,
    pub points: f64,
}

impl DBConvertible for GuessAction {
    type DBType = SqlGuessAction;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(SqlGuessAction {
            action_id: self.id.0,
            team_id: self.team_id.0,
            round_id: self.round_id.0,
            letter: self.letter.to_db()?,
            submitted_at: self.submitted_at,
            answered: self.answered.clone(),
            points: self.points,
        })
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(GuessAction {
            id: ActionId(value.action_id),
            team_id: TeamId(value.team_id),
            round_id: RoundId(value.round_id),
            letter: QuestionLetter::from_db(&value.letter)?,
            submitted_at: value.submitted_at,
            answered: value.answered.clone(),
            points: value.points,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SqlTeam {
    pub team_id: i64,
    pub name: String,
    pub is_admin: bool,
    pub locked: bool,
    pub last_seen: Option<UtcDateTime>,
}

impl DBConvertible for Team {
    type DBType = SqlTeam;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(SqlTeam {
            team_id: self.id.0,
            name: self.name.clone(),
            is_admin: self.is_admin,
            locked: self.locked,
            last_seen: self.last_seen,
        })
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(Team {
            id: TeamId(value.team_id),
            name: value.name.clone(),
            is_admin: value.is_admin,
            locked: value.locked,
            last_seen: value.last_seen,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SqlRoundResult {
    pub team_id: i64,
    pub round_id: i64,
    pub contribution: i64,
    pub display_score: f64,
}

impl DBConvertible for RoundResult {
    type DBType = SqlRoundResult;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(SqlRoundResult {
            team_id: self.team_id.0,
            round_id: self.round_id.0,
            contribution: self.contribution,
            display_score: self.display_score,
        })
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(RoundResult {
            team_id: TeamId(value.team_id),
            round_id: RoundId(value.round_id),
            contribution: value.contribution,
            display_score: value.display_score,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SqlPerson {
    pub person_id: i64,
    pub name: String,
    pub login: Option<String>,
    pub primary_group: i64,
    pub secondary_group: Option<i64>,
    pub preference: Option<String>,
    pub team_id: Option<i64>,
}

impl DBConvertible for Person {
    type DBType = SqlPerson;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(SqlPerson {
            person_id: self.id.0,
            name: self.name.clone(),
            login: self.login.clone(),
            primary_group: self.primary_group.0,
            secondary_group: self.secondary_group.map(|g| g.0),
            preference: self.preference.map(|p| p.to_db()).transpose()?,
            team_id: self.team_id.map(|t| t.0),
        })
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(Person {
            id: PersonId(value.person_id),
            name: value.name.clone(),
            login: value.login.clone(),
            primary_group: AffinityGroup(value.primary_group),
            secondary_group: value.secondary_group.map(AffinityGroup),
            preference: value.preference.as_ref().map(Preference::from_db).transpose()?,
            team_id: value.team_id.map(TeamId),
        })
    }
}

/// Converts a batch of rows, failing on the first bad one.
pub fn from_db_all<T: DBConvertible>(rows: &[T::DBType]) -> Result<Vec<T>, DBFromConversionError> {
    rows.iter().map(T::from_db).collect()
}

#[cfg(test)]
mod tests {
    use crate::models::{Content, Preference, RoundState};

    use super::{store_content, DBConvertible, DBFromConversionError};

    #[test]
    fn round_state_codes() {
        for state in [RoundState::Pending, RoundState::Active, RoundState::Finished] {
            assert_eq!(RoundState::from_db(&state.to_db().unwrap()).unwrap(), state);
        }
        assert!(matches!(
            RoundState::from_db(&7),
            Err(DBFromConversionError::InvalidNumber(7))
        ));
    }

    #[test]
    fn preference_codes() {
        assert_eq!(Preference::Random.to_db().unwrap(), "R");
        assert_eq!(
            Preference::from_db(&"S".to_string()).unwrap(),
            Preference::SelfOrganized
        );
        assert!(Preference::from_db(&"X".to_string()).is_err());
    }

    #[test]
    fn image_content_keeps_prefix() {
        assert_eq!(
            store_content(&Content::Image("r1/a.png".to_string())),
            "file://r1/a.png"
        );
    }
}
