use serde::Deserialize;
use thiserror::Error;

use crate::engine::answer_matcher::AnswerPattern;

use super::question::QuestionLetter;

/// An uploaded contest definition. Every section is optional; a present
/// section replaces what is stored.
#[derive(Debug, Default, Deserialize)]
pub struct ContestDefinition {
    pub teams: Option<Vec<TeamDefinition>>,
    pub rounds: Option<Vec<RoundDefinition>>,
    pub questions: Option<Vec<QuestionDefinition>>,
}

#[derive(Debug, Deserialize)]
pub struct TeamDefinition {
    pub team_id: i64,
    pub name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub locked: bool,
}

#[derive(Debug, Deserialize)]
pub struct RoundDefinition {
    pub round: i64,
    pub name: Option<String>,
    /// Seconds.
    pub length: i64,
    pub value: i64,
}

#[derive(Debug, Deserialize)]
pub struct QuestionDefinition {
    pub round: i64,
    pub letter: String,
    pub question: String,
    pub hint1: Option<String>,
    pub hint2: Option<String>,
    pub answer: String,
}

/// An uploaded roster.
#[derive(Debug, Default, Deserialize)]
pub struct RosterDefinition {
    pub people: Option<Vec<PersonDefinition>>,
}

#[derive(Debug, Deserialize)]
pub struct PersonDefinition {
    pub person_id: i64,
    pub name: String,
    pub login: Option<String>,
    pub primary: i64,
    /// `0` means the same as absent.
    pub secondary: Option<i64>,
}

impl PersonDefinition {
    pub fn secondary_group(&self) -> Option<i64> {
        self.secondary.filter(|&group| group != 0)
    }
}

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("bad_json: {0}")]
    BadJson(#[from] serde_json::Error),
    #[error("Round {round} must last at least one second")]
    InvalidLength { round: i64 },
    #[error("Question letter `{letter}` in round {round} is not a single letter")]
    InvalidLetter { round: i64, letter: String },
    #[error("Duplicate question {letter} in round {round}")]
    DuplicateQuestion { round: i64, letter: QuestionLetter },
    #[error("Answer for question {letter} in round {round} is not a valid pattern: {source}")]
    InvalidPattern {
        round: i64,
        letter: QuestionLetter,
        source: regex::Error,
    },
}

impl ContestDefinition {
    pub fn parse(payload: &[u8]) -> Result<ContestDefinition, DefinitionError> {
        let definition: ContestDefinition = serde_json::from_slice(payload)?;
        definition.validate()?;
        Ok(definition)
    }

    fn validate(&self) -> Result<(), DefinitionError> {
        for round in self.rounds.iter().flatten() {
            if round.length <= 0 {
                return Err(DefinitionError::InvalidLength { round: round.round });
            }
        }

        let mut seen = Vec::new();
        for question in self.questions.iter().flatten() {
            let letter = question.parsed_letter()?;

            if seen.contains(&(question.round, letter)) {
                return Err(DefinitionError::DuplicateQuestion {
                    round: question.round,
                    letter,
                });
            }
            seen.push((question.round, letter));

            AnswerPattern::compile(&question.answer).map_err(|source| {
                DefinitionError::InvalidPattern {
                    round: question.round,
                    letter,
                    source,
                }
            })?;
        }

        Ok(())
    }
}

impl QuestionDefinition {
    pub fn parsed_letter(&self) -> Result<QuestionLetter, DefinitionError> {
        QuestionLetter::parse(&self.letter).ok_or_else(|| DefinitionError::InvalidLetter {
            round: self.round,
            letter: self.letter.clone(),
        })
    }
}

impl RosterDefinition {
    pub fn parse(payload: &[u8]) -> Result<RosterDefinition, DefinitionError> {
        Ok(serde_json::from_slice(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{ContestDefinition, DefinitionError, RosterDefinition};

    #[test]
    fn full_definition() {
        let definition = ContestDefinition::parse(
            br#"{
                "teams": [{ "team_id": 1, "name": "Quizzards" }, { "team_id": 99, "is_admin": true }],
                "rounds": [{ "round": 1, "name": "Capitals", "length": 60, "value": 4 }],
                "questions": [
                    { "round": 1, "letter": "a", "question": "Capital of France?", "answer": "paris" },
                    { "round": 1, "letter": "B", "question": "file://r1/b.png", "hint1": "Island", "answer": "^(malta|valletta)$" }
                ]
            }"#,
        )
        .unwrap();

        let teams = definition.teams.unwrap();
        assert!(teams[1].is_admin);
        assert!(!teams[0].locked);
        assert_eq!(definition.rounds.unwrap()[0].value, 4);
        assert_eq!(definition.questions.unwrap().len(), 2);
    }

    #[test]
    fn sections_are_optional() {
        let definition = ContestDefinition::parse(b"{}").unwrap();
        assert!(definition.teams.is_none());
        assert!(definition.rounds.is_none());
        assert!(definition.questions.is_none());
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(matches!(
            ContestDefinition::parse(b"[1, 2"),
            Err(DefinitionError::BadJson(_))
        ));
        assert!(matches!(
            ContestDefinition::parse(br#"{ "rounds": [{ "round": 1, "length": 0, "value": 1 }] }"#),
            Err(DefinitionError::InvalidLength { round: 1 })
        ));
        assert!(matches!(
            ContestDefinition::parse(
                br#"{ "questions": [{ "round": 1, "letter": "AB", "question": "?", "answer": "x" }] }"#
            ),
            Err(DefinitionError::InvalidLetter { .. })
        ));
        assert!(matches!(
            ContestDefinition::parse(
                br#"{ "questions": [{ "round": 1, "letter": "A", "question": "?", "answer": "(x" }] }"#
            ),
            Err(DefinitionError::InvalidPattern { .. })
        ));
        assert!(matches!(
            ContestDefinition::parse(
                br#"{ "questions": [
                    { "round": 1, "letter": "A", "question": "?", "answer": "x" },
                    { "round": 1, "letter": "a", "question": "?", "answer": "y" }
                ] }"#
            ),
            Err(DefinitionError::DuplicateQuestion { round: 1, .. })
        ));
    }

    #[test]
    fn roster_secondary_zero_is_none() {
        let roster = RosterDefinition::parse(
            br#"{ "people": [
                { "person_id": 1, "name": "Ann", "login": "1001", "primary": 3, "secondary": 0 },
                { "person_id": 2, "name": "Bob", "primary": 3, "secondary": 4 },
                { "person_id": 3, "name": "Cid", "primary": 2 }
            ] }"#,
        )
        .unwrap();

        let people = roster.people.unwrap();
        assert_eq!(people[0].secondary_group(), None);
        assert_eq!(people[1].secondary_group(), Some(4));
        assert_eq!(people[2].secondary_group(), None);
        assert_eq!(people[2].login, None);
    }
}
