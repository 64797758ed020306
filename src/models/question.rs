use std::fmt::Display;

use super::round::RoundId;

/// The single-letter identifier of a question within its round, always uppercase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuestionLetter(char);

impl QuestionLetter {
    /// Accepts exactly one ASCII letter, in either case.
    pub fn parse(value: &str) -> Option<QuestionLetter> {
        let mut chars = value.trim().chars();

        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => {
                Some(QuestionLetter(c.to_ascii_uppercase()))
            }
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        self.0
    }
}

impl Display for QuestionLetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

const IMAGE_PREFIX: &str = "file://";

/// A question field is either plain text or an opaque reference to a picture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Image(String),
}

impl Content {
    pub fn from_stored(value: &str) -> Content {
        match value.strip_prefix(IMAGE_PREFIX) {
            Some(reference) => Content::Image(reference.to_string()),
            None => Content::Text(value.to_string()),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Content::Image(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Question {
    pub round_id: RoundId,
    pub letter: QuestionLetter,
    pub prompt: Content,
    pub hint1: Option<Content>,
    pub hint2: Option<Content>,
    pub answer_pattern: String,
}

impl Question {
    pub fn is_picture(&self) -> bool {
        self.prompt.is_image()
            || self.hint1.as_ref().is_some_and(Content::is_image)
            || self.hint2.as_ref().is_some_and(Content::is_image)
    }
}
