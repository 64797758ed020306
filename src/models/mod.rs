mod definition;
mod guess;
mod person;
mod question;
mod round;
mod round_result;
mod team;

pub mod types;

pub use definition::{ContestDefinition, QuestionDefinition, RosterDefinition};
pub use guess::{ActionId, GuessAction, GuessOutcome, NON_MATCH_POINTS};
pub use person::{AffinityGroup, Person, PersonId, Preference};
pub use question::{Content, Question, QuestionLetter};
pub use round::{Round, RoundId, RoundState};
pub use round_result::RoundResult;
pub use team::{Team, TeamId};
