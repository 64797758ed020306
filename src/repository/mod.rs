mod conversion;
mod formation_repository;
mod guess_repository;
mod person_repository;
mod round_repository;
mod team_repository;

pub use formation_repository::FormationRepository;
pub use guess_repository::{GuessRepository, ReviewedAnswer};
pub use person_repository::{JoinOutcome, PersonRepository};
pub use round_repository::{RoundEvent, RoundRepository, TransitionOutcome};
pub use team_repository::{RenameOutcome, TeamRepository};
