use time::Duration;

use crate::models::{types::UtcDateTime, Question, Round, RoundState, NON_MATCH_POINTS};

/// How many hints of a question are visible at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Disclosure {
    NoHints,
    FirstHint,
    BothHints,
}

impl Disclosure {
    pub fn shows_first_hint(&self) -> bool {
        *self >= Disclosure::FirstHint
    }

    pub fn shows_second_hint(&self) -> bool {
        *self == Disclosure::BothHints
    }

    /// What may be shown of a round's questions at `now`. A finished round
    /// shows everything; a round that never started shows nothing.
    pub fn for_round(round: &Round, now: UtcDateTime) -> Option<Disclosure> {
        match round.state {
            RoundState::Pending => None,
            RoundState::Finished => Some(Disclosure::BothHints),
            RoundState::Active => HintSchedule::for_round(round).map(|s| s.disclosure(now)),
        }
    }

    /// A copy of `question` without the hints that are not due yet. Picture
    /// questions keep their hints for hosts only.
    pub fn filter(&self, question: &Question, for_host: bool) -> Question {
        let hints_allowed = for_host || !question.is_picture();

        Question {
            hint1: question
                .hint1
                .clone()
                .filter(|_| hints_allowed && self.shows_first_hint()),
            hint2: question
                .hint2
                .clone()
                .filter(|_| hints_allowed && self.shows_second_hint()),
            ..question.clone()
        }
    }
}

/// The wall-clock schedule of a started round.
///
/// With start `t0` and length `L`, the first hint appears after `t0 + L`, the
/// second after `t0 + 1.5L`, and the countdown runs out at `t0 + 2L`. Nothing
/// about disclosure is stored; every reader derives it from "now".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HintSchedule {
    started_at: UtcDateTime,
    length: Duration,
}

impl HintSchedule {
    pub fn new(started_at: UtcDateTime, length: Duration) -> HintSchedule {
        HintSchedule { started_at, length }
    }

    /// `None` for a round that has not been started.
    pub fn for_round(round: &Round) -> Option<HintSchedule> {
        round
            .started_at
            .map(|started_at| HintSchedule::new(started_at, round.length))
    }

    pub fn first_hint_at(&self) -> UtcDateTime {
        self.started_at + self.length
    }

    pub fn second_hint_at(&self) -> UtcDateTime {
        self.started_at + self.length + self.length / 2
    }

    pub fn exhausted_at(&self) -> UtcDateTime {
        self.started_at + self.length * 2
    }

    pub fn disclosure(&self, now: UtcDateTime) -> Disclosure {
        if now > self.second_hint_at() {
            Disclosure::BothHints
        } else if now > self.first_hint_at() {
            Disclosure::FirstHint
        } else {
            Disclosure::NoHints
        }
    }

    /// Starts at 1 and halves once per passed hint threshold.
    pub fn decay_multiplier(&self, now: UtcDateTime) -> f64 {
        let mut multiplier = 1.0;
        if now > self.first_hint_at() {
            multiplier *= 0.5;
        }
        if now > self.second_hint_at() {
            multiplier *= 0.5;
        }
        multiplier
    }

    /// What a submission at `now` is worth in a round of value `base_value`.
    pub fn award(&self, base_value: i64, matched: bool, now: UtcDateTime) -> f64 {
        if matched {
            base_value as f64 * self.decay_multiplier(now)
        } else {
            NON_MATCH_POINTS
        }
    }

    pub fn next_reveal(&self, now: UtcDateTime) -> Option<UtcDateTime> {
        [self.first_hint_at(), self.second_hint_at()]
            .into_iter()
            .find(|&at| at >= now)
    }

    /// Time left on the countdown, never negative.
    pub fn remaining(&self, now: UtcDateTime) -> Duration {
        Duration::max(Duration::ZERO, self.exhausted_at() - now)
    }

    pub fn elapsed_seconds(&self, at: UtcDateTime) -> f64 {
        (at - self.started_at).as_seconds_f64()
    }
}
