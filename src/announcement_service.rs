use std::{collections::HashMap, sync::Arc};

use indoc::formatdoc;
use serenity::{all::ChannelId, http::Http};
use time::Duration;
use tokio::{select, sync::broadcast::error::RecvError, sync::Notify};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::{
    engine::{hint_schedule::HintSchedule, scoring::RoundOutcome},
    models::{types::UtcDateTime, Round, TeamId},
    repository::{RoundEvent, RoundRepository, TeamRepository},
    utils::{
        formatting::{fit_message, format_ranking},
        timestamp, TimestampStyle,
    },
};

/// Posts round starts, hint reveals and final rankings to one channel.
/// Nothing here can affect a round transition: failures are only logged.
pub struct AnnouncementService {
    http: Arc<Http>,
    channel: ChannelId,
    round_repository: Arc<RoundRepository>,
    team_repository: Arc<TeamRepository>,
}

/// How long to wait when no hint reveal is coming up.
const IDLE_SLEEP: Duration = Duration::hours(1);

impl AnnouncementService {
    pub fn create_and_start(
        shutdown: Arc<Notify>,
        http: Arc<Http>,
        channel: ChannelId,
        round_repository: Arc<RoundRepository>,
        team_repository: Arc<TeamRepository>,
    ) {
        let service = AnnouncementService {
            http,
            channel,
            round_repository,
            team_repository,
        };

        tokio::spawn(service.run(shutdown).instrument(info_span!("announcements")));
    }

    async fn run(self, shutdown: Arc<Notify>) {
        let mut events = self.round_repository.subscribe();
        let mut upcoming = self.reschedule(UtcDateTime::now()).await;

        loop {
            let wait = match &upcoming {
                Some((_, at)) => Duration::max(Duration::ZERO, *at - UtcDateTime::now()),
                None => IDLE_SLEEP,
            };
            debug!("Next announcement check in {wait}");

            select! {
                _ = tokio::time::sleep(wait.unsigned_abs()) => {
                    let after = match upcoming.take() {
                        Some((round, at)) => {
                            self.announce_hint(&round, at).await;
                            at
                        }
                        None => UtcDateTime::now(),
                    };
                    upcoming = self.reschedule(after).await;
                }

                event = events.recv() => {
                    match event {
                        Ok(event) => self.announce_event(event).await,
                        Err(RecvError::Lagged(missed)) => {
                            warn!("Missed {missed} round events");
                        }
                        Err(RecvError::Closed) => break,
                    }
                    upcoming = self.reschedule(UtcDateTime::now()).await;
                }

                _ = shutdown.notified() => {
                    info!("Announcements stopped");
                    break;
                }
            }
        }
    }

    /// The next hint reveal of the running round strictly after `after`.
    async fn reschedule(&self, after: UtcDateTime) -> Option<(Round, UtcDateTime)> {
        let round = match self.round_repository.active_round().await {
            Ok(round) => round?,
            Err(err) => {
                error!("Could not look up the running round: {err}");
                return None;
            }
        };

        let schedule = HintSchedule::for_round(&round)?;
        [schedule.first_hint_at(), schedule.second_hint_at()]
            .into_iter()
            .find(|&at| at > after)
            .map(|at| (round, at))
    }

    async fn announce_hint(&self, round: &Round, at: UtcDateTime) {
        // The round may have been finished or reopened while we slept.
        match self.round_repository.active_round().await {
            Ok(Some(active)) if active.id == round.id && active.started_at == round.started_at => {
                self.post(hint_message(round, at)).await;
            }
            Ok(_) => debug!("Round {} is no longer running, hint not announced", round.id.0),
            Err(err) => error!("Could not look up the running round: {err}"),
        }
    }

    async fn announce_event(&self, event: RoundEvent) {
        match event {
            RoundEvent::Started(round) => self.post(start_message(&round)).await,

            RoundEvent::Finished { round, outcome } => {
                let team_names = match self.team_repository.all_teams().await {
                    Ok(teams) => teams.into_iter().map(|team| (team.id, team.name)).collect(),
                    Err(err) => {
                        warn!("Could not load team names for the ranking: {err}");
                        HashMap::new()
                    }
                };
                self.post(finish_message(&round, &outcome, &team_names)).await;
            }

            RoundEvent::Reopened(round_id) => debug!("Round {} reopened", round_id.0),
            RoundEvent::ContestReset => debug!("Contest reset"),
        }
    }

    async fn post(&self, message: String) {
        if let Err(err) = self.channel.say(&self.http, fit_message(&message)).await {
            error!("Could not post an announcement to {}: {err}", self.channel);
        }
    }
}

fn start_message(round: &Round) -> String {
    let Some(schedule) = HintSchedule::for_round(round) else {
        return format!("# {} starts now!", round.name);
    };

    formatdoc! {
        r#"
            # {name} starts now!

            Questions are worth {value} each. Answer with `/guess`, see the questions with `/status`.

            First hint {first}, second hint {second}. Time runs out {end}.
        "#,
        name = round.name,
        value = round.base_value,
        first = timestamp(schedule.first_hint_at(), TimestampStyle::Relative),
        second = timestamp(schedule.second_hint_at(), TimestampStyle::Relative),
        end = timestamp(schedule.exhausted_at(), TimestampStyle::Relative),
    }
}

fn hint_message(round: &Round, at: UtcDateTime) -> String {
    let which = match HintSchedule::for_round(round) {
        Some(schedule) if schedule.first_hint_at() == at => "first",
        _ => "second",
    };

    format!(
        "**The {which} hint of {} is out** ({}). Correct answers are now worth less. Check `/status`.",
        round.name,
        timestamp(at, TimestampStyle::LongTime)
    )
}

fn finish_message(
    round: &Round,
    outcome: &RoundOutcome,
    team_names: &HashMap<TeamId, String>,
) -> String {
    format!(
        "# {} is over!\n{}\nReview your answers with `/answers`.",
        round.name,
        format_ranking(outcome, team_names, false)
    )
}

#[cfg(test)]
mod tests {
    use map_macro::hash_map;
    use time::{macros::datetime, Duration};

    use crate::{
        engine::scoring::{RankedTeam, RoundOutcome},
        models::{types::UtcDateTime, Round, RoundId, RoundState, TeamId},
    };

    use super::{finish_message, hint_message, start_message};

    fn round() -> Round {
        Round {
            id: RoundId(3),
            name: "Capitals".to_string(),
            base_value: 4,
            length: Duration::seconds(60),
            state: RoundState::Active,
            started_at: Some(UtcDateTime::assume_utc(datetime!(2024-03-01 20:00:00))),
        }
    }

    #[test]
    fn start_lists_reveals() {
        let message = start_message(&round());

        assert!(message.starts_with("# Capitals starts now!\n"));
        assert!(message.contains("worth 4 each"));
        assert!(message.contains(
            "First hint <t:1709323260:R>, second hint <t:1709323290:R>. Time runs out <t:1709323320:R>."
        ));
    }

    #[test]
    fn hint_names_the_reveal() {
        let round = round();
        let first = round.started_at.unwrap() + Duration::seconds(60);
        let second = round.started_at.unwrap() + Duration::seconds(90);

        assert!(hint_message(&round, first).starts_with("**The first hint of Capitals"));
        assert!(hint_message(&round, second).starts_with("**The second hint of Capitals"));
    }

    #[test]
    fn finish_hides_scores() {
        let outcome = RoundOutcome {
            round_id: RoundId(3),
            eligible_teams: 4,
            cutoff: 2,
            ranked: vec![RankedTeam {
                team_id: TeamId(1),
                score: 4.0,
                tiebreak: 30.0,
                rank: 1,
                contribution: 401,
                display_score: 403.0,
            }],
        };
        let names = hash_map! { TeamId(1) => "Alpha".to_string() };

        let message = finish_message(&round(), &outcome, &names);

        assert_eq!(
            message,
            "# Capitals is over!\n1. Alpha\n\nReview your answers with `/answers`."
        );
    }
}
