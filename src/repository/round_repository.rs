use std::collections::BTreeMap;

use anyhow::anyhow;
use sqlx::{query, query_as, Pool, Sqlite, SqliteConnection};
use tokio::sync::broadcast::{Receiver, Sender};
use tracing::{info, warn};

use crate::{
    engine::{
        hint_schedule::HintSchedule,
        scoring::{score_round, RoundOutcome},
    },
    models::{
        types::UtcDateTime, ContestDefinition, Question, QuestionDefinition, Round, RoundId,
        RoundState, TeamId,
    },
};

use super::{
    conversion::{from_db_all, DBConvertible, SqlQuestion, SqlRound},
    guess_repository::counted_attempts,
};

#[derive(Debug)]
pub struct RoundRepository {
    pool: Pool<Sqlite>,
    events: Sender<RoundEvent>,
}

#[derive(Clone, Debug)]
pub enum RoundEvent {
    Started(Round),
    Finished { round: Round, outcome: RoundOutcome },
    Reopened(RoundId),
    ContestReset,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TransitionOutcome {
    Started,
    Finished(RoundOutcome),
    Rescored(RoundOutcome),
    Reopened,
    Rejected(TransitionRejection),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum TransitionRejection {
    #[strum(to_string = "There is no such round")]
    NoSuchRound,
    #[strum(to_string = "The round has already been started")]
    NotPending,
    #[strum(to_string = "The round is not running")]
    NotActive,
    #[strum(to_string = "The round has not been finished yet")]
    NotFinished,
    #[strum(to_string = "Another round is still running")]
    AnotherRoundActive,
}

impl RoundRepository {
    pub fn new(pool: Pool<Sqlite>) -> RoundRepository {
        RoundRepository {
            pool,
            events: tokio::sync::broadcast::channel(128).0,
        }
    }

    pub fn subscribe(&self) -> Receiver<RoundEvent> {
        self.events.subscribe()
    }

    pub async fn list_rounds(&self) -> Result<Vec<Round>, anyhow::Error> {
        let rows = query_as::<_, SqlRound>("SELECT * FROM rounds ORDER BY round_id")
            .fetch_all(&self.pool)
            .await?;

        Ok(from_db_all(&rows)?)
    }

    pub async fn get_round(&self, round_id: RoundId) -> Result<Option<Round>, anyhow::Error> {
        let row = query_as::<_, SqlRound>("SELECT * FROM rounds WHERE round_id = $1")
            .bind(round_id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Round::from_db(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn active_round(&self) -> Result<Option<Round>, anyhow::Error> {
        let row = query_as::<_, SqlRound>(
            "SELECT * FROM rounds WHERE state = 1 ORDER BY round_id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Round::from_db(&row)?)),
            None => Ok(None),
        }
    }

    /// The round whose questions are on display: the active one, otherwise the
    /// most recently finished one.
    pub async fn current_question_round(&self) -> Result<Option<Round>, anyhow::Error> {
        let row = query_as::<_, SqlRound>(
            r#"
                SELECT * FROM rounds
                WHERE state IN (1, 2)
                ORDER BY state = 1 DESC, round_id DESC
                LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Round::from_db(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn questions_for(&self, round_id: RoundId) -> Result<Vec<Question>, anyhow::Error> {
        let rows = query_as::<_, SqlQuestion>(
            "SELECT * FROM questions WHERE round_id = $1 ORDER BY letter",
        )
        .bind(round_id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(from_db_all(&rows)?)
    }

    /// `Pending -> Active`. Refused while any other round is active.
    #[tracing::instrument(skip(self))]
    pub async fn start_round(
        &self,
        round_id: RoundId,
        now: UtcDateTime,
    ) -> Result<TransitionOutcome, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let started = query_as::<_, SqlRound>(
            r#"
                UPDATE rounds
                SET state = 1, started_at = $2
                WHERE round_id = $1
                    AND state = 0
                    AND NOT EXISTS (SELECT 1 FROM rounds WHERE state = 1)
                RETURNING *
            "#,
        )
        .bind(round_id.0)
        .bind(now)
        .fetch_optional(&mut *transaction)
        .await?;

        let Some(started) = started else {
            let rejection = match current_state(&mut *transaction, round_id).await? {
                None => TransitionRejection::NoSuchRound,
                Some(0) => TransitionRejection::AnotherRoundActive,
                Some(_) => TransitionRejection::NotPending,
            };
            warn!("Refusing to start round {}: {rejection}", round_id.0);
            return Ok(TransitionOutcome::Rejected(rejection));
        };
        let round = Round::from_db(&started)?;

        transaction.commit().await?;

        info!("Round {} ({}) started", round.id.0, round.name);

        let _ = self.events.send(RoundEvent::Started(round)); // Fine if nobody is listening

        Ok(TransitionOutcome::Started)
    }

    /// `Active -> Finished`, scoring the round in the same transaction.
    #[tracing::instrument(skip(self))]
    pub async fn finish_round(&self, round_id: RoundId) -> Result<TransitionOutcome, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let finished = query_as::<_, SqlRound>(
            r#"
                UPDATE rounds
                SET state = 2
                WHERE round_id = $1 AND state = 1
                RETURNING *
            "#,
        )
        .bind(round_id.0)
        .fetch_optional(&mut *transaction)
        .await?;

        let Some(finished) = finished else {
            let rejection = match current_state(&mut *transaction, round_id).await? {
                None => TransitionRejection::NoSuchRound,
                Some(_) => TransitionRejection::NotActive,
            };
            warn!("Refusing to finish round {}: {rejection}", round_id.0);
            return Ok(TransitionOutcome::Rejected(rejection));
        };
        let round = Round::from_db(&finished)?;

        let outcome = store_round_results(&mut *transaction, &round).await?;

        transaction.commit().await?;

        info!(
            "Round {} finished, {} of {} teams ranked",
            round.id.0,
            outcome.ranked.len(),
            outcome.eligible_teams
        );

        // Fine if nobody is listening
        let _ = self.events.send(RoundEvent::Finished {
            round,
            outcome: outcome.clone(),
        });

        Ok(TransitionOutcome::Finished(outcome))
    }

    /// Recomputes the results of a finished round from the ledger.
    #[tracing::instrument(skip(self))]
    pub async fn rescore_round(&self, round_id: RoundId) -> Result<TransitionOutcome, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let row = query_as::<_, SqlRound>("SELECT * FROM rounds WHERE round_id = $1")
            .bind(round_id.0)
            .fetch_optional(&mut *transaction)
            .await?;

        let Some(row) = row else {
            return Ok(TransitionOutcome::Rejected(TransitionRejection::NoSuchRound));
        };
        let round = Round::from_db(&row)?;
        if round.state != RoundState::Finished {
            return Ok(TransitionOutcome::Rejected(TransitionRejection::NotFinished));
        }

        let outcome = store_round_results(&mut *transaction, &round).await?;

        transaction.commit().await?;

        info!("Round {} rescored", round.id.0);

        Ok(TransitionOutcome::Rescored(outcome))
    }

    /// Moderator override back to `Pending` from any state. The ledger and
    /// results of the round are kept.
    #[tracing::instrument(skip(self))]
    pub async fn reopen_round(&self, round_id: RoundId) -> Result<TransitionOutcome, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let reopened = query(
            r#"
                UPDATE rounds
                SET state = 0, started_at = NULL
                WHERE round_id = $1
            "#,
        )
        .bind(round_id.0)
        .execute(&mut *transaction)
        .await?;

        if reopened.rows_affected() == 0 {
            return Ok(TransitionOutcome::Rejected(TransitionRejection::NoSuchRound));
        }

        transaction.commit().await?;

        info!("Round {} reopened", round_id.0);

        let _ = self.events.send(RoundEvent::Reopened(round_id)); // Fine if nobody is listening

        Ok(TransitionOutcome::Reopened)
    }

    /// Replaces the sections present in `definition`. The ledger and every
    /// round result are wiped first.
    #[tracing::instrument(skip_all)]
    pub async fn import_definition(
        &self,
        definition: &ContestDefinition,
    ) -> Result<(), anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        query("DELETE FROM round_results")
            .execute(&mut *transaction)
            .await?;
        query("DELETE FROM actions")
            .execute(&mut *transaction)
            .await?;

        if let Some(teams) = &definition.teams {
            query("DELETE FROM teams WHERE NOT is_admin")
                .execute(&mut *transaction)
                .await?;

            for team in teams {
                let name = team
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Team {}", team.team_id));

                query(
                    r#"
                        INSERT INTO teams (team_id, name, is_admin, locked)
                        VALUES ($1, $2, $3, $4)
                        ON CONFLICT (team_id) DO UPDATE SET
                            name = excluded.name,
                            is_admin = excluded.is_admin,
                            locked = excluded.locked
                    "#,
                )
                .bind(team.team_id)
                .bind(name)
                .bind(team.is_admin)
                .bind(team.locked)
                .execute(&mut *transaction)
                .await?;
            }
        }

        if let Some(rounds) = &definition.rounds {
            query("DELETE FROM questions")
                .execute(&mut *transaction)
                .await?;
            query("DELETE FROM rounds")
                .execute(&mut *transaction)
                .await?;

            for round in rounds {
                let name = round
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Round {}", round.round));

                query(
                    r#"
                        INSERT INTO rounds (round_id, name, base_value, length_seconds, state, started_at)
                        VALUES ($1, $2, $3, $4, 0, NULL)
                    "#,
                )
                .bind(round.round)
                .bind(name)
                .bind(round.value)
                .bind(round.length)
                .execute(&mut *transaction)
                .await?;
            }
        }

        if let Some(questions) = &definition.questions {
            let mut by_round: BTreeMap<i64, Vec<&QuestionDefinition>> = BTreeMap::new();
            for question in questions {
                by_round.entry(question.round).or_default().push(question);
            }

            for (round_id, questions) in by_round {
                query("DELETE FROM questions WHERE round_id = $1")
                    .bind(round_id)
                    .execute(&mut *transaction)
                    .await?;

                for question in questions {
                    let letter = question.parsed_letter()?;

                    query(
                        r#"
                            INSERT INTO questions (round_id, letter, prompt, hint1, hint2, answer_pattern)
                            VALUES ($1, $2, $3, $4, $5, $6)
                        "#,
                    )
                    .bind(round_id)
                    .bind(letter.to_db()?)
                    .bind(&question.question)
                    .bind(&question.hint1)
                    .bind(&question.hint2)
                    .bind(&question.answer)
                    .execute(&mut *transaction)
                    .await?;
                }
            }
        }

        transaction.commit().await?;

        info!("Contest definition imported");

        Ok(())
    }

    /// Clears the ledger and every round result and returns all rounds to
    /// `Pending`.
    #[tracing::instrument(skip(self))]
    pub async fn reset_contest(&self) -> Result<(), anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        query("DELETE FROM round_results")
            .execute(&mut *transaction)
            .await?;
        query("DELETE FROM actions")
            .execute(&mut *transaction)
            .await?;
        query("UPDATE rounds SET state = 0, started_at = NULL")
            .execute(&mut *transaction)
            .await?;
        query("UPDATE teams SET last_seen = NULL")
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;

        info!("Contest reset");

        let _ = self.events.send(RoundEvent::ContestReset); // Fine if nobody is listening

        Ok(())
    }
}

async fn current_state(
    connection: &mut SqliteConnection,
    round_id: RoundId,
) -> Result<Option<i64>, anyhow::Error> {
    let state: Option<(i64,)> = query_as("SELECT state FROM rounds WHERE round_id = $1")
        .bind(round_id.0)
        .fetch_optional(&mut *connection)
        .await?;

    Ok(state.map(|(state,)| state))
}

/// Scores `round` from the ledger and overwrites its stored results.
async fn store_round_results(
    connection: &mut SqliteConnection,
    round: &Round,
) -> Result<RoundOutcome, anyhow::Error> {
    let schedule = HintSchedule::for_round(round)
        .ok_or_else(|| anyhow!("Round {} has no start time", round.id.0))?;

    let eligible: Vec<TeamId> =
        query_as::<_, (i64,)>("SELECT team_id FROM teams WHERE NOT is_admin ORDER BY team_id")
            .fetch_all(&mut *connection)
            .await?
            .into_iter()
            .map(|(team_id,)| TeamId(team_id))
            .collect();

    let attempts = counted_attempts(&mut *connection, round.id).await?;
    let outcome = score_round(round.id, round.base_value, &schedule, &eligible, &attempts);

    query("DELETE FROM round_results WHERE round_id = $1")
        .bind(round.id.0)
        .execute(&mut *connection)
        .await?;

    for result in outcome.results() {
        let result = result.to_db()?;

        query(
            r#"
                INSERT INTO round_results (team_id, round_id, contribution, display_score)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (team_id, round_id) DO UPDATE SET
                    contribution = excluded.contribution,
                    display_score = excluded.display_score
            "#,
        )
        .bind(result.team_id)
        .bind(result.round_id)
        .bind(result.contribution)
        .bind(result.display_score)
        .execute(&mut *connection)
        .await?;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use sqlx::{query, query_as, Pool, Sqlite};
    use time::Duration;

    use crate::{
        models::{ContestDefinition, GuessOutcome, RoundId, RoundState, TeamId},
        repository::{
            test_support::{insert_question, insert_round, insert_team, memory_pool, t0},
            GuessRepository,
        },
    };

    use super::{RoundEvent, RoundRepository, TransitionOutcome, TransitionRejection};

    async fn contest() -> (Pool<Sqlite>, RoundRepository) {
        let pool = memory_pool().await;
        for (id, name) in [(1, "A"), (2, "B"), (3, "C"), (4, "D")] {
            insert_team(&pool, id, name, false).await;
        }
        insert_team(&pool, 9, "Hosts", true).await;
        insert_round(&pool, 1, 1, 60).await;
        insert_round(&pool, 3, 4, 60).await;
        insert_question(&pool, 3, "A", "everest").await;
        insert_question(&pool, 3, "B", "paris").await;
        (pool.clone(), RoundRepository::new(pool))
    }

    async fn results(pool: &Pool<Sqlite>, round_id: i64) -> Vec<(i64, i64, f64)> {
        query_as(
            r#"
                SELECT team_id, contribution, display_score FROM round_results
                WHERE round_id = $1
                ORDER BY team_id
            "#,
        )
        .bind(round_id)
        .fetch_all(pool)
        .await
        .unwrap()
    }

    #[test_log::test(tokio::test)]
    async fn lifecycle() {
        let (_pool, repository) = contest().await;

        assert_eq!(
            repository.start_round(RoundId(3), t0()).await.unwrap(),
            TransitionOutcome::Started
        );
        let active = repository.active_round().await.unwrap().unwrap();
        assert_eq!(active.id, RoundId(3));
        assert_eq!(active.started_at, Some(t0()));

        assert!(matches!(
            repository.finish_round(RoundId(3)).await.unwrap(),
            TransitionOutcome::Finished(_)
        ));
        let finished = repository.get_round(RoundId(3)).await.unwrap().unwrap();
        assert_eq!(finished.state, RoundState::Finished);
        assert_eq!(finished.started_at, Some(t0()));
        assert!(repository.active_round().await.unwrap().is_none());
        assert_eq!(
            repository.current_question_round().await.unwrap().map(|r| r.id),
            Some(RoundId(3))
        );

        assert_eq!(
            repository.reopen_round(RoundId(3)).await.unwrap(),
            TransitionOutcome::Reopened
        );
        let reopened = repository.get_round(RoundId(3)).await.unwrap().unwrap();
        assert_eq!(reopened.state, RoundState::Pending);
        assert_eq!(reopened.started_at, None);
    }

    #[test_log::test(tokio::test)]
    async fn rejected_transitions() {
        let (_pool, repository) = contest().await;

        assert_eq!(
            repository.finish_round(RoundId(3)).await.unwrap(),
            TransitionOutcome::Rejected(TransitionRejection::NotActive)
        );
        assert_eq!(
            repository.start_round(RoundId(42), t0()).await.unwrap(),
            TransitionOutcome::Rejected(TransitionRejection::NoSuchRound)
        );
        assert_eq!(
            repository.reopen_round(RoundId(42)).await.unwrap(),
            TransitionOutcome::Rejected(TransitionRejection::NoSuchRound)
        );

        repository.start_round(RoundId(3), t0()).await.unwrap();
        assert_eq!(
            repository.start_round(RoundId(3), t0()).await.unwrap(),
            TransitionOutcome::Rejected(TransitionRejection::NotPending)
        );
        assert_eq!(
            repository.rescore_round(RoundId(3)).await.unwrap(),
            TransitionOutcome::Rejected(TransitionRejection::NotFinished)
        );

        repository.finish_round(RoundId(3)).await.unwrap();
        assert_eq!(
            repository.finish_round(RoundId(3)).await.unwrap(),
            TransitionOutcome::Rejected(TransitionRejection::NotActive)
        );
    }

    #[test_log::test(tokio::test)]
    async fn only_one_round_runs_at_a_time() {
        let (_pool, repository) = contest().await;

        repository.start_round(RoundId(1), t0()).await.unwrap();
        assert_eq!(
            repository.start_round(RoundId(3), t0()).await.unwrap(),
            TransitionOutcome::Rejected(TransitionRejection::AnotherRoundActive)
        );
        let round = repository.get_round(RoundId(3)).await.unwrap().unwrap();
        assert_eq!(round.state, RoundState::Pending);
    }

    #[test_log::test(tokio::test)]
    async fn finishing_scores_the_round() {
        let (pool, repository) = contest().await;
        let guesses = GuessRepository::new(pool.clone());

        repository.start_round(RoundId(3), t0()).await.unwrap();
        for (team, second, answer) in [(1, 30, "Paris"), (3, 90, "paris"), (2, 40, "Lyon"), (9, 1, "Paris")] {
            let outcome = guesses
                .submit_guess(TeamId(team), "B", answer, t0() + Duration::seconds(second))
                .await
                .unwrap();
            assert_eq!(outcome, GuessOutcome::Submitted);
        }

        let TransitionOutcome::Finished(outcome) = repository.finish_round(RoundId(3)).await.unwrap()
        else {
            panic!("round did not finish");
        };

        assert_eq!(outcome.eligible_teams, 4);
        assert_eq!(outcome.cutoff, 2);
        assert_eq!(
            results(&pool, 3).await,
            vec![(1, 401, 403.0), (3, 400, 202.0)]
        );
    }

    #[test_log::test(tokio::test)]
    async fn failed_scoring_keeps_round_running() {
        let (pool, repository) = contest().await;
        let guesses = GuessRepository::new(pool.clone());

        repository.start_round(RoundId(3), t0()).await.unwrap();
        guesses
            .submit_guess(TeamId(1), "A", "everest", t0() + Duration::seconds(5))
            .await
            .unwrap();
        query(
            r#"
                CREATE TRIGGER no_results BEFORE INSERT ON round_results
                BEGIN SELECT RAISE(ABORT, 'results are blocked'); END
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        assert!(repository.finish_round(RoundId(3)).await.is_err());

        let round = repository.get_round(RoundId(3)).await.unwrap().unwrap();
        assert_eq!(round.state, RoundState::Active);
        assert_eq!(round.started_at, Some(t0()));
        assert!(results(&pool, 3).await.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn rescoring_overwrites() {
        let (pool, repository) = contest().await;
        let guesses = GuessRepository::new(pool.clone());

        repository.start_round(RoundId(3), t0()).await.unwrap();
        guesses
            .submit_guess(TeamId(2), "A", "Mount Everest", t0() + Duration::seconds(5))
            .await
            .unwrap();
        repository.finish_round(RoundId(3)).await.unwrap();
        let first = results(&pool, 3).await;

        // A stale row that a rescore must not keep.
        query("INSERT INTO round_results (team_id, round_id, contribution, display_score) VALUES (4, 3, 999, 1.0)")
            .execute(&pool)
            .await
            .unwrap();

        assert!(matches!(
            repository.rescore_round(RoundId(3)).await.unwrap(),
            TransitionOutcome::Rescored(_)
        ));
        assert_eq!(results(&pool, 3).await, first);
        assert_eq!(first, vec![(2, 401, 403.0)]);
    }

    #[test_log::test(tokio::test)]
    async fn reset_returns_to_pending() {
        let (pool, repository) = contest().await;
        let guesses = GuessRepository::new(pool.clone());

        repository.start_round(RoundId(3), t0()).await.unwrap();
        guesses
            .submit_guess(TeamId(1), "A", "everest", t0())
            .await
            .unwrap();
        repository.finish_round(RoundId(3)).await.unwrap();
        repository.start_round(RoundId(1), t0()).await.unwrap();

        repository.reset_contest().await.unwrap();

        assert!(repository
            .list_rounds()
            .await
            .unwrap()
            .iter()
            .all(|round| round.state == RoundState::Pending && round.started_at.is_none()));
        assert!(results(&pool, 3).await.is_empty());
        assert!(guesses.team_history(TeamId(1)).await.unwrap().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn events_follow_transitions() {
        let (_pool, repository) = contest().await;
        let mut events = repository.subscribe();

        repository.start_round(RoundId(3), t0()).await.unwrap();
        repository.start_round(RoundId(1), t0()).await.unwrap();
        repository.finish_round(RoundId(3)).await.unwrap();

        assert!(matches!(events.recv().await.unwrap(), RoundEvent::Started(round) if round.id == RoundId(3)));
        assert!(matches!(events.recv().await.unwrap(), RoundEvent::Finished { round, .. } if round.id == RoundId(3)));
        assert!(events.try_recv().is_err());
    }

    #[test_log::test(tokio::test)]
    async fn definition_replaces_contest() {
        let (pool, repository) = contest().await;
        let guesses = GuessRepository::new(pool.clone());

        repository.start_round(RoundId(3), t0()).await.unwrap();
        guesses
            .submit_guess(TeamId(1), "A", "everest", t0())
            .await
            .unwrap();

        let definition = ContestDefinition::parse(
            br#"{
                "teams": [{ "team_id": 5, "name": "Newcomers" }, { "team_id": 6 }],
                "rounds": [{ "round": 7, "name": "Flags", "length": 45, "value": 2 }],
                "questions": [
                    { "round": 7, "letter": "c", "question": "file://flags/c.png", "answer": "chile" },
                    { "round": 7, "letter": "D", "question": "Red and white cross?", "hint1": "Alps", "answer": "switzerland" }
                ]
            }"#,
        )
        .unwrap();
        repository.import_definition(&definition).await.unwrap();

        let rounds = repository.list_rounds().await.unwrap();
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].name, "Flags");
        assert_eq!(rounds[0].length, Duration::seconds(45));

        let questions = repository.questions_for(RoundId(7)).await.unwrap();
        assert_eq!(questions.len(), 2);
        assert!(questions[0].prompt.is_image());
        assert_eq!(questions[1].letter.as_char(), 'D');

        let teams: Vec<(i64, String)> = query_as("SELECT team_id, name FROM teams ORDER BY team_id")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(
            teams,
            vec![
                (5, "Newcomers".to_string()),
                (6, "Team 6".to_string()),
                (9, "Hosts".to_string())
            ]
        );
        assert!(guesses.team_history(TeamId(1)).await.unwrap().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn failed_definition_changes_nothing() {
        let (_pool, repository) = contest().await;

        // The question points at a round that does not exist.
        let definition = ContestDefinition::parse(
            br#"{
                "rounds": [{ "round": 7, "length": 45, "value": 2 }],
                "questions": [{ "round": 8, "letter": "A", "question": "?", "answer": "x" }]
            }"#,
        )
        .unwrap();

        assert!(repository.import_definition(&definition).await.is_err());
        assert_eq!(repository.list_rounds().await.unwrap().len(), 2);
    }
}
