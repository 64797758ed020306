use sqlx::{query, query_as, FromRow, Pool, Sqlite, SqliteConnection};
use tracing::{debug, warn};

use crate::{
    engine::{
        answer_matcher::{sanitize_submission, AnswerPattern},
        hint_schedule::HintSchedule,
        scoring::CountedAttempt,
    },
    models::{
        types::UtcDateTime, GuessAction, GuessOutcome, QuestionLetter, Round, RoundId, TeamId,
    },
};

use super::conversion::{
    from_db_all, DBConvertible, DBFromConversionError, DBToConversionError, SqlGuessAction,
    SqlRound,
};

pub struct GuessRepository {
    pool: Pool<Sqlite>,
}

/// One ledger row of the active round, as shown to administrators.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressEntry {
    pub team_name: String,
    pub letter: QuestionLetter,
    pub answered: String,
    pub points: f64,
    pub submitted_at: UtcDateTime,
}

/// The attempt that counted for a team and letter in a finished round.
#[derive(Clone, Debug, PartialEq)]
pub struct ReviewedAnswer {
    pub team_id: TeamId,
    pub team_name: String,
    pub letter: QuestionLetter,
    pub answered: String,
    pub points: f64,
}

impl GuessRepository {
    pub fn new(pool: Pool<Sqlite>) -> GuessRepository {
        GuessRepository { pool }
    }

    /// Appends one attempt to the ledger. The returned outcome never carries
    /// the awarded points.
    #[tracing::instrument(skip(self, answer))]
    pub async fn submit_guess(
        &self,
        team_id: TeamId,
        letter: &str,
        answer: &str,
        now: UtcDateTime,
    ) -> Result<GuessOutcome, anyhow::Error> {
        let Some(letter) = QuestionLetter::parse(letter) else {
            return Ok(GuessOutcome::NoLetter);
        };

        let mut transaction = self.pool.begin().await?;

        let active = query_as::<_, SqlRound>(
            r#"
                SELECT * FROM rounds
                WHERE state = 1
                ORDER BY round_id
                LIMIT 1
            "#,
        )
        .fetch_optional(&mut *transaction)
        .await?;

        let Some(round) = active else {
            return Ok(GuessOutcome::NoActiveRound);
        };
        let round = Round::from_db(&round)?;

        let answer_pattern: Option<(String,)> = query_as(
            r#"SELECT answer_pattern FROM questions WHERE round_id = $1 AND letter = $2"#,
        )
        .bind(round.id.0)
        .bind(letter.to_db()?)
        .fetch_optional(&mut *transaction)
        .await?;

        let (Some((answer_pattern,)), Some(schedule)) =
            (answer_pattern, HintSchedule::for_round(&round))
        else {
            return Ok(GuessOutcome::NoActiveRound);
        };

        // Judge the wording as it lands in the ledger.
        let stored = sanitize_submission(answer);
        let matched = match AnswerPattern::compile(&answer_pattern) {
            Ok(pattern) => pattern.matches(&stored),
            Err(err) => {
                warn!(
                    "Answer pattern of question {letter} in round {} does not compile, counting as a miss: {err}",
                    round.id.0
                );
                false
            }
        };
        let points = schedule.award(round.base_value, matched, now);

        query(
            r#"
                INSERT INTO actions (team_id, round_id, letter, submitted_at, answered, points)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(team_id.0)
        .bind(round.id.0)
        .bind(letter.to_db()?)
        .bind(now)
        .bind(&stored)
        .bind(points)
        .execute(&mut *transaction)
        .await?;

        transaction.commit().await?;

        debug!("Recorded guess for {letter} in round {}", round.id.0);

        Ok(GuessOutcome::Submitted)
    }

    /// Every attempt of the team, oldest first.
    pub async fn team_history(&self, team_id: TeamId) -> Result<Vec<GuessAction>, anyhow::Error> {
        let rows = query_as::<_, SqlGuessAction>(
            r#"
                SELECT * FROM actions
                WHERE team_id = $1
                ORDER BY submitted_at, action_id
            "#,
        )
        .bind(team_id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(from_db_all(&rows)?)
    }

    pub async fn round_progress(&self) -> Result<Vec<ProgressEntry>, anyhow::Error> {
        let rows = query_as::<_, SqlProgressEntry>(
            r#"
                SELECT teams.name AS team_name, actions.letter, actions.answered, actions.points, actions.submitted_at
                FROM actions
                JOIN rounds USING (round_id)
                JOIN teams USING (team_id)
                WHERE rounds.state = 1
                ORDER BY actions.submitted_at, actions.action_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(from_db_all(&rows)?)
    }

    /// Counted attempts of the most recently finished round, if no round is
    /// running. `team` narrows the review down to one team.
    pub async fn reviewed_answers(
        &self,
        team: Option<TeamId>,
    ) -> Result<Option<(Round, Vec<ReviewedAnswer>)>, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let active: Option<(i64,)> = query_as("SELECT round_id FROM rounds WHERE state = 1 LIMIT 1")
            .fetch_optional(&mut *transaction)
            .await?;
        if active.is_some() {
            return Ok(None);
        }

        let finished = query_as::<_, SqlRound>(
            r#"
                SELECT * FROM rounds
                WHERE state = 2
                ORDER BY round_id DESC
                LIMIT 1
            "#,
        )
        .fetch_optional(&mut *transaction)
        .await?;

        let Some(round) = finished else {
            return Ok(None);
        };
        let round = Round::from_db(&round)?;

        let answers = counted_rows(&mut *transaction, round.id)
            .await?
            .into_iter()
            .filter(|row| team.map_or(true, |team| team.0 == row.team_id))
            .map(|row| -> Result<ReviewedAnswer, DBFromConversionError> {
                Ok(ReviewedAnswer {
                    team_id: TeamId(row.team_id),
                    team_name: row.team_name,
                    letter: QuestionLetter::from_db(&row.letter)?,
                    answered: row.answered,
                    points: row.points,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        transaction.commit().await?;

        Ok(Some((round, answers)))
    }
}

/// The ledger of `round_id` reduced to the attempt that counts for each
/// (team, letter) of a non-administrator team: repeated wordings collapse to
/// their first submission, then the latest remaining wording wins.
pub(super) async fn counted_attempts(
    connection: &mut SqliteConnection,
    round_id: RoundId,
) -> Result<Vec<CountedAttempt>, anyhow::Error> {
    let attempts = counted_rows(connection, round_id)
        .await?
        .iter()
        .map(SqlCountedAttempt::to_attempt)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(attempts)
}

async fn counted_rows(
    connection: &mut SqliteConnection,
    round_id: RoundId,
) -> Result<Vec<SqlCountedAttempt>, anyhow::Error> {
    let rows = query_as::<_, SqlCountedAttempt>(
        r#"
            WITH first_wordings AS (
                SELECT
                    actions.action_id,
                    actions.team_id,
                    teams.name AS team_name,
                    actions.letter,
                    actions.submitted_at,
                    actions.answered,
                    actions.points,
                    ROW_NUMBER() OVER (
                        PARTITION BY actions.team_id, actions.letter, actions.answered
                        ORDER BY actions.submitted_at, actions.action_id
                    ) AS nth_try
                FROM actions
                JOIN teams USING (team_id)
                WHERE actions.round_id = $1 AND NOT teams.is_admin
            ),
            latest_wordings AS (
                SELECT
                    *,
                    ROW_NUMBER() OVER (
                        PARTITION BY team_id, letter
                        ORDER BY submitted_at DESC, action_id DESC
                    ) AS recency
                FROM first_wordings
                WHERE nth_try = 1
            )
            SELECT team_id, team_name, letter, submitted_at, answered, points
            FROM latest_wordings
            WHERE recency = 1
            ORDER BY team_id, letter
        "#,
    )
    .bind(round_id.0)
    .fetch_all(&mut *connection)
    .await?;

    Ok(rows)
}

#[derive(Debug, FromRow)]
pub struct SqlCountedAttempt {
    team_id: i64,
    team_name: String,
    letter: String,
    submitted_at: UtcDateTime,
    answered: String,
    points: f64,
}

impl SqlCountedAttempt {
    fn to_attempt(&self) -> Result<CountedAttempt, DBFromConversionError> {
        Ok(CountedAttempt {
            team_id: TeamId(self.team_id),
            letter: QuestionLetter::from_db(&self.letter)?,
            submitted_at: self.submitted_at,
            points: self.points,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SqlProgressEntry {
    team_name: String,
    letter: String,
    answered: String,
    points: f64,
    submitted_at: UtcDateTime,
}

impl DBConvertible for ProgressEntry {
    type DBType = SqlProgressEntry;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(SqlProgressEntry {
            team_name: self.team_name.clone(),
            letter: self.letter.to_db()?,
            answered: self.answered.clone(),
            points: self.points,
            submitted_at: self.submitted_at,
        })
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(ProgressEntry {
            team_name: value.team_name.clone(),
            letter: QuestionLetter::from_db(&value.letter)?,
            answered: value.answered.clone(),
            points: value.points,
            submitted_at: value.submitted_at,
        })
    }
}
