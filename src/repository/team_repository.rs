use sqlx::{query, query_as, Pool, Sqlite};
use tracing::info;

use crate::{
    engine::{
        answer_matcher::{sanitize, TEAM_NAME_MAX_CHARS},
        leaderboard::Leaderboard,
    },
    models::{types::UtcDateTime, Round, RoundResult, Team, TeamId},
};

use super::conversion::{from_db_all, DBConvertible, SqlRound, SqlRoundResult, SqlTeam};

pub struct TeamRepository {
    pool: Pool<Sqlite>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed(String),
    /// A round has started, the team is name-locked or nothing usable was left
    /// of the requested name.
    Refused,
}

impl TeamRepository {
    pub fn new(pool: Pool<Sqlite>) -> TeamRepository {
        TeamRepository { pool }
    }

    /// Resolves the caller credential: the Discord user id stored as a
    /// person's login, through that person's team.
    pub async fn find_for_login(&self, login: &str) -> Result<Option<Team>, anyhow::Error> {
        let row = query_as::<_, SqlTeam>(
            r#"
                SELECT teams.* FROM teams
                JOIN people USING (team_id)
                WHERE people.login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Team::from_db(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_team(&self, team_id: TeamId) -> Result<Option<Team>, anyhow::Error> {
        let row = query_as::<_, SqlTeam>("SELECT * FROM teams WHERE team_id = $1")
            .bind(team_id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Team::from_db(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn all_teams(&self) -> Result<Vec<Team>, anyhow::Error> {
        let rows = query_as::<_, SqlTeam>("SELECT * FROM teams ORDER BY team_id")
            .fetch_all(&self.pool)
            .await?;

        Ok(from_db_all(&rows)?)
    }

    /// Stamps the first time the team checks in after a reset.
    pub async fn touch_last_seen(&self, team_id: TeamId, now: UtcDateTime) -> Result<(), anyhow::Error> {
        query("UPDATE teams SET last_seen = $2 WHERE team_id = $1 AND last_seen IS NULL")
            .bind(team_id.0)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Renames the team while no round has been started and the team is not
    /// name-locked. A name taken by another team gets a numeric suffix.
    #[tracing::instrument(skip(self))]
    pub async fn rename(&self, team_id: TeamId, requested: &str) -> Result<RenameOutcome, anyhow::Error> {
        let name = sanitize(requested, TEAM_NAME_MAX_CHARS);
        if name.is_empty() {
            return Ok(RenameOutcome::Refused);
        }

        let mut transaction = self.pool.begin().await?;

        let (contest_started,): (bool,) =
            query_as("SELECT EXISTS (SELECT 1 FROM rounds WHERE state <> 0)")
                .fetch_one(&mut *transaction)
                .await?;

        let locked: Option<(bool,)> = query_as("SELECT locked FROM teams WHERE team_id = $1")
            .bind(team_id.0)
            .fetch_optional(&mut *transaction)
            .await?;

        if contest_started || locked != Some((false,)) {
            return Ok(RenameOutcome::Refused);
        }

        let taken: Vec<(String,)> = query_as("SELECT name FROM teams WHERE team_id <> $1")
            .bind(team_id.0)
            .fetch_all(&mut *transaction)
            .await?;
        let taken: Vec<String> = taken.into_iter().map(|(name,)| name).collect();

        let unique_name = (1..)
            .map(|n| match n {
                1 => name.clone(),
                n => format!("{name} {n}"),
            })
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or_else(|| name.clone());

        query("UPDATE teams SET name = $2 WHERE team_id = $1")
            .bind(team_id.0)
            .bind(&unique_name)
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;

        info!("Team {} is now called {unique_name}", team_id.0);

        Ok(RenameOutcome::Renamed(unique_name))
    }

    /// The full team x round grid, recomputed from stored round results.
    pub async fn leaderboard(&self) -> Result<Leaderboard, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let teams = query_as::<_, SqlTeam>("SELECT * FROM teams ORDER BY team_id")
            .fetch_all(&mut *transaction)
            .await?;
        let rounds = query_as::<_, SqlRound>("SELECT * FROM rounds ORDER BY round_id")
            .fetch_all(&mut *transaction)
            .await?;
        let results = query_as::<_, SqlRoundResult>("SELECT * FROM round_results")
            .fetch_all(&mut *transaction)
            .await?;

        transaction.commit().await?;

        let teams: Vec<Team> = from_db_all(&teams)?;
        let rounds: Vec<Round> = from_db_all(&rounds)?;
        let results: Vec<RoundResult> = from_db_all(&results)?;

        Ok(Leaderboard::build(&teams, &rounds, &results))
    }
}
