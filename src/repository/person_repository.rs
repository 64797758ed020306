use std::collections::HashSet;

use sqlx::{query, query_as, Pool, Sqlite};
use tracing::info;

use crate::{
    engine::team_formation::{placeholder_name, TEAM_CAPACITY},
    models::{Person, PersonId, Preference, RosterDefinition, Team, TeamId},
};

use super::conversion::{from_db_all, DBConvertible, SqlPerson, SqlTeam};

pub struct PersonRepository {
    pool: Pool<Sqlite>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined(TeamId),
    NoSuchPerson,
    TargetHasNoTeam,
    TeamFull,
}

impl PersonRepository {
    pub fn new(pool: Pool<Sqlite>) -> PersonRepository {
        PersonRepository { pool }
    }

    /// Replaces every person with the uploaded roster. Returns how many
    /// people were imported.
    #[tracing::instrument(skip_all)]
    pub async fn import_roster(&self, roster: &RosterDefinition) -> Result<usize, anyhow::Error> {
        let Some(people) = &roster.people else {
            return Ok(0);
        };

        let mut transaction = self.pool.begin().await?;

        query("DELETE FROM people")
            .execute(&mut *transaction)
            .await?;

        for person in people {
            query(
                r#"
                    INSERT INTO people (person_id, name, login, primary_group, secondary_group)
                    VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(person.person_id)
            .bind(&person.name)
            .bind(&person.login)
            .bind(person.primary)
            .bind(person.secondary_group())
            .execute(&mut *transaction)
            .await?;
        }

        transaction.commit().await?;

        info!("Imported {} people", people.len());

        Ok(people.len())
    }

    pub async fn find_by_login(&self, login: &str) -> Result<Option<Person>, anyhow::Error> {
        let row = query_as::<_, SqlPerson>("SELECT * FROM people WHERE login = $1")
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Person::from_db(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_person(&self, person_id: PersonId) -> Result<Option<Person>, anyhow::Error> {
        let row = query_as::<_, SqlPerson>("SELECT * FROM people WHERE person_id = $1")
            .bind(person_id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Person::from_db(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn set_preference(
        &self,
        person_id: PersonId,
        preference: Preference,
    ) -> Result<bool, anyhow::Error> {
        let updated = query("UPDATE people SET preference = $2 WHERE person_id = $1")
            .bind(person_id.0)
            .bind(preference.to_db()?)
            .execute(&self.pool)
            .await?;

        Ok(updated.rows_affected() > 0)
    }

    /// Creates a fresh team under a placeholder name and moves the person
    /// into it.
    #[tracing::instrument(skip(self))]
    pub async fn create_own_team(&self, person_id: PersonId) -> Result<Option<Team>, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let exists: Option<(i64,)> = query_as("SELECT person_id FROM people WHERE person_id = $1")
            .bind(person_id.0)
            .fetch_optional(&mut *transaction)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let taken: HashSet<String> = query_as::<_, (String,)>("SELECT name FROM teams")
            .fetch_all(&mut *transaction)
            .await?
            .into_iter()
            .map(|(name,)| name)
            .collect();

        let team = query_as::<_, SqlTeam>("INSERT INTO teams (name) VALUES ($1) RETURNING *")
            .bind(placeholder_name(&taken))
            .fetch_one(&mut *transaction)
            .await?;

        query("UPDATE people SET team_id = $2 WHERE person_id = $1")
            .bind(person_id.0)
            .bind(team.team_id)
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;

        let team = Team::from_db(&team)?;
        info!("Person {} created {}", person_id.0, team.name);

        Ok(Some(team))
    }

    /// Moves the person into the team of the person logged in as
    /// `target_login`, as long as that team has room.
    #[tracing::instrument(skip(self))]
    pub async fn join_team_of(
        &self,
        person_id: PersonId,
        target_login: &str,
    ) -> Result<JoinOutcome, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        let target: Option<(Option<i64>,)> =
            query_as("SELECT team_id FROM people WHERE login = $1")
                .bind(target_login)
                .fetch_optional(&mut *transaction)
                .await?;

        let team_id = match target {
            None => return Ok(JoinOutcome::NoSuchPerson),
            Some((None,)) => return Ok(JoinOutcome::TargetHasNoTeam),
            Some((Some(team_id),)) => team_id,
        };

        let (members,): (i64,) = query_as(
            "SELECT COUNT(*) FROM people WHERE team_id = $1 AND person_id <> $2",
        )
        .bind(team_id)
        .bind(person_id.0)
        .fetch_one(&mut *transaction)
        .await?;

        if members as usize >= TEAM_CAPACITY {
            return Ok(JoinOutcome::TeamFull);
        }

        let updated = query("UPDATE people SET team_id = $2 WHERE person_id = $1")
            .bind(person_id.0)
            .bind(team_id)
            .execute(&mut *transaction)
            .await?;
        if updated.rows_affected() == 0 {
            return Ok(JoinOutcome::NoSuchPerson);
        }

        transaction.commit().await?;

        Ok(JoinOutcome::Joined(TeamId(team_id)))
    }

    pub async fn leave_team(&self, person_id: PersonId) -> Result<bool, anyhow::Error> {
        let updated = query(
            "UPDATE people SET team_id = NULL WHERE person_id = $1 AND team_id IS NOT NULL",
        )
        .bind(person_id.0)
        .execute(&self.pool)
        .await?;

        Ok(updated.rows_affected() > 0)
    }

    /// Administrator placement, ignoring capacity. `None` unassigns.
    #[tracing::instrument(skip(self))]
    pub async fn move_person(
        &self,
        person_id: PersonId,
        team_id: Option<TeamId>,
    ) -> Result<bool, anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        if let Some(team_id) = team_id {
            let team: Option<(i64,)> = query_as("SELECT team_id FROM teams WHERE team_id = $1")
                .bind(team_id.0)
                .fetch_optional(&mut *transaction)
                .await?;
            if team.is_none() {
                return Ok(false);
            }
        }

        let updated = query("UPDATE people SET team_id = $2 WHERE person_id = $1")
            .bind(person_id.0)
            .bind(team_id.map(|team_id| team_id.0))
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;

        Ok(updated.rows_affected() > 0)
    }

    pub async fn team_members(&self, team_id: TeamId) -> Result<Vec<Person>, anyhow::Error> {
        let rows = query_as::<_, SqlPerson>("SELECT * FROM people WHERE team_id = $1 ORDER BY name")
            .bind(team_id.0)
            .fetch_all(&self.pool)
            .await?;

        Ok(from_db_all(&rows)?)
    }

    pub async fn teams_published(&self) -> Result<bool, anyhow::Error> {
        let (published,): (bool,) =
            query_as("SELECT teams_published FROM registration WHERE id = 1")
                .fetch_one(&self.pool)
                .await?;

        Ok(published)
    }

    pub async fn set_teams_published(&self, published: bool) -> Result<(), anyhow::Error> {
        query("UPDATE registration SET teams_published = $1 WHERE id = 1")
            .bind(published)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
