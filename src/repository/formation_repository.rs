use std::collections::HashSet;

use bimap::BiMap;
use rand::{rngs::StdRng, SeedableRng};
use sqlx::{query, query_as, Pool, Sqlite, SqliteConnection};
use tracing::info;

use crate::{
    engine::team_formation::{assign_to_teams, placeholder_name, plan_formation, Candidate},
    models::{Person, TeamId},
};

use super::conversion::{from_db_all, SqlPerson};

pub struct FormationRepository {
    pool: Pool<Sqlite>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormationReport {
    /// People placed into a newly created team.
    pub assigned: usize,
    /// People counted in their secondary or another group to even out group sizes.
    pub regrouped: usize,
    pub teams_created: usize,
    pub teams_removed: usize,
}

impl FormationRepository {
    pub fn new(pool: Pool<Sqlite>) -> FormationRepository {
        FormationRepository { pool }
    }

    /// Places every unassigned person who asked for a random team into newly
    /// created placeholder teams. Cleanup, team creation and assignment commit
    /// together or not at all.
    #[tracing::instrument(skip(self))]
    pub async fn form_random_teams(&self, seed: u64) -> Result<FormationReport, anyhow::Error> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut transaction = self.pool.begin().await?;

        let mut teams_removed = remove_empty_teams(&mut *transaction).await?;

        let waiting = query_as::<_, SqlPerson>(
            r#"
                SELECT * FROM people
                WHERE preference = 'R' AND team_id IS NULL
                ORDER BY person_id
            "#,
        )
        .fetch_all(&mut *transaction)
        .await?;
        let waiting: Vec<Person> = from_db_all(&waiting)?;

        let candidates: Vec<Candidate> = waiting
            .iter()
            .map(|person| Candidate {
                person_id: person.id,
                primary: person.primary_group,
                secondary: person.secondary_group,
            })
            .collect();

        let plan = plan_formation(&candidates, &mut rng);

        let mut taken: HashSet<String> = query_as::<_, (String,)>("SELECT name FROM teams")
            .fetch_all(&mut *transaction)
            .await?
            .into_iter()
            .map(|(name,)| name)
            .collect();

        let mut teams_by_rank: BiMap<usize, TeamId> = BiMap::new();
        for rank in 1..=plan.team_count {
            let name = placeholder_name(&taken);

            let (team_id,): (i64,) =
                query_as("INSERT INTO teams (name) VALUES ($1) RETURNING team_id")
                    .bind(&name)
                    .fetch_one(&mut *transaction)
                    .await?;

            taken.insert(name);
            teams_by_rank.insert(rank, TeamId(team_id));
        }

        let assignments = assign_to_teams(&plan, &teams_by_rank);
        for (person_id, team_id) in &assignments {
            query("UPDATE people SET team_id = $2 WHERE person_id = $1")
                .bind(person_id.0)
                .bind(team_id.0)
                .execute(&mut *transaction)
                .await?;
        }

        teams_removed += remove_empty_teams(&mut *transaction).await?;

        transaction.commit().await?;

        let report = FormationReport {
            assigned: assignments.len(),
            regrouped: plan.moved_between_groups,
            teams_created: plan.team_count,
            teams_removed,
        };
        info!("Formed random teams: {report:?}");

        Ok(report)
    }
}

/// Deletes non-administrator teams without members. Returns how many went.
async fn remove_empty_teams(connection: &mut SqliteConnection) -> Result<usize, anyhow::Error> {
    let removed = query(
        r#"
            DELETE FROM teams
            WHERE NOT is_admin
                AND NOT EXISTS (SELECT 1 FROM people WHERE people.team_id = teams.team_id)
        "#,
    )
    .execute(&mut *connection)
    .await?;

    Ok(removed.rows_affected() as usize)
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use sqlx::{query, query_as, Pool, Sqlite};

    use crate::repository::test_support::{insert_person, insert_team, memory_pool};

    use super::{FormationReport, FormationRepository};

    async fn memberships(pool: &Pool<Sqlite>) -> Vec<(i64, i64, Option<i64>)> {
        query_as("SELECT person_id, primary_group, team_id FROM people ORDER BY person_id")
            .fetch_all(pool)
            .await
            .unwrap()
    }

    async fn team_names(pool: &Pool<Sqlite>) -> Vec<(i64, String)> {
        query_as("SELECT team_id, name FROM teams ORDER BY team_id")
            .fetch_all(pool)
            .await
            .unwrap()
    }

    #[test_log::test(tokio::test)]
    async fn forms_full_diverse_teams() {
        let pool = memory_pool().await;
        insert_team(&pool, 1, "Self Starters", false).await;
        insert_team(&pool, 2, "Ghost Town", false).await;
        insert_team(&pool, 9, "Hosts", true).await;

        // 12 people waiting for a random team, spread over groups of 4, 3, 3 and 2.
        let groups = [1, 1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4];
        for (index, group) in groups.iter().enumerate() {
            insert_person(&pool, index as i64 + 1, None, *group, None, Some("R"), None).await;
        }
        // Already placed or organizing themselves: left alone.
        insert_person(&pool, 50, None, 1, None, Some("R"), Some(1)).await;
        insert_person(&pool, 51, None, 1, None, Some("S"), None).await;

        let repository = FormationRepository::new(pool.clone());
        let report = repository.form_random_teams(17).await.unwrap();

        assert_eq!(
            report,
            FormationReport {
                assigned: 12,
                regrouped: 1,
                teams_created: 3,
                teams_removed: 1,
            }
        );

        let people = memberships(&pool).await;
        let mut sizes: HashMap<i64, usize> = HashMap::new();
        let mut seen: HashSet<(i64, i64)> = HashSet::new();
        for (person_id, group, team_id) in &people {
            match person_id {
                50 => assert_eq!(*team_id, Some(1)),
                51 => assert_eq!(*team_id, None),
                _ => {
                    let team_id = team_id.unwrap();
                    *sizes.entry(team_id).or_default() += 1;
                    // Group 1 has one person more than there are teams.
                    if *group != 1 {
                        assert!(seen.insert((*group, team_id)), "group {group} doubled up");
                    }
                }
            }
        }
        assert_eq!(sizes.len(), 3);
        assert!(sizes.values().all(|&size| size == 4));

        let names: Vec<String> = team_names(&pool)
            .await
            .into_iter()
            .map(|(_, name)| name)
            .collect();
        assert!(!names.contains(&"Ghost Town".to_string()));
        assert!(names.contains(&"Hosts".to_string()));
        assert!(names.contains(&"Team Alpha".to_string()));
        assert!(names.contains(&"Team Charlie".to_string()));
    }

    #[test_log::test(tokio::test)]
    async fn nobody_waiting() {
        let pool = memory_pool().await;
        insert_team(&pool, 1, "Ghost Town", false).await;
        insert_person(&pool, 1, None, 1, None, Some("S"), None).await;

        let report = FormationRepository::new(pool.clone())
            .form_random_teams(1)
            .await
            .unwrap();

        assert_eq!(
            report,
            FormationReport {
                assigned: 0,
                regrouped: 0,
                teams_created: 0,
                teams_removed: 1,
            }
        );
        assert!(team_names(&pool).await.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn same_seed_same_teams() {
        let mut outcomes = Vec::new();

        for _ in 0..2 {
            let pool = memory_pool().await;
            for id in 1..=9 {
                insert_person(&pool, id, None, id % 3, Some(id % 4), Some("R"), None).await;
            }
            FormationRepository::new(pool.clone())
                .form_random_teams(99)
                .await
                .unwrap();
            outcomes.push(memberships(&pool).await);
        }

        assert_eq!(outcomes[0], outcomes[1]);
    }

    #[test_log::test(tokio::test)]
    async fn failed_assignment_changes_nothing() {
        let pool = memory_pool().await;
        insert_team(&pool, 1, "Ghost Town", false).await;
        for id in 1..=6 {
            insert_person(&pool, id, None, id % 2, None, Some("R"), None).await;
        }
        query(
            r#"
                CREATE TRIGGER no_moves BEFORE UPDATE OF team_id ON people
                BEGIN SELECT RAISE(ABORT, 'moves are blocked'); END
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let people_before = memberships(&pool).await;
        let teams_before = team_names(&pool).await;

        let result = FormationRepository::new(pool.clone())
            .form_random_teams(5)
            .await;

        assert!(result.is_err());
        assert_eq!(memberships(&pool).await, people_before);
        assert_eq!(team_names(&pool).await, teams_before);
    }
}
