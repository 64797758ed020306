use std::collections::HashMap;

use crate::models::{Round, RoundId, RoundResult, Team, TeamId};

#[derive(Clone, Debug, PartialEq)]
pub struct LeaderboardCell {
    pub team_id: TeamId,
    pub team_name: String,
    pub round_id: RoundId,
    pub contribution: i64,
    pub display_score: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Standing {
    pub team_id: TeamId,
    pub team_name: String,
    pub total: i64,
}

/// Team x round grid of contributions. Derived entirely from round results,
/// a missing result reads as zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Leaderboard {
    pub cells: Vec<LeaderboardCell>,
}

impl Leaderboard {
    pub fn build(teams: &[Team], rounds: &[Round], results: &[RoundResult]) -> Leaderboard {
        let by_key: HashMap<(TeamId, RoundId), &RoundResult> = results
            .iter()
            .map(|result| ((result.team_id, result.round_id), result))
            .collect();
        let results = &by_key;

        let cells = teams
            .iter()
            .filter(|team| !team.is_admin)
            .flat_map(move |team| {
                rounds.iter().map(move |round| {
                    let result = results.get(&(team.id, round.id));
                    LeaderboardCell {
                        team_id: team.id,
                        team_name: team.name.clone(),
                        round_id: round.id,
                        contribution: result.map(|r| r.contribution).unwrap_or(0),
                        display_score: result.map(|r| r.display_score).unwrap_or(0.0),
                    }
                })
            })
            .collect();

        Leaderboard { cells }
    }

    /// Running totals, highest first; ties are ordered by name.
    pub fn standings(&self) -> Vec<Standing> {
        let mut totals: HashMap<TeamId, Standing> = HashMap::new();

        for cell in &self.cells {
            totals
                .entry(cell.team_id)
                .or_insert_with(|| Standing {
                    team_id: cell.team_id,
                    team_name: cell.team_name.clone(),
                    total: 0,
                })
                .total += cell.contribution;
        }

        let mut standings: Vec<Standing> = totals.into_values().collect();
        standings.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.team_name.cmp(&b.team_name))
        });
        standings
    }

    pub fn round(&self, round_id: RoundId) -> Vec<&LeaderboardCell> {
        self.cells
            .iter()
            .filter(|cell| cell.round_id == round_id)
            .collect()
    }
}
