use std::{cmp::Ordering, collections::HashMap};

use crate::models::{QuestionLetter, RoundId, RoundResult, TeamId, types::UtcDateTime};

use super::hint_schedule::HintSchedule;

/// The attempt that counts for one (team, letter) pair: the most recent of the
/// team's distinct wordings, each dated by its first submission.
#[derive(Clone, Debug, PartialEq)]
pub struct CountedAttempt {
    pub team_id: TeamId,
    pub letter: QuestionLetter,
    pub submitted_at: UtcDateTime,
    pub points: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RankedTeam {
    pub team_id: TeamId,
    pub score: f64,
    /// Seconds from the round start to the team's latest counted correct answer.
    pub tiebreak: f64,
    /// Competition ranking: tied teams share a rank and the next rank is skipped.
    pub rank: u32,
    pub contribution: i64,
    pub display_score: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoundOutcome {
    pub round_id: RoundId,
    pub eligible_teams: usize,
    pub cutoff: u32,
    /// Best first. Teams without a correct counted attempt are absent.
    pub ranked: Vec<RankedTeam>,
}

impl RoundOutcome {
    pub fn results(&self) -> Vec<RoundResult> {
        self.ranked
            .iter()
            .map(|team| RoundResult {
                team_id: team.team_id,
                round_id: self.round_id,
                contribution: team.contribution,
                display_score: team.display_score,
            })
            .collect()
    }
}

/// Half of the eligible teams, rounded up.
pub fn cutoff(eligible_teams: usize) -> u32 {
    eligible_teams.div_ceil(2) as u32
}

/// Ranks the eligible teams of a finished round.
///
/// `attempts` must already be reduced to one counted attempt per
/// (team, letter); attempts of teams not in `eligible` are ignored.
pub fn score_round(
    round_id: RoundId,
    base_value: i64,
    schedule: &HintSchedule,
    eligible: &[TeamId],
    attempts: &[CountedAttempt],
) -> RoundOutcome {
    let mut totals: HashMap<TeamId, (f64, f64)> = HashMap::new();

    for attempt in attempts.iter().filter(|a| a.points > 0.0) {
        if !eligible.contains(&attempt.team_id) {
            continue;
        }

        let elapsed = schedule.elapsed_seconds(attempt.submitted_at);
        let (score, tiebreak) = totals.entry(attempt.team_id).or_insert((0.0, f64::MIN));
        *score += attempt.points;
        *tiebreak = tiebreak.max(elapsed);
    }

    let mut standings: Vec<(TeamId, f64, f64)> = totals
        .into_iter()
        .map(|(team_id, (score, tiebreak))| (team_id, score, tiebreak))
        .collect();

    standings.sort_by(|a, b| {
        compare_performance((a.1, a.2), (b.1, b.2)).then_with(|| a.0.cmp(&b.0))
    });

    let eligible_teams = eligible.len();
    let cutoff = cutoff(eligible_teams);

    let mut ranked: Vec<RankedTeam> = Vec::with_capacity(standings.len());
    for (index, &(team_id, score, tiebreak)) in standings.iter().enumerate() {
        let rank = match ranked.last() {
            Some(previous) if previous.score == score && previous.tiebreak == tiebreak => {
                previous.rank
            }
            _ => index as u32 + 1,
        };

        let contribution = if rank <= cutoff {
            base_value * 100 + (cutoff - rank) as i64
        } else {
            0
        };
        let display_score = score * 100.0 + eligible_teams as f64 - rank as f64;

        ranked.push(RankedTeam {
            team_id,
            score,
            tiebreak,
            rank,
            contribution,
            display_score,
        });
    }

    RoundOutcome {
        round_id,
        eligible_teams,
        cutoff,
        ranked,
    }
}

/// Higher score first, then the earlier finisher.
fn compare_performance(a: (f64, f64), b: (f64, f64)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use test_log::test;
    use time::{macros::datetime, Duration};

    use crate::{
        engine::hint_schedule::HintSchedule,
        models::{types::UtcDateTime, QuestionLetter, RoundId, TeamId, NON_MATCH_POINTS},
    };

    use super::{cutoff, score_round, CountedAttempt};

    fn t0() -> UtcDateTime {
        UtcDateTime::assume_utc(datetime!(2024-03-01 20:00:00))
    }

    fn schedule() -> HintSchedule {
        HintSchedule::new(t0(), Duration::seconds(60))
    }

    fn attempt(team: i64, letter: &str, second: i64, points: f64) -> CountedAttempt {
        CountedAttempt {
            team_id: TeamId(team),
            letter: QuestionLetter::parse(letter).unwrap(),
            submitted_at: t0() + Duration::seconds(second),
            points,
        }
    }

    fn teams(ids: &[i64]) -> Vec<TeamId> {
        ids.iter().map(|&id| TeamId(id)).collect()
    }

    #[test]
    fn cutoff_rounds_up() {
        assert_eq!(cutoff(0), 0);
        assert_eq!(cutoff(1), 1);
        assert_eq!(cutoff(4), 2);
        assert_eq!(cutoff(5), 3);
    }

    #[test]
    fn two_of_four_teams_answer() {
        let attempts = vec![attempt(1, "B", 30, 4.0), attempt(3, "B", 90, 2.0)];

        let outcome = score_round(RoundId(3), 4, &schedule(), &teams(&[1, 2, 3, 4]), &attempts);

        assert_eq!(outcome.cutoff, 2);
        assert_eq!(outcome.ranked.len(), 2);

        let first = &outcome.ranked[0];
        assert_eq!(first.team_id, TeamId(1));
        assert_eq!(first.rank, 1);
        assert_eq!(first.contribution, 401);
        assert_eq!(first.display_score, 4.0 * 100.0 + 4.0 - 1.0);

        let second = &outcome.ranked[1];
        assert_eq!(second.team_id, TeamId(3));
        assert_eq!(second.rank, 2);
        assert_eq!(second.contribution, 400);
        assert_eq!(second.display_score, 2.0 * 100.0 + 4.0 - 2.0);

        let results = outcome.results();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.round_id == RoundId(3)));
    }

    #[test]
    fn earlier_finisher_wins_equal_score() {
        let attempts = vec![
            attempt(1, "A", 20, 4.0),
            attempt(1, "B", 50, 4.0),
            attempt(2, "A", 10, 4.0),
            attempt(2, "B", 40, 4.0),
        ];

        let outcome = score_round(RoundId(1), 4, &schedule(), &teams(&[1, 2]), &attempts);

        assert_eq!(outcome.ranked[0].team_id, TeamId(2));
        assert_eq!(outcome.ranked[0].tiebreak, 40.0);
        assert_eq!(outcome.ranked[1].team_id, TeamId(1));
        assert_eq!(outcome.ranked[1].rank, 2);
    }

    #[test]
    fn exact_ties_share_rank_and_skip_next() {
        let attempts = vec![
            attempt(1, "A", 20, 4.0),
            attempt(2, "A", 20, 4.0),
            attempt(3, "A", 25, 4.0),
        ];

        let outcome = score_round(RoundId(1), 2, &schedule(), &teams(&[1, 2, 3, 4, 5, 6]), &attempts);

        let ranks: Vec<u32> = outcome.ranked.iter().map(|t| t.rank).collect();
        assert_eq!(ranks, vec![1, 1, 3]);
        assert_eq!(outcome.ranked[0].contribution, 202);
        assert_eq!(outcome.ranked[1].contribution, 202);
        assert_eq!(outcome.ranked[2].contribution, 200);
    }

    #[test]
    fn below_cutoff_gets_zero_contribution_but_display_score() {
        let attempts = vec![
            attempt(1, "A", 10, 4.0),
            attempt(1, "B", 10, 4.0),
            attempt(2, "A", 20, 4.0),
            attempt(3, "A", 70, 2.0),
        ];

        let outcome = score_round(RoundId(1), 4, &schedule(), &teams(&[1, 2, 3]), &attempts);

        assert_eq!(outcome.cutoff, 2);
        let last = outcome.ranked.last().unwrap();
        assert_eq!(last.team_id, TeamId(3));
        assert_eq!(last.rank, 3);
        assert_eq!(last.contribution, 0);
        assert_eq!(last.display_score, 200.0);
    }

    #[test]
    fn wrong_only_teams_are_unranked() {
        let attempts = vec![
            attempt(1, "A", 10, NON_MATCH_POINTS),
            attempt(2, "A", 10, 1.0),
        ];

        let outcome = score_round(RoundId(1), 4, &schedule(), &teams(&[1, 2]), &attempts);

        assert_eq!(outcome.ranked.len(), 1);
        assert_eq!(outcome.ranked[0].team_id, TeamId(2));
    }

    #[test]
    fn ineligible_teams_are_ignored() {
        let attempts = vec![attempt(9, "A", 5, 4.0), attempt(1, "A", 10, 4.0)];

        let outcome = score_round(RoundId(1), 4, &schedule(), &teams(&[1, 2]), &attempts);

        assert_eq!(outcome.ranked.len(), 1);
        assert_eq!(outcome.ranked[0].team_id, TeamId(1));
        assert_eq!(outcome.eligible_teams, 2);
    }

    #[test]
    fn at_most_cutoff_teams_contribute() {
        let eligible = teams(&[1, 2, 3, 4, 5, 6, 7]);
        let attempts: Vec<CountedAttempt> = (1..=7)
            .map(|team| attempt(team, "A", team * 3, 4.0))
            .collect();

        let outcome = score_round(RoundId(1), 4, &schedule(), &eligible, &attempts);

        let contributing = outcome.ranked.iter().filter(|t| t.contribution > 0).count();
        assert_eq!(contributing, 4);
        assert!(outcome
            .ranked
            .iter()
            .skip(4)
            .all(|t| t.contribution == 0));
    }

    #[test]
    fn scoring_is_repeatable() {
        let attempts = vec![
            attempt(4, "A", 15, 4.0),
            attempt(2, "A", 15, 4.0),
            attempt(3, "B", 65, 2.0),
        ];
        let eligible = teams(&[1, 2, 3, 4]);

        let first = score_round(RoundId(1), 4, &schedule(), &eligible, &attempts);
        let second = score_round(RoundId(1), 4, &schedule(), &eligible, &attempts);

        assert_eq!(first, second);
        assert_eq!(first.ranked[0].team_id, TeamId(2));
    }
}
