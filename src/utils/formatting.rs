use std::collections::HashMap;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::{
    engine::scoring::RoundOutcome,
    models::{types::UtcDateTime, TeamId, NON_MATCH_POINTS},
};

/// Hard limit of a Discord message body.
pub const MESSAGE_LIMIT: usize = 2000;

const TIME_FORMAT: &[FormatItem<'_>] = format_description!("[hour]:[minute]:[second]");

pub fn format_utc_time(at: UtcDateTime) -> String {
    OffsetDateTime::from(at)
        .format(TIME_FORMAT)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

/// Awards are halved at most twice, so two decimals are always exact.
pub fn format_points(points: f64) -> String {
    if points == NON_MATCH_POINTS {
        "miss".to_string()
    } else if points.fract() == 0.0 {
        format!("{points:.0}")
    } else {
        format!("{points:.2}")
    }
}

/// One line per ranked team, best first. Hosts also get the round score and
/// the leaderboard contribution.
pub fn format_ranking(
    outcome: &RoundOutcome,
    team_names: &HashMap<TeamId, String>,
    with_scores: bool,
) -> String {
    if outcome.ranked.is_empty() {
        return "Nobody answered correctly.\n".to_string();
    }

    outcome.ranked.iter().fold(String::new(), |acc, team| {
        let name = team_names
            .get(&team.team_id)
            .cloned()
            .unwrap_or_else(|| format!("Team {}", team.team_id.0));

        let details = if with_scores {
            format!(
                " - {} scored, +{} on the leaderboard",
                format_points(team.score),
                team.contribution
            )
        } else {
            String::new()
        };

        acc + &format!("{}. {name}{details}\n", team.rank)
    })
}

/// Cuts `text` at a line boundary so that it fits into one message.
pub fn fit_message(text: &str) -> String {
    const ELLIPSIS: &str = "\n…";

    if text.chars().count() <= MESSAGE_LIMIT {
        return text.to_string();
    }

    let budget = MESSAGE_LIMIT - ELLIPSIS.chars().count();
    let mut fitted = String::new();
    let mut used = 0;
    for line in text.lines() {
        let cost = line.chars().count() + 1;
        if used + cost > budget {
            break;
        }
        fitted.push_str(line);
        fitted.push('\n');
        used += cost;
    }

    fitted.truncate(fitted.trim_end().len());
    fitted.push_str(ELLIPSIS);
    fitted
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use map_macro::hash_map;

    use crate::{
        engine::scoring::{RankedTeam, RoundOutcome},
        models::{types::UtcDateTime, RoundId, TeamId},
    };

    use super::{fit_message, format_points, format_ranking, format_utc_time, MESSAGE_LIMIT};

    #[test]
    fn points() {
        assert_eq!(format_points(4.0), "4");
        assert_eq!(format_points(0.25), "0.25");
        assert_eq!(format_points(-1.0), "miss");
    }

    #[test]
    fn utc_time() {
        let at = UtcDateTime::assume_utc(datetime!(2024-03-01 20:01:02));
        assert_eq!(format_utc_time(at), "20:01:02");
    }

    fn ranked(team: i64, score: f64, rank: u32, contribution: i64) -> RankedTeam {
        RankedTeam {
            team_id: TeamId(team),
            score,
            tiebreak: 30.0,
            rank,
            contribution,
            display_score: 0.0,
        }
    }

    #[test]
    fn ranking() {
        let outcome = RoundOutcome {
            round_id: RoundId(3),
            eligible_teams: 4,
            cutoff: 2,
            ranked: vec![ranked(1, 4.0, 1, 401), ranked(3, 2.0, 2, 400), ranked(4, 0.5, 3, 0)],
        };
        let names = hash_map! {
            TeamId(1) => "Alpha".to_string(),
            TeamId(3) => "Charlie".to_string(),
        };

        assert_eq!(
            format_ranking(&outcome, &names, false),
            "1. Alpha\n2. Charlie\n3. Team 4\n"
        );
        assert_eq!(
            format_ranking(&outcome, &names, true).lines().nth(2),
            Some("3. Team 4 - 0.50 scored, +0 on the leaderboard")
        );
    }

    #[test]
    fn empty_ranking() {
        let outcome = RoundOutcome {
            round_id: RoundId(1),
            eligible_teams: 2,
            cutoff: 1,
            ranked: Vec::new(),
        };
        assert_eq!(
            format_ranking(&outcome, &Default::default(), true),
            "Nobody answered correctly.\n"
        );
    }

    #[test]
    fn short_message_untouched() {
        assert_eq!(fit_message("one\ntwo"), "one\ntwo");
    }

    #[test]
    fn long_message_cut_at_line() {
        let text = (0..500)
            .map(|n| format!("line {n}"))
            .collect::<Vec<_>>()
            .join("\n");

        let fitted = fit_message(&text);

        assert!(fitted.chars().count() <= MESSAGE_LIMIT);
        assert!(fitted.starts_with("line 0\nline 1\n"));
        assert!(fitted.ends_with("\n…"));
        assert!(fitted
            .lines()
            .all(|line| line == "…" || line.starts_with("line ")));
    }
}
