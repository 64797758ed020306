pub mod answer_matcher;
pub mod hint_schedule;
pub mod leaderboard;
pub mod scoring;
pub mod team_formation;
