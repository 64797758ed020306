use super::types::UtcDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamId(pub i64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub is_admin: bool,
    /// A locked team keeps its name regardless of the round state.
    pub locked: bool,
    pub last_seen: Option<UtcDateTime>,
}
