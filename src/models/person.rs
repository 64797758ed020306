use super::team::TeamId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AffinityGroup(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumString, strum::AsRefStr)]
pub enum Preference {
    /// Wants to be placed by the formation engine.
    #[strum(serialize = "R")]
    Random,
    /// Organizes their own team.
    #[strum(serialize = "S")]
    SelfOrganized,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    /// Discord user id of the person, used to resolve the caller of a command.
    pub login: Option<String>,
    pub primary_group: AffinityGroup,
    pub secondary_group: Option<AffinityGroup>,
    pub preference: Option<Preference>,
    pub team_id: Option<TeamId>,
}

impl Person {
    pub fn awaits_random_team(&self) -> bool {
        self.preference == Some(Preference::Random) && self.team_id.is_none()
    }
}
