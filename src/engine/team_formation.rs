use std::collections::{BTreeMap, HashSet};

use bimap::BiMap;
use rand::{seq::SliceRandom, Rng};

use crate::models::{AffinityGroup, PersonId, TeamId};

/// Fixed size of a randomly formed team.
pub const TEAM_CAPACITY: usize = 5;

/// A person waiting for random placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub person_id: PersonId,
    pub primary: AffinityGroup,
    pub secondary: Option<AffinityGroup>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub person_id: PersonId,
    /// The group the person is counted in after rebalancing.
    pub group: AffinityGroup,
    /// 1-based rank of the destination team.
    pub team_rank: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormationPlan {
    pub team_count: usize,
    /// People counted in a group other than their primary one.
    pub moved_between_groups: usize,
    pub placements: Vec<Placement>,
}

const PLACEHOLDER_NAMES: [&str; 26] = [
    "Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel", "India", "Juliett",
    "Kilo", "Lima", "Mike", "November", "Oscar", "Papa", "Quebec", "Romeo", "Sierra", "Tango",
    "Uniform", "Victor", "Whiskey", "X-ray", "Yankee", "Zulu",
];

pub fn target_team_count(people: usize) -> usize {
    people.div_ceil(TEAM_CAPACITY)
}

/// The first of `Team Alpha` .. `Team Zulu`, then `Team 27`, `Team 28`, ...
/// that is not in `taken`.
pub fn placeholder_name(taken: &HashSet<String>) -> String {
    PLACEHOLDER_NAMES
        .iter()
        .map(|name| format!("Team {name}"))
        .chain((PLACEHOLDER_NAMES.len() + 1..).map(|n| format!("Team {n}")))
        .find(|name| !taken.contains(name))
        .unwrap_or_default()
}

/// Plans the random placement of `candidates` into `target_team_count` teams.
///
/// Groups larger than the team count give their surplus to smaller groups,
/// preferring people whose secondary group is the destination, then people
/// without a secondary group. Each group is then spread over consecutive
/// team ranks, so a group never puts two people into one team unless it is
/// larger than the team count.
pub fn plan_formation<R: Rng + ?Sized>(candidates: &[Candidate], rng: &mut R) -> FormationPlan {
    let team_count = target_team_count(candidates.len());
    if team_count == 0 {
        return FormationPlan {
            team_count,
            moved_between_groups: 0,
            placements: Vec::new(),
        };
    }

    let effective = rebalance_groups(candidates, team_count, rng);
    let moved_between_groups = candidates
        .iter()
        .zip(&effective)
        .filter(|(candidate, group)| candidate.primary != **group)
        .count();

    let mut groups: BTreeMap<AffinityGroup, Vec<PersonId>> = BTreeMap::new();
    for (candidate, group) in candidates.iter().zip(&effective) {
        groups.entry(*group).or_default().push(candidate.person_id);
    }

    let mut ordered: Vec<(AffinityGroup, Vec<PersonId>)> = groups.into_iter().collect();
    ordered.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(&b.0)));

    let mut placements = Vec::with_capacity(candidates.len());
    let mut offset = 0;
    for (group, mut members) in ordered {
        members.shuffle(rng);

        for (index, person_id) in members.iter().enumerate() {
            placements.push(Placement {
                person_id: *person_id,
                group,
                team_rank: (offset + index) % team_count + 1,
            });
        }

        offset += members.len();
    }

    FormationPlan {
        team_count,
        moved_between_groups,
        placements,
    }
}

/// Returns the effective group of every candidate, in input order.
fn rebalance_groups<R: Rng + ?Sized>(
    candidates: &[Candidate],
    team_count: usize,
    rng: &mut R,
) -> Vec<AffinityGroup> {
    let mut sizes: BTreeMap<AffinityGroup, usize> = BTreeMap::new();
    for candidate in candidates {
        *sizes.entry(candidate.primary).or_default() += 1;
    }

    let mut surplus: BTreeMap<AffinityGroup, usize> = sizes
        .iter()
        .filter(|(_, &size)| size > team_count)
        .map(|(&group, &size)| (group, size - team_count))
        .collect();
    let mut deficit: BTreeMap<AffinityGroup, usize> = sizes
        .iter()
        .filter(|(_, &size)| size < team_count)
        .map(|(&group, &size)| (group, team_count - size))
        .collect();

    let mut effective: Vec<AffinityGroup> = candidates.iter().map(|c| c.primary).collect();

    let mut pool: Vec<usize> = (0..candidates.len())
        .filter(|&index| surplus.contains_key(&candidates[index].primary))
        .collect();
    pool.shuffle(rng);

    let mut moved: HashSet<usize> = HashSet::new();

    for &index in &pool {
        let candidate = &candidates[index];
        let Some(secondary) = candidate.secondary else {
            continue;
        };
        if !has_capacity(&surplus, candidate.primary) || !has_capacity(&deficit, secondary) {
            continue;
        }

        take_one(&mut surplus, candidate.primary);
        take_one(&mut deficit, secondary);
        effective[index] = secondary;
        moved.insert(index);
    }

    for &index in &pool {
        let candidate = &candidates[index];
        if moved.contains(&index) || candidate.secondary.is_some() {
            continue;
        }
        if !has_capacity(&surplus, candidate.primary) {
            continue;
        }

        let destination = deficit
            .iter()
            .filter(|(_, &missing)| missing > 0)
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(&group, _)| group);
        let Some(destination) = destination else {
            break;
        };

        take_one(&mut surplus, candidate.primary);
        take_one(&mut deficit, destination);
        effective[index] = destination;
        moved.insert(index);
    }

    effective
}

fn has_capacity(counts: &BTreeMap<AffinityGroup, usize>, group: AffinityGroup) -> bool {
    counts.get(&group).is_some_and(|&count| count > 0)
}

fn take_one(counts: &mut BTreeMap<AffinityGroup, usize>, group: AffinityGroup) {
    if let Some(count) = counts.get_mut(&group) {
        *count = count.saturating_sub(1);
    }
}

/// Resolves planned team ranks to actual teams.
pub fn assign_to_teams(
    plan: &FormationPlan,
    teams_by_rank: &BiMap<usize, TeamId>,
) -> Vec<(PersonId, TeamId)> {
    plan.placements
        .iter()
        .filter_map(|placement| {
            teams_by_rank
                .get_by_left(&placement.team_rank)
                .map(|&team_id| (placement.person_id, team_id))
        })
        .collect()
}
