use std::collections::HashMap;

use serde::Serialize;

use crate::data::Fighter;

/// Affiliations (trimmed, lower-cased) that place a fighter in the free-agent pool.
const FREE_AGENT_MARKERS: [&str; 3] = ["free agent", "free agents", "fa"];
/// Affiliations that mark a custom fighter.
const CUSTOM_MARKERS: [&str; 3] = ["custom fighter", "custom fighters", "custom"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterGroup {
    pub name: String,
    pub members: Vec<Fighter>,
}

/// Team rosters in the order each team was first seen in the collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RosterGroups {
    groups: Vec<RosterGroup>,
}

impl RosterGroups {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RosterGroup> {
        self.groups.iter()
    }

    pub fn get(&self, name: &str) -> Option<&RosterGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn into_groups(self) -> Vec<RosterGroup> {
        self.groups
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub pool: Vec<Fighter>,
    pub roster_groups: RosterGroups,
}

/// True when the fighter is draftable: no team, a free-agent marker, or a custom fighter.
pub fn is_pool_member(fighter: &Fighter) -> bool {
    let team = fighter.team.trim();
    let lc = team.to_lowercase();
    let is_free = team.is_empty() || FREE_AGENT_MARKERS.contains(&lc.as_str());
    let is_custom = fighter.is_custom || CUSTOM_MARKERS.contains(&lc.as_str());
    is_free || is_custom
}

/// Splits the collection into the draft pool and the existing team rosters, keeping the
/// collection order inside each group.
pub fn classify_fighters(fighters: &[Fighter]) -> Classification {
    let mut pool = Vec::new();
    let mut groups: Vec<RosterGroup> = Vec::new();
    let mut index_by_team: HashMap<String, usize> = HashMap::new();

    for fighter in fighters {
        if is_pool_member(fighter) {
            pool.push(fighter.clone());
            continue;
        }
        let team = fighter.team.trim().to_string();
        let slot = *index_by_team.entry(team.clone()).or_insert_with(|| {
            groups.push(RosterGroup {
                name: team,
                members: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].members.push(fighter.clone());
    }

    Classification {
        pool,
        roster_groups: RosterGroups { groups },
    }
}
