//! Bucketed round-robin allocation.
//!
//! Only the teams currently tied for the smallest roster (pre-draft members plus picks so far)
//! pick, one fighter each, in their stable slot order. When that bucket is spent the sizes
//! are re-measured and the next bucket formed.

use std::collections::VecDeque;

use serde::Serialize;
use tracing::debug;

use crate::data::Fighter;
use crate::draft::classify::{classify_fighters, RosterGroups};
use crate::draft::ranking::rank_pool;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftPick {
    /// Global 1-based pick number across the whole run.
    pub number: u32,
    pub fighter: Fighter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftSlot {
    pub name: String,
    pub members: Vec<Fighter>,
    pub picks: Vec<DraftPick>,
}

impl DraftSlot {
    pub fn pre_draft_count(&self) -> usize {
        self.members.len()
    }

    pub fn current_size(&self) -> usize {
        self.members.len() + self.picks.len()
    }

    pub(crate) fn record(&mut self, number: u32, fighter: Fighter) {
        self.picks.push(DraftPick { number, fighter });
    }
}

/// Draft slots for every roster, smallest roster first (stable on ties).
pub fn initial_slots(groups: RosterGroups) -> Vec<DraftSlot> {
    let mut slots: Vec<DraftSlot> = groups
        .into_groups()
        .into_iter()
        .map(|group| DraftSlot {
            name: group.name,
            members: group.members,
            picks: Vec::new(),
        })
        .collect();
    slots.sort_by_key(DraftSlot::pre_draft_count);
    slots
}

/// Yields which slot receives the next pick.
#[derive(Debug, Clone, Default)]
pub struct FairScheduler {
    bucket: VecDeque<usize>,
}

impl FairScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn refill(&mut self, slots: &[DraftSlot]) {
        if !self.bucket.is_empty() {
            return;
        }
        let Some(min_size) = slots.iter().map(DraftSlot::current_size).min() else {
            return;
        };
        self.bucket.extend(
            slots
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.current_size() == min_size)
                .map(|(index, _)| index),
        );
    }

    /// Slot index that will pick next, without consuming it. None only when there are no slots.
    pub fn peek_slot(&mut self, slots: &[DraftSlot]) -> Option<usize> {
        self.refill(slots);
        self.bucket.front().copied()
    }

    pub fn next_slot(&mut self, slots: &[DraftSlot]) -> Option<usize> {
        self.refill(slots);
        self.bucket.pop_front()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub slots: Vec<DraftSlot>,
    /// Number of ranked fighters consumed; equals the pool size when allocation completes.
    pub cursor: usize,
}

/// Assigns every ranked fighter, in order, to the slot the scheduler selects.
pub fn allocate(ranked: &[Fighter], mut slots: Vec<DraftSlot>) -> Allocation {
    let mut scheduler = FairScheduler::new();
    let mut cursor = 0usize;
    while cursor < ranked.len() {
        let Some(slot_index) = scheduler.next_slot(&slots) else {
            break;
        };
        let fighter = ranked[cursor].clone();
        cursor += 1;
        debug!(
            pick = cursor,
            team = %slots[slot_index].name,
            fighter = %fighter.display_name(),
            "batch pick"
        );
        slots[slot_index].record(cursor as u32, fighter);
    }
    Allocation { slots, cursor }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftOutcome {
    pub ranked: Vec<Fighter>,
    pub slots: Vec<DraftSlot>,
    /// False when a live run was cancelled before the pool was exhausted.
    pub completed: bool,
}

/// Classifies, ranks and allocates in one pass. Deterministic for identical input.
pub fn run_batch_draft(fighters: &[Fighter]) -> DraftOutcome {
    let classification = classify_fighters(fighters);
    let ranked = rank_pool(&classification.pool);
    let slots = initial_slots(classification.roster_groups);
    if ranked.is_empty() || slots.is_empty() {
        return DraftOutcome {
            ranked,
            slots,
            completed: true,
        };
    }
    let allocation = allocate(&ranked, slots);
    DraftOutcome {
        ranked,
        slots: allocation.slots,
        completed: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(name: &str, size: usize) -> DraftSlot {
        DraftSlot {
            name: name.to_string(),
            members: (0..size)
                .map(|i| Fighter::new(format!("{name}-{i}"), format!("{name}{i}"), [1.0; 4]))
                .collect(),
            picks: Vec::new(),
        }
    }

    fn ranked(n: usize) -> Vec<Fighter> {
        (0..n)
            .map(|i| Fighter::new(format!("p{i}"), format!("P{i}"), [1.0; 4]))
            .collect()
    }

    #[test]
    fn smallest_team_picks_until_caught_up() {
        let pool = ranked(4);
        let result = allocate(&pool, vec![slot("team-0", 0), slot("team-1", 3)]);
        let ids: Vec<_> = result.slots[0].picks.iter().map(|p| p.fighter.id.as_str()).collect();
        assert_eq!(ids, vec!["p0", "p1", "p2", "p3"]);
        assert!(result.slots[1].picks.is_empty());
        assert_eq!(result.cursor, 4);
    }

    #[test]
    fn bucket_stops_when_pool_runs_out() {
        let pool = ranked(2);
        let result = allocate(&pool, vec![slot("a", 1), slot("b", 1), slot("c", 1)]);
        assert_eq!(result.slots[0].picks.len(), 1);
        assert_eq!(result.slots[1].picks.len(), 1);
        assert!(result.slots[2].picks.is_empty());
    }

    #[test]
    fn pick_numbers_are_global() {
        let pool = ranked(5);
        let result = allocate(&pool, vec![slot("a", 0), slot("b", 0)]);
        let a: Vec<_> = result.slots[0].picks.iter().map(|p| p.number).collect();
        let b: Vec<_> = result.slots[1].picks.iter().map(|p| p.number).collect();
        assert_eq!(a, vec![1, 3, 5]);
        assert_eq!(b, vec![2, 4]);
    }

    #[test]
    fn initial_order_is_stable_by_size() {
        let groups = crate::draft::classify::classify_fighters(&[
            Fighter::new("1", "a", [1.0; 4]).with_team("Big"),
            Fighter::new("2", "b", [1.0; 4]).with_team("Big"),
            Fighter::new("3", "c", [1.0; 4]).with_team("SmallOne"),
            Fighter::new("4", "d", [1.0; 4]).with_team("SmallTwo"),
        ])
        .roster_groups;
        let names: Vec<_> = initial_slots(groups).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["SmallOne", "SmallTwo", "Big"]);
    }

    #[test]
    fn scheduler_without_slots_yields_nothing() {
        let mut scheduler = FairScheduler::new();
        assert_eq!(scheduler.next_slot(&[]), None);
        assert_eq!(scheduler.peek_slot(&[]), None);
    }
}
