//! Abstract 1-D positioning between fighters.
//!
//! Fighters have no coordinates, only pairwise distances in `0..=room size`.
//! [`RangeMap`] stores one value per unordered pair, so `range(a, b)` and
//! `range(b, a)` are the same entry and can never disagree. All mutation
//! goes through its methods, which keep every value inside the room bounds.

mod movement;

use std::collections::BTreeMap;

use crate::state::FighterId;

pub use movement::{Direction, MoveMode, Movement, MovementSummary, StepOutcome};

/// Symmetric pairwise ranges for one encounter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeMap {
    size: u32,
    members: Vec<FighterId>,
    #[cfg_attr(feature = "serde", serde(with = "pairs"))]
    ranges: BTreeMap<(FighterId, FighterId), u32>,
}

fn key(a: FighterId, b: FighterId) -> (FighterId, FighterId) {
    if a <= b { (a, b) } else { (b, a) }
}

impl RangeMap {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            members: Vec::new(),
            ranges: BTreeMap::new(),
        }
    }

    /// Builds the map for a starting group: every distinct pair at `starting`.
    pub fn with_members(size: u32, members: &[FighterId], starting: u32) -> Self {
        let mut map = Self::new(size);
        let starting = starting.min(size);
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                map.ranges.insert(key(*a, *b), starting);
            }
        }
        map.members = members.to_vec();
        map
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn members(&self) -> &[FighterId] {
        &self.members
    }

    pub fn contains(&self, id: FighterId) -> bool {
        self.members.contains(&id)
    }

    /// Adds a fighter at maximum range from everyone already present.
    pub fn add_distant(&mut self, joiner: FighterId) {
        if self.contains(joiner) {
            return;
        }
        for other in &self.members {
            self.ranges.insert(key(joiner, *other), self.size);
        }
        self.members.push(joiner);
    }

    pub fn get(&self, a: FighterId, b: FighterId) -> u32 {
        if a == b {
            return 0;
        }
        match self.ranges.get(&key(a, b)) {
            Some(range) => *range,
            None => {
                debug_assert!(false, "no range tracked between {a} and {b}");
                self.size
            }
        }
    }

    fn set(&mut self, a: FighterId, b: FighterId, range: u32) {
        if a != b {
            self.ranges.insert(key(a, b), range.min(self.size));
        }
    }

    /// One step closer. Reaching range 0 puts `mover` in `target`'s place:
    /// the mover takes the target's range to every other fighter.
    pub fn decrease(&mut self, mover: FighterId, target: FighterId) {
        let current = self.get(mover, target);
        if current > 1 {
            self.set(mover, target, current - 1);
            return;
        }
        self.set(mover, target, 0);
        let others: Vec<FighterId> = self
            .members
            .iter()
            .copied()
            .filter(|f| *f != mover && *f != target)
            .collect();
        for other in others {
            let range = self.get(target, other);
            self.set(mover, other, range);
        }
    }

    /// One step farther, capped at the room size.
    pub fn increase(&mut self, mover: FighterId, target: FighterId) {
        let current = self.get(mover, target);
        self.set(mover, target, current.saturating_add(1));
    }

    /// `fighter` plus everyone directly at range 0 with them.
    pub fn engage_group(&self, fighter: FighterId) -> Vec<FighterId> {
        let mut group = vec![fighter];
        group.extend(
            self.members
                .iter()
                .copied()
                .filter(|other| *other != fighter && self.get(fighter, *other) == 0),
        );
        group
    }
}

/// Display name for a range value.
pub fn range_name(range: u32) -> &'static str {
    match range {
        0 => "Engaged",
        1 => "Very Close",
        2 => "Close",
        3 => "Medium-Close",
        4 => "Medium",
        5 => "Medium-Far",
        6 => "Far",
        7 => "Very Far",
        8 => "Distant",
        9 => "Very Distant",
        _ => "Remote",
    }
}

// Tuple keys are not valid map keys in most text formats.
#[cfg(feature = "serde")]
mod pairs {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::state::FighterId;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<(FighterId, FighterId), u32>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let entries: Vec<(FighterId, FighterId, u32)> =
            map.iter().map(|((a, b), r)| (*a, *b, *r)).collect();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<(FighterId, FighterId), u32>, D::Error> {
        let entries = Vec::<(FighterId, FighterId, u32)>::deserialize(deserializer)?;
        Ok(entries.into_iter().map(|(a, b, r)| ((a, b), r)).collect())
    }
}
