//! Read-only snapshots of a running encounter.
use serde::Serialize;

use arena_core::{Combatant, Encounter, FighterId, Phase, RangeMap, RoomInfo};

/// Copy of an encounter's visible state, taken between two engine calls.
#[derive(Clone, Debug, Serialize)]
pub struct EncounterView {
    pub room: RoomInfo,
    pub phase: Phase,
    /// Fighter whose turn it is.
    pub current: Option<FighterId>,
    /// Ticks left on the current turn.
    pub timer: u32,
    /// Turn order.
    pub combatants: Vec<Combatant>,
    pub ranges: RangeMap,
}

impl EncounterView {
    pub(crate) fn capture(encounter: &Encounter) -> Self {
        Self {
            room: encounter.room().clone(),
            phase: encounter.phase(),
            current: encounter.current(),
            timer: encounter.timer(),
            combatants: encounter.roster().iter().cloned().collect(),
            ranges: encounter.ranges().clone(),
        }
    }

    pub fn combatant(&self, id: FighterId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id() == id)
    }

    pub fn range(&self, a: FighterId, b: FighterId) -> u32 {
        self.ranges.get(a, b)
    }

    pub fn is_turn_of(&self, id: FighterId) -> bool {
        self.current == Some(id)
    }

    pub fn any_unresolved_attack(&self) -> bool {
        self.combatants.iter().any(|c| c.combat.incoming.is_some())
    }

    /// Standing fighters other than `id` and not on their ally list.
    pub fn opponents_of(&self, id: FighterId) -> impl Iterator<Item = &Combatant> {
        let me = self.combatant(id);
        self.combatants.iter().filter(move |c| {
            c.id() != id
                && !c.fighter.is_defeated()
                && !me.is_some_and(|m| m.fighter.is_ally(c.id()))
        })
    }
}
