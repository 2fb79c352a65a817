//! Fighters taking part in one encounter, in turn order.

use crate::env::FighterDirectory;

use super::{CombatState, Fighter, FighterId};

/// A fighter together with their encounter-scoped state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub fighter: Fighter,
    pub combat: CombatState,
}

impl Combatant {
    pub fn new(fighter: Fighter) -> Self {
        Self {
            fighter,
            combat: CombatState::default(),
        }
    }

    pub fn id(&self) -> FighterId {
        self.fighter.id
    }
}

/// Turn-ordered combatants. Grows on join, never shrinks while active.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roster {
    combatants: Vec<Combatant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, combatant: Combatant) {
        self.combatants.push(combatant);
    }

    pub fn insert(&mut self, index: usize, combatant: Combatant) {
        self.combatants.insert(index, combatant);
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    pub fn contains(&self, id: FighterId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: FighterId) -> Option<usize> {
        self.combatants.iter().position(|c| c.id() == id)
    }

    pub fn get(&self, id: FighterId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id() == id)
    }

    pub fn get_mut(&mut self, id: FighterId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id() == id)
    }

    pub fn at(&self, index: usize) -> Option<&Combatant> {
        self.combatants.get(index)
    }

    pub fn ids(&self) -> Vec<FighterId> {
        self.combatants.iter().map(Combatant::id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.combatants.iter_mut()
    }

    /// Reorders combatants by descending key. The sort is stable, so equal
    /// keys keep their current relative order.
    pub fn sort_by_key_desc(&mut self, mut key: impl FnMut(&Combatant) -> u32) {
        let mut keyed: Vec<(u32, Combatant)> = self
            .combatants
            .drain(..)
            .map(|c| (key(&c), c))
            .collect();
        keyed.sort_by(|a, b| b.0.cmp(&a.0));
        self.combatants = keyed.into_iter().map(|(_, c)| c).collect();
    }

    /// Fighters with HP left.
    pub fn standing(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter().filter(|c| !c.fighter.is_defeated())
    }

    pub fn any_unresolved_attack(&self) -> bool {
        self.combatants.iter().any(|c| c.combat.incoming.is_some())
    }

    /// Consumes the roster, returning the persistent fighters.
    pub fn into_fighters(self) -> Vec<Fighter> {
        self.combatants.into_iter().map(|c| c.fighter).collect()
    }
}

impl FighterDirectory for Roster {
    /// Case-insensitive: an exact name wins, otherwise the first fighter whose
    /// name starts with the query.
    fn resolve(&self, query: &str) -> Option<FighterId> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        let names = || self.combatants.iter().map(|c| (c.id(), c.fighter.name.to_lowercase()));
        names()
            .find(|(_, name)| *name == query)
            .or_else(|| names().find(|(_, name)| name.starts_with(&query)))
            .map(|(id, _)| id)
    }

    fn name_of(&self, id: FighterId) -> Option<String> {
        self.get(id).map(|c| c.fighter.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Stats;

    fn roster() -> Roster {
        let mut roster = Roster::new();
        for (id, name) in [(1, "Alice"), (2, "Alicia"), (3, "Bob")] {
            roster.push(Combatant::new(Fighter::new(FighterId(id), name, Stats::ZERO)));
        }
        roster
    }

    #[test]
    fn resolve_prefers_exact_names() {
        let roster = roster();
        assert_eq!(roster.resolve("alicia"), Some(FighterId(2)));
        assert_eq!(roster.resolve("ali"), Some(FighterId(1)));
        assert_eq!(roster.resolve("BOB"), Some(FighterId(3)));
        assert_eq!(roster.resolve("carol"), None);
        assert_eq!(roster.resolve("  "), None);
    }

    #[test]
    fn stable_sort_keeps_ties_in_place() {
        let mut roster = roster();
        roster.sort_by_key_desc(|c| if c.id() == FighterId(3) { 9 } else { 1 });
        assert_eq!(roster.ids(), vec![FighterId(3), FighterId(1), FighterId(2)]);
    }

    #[test]
    fn standing_skips_defeated() {
        let mut roster = roster();
        roster.get_mut(FighterId(1)).unwrap().fighter.take_damage(100);
        let standing: Vec<_> = roster.standing().map(Combatant::id).collect();
        assert_eq!(standing, vec![FighterId(2), FighterId(3)]);
    }
}
