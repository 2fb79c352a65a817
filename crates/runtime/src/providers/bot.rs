//! A small rule-based fighter for demonstrations and soak tests.
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arena_core::{Combatant, FighterId, PlayerCommand, Steps};

use crate::api::{CommandProvider, EncounterView};

/// Closes on the nearest opponent and hits it.
///
/// Defends every attack (endures when it has no defense to roll), attacks
/// whatever it legally can, approaches when it would rather fight in melee,
/// dashes when out of movement, and passes when nothing is left. Ties
/// between equally close opponents are broken at random.
pub struct BotProvider {
    rng: Mutex<StdRng>,
}

impl BotProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn pick<'a>(&self, candidates: &[&'a Combatant]) -> Option<&'a Combatant> {
        if candidates.is_empty() {
            return None;
        }
        let index = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .random_range(0..candidates.len());
        candidates.get(index).copied()
    }

    fn turn_command(&self, me: &Combatant, view: &EncounterView) -> PlayerCommand {
        let id = me.id();
        let opponents: Vec<&Combatant> = view.opponents_of(id).collect();
        let Some(nearest) = opponents.iter().map(|c| view.range(id, c.id())).min() else {
            return PlayerCommand::Disengage { message: None };
        };
        let closest: Vec<&Combatant> = opponents
            .iter()
            .copied()
            .filter(|c| view.range(id, c.id()) == nearest)
            .collect();
        let Some(target) = self.pick(&closest) else {
            return PlayerCommand::Pass { message: None };
        };
        let name = target.fighter.name.clone();
        let stats = me.fighter.stats();
        let engaged = nearest == 0;

        if me.combat.second.is_some() {
            return PlayerCommand::Second {
                target: name,
                message: None,
            };
        }
        if me.combat.actions > 0 {
            let can_melee = engaged && stats.atm > 0;
            let can_shoot = !engaged && stats.atr > 0;
            if can_melee || can_shoot {
                return PlayerCommand::Attack {
                    target: name,
                    message: None,
                };
            }
        }
        let prefers_melee = stats.atm >= stats.atr;
        if !engaged && prefers_melee {
            if me.combat.moves > 0 {
                return PlayerCommand::Approach {
                    target: name,
                    steps: Steps::All,
                };
            }
            if me.combat.actions > 0 && stats.mob > 0 {
                return PlayerCommand::Dash { message: None };
            }
        }
        PlayerCommand::Pass { message: None }
    }
}

impl Default for BotProvider {
    fn default() -> Self {
        Self::new(rand::random())
    }
}

#[async_trait]
impl CommandProvider for BotProvider {
    async fn next_command(
        &self,
        fighter: FighterId,
        view: &EncounterView,
    ) -> Option<PlayerCommand> {
        let me = view.combatant(fighter)?;
        if me.fighter.is_defeated() {
            return None;
        }
        if me.combat.incoming.is_some() {
            return Some(if me.fighter.stats().def > 0 {
                PlayerCommand::Defend
            } else {
                PlayerCommand::Endure
            });
        }
        if !view.is_turn_of(fighter) || view.any_unresolved_attack() || me.combat.is_spent() {
            return None;
        }
        Some(self.turn_command(me, view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{
        ArenaConfig, Encounter, Fighter, RoomId, RoomInfo, ScriptedRng, Stats,
    };

    fn fighter(id: u32, name: &str, atm: u8, atr: u8) -> Fighter {
        let stats = Stats::new(atm, 4, 5, atr, 4, 3).unwrap();
        Fighter::new(FighterId(id), name, stats)
    }

    /// Ann moves first; everyone starts at range 2 in a size-5 room.
    fn view_of(fighters: Vec<Fighter>) -> EncounterView {
        let room = RoomInfo::new(RoomId(1), "Pit", 5);
        let rolls = std::iter::repeat_n(500, 1).chain(std::iter::repeat(1));
        let mut encounter =
            Encounter::new(room, ArenaConfig::new(), Box::new(ScriptedRng::new(rolls)));
        for f in fighters {
            encounter.enlist(f).unwrap();
        }
        encounter.start(FighterId(1)).unwrap();
        EncounterView::capture(&encounter)
    }

    #[tokio::test]
    async fn brawler_closes_the_distance() {
        let view = view_of(vec![fighter(1, "Ann", 6, 0), fighter(2, "Bo", 4, 4)]);
        let bot = BotProvider::new(1);
        let command = bot.next_command(FighterId(1), &view).await;
        assert_eq!(
            command,
            Some(PlayerCommand::Approach {
                target: "Bo".into(),
                steps: Steps::All,
            })
        );
    }

    #[tokio::test]
    async fn archer_shoots_from_range() {
        let view = view_of(vec![fighter(1, "Ann", 0, 6), fighter(2, "Bo", 4, 4)]);
        let bot = BotProvider::new(1);
        let command = bot.next_command(FighterId(1), &view).await;
        assert!(matches!(command, Some(PlayerCommand::Attack { ref target, .. }) if target == "Bo"));
    }

    #[tokio::test]
    async fn waits_when_it_is_not_its_turn() {
        let view = view_of(vec![fighter(1, "Ann", 6, 0), fighter(2, "Bo", 4, 4)]);
        let bot = BotProvider::new(1);
        assert_eq!(bot.next_command(FighterId(2), &view).await, None);
    }
}
