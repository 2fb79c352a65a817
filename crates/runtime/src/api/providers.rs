//! Asynchronous abstraction for sourcing fighter intent.
//!
//! Runtime users plug in [`CommandProvider`] implementations so fights can
//! run with scripted fixtures or simple bots in place of human players.
use async_trait::async_trait;

use arena_core::{FighterId, PlayerCommand};

use super::view::EncounterView;

/// Trait for deciding what a fighter does next.
///
/// Different implementations can handle:
/// - NPC or bot decisions
/// - Scripted/replayed commands
/// - Testing fixtures
#[async_trait]
pub trait CommandProvider: Send + Sync {
    /// Next command for `fighter`, or `None` to wait for something to
    /// change.
    ///
    /// Called whenever `fighter` has an attack to answer or it is their
    /// turn. `view` is taken just before the call.
    async fn next_command(&self, fighter: FighterId, view: &EncounterView)
    -> Option<PlayerCommand>;
}

/// Provider that ends every turn straight away and defends every attack.
/// Useful for testing or as a fallback.
pub struct PassiveProvider;

#[async_trait]
impl CommandProvider for PassiveProvider {
    async fn next_command(
        &self,
        fighter: FighterId,
        view: &EncounterView,
    ) -> Option<PlayerCommand> {
        let me = view.combatant(fighter)?;
        if me.combat.incoming.is_some() {
            return Some(PlayerCommand::Defend);
        }
        if view.is_turn_of(fighter) && !view.any_unresolved_attack() && !me.combat.is_spent() {
            return Some(PlayerCommand::Pass { message: None });
        }
        None
    }
}
