//! Named preconditions every command runs before touching state.

use bitflags::bitflags;

use crate::env::FighterDirectory;
use crate::state::FighterId;

use super::{CheckError, Encounter};

bitflags! {
    /// Preconditions a command requires. Evaluated in declaration order; the
    /// first failure is reported.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Checks: u16 {
        const IN_COMBAT          = 1 << 0;
        const HAS_HP             = 1 << 1;
        const IS_TURN            = 1 << 2;
        const HAS_ACTION         = 1 << 3;
        const HAS_MOVE           = 1 << 4;
        const ATTACKS_RESOLVED   = 1 << 5;
        const NEEDS_TARGET       = 1 << 6;
        const TARGET_NOT_SELF    = 1 << 7;
        const TARGET_IN_FIGHT    = 1 << 8;
        const TARGET_NOT_ENGAGED = 1 << 9;
        const TARGET_HAS_HP      = 1 << 10;
    }
}

impl Checks {
    /// Caller may act at all on their own turn.
    pub const TURN: Self = Self::IN_COMBAT
        .union(Self::IS_TURN)
        .union(Self::HAS_HP)
        .union(Self::ATTACKS_RESOLVED);

    /// An action against another living fighter in the fight.
    pub const TARGETED_ACTION: Self = Self::TURN
        .union(Self::HAS_ACTION)
        .union(Self::NEEDS_TARGET)
        .union(Self::TARGET_NOT_SELF)
        .union(Self::TARGET_IN_FIGHT)
        .union(Self::TARGET_HAS_HP);
}

impl Encounter {
    /// Runs `checks` for `caller` using `verb` in messages.
    ///
    /// Returns the resolved target when `NEEDS_TARGET` is requested.
    pub fn check(
        &self,
        caller: FighterId,
        checks: Checks,
        verb: &str,
        target: Option<&str>,
        directory: &dyn FighterDirectory,
    ) -> Result<Option<FighterId>, CheckError> {
        let combatant = match self.roster.get(caller) {
            Some(c) if self.is_active() => c,
            _ if checks.contains(Checks::IN_COMBAT) => return Err(CheckError::NotInCombat),
            _ => return Ok(None),
        };

        if checks.contains(Checks::HAS_HP) && combatant.fighter.is_defeated() {
            return Err(CheckError::Defeated {
                action: verb.to_string(),
            });
        }
        if checks.contains(Checks::IS_TURN) && self.current() != Some(caller) {
            return Err(CheckError::NotYourTurn {
                action: verb.to_string(),
            });
        }
        if checks.contains(Checks::HAS_ACTION) && combatant.combat.actions == 0 {
            return Err(CheckError::NoAction);
        }
        if checks.contains(Checks::HAS_MOVE) && combatant.combat.moves == 0 {
            return Err(CheckError::NoMoves);
        }
        if checks.contains(Checks::ATTACKS_RESOLVED) && self.roster.any_unresolved_attack() {
            return Err(CheckError::AttacksPending);
        }
        if !checks.contains(Checks::NEEDS_TARGET) {
            return Ok(None);
        }

        let query = target
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .ok_or(CheckError::NeedTarget)?;
        let target = directory.resolve(query).ok_or(CheckError::InvalidTarget)?;
        let name = || {
            directory
                .name_of(target)
                .unwrap_or_else(|| target.to_string())
        };

        if checks.contains(Checks::TARGET_NOT_SELF) && target == caller {
            let action = if verb == "withdraw" {
                "withdraw from"
            } else {
                verb
            };
            return Err(CheckError::TargetSelf {
                action: action.to_string(),
            });
        }
        let in_fight = self.roster.get(target);
        if checks.contains(Checks::TARGET_IN_FIGHT) && in_fight.is_none() {
            return Err(CheckError::TargetNotInFight { name: name() });
        }
        if checks.contains(Checks::TARGET_NOT_ENGAGED)
            && in_fight.is_some()
            && self.ranges.get(caller, target) == 0
        {
            return Err(CheckError::TargetEngaged { name: name() });
        }
        if checks.contains(Checks::TARGET_HAS_HP)
            && in_fight.is_some_and(|c| c.fighter.is_defeated())
        {
            return Err(CheckError::TargetDefeated { name: name() });
        }
        Ok(Some(target))
    }
}
