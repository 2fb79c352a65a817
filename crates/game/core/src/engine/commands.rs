//! Player commands and their execution against an encounter.

use std::collections::BTreeSet;

use crate::combat::{DefenseAction, attack_type_check, fill_template};
use crate::condition::ConditionKind;
use crate::env::FighterDirectory;
use crate::notice::{NoticeKind, RangeLine};
use crate::range::{Direction, MoveMode};
use crate::special::EffectKind;
use crate::state::{AttackType, Fighter, FighterId, LastAction};

use super::{CheckError, Checks, CommandError, Encounter};

/// How far to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Steps {
    Count(u32),
    /// Everything left in the move budget.
    All,
}

impl Default for Steps {
    fn default() -> Self {
        Self::Count(1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AllyOp {
    List,
    Add(String),
    Remove(String),
}

/// Everything a fighter can ask the engine to do.
///
/// Targets are the names the player typed; they are resolved through the
/// [`FighterDirectory`] passed to [`Encounter::execute`]. `message` fields
/// are optional `<self>`/`<target>` templates replacing the default text.
#[derive(Clone, Debug, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "command", rename_all = "snake_case"))]
pub enum PlayerCommand {
    Attack {
        target: String,
        message: Option<String>,
    },
    Second {
        target: String,
        message: Option<String>,
    },
    Defend,
    Endure,
    Approach {
        target: String,
        steps: Steps,
    },
    Withdraw {
        target: String,
        steps: Steps,
    },
    Dash {
        message: Option<String>,
    },
    Charge {
        special: String,
        message: Option<String>,
    },
    Special {
        name: String,
        target: Option<String>,
        message: Option<String>,
    },
    Pass {
        message: Option<String>,
    },
    Disengage {
        message: Option<String>,
    },
    Range {
        target: Option<String>,
    },
    Ally {
        op: AllyOp,
    },
}

impl Encounter {
    /// Runs one player command to completion.
    ///
    /// A rejected command returns the reason and leaves the encounter
    /// untouched.
    pub fn execute(
        &mut self,
        caller: FighterId,
        command: PlayerCommand,
        directory: &dyn FighterDirectory,
    ) -> Result<(), CommandError> {
        tracing::debug!(fighter = %caller, command = command.as_ref(), "executing command");
        match command {
            PlayerCommand::Attack { target, message } => {
                self.attack(caller, &target, message.as_deref(), directory)?;
                self.prompt(caller);
            }
            PlayerCommand::Second { target, message } => {
                self.second(caller, &target, message.as_deref(), directory)?;
                self.prompt(caller);
            }
            PlayerCommand::Defend => self.defend(caller, DefenseAction::Defend, directory)?,
            PlayerCommand::Endure => self.defend(caller, DefenseAction::Endure, directory)?,
            PlayerCommand::Approach { target, steps } => {
                self.step(caller, Direction::Approach, &target, steps, directory)?;
                self.prompt(caller);
            }
            PlayerCommand::Withdraw { target, steps } => {
                self.step(caller, Direction::Withdraw, &target, steps, directory)?;
                self.prompt(caller);
            }
            PlayerCommand::Dash { message } => {
                self.dash(caller, message.as_deref(), directory)?;
                self.prompt(caller);
            }
            PlayerCommand::Charge { special, message } => {
                self.charge(caller, &special, message.as_deref(), directory)?;
                self.prompt(caller);
            }
            PlayerCommand::Special {
                name,
                target,
                message,
            } => {
                self.special(
                    caller,
                    &name,
                    target.as_deref(),
                    message.as_deref(),
                    directory,
                )?;
                self.prompt(caller);
            }
            PlayerCommand::Pass { message } => {
                self.end_turn(caller, LastAction::Pass, message.as_deref(), directory)?
            }
            PlayerCommand::Disengage { message } => {
                self.end_turn(caller, LastAction::Disengage, message.as_deref(), directory)?
            }
            PlayerCommand::Range { target } => {
                self.range_report(caller, target.as_deref(), directory)?
            }
            PlayerCommand::Ally { op } => {
                self.ally(caller, &op, directory)?;
            }
        }
        Ok(())
    }

    /// Edits the caller's ally list mid-fight. The result is whispered to the
    /// caller and also returned.
    pub fn ally(
        &mut self,
        caller: FighterId,
        op: &AllyOp,
        directory: &dyn FighterDirectory,
    ) -> Result<NoticeKind, CommandError> {
        self.check(caller, Checks::IN_COMBAT, "ally", None, directory)?;
        let combatant = self.combatant_mut(caller)?;
        let notice = apply_ally(&mut combatant.fighter, op, directory)?;
        self.outbox.whisper(caller, notice.clone());
        Ok(notice)
    }

    /// Runs `checks` and returns the target they resolved.
    pub(crate) fn require_target(
        &self,
        caller: FighterId,
        checks: Checks,
        verb: &str,
        target: Option<&str>,
        directory: &dyn FighterDirectory,
    ) -> Result<FighterId, CheckError> {
        self.check(
            caller,
            checks | Checks::NEEDS_TARGET,
            verb,
            target,
            directory,
        )?
        .ok_or(CheckError::NeedTarget)
    }

    /// Filled flavour text, or `None` when the player gave none.
    pub(crate) fn flavour(
        &self,
        caller: FighterId,
        message: Option<&str>,
        target: Option<FighterId>,
    ) -> Option<String> {
        let message = message.map(str::trim).filter(|m| !m.is_empty())?;
        Some(self.render(caller, message, target))
    }

    pub(crate) fn render(
        &self,
        caller: FighterId,
        template: &str,
        target: Option<FighterId>,
    ) -> String {
        let name = |id: FighterId| {
            self.roster
                .get(id)
                .map_or_else(|| id.to_string(), |c| c.fighter.name.clone())
        };
        let target = target.map(&name);
        fill_template(template, &name(caller), target.as_deref())
    }

    fn attack(
        &mut self,
        caller: FighterId,
        target: &str,
        message: Option<&str>,
        directory: &dyn FighterDirectory,
    ) -> Result<(), CommandError> {
        let target =
            self.require_target(caller, Checks::TARGETED_ACTION, "attack", Some(target), directory)?;
        let kind = AttackType::for_range(self.ranges.get(caller, target));
        attack_type_check(&self.roster, &self.ranges, caller, target, kind, &[])?;

        self.battle()
            .queue_attack(caller, target, message, &[], kind);
        let combatant = self.combatant_mut(caller)?;
        combatant.combat.actions = combatant.combat.actions.saturating_sub(1);
        combatant.combat.last_action = Some(LastAction::Attack);
        Ok(())
    }

    fn second(
        &mut self,
        caller: FighterId,
        target: &str,
        message: Option<&str>,
        directory: &dyn FighterDirectory,
    ) -> Result<(), CommandError> {
        let second = self
            .roster
            .get(caller)
            .filter(|_| self.is_active())
            .ok_or(CheckError::NotInCombat)?
            .combat
            .second
            .clone()
            .ok_or(CommandError::NoSecondAttack)?;
        let checks = Checks::TARGETED_ACTION.difference(Checks::HAS_ACTION);
        let target = self.require_target(caller, checks, "attack", Some(target), directory)?;
        attack_type_check(
            &self.roster,
            &self.ranges,
            caller,
            target,
            second.kind,
            &second.effects,
        )?;

        self.combatant_mut(caller)?.combat.second = None;
        self.battle()
            .queue_attack(caller, target, message, &second.effects, second.kind);
        Ok(())
    }

    fn defend(
        &mut self,
        caller: FighterId,
        action: DefenseAction,
        directory: &dyn FighterDirectory,
    ) -> Result<(), CommandError> {
        let verb = match action {
            DefenseAction::Defend => "defend",
            DefenseAction::Endure => "endure",
        };
        self.check(caller, Checks::IN_COMBAT, verb, None, directory)?;
        self.battle()
            .resolve_defense(caller, action, &[])
            .ok_or(CommandError::NoIncomingAttack)?;
        Ok(())
    }

    fn step(
        &mut self,
        caller: FighterId,
        direction: Direction,
        target: &str,
        steps: Steps,
        directory: &dyn FighterDirectory,
    ) -> Result<(), CommandError> {
        let base = Checks::TURN | Checks::HAS_MOVE | Checks::TARGET_NOT_SELF | Checks::TARGET_IN_FIGHT;
        let (checks, verb) = match direction {
            Direction::Approach => (base | Checks::TARGET_NOT_ENGAGED, "approach"),
            Direction::Withdraw => (base, "withdraw"),
        };
        let target = self.require_target(caller, checks, verb, Some(target), directory)?;
        if direction == Direction::Withdraw && self.ranges.get(caller, target) >= self.ranges.size() {
            return Err(CommandError::CannotWithdrawFarther);
        }

        let moves = self.combatant_mut(caller)?.combat.moves;
        let steps = match steps {
            Steps::All => moves,
            Steps::Count(0) => 1,
            Steps::Count(n) => n,
        };
        if steps > moves {
            return Err(CommandError::TooManySteps);
        }

        self.battle()
            .move_fighter(direction, caller, target, steps, MoveMode::Normal);
        Ok(())
    }

    fn dash(
        &mut self,
        caller: FighterId,
        message: Option<&str>,
        directory: &dyn FighterDirectory,
    ) -> Result<(), CommandError> {
        self.check(caller, Checks::TURN | Checks::HAS_ACTION, "dash", None, directory)?;
        let text = self.flavour(caller, message, None);

        let combatant = self.combatant_mut(caller)?;
        if combatant
            .combat
            .conditions
            .has(ConditionKind::Immobilization)
        {
            return Err(CommandError::Immobilized);
        }
        let bonus = combatant.fighter.stats().dash_moves();
        combatant.combat.moves = combatant.combat.moves.saturating_add(bonus);
        combatant.combat.actions = combatant.combat.actions.saturating_sub(1);
        combatant.combat.last_action = Some(LastAction::Dash);

        self.outbox.broadcast(NoticeKind::Dashed {
            fighter: caller,
            text,
            bonus,
        });
        Ok(())
    }

    fn charge(
        &mut self,
        caller: FighterId,
        special: &str,
        message: Option<&str>,
        directory: &dyn FighterDirectory,
    ) -> Result<(), CommandError> {
        self.check(caller, Checks::TURN | Checks::HAS_ACTION, "charge", None, directory)?;
        let query = special.trim();
        if query.is_empty() {
            return Err(CommandError::NeedSpecialName);
        }
        let text = self.flavour(caller, message, None);

        let combatant = self.combatant_mut(caller)?;
        let special = combatant
            .fighter
            .loadout()
            .find(query)
            .ok_or(CommandError::UnknownSpecial)?;
        if !special.has(EffectKind::ChargeMove) {
            return Err(CommandError::NoChargeNeeded);
        }
        if combatant.combat.is_charged(&special.name) {
            return Err(CommandError::AlreadyCharged);
        }
        let name = special.name.clone();
        combatant.combat.charged.insert(name.to_lowercase());
        combatant.combat.actions = combatant.combat.actions.saturating_sub(1);
        combatant.combat.last_action = Some(LastAction::Charge);

        self.outbox.broadcast(NoticeKind::Charged {
            fighter: caller,
            text,
            special: name,
        });
        Ok(())
    }

    fn end_turn(
        &mut self,
        caller: FighterId,
        last: LastAction,
        message: Option<&str>,
        directory: &dyn FighterDirectory,
    ) -> Result<(), CommandError> {
        let checks = Checks::IN_COMBAT | Checks::IS_TURN | Checks::ATTACKS_RESOLVED;
        let verb = match last {
            LastAction::Disengage => "disengage",
            _ => "pass",
        };
        self.check(caller, checks, verb, None, directory)?;
        let text = self.flavour(caller, message, None);

        let combatant = self.combatant_mut(caller)?;
        combatant.combat.actions = 0;
        combatant.combat.moves = 0;
        combatant.combat.second = None;
        combatant.combat.last_action = Some(last);

        let notice = match last {
            LastAction::Disengage => NoticeKind::Disengaged {
                fighter: caller,
                text,
            },
            _ => NoticeKind::Passed {
                fighter: caller,
                text,
            },
        };
        self.outbox.broadcast(notice);
        Ok(())
    }

    /// Ranges from `caller` to one fighter, or to everyone grouped by who
    /// is engaged with whom.
    fn range_report(
        &mut self,
        caller: FighterId,
        target: Option<&str>,
        directory: &dyn FighterDirectory,
    ) -> Result<(), CommandError> {
        self.check(caller, Checks::IN_COMBAT, "check range", None, directory)?;

        let single = target
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .and_then(|q| directory.resolve(q))
            .filter(|id| *id != caller && self.ranges.contains(*id));
        let lines = match single {
            Some(target) => vec![RangeLine {
                fighters: vec![target],
                range: self.ranges.get(caller, target),
            }],
            None => {
                let mut seen = BTreeSet::from([caller]);
                let mut lines = Vec::new();
                for other in self.roster.ids() {
                    if seen.contains(&other) {
                        continue;
                    }
                    let fighters: Vec<FighterId> = self
                        .ranges
                        .engage_group(other)
                        .into_iter()
                        .filter(|id| seen.insert(*id))
                        .collect();
                    lines.push(RangeLine {
                        fighters,
                        range: self.ranges.get(caller, other),
                    });
                }
                lines
            }
        };
        self.outbox
            .whisper(caller, NoticeKind::RangeReport { lines });
        Ok(())
    }
}

/// Edits or lists `fighter`'s allies. Shared by in-fight and out-of-fight
/// callers, since allies persist between encounters.
pub fn apply_ally(
    fighter: &mut Fighter,
    op: &AllyOp,
    directory: &dyn FighterDirectory,
) -> Result<NoticeKind, CommandError> {
    let resolve = |query: &str| -> Result<(FighterId, String), CommandError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CommandError::InvalidAllyTarget);
        }
        let id = directory
            .resolve(query)
            .ok_or(CommandError::InvalidAllyTarget)?;
        let name = directory
            .name_of(id)
            .unwrap_or_else(|| query.to_string());
        Ok((id, name))
    };

    match op {
        AllyOp::List => Ok(NoticeKind::AllyList {
            allies: fighter.allies().collect(),
        }),
        AllyOp::Add(query) => {
            let (other, name) = resolve(query)?;
            if !fighter.add_ally(other) {
                return Err(CommandError::AlreadyAlly { name });
            }
            Ok(NoticeKind::AllyAdded { other })
        }
        AllyOp::Remove(query) => {
            let (other, name) = resolve(query)?;
            if !fighter.remove_ally(other) {
                return Err(CommandError::NotAlly { name });
            }
            Ok(NoticeKind::AllyRemoved { other })
        }
    }
}
