//! Plain-text rendering of engine notices.
use std::collections::BTreeMap;

use arena_core::{
    Audience, Direction, EffectList, EncounterOutcome, FighterId, MoveMode, NoticeKind,
    range_name,
};
use arena_runtime::CombatEvent;

/// Turns notices into transcript lines, naming fighters as it goes.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    names: BTreeMap<FighterId, String>,
}

impl Transcript {
    pub fn new(names: impl IntoIterator<Item = (FighterId, String)>) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }

    fn name(&self, id: FighterId) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("#{}", id.0))
    }

    fn names(&self, ids: &[FighterId]) -> String {
        ids.iter()
            .map(|id| self.name(*id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// One line per event. Whispers are prefixed with their recipient.
    pub fn line(&self, event: &CombatEvent) -> String {
        let text = self.describe(&event.notice.kind);
        match event.notice.audience {
            Audience::All => text,
            Audience::Fighter(id) => format!("[to {}] {}", self.name(id), text),
        }
    }

    pub fn describe(&self, kind: &NoticeKind) -> String {
        match kind {
            NoticeKind::FightStarted { instigator } => {
                format!("{} starts a fight!", self.name(*instigator))
            }
            NoticeKind::Joined { fighter } => format!("{} joins the fight!", self.name(*fighter)),
            NoticeKind::TurnOrder { order } => format!("Turn order: {}", self.names(order)),
            NoticeKind::TurnStarted { previous, current } => match previous {
                Some(previous) => format!(
                    "{}'s turn is over. It is now {}'s turn.",
                    self.name(*previous),
                    self.name(*current)
                ),
                None => format!("It is {}'s turn.", self.name(*current)),
            },
            NoticeKind::Prompt {
                hp,
                hp_max,
                sp,
                sp_max,
                actions,
                moves,
            } => format!(
                "HP {hp}/{hp_max}  SP {sp}/{sp_max}  actions {actions}  moves {moves}"
            ),
            NoticeKind::TurnWarning => "Your turn is almost over!".to_string(),
            NoticeKind::TimedOut { fighter } => {
                format!("{} ran out of time.", self.name(*fighter))
            }
            NoticeKind::EncounterEnded { outcome } => match outcome {
                EncounterOutcome::AllDisengaged => {
                    "Everyone has disengaged. The fight is over.".to_string()
                }
                EncounterOutcome::Winner(winner) => {
                    format!("{} is the last one standing!", self.name(*winner))
                }
                EncounterOutcome::NoSurvivors => "Nobody is left standing.".to_string(),
                EncounterOutcome::Stopped => "The fight was stopped.".to_string(),
            },

            NoticeKind::ConditionActive { kind } => format!("You are affected by {kind}."),
            NoticeKind::ConditionApplied { fighter, kind } => {
                format!("{} gains {kind}.", self.name(*fighter))
            }
            NoticeKind::ConditionExpired { fighter, kind } => {
                format!("{}'s {kind} wears off.", self.name(*fighter))
            }

            NoticeKind::AttackQueued {
                text,
                roll,
                kind,
                effects,
                ..
            } => format!("{text} ({kind}, roll {roll}{})", effect_suffix(effects)),
            NoticeKind::SecondAttackReady => "You can make a second attack!".to_string(),
            NoticeKind::IncomingAttack { attacker } => {
                format!("{} is attacking you! Defend or endure.", self.name(*attacker))
            }
            NoticeKind::DefenseWarning { attacker } => format!(
                "Hurry! {}'s attack is about to land.",
                self.name(*attacker)
            ),
            NoticeKind::AutoDefend => "You defend on reflex.".to_string(),
            NoticeKind::Defended {
                defender,
                attacker,
                roll,
            } => match roll {
                Some(roll) => format!(
                    "{} defends against {} (roll {roll}).",
                    self.name(*defender),
                    self.name(*attacker)
                ),
                None => format!(
                    "{} shrugs off {}'s attack.",
                    self.name(*defender),
                    self.name(*attacker)
                ),
            },
            NoticeKind::DamageTaken {
                defender,
                attacker,
                damage,
                roll,
            } => {
                let roll = roll.map(|r| format!(" (defense roll {r})")).unwrap_or_default();
                format!(
                    "{} takes {damage} damage from {}{roll}.",
                    self.name(*defender),
                    self.name(*attacker)
                )
            }
            NoticeKind::Reflected {
                defender,
                attacker,
                roll,
                effects,
            } => format!(
                "{} turns {}'s attack back on them (roll {roll}{})",
                self.name(*defender),
                self.name(*attacker),
                effect_suffix(effects)
            ),
            NoticeKind::HpLost { fighter, amount } => {
                format!("{} loses {amount} HP.", self.name(*fighter))
            }
            NoticeKind::Healed { fighter, amount } => {
                format!("{} recovers {amount} HP.", self.name(*fighter))
            }
            NoticeKind::SpRestored { fighter, amount } => {
                format!("{} recovers {amount} SP.", self.name(*fighter))
            }
            NoticeKind::Defeated { fighter } => format!("{} is defeated!", self.name(*fighter)),

            NoticeKind::Moved(summary) => {
                let verb = match (summary.direction, summary.mode) {
                    (Direction::Approach, MoveMode::Forced) => "is pulled toward",
                    (Direction::Withdraw, MoveMode::Forced) => "is knocked away from",
                    (Direction::Approach, _) => "approaches",
                    (Direction::Withdraw, _) => "withdraws from",
                };
                let mut line = format!(
                    "{} {verb} {} ({} step{}), now {}.",
                    self.name(summary.mover),
                    self.name(summary.target),
                    summary.moved,
                    if summary.moved == 1 { "" } else { "s" },
                    range_name(summary.final_range)
                );
                if summary.blocked > 0 {
                    line.push_str(&format!(" Blocked by {}.", self.names(&summary.blockers)));
                }
                line
            }
            NoticeKind::Dashed {
                fighter,
                text,
                bonus,
            } => with_text(
                format!("{} dashes for {bonus} extra moves.", self.name(*fighter)),
                text.as_deref(),
            ),
            NoticeKind::Surged { fighter, bonus } => {
                format!("{} surges forward with {bonus} extra moves.", self.name(*fighter))
            }
            NoticeKind::Immobilized => "You are immobilized and cannot move.".to_string(),
            NoticeKind::Charged {
                fighter,
                text,
                special,
            } => with_text(
                format!("{} charges {special}.", self.name(*fighter)),
                text.as_deref(),
            ),
            NoticeKind::SpecialUsed {
                fighter,
                special,
                cost,
                text,
                effects,
            } => with_text(
                format!(
                    "{} uses {special} for {cost} SP{}",
                    self.name(*fighter),
                    effect_suffix(effects)
                ),
                text.as_deref(),
            ),
            NoticeKind::Passed { fighter, text } => {
                with_text(format!("{} passes.", self.name(*fighter)), text.as_deref())
            }
            NoticeKind::Disengaged { fighter, text } => {
                with_text(format!("{} disengages.", self.name(*fighter)), text.as_deref())
            }

            NoticeKind::AllyAdded { other } => format!("{} is now your ally.", self.name(*other)),
            NoticeKind::AllyRemoved { other } => {
                format!("{} is no longer your ally.", self.name(*other))
            }
            NoticeKind::AllyList { allies } if allies.is_empty() => {
                "You have no allies.".to_string()
            }
            NoticeKind::AllyList { allies } => format!("Allies: {}", self.names(allies)),
            NoticeKind::RangeReport { lines } => lines
                .iter()
                .map(|line| format!("{}: {}", self.names(&line.fighters), range_name(line.range)))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

fn effect_suffix(effects: &EffectList) -> String {
    if effects.is_empty() {
        return String::new();
    }
    let names: Vec<String> = effects.iter().map(ToString::to_string).collect();
    format!(", {}", names.join(" + "))
}

fn with_text(line: String, text: Option<&str>) -> String {
    match text {
        Some(text) => format!("{line} \"{text}\""),
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{EffectKind, MovementSummary, Notice, RangeLine, RoomId};

    const ANN: FighterId = FighterId(1);
    const BO: FighterId = FighterId(2);

    fn transcript() -> Transcript {
        Transcript::new([(ANN, "Ann".to_string()), (BO, "Bo".to_string())])
    }

    #[test]
    fn whispers_name_their_recipient() {
        let event = CombatEvent {
            room: RoomId(1),
            notice: Notice {
                audience: Audience::Fighter(BO),
                kind: NoticeKind::IncomingAttack { attacker: ANN },
            },
        };
        assert_eq!(
            transcript().line(&event),
            "[to Bo] Ann is attacking you! Defend or endure."
        );
    }

    #[test]
    fn attacks_list_their_effects() {
        let mut effects = EffectList::new();
        effects.push(EffectKind::LungeAttack);
        let line = transcript().describe(&NoticeKind::AttackQueued {
            attacker: ANN,
            target: BO,
            text: "Ann attacks Bo!".to_string(),
            roll: 4,
            kind: arena_core::AttackType::Melee,
            effects,
        });
        assert_eq!(line, "Ann attacks Bo! (melee, roll 4, Lunge Attack)");
    }

    #[test]
    fn movement_reports_blockers_and_range() {
        let line = transcript().describe(&NoticeKind::Moved(MovementSummary {
            mover: ANN,
            target: BO,
            direction: Direction::Approach,
            mode: MoveMode::Normal,
            moved: 1,
            blocked: 1,
            blockers: vec![FighterId(9)],
            final_range: 2,
        }));
        assert_eq!(line, "Ann approaches Bo (1 step), now Close. Blocked by #9.");
    }

    #[test]
    fn range_reports_group_fighters() {
        let line = transcript().describe(&NoticeKind::RangeReport {
            lines: vec![
                RangeLine {
                    fighters: vec![ANN],
                    range: 0,
                },
                RangeLine {
                    fighters: vec![BO],
                    range: 4,
                },
            ],
        });
        assert_eq!(line, "Ann: Engaged; Bo: Medium");
    }
}
