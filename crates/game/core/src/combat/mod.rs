//! Attack and defense resolution.
//!
//! A [`Battle`] borrows everything one resolution step touches (roster,
//! range map, RNG, outbox) so the engine can hand out a single mutable view
//! per operation.
//!
//! # Attack sub-flow
//!
//! `queue_attack` rolls and parks an [`IncomingAttack`] on the target, then
//! asks for a defense countdown. The target answers with `resolve_defense`
//! (defend, endure, or a special defense), or the countdown expires and the
//! engine defends for them. The incoming attack is cleared in every outcome.
//!
//! [`IncomingAttack`]: crate::state::IncomingAttack

mod effects;
mod legality;
mod resolve;
mod roll;

pub use legality::{AttackError, attack_type_check};
pub use resolve::{DefenseAction, DefenseOutcome};
pub use roll::{attack_roll, defense_roll, initiative_roll};

use crate::config::ArenaConfig;
use crate::env::RngOracle;
use crate::notice::{NoticeKind, Outbox};
use crate::range::{Direction, MoveMode, Movement, MovementSummary, RangeMap};
use crate::state::{FighterId, Roster};

/// Mutable view of an encounter used while resolving one event.
pub struct Battle<'a> {
    pub roster: &'a mut Roster,
    pub ranges: &'a mut RangeMap,
    pub rng: &'a mut dyn RngOracle,
    pub outbox: &'a mut Outbox,
    pub config: &'a ArenaConfig,
}

impl<'a> Battle<'a> {
    pub fn new(
        roster: &'a mut Roster,
        ranges: &'a mut RangeMap,
        rng: &'a mut dyn RngOracle,
        outbox: &'a mut Outbox,
        config: &'a ArenaConfig,
    ) -> Self {
        Self {
            roster,
            ranges,
            rng,
            outbox,
            config,
        }
    }

    pub(crate) fn name(&self, id: FighterId) -> String {
        self.roster
            .get(id)
            .map_or_else(|| id.to_string(), |c| c.fighter.name.clone())
    }

    pub(crate) fn movement(&mut self) -> Movement<'_> {
        Movement::new(&mut *self.ranges, &mut *self.roster, &mut *self.rng)
    }

    /// Runs a multi-step movement and announces it.
    pub fn move_fighter(
        &mut self,
        direction: Direction,
        mover: FighterId,
        target: FighterId,
        steps: u32,
        mode: MoveMode,
    ) -> MovementSummary {
        let summary = self.movement().run(direction, mover, target, steps, mode);
        self.outbox.broadcast(NoticeKind::Moved(summary.clone()));
        summary
    }
}

/// Replaces `<self>` and `<target>`, prefixing `<self> ` when the template
/// does not mention the actor at all.
pub fn fill_template(template: &str, actor: &str, target: Option<&str>) -> String {
    let mut text = if template.contains("<self>") {
        template.to_string()
    } else {
        format!("<self> {template}")
    };
    text = text.replace("<self>", actor);
    if let Some(target) = target {
        text = text.replace("<target>", target);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_gets_actor_prefix() {
        assert_eq!(
            fill_template("swings at <target>!", "Ann", Some("Bo")),
            "Ann swings at Bo!"
        );
        assert_eq!(
            fill_template("A kick from <self> heads for <target>!", "Ann", Some("Bo")),
            "A kick from Ann heads for Bo!"
        );
    }
}
