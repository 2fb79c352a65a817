//! Single- and multi-step movement with blocking.
//!
//! A step toward (or away from) a target also shifts the mover relative to
//! every third fighter, so the group's relative positions stay consistent
//! on the 1-D scale.

use crate::env::RngOracle;
use crate::state::{FighterId, Roster};

use super::RangeMap;

/// How a step is paid for and whether it can be blocked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveMode {
    /// Player movement: spends the move budget, can be blocked.
    Normal,
    /// Knockback / pull: ignores budget and blocking.
    Forced,
    /// Lunge / parting attack: ignores budget and blocking.
    Free,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Approach,
    Withdraw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Blocked(FighterId),
    Stopped,
}

/// Aggregate of a multi-step movement, for a single notice.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementSummary {
    pub mover: FighterId,
    pub target: FighterId,
    pub direction: Direction,
    pub mode: MoveMode,
    pub moved: u32,
    pub blocked: u32,
    /// Distinct blockers in the order they first blocked.
    pub blockers: Vec<FighterId>,
    pub final_range: u32,
}

/// Borrowed view over everything a movement touches.
pub struct Movement<'a> {
    ranges: &'a mut RangeMap,
    roster: &'a mut Roster,
    rng: &'a mut dyn RngOracle,
}

impl<'a> Movement<'a> {
    pub fn new(ranges: &'a mut RangeMap, roster: &'a mut Roster, rng: &'a mut dyn RngOracle) -> Self {
        Self { ranges, roster, rng }
    }

    fn moves_left(&self, mover: FighterId) -> u32 {
        self.roster.get(mover).map_or(0, |c| c.combat.moves)
    }

    fn spend_move(&mut self, mover: FighterId) {
        if let Some(c) = self.roster.get_mut(mover) {
            c.combat.moves = c.combat.moves.saturating_sub(1);
        }
    }

    fn others(&self, mover: FighterId, target: Option<FighterId>) -> Vec<FighterId> {
        self.ranges
            .members()
            .iter()
            .copied()
            .filter(|f| *f != mover && Some(*f) != target)
            .collect()
    }

    /// Contested roll: the blocker's max(ATM, DEF) against the mover's MOB.
    /// Ties go to the blocker. Allies and defeated fighters never block.
    pub fn block_test(&mut self, blocker: FighterId, mover: FighterId) -> bool {
        let (Some(b), Some(m)) = (self.roster.get(blocker), self.roster.get(mover)) else {
            return false;
        };
        if b.fighter.is_ally(mover) || b.fighter.is_defeated() {
            return false;
        }
        let block_stat = b.fighter.stats().atm.max(b.fighter.stats().def);
        let mobility = m.fighter.stats().mob;
        let block_roll = self.rng.roll_die(u32::from(block_stat));
        let move_roll = self.rng.roll_die(u32::from(mobility));
        block_roll >= move_roll
    }

    /// First engaged fighter (other than `except`) who blocks the mover.
    fn find_blocker(&mut self, mover: FighterId, except: Option<FighterId>) -> Option<FighterId> {
        for other in self.others(mover, except) {
            if self.ranges.get(mover, other) == 0 && self.block_test(other, mover) {
                return Some(other);
            }
        }
        None
    }

    pub fn approach_step(&mut self, mover: FighterId, target: FighterId, mode: MoveMode) -> StepOutcome {
        if self.ranges.get(mover, target) == 0 {
            return StepOutcome::Stopped;
        }
        if mode == MoveMode::Normal {
            if self.moves_left(mover) == 0 {
                return StepOutcome::Stopped;
            }
            if let Some(blocker) = self.find_blocker(mover, Some(target)) {
                self.spend_move(mover);
                return StepOutcome::Blocked(blocker);
            }
        }

        let others = self.others(mover, Some(target));
        // Close in on anyone nearer the target than we are.
        for other in &others {
            if self.ranges.get(mover, *other) > self.ranges.get(target, *other) {
                self.ranges.decrease(mover, *other);
            }
        }
        // Back off from anyone farther from the target than we are.
        for other in &others {
            if self.ranges.get(mover, *other) < self.ranges.get(target, *other) {
                self.ranges.increase(mover, *other);
            }
        }
        self.ranges.decrease(mover, target);

        if mode == MoveMode::Normal {
            self.spend_move(mover);
        }
        StepOutcome::Moved
    }

    pub fn withdraw_step(&mut self, mover: FighterId, target: FighterId, mode: MoveMode) -> StepOutcome {
        let to_target = self.ranges.get(mover, target);
        if to_target >= self.ranges.size() {
            return StepOutcome::Stopped;
        }
        if mode == MoveMode::Normal {
            if self.moves_left(mover) == 0 {
                return StepOutcome::Stopped;
            }
            // The target itself may hold the mover in place.
            if let Some(blocker) = self.find_blocker(mover, None) {
                self.spend_move(mover);
                return StepOutcome::Blocked(blocker);
            }
        }

        for other in self.others(mover, Some(target)) {
            let to_other = self.ranges.get(mover, other);
            if to_other >= self.ranges.get(target, other) && to_other < to_target {
                self.ranges.increase(mover, other);
            }
            if self.ranges.get(mover, other) == 0 {
                self.ranges.increase(mover, other);
            }
        }
        self.ranges.increase(mover, target);

        if mode == MoveMode::Normal {
            self.spend_move(mover);
        }
        StepOutcome::Moved
    }

    pub fn step(
        &mut self,
        direction: Direction,
        mover: FighterId,
        target: FighterId,
        mode: MoveMode,
    ) -> StepOutcome {
        match direction {
            Direction::Approach => self.approach_step(mover, target, mode),
            Direction::Withdraw => self.withdraw_step(mover, target, mode),
        }
    }

    /// Repeats single steps up to `steps` times; a stop ends the run early.
    pub fn run(
        &mut self,
        direction: Direction,
        mover: FighterId,
        target: FighterId,
        steps: u32,
        mode: MoveMode,
    ) -> MovementSummary {
        let mut summary = MovementSummary {
            mover,
            target,
            direction,
            mode,
            moved: 0,
            blocked: 0,
            blockers: Vec::new(),
            final_range: 0,
        };
        for _ in 0..steps {
            match self.step(direction, mover, target, mode) {
                StepOutcome::Moved => summary.moved += 1,
                StepOutcome::Blocked(blocker) => {
                    summary.blocked += 1;
                    if !summary.blockers.contains(&blocker) {
                        summary.blockers.push(blocker);
                    }
                }
                StepOutcome::Stopped => break,
            }
        }
        summary.final_range = self.ranges.get(mover, target);
        summary
    }
}
