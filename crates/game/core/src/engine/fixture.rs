//! Encounter builders shared by the engine's unit tests.

use crate::config::ArenaConfig;
use crate::env::{RoomInfo, ScriptedRng};
use crate::notice::{Notice, NoticeKind};
use crate::state::{Fighter, FighterId, RoomId, Roster};
use crate::stats::Stats;

use super::Encounter;

pub const ANN: FighterId = FighterId(1);
pub const BO: FighterId = FighterId(2);
pub const CY: FighterId = FighterId(3);
pub const DEE: FighterId = FighterId(4);

pub fn stats(atm: u8, def: u8, vit: u8, atr: u8, mob: u8, spe: u8) -> Stats {
    Stats::new(atm, def, vit, atr, mob, spe).unwrap()
}

pub fn fighter(id: FighterId, name: &str, stats: Stats) -> Fighter {
    Fighter::new(id, name, stats)
}

pub fn ann() -> Fighter {
    fighter(ANN, "Ann", stats(6, 4, 5, 4, 4, 3))
}

pub fn bo() -> Fighter {
    fighter(BO, "Bo", stats(4, 4, 5, 4, 4, 3))
}

pub fn cy() -> Fighter {
    fighter(CY, "Cy", stats(4, 4, 5, 4, 4, 3))
}

/// Enlists `fighters` without starting. `rolls` include initiative.
pub fn forming(fighters: Vec<Fighter>, rolls: impl IntoIterator<Item = u32>) -> Encounter {
    let room = RoomInfo::new(RoomId(1), "Pit", 5);
    let mut enc = Encounter::new(
        room,
        ArenaConfig::new(),
        Box::new(ScriptedRng::new(rolls)),
    );
    for f in fighters {
        enc.enlist(f).unwrap();
    }
    enc
}

/// Starts a fight with turn order equal to list order. `rolls` feed
/// everything after initiative.
pub fn started(fighters: Vec<Fighter>, rolls: impl IntoIterator<Item = u32>) -> Encounter {
    let rolling = fighters.iter().filter(|f| f.stats().mob > 0).count();
    let script = std::iter::repeat_n(1, rolling).chain(rolls);
    let instigator = fighters[0].id;
    let mut enc = forming(fighters, script);
    enc.start(instigator).unwrap();
    enc.drain();
    enc
}

pub fn forming_duel(rolls: impl IntoIterator<Item = u32>) -> Encounter {
    forming(vec![ann(), bo()], rolls)
}

pub fn duel(rolls: impl IntoIterator<Item = u32>) -> Encounter {
    started(vec![ann(), bo()], rolls)
}

/// Ann and Bo start at range 0.
pub fn duel_engaged(rolls: impl IntoIterator<Item = u32>) -> Encounter {
    let mut enc = duel(rolls);
    enc.engage_for_tests(ANN, BO);
    enc
}

pub fn trio(rolls: impl IntoIterator<Item = u32>) -> Encounter {
    started(vec![ann(), bo(), cy()], rolls)
}

pub fn has(notices: &[Notice], pred: impl Fn(&NoticeKind) -> bool) -> bool {
    notices.iter().any(|n| pred(&n.kind))
}

impl Encounter {
    pub(crate) fn roster_mut_for_tests(&mut self) -> &mut Roster {
        &mut self.roster
    }

    /// Puts `a` at range 0 with `b` without rolling.
    pub(crate) fn engage_for_tests(&mut self, a: FighterId, b: FighterId) {
        while self.ranges.get(a, b) > 0 {
            self.ranges.decrease(a, b);
        }
    }

    /// Ends turns until it is `fighter`'s.
    pub(crate) fn on_tick_until_turn_of(&mut self, fighter: FighterId) {
        for _ in 0..self.roster.len() * 2 {
            let current = self.current().unwrap();
            if current == fighter {
                return;
            }
            let c = self.roster.get_mut(current).unwrap();
            c.combat.actions = 0;
            c.combat.moves = 0;
            c.combat.second = None;
            self.on_tick();
        }
        panic!("{fighter} never got a turn");
    }
}
