use serde::Serialize;

use arena_core::{Audience, EncounterOutcome, FighterId, Notice, RoomId};

/// One engine notice, tagged with the room it happened in.
#[derive(Clone, Debug, Serialize)]
pub struct CombatEvent {
    pub room: RoomId,
    pub notice: Notice,
}

impl CombatEvent {
    /// Whether `fighter` should see this notice.
    pub fn is_visible_to(&self, fighter: FighterId) -> bool {
        match self.notice.audience {
            Audience::All => true,
            Audience::Fighter(id) => id == fighter,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    EncounterStarted {
        room: RoomId,
        fighters: Vec<FighterId>,
    },
    FighterJoined {
        room: RoomId,
        fighter: FighterId,
    },
    EncounterEnded {
        room: RoomId,
        outcome: EncounterOutcome,
    },
    /// The lobby has taken the fighters of a finished encounter back.
    FightersReturned {
        room: RoomId,
        fighters: Vec<FighterId>,
    },
}

impl LifecycleEvent {
    pub fn room(&self) -> RoomId {
        match self {
            Self::EncounterStarted { room, .. }
            | Self::FighterJoined { room, .. }
            | Self::EncounterEnded { room, .. }
            | Self::FightersReturned { room, .. } => *room,
        }
    }
}
