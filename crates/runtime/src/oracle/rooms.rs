//! Static room layout served through [`arena_core::WorldOracle`].
use std::collections::HashMap;

use arena_core::{RoomId, RoomInfo, WorldOracle};

/// WorldOracle implementation with static room data
///
/// Rooms do not change while the runtime is up; reload the table to change
/// them.
#[derive(Clone, Debug, Default)]
pub struct RoomTable {
    rooms: HashMap<RoomId, RoomInfo>,
}

impl RoomTable {
    pub fn new(rooms: impl IntoIterator<Item = RoomInfo>) -> Self {
        Self {
            rooms: rooms.into_iter().map(|room| (room.id, room)).collect(),
        }
    }

    pub fn insert(&mut self, room: RoomInfo) -> Option<RoomInfo> {
        self.rooms.insert(room.id, room)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Looks a room up by case-insensitive name.
    pub fn find(&self, name: &str) -> Option<&RoomInfo> {
        let name = name.trim();
        self.rooms
            .values()
            .find(|room| room.name.eq_ignore_ascii_case(name))
    }
}

impl WorldOracle for RoomTable {
    fn room(&self, id: RoomId) -> Option<RoomInfo> {
        self.rooms.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooms_resolve_by_id_and_name() {
        let table = RoomTable::new([
            RoomInfo::new(RoomId(1), "Pit", 5),
            RoomInfo::new(RoomId(2), "Chapel", 3).with_combat_allowed(false),
        ]);
        assert_eq!(table.room(RoomId(2)).map(|r| r.size), Some(3));
        assert_eq!(table.find("pit").map(|r| r.id), Some(RoomId(1)));
        assert!(table.room(RoomId(9)).is_none());
    }
}
