use crate::state::{FighterId, RoomId};

/// Read-only view of the world locations fights can happen in.
pub trait WorldOracle: Send + Sync {
    fn room(&self, id: RoomId) -> Option<RoomInfo>;
}

/// What the engine needs to know about a location.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomInfo {
    pub id: RoomId,
    pub name: String,
    /// Maximum range between two fighters, and the movement cap.
    pub size: u32,
    /// Whether `fight` may start an encounter here.
    pub combat_allowed: bool,
    /// Whether `rest` restores HP and SP here.
    pub recovery: bool,
}

impl RoomInfo {
    pub fn new(id: RoomId, name: impl Into<String>, size: u32) -> Self {
        Self {
            id,
            name: name.into(),
            size,
            combat_allowed: true,
            recovery: false,
        }
    }

    pub fn with_combat_allowed(mut self, allowed: bool) -> Self {
        self.combat_allowed = allowed;
        self
    }

    pub fn with_recovery(mut self, recovery: bool) -> Self {
        self.recovery = recovery;
        self
    }

    /// Range every pair starts at: `round(size / 2.5)`, halves rounding up.
    pub const fn starting_range(&self) -> u32 {
        // Computed in u64; the result never exceeds `size`.
        ((self.size as u64 * 4 + 5) / 10) as u32
    }
}

/// Resolves player-typed target names to fighter handles.
///
/// The engine itself only ever deals in [`FighterId`]s; the command layer uses
/// a directory to turn text into one before calling in.
pub trait FighterDirectory {
    fn resolve(&self, query: &str) -> Option<FighterId>;

    /// Display name for a resolved fighter.
    fn name_of(&self, id: FighterId) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_range_rounds_half_up() {
        let range = |size| RoomInfo::new(RoomId(0), "test", size).starting_range();
        assert_eq!(range(5), 2);
        assert_eq!(range(4), 2); // 1.6
        assert_eq!(range(3), 1); // 1.2
        assert_eq!(range(10), 4);
        assert_eq!(range(0), 0);
    }

    #[test]
    fn starting_range_handles_huge_rooms() {
        let range = |size| RoomInfo::new(RoomId(0), "vast", size).starting_range();
        assert_eq!(range(2_000_000_000), 800_000_000);
        assert_eq!(range(u32::MAX), 1_717_986_918);
    }
}
