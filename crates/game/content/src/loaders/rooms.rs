//! Room table loader.

use std::collections::BTreeSet;
use std::path::Path;

use arena_core::{RoomId, RoomInfo};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

/// One room as written in the RON file.
#[derive(Debug, Clone, Deserialize)]
struct RoomRon {
    id: u32,
    name: String,
    /// 0 leaves the size to the arena's default room size.
    #[serde(default)]
    size: u32,
    #[serde(default = "default_true")]
    combat_allowed: bool,
    #[serde(default)]
    recovery: bool,
}

fn default_true() -> bool {
    true
}

/// Loader for the room table from RON files.
///
/// ```ron
/// [
///     (id: 1, name: "The Pit", size: 5),
///     (id: 2, name: "Infirmary", size: 3, combat_allowed: false, recovery: true),
/// ]
/// ```
pub struct RoomLoader;

impl RoomLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<RoomInfo>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<RoomInfo>> {
        let data: Vec<RoomRon> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse rooms RON: {}", e))?;

        let mut seen = BTreeSet::new();
        let mut rooms = Vec::with_capacity(data.len());
        for room in data {
            if !seen.insert(room.id) {
                anyhow::bail!("Duplicate room id {}", room.id);
            }
            rooms.push(
                RoomInfo::new(RoomId(room.id), room.name, room.size)
                    .with_combat_allowed(room.combat_allowed)
                    .with_recovery(room.recovery),
            );
        }
        Ok(rooms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_to_a_plain_fighting_room() {
        let rooms = RoomLoader::parse(
            r#"[
                (id: 1, name: "The Pit", size: 5),
                (id: 2, name: "Infirmary", combat_allowed: false, recovery: true),
            ]"#,
        )
        .unwrap();

        assert_eq!(rooms.len(), 2);
        assert!(rooms[0].combat_allowed);
        assert!(!rooms[0].recovery);
        assert_eq!(rooms[1].size, 0);
        assert!(!rooms[1].combat_allowed);
        assert!(rooms[1].recovery);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let error = RoomLoader::parse(r#"[(id: 1, name: "A"), (id: 1, name: "B")]"#).unwrap_err();
        assert!(error.to_string().contains("Duplicate room id 1"));
    }
}
