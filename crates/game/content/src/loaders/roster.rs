//! Fighter roster loader.
//!
//! Fighters are built through the same constructors the game uses, so a
//! roster file cannot hold a stat above 10 or a special move the composer
//! would refuse. The 36-point entry cap is not checked here; the runtime
//! checks it when the fighter is registered.

use std::path::Path;

use arena_core::{
    EffectKind, Fighter, FighterId, MoveCategory, RoomId, SpecialMove, Stats,
};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

#[derive(Debug, Clone, Copy, Deserialize)]
struct StatsRon {
    atm: u8,
    def: u8,
    vit: u8,
    atr: u8,
    mob: u8,
    spe: u8,
}

/// A special move as written in the roster file.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecialSpec {
    pub name: String,
    pub category: MoveCategory,
    /// Catalog names, e.g. `"Lunge Attack"`.
    pub effects: Vec<EffectKind>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct FighterRon {
    id: u32,
    name: String,
    stats: StatsRon,
    /// Room the fighter starts in.
    room: u32,
    #[serde(default)]
    allies: Vec<u32>,
    #[serde(default)]
    specials: Vec<SpecialSpec>,
}

/// A loaded fighter and where they start.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub fighter: Fighter,
    pub room: RoomId,
}

/// Loader for the fighter roster from RON files.
///
/// ```ron
/// [
///     (
///         id: 1,
///         name: "Ann",
///         stats: (atm: 6, def: 4, vit: 5, atr: 4, mob: 4, spe: 3),
///         room: 1,
///         specials: [
///             (name: "Rush", category: melee_attack, effects: ["Lunge Attack"]),
///         ],
///     ),
/// ]
/// ```
pub struct RosterLoader;

impl RosterLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<RosterEntry>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<RosterEntry>> {
        let data: Vec<FighterRon> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))?;

        let mut entries: Vec<RosterEntry> = Vec::with_capacity(data.len());
        for raw in data {
            if entries.iter().any(|e| e.fighter.id.0 == raw.id) {
                anyhow::bail!("Duplicate fighter id {}", raw.id);
            }
            entries.push(Self::build(raw)?);
        }
        Ok(entries)
    }

    fn build(raw: FighterRon) -> LoadResult<RosterEntry> {
        let s = raw.stats;
        let stats = Stats::new(s.atm, s.def, s.vit, s.atr, s.mob, s.spe)
            .map_err(|e| anyhow::anyhow!("Fighter {}: {}", raw.name, e))?;

        let mut fighter = Fighter::new(FighterId(raw.id), raw.name.trim(), stats);
        for ally in raw.allies {
            fighter.add_ally(FighterId(ally));
        }
        for special in raw.specials {
            let defined = SpecialMove::define(
                &special.name,
                special.category,
                &special.effects,
                &special.description,
                &stats,
            )
            .map_err(|e| anyhow::anyhow!("Fighter {}: {}", fighter.name, e))?;
            fighter
                .loadout_mut()
                .add(defined)
                .map_err(|e| anyhow::anyhow!("Fighter {}: {}", fighter.name, e))?;
        }

        Ok(RosterEntry {
            fighter,
            room: RoomId(raw.room),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ROSTER: &str = r#"[
        (
            id: 1,
            name: "Ann",
            stats: (atm: 6, def: 4, vit: 5, atr: 4, mob: 4, spe: 3),
            room: 1,
            allies: [2],
            specials: [
                (name: "Rush", category: melee_attack, effects: ["Lunge Attack"]),
            ],
        ),
        (
            id: 2,
            name: "Bo",
            stats: (atm: 4, def: 4, vit: 5, atr: 4, mob: 4, spe: 3),
            room: 1,
        ),
    ]"#;

    #[test]
    fn builds_fighters_with_loadouts() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(ROSTER.as_bytes()).unwrap();

        let roster = RosterLoader::load(file.path()).unwrap();
        assert_eq!(roster.len(), 2);

        let ann = &roster[0].fighter;
        assert_eq!(roster[0].room, RoomId(1));
        assert_eq!(ann.hp(), 15);
        assert!(ann.is_ally(FighterId(2)));
        let rush = ann.loadout().find("rush").unwrap();
        assert!(rush.has(EffectKind::LungeAttack));
        assert_eq!(rush.description, "A special move called Rush");
        assert!(roster[1].fighter.loadout().is_empty());
    }

    #[test]
    fn stats_out_of_range_name_the_fighter() {
        let error = RosterLoader::parse(
            r#"[(id: 1, name: "Ann", stats: (atm: 11, def: 0, vit: 1, atr: 0, mob: 0, spe: 0), room: 1)]"#,
        )
        .unwrap_err();
        assert!(error.to_string().starts_with("Fighter Ann:"));
    }

    #[test]
    fn unknown_effects_fail_to_parse() {
        let error = RosterLoader::parse(
            r#"[(id: 1, name: "Ann", stats: (atm: 1, def: 1, vit: 1, atr: 1, mob: 1, spe: 1), room: 1,
                specials: [(name: "X", category: defense, effects: ["Teleport"])])]"#,
        )
        .unwrap_err();
        assert!(error.to_string().contains("Teleport"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let fighter = r#"(id: 1, name: "Ann", stats: (atm: 1, def: 1, vit: 1, atr: 1, mob: 1, spe: 1), room: 1)"#;
        let error = RosterLoader::parse(&format!("[{fighter}, {fighter}]")).unwrap_err();
        assert!(error.to_string().contains("Duplicate fighter id 1"));
    }
}
