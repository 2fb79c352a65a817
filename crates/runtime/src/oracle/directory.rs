//! Name lookup for every registered fighter.
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use arena_core::{FighterDirectory, FighterId};

/// Shared name table behind [`FighterDirectory`].
///
/// Queries match a full name first, then a name prefix, both ignoring
/// case; ties go to the lowest id. Whether the match is actually in the
/// fight is for the engine's target checks to decide.
#[derive(Clone, Debug, Default)]
pub struct FighterIndex {
    names: Arc<RwLock<BTreeMap<FighterId, String>>>,
}

impl FighterIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: FighterId, name: impl Into<String>) {
        self.names
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, name.into());
    }

    pub fn remove(&self, id: FighterId) -> Option<String> {
        self.names
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    /// Whether some other fighter already uses `name`.
    pub fn is_taken(&self, name: &str) -> bool {
        let name = name.trim();
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .any(|existing| existing.eq_ignore_ascii_case(name))
    }
}

impl FighterDirectory for FighterIndex {
    fn resolve(&self, query: &str) -> Option<FighterId> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        let names = self.names.read().unwrap_or_else(PoisonError::into_inner);
        names
            .iter()
            .find(|(_, name)| name.to_lowercase() == query)
            .or_else(|| {
                names
                    .iter()
                    .find(|(_, name)| name.to_lowercase().starts_with(&query))
            })
            .map(|(id, _)| *id)
    }

    fn name_of(&self, id: FighterId) -> Option<String> {
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_names_beat_prefixes() {
        let index = FighterIndex::new();
        index.insert(FighterId(1), "Annabel");
        index.insert(FighterId(2), "Ann");

        assert_eq!(index.resolve("ann"), Some(FighterId(2)));
        assert_eq!(index.resolve("anna"), Some(FighterId(1)));
        assert_eq!(index.resolve("  "), None);
        assert_eq!(index.resolve("zed"), None);
    }

    #[test]
    fn clones_share_the_table() {
        let index = FighterIndex::new();
        let other = index.clone();
        index.insert(FighterId(7), "Bo");
        assert_eq!(other.name_of(FighterId(7)).as_deref(), Some("Bo"));
        assert!(other.is_taken("bo"));
    }
}
