//! A fighter's defined special moves.

use crate::config::ArenaConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::stats::Stats;

use super::catalog::{EffectKind, EffectList, MoveCategory};
use super::compose::{ComposeError, total_cost, validate_effects};

/// A player-defined move combining one or two catalog effects.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpecialMove {
    pub name: String,
    pub category: MoveCategory,
    pub effects: EffectList,
    pub description: String,
}

impl SpecialMove {
    pub const DEFAULT_NAME: &'static str = "The Nameless Special";

    /// Validates the effect combination and normalizes name and description.
    ///
    /// Names are trimmed to 30 characters and descriptions to 300; empty
    /// values fall back to defaults.
    pub fn define(
        name: &str,
        category: MoveCategory,
        effects: &[EffectKind],
        description: &str,
        stats: &Stats,
    ) -> Result<Self, ComposeError> {
        let effects = validate_effects(category, effects, stats)?;

        let name = truncate(name.trim(), ArenaConfig::MAX_SPECIAL_NAME_LEN);
        let name = if name.is_empty() {
            Self::DEFAULT_NAME.to_string()
        } else {
            name
        };

        let description = truncate(description.trim(), ArenaConfig::MAX_SPECIAL_DESCRIPTION_LEN);
        let description = if description.is_empty() {
            format!("A special move called {name}")
        } else {
            description
        };

        Ok(Self {
            name,
            category,
            effects,
            description,
        })
    }

    pub fn cost(&self) -> u32 {
        total_cost(&self.effects)
    }

    pub fn has(&self, effect: EffectKind) -> bool {
        self.effects.contains(&effect)
    }

    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadoutError {
    #[error("You already have a special move named {name}!")]
    DuplicateName { name: String },

    #[error("You have more than {max} special moves. You can only have {max}!")]
    Full { max: usize },

    #[error("You don't have a special move named {query}.")]
    NotFound { query: String },
}

impl GameError for LoadoutError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateName { .. } => "LOADOUT_DUPLICATE_NAME",
            Self::Full { .. } => "LOADOUT_FULL",
            Self::NotFound { .. } => "LOADOUT_NOT_FOUND",
        }
    }
}

/// Ordered set of special moves, unique by case-insensitive name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Loadout {
    moves: Vec<SpecialMove>,
}

impl Loadout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, special: SpecialMove) -> Result<(), LoadoutError> {
        if self
            .moves
            .iter()
            .any(|m| m.name.eq_ignore_ascii_case(&special.name))
        {
            return Err(LoadoutError::DuplicateName { name: special.name });
        }
        if self.moves.len() >= ArenaConfig::MAX_SPECIAL_MOVES {
            return Err(LoadoutError::Full {
                max: ArenaConfig::MAX_SPECIAL_MOVES,
            });
        }
        self.moves.push(special);
        Ok(())
    }

    /// First move (in definition order) whose name contains `query`,
    /// ignoring case.
    pub fn find(&self, query: &str) -> Option<&SpecialMove> {
        if query.is_empty() {
            return None;
        }
        self.moves.iter().find(|m| m.matches(query))
    }

    /// Removes the move [`Loadout::find`] would return.
    pub fn remove(&mut self, query: &str) -> Result<SpecialMove, LoadoutError> {
        let index = if query.is_empty() {
            None
        } else {
            self.moves.iter().position(|m| m.matches(query))
        };
        match index {
            Some(index) => Ok(self.moves.remove(index)),
            None => Err(LoadoutError::NotFound {
                query: query.to_string(),
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpecialMove> {
        self.moves.iter()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}
