//! Startup-loaded master data cache (DataRegistry).
//! Load once per run and share via Arc with the roster builder and every scenario worker.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::data::gamemaster::{
    load_gamemaster, CupRecord, GameMasterFile, MoveRecord, MovesetOverride, SpeciesRecord,
};
use crate::error::{MetarankError, Result};

/// Species kept out of the two lowest brackets unless the game master supplies its own list.
pub const DEFAULT_BAN_LIST: &[&str] = &[
    "mewtwo",
    "mewtwo_armored",
    "giratina_altered",
    "giratina_origin",
    "groudon",
    "kyogre",
    "rayquaza",
    "dialga",
    "palkia",
    "zacian_hero",
    "zamazenta_hero",
];

/// Cup names are matched case-insensitively with spaces/underscores/dashes collapsed.
fn normalize_lookup(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' || c == '-' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Read-only registry of master data.
#[derive(Debug)]
pub struct DataRegistry {
    /// All species in game master order; roster iteration follows this order.
    species: Vec<SpeciesRecord>,
    species_index: HashMap<String, usize>,
    moves: HashMap<String, MoveRecord>,
    cups: HashMap<String, CupRecord>,
    /// (cup, league) -> species id -> override
    overrides: HashMap<(String, u32), HashMap<String, MovesetOverride>>,
    ban_list: Vec<String>,
}

impl DataRegistry {
    /// Load and index the game master at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Arc<DataRegistry>> {
        let file = load_gamemaster(path)?;
        Ok(Arc::new(Self::from_game_master(file)))
    }

    pub fn from_game_master(file: GameMasterFile) -> Self {
        let species_index = file
            .species
            .iter()
            .enumerate()
            .map(|(i, s)| (s.species_id.clone(), i))
            .collect();
        let moves = file
            .moves
            .into_iter()
            .map(|m| (m.move_id.clone(), m))
            .collect();
        let cups = file
            .cups
            .into_iter()
            .map(|c| (normalize_lookup(&c.name), c))
            .collect();

        let mut overrides: HashMap<(String, u32), HashMap<String, MovesetOverride>> =
            HashMap::new();
        for group in file.overrides {
            let slot = overrides
                .entry((normalize_lookup(&group.cup), group.league))
                .or_default();
            for entry in group.pokemon {
                slot.insert(entry.species_id.clone(), entry);
            }
        }

        let ban_list = file.ban_list.unwrap_or_else(|| {
            DEFAULT_BAN_LIST.iter().map(|id| id.to_string()).collect()
        });

        DataRegistry {
            species: file.species,
            species_index,
            moves,
            cups,
            overrides,
            ban_list,
        }
    }

    pub fn species_list(&self) -> &[SpeciesRecord] {
        &self.species
    }

    pub fn species(&self, species_id: &str) -> Option<&SpeciesRecord> {
        self.species_index
            .get(species_id)
            .and_then(|&i| self.species.get(i))
    }

    pub fn move_record(&self, move_id: &str) -> Option<&MoveRecord> {
        self.moves.get(move_id)
    }

    pub fn require_move(&self, move_id: &str) -> Result<&MoveRecord> {
        self.move_record(move_id)
            .ok_or_else(|| MetarankError::UnknownMove(move_id.to_string()))
    }

    pub fn cup(&self, name: &str) -> Option<&CupRecord> {
        self.cups.get(&normalize_lookup(name))
    }

    pub fn require_cup(&self, name: &str) -> Result<&CupRecord> {
        self.cup(name)
            .ok_or_else(|| MetarankError::UnknownCup(name.to_string()))
    }

    pub fn override_for(&self, cup: &str, cap: u32, species_id: &str) -> Option<&MovesetOverride> {
        self.overrides
            .get(&(normalize_lookup(cup), cap))
            .and_then(|group| group.get(species_id))
    }

    pub fn ban_list(&self) -> &[String] {
        &self.ban_list
    }

    pub fn is_banned(&self, species_id: &str) -> bool {
        self.ban_list.iter().any(|id| id == species_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::gamemaster::{CupRecord, OverrideGroup};

    fn cup(name: &str) -> CupRecord {
        CupRecord {
            name: name.to_string(),
            title: None,
            include: Vec::new(),
            exclude: Vec::new(),
            include_low_stat_product: false,
            meta_targets_only: false,
            custom: false,
        }
    }

    #[test]
    fn cup_lookup_ignores_case_and_separators() {
        let registry = DataRegistry::from_game_master(GameMasterFile {
            cups: vec![cup("great_remix")],
            ..GameMasterFile::default()
        });
        assert!(registry.cup("Great Remix").is_some());
        assert!(registry.cup("great-remix").is_some());
        assert!(registry.require_cup("ultra").is_err());
    }

    #[test]
    fn overrides_are_keyed_by_cup_league_and_species() {
        let registry = DataRegistry::from_game_master(GameMasterFile {
            overrides: vec![OverrideGroup {
                cup: "all".to_string(),
                league: 1500,
                pokemon: vec![MovesetOverride {
                    species_id: "medicham".to_string(),
                    fast_move: Some("COUNTER".to_string()),
                    charged_moves: None,
                    weight: Some(2.0),
                }],
            }],
            ..GameMasterFile::default()
        });
        assert!(registry.override_for("all", 1500, "medicham").is_some());
        assert!(registry.override_for("all", 2500, "medicham").is_none());
        assert!(registry.override_for("all", 1500, "azumarill").is_none());
    }

    #[test]
    fn game_master_ban_list_replaces_default() {
        let default = DataRegistry::from_game_master(GameMasterFile::default());
        assert!(default.is_banned("mewtwo"));

        let custom = DataRegistry::from_game_master(GameMasterFile {
            ban_list: Some(vec!["snorlax".to_string()]),
            ..GameMasterFile::default()
        });
        assert!(custom.is_banned("snorlax"));
        assert!(!custom.is_banned("mewtwo"));
    }
}
