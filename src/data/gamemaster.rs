//! Game master records: species, moves, cups and moveset overrides.
//! Loaded once per run from a single JSON file and indexed by [crate::data::DataRegistry].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MetarankError, Result};

pub const DEFAULT_GAMEMASTER_PATH: &str = "data/gamemaster.json";

/// Suffix used by shadow forms; `id` filters may normalize it away.
pub const SHADOW_SUFFIX: &str = "_shadow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub atk: u16,
    pub def: u16,
    pub hp: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IvSpread {
    pub atk: u8,
    pub def: u8,
    pub hp: u8,
}

impl Default for IvSpread {
    fn default() -> Self {
        Self {
            atk: 15,
            def: 15,
            hp: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub species_id: String,
    pub species_name: String,
    pub dex: u32,
    pub types: Vec<String>,
    pub base_stats: BaseStats,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_released")]
    pub released: bool,
    #[serde(default)]
    pub fast_moves: Vec<String>,
    #[serde(default)]
    pub charged_moves: Vec<String>,
    /// Per-cap IV spreads; caps without an entry use [IvSpread::default].
    #[serde(default)]
    pub default_ivs: BTreeMap<u32, IvSpread>,
}

fn default_released() -> bool {
    true
}

impl SpeciesRecord {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(type_name))
    }

    pub fn knows_move(&self, move_id: &str) -> bool {
        self.fast_moves
            .iter()
            .chain(self.charged_moves.iter())
            .any(|m| m == move_id)
    }

    pub fn ivs_for_cap(&self, cap: u32) -> IvSpread {
        self.default_ivs.get(&cap).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub move_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: String,
    pub power: f64,
    /// Energy cost for charged moves.
    #[serde(default)]
    pub energy: u32,
    /// Energy generated per use for fast moves.
    #[serde(default)]
    pub energy_gain: u32,
    /// Fast-move duration in milliseconds (multiples of 500).
    #[serde(default)]
    pub cooldown: u32,
}

impl MoveRecord {
    /// Duration in 500 ms turns, at least one.
    pub fn turns(&self) -> u32 {
        (self.cooldown / 500).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Type,
    Dex,
    Tag,
    Id,
    Move,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(u32),
    Text(String),
}

impl FilterValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<u32> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CupFilter {
    pub filter_type: FilterKind,
    #[serde(default)]
    pub values: Vec<FilterValue>,
    /// Brackets this rule applies to; None means every bracket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leagues: Option<Vec<u32>>,
    /// `id` rules only: compare against the id with the shadow suffix removed.
    #[serde(default)]
    pub include_shadows: bool,
}

impl CupFilter {
    pub fn applies_to(&self, cap: u32) -> bool {
        self.leagues
            .as_ref()
            .map_or(true, |leagues| leagues.contains(&cap))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CupRecord {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub include: Vec<CupFilter>,
    #[serde(default)]
    pub exclude: Vec<CupFilter>,
    /// Skip the stat-product floor entirely.
    #[serde(default)]
    pub include_low_stat_product: bool,
    /// Only contestants with a boosted weight (> 1) become targets.
    #[serde(default)]
    pub meta_targets_only: bool,
    /// User-defined roster: the solver runs the full convergence schedule.
    #[serde(default)]
    pub custom: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovesetOverride {
    pub species_id: String,
    #[serde(default)]
    pub fast_move: Option<String>,
    #[serde(default)]
    pub charged_moves: Option<Vec<String>>,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideGroup {
    pub cup: String,
    pub league: u32,
    #[serde(default)]
    pub pokemon: Vec<MovesetOverride>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameMasterFile {
    #[serde(default)]
    pub species: Vec<SpeciesRecord>,
    #[serde(default)]
    pub moves: Vec<MoveRecord>,
    #[serde(default)]
    pub cups: Vec<CupRecord>,
    #[serde(default)]
    pub overrides: Vec<OverrideGroup>,
    /// Replaces the built-in ban list when present.
    #[serde(default)]
    pub ban_list: Option<Vec<String>>,
}

pub fn load_gamemaster(path: impl AsRef<Path>) -> Result<GameMasterFile> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| MetarankError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| MetarankError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
