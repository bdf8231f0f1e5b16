use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ranking::scenario::Scenario;

/// One opponent in a matchups or counters list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupRecord {
    pub opponent: String,
    pub rating: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveUse {
    pub move_id: String,
    pub uses: u64,
}

/// Aggregated move usage, each list sorted by uses descending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveUsageTable {
    #[serde(default)]
    pub fast_moves: Vec<MoveUse>,
    #[serde(default)]
    pub charged_moves: Vec<MoveUse>,
}

impl MoveUsageTable {
    pub fn top_fast_move(&self) -> Option<&str> {
        self.fast_moves.first().map(|m| m.move_id.as_str())
    }

    pub fn top_charged_moves(&self, count: usize) -> Vec<&str> {
        self.charged_moves
            .iter()
            .take(count)
            .map(|m| m.move_id.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub species_id: String,
    pub species_name: String,
    pub score: f64,
    pub moveset: Vec<String>,
    #[serde(default)]
    pub matchups: Vec<MatchupRecord>,
    #[serde(default)]
    pub counters: Vec<MatchupRecord>,
    #[serde(default)]
    pub moves: MoveUsageTable,
    /// Per-scenario inputs of a composite ranking, in canonical scenario order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scores: Vec<f64>,
}

/// Which list a set of entries belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankingCategory {
    Scenario(Scenario),
    Overall,
    Consistency,
}

impl RankingCategory {
    pub fn slug(self) -> &'static str {
        match self {
            Self::Scenario(scenario) => scenario.slug(),
            Self::Overall => "overall",
            Self::Consistency => "consistency",
        }
    }
}

impl fmt::Display for RankingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
