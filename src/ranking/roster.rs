//! Roster Builder: turns the game master into the candidate and target pools
//! for one cup at one bracket.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::combat::contestant::{Contestant, MAX_CHARGED_MOVES, STAB_MULTIPLIER};
use crate::combat::stats::{BracketStats, DEFAULT_MAX_LEVEL};
use crate::config::{min_stat_product, BAN_LIST_CAP_LIMIT};
use crate::data::gamemaster::{CupRecord, MoveRecord, SpeciesRecord};
use crate::data::DataRegistry;
use crate::error::Result;
use crate::ranking::entry::RankingEntry;
use crate::ranking::filters;

/// Cap treated as unlimited; mega-tagged species skip the stat floor there.
pub const MASTER_CAP: u32 = 10000;
const MEGA_TAG: &str = "mega";

/// Fixed pools for one cup/bracket. Positions never change during a run.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub candidates: Vec<Contestant>,
    pub targets: Vec<Contestant>,
}

impl Roster {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Every candidate is also a target, at the same position.
    pub fn is_square(&self) -> bool {
        self.candidates.len() == self.targets.len()
    }

    pub fn summaries(&self) -> Vec<RosterSummary> {
        self.candidates.iter().map(RosterSummary::from).collect()
    }
}

/// Printable view of one candidate (for the `roster` command).
#[derive(Debug, Clone, Serialize)]
pub struct RosterSummary {
    pub species_id: String,
    pub level: f64,
    pub cp: u32,
    pub stat_product: f64,
    pub moveset: Vec<String>,
    pub weight_modifier: f64,
}

impl From<&Contestant> for RosterSummary {
    fn from(c: &Contestant) -> Self {
        Self {
            species_id: c.species_id.clone(),
            level: c.stats.level,
            cp: c.stats.cp,
            stat_product: (c.stat_product() * 10.0).round() / 10.0,
            moveset: c.moveset(),
            weight_modifier: c.weight_modifier,
        }
    }
}

fn stab_for(species: &SpeciesRecord, move_record: &MoveRecord) -> f64 {
    if species.has_type(&move_record.move_type) {
        STAB_MULTIPLIER
    } else {
        1.0
    }
}

/// Fast move with the best `(STAB × power + gain) / turns`, then the two charged
/// moves with the best `STAB × power / energy`.
pub fn default_moveset(
    species: &SpeciesRecord,
    registry: &DataRegistry,
) -> Option<(MoveRecord, Vec<MoveRecord>)> {
    let fast_value = |m: &MoveRecord| {
        (stab_for(species, m) * m.power + f64::from(m.energy_gain)) / f64::from(m.turns())
    };
    let fast = species
        .fast_moves
        .iter()
        .filter_map(|id| registry.move_record(id))
        .min_by(|a, b| {
            fast_value(b)
                .total_cmp(&fast_value(a))
                .then_with(|| a.cooldown.cmp(&b.cooldown))
                .then_with(|| a.move_id.cmp(&b.move_id))
        })?
        .clone();

    let charged_value = |m: &MoveRecord| stab_for(species, m) * m.power / f64::from(m.energy.max(1));
    let mut charged: Vec<&MoveRecord> = species
        .charged_moves
        .iter()
        .filter_map(|id| registry.move_record(id))
        .collect();
    charged.sort_by(|a, b| {
        charged_value(b)
            .total_cmp(&charged_value(a))
            .then_with(|| a.energy.cmp(&b.energy))
            .then_with(|| a.move_id.cmp(&b.move_id))
    });
    let charged = charged
        .into_iter()
        .take(MAX_CHARGED_MOVES)
        .cloned()
        .collect();

    Some((fast, charged))
}

pub struct RosterBuilder<'a> {
    registry: &'a DataRegistry,
    cup: &'a CupRecord,
    cap: u32,
    max_level: f64,
    prior: HashMap<String, RankingEntry>,
}

impl<'a> RosterBuilder<'a> {
    pub fn new(registry: &'a DataRegistry, cup: &str, cap: u32) -> Result<Self> {
        Ok(Self {
            registry,
            cup: registry.require_cup(cup)?,
            cap,
            max_level: DEFAULT_MAX_LEVEL,
            prior: HashMap::new(),
        })
    }

    pub fn with_max_level(mut self, max_level: f64) -> Self {
        self.max_level = max_level;
        self
    }

    /// Seed movesets and weights from an earlier ranking of this cup/bracket.
    pub fn with_prior_rankings(mut self, entries: Vec<RankingEntry>) -> Self {
        self.prior = entries
            .into_iter()
            .map(|e| (e.species_id.clone(), e))
            .collect();
        self
    }

    pub fn cup(&self) -> &CupRecord {
        self.cup
    }

    fn exempt_from_threshold(&self, species: &SpeciesRecord) -> bool {
        self.cup.include_low_stat_product
            || species.has_tag(&format!("include{}", self.cap))
            || (self.cap == MASTER_CAP && species.has_tag(MEGA_TAG))
    }

    fn is_banned(&self, species: &SpeciesRecord) -> bool {
        self.cap < BAN_LIST_CAP_LIMIT && self.registry.is_banned(&species.species_id)
    }

    /// Moveset and weight from the prior ranking, when every move it names is known.
    fn seeded_moveset(&self, species_id: &str) -> Option<(MoveRecord, Vec<MoveRecord>, f64)> {
        let entry = self.prior.get(species_id)?;
        let fast_id = entry
            .moves
            .top_fast_move()
            .or_else(|| entry.moveset.first().map(String::as_str))?;
        let mut charged_ids = entry.moves.top_charged_moves(MAX_CHARGED_MOVES);
        if charged_ids.is_empty() {
            charged_ids = entry.moveset.iter().skip(1).map(String::as_str).collect();
        }
        let fast = self.registry.move_record(fast_id)?.clone();
        let charged = charged_ids
            .into_iter()
            .map(|id| self.registry.move_record(id).cloned())
            .collect::<Option<Vec<_>>>()?;
        Some((fast, charged, entry.score / 100.0))
    }

    fn contestant_for(&self, species: &SpeciesRecord) -> Result<Option<Contestant>> {
        let ivs = species.ivs_for_cap(self.cap);
        let stats = BracketStats::fit_to_cap(species.base_stats, ivs, self.cap, self.max_level);

        if !species.released {
            debug!(species = %species.species_id, "skipped: unreleased");
            return Ok(None);
        }
        if stats.stat_product() < min_stat_product(self.cap) && !self.exempt_from_threshold(species) {
            debug!(species = %species.species_id, "skipped: stat product below floor");
            return Ok(None);
        }
        if self.is_banned(species) {
            debug!(species = %species.species_id, "skipped: banned at this cap");
            return Ok(None);
        }
        if !filters::is_eligible(self.cup, species, self.cap) {
            return Ok(None);
        }

        let (mut fast, mut charged, mut weight) = match self.seeded_moveset(&species.species_id) {
            Some(seeded) => seeded,
            None => match default_moveset(species, self.registry) {
                Some((fast, charged)) => (fast, charged, 1.0),
                None => {
                    warn!(species = %species.species_id, "skipped: no known fast move");
                    return Ok(None);
                }
            },
        };

        if let Some(entry) = self
            .registry
            .override_for(&self.cup.name, self.cap, &species.species_id)
        {
            if let Some(fast_id) = &entry.fast_move {
                fast = self.registry.require_move(fast_id)?.clone();
            }
            if let Some(charged_ids) = &entry.charged_moves {
                charged = charged_ids
                    .iter()
                    .map(|id| self.registry.require_move(id).cloned())
                    .collect::<Result<Vec<_>>>()?;
            }
            if let Some(w) = entry.weight {
                weight = w;
            }
        }

        let mut contestant = Contestant::new(species, ivs, stats, fast, charged);
        contestant.weight_modifier = weight;
        Ok(Some(contestant))
    }

    pub fn build(&self) -> Result<Roster> {
        let mut candidates = Vec::new();
        for species in self.registry.species_list() {
            if let Some(contestant) = self.contestant_for(species)? {
                candidates.push(contestant);
            }
        }

        let targets: Vec<Contestant> = if self.cup.meta_targets_only {
            candidates
                .iter()
                .filter(|c| c.weight_modifier > 1.0)
                .cloned()
                .collect()
        } else {
            candidates.clone()
        };

        info!(
            cup = %self.cup.name,
            cap = self.cap,
            candidates = candidates.len(),
            targets = targets.len(),
            "roster built"
        );
        Ok(Roster {
            candidates,
            targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::contestant::fixtures::{charged, fast, species};
    use crate::data::gamemaster::GameMasterFile;

    fn registry_with(mut s: SpeciesRecord) -> DataRegistry {
        s.fast_moves = vec!["WATER_GUN".to_string(), "TACKLE".to_string()];
        s.charged_moves = vec![
            "HYDRO_PUMP".to_string(),
            "BUBBLE_BEAM".to_string(),
            "BODY_SLAM".to_string(),
        ];
        DataRegistry::from_game_master(GameMasterFile {
            species: vec![s],
            moves: vec![
                fast("WATER_GUN", "water", 3.0, 3, 500),
                fast("TACKLE", "normal", 3.0, 3, 500),
                charged("HYDRO_PUMP", "water", 130.0, 75),
                charged("BUBBLE_BEAM", "water", 25.0, 40),
                charged("BODY_SLAM", "normal", 60.0, 35),
            ],
            ..GameMasterFile::default()
        })
    }

    #[test]
    fn default_moveset_prefers_stab_then_value_per_energy() {
        let registry = registry_with(species("wartortle", &["water"]));
        let s = registry.species("wartortle").cloned().unwrap();
        let (fast, charged) = default_moveset(&s, &registry).unwrap();
        assert_eq!(fast.move_id, "WATER_GUN");
        // 1.2 × 130 / 75 = 2.08, 60 / 35 = 1.71, 1.2 × 25 / 40 = 0.75
        let ids: Vec<_> = charged.iter().map(|m| m.move_id.as_str()).collect();
        assert_eq!(ids, vec!["HYDRO_PUMP", "BODY_SLAM"]);
    }

    #[test]
    fn no_fast_move_means_no_moveset() {
        let registry = DataRegistry::from_game_master(GameMasterFile::default());
        let s = species("ghost", &["ghost"]);
        assert!(default_moveset(&s, &registry).is_none());
    }
}
