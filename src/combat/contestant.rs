//! Contestant: one roster entry configured for one bracket.
//!
//! The contestant itself never changes during a scenario. Per-encounter state
//! (health, energy, shields) lives in [CombatState], which is rebuilt from the
//! contestant for every encounter and handed to the resolver by value.

use serde::Serialize;

use crate::combat::stats::BracketStats;
use crate::data::gamemaster::{IvSpread, MoveRecord, SpeciesRecord};

pub const MAX_ENERGY: u32 = 100;
pub const MAX_CHARGED_MOVES: usize = 2;
pub const STAB_MULTIPLIER: f64 = 1.2;
/// Milliseconds in one simulation turn.
pub const TURN_MS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CombatState {
    pub hp: u32,
    pub energy: u32,
    pub shields: u8,
}

#[derive(Debug, Clone)]
pub struct Contestant {
    pub species_id: String,
    pub species_name: String,
    pub types: Vec<String>,
    pub ivs: IvSpread,
    pub stats: BracketStats,
    pub fast_move: MoveRecord,
    pub charged_moves: Vec<MoveRecord>,
    /// Usage-derived weight when this contestant is a target; 0 keeps it out of averages.
    pub weight_modifier: f64,
}

impl Contestant {
    pub fn new(
        species: &SpeciesRecord,
        ivs: IvSpread,
        stats: BracketStats,
        fast_move: MoveRecord,
        mut charged_moves: Vec<MoveRecord>,
    ) -> Self {
        charged_moves.truncate(MAX_CHARGED_MOVES);
        Self {
            species_id: species.species_id.clone(),
            species_name: species.species_name.clone(),
            types: species.types.clone(),
            ivs,
            stats,
            fast_move,
            charged_moves,
            weight_modifier: 1.0,
        }
    }

    pub fn stat_product(&self) -> f64 {
        self.stats.stat_product()
    }

    pub fn max_hp(&self) -> u32 {
        self.stats.hp
    }

    pub fn stab(&self, move_record: &MoveRecord) -> f64 {
        if self
            .types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&move_record.move_type))
        {
            STAB_MULTIPLIER
        } else {
            1.0
        }
    }

    /// Starting energy for a scenario's energy-turns value.
    /// `min(100, gain × max(1, floor(turns × 500 / cooldown)))`, or 0 for 0 turns.
    pub fn start_energy(&self, energy_turns: u32) -> u32 {
        if energy_turns == 0 {
            return 0;
        }
        let cooldown = self.fast_move.cooldown.max(TURN_MS);
        let uses = ((energy_turns * TURN_MS) / cooldown).max(1);
        (self.fast_move.energy_gain * uses).min(MAX_ENERGY)
    }

    /// Fresh encounter state: full health, the given shields and scenario energy.
    pub fn primed(&self, shields: u8, energy_turns: u32) -> CombatState {
        CombatState {
            hp: self.max_hp(),
            energy: self.start_energy(energy_turns),
            shields,
        }
    }

    pub fn moveset(&self) -> Vec<String> {
        std::iter::once(self.fast_move.move_id.clone())
            .chain(self.charged_moves.iter().map(|m| m.move_id.clone()))
            .collect()
    }

    /// Fast-move damage per turn with STAB, before attack/defense scaling.
    pub fn fast_damage_per_turn(&self) -> f64 {
        self.fast_move.power * self.stab(&self.fast_move) / f64::from(self.fast_move.turns())
    }

    /// Largest energy cost difference among the selected charged moves.
    pub fn charged_energy_gap(&self) -> u32 {
        let costs = self.charged_moves.iter().map(|m| m.energy);
        match (costs.clone().max(), costs.min()) {
            (Some(max), Some(min)) => max - min,
            _ => 0,
        }
    }
}
