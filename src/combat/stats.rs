//! Bracket stat computation: CP multipliers, combat power and the level search
//! that fits a species under a power cap.

use crate::data::gamemaster::{BaseStats, IvSpread};

/// CP multiplier for whole levels 1..=51.
const WHOLE_LEVEL_CPM: [f64; 51] = [
    0.094, 0.16639787, 0.21573247, 0.25572005, 0.29024988, 0.3210876, 0.34921268, 0.3752356,
    0.39956728, 0.4225, 0.44310755, 0.4627984, 0.48168495, 0.49985844, 0.51739395, 0.5343543,
    0.5507927, 0.5667545, 0.5822789, 0.5974, 0.6121573, 0.6265671, 0.64065295, 0.65443563,
    0.667934, 0.6811649, 0.69414365, 0.7068842, 0.7193991, 0.7317, 0.7377695, 0.74378943,
    0.74976104, 0.7556855, 0.76156384, 0.76739717, 0.7731865, 0.77893275, 0.784637, 0.7903,
    0.7953, 0.8003, 0.8053, 0.8103, 0.8153, 0.8203, 0.8253, 0.8303, 0.8353, 0.8403, 0.8453,
];

pub const MIN_LEVEL: f64 = 1.0;
pub const DEFAULT_MAX_LEVEL: f64 = 50.0;
pub const MIN_CP: u32 = 10;
pub const MIN_HP: u32 = 10;

/// Multiplier at a half-level step (`step = level * 2`). Half levels sit at the
/// quadratic mean of their neighbours.
fn cpm_at_step(step: u32) -> f64 {
    let step = step.clamp(2, (WHOLE_LEVEL_CPM.len() as u32) * 2);
    let whole = (step / 2) as usize;
    let low = WHOLE_LEVEL_CPM[whole - 1];
    if step % 2 == 0 || whole >= WHOLE_LEVEL_CPM.len() {
        return low;
    }
    let high = WHOLE_LEVEL_CPM[whole];
    ((low * low + high * high) / 2.0).sqrt()
}

pub fn cp_multiplier(level: f64) -> f64 {
    cpm_at_step((level * 2.0).round() as u32)
}

pub fn combat_power(base: BaseStats, ivs: IvSpread, cpm: f64) -> u32 {
    let atk = f64::from(base.atk + u16::from(ivs.atk));
    let def = f64::from(base.def + u16::from(ivs.def));
    let hp = f64::from(base.hp + u16::from(ivs.hp));
    let cp = (atk * def.sqrt() * hp.sqrt() * cpm * cpm / 10.0).floor() as u32;
    cp.max(MIN_CP)
}

/// Effective stats of one species at one bracket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketStats {
    pub level: f64,
    pub cp: u32,
    pub attack: f64,
    pub defense: f64,
    pub hp: u32,
}

impl BracketStats {
    pub fn at_level(base: BaseStats, ivs: IvSpread, level: f64) -> Self {
        let cpm = cp_multiplier(level);
        Self {
            level,
            cp: combat_power(base, ivs, cpm),
            attack: f64::from(base.atk + u16::from(ivs.atk)) * cpm,
            defense: f64::from(base.def + u16::from(ivs.def)) * cpm,
            hp: ((f64::from(base.hp + u16::from(ivs.hp)) * cpm).floor() as u32).max(MIN_HP),
        }
    }

    /// Highest level up to `max_level` whose CP does not exceed `cap`. Species
    /// that exceed the cap even at level 1 stay at level 1.
    pub fn fit_to_cap(base: BaseStats, ivs: IvSpread, cap: u32, max_level: f64) -> Self {
        let min_step = (MIN_LEVEL * 2.0) as u32;
        let max_step = ((max_level * 2.0).round() as u32).max(min_step);
        let mut best = min_step;
        for step in min_step..=max_step {
            if combat_power(base, ivs, cpm_at_step(step)) > cap {
                break;
            }
            best = step;
        }
        Self::at_level(base, ivs, f64::from(best) / 2.0)
    }

    /// `attack × defense × hp / 1000`.
    pub fn stat_product(&self) -> f64 {
        self.attack * self.defense * f64::from(self.hp) / 1000.0
    }
}
