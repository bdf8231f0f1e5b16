//! Battle Orchestrator: every (candidate, target) pairing for one scenario.
//!
//! Balanced scenarios over a square roster reuse the mirrored result of an
//! earlier row instead of calling the resolver again. The reuse cache lives
//! for one scenario run only.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::combat::contestant::Contestant;
use crate::combat::resolver::{BattleResolver, BattleSetup, MoveUsage};
use crate::config::{MIDPOINT_RATING, SHIELD_RATING_BONUS};
use crate::parallel::{row_batches, Progress};
use crate::ranking::entry::{MoveUsageTable, MoveUse};
use crate::ranking::roster::Roster;
use crate::ranking::scenario::Scenario;

/// Number of progress-reporting batches for non-symmetric scenarios.
const PROGRESS_BATCH_COUNT: usize = 20;

/// One candidate-vs-target result, seen from the candidate's side.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    /// Target pool position.
    pub opponent: usize,
    pub opponent_id: String,
    /// Both sides share an identity; recorded but never averaged.
    pub is_mirror: bool,
    pub rating: u32,
    pub opponent_rating: u32,
    pub adjusted_rating: u32,
    pub opponent_adjusted_rating: u32,
    pub usage: MoveUsage,
    pub opponent_usage: MoveUsage,
}

impl Pairing {
    /// The same encounter seen from the other side.
    fn swapped(&self, opponent: usize, opponent_id: &str) -> Pairing {
        Pairing {
            opponent,
            opponent_id: opponent_id.to_string(),
            is_mirror: self.is_mirror,
            rating: self.opponent_rating,
            opponent_rating: self.rating,
            adjusted_rating: self.opponent_adjusted_rating,
            opponent_adjusted_rating: self.adjusted_rating,
            usage: self.opponent_usage.clone(),
            opponent_usage: self.usage.clone(),
        }
    }
}

/// Symmetric matrix of pairings indexed by pool position.
#[derive(Debug)]
pub struct PairingCache {
    size: usize,
    cells: Vec<Option<Pairing>>,
}

impl PairingCache {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    pub fn insert(&mut self, row: usize, col: usize, pairing: Pairing) {
        if row < self.size && col < self.size {
            self.cells[row * self.size + col] = Some(pairing);
        }
    }

    /// `(row, col)` derived from a cached `(col, row)`. `opponent_id` names the
    /// target at `col`.
    pub fn mirrored(&self, row: usize, col: usize, opponent_id: &str) -> Option<Pairing> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.cells[col * self.size + row]
            .as_ref()
            .map(|p| p.swapped(col, opponent_id))
    }
}

/// Output of one scenario's battles.
#[derive(Debug, Clone)]
pub struct ScenarioBattles {
    pub scenario: Scenario,
    /// `rows[i][j]`: candidate `i` against target `j`.
    pub rows: Vec<Vec<Pairing>>,
    pub initial_scores: Vec<f64>,
    pub usage: Vec<MoveUsageTable>,
    pub resolver_calls: usize,
}

/// `floor((ownHP/ownMax + (oppMax − oppHP)/oppMax) × 500)`.
pub fn battle_rating(final_hp: u32, max_hp: u32, opponent_final_hp: u32, opponent_max_hp: u32) -> u32 {
    let max_hp = max_hp.max(1);
    let opponent_max_hp = opponent_max_hp.max(1);
    let health = f64::from(final_hp.min(max_hp)) / f64::from(max_hp);
    let damage =
        f64::from(opponent_max_hp - opponent_final_hp.min(opponent_max_hp)) / f64::from(opponent_max_hp);
    ((health + damage) * MIDPOINT_RATING).floor() as u32
}

fn simulate<R: BattleResolver + ?Sized>(
    resolver: &R,
    candidate: &Contestant,
    target: &Contestant,
    opponent: usize,
    scenario: Scenario,
) -> Pairing {
    let shields = scenario.shields();
    let setup = BattleSetup::configure(candidate, target, shields, scenario.energy_turns());
    let outcome = resolver.resolve(&setup);

    let rating = battle_rating(
        outcome.final_hp[0],
        candidate.max_hp(),
        outcome.final_hp[1],
        target.max_hp(),
    );
    let opponent_rating = battle_rating(
        outcome.final_hp[1],
        target.max_hp(),
        outcome.final_hp[0],
        candidate.max_hp(),
    );
    let wins = [
        u32::from(rating > opponent_rating),
        u32::from(opponent_rating > rating),
    ];
    let remaining = [
        u32::from(outcome.shields_remaining[0].min(shields[0])),
        u32::from(outcome.shields_remaining[1].min(shields[1])),
    ];
    let spent = [u32::from(shields[0]) - remaining[0], u32::from(shields[1]) - remaining[1]];

    let [usage, opponent_usage] = outcome.move_usage;
    Pairing {
        opponent,
        opponent_id: target.species_id.clone(),
        is_mirror: candidate.species_id == target.species_id,
        rating,
        opponent_rating,
        adjusted_rating: rating + SHIELD_RATING_BONUS * (spent[1] + remaining[0]) * wins[0],
        opponent_adjusted_rating: opponent_rating
            + SHIELD_RATING_BONUS * (spent[0] + remaining[1]) * wins[1],
        usage,
        opponent_usage,
    }
}

/// Floor of the mean shield-adjusted rating over non-mirror pairings.
pub fn initial_score(row: &[Pairing]) -> f64 {
    let (sum, count) = row
        .iter()
        .filter(|p| !p.is_mirror)
        .fold((0u64, 0u64), |(sum, count), p| {
            (sum + u64::from(p.adjusted_rating), count + 1)
        });
    (sum as f64 / count.max(1) as f64).floor()
}

/// Sum usage across a row and split it into the contestant's fast and charged
/// tables. Move ids the contestant does not carry are dropped.
pub fn usage_table(contestant: &Contestant, row: &[Pairing]) -> MoveUsageTable {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for pairing in row {
        for (move_id, uses) in &pairing.usage {
            *totals.entry(move_id.as_str()).or_insert(0) += u64::from(*uses);
        }
    }

    let mut table = MoveUsageTable::default();
    for (move_id, uses) in totals {
        let entry = MoveUse {
            move_id: move_id.to_string(),
            uses,
        };
        if contestant.fast_move.move_id == move_id {
            table.fast_moves.push(entry);
        } else if contestant.charged_moves.iter().any(|m| m.move_id == move_id) {
            table.charged_moves.push(entry);
        } else {
            warn!(species = %contestant.species_id, move_id, "usage for unknown move skipped");
        }
    }
    let by_uses = |a: &MoveUse, b: &MoveUse| b.uses.cmp(&a.uses).then_with(|| a.move_id.cmp(&b.move_id));
    table.fast_moves.sort_by(by_uses);
    table.charged_moves.sort_by(by_uses);
    table
}

/// Symmetric reuse needs the same pool on both sides and identical resources.
pub fn reuses_mirrors(roster: &Roster, scenario: Scenario) -> bool {
    roster.is_square() && scenario.is_balanced()
}

fn symmetric_rows<R: BattleResolver + ?Sized>(
    resolver: &R,
    roster: &Roster,
    scenario: Scenario,
    progress: &Progress,
) -> (Vec<Vec<Pairing>>, usize) {
    let n = roster.candidates.len();
    let mut cache = PairingCache::new(n);
    let mut rows = Vec::with_capacity(n);
    let mut calls = 0;

    for (i, candidate) in roster.candidates.iter().enumerate() {
        let mut row = Vec::with_capacity(n);
        for (j, target) in roster.targets.iter().enumerate() {
            let pairing = match cache.mirrored(i, j, &target.species_id) {
                Some(reused) => reused,
                None => {
                    calls += 1;
                    let pairing = simulate(resolver, candidate, target, j, scenario);
                    cache.insert(i, j, pairing.clone());
                    pairing
                }
            };
            row.push(pairing);
        }
        rows.push(row);
        progress.report(scenario, i + 1, n);
    }
    (rows, calls)
}

fn parallel_rows<R: BattleResolver + ?Sized>(
    resolver: &R,
    roster: &Roster,
    scenario: Scenario,
    progress: &Progress,
) -> (Vec<Vec<Pairing>>, usize) {
    let total = roster.candidates.len();
    let mut rows = Vec::with_capacity(total);
    for batch in row_batches(total, PROGRESS_BATCH_COUNT) {
        let end = batch.end;
        let batch: Vec<Vec<Pairing>> = roster.candidates[batch]
            .par_iter()
            .map(|candidate| {
                roster
                    .targets
                    .iter()
                    .enumerate()
                    .map(|(j, target)| simulate(resolver, candidate, target, j, scenario))
                    .collect()
            })
            .collect();
        rows.extend(batch);
        progress.report(scenario, end, total);
    }
    (rows, total * roster.targets.len())
}

/// Run every pairing of one scenario.
pub fn run_battles<R: BattleResolver + ?Sized>(
    resolver: &R,
    roster: &Roster,
    scenario: Scenario,
    progress: &Progress,
) -> ScenarioBattles {
    let (rows, resolver_calls) = if reuses_mirrors(roster, scenario) {
        symmetric_rows(resolver, roster, scenario, progress)
    } else {
        parallel_rows(resolver, roster, scenario, progress)
    };

    let initial_scores = rows.iter().map(|row| initial_score(row)).collect();
    let usage = roster
        .candidates
        .iter()
        .zip(&rows)
        .map(|(candidate, row)| usage_table(candidate, row))
        .collect();

    debug!(%scenario, resolver_calls, "battles complete");
    ScenarioBattles {
        scenario,
        rows,
        initial_scores,
        usage,
        resolver_calls,
    }
}
