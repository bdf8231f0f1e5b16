//! Scenario Finalizer: turns solved scores into a sorted 0-100 ranking list.

use std::cmp::Ordering;

use crate::combat::contestant::Contestant;
use crate::config::{
    CHARGERS_DPT_EXPONENT, CHARGERS_ENERGY_GAP_PENALTY, CHARGERS_MAX_FACTOR, CHARGERS_MIN_FACTOR,
    CHARGERS_REFERENCE_DPT, MATCHUP_COUNT,
};
use crate::ranking::entry::{MatchupRecord, RankingEntry};
use crate::ranking::orchestrator::{Pairing, ScenarioBattles};
use crate::ranking::roster::Roster;
use crate::ranking::scenario::Scenario;
use crate::ranking::solver::SolvedScenario;

const WIN_THRESHOLD: u32 = 500;

/// Throughput multiplier for the chargers scenario, clamped to `[0.5, 1.5]`.
pub fn chargers_factor(contestant: &Contestant) -> f64 {
    let dpt = contestant.fast_damage_per_turn().max(0.0);
    let gap = f64::from(contestant.charged_energy_gap());
    let factor = (dpt / CHARGERS_REFERENCE_DPT).powf(CHARGERS_DPT_EXPONENT)
        * (1.0 - CHARGERS_ENERGY_GAP_PENALTY * gap);
    factor.clamp(CHARGERS_MIN_FACTOR, CHARGERS_MAX_FACTOR)
}

fn record(pairing: &Pairing) -> MatchupRecord {
    MatchupRecord {
        opponent: pairing.opponent_id.clone(),
        rating: pairing.rating,
    }
}

fn desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Best wins: picked by weighted score, listed by rating descending.
pub fn top_matchups(row: &[Pairing], weighted: &[f64]) -> Vec<MatchupRecord> {
    let mut wins: Vec<(&Pairing, f64)> = row
        .iter()
        .zip(weighted.iter().copied())
        .filter(|(p, _)| !p.is_mirror && p.rating > WIN_THRESHOLD)
        .collect();
    wins.sort_by(|a, b| desc(a.1, b.1).then_with(|| a.0.opponent_id.cmp(&b.0.opponent_id)));
    wins.truncate(MATCHUP_COUNT);
    wins.sort_by(|a, b| b.0.rating.cmp(&a.0.rating).then_with(|| a.0.opponent_id.cmp(&b.0.opponent_id)));
    wins.into_iter().map(|(p, _)| record(p)).collect()
}

/// Worst losses: picked by opponent weighted score, listed by rating ascending.
pub fn top_counters(row: &[Pairing], opponent_weighted: &[f64]) -> Vec<MatchupRecord> {
    let mut losses: Vec<(&Pairing, f64)> = row
        .iter()
        .zip(opponent_weighted.iter().copied())
        .filter(|(p, _)| !p.is_mirror && p.rating < WIN_THRESHOLD)
        .collect();
    losses.sort_by(|a, b| desc(a.1, b.1).then_with(|| a.0.opponent_id.cmp(&b.0.opponent_id)));
    losses.truncate(MATCHUP_COUNT);
    losses.sort_by(|a, b| a.0.rating.cmp(&b.0.rating).then_with(|| a.0.opponent_id.cmp(&b.0.opponent_id)));
    losses.into_iter().map(|(p, _)| record(p)).collect()
}

/// Sort by score (ties by id) and rescale so the leader sits at 100.
pub fn scale_scores(entries: &mut [RankingEntry]) {
    entries.sort_by(|a, b| desc(a.score, b.score).then_with(|| a.species_id.cmp(&b.species_id)));
    let highest = entries.first().map_or(0.0, |e| e.score);
    for entry in entries.iter_mut() {
        entry.score = if highest > 0.0 {
            (entry.score / highest * 1000.0).floor() / 10.0
        } else {
            0.0
        };
    }
}

pub fn finalize(
    roster: &Roster,
    battles: &ScenarioBattles,
    solved: &SolvedScenario,
) -> Vec<RankingEntry> {
    let mut entries: Vec<RankingEntry> = roster
        .candidates
        .iter()
        .enumerate()
        .map(|(i, contestant)| {
            let mut score = solved.scores.get(i).copied().unwrap_or(0.0);
            if battles.scenario == Scenario::Chargers {
                score *= chargers_factor(contestant);
            }
            let row = battles.rows.get(i).map_or(&[][..], Vec::as_slice);
            let weighted = solved.weighted.get(i).map_or(&[][..], Vec::as_slice);
            let opponent_weighted = solved.opponent_weighted.get(i).map_or(&[][..], Vec::as_slice);
            RankingEntry {
                species_id: contestant.species_id.clone(),
                species_name: contestant.species_name.clone(),
                score,
                moveset: contestant.moveset(),
                matchups: top_matchups(row, weighted),
                counters: top_counters(row, opponent_weighted),
                moves: battles.usage.get(i).cloned().unwrap_or_default(),
                scores: Vec::new(),
            }
        })
        .collect();
    scale_scores(&mut entries);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::contestant::fixtures::{charged, contestant, fast};
    use crate::combat::resolver::MoveUsage;

    fn pairing(id: &str, rating: u32) -> Pairing {
        Pairing {
            opponent: 0,
            opponent_id: id.to_string(),
            is_mirror: false,
            rating,
            opponent_rating: 1000 - rating,
            adjusted_rating: rating,
            opponent_adjusted_rating: 1000 - rating,
            usage: MoveUsage::new(),
            opponent_usage: MoveUsage::new(),
        }
    }

    fn entry(id: &str, score: f64) -> RankingEntry {
        RankingEntry {
            species_id: id.to_string(),
            species_name: id.to_string(),
            score,
            moveset: Vec::new(),
            matchups: Vec::new(),
            counters: Vec::new(),
            moves: Default::default(),
            scores: Vec::new(),
        }
    }

    #[test]
    fn leader_is_exactly_one_hundred() {
        let mut entries = vec![entry("b", 412.0), entry("a", 618.0), entry("c", 0.0)];
        scale_scores(&mut entries);
        assert_eq!(entries[0].species_id, "a");
        assert_eq!(entries[0].score, 100.0);
        assert_eq!(entries[1].score, 66.6);
        assert_eq!(entries[2].score, 0.0);
    }

    #[test]
    fn non_positive_leader_zeroes_everything() {
        let mut entries = vec![entry("a", 0.0), entry("b", 0.0)];
        scale_scores(&mut entries);
        assert!(entries.iter().all(|e| e.score == 0.0));
        let mut empty: Vec<RankingEntry> = Vec::new();
        scale_scores(&mut empty);
    }

    #[test]
    fn matchups_pick_by_weight_and_list_by_rating() {
        let row: Vec<_> = (0..7).map(|i| pairing(&format!("t{i}"), 510 + i * 50)).collect();
        // the two strongest wins carry no weight and drop out
        let weighted = vec![7.0, 6.0, 5.0, 4.0, 3.0, 0.0, 0.0];
        let matchups = top_matchups(&row, &weighted);
        let ids: Vec<_> = matchups.iter().map(|m| m.opponent.as_str()).collect();
        assert_eq!(ids, vec!["t4", "t3", "t2", "t1", "t0"]);
    }

    #[test]
    fn counters_only_include_losses_ascending() {
        let row = vec![pairing("a", 300), pairing("b", 100), pairing("c", 700), pairing("d", 500)];
        let counters = top_counters(&row, &[1.0, 2.0, 3.0, 4.0]);
        let ratings: Vec<_> = counters.iter().map(|m| m.rating).collect();
        assert_eq!(ratings, vec![100, 300]);
    }

    #[test]
    fn chargers_factor_rewards_fast_pressure_and_is_clamped() {
        let mut c = contestant("a", 100);
        // 4 damage per turn with STAB: 4 / 1.2 power at 500 ms
        c.fast_move = fast("F", "normal", 4.0 / 1.2, 3, 500);
        assert!((chargers_factor(&c) - 1.0).abs() < 1e-9);

        c.charged_moves.push(charged("BIG", "normal", 100.0, 85));
        // gap 50 -> 0.9
        assert!((chargers_factor(&c) - 0.9).abs() < 1e-9);

        c.fast_move = fast("Z", "normal", 0.0, 3, 500);
        assert_eq!(chargers_factor(&c), CHARGERS_MIN_FACTOR);
    }
}
