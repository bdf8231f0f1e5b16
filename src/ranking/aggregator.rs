//! Cross-Scenario Aggregator: overall (geometric mean) and consistency
//! (mean penalized by spread) composites over the scenario rankings.

use std::collections::{BTreeMap, HashMap};

use tracing::info;

use crate::config::{CONSISTENCY_DEVIATION_PENALTY, GEOMETRIC_MEAN_FLOOR};
use crate::ranking::entry::{RankingCategory, RankingEntry};
use crate::ranking::scenario::Scenario;

/// Scenario rankings keyed in canonical scenario order.
pub type ScenarioRankings = BTreeMap<Scenario, Vec<RankingEntry>>;

/// Composites read from disk that replace computed ones for official rosters.
#[derive(Debug, Clone, Default)]
pub struct AuthoritativeComposites {
    pub overall: Option<Vec<RankingEntry>>,
    pub consistency: Option<Vec<RankingEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composites {
    pub overall: Option<Vec<RankingEntry>>,
    pub consistency: Option<Vec<RankingEntry>>,
}

/// `leads` when present, else the first present scenario in canonical order.
pub fn base_scenario(rankings: &ScenarioRankings) -> Option<Scenario> {
    if rankings.contains_key(&Scenario::Leads) {
        return Some(Scenario::Leads);
    }
    Scenario::ALL
        .into_iter()
        .find(|scenario| rankings.contains_key(scenario))
}

/// Geometric mean with every score floored at 0.1.
pub fn geometric_mean(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let log_sum: f64 = scores
        .iter()
        .map(|s| s.max(GEOMETRIC_MEAN_FLOOR).ln())
        .sum();
    Some((log_sum / scores.len() as f64).exp())
}

/// `max(0, mean − 0.5 × population stdDev)`; needs at least two scores.
pub fn consistency_value(scores: &[f64]) -> Option<f64> {
    if scores.len() < 2 {
        return None;
    }
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    Some((mean - CONSISTENCY_DEVIATION_PENALTY * variance.sqrt()).max(0.0))
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rescale against the top raw value, round to one decimal and sort.
fn rescale(mut entries: Vec<RankingEntry>) -> Vec<RankingEntry> {
    let top = entries.iter().map(|e| e.score).fold(0.0, f64::max);
    for entry in &mut entries {
        entry.score = if top > 0.0 {
            round_tenth(entry.score / top * 100.0)
        } else {
            0.0
        };
    }
    entries.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.species_id.cmp(&b.species_id))
    });
    entries
}

struct CompositeSource<'a> {
    base: &'a [RankingEntry],
    details: HashMap<&'a str, &'a RankingEntry>,
    per_scenario: Vec<HashMap<&'a str, f64>>,
}

impl<'a> CompositeSource<'a> {
    fn new(rankings: &'a ScenarioRankings) -> Option<Self> {
        let base = rankings.get(&base_scenario(rankings)?)?;
        let detail_list = rankings.get(&Scenario::Leads).unwrap_or(base);
        Some(Self {
            base,
            details: detail_list
                .iter()
                .map(|e| (e.species_id.as_str(), e))
                .collect(),
            per_scenario: rankings
                .values()
                .map(|list| list.iter().map(|e| (e.species_id.as_str(), e.score)).collect())
                .collect(),
        })
    }

    /// Scores of one candidate across present scenarios, in canonical order.
    fn scores(&self, species_id: &str) -> Vec<f64> {
        self.per_scenario
            .iter()
            .filter_map(|scores| scores.get(species_id).copied())
            .collect()
    }

    fn entry(&self, base: &RankingEntry, raw: f64, scores: Vec<f64>) -> RankingEntry {
        let detail = self.details.get(base.species_id.as_str()).copied().unwrap_or(base);
        RankingEntry {
            species_id: base.species_id.clone(),
            species_name: base.species_name.clone(),
            score: raw,
            moveset: detail.moveset.clone(),
            matchups: detail.matchups.clone(),
            counters: detail.counters.clone(),
            moves: detail.moves.clone(),
            scores,
        }
    }

    fn build(&self, value: impl Fn(&[f64]) -> Option<f64>) -> Vec<RankingEntry> {
        let entries = self
            .base
            .iter()
            .filter_map(|base| {
                let scores = self.scores(&base.species_id);
                let raw = value(&scores)?;
                Some(self.entry(base, raw, scores))
            })
            .collect();
        rescale(entries)
    }
}

pub fn overall(rankings: &ScenarioRankings) -> Option<Vec<RankingEntry>> {
    let source = CompositeSource::new(rankings)?;
    Some(source.build(geometric_mean))
}

pub fn consistency(rankings: &ScenarioRankings) -> Option<Vec<RankingEntry>> {
    if rankings.len() < 2 {
        return None;
    }
    let source = CompositeSource::new(rankings)?;
    Some(source.build(consistency_value))
}

/// Both composites. Official rosters take authoritative lists verbatim when given.
pub fn aggregate(
    rankings: &ScenarioRankings,
    custom_roster: bool,
    authoritative: AuthoritativeComposites,
) -> Composites {
    let mut composites = Composites::default();
    let (prior_overall, prior_consistency) = if custom_roster {
        (None, None)
    } else {
        (authoritative.overall, authoritative.consistency)
    };

    composites.overall = match prior_overall {
        Some(list) => {
            info!(category = %RankingCategory::Overall, "using authoritative rankings");
            Some(list)
        }
        None => overall(rankings),
    };
    composites.consistency = match prior_consistency {
        Some(list) => {
            info!(category = %RankingCategory::Consistency, "using authoritative rankings");
            Some(list)
        }
        None => consistency(rankings),
    };
    composites
}
