//! Iterative Weight Solver: re-scores candidates by weighting each pairing by
//! how strong the opponent scored in the previous pass.

use crate::config::ScoringPolicy;
use crate::ranking::orchestrator::ScenarioBattles;
use crate::ranking::roster::Roster;
use crate::ranking::scenario::Scenario;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolvedScenario {
    pub scores: Vec<f64>,
    /// Last pass `shaped × weight`, per pairing.
    pub weighted: Vec<Vec<f64>>,
    /// Last pass `opponent adjusted × weight`, per pairing.
    pub opponent_weighted: Vec<Vec<f64>>,
    pub passes: usize,
}

struct PassContext<'a> {
    policy: &'a ScoringPolicy,
    scenario: Scenario,
    square: bool,
    best: f64,
    cutoff: f64,
}

impl PassContext<'_> {
    fn weight(&self, scores: &[f64], target: usize, modifier: f64, adjusted: f64, mirror: bool) -> f64 {
        if mirror {
            return 0.0;
        }
        let mut weight = if self.square {
            let target_score = scores.get(target).copied().unwrap_or(0.0);
            if target_score < self.cutoff * self.best {
                return 0.0;
            }
            (target_score / self.best - self.cutoff)
                .max(0.0)
                .powf(self.policy.rank_weight_exponent)
        } else {
            1.0
        };
        weight *= modifier;
        if self.scenario == Scenario::Switches {
            weight *= self.policy.switch_penalty(adjusted);
        }
        weight
    }
}

/// Run the policy's pass count for this roster kind, starting from the
/// orchestrator's initial scores.
pub fn solve(
    battles: &ScenarioBattles,
    roster: &Roster,
    policy: &ScoringPolicy,
    custom_roster: bool,
) -> SolvedScenario {
    let passes = policy.iterations(custom_roster);
    let mut solved = SolvedScenario {
        scores: battles.initial_scores.clone(),
        passes,
        ..SolvedScenario::default()
    };
    for pass in 0..passes {
        solved = solve_pass(battles, roster, policy, &solved.scores, pass);
        solved.passes = passes;
    }
    solved
}

/// One re-scoring pass over the previous pass's scores.
pub fn solve_pass(
    battles: &ScenarioBattles,
    roster: &Roster,
    policy: &ScoringPolicy,
    previous: &[f64],
    pass: usize,
) -> SolvedScenario {
    let ctx = PassContext {
        policy,
        scenario: battles.scenario,
        square: roster.is_square(),
        best: previous.iter().copied().fold(0.0, f64::max).max(1.0),
        cutoff: policy.cutoff(pass),
    };

    let mut scores = Vec::with_capacity(battles.rows.len());
    let mut weighted = Vec::with_capacity(battles.rows.len());
    let mut opponent_weighted = Vec::with_capacity(battles.rows.len());

    for row in &battles.rows {
        let mut total = 0.0;
        let mut total_weight = 0.0;
        let mut row_weighted = Vec::with_capacity(row.len());
        let mut row_opponent = Vec::with_capacity(row.len());

        for pairing in row {
            let modifier = roster
                .targets
                .get(pairing.opponent)
                .map_or(1.0, |t| t.weight_modifier);
            let adjusted = f64::from(pairing.adjusted_rating);
            let shaped = policy.shape_rating(adjusted);
            let weight = ctx.weight(previous, pairing.opponent, modifier, adjusted, pairing.is_mirror);

            total += shaped * weight;
            total_weight += weight;
            row_weighted.push(shaped * weight);
            row_opponent.push(f64::from(pairing.opponent_adjusted_rating) * weight);
        }

        let denominator = if total_weight > 0.0 { total_weight } else { 1.0 };
        scores.push((total / denominator).floor());
        weighted.push(row_weighted);
        opponent_weighted.push(row_opponent);
    }

    SolvedScenario {
        scores,
        weighted,
        opponent_weighted,
        passes: pass + 1,
    }
}
