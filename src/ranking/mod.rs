//! Ranking Engine: roster preparation, pairwise battles with symmetric reuse,
//! iterative weighted re-scoring, per-scenario finalization and cross-scenario
//! aggregation.

pub mod aggregator;
pub mod entry;
pub mod filters;
pub mod finalizer;
pub mod orchestrator;
pub mod pipeline;
pub mod roster;
pub mod scenario;
pub mod solver;

pub use aggregator::{aggregate, base_scenario, consistency, overall, ScenarioRankings};
pub use entry::{MatchupRecord, MoveUsageTable, RankingCategory, RankingEntry};
pub use orchestrator::{run_battles, Pairing, PairingCache, ScenarioBattles};
pub use pipeline::{rank_scenario, RankingPipeline, RankingReport, RankingRequest};
pub use roster::{Roster, RosterBuilder};
pub use scenario::Scenario;
pub use solver::{solve, SolvedScenario};
