//! Pipeline driver: roster, then every requested scenario in parallel, then the
//! composites.

use std::collections::BTreeSet;
use std::time::Instant;

use rayon::prelude::*;
use tracing::info;

use crate::combat::resolver::BattleResolver;
use crate::config::{RunConfig, ScoringPolicy};
use crate::data::rankings_io::load_prior_rankings;
use crate::data::DataRegistry;
use crate::error::Result;
use crate::parallel::{Progress, WorkerPool};
use crate::ranking::aggregator::{aggregate, AuthoritativeComposites, ScenarioRankings};
use crate::ranking::entry::{RankingCategory, RankingEntry};
use crate::ranking::finalizer::finalize;
use crate::ranking::orchestrator::run_battles;
use crate::ranking::roster::{Roster, RosterBuilder};
use crate::ranking::scenario::Scenario;
use crate::ranking::solver::solve;

#[derive(Debug, Clone, PartialEq)]
pub struct RankingRequest {
    pub cup: String,
    pub cap: u32,
    pub scenarios: Vec<Scenario>,
    /// Force the custom-roster solver schedule even for an official cup.
    pub custom: bool,
}

impl RankingRequest {
    /// Every scenario, official schedule.
    pub fn new(cup: impl Into<String>, cap: u32) -> Self {
        Self {
            cup: cup.into(),
            cap,
            scenarios: Scenario::ALL.to_vec(),
            custom: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RankingReport {
    pub cup: String,
    pub cap: u32,
    pub custom: bool,
    pub roster_size: usize,
    pub scenarios: ScenarioRankings,
    pub overall: Option<Vec<RankingEntry>>,
    pub consistency: Option<Vec<RankingEntry>>,
}

impl RankingReport {
    /// Every produced list: scenarios in canonical order, then the composites.
    pub fn lists(&self) -> Vec<(RankingCategory, &[RankingEntry])> {
        let mut lists: Vec<(RankingCategory, &[RankingEntry])> = self
            .scenarios
            .iter()
            .map(|(scenario, entries)| (RankingCategory::Scenario(*scenario), entries.as_slice()))
            .collect();
        if let Some(overall) = &self.overall {
            lists.push((RankingCategory::Overall, overall));
        }
        if let Some(consistency) = &self.consistency {
            lists.push((RankingCategory::Consistency, consistency));
        }
        lists
    }
}

/// Battles, solver and finalizer for one scenario.
pub fn rank_scenario<R: BattleResolver + ?Sized>(
    resolver: &R,
    roster: &Roster,
    scenario: Scenario,
    policy: &ScoringPolicy,
    custom_roster: bool,
    progress: &Progress,
) -> Vec<RankingEntry> {
    let started = Instant::now();
    info!(%scenario, candidates = roster.candidates.len(), "scenario started");
    let battles = run_battles(resolver, roster, scenario, progress);
    let solved = solve(&battles, roster, policy, custom_roster);
    let entries = finalize(roster, &battles, &solved);
    info!(
        %scenario,
        resolver_calls = battles.resolver_calls,
        passes = solved.passes,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scenario finished"
    );
    entries
}

pub struct RankingPipeline<'a, R: BattleResolver + ?Sized> {
    registry: &'a DataRegistry,
    resolver: &'a R,
    config: &'a RunConfig,
    progress: Progress,
}

impl<'a, R: BattleResolver + ?Sized> RankingPipeline<'a, R> {
    pub fn new(registry: &'a DataRegistry, resolver: &'a R, config: &'a RunConfig) -> Self {
        Self {
            registry,
            resolver,
            config,
            progress: Progress::disabled(),
        }
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    fn prior(&self, cup: &str, category: RankingCategory, cap: u32) -> Result<Option<Vec<RankingEntry>>> {
        match &self.config.rankings_dir {
            Some(dir) => load_prior_rankings(dir, cup, category, cap),
            None => Ok(None),
        }
    }

    /// Roster for the request, seeded from prior overall rankings when available.
    pub fn build_roster(&self, request: &RankingRequest) -> Result<Roster> {
        let mut builder = RosterBuilder::new(self.registry, &request.cup, request.cap)?
            .with_max_level(self.config.max_level);
        if let Some(prior) = self.prior(&builder.cup().name, RankingCategory::Overall, request.cap)? {
            builder = builder.with_prior_rankings(prior);
        }
        builder.build()
    }

    pub fn run(&self, request: &RankingRequest) -> Result<RankingReport> {
        let cup = self.registry.require_cup(&request.cup)?;
        let custom = request.custom || cup.custom;
        let roster = self.build_roster(request)?;
        let scenarios: BTreeSet<Scenario> = request.scenarios.iter().copied().collect();

        let policy = &self.config.scoring;
        let resolver = self.resolver;
        let progress = &self.progress;
        let roster_ref = &roster;
        let ranked: Vec<(Scenario, Vec<RankingEntry>)> =
            WorkerPool::with_workers(self.config.workers).install(|| {
                scenarios
                    .par_iter()
                    .map(|&scenario| {
                        let pool = roster_ref.clone();
                        let entries =
                            rank_scenario(resolver, &pool, scenario, policy, custom, progress);
                        (scenario, entries)
                    })
                    .collect()
            });
        let rankings: ScenarioRankings = ranked.into_iter().collect();

        let authoritative = if custom {
            AuthoritativeComposites::default()
        } else {
            AuthoritativeComposites {
                overall: self.prior(&cup.name, RankingCategory::Overall, request.cap)?,
                consistency: self.prior(&cup.name, RankingCategory::Consistency, request.cap)?,
            }
        };
        let composites = aggregate(&rankings, custom, authoritative);

        Ok(RankingReport {
            cup: cup.name.clone(),
            cap: request.cap,
            custom,
            roster_size: roster.candidates.len(),
            scenarios: rankings,
            overall: composites.overall,
            consistency: composites.consistency,
        })
    }
}
